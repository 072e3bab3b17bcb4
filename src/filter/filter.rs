//! The filter contract.
//!
//! A filter runs in two phases:
//! 1. **Preflight** validates arguments against a read-only structure and
//!    describes its mutations as [`OutputActions`]. Nothing is changed.
//! 2. **Execute** re-runs preflight against the current structure, applies the
//!    actions for real and then fills in values via `execute_impl`.
//!
//! Implementors provide `preflight_impl` and `execute_impl`; the provided
//! `preflight` and `execute` wrap them with defaults, parameter validation,
//! dry runs and cancellation.

use crate::actions::{Mode, OutputActions};
use crate::error::ResultExt;
use crate::filter::cancel::CancelToken;
use crate::filter::context::ExecutionContext;
use crate::filter::message::MessageHandler;
use crate::outcome::{Outcome, Warning};
use crate::parameters::{Arguments, Parameters};
use crate::structure::DataStructure;
use std::fmt;
use uuid::Uuid;

/// A named value computed during preflight, shown to the user before running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreflightValue {
    pub name: String,
    pub value: String,
}

impl PreflightValue {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// What a successful preflight produces.
#[derive(Debug, Clone, Default)]
pub struct PreflightResult {
    pub actions: OutputActions,
    pub values: Vec<PreflightValue>,
}

impl PreflightResult {
    pub fn new(actions: OutputActions) -> Self {
        Self {
            actions,
            values: Vec::new(),
        }
    }

    pub fn with_value(mut self, value: PreflightValue) -> Self {
        self.values.push(value);
        self
    }
}

/// A unit of work in a pipeline.
pub trait Filter: fmt::Debug + Send + Sync {
    /// Stable machine name, e.g. `create_data_group`.
    fn name(&self) -> &'static str;

    /// Rust type name used in logs and saved pipelines.
    fn class_name(&self) -> &'static str;

    /// Identity that survives renames.
    fn uuid(&self) -> Uuid;

    fn human_name(&self) -> &'static str;

    fn default_tags(&self) -> Vec<String> {
        Vec::new()
    }

    /// Fresh parameter schema.
    fn parameters(&self) -> Parameters;

    fn clone_box(&self) -> Box<dyn Filter>;

    /// Describe the mutations for these arguments.
    ///
    /// `args` are already merged with defaults and validated.
    fn preflight_impl(
        &self,
        ds: &DataStructure,
        args: &Arguments,
        messages: &dyn MessageHandler,
    ) -> Outcome<PreflightResult>;

    /// Compute values once the actions have been applied.
    ///
    /// The default does nothing, for filters whose whole effect is the
    /// action list.
    fn execute_impl(
        &self,
        _ds: &mut DataStructure,
        _args: &Arguments,
        _ctx: &ExecutionContext,
        _messages: &dyn MessageHandler,
        _cancel: &CancelToken,
    ) -> Outcome<()> {
        Outcome::success()
    }

    /// Validate and plan without touching `ds`.
    ///
    /// Every parameter error is reported at once. The planned actions are
    /// dry-run on a metadata copy of `ds`, so a plan that cannot be applied
    /// fails here rather than during execute.
    fn preflight(
        &self,
        ds: &DataStructure,
        args: &Arguments,
        messages: &dyn MessageHandler,
    ) -> Outcome<PreflightResult> {
        let parameters = self.parameters();
        let merged = parameters.merge_defaults(args);
        if let Err(errors) = parameters.validate(&merged, ds) {
            tracing::warn!("{}: {} parameter error(s)", self.human_name(), errors.len());
            return Outcome::from_errors(errors);
        }

        let mut outcome = self.preflight_impl(ds, &merged, messages);
        if !outcome.is_valid() {
            outcome.value = None;
            return outcome;
        }

        if let Some(result) = &outcome.value {
            let mut scratch = ds.metadata_clone();
            let dry_run = result
                .actions
                .apply_all(&mut scratch, Mode::Preflight)
                .context(format!("{} preflight", self.human_name()));
            if let Err(err) = dry_run {
                outcome.push_error(err);
                outcome.value = None;
            }
        }
        outcome
    }

    /// Plan, apply and compute.
    ///
    /// Actions are always re-derived from the current `ds`. Cancellation
    /// yields a valid outcome carrying a [`Warning::CANCELLED`] warning.
    fn execute(
        &self,
        ds: &mut DataStructure,
        args: &Arguments,
        ctx: &ExecutionContext,
        messages: &dyn MessageHandler,
        cancel: &CancelToken,
    ) -> Outcome<()> {
        let preflight = self.preflight(ds, args, messages);
        let mut outcome = Outcome::success();
        outcome.warnings.extend(preflight.warnings);
        if !preflight.errors.is_empty() {
            outcome.errors = preflight.errors;
            outcome.value = None;
            return outcome;
        }
        let Some(plan) = preflight.value else {
            return outcome;
        };

        if cancel.is_cancelled() {
            return outcome.with_warning(Warning::cancelled(self.human_name()));
        }

        if let Err(err) = plan
            .actions
            .apply_all(ds, Mode::Execute)
            .context(format!("{} execute", self.human_name()))
        {
            outcome.push_error(err);
            outcome.value = None;
            return outcome;
        }

        let merged = self.parameters().merge_defaults(args);
        let result = self.execute_impl(ds, &merged, ctx, messages, cancel);
        if !result.is_valid() {
            outcome.value = None;
        }
        outcome.absorb(result);
        outcome
    }
}

impl Clone for Box<dyn Filter> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}
