//! A filter together with its arguments and lifecycle state.

use crate::error::DataGraphError;
use crate::filter::cancel::CancelToken;
use crate::filter::context::ExecutionContext;
use crate::filter::filter::{Filter, PreflightResult};
use crate::filter::message::MessageHandler;
use crate::outcome::Outcome;
use crate::parameters::Arguments;
use crate::structure::DataStructure;
use std::fmt;

/// Lifecycle of a [`FilterNode`].
///
/// ```text
/// Unexecuted ──preflight──► Preflighted ──execute──► Executed
///      │                         │
///      └──► PreflightFailed      └──► ExecuteFailed
/// ```
///
/// The failed states are sticky until [`FilterNode::set_arguments`] is called.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterState {
    #[default]
    Unexecuted,
    Preflighted,
    Executed,
    PreflightFailed,
    ExecuteFailed,
}

impl FilterState {
    pub fn is_failed(self) -> bool {
        matches!(self, FilterState::PreflightFailed | FilterState::ExecuteFailed)
    }
}

impl fmt::Display for FilterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            FilterState::Unexecuted => "unexecuted",
            FilterState::Preflighted => "preflighted",
            FilterState::Executed => "executed",
            FilterState::PreflightFailed => "preflight failed",
            FilterState::ExecuteFailed => "execute failed",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone)]
pub struct FilterNode {
    filter: Box<dyn Filter>,
    arguments: Arguments,
    state: FilterState,
}

impl FilterNode {
    pub fn new(filter: Box<dyn Filter>) -> Self {
        Self::with_arguments(filter, Arguments::new())
    }

    pub fn with_arguments(filter: Box<dyn Filter>, arguments: Arguments) -> Self {
        Self {
            filter,
            arguments,
            state: FilterState::Unexecuted,
        }
    }

    pub fn filter(&self) -> &dyn Filter {
        self.filter.as_ref()
    }

    pub fn arguments(&self) -> &Arguments {
        &self.arguments
    }

    pub fn state(&self) -> FilterState {
        self.state
    }

    /// Replace the arguments and reset to [`FilterState::Unexecuted`].
    pub fn set_arguments(&mut self, arguments: Arguments) {
        self.arguments = arguments;
        self.state = FilterState::Unexecuted;
    }

    fn check_not_failed(&self) -> Option<DataGraphError> {
        if self.state.is_failed() {
            Some(DataGraphError::InvalidState(format!(
                "{} is in state '{}'; replace its arguments first",
                self.filter.human_name(),
                self.state
            )))
        } else {
            None
        }
    }

    pub fn preflight(&mut self, ds: &DataStructure, messages: &dyn MessageHandler) -> Outcome<PreflightResult> {
        if let Some(err) = self.check_not_failed() {
            return Outcome::from_error(err);
        }
        let outcome = self.filter.preflight(ds, &self.arguments, messages);
        if outcome.is_valid() {
            if self.state != FilterState::Executed {
                self.state = FilterState::Preflighted;
            }
        } else {
            self.state = FilterState::PreflightFailed;
        }
        tracing::info!("{}: {}", self.filter.human_name(), self.state);
        outcome
    }

    /// Preflight then execute against `ds`.
    pub fn execute(
        &mut self,
        ds: &mut DataStructure,
        ctx: &ExecutionContext,
        messages: &dyn MessageHandler,
        cancel: &CancelToken,
    ) -> Outcome<()> {
        let preflight = self.preflight(ds, messages);
        if !preflight.is_valid() {
            return preflight.replace(None);
        }

        let outcome = self.filter.execute(ds, &self.arguments, ctx, messages, cancel);
        self.state = if outcome.is_valid() {
            FilterState::Executed
        } else {
            FilterState::ExecuteFailed
        };
        tracing::info!("{}: {}", self.filter.human_name(), self.state);
        outcome
    }
}
