//! Ordered filter list, run one node at a time.
//!
//! Preflight walks the nodes against a metadata copy of the structure, applying
//! each node's actions in preflight mode so that later nodes can select the
//! placeholders of earlier ones. Execute walks them against the real
//! structure. Both stop at the first failing node; outputs of earlier nodes
//! are kept.

use crate::actions::Mode;
use crate::filter::cancel::CancelToken;
use crate::filter::context::ExecutionContext;
use crate::filter::filter::Filter;
use crate::filter::message::{FilterMessage, MessageHandler};
use crate::filter::node::FilterNode;
use crate::outcome::{Outcome, Warning};
use crate::parameters::Arguments;
use crate::structure::DataStructure;

/// How far a pipeline run got.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PipelineReport {
    /// Nodes that finished successfully.
    pub completed: usize,
    /// Index of the node that failed, if any.
    pub failed_at: Option<usize>,
    pub cancelled: bool,
}

impl PipelineReport {
    pub fn is_complete(&self, len: usize) -> bool {
        self.completed == len && self.failed_at.is_none() && !self.cancelled
    }
}

#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    name: String,
    nodes: Vec<FilterNode>,
}

impl Pipeline {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            nodes: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn push(&mut self, node: FilterNode) {
        self.nodes.push(node);
    }

    /// Append a filter with its arguments.
    pub fn push_filter(&mut self, filter: Box<dyn Filter>, arguments: Arguments) {
        self.nodes.push(FilterNode::with_arguments(filter, arguments));
    }

    pub fn nodes(&self) -> &[FilterNode] {
        &self.nodes
    }

    pub fn node_mut(&mut self, index: usize) -> Option<&mut FilterNode> {
        self.nodes.get_mut(index)
    }

    pub fn remove(&mut self, index: usize) -> Option<FilterNode> {
        (index < self.nodes.len()).then(|| self.nodes.remove(index))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Validate every node in order without touching `ds`.
    pub fn preflight(&mut self, ds: &DataStructure, messages: &dyn MessageHandler) -> Outcome<PipelineReport> {
        let mut scratch = ds.metadata_clone();
        let mut report = PipelineReport::default();
        let mut outcome = Outcome::ok(report);

        for (index, node) in self.nodes.iter_mut().enumerate() {
            let result = node.preflight(&scratch, messages);
            let plan = match (result.is_valid(), &result.value) {
                (true, Some(plan)) => Some(plan.actions.clone()),
                _ => None,
            };
            outcome.absorb(result);
            let applied = plan
                .map(|actions| actions.apply_all(&mut scratch, Mode::Preflight))
                .unwrap_or(Ok(()));
            if let Err(err) = applied {
                outcome.push_error(err);
            }
            if !outcome.is_valid() {
                tracing::warn!(
                    "Pipeline '{}' preflight stopped at node {} ({})",
                    self.name,
                    index,
                    node.filter().human_name()
                );
                report.failed_at = Some(index);
                break;
            }
            report.completed += 1;
        }

        outcome.value = Some(report);
        outcome
    }

    /// Execute every node in order against `ds`.
    ///
    /// Stops at the first failure or when `cancel` is set. Nothing is rolled
    /// back.
    pub fn execute(
        &mut self,
        ds: &mut DataStructure,
        ctx: &ExecutionContext,
        messages: &dyn MessageHandler,
        cancel: &CancelToken,
    ) -> Outcome<PipelineReport> {
        let total = self.nodes.len() as u64;
        let mut report = PipelineReport::default();
        let mut outcome = Outcome::ok(report);
        tracing::info!("Pipeline '{}': executing {} node(s)", self.name, total);

        for (index, node) in self.nodes.iter_mut().enumerate() {
            if cancel.is_cancelled() {
                outcome.push_warning(Warning::cancelled(&format!("pipeline '{}'", self.name)));
                report.cancelled = true;
                break;
            }

            let result = node.execute(ds, ctx, messages, cancel);
            let cancelled = result.was_cancelled();
            outcome.absorb(result);
            if !outcome.is_valid() {
                tracing::warn!(
                    "Pipeline '{}' stopped at node {} ({})",
                    self.name,
                    index,
                    node.filter().human_name()
                );
                report.failed_at = Some(index);
                break;
            }
            if cancelled {
                report.cancelled = true;
                break;
            }
            report.completed += 1;
            messages.send(FilterMessage::progress(report.completed as u64, total));
        }

        tracing::info!(
            "Pipeline '{}': {}/{} node(s) completed",
            self.name,
            report.completed,
            total
        );
        outcome.value = Some(report);
        outcome
    }
}
