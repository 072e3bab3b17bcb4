//! Two-phase filter protocol: the [`Filter`] contract, per-filter state
//! ([`FilterNode`]) and ordered execution ([`Pipeline`]).

pub mod cancel;
pub mod context;
#[allow(clippy::module_inception)]
pub mod filter;
pub mod message;
pub mod node;
pub mod pipeline;

pub use cancel::CancelToken;
pub use context::ExecutionContext;
pub use filter::{Filter, PreflightResult, PreflightValue};
pub use message::{ChannelMessageHandler, FilterMessage, MessageHandler, TracingMessageHandler};
pub use node::{FilterNode, FilterState};
pub use pipeline::{Pipeline, PipelineReport};
