//! Mock construction helpers

use datagraph_rs::filter::{ChannelMessageHandler, FilterMessage};
use crossbeam_channel::Receiver;

/// Message handler plus the receiving end, for asserting on progress
pub fn create_test_handler() -> (ChannelMessageHandler, Receiver<FilterMessage>) {
    ChannelMessageHandler::new()
}

/// Drain every message currently queued
pub fn drain(rx: &Receiver<FilterMessage>) -> Vec<FilterMessage> {
    rx.try_iter().collect()
}
