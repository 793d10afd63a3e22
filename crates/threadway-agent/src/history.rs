// SPDX-FileCopyrightText: 2026 Threadway Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Stored messages to model prompt turns.

use threadway_core::ModelMessage;
use threadway_core::types::Message;

/// Map stored messages to model turns, keeping their order.
///
/// Inbound messages become `user` turns, outbound ones `assistant` turns.
pub fn assemble(messages: &[Message]) -> Vec<ModelMessage> {
    messages
        .iter()
        .map(|m| ModelMessage {
            role: m.direction.role(),
            content: m.content.clone(),
        })
        .collect()
}

/// Keep only the most recent `limit` turns. `None` keeps everything.
pub fn window(mut turns: Vec<ModelMessage>, limit: Option<usize>) -> Vec<ModelMessage> {
    if let Some(limit) = limit
        && turns.len() > limit
    {
        turns.drain(..turns.len() - limit);
    }
    turns
}
