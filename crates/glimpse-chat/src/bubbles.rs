//! Bubble grouping
//!
//! Consecutive messages from one sender render as a single bubble block;
//! only the last message of a block shows the avatar and timestamp. The
//! grouping itself is a pure function over the ordered history so it can be
//! tested without any rendering.

use crate::model::Message;
use glimpse_core::UserId;

/// A run of consecutive messages from one sender.
#[derive(Debug, Clone, PartialEq)]
pub struct Bubble {
    /// Sender of every message in this run.
    pub sender_id: UserId,
    /// The run, in send order.
    pub messages: Vec<Message>,
}

impl Bubble {
    /// The message that carries the avatar and timestamp.
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }
}

/// Group an ordered history into sender runs.
pub fn group_by_sender(messages: &[Message]) -> Vec<Bubble> {
    let mut bubbles: Vec<Bubble> = Vec::new();
    for message in messages {
        match bubbles.last_mut() {
            Some(bubble) if bubble.sender_id == message.sender_id => {
                bubble.messages.push(message.clone());
            }
            _ => bubbles.push(Bubble {
                sender_id: message.sender_id.clone(),
                messages: vec![message.clone()],
            }),
        }
    }
    bubbles
}
