//! Thread and message models

use glimpse_core::{Timestamp, UserId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Denormalized name/image card for one thread participant.
///
/// Written when the thread is opened; a later profile edit does not refresh
/// it until that participant re-opens the thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantCard {
    /// Display name at open time.
    pub name: String,
    /// Avatar URL at open time, empty when unset.
    #[serde(default)]
    pub image: String,
}

/// A chat thread document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thread {
    /// Canonical thread id (the document key).
    #[serde(skip)]
    pub id: String,
    /// Both participant ids.
    pub participants: Vec<UserId>,
    /// Preview of the most recent message.
    #[serde(default)]
    pub last_message: Option<String>,
    /// Server-assigned time of the last open or send.
    #[serde(default)]
    pub updated_at: Timestamp,
    /// Participant display cards, keyed by raw user id.
    #[serde(default)]
    pub users: BTreeMap<String, ParticipantCard>,
}

impl Thread {
    /// The participant who is not `me`, with their card when present.
    pub fn other_participant(&self, me: &UserId) -> Option<(&UserId, Option<&ParticipantCard>)> {
        let other = self.participants.iter().find(|id| *id != me)?;
        Some((other, self.users.get(other.as_str())))
    }
}

/// A single chat message document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Document key within the thread's message collection.
    #[serde(skip)]
    pub id: String,
    /// Who sent it.
    pub sender_id: UserId,
    /// Message text; empty for image-only messages.
    #[serde(default)]
    pub text: String,
    /// Attached image URL, if any.
    #[serde(default)]
    pub image_url: Option<String>,
    /// Server-assigned send time.
    pub created_at: Timestamp,
    /// Server-assigned edit time; absent until the message is edited.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
}
