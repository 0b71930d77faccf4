//! Glimpse Chat - Direct messages
//!
//! Every unordered pair of identities shares exactly one thread, keyed by
//! [`ThreadId::for_pair`] - the lexicographic join of the two keys. Either
//! participant can open the thread from anywhere in the app and land on the
//! same document, because the upsert is a merge-write that preserves what the
//! other side already wrote.
//!
//! Messages are append-only documents under the thread, with the thread
//! document carrying a denormalized `lastMessage`/`updatedAt` summary for the
//! inbox list. [`bubbles::group_by_sender`] implements the presentation rule
//! for collapsing consecutive messages from one sender.

pub mod bubbles;
pub mod error;
pub mod model;
pub mod service;
pub mod thread;

pub use bubbles::{group_by_sender, Bubble};
pub use error::ChatError;
pub use model::{Message, ParticipantCard, Thread};
pub use service::ChatService;
pub use thread::ThreadId;
