//! Glimpse Core - Shared vocabulary types
//!
//! Foundation crate for the Glimpse workspace. It carries the types every
//! service crate speaks in:
//!
//! - [`UserId`] - opaque identity keys issued by the external auth provider
//! - [`Timestamp`] - server-assigned millisecond timestamps
//! - [`Viewer`] / [`Session`] - the injected identity context
//! - [`Tuning`] - page-size and debounce knobs
//!
//! This crate has no I/O and no knowledge of the document store; it exists so
//! that `glimpse-store`, `glimpse-social`, `glimpse-chat`, and `glimpse-feed`
//! agree on identity and time without depending on each other.

pub mod id;
pub mod identity;
pub mod time;
pub mod tuning;

pub use id::UserId;
pub use identity::{Session, Viewer};
pub use time::Timestamp;
pub use tuning::Tuning;
