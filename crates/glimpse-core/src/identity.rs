//! Injected identity context
//!
//! Services take the current viewer explicitly instead of reading a global
//! session singleton. [`Session::Unauthenticated`] replaces the implicit
//! "undefined user" state: callers must match on it rather than passing a
//! maybe-missing id downstream.

use crate::id::UserId;
use serde::{Deserialize, Serialize};

/// Denormalized display snapshot of the signed-in identity.
///
/// Fan-out writes (notifications, chat thread participant cards) copy these
/// values at call time; they do not update if the profile is later edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewer {
    /// The viewer's identity key.
    pub id: UserId,
    /// Display name, if one has been set.
    pub display_name: Option<String>,
    /// Avatar URL, if one has been set.
    pub photo_url: Option<String>,
}

impl Viewer {
    /// A viewer with no display profile yet.
    pub fn bare(id: impl Into<UserId>) -> Self {
        Self {
            id: id.into(),
            display_name: None,
            photo_url: None,
        }
    }

    /// Display name with the fallback used by fan-out writes.
    pub fn display_name_or_anon(&self) -> &str {
        self.display_name.as_deref().unwrap_or("Someone")
    }

    /// Avatar URL, empty string when unset.
    pub fn photo_url_or_empty(&self) -> &str {
        self.photo_url.as_deref().unwrap_or("")
    }
}

/// The authentication state handed to components that need the viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Session {
    /// No signed-in identity.
    Unauthenticated,
    /// A signed-in identity with its display snapshot.
    Authenticated(Viewer),
}

impl Session {
    /// The signed-in viewer, if any.
    pub fn viewer(&self) -> Option<&Viewer> {
        match self {
            Session::Unauthenticated => None,
            Session::Authenticated(viewer) => Some(viewer),
        }
    }

    /// True when a viewer is signed in.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Session::Authenticated(_))
    }
}
