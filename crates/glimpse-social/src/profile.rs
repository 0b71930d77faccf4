//! Profile documents
//!
//! One document per identity under `users/{uid}`, created at sign-up and
//! merge-edited afterwards. Display names are duplicated in lowercase to
//! support case-insensitive indexing; search itself runs a prefix range on
//! the display name, bounded with the `\u{f8ff}` sentinel the backend uses
//! for "every string starting with this prefix".

use crate::error::SocialError;
use crate::paths;
use glimpse_core::{Timestamp, Tuning, UserId, Viewer};
use glimpse_store::{Direction, DocumentStore, Fields, Filter, Query, WriteMode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A stored user profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Identity key, also the document key.
    pub uid: UserId,
    /// Chosen display name.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Lowercased copy of the display name.
    #[serde(default)]
    pub display_name_lower: Option<String>,
    /// Sign-up email.
    #[serde(default)]
    pub email: Option<String>,
    /// Avatar URL; empty string until one is uploaded.
    #[serde(default, rename = "photoURL")]
    pub photo_url: Option<String>,
    /// Free-form bio.
    #[serde(default)]
    pub bio: Option<String>,
    /// Server-assigned creation time.
    #[serde(default)]
    pub created_at: Timestamp,
}

impl Profile {
    /// Display name with the placeholder used wherever a profile is shown.
    pub fn display_name_or_user(&self) -> &str {
        match self.display_name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => "User",
        }
    }

    /// Denormalized display snapshot for fan-out writes.
    pub fn snapshot(&self) -> Viewer {
        Viewer {
            id: self.uid.clone(),
            display_name: self.display_name.clone(),
            photo_url: self.photo_url.clone(),
        }
    }
}

/// Fields a profile edit may change. `None` leaves the stored value alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileChanges {
    /// New display name.
    pub display_name: Option<String>,
    /// New bio text.
    pub bio: Option<String>,
    /// New avatar URL; an edit without a new upload keeps the prior one.
    pub photo_url: Option<String>,
}

/// Stateless profile operations.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProfileService;

impl ProfileService {
    /// Create the profile document at sign-up.
    ///
    /// Replace-write: sign-up owns the document shape. Photo and bio start
    /// empty; the caller flips its session to authenticated only after this
    /// succeeds, which is what keeps "profile not found" from greeting a
    /// fresh account.
    pub async fn register<S>(
        store: &S,
        id: &UserId,
        display_name: &str,
        email: &str,
    ) -> Result<(), SocialError>
    where
        S: DocumentStore,
    {
        store
            .put(
                paths::USERS,
                id.as_str(),
                Fields::new()
                    .set("uid", id.as_str())
                    .set("displayName", display_name)
                    .set("displayNameLower", display_name.to_lowercase())
                    .set("email", email)
                    .set("photoURL", "")
                    .set("bio", "")
                    .server_timestamp("createdAt"),
                WriteMode::Replace,
            )
            .await?;
        Ok(())
    }

    /// Merge-edit the profile; only provided fields are written.
    pub async fn edit<S>(store: &S, id: &UserId, changes: ProfileChanges) -> Result<(), SocialError>
    where
        S: DocumentStore,
    {
        let mut fields = Fields::new();
        if let Some(name) = &changes.display_name {
            fields = fields
                .set("displayName", name.as_str())
                .set("displayNameLower", name.to_lowercase());
        }
        if let Some(bio) = &changes.bio {
            fields = fields.set("bio", bio.as_str());
        }
        if let Some(url) = &changes.photo_url {
            fields = fields.set("photoURL", url.as_str());
        }
        if fields.is_empty() {
            return Ok(());
        }

        store
            .put(paths::USERS, id.as_str(), fields, WriteMode::Merge)
            .await?;
        Ok(())
    }

    /// Fetch a profile, `None` when the identity has no document.
    pub async fn load<S>(store: &S, id: &UserId) -> Result<Option<Profile>, SocialError>
    where
        S: DocumentStore,
    {
        let Some(doc) = store.get(paths::USERS, id.as_str()).await? else {
            return Ok(None);
        };
        let profile = serde_json::from_value(Value::Object(doc))
            .map_err(|err| SocialError::decode("profile", id.as_str(), err))?;
        Ok(Some(profile))
    }

    /// Display snapshot for an identity, with placeholders when the profile
    /// document is missing.
    pub async fn snapshot_of<S>(store: &S, id: &UserId) -> Result<Viewer, SocialError>
    where
        S: DocumentStore,
    {
        Ok(Self::load(store, id)
            .await?
            .map(|profile| profile.snapshot())
            .unwrap_or_else(|| Viewer::bare(id.clone())))
    }

    /// Prefix search on display names. An empty term returns no results
    /// without touching the store.
    pub async fn search<S>(
        store: &S,
        term: &str,
        tuning: &Tuning,
    ) -> Result<Vec<Profile>, SocialError>
    where
        S: DocumentStore,
    {
        let term = term.trim();
        if term.is_empty() {
            return Ok(Vec::new());
        }

        let rows = store
            .query(
                Query::collection(paths::USERS)
                    .filter(Filter::Gte("displayName".into(), Value::from(term)))
                    .filter(Filter::Lte(
                        "displayName".into(),
                        Value::from(format!("{term}\u{f8ff}")),
                    ))
                    .order_by("displayName", Direction::Asc)
                    .limit(tuning.search_page),
            )
            .await?;
        decode_profiles(rows)
    }

    /// A page of identities other than the viewer, for the suggestions rail.
    pub async fn suggestions<S>(
        store: &S,
        viewer: &UserId,
        tuning: &Tuning,
    ) -> Result<Vec<Profile>, SocialError>
    where
        S: DocumentStore,
    {
        let rows = store
            .query(
                Query::collection(paths::USERS)
                    .filter(Filter::NotEq("uid".into(), Value::from(viewer.as_str())))
                    .limit(tuning.suggestion_page),
            )
            .await?;
        decode_profiles(rows)
    }

    /// Size of `user`'s followers mirror set.
    pub async fn follower_count<S>(store: &S, user: &UserId) -> Result<usize, SocialError>
    where
        S: DocumentStore,
    {
        Ok(store.count(&paths::followers(user)).await?)
    }

    /// Size of `user`'s following mirror set.
    pub async fn following_count<S>(store: &S, user: &UserId) -> Result<usize, SocialError>
    where
        S: DocumentStore,
    {
        Ok(store.count(&paths::following(user)).await?)
    }
}

fn decode_profiles(
    rows: Vec<(String, glimpse_store::Document)>,
) -> Result<Vec<Profile>, SocialError> {
    rows.into_iter()
        .map(|(key, doc)| {
            serde_json::from_value(Value::Object(doc))
                .map_err(|err| SocialError::decode("profile", key, err))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use glimpse_store::MemoryStore;

    async fn seed(store: &MemoryStore, id: &str, name: &str) {
        ProfileService::register(store, &UserId::new(id), name, &format!("{id}@example.com"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn register_then_load() {
        let store = MemoryStore::new();
        seed(&store, "u1", "alice").await;

        let profile = ProfileService::load(&store, &UserId::new("u1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(profile.uid.as_str(), "u1");
        assert_eq!(profile.display_name_or_user(), "alice");
        assert_eq!(profile.display_name_lower.as_deref(), Some("alice"));
        assert_eq!(profile.photo_url.as_deref(), Some(""));
        assert!(profile.created_at.millis() > 0);
    }

    #[tokio::test]
    async fn missing_profile_yields_bare_snapshot() {
        let store = MemoryStore::new();
        let snapshot = ProfileService::snapshot_of(&store, &UserId::new("ghost"))
            .await
            .unwrap();
        assert_eq!(snapshot.display_name_or_anon(), "Someone");
    }

    #[tokio::test]
    async fn edit_merges_and_preserves_unnamed_fields() {
        let store = MemoryStore::new();
        seed(&store, "u1", "alice").await;

        ProfileService::edit(
            &store,
            &UserId::new("u1"),
            ProfileChanges {
                bio: Some("hello".into()),
                ..ProfileChanges::default()
            },
        )
        .await
        .unwrap();

        let profile = ProfileService::load(&store, &UserId::new("u1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(profile.bio.as_deref(), Some("hello"));
        // Untouched by the merge.
        assert_eq!(profile.display_name.as_deref(), Some("alice"));
        assert_eq!(profile.email.as_deref(), Some("u1@example.com"));
    }

    #[tokio::test]
    async fn rename_updates_lowercase_copy() {
        let store = MemoryStore::new();
        seed(&store, "u1", "alice").await;

        ProfileService::edit(
            &store,
            &UserId::new("u1"),
            ProfileChanges {
                display_name: Some("Bob".into()),
                ..ProfileChanges::default()
            },
        )
        .await
        .unwrap();

        let profile = ProfileService::load(&store, &UserId::new("u1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(profile.display_name.as_deref(), Some("Bob"));
        assert_eq!(profile.display_name_lower.as_deref(), Some("bob"));
    }

    #[tokio::test]
    async fn search_is_prefix_bounded_and_paged() {
        let store = MemoryStore::new();
        seed(&store, "u1", "alice").await;
        seed(&store, "u2", "alina").await;
        seed(&store, "u3", "bob").await;

        let tuning = Tuning::default();
        let hits = ProfileService::search(&store, "al", &tuning).await.unwrap();
        let names: Vec<_> = hits
            .iter()
            .filter_map(|p| p.display_name.as_deref())
            .collect();
        assert_eq!(names, vec!["alice", "alina"]);

        assert!(ProfileService::search(&store, "  ", &tuning)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn suggestions_exclude_the_viewer() {
        let store = MemoryStore::new();
        seed(&store, "u1", "alice").await;
        seed(&store, "u2", "bob").await;

        let hits = ProfileService::suggestions(&store, &UserId::new("u1"), &Tuning::default())
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].uid.as_str(), "u2");
    }
}
