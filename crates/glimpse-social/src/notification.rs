//! Notification inbox
//!
//! Append-only records delivered to a recipient's own namespace when someone
//! acts on them. The `read` flag is flipped to true exactly once, by the
//! recipient's client on first display; nothing here ever deletes a
//! notification.

use crate::error::SocialError;
use crate::paths;
use glimpse_core::{Timestamp, Tuning, UserId};
use glimpse_store::{
    Direction, DocumentStore, Fields, Query, Subscription, WriteMode,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// The closed set of actions that produce a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    /// Someone started following the recipient.
    Follow,
    /// Someone liked the recipient's post.
    Like,
    /// Someone commented on the recipient's post.
    Comment,
}

/// One inbox entry.
///
/// The `from*` fields are a denormalized copy of the actor's display
/// identity at the time of the action, not a live reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// Document key within the recipient's inbox.
    #[serde(skip)]
    pub id: String,
    /// What happened.
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    /// Who did it.
    pub from_user_id: UserId,
    /// Actor display name as of the action.
    #[serde(default)]
    pub from_username: String,
    /// Actor avatar URL as of the action.
    #[serde(default)]
    pub from_user_image: String,
    /// Flipped once by the recipient on first display.
    pub read: bool,
    /// Server-assigned creation time.
    pub created_at: Timestamp,
    /// Comment excerpt, for comment notifications.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Target post, for like/comment notifications.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_id: Option<String>,
    /// Target post thumbnail, for like/comment notifications.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_image: Option<String>,
}

impl Notification {
    fn from_row(key: String, doc: glimpse_store::Document) -> Result<Self, SocialError> {
        let mut notification: Notification = serde_json::from_value(Value::Object(doc))
            .map_err(|err| SocialError::decode("notification", key.clone(), err))?;
        notification.id = key;
        Ok(notification)
    }
}

/// Stateless inbox operations.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotificationService;

impl NotificationService {
    /// The recipient's inbox, newest first.
    pub async fn inbox<S>(
        store: &S,
        user: &UserId,
        limit: Option<usize>,
    ) -> Result<Vec<Notification>, SocialError>
    where
        S: DocumentStore,
    {
        let mut query = Query::collection(paths::notifications(user))
            .order_by("createdAt", Direction::Desc);
        if let Some(limit) = limit {
            query = query.limit(limit);
        }

        store
            .query(query)
            .await?
            .into_iter()
            .map(|(key, doc)| Notification::from_row(key, doc))
            .collect()
    }

    /// Watch the dropdown page of the inbox.
    ///
    /// The callback receives the full decoded page on subscribe and after
    /// every inbox write. Rows that fail to decode are logged and dropped
    /// from the delivered page rather than killing the watch.
    pub async fn watch_inbox<S, F>(
        store: &S,
        user: &UserId,
        tuning: &Tuning,
        callback: F,
    ) -> Result<Subscription, SocialError>
    where
        S: DocumentStore,
        F: Fn(Vec<Notification>) + Send + Sync + 'static,
    {
        let query = Query::collection(paths::notifications(user))
            .order_by("createdAt", Direction::Desc)
            .limit(tuning.inbox_dropdown_page);

        let subscription = store
            .watch(
                query,
                std::sync::Arc::new(move |rows| {
                    let page = rows
                        .into_iter()
                        .filter_map(|(key, doc)| match Notification::from_row(key, doc) {
                            Ok(notification) => Some(notification),
                            Err(error) => {
                                warn!(%error, "dropping undecodable notification");
                                None
                            }
                        })
                        .collect();
                    callback(page);
                }),
            )
            .await?;
        Ok(subscription)
    }

    /// Mark one notification as read.
    pub async fn mark_read<S>(store: &S, user: &UserId, key: &str) -> Result<(), SocialError>
    where
        S: DocumentStore,
    {
        store
            .put(
                &paths::notifications(user),
                key,
                Fields::new().set("read", true),
                WriteMode::Merge,
            )
            .await?;
        Ok(())
    }

    /// Mark every unread notification as read, returning how many flipped.
    ///
    /// The unread filter runs client-side over the snapshot, one merge-write
    /// per document - the recipient is the only writer of this flag so the
    /// lack of batching is harmless.
    pub async fn mark_all_read<S>(store: &S, user: &UserId) -> Result<usize, SocialError>
    where
        S: DocumentStore,
    {
        let rows = store
            .query(Query::collection(paths::notifications(user)))
            .await?;

        let mut flipped = 0;
        for (key, doc) in rows {
            let unread = doc.get("read") == Some(&Value::Bool(false));
            if unread {
                Self::mark_read(store, user, &key).await?;
                flipped += 1;
            }
        }
        Ok(flipped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glimpse_store::MemoryStore;
    use parking_lot::Mutex;
    use std::sync::Arc;

    async fn push(store: &MemoryStore, user: &str, from: &str) -> String {
        store
            .append(
                &paths::notifications(&UserId::new(user)),
                Fields::new()
                    .set("type", "follow")
                    .set("fromUserId", from)
                    .set("fromUsername", format!("{from}-name"))
                    .set("fromUserImage", "")
                    .set("read", false)
                    .server_timestamp("createdAt"),
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn inbox_is_newest_first() {
        let store = MemoryStore::new();
        push(&store, "u2", "u1").await;
        push(&store, "u2", "u3").await;

        let inbox = NotificationService::inbox(&store, &UserId::new("u2"), None)
            .await
            .unwrap();
        assert_eq!(inbox.len(), 2);
        assert_eq!(inbox[0].from_user_id.as_str(), "u3");
        assert_eq!(inbox[1].from_user_id.as_str(), "u1");
        assert!(inbox.iter().all(|n| n.kind == NotificationKind::Follow));
        assert!(inbox.iter().all(|n| !n.read));
    }

    #[tokio::test]
    async fn mark_all_read_flips_each_once() {
        let store = MemoryStore::new();
        let user = UserId::new("u2");
        push(&store, "u2", "u1").await;
        push(&store, "u2", "u3").await;

        let flipped = NotificationService::mark_all_read(&store, &user)
            .await
            .unwrap();
        assert_eq!(flipped, 2);

        // Second pass finds nothing unread.
        let flipped = NotificationService::mark_all_read(&store, &user)
            .await
            .unwrap();
        assert_eq!(flipped, 0);

        let inbox = NotificationService::inbox(&store, &user, None).await.unwrap();
        assert!(inbox.iter().all(|n| n.read));
    }

    #[tokio::test]
    async fn watch_inbox_delivers_decoded_pages() {
        let store = MemoryStore::new();
        let user = UserId::new("u2");
        let seen: Arc<Mutex<Vec<usize>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        let _sub = NotificationService::watch_inbox(
            &store,
            &user,
            &Tuning::default(),
            move |page| sink.lock().push(page.len()),
        )
        .await
        .unwrap();

        push(&store, "u2", "u1").await;
        assert_eq!(*seen.lock(), vec![0, 1]);
    }

    #[tokio::test]
    async fn kind_round_trips_lowercase() {
        let json = serde_json::to_string(&NotificationKind::Follow).unwrap();
        assert_eq!(json, "\"follow\"");
        let back: NotificationKind = serde_json::from_str("\"comment\"").unwrap();
        assert_eq!(back, NotificationKind::Comment);
    }
}
