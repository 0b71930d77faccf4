//! Comment documents
//!
//! Comments live in one flat collection filtered by post id, so a post's
//! thread is a single equality query ordered by creation time. Each comment
//! carries the commenter's display name at write time.

use crate::error::FeedError;
use glimpse_core::{Timestamp, UserId, Viewer};
use glimpse_store::{
    Direction, DocumentStore, Fields, Filter, Query, Subscription, WriteMode,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::warn;

/// Top-level comment collection.
pub(crate) const COMMENTS: &str = "comments";

/// A stored comment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    /// Document key.
    #[serde(skip)]
    pub id: String,
    /// The post this comment belongs to.
    pub post_id: String,
    /// Commenter identity.
    pub user_id: UserId,
    /// Commenter display name at write time.
    #[serde(default)]
    pub username: String,
    /// Comment body.
    #[serde(default)]
    pub text: String,
    /// Server-assigned write time.
    pub created_at: Timestamp,
}

fn decode_comment(key: String, doc: glimpse_store::Document) -> Result<Comment, FeedError> {
    let mut comment: Comment = serde_json::from_value(Value::Object(doc))
        .map_err(|err| FeedError::decode("comment", key.clone(), err))?;
    comment.id = key;
    Ok(comment)
}

/// Stateless comment operations.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommentService;

impl CommentService {
    /// Add a comment, returning its key. Blank text is a silent no-op.
    pub async fn add<S>(
        store: &S,
        post_id: &str,
        author: &Viewer,
        text: &str,
    ) -> Result<Option<String>, FeedError>
    where
        S: DocumentStore,
    {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }

        let name = match author.display_name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => "Anonymous",
        };
        let key = store
            .append(
                COMMENTS,
                Fields::new()
                    .set("postId", post_id)
                    .set("userId", author.id.as_str())
                    .set("username", name)
                    .set("text", text)
                    .server_timestamp("createdAt"),
            )
            .await?;
        Ok(Some(key))
    }

    /// Merge-update a comment's text.
    pub async fn edit<S>(store: &S, key: &str, text: &str) -> Result<(), FeedError>
    where
        S: DocumentStore,
    {
        store
            .put(COMMENTS, key, Fields::new().set("text", text), WriteMode::Merge)
            .await?;
        Ok(())
    }

    /// Delete a comment.
    pub async fn remove<S>(store: &S, key: &str) -> Result<(), FeedError>
    where
        S: DocumentStore,
    {
        store.delete(COMMENTS, key).await?;
        Ok(())
    }

    /// A post's comment thread, oldest first.
    pub async fn for_post<S>(store: &S, post_id: &str) -> Result<Vec<Comment>, FeedError>
    where
        S: DocumentStore,
    {
        store
            .query(
                Query::collection(COMMENTS)
                    .filter(Filter::Eq("postId".into(), Value::from(post_id)))
                    .order_by("createdAt", Direction::Asc),
            )
            .await?
            .into_iter()
            .map(|(key, doc)| decode_comment(key, doc))
            .collect()
    }

    /// Watch a post's comment thread.
    pub async fn watch_for_post<S, F>(
        store: &S,
        post_id: &str,
        callback: F,
    ) -> Result<Subscription, FeedError>
    where
        S: DocumentStore,
        F: Fn(Vec<Comment>) + Send + Sync + 'static,
    {
        let query = Query::collection(COMMENTS)
            .filter(Filter::Eq("postId".into(), Value::from(post_id)))
            .order_by("createdAt", Direction::Asc);
        let subscription = store
            .watch(
                query,
                Arc::new(move |rows| {
                    let comments = rows
                        .into_iter()
                        .filter_map(|(key, doc)| match decode_comment(key, doc) {
                            Ok(comment) => Some(comment),
                            Err(error) => {
                                warn!(%error, "dropping undecodable comment");
                                None
                            }
                        })
                        .collect();
                    callback(comments);
                }),
            )
            .await?;
        Ok(subscription)
    }
}
