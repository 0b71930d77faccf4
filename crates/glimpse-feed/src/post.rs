//! Post documents
//!
//! A post is a photo plus caption, stamped with the author's display
//! snapshot at share time. Likes live on the post as an array of liker ids;
//! both directions of the toggle are single merge-writes using array
//! transforms, so they are idempotent and safe under concurrent likers.

use crate::error::FeedError;
use glimpse_core::{Timestamp, UserId, Viewer};
use glimpse_store::{
    BlobStore, Direction, DocumentStore, Fields, Filter, Query, WriteMode,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

/// Top-level post collection.
pub(crate) const POSTS: &str = "posts";

/// A stored post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Document key.
    #[serde(skip)]
    pub id: String,
    /// Caption text, possibly empty.
    #[serde(default)]
    pub caption: String,
    /// URL of the photo.
    pub post_image: String,
    /// Author identity.
    pub user_id: UserId,
    /// Author display name at share time.
    #[serde(default)]
    pub username: String,
    /// Author avatar URL at share time.
    #[serde(default)]
    pub user_image: String,
    /// Server-assigned share time.
    pub created_at: Timestamp,
    /// Ids of users who liked this post.
    #[serde(default)]
    pub likes: Vec<UserId>,
}

impl Post {
    /// Whether `user` has liked this post.
    pub fn liked_by(&self, user: &UserId) -> bool {
        self.likes.contains(user)
    }

    /// Number of likes.
    pub fn like_count(&self) -> usize {
        self.likes.len()
    }
}

pub(crate) fn decode_post(key: String, doc: glimpse_store::Document) -> Result<Post, FeedError> {
    let mut post: Post = serde_json::from_value(Value::Object(doc))
        .map_err(|err| FeedError::decode("post", key.clone(), err))?;
    post.id = key;
    Ok(post)
}

/// Stateless post operations.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostService;

impl PostService {
    /// Upload the photo, then create the post document. A post without a
    /// photo is rejected before anything is written.
    pub async fn create<S, B>(
        store: &S,
        blobs: &B,
        author: &Viewer,
        caption: &str,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<String, FeedError>
    where
        S: DocumentStore,
        B: BlobStore,
    {
        if bytes.is_empty() || filename.trim().is_empty() {
            return Err(FeedError::MissingImage);
        }

        let path = format!(
            "posts/{}/{}_{filename}",
            author.id,
            Uuid::new_v4().simple()
        );
        let url = blobs.upload(&path, bytes).await?;

        let key = store
            .append(
                POSTS,
                Fields::new()
                    .set("caption", caption)
                    .set("postImage", url)
                    .set("userId", author.id.as_str())
                    .set("username", post_author_name(author))
                    .set("userImage", author.photo_url_or_empty())
                    .server_timestamp("createdAt")
                    .set("likes", json!([])),
            )
            .await?;
        debug!(%key, author = %author.id, "post shared");
        Ok(key)
    }

    /// Merge-update the caption.
    pub async fn edit_caption<S>(store: &S, key: &str, caption: &str) -> Result<(), FeedError>
    where
        S: DocumentStore,
    {
        store
            .put(
                POSTS,
                key,
                Fields::new().set("caption", caption),
                WriteMode::Merge,
            )
            .await?;
        Ok(())
    }

    /// Delete a post. Comments reference it by id and are not cleaned up.
    pub async fn delete<S>(store: &S, key: &str) -> Result<(), FeedError>
    where
        S: DocumentStore,
    {
        store.delete(POSTS, key).await?;
        Ok(())
    }

    /// Flip `user`'s like on a post.
    ///
    /// `has_liked` is the caller's view from the last snapshot; the write is
    /// an array transform either way, so repeating it is harmless.
    pub async fn toggle_like<S>(
        store: &S,
        key: &str,
        user: &UserId,
        has_liked: bool,
    ) -> Result<(), FeedError>
    where
        S: DocumentStore,
    {
        let value = vec![Value::from(user.as_str())];
        let fields = if has_liked {
            Fields::new().array_remove("likes", value)
        } else {
            Fields::new().array_union("likes", value)
        };
        store.put(POSTS, key, fields, WriteMode::Merge).await?;
        Ok(())
    }

    /// Fetch one post, `None` when deleted or never shared.
    pub async fn load<S>(store: &S, key: &str) -> Result<Option<Post>, FeedError>
    where
        S: DocumentStore,
    {
        let Some(doc) = store.get(POSTS, key).await? else {
            return Ok(None);
        };
        decode_post(key.to_string(), doc).map(Some)
    }

    /// All of an author's posts, newest first - the profile grid.
    pub async fn posts_by<S>(store: &S, author: &UserId) -> Result<Vec<Post>, FeedError>
    where
        S: DocumentStore,
    {
        store
            .query(
                Query::collection(POSTS)
                    .filter(Filter::Eq("userId".into(), Value::from(author.as_str())))
                    .order_by("createdAt", Direction::Desc),
            )
            .await?
            .into_iter()
            .map(|(key, doc)| decode_post(key, doc))
            .collect()
    }
}

fn post_author_name(author: &Viewer) -> &str {
    match author.display_name.as_deref() {
        Some(name) if !name.is_empty() => name,
        _ => "User",
    }
}
