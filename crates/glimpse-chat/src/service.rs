//! Chat operations
//!
//! Stateless handler over the document store. Thread documents live in the
//! `chats` collection keyed by canonical pair id; messages live under
//! `chats/{id}/messages` with generated keys. Sending is two independent
//! writes - the message append, then the thread summary merge - awaited in
//! order with no transaction across them.

use crate::error::ChatError;
use crate::model::{Message, Thread};
use crate::thread::ThreadId;
use glimpse_core::{UserId, Viewer};
use glimpse_store::{
    BlobStore, Direction, DocumentStore, Fields, Filter, Query, Subscription, WriteMode,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Top-level thread collection.
const CHATS: &str = "chats";

/// Inbox preview used for image messages.
const PHOTO_PREVIEW: &str = "\u{1f4f7} Photo";

fn messages_path(thread: &ThreadId) -> String {
    format!("chats/{thread}/messages")
}

fn card(name: Option<&str>, image: Option<&str>) -> Value {
    json!({
        "name": match name {
            Some(name) if !name.is_empty() => name,
            _ => "User",
        },
        "image": image.unwrap_or(""),
    })
}

/// Stateless chat operations.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChatService;

impl ChatService {
    /// Open (or refresh) the thread between `me` and `other`.
    ///
    /// Derives the canonical id and merge-upserts the thread document with
    /// both participant cards and a fresh `updatedAt`. The merge preserves
    /// `lastMessage` from earlier sends no matter which side re-opens.
    /// Self-pairs and blank ids are a silent no-op (`None`).
    pub async fn open_thread<S>(
        store: &S,
        me: &Viewer,
        other: &Viewer,
    ) -> Result<Option<ThreadId>, ChatError>
    where
        S: DocumentStore,
    {
        let Some(thread) = ThreadId::for_pair(&me.id, &other.id) else {
            return Ok(None);
        };

        let mut cards = serde_json::Map::new();
        cards.insert(
            me.id.to_string(),
            card(me.display_name.as_deref(), me.photo_url.as_deref()),
        );
        cards.insert(
            other.id.to_string(),
            card(other.display_name.as_deref(), other.photo_url.as_deref()),
        );

        store
            .put(
                CHATS,
                thread.as_str(),
                Fields::new()
                    .set(
                        "participants",
                        json!([me.id.as_str(), other.id.as_str()]),
                    )
                    .server_timestamp("updatedAt")
                    .set("users", Value::Object(cards)),
                WriteMode::Merge,
            )
            .await?;

        debug!(%thread, "thread opened");
        Ok(Some(thread))
    }

    /// Send a message, returning its generated key.
    ///
    /// Blank text with no image is a silent no-op. The thread summary is
    /// updated after the message commits; a failure between the two writes
    /// leaves the summary stale until the next successful send.
    pub async fn send<S>(
        store: &S,
        thread: &ThreadId,
        sender: &UserId,
        text: &str,
        image_url: Option<&str>,
    ) -> Result<Option<String>, ChatError>
    where
        S: DocumentStore,
    {
        let text = text.trim();
        if text.is_empty() && image_url.is_none() {
            return Ok(None);
        }

        let key = store
            .append(
                &messages_path(thread),
                Fields::new()
                    .set("senderId", sender.as_str())
                    .set("text", text)
                    .set("imageUrl", image_url.map(Value::from).unwrap_or(Value::Null))
                    .server_timestamp("createdAt"),
            )
            .await?;

        let preview = if image_url.is_some() {
            PHOTO_PREVIEW
        } else {
            text
        };
        store
            .put(
                CHATS,
                thread.as_str(),
                Fields::new()
                    .set("lastMessage", preview)
                    .server_timestamp("updatedAt"),
                WriteMode::Merge,
            )
            .await?;

        Ok(Some(key))
    }

    /// Upload an attachment, then send a message carrying its URL.
    pub async fn send_with_image<S, B>(
        store: &S,
        blobs: &B,
        thread: &ThreadId,
        sender: &UserId,
        text: &str,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<Option<String>, ChatError>
    where
        S: DocumentStore,
        B: BlobStore,
    {
        let path = format!(
            "chats/{thread}/{}_{filename}",
            Uuid::new_v4().simple()
        );
        let url = blobs.upload(&path, bytes).await?;
        Self::send(store, thread, sender, text, Some(&url)).await
    }

    /// Replace a message's text, stamping the edit time.
    pub async fn edit<S>(
        store: &S,
        thread: &ThreadId,
        message_key: &str,
        text: &str,
    ) -> Result<(), ChatError>
    where
        S: DocumentStore,
    {
        store
            .put(
                &messages_path(thread),
                message_key,
                Fields::new()
                    .set("text", text)
                    .server_timestamp("updatedAt"),
                WriteMode::Merge,
            )
            .await?;
        Ok(())
    }

    /// Delete a message. The thread's `lastMessage` preview is not
    /// recomputed.
    pub async fn remove<S>(
        store: &S,
        thread: &ThreadId,
        message_key: &str,
    ) -> Result<(), ChatError>
    where
        S: DocumentStore,
    {
        store.delete(&messages_path(thread), message_key).await?;
        Ok(())
    }

    /// Full message history, oldest first.
    pub async fn history<S>(store: &S, thread: &ThreadId) -> Result<Vec<Message>, ChatError>
    where
        S: DocumentStore,
    {
        store
            .query(
                Query::collection(messages_path(thread)).order_by("createdAt", Direction::Asc),
            )
            .await?
            .into_iter()
            .map(|(key, doc)| decode_message(key, doc))
            .collect()
    }

    /// Watch the message history; the callback receives the full ordered
    /// history on subscribe and after every write to the thread's messages.
    pub async fn watch_history<S, F>(
        store: &S,
        thread: &ThreadId,
        callback: F,
    ) -> Result<Subscription, ChatError>
    where
        S: DocumentStore,
        F: Fn(Vec<Message>) + Send + Sync + 'static,
    {
        let query =
            Query::collection(messages_path(thread)).order_by("createdAt", Direction::Asc);
        let subscription = store
            .watch(
                query,
                Arc::new(move |rows| {
                    let messages = rows
                        .into_iter()
                        .filter_map(|(key, doc)| match decode_message(key, doc) {
                            Ok(message) => Some(message),
                            Err(error) => {
                                warn!(%error, "dropping undecodable message");
                                None
                            }
                        })
                        .collect();
                    callback(messages);
                }),
            )
            .await?;
        Ok(subscription)
    }

    /// Threads `user` participates in, most recently active first.
    pub async fn threads_for<S>(store: &S, user: &UserId) -> Result<Vec<Thread>, ChatError>
    where
        S: DocumentStore,
    {
        store
            .query(
                Query::collection(CHATS)
                    .filter(Filter::ArrayContains(
                        "participants".into(),
                        Value::from(user.as_str()),
                    ))
                    .order_by("updatedAt", Direction::Desc),
            )
            .await?
            .into_iter()
            .map(|(key, doc)| {
                let mut thread: Thread = serde_json::from_value(Value::Object(doc))
                    .map_err(|err| ChatError::decode("thread", key.clone(), err))?;
                thread.id = key;
                Ok(thread)
            })
            .collect()
    }
}

fn decode_message(key: String, doc: glimpse_store::Document) -> Result<Message, ChatError> {
    let mut message: Message = serde_json::from_value(Value::Object(doc))
        .map_err(|err| ChatError::decode("message", key.clone(), err))?;
    message.id = key;
    Ok(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glimpse_store::MemoryStore;

    fn me() -> Viewer {
        Viewer {
            id: UserId::new("u1"),
            display_name: Some("alice".into()),
            photo_url: None,
        }
    }

    fn other() -> Viewer {
        Viewer {
            id: UserId::new("u2"),
            display_name: Some("bob".into()),
            photo_url: Some("https://cdn.example/u2.jpg".into()),
        }
    }

    #[tokio::test]
    async fn open_thread_is_idempotent_across_initiators() {
        let store = MemoryStore::new();
        let first = ChatService::open_thread(&store, &me(), &other())
            .await
            .unwrap()
            .unwrap();
        let second = ChatService::open_thread(&store, &other(), &me())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(store.count(CHATS).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn open_thread_with_self_is_a_no_op() {
        let store = MemoryStore::new();
        let outcome = ChatService::open_thread(&store, &me(), &me()).await.unwrap();
        assert!(outcome.is_none());
        assert_eq!(store.count(CHATS).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn reopening_preserves_last_message() {
        let store = MemoryStore::new();
        let thread = ChatService::open_thread(&store, &me(), &other())
            .await
            .unwrap()
            .unwrap();
        ChatService::send(&store, &thread, &me().id, "hi bob", None)
            .await
            .unwrap();

        // The other side opens the thread later; merge keeps the preview.
        ChatService::open_thread(&store, &other(), &me())
            .await
            .unwrap();

        let threads = ChatService::threads_for(&store, &other().id).await.unwrap();
        assert_eq!(threads.len(), 1);
        assert_eq!(threads[0].last_message.as_deref(), Some("hi bob"));
    }

    #[tokio::test]
    async fn blank_message_is_skipped() {
        let store = MemoryStore::new();
        let thread = ThreadId::for_pair(&UserId::new("u1"), &UserId::new("u2")).unwrap();
        let key = ChatService::send(&store, &thread, &UserId::new("u1"), "   ", None)
            .await
            .unwrap();
        assert!(key.is_none());
        assert_eq!(store.count(&messages_path(&thread)).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn image_message_uses_photo_preview() {
        let store = MemoryStore::new();
        let thread = ChatService::open_thread(&store, &me(), &other())
            .await
            .unwrap()
            .unwrap();
        ChatService::send(
            &store,
            &thread,
            &me().id,
            "",
            Some("mem://chats/u1_u2/pic.jpg"),
        )
        .await
        .unwrap();

        let threads = ChatService::threads_for(&store, &me().id).await.unwrap();
        assert_eq!(threads[0].last_message.as_deref(), Some(PHOTO_PREVIEW));
    }

    #[tokio::test]
    async fn history_is_oldest_first_and_edit_stamps() {
        let store = MemoryStore::new();
        let thread = ThreadId::for_pair(&UserId::new("u1"), &UserId::new("u2")).unwrap();
        let first = ChatService::send(&store, &thread, &UserId::new("u1"), "one", None)
            .await
            .unwrap()
            .unwrap();
        ChatService::send(&store, &thread, &UserId::new("u2"), "two", None)
            .await
            .unwrap();

        ChatService::edit(&store, &thread, &first, "one (edited)")
            .await
            .unwrap();

        let history = ChatService::history(&store, &thread).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].text, "one (edited)");
        assert!(history[0].updated_at.is_some());
        assert_eq!(history[1].text, "two");
        assert!(history[1].updated_at.is_none());
    }

    #[tokio::test]
    async fn remove_deletes_only_the_message() {
        let store = MemoryStore::new();
        let thread = ThreadId::for_pair(&UserId::new("u1"), &UserId::new("u2")).unwrap();
        let key = ChatService::send(&store, &thread, &UserId::new("u1"), "oops", None)
            .await
            .unwrap()
            .unwrap();
        ChatService::remove(&store, &thread, &key).await.unwrap();

        assert!(ChatService::history(&store, &thread).await.unwrap().is_empty());
        // The summary preview is left stale on purpose.
        let doc = store.get(CHATS, thread.as_str()).await.unwrap().unwrap();
        assert_eq!(doc.get("lastMessage").and_then(|v| v.as_str()), Some("oops"));
    }
}
