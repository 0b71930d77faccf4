//! Thread lifecycle against the in-memory backend: open from either side,
//! send with attachments, live history, inbox ordering.

use glimpse_chat::{group_by_sender, ChatService, ThreadId};
use glimpse_core::{UserId, Viewer};
use glimpse_store::{BlobStore, DocumentStore, MemoryBlobStore, MemoryStore};
use parking_lot::Mutex;
use std::sync::Arc;

fn viewer(id: &str, name: &str) -> Viewer {
    Viewer {
        id: UserId::new(id),
        display_name: Some(name.to_string()),
        photo_url: None,
    }
}

#[tokio::test]
async fn full_conversation_flow() {
    let store = MemoryStore::new();
    let blobs = MemoryBlobStore::new();
    let alice = viewer("u1", "alice");
    let bob = viewer("u2", "bob");

    let thread = ChatService::open_thread(&store, &alice, &bob)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(thread.as_str(), "u1_u2");

    ChatService::send(&store, &thread, &alice.id, "hey", None)
        .await
        .unwrap();
    ChatService::send(&store, &thread, &alice.id, "you there?", None)
        .await
        .unwrap();
    ChatService::send_with_image(
        &store,
        &blobs,
        &thread,
        &bob.id,
        "look at this",
        "cat.jpg",
        vec![0xff, 0xd8],
    )
    .await
    .unwrap();

    let history = ChatService::history(&store, &thread).await.unwrap();
    assert_eq!(history.len(), 3);
    assert_eq!(history[0].text, "hey");
    let attachment = history[2].image_url.as_deref().unwrap();
    assert!(attachment.starts_with("mem://chats/u1_u2/"));
    assert_eq!(blobs.fetch(attachment).await.unwrap(), vec![0xff, 0xd8]);

    // Two sender runs: alice x2, bob x1.
    let bubbles = group_by_sender(&history);
    assert_eq!(bubbles.len(), 2);
    assert_eq!(bubbles[0].messages.len(), 2);

    // Image send rewrote the inbox preview.
    let threads = ChatService::threads_for(&store, &bob.id).await.unwrap();
    assert_eq!(threads[0].last_message.as_deref(), Some("\u{1f4f7} Photo"));

    let (other, card) = threads[0].other_participant(&bob.id).unwrap();
    assert_eq!(other.as_str(), "u1");
    assert_eq!(card.map(|c| c.name.as_str()), Some("alice"));
}

#[tokio::test]
async fn thread_list_orders_by_recent_activity() {
    let store = MemoryStore::new();
    let alice = viewer("u1", "alice");
    let bob = viewer("u2", "bob");
    let carol = viewer("u3", "carol");

    let with_bob = ChatService::open_thread(&store, &alice, &bob)
        .await
        .unwrap()
        .unwrap();
    let with_carol = ChatService::open_thread(&store, &alice, &carol)
        .await
        .unwrap()
        .unwrap();

    ChatService::send(&store, &with_bob, &alice.id, "first", None)
        .await
        .unwrap();
    ChatService::send(&store, &with_carol, &alice.id, "second", None)
        .await
        .unwrap();

    let threads = ChatService::threads_for(&store, &alice.id).await.unwrap();
    assert_eq!(threads.len(), 2);
    assert_eq!(threads[0].id, with_carol.as_str());
    assert_eq!(threads[1].id, with_bob.as_str());

    // Bob only sees his own thread.
    let bobs = ChatService::threads_for(&store, &bob.id).await.unwrap();
    assert_eq!(bobs.len(), 1);
    assert_eq!(bobs[0].id, with_bob.as_str());
}

#[tokio::test]
async fn watch_history_tracks_sends_and_stops_on_cancel() {
    let store = MemoryStore::new();
    let thread = ThreadId::for_pair(&UserId::new("u1"), &UserId::new("u2")).unwrap();

    let seen: Arc<Mutex<Vec<usize>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let sub = ChatService::watch_history(&store, &thread, move |history| {
        sink.lock().push(history.len());
    })
    .await
    .unwrap();

    ChatService::send(&store, &thread, &UserId::new("u1"), "one", None)
        .await
        .unwrap();
    // Initial empty snapshot, then the send.
    assert_eq!(*seen.lock(), vec![0, 1]);

    sub.cancel();
    ChatService::send(&store, &thread, &UserId::new("u2"), "two", None)
        .await
        .unwrap();
    assert_eq!(*seen.lock(), vec![0, 1]);

    // The store still took the write.
    assert_eq!(store.count("chats/u1_u2/messages").await.unwrap(), 2);
}
