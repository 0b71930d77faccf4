//! Cross-module feed behavior: sharing, liking, commenting, and the
//! timeline a viewer actually sees.

use glimpse_core::{Tuning, UserId, Viewer};
use glimpse_feed::{CommentService, FeedService, PostService};
use glimpse_store::{DocumentStore, Fields, MemoryBlobStore, MemoryStore, WriteMode};

fn creator(id: &str, name: &str) -> Viewer {
    Viewer {
        id: UserId::new(id),
        display_name: Some(name.to_string()),
        photo_url: Some(format!("https://cdn.example/{id}.jpg")),
    }
}

async fn follow(store: &MemoryStore, viewer: &str, target: &str) {
    store
        .put(
            &format!("users/{viewer}/following"),
            target,
            Fields::new().server_timestamp("timestamp"),
            WriteMode::Replace,
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn share_like_comment_and_read_back() {
    let store = MemoryStore::new();
    let blobs = MemoryBlobStore::new();
    let alice = creator("u1", "alice");
    let bob = creator("u2", "bob");

    let post_key = PostService::create(
        &store,
        &blobs,
        &alice,
        "golden hour",
        "sunset.jpg",
        vec![1, 2, 3],
    )
    .await
    .unwrap();

    PostService::toggle_like(&store, &post_key, &bob.id, false)
        .await
        .unwrap();
    CommentService::add(&store, &post_key, &bob, "stunning")
        .await
        .unwrap();

    let post = PostService::load(&store, &post_key).await.unwrap().unwrap();
    assert_eq!(post.username, "alice");
    assert_eq!(post.user_image, "https://cdn.example/u1.jpg");
    assert!(post.liked_by(&bob.id));
    assert_eq!(post.like_count(), 1);

    let thread = CommentService::for_post(&store, &post_key).await.unwrap();
    assert_eq!(thread.len(), 1);
    assert_eq!(thread[0].username, "bob");
    assert_eq!(thread[0].text, "stunning");
}

#[tokio::test]
async fn deleting_a_post_leaves_its_comments_behind() {
    let store = MemoryStore::new();
    let blobs = MemoryBlobStore::new();
    let alice = creator("u1", "alice");

    let post_key = PostService::create(&store, &blobs, &alice, "oops", "x.jpg", vec![1])
        .await
        .unwrap();
    CommentService::add(&store, &post_key, &alice, "note to self")
        .await
        .unwrap();

    PostService::delete(&store, &post_key).await.unwrap();

    assert!(PostService::load(&store, &post_key).await.unwrap().is_none());
    // No cascading cleanup; orphaned comments stay queryable by post id.
    let orphans = CommentService::for_post(&store, &post_key).await.unwrap();
    assert_eq!(orphans.len(), 1);
}

#[tokio::test]
async fn timeline_switches_from_global_to_following() {
    let store = MemoryStore::new();
    let blobs = MemoryBlobStore::new();
    let tuning = Tuning::default();
    let viewer = UserId::new("me");

    PostService::create(&store, &blobs, &creator("u2", "bob"), "from bob", "b.jpg", vec![1])
        .await
        .unwrap();
    PostService::create(
        &store,
        &blobs,
        &creator("u3", "carol"),
        "from carol",
        "c.jpg",
        vec![1],
    )
    .await
    .unwrap();

    // Following nobody: the global fallback shows everything.
    let feed = FeedService::home_feed(&store, &viewer, &tuning).await.unwrap();
    assert_eq!(feed.len(), 2);

    // After following bob, only bob (and the viewer) remain in the query.
    follow(&store, "me", "u2").await;
    let feed = FeedService::home_feed(&store, &viewer, &tuning).await.unwrap();
    let captions: Vec<_> = feed.iter().map(|p| p.caption.as_str()).collect();
    assert_eq!(captions, vec!["from bob"]);
}
