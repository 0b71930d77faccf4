//! Home feed assembly
//!
//! The timeline is derived client-side from the viewer's following set:
//!
//! 1. read the keys of `users/{viewer}/following`;
//! 2. nobody followed yet - fall back to a global page so the screen is
//!    never empty;
//! 3. otherwise query posts whose author is in the following set plus the
//!    viewer, truncated to the store's `in`-filter cap. With a full
//!    following list the viewer's own id is the one that gets cut.

use crate::error::FeedError;
use crate::post::{decode_post, Post, POSTS};
use glimpse_core::{Tuning, UserId};
use glimpse_store::{Direction, DocumentStore, Filter, Query, Subscription};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

fn following_path(user: &UserId) -> String {
    format!("users/{user}/following")
}

/// Stateless feed assembly.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeedService;

impl FeedService {
    /// Build the viewer's home feed query.
    pub async fn home_feed_query<S>(
        store: &S,
        viewer: &UserId,
        tuning: &Tuning,
    ) -> Result<Query, FeedError>
    where
        S: DocumentStore,
    {
        let following = store
            .query(Query::collection(following_path(viewer)))
            .await?;
        let mut feed_ids: Vec<Value> = following
            .into_iter()
            .map(|(key, _)| Value::from(key))
            .collect();

        if feed_ids.is_empty() {
            debug!(%viewer, "no follows yet, serving global feed");
            return Ok(Query::collection(POSTS)
                .order_by("createdAt", Direction::Desc)
                .limit(tuning.global_feed_page));
        }

        feed_ids.push(Value::from(viewer.as_str()));
        feed_ids.truncate(tuning.in_filter_cap);

        Ok(Query::collection(POSTS)
            .filter(Filter::In("userId".into(), feed_ids))
            .order_by("createdAt", Direction::Desc))
    }

    /// One-shot home feed fetch.
    pub async fn home_feed<S>(
        store: &S,
        viewer: &UserId,
        tuning: &Tuning,
    ) -> Result<Vec<Post>, FeedError>
    where
        S: DocumentStore,
    {
        let query = Self::home_feed_query(store, viewer, tuning).await?;
        store
            .query(query)
            .await?
            .into_iter()
            .map(|(key, doc)| decode_post(key, doc))
            .collect()
    }

    /// Watch the home feed.
    ///
    /// The query is derived once at subscribe time; following someone new
    /// requires re-subscribing, exactly as the product behaves on a page
    /// load.
    pub async fn watch_home_feed<S, F>(
        store: &S,
        viewer: &UserId,
        tuning: &Tuning,
        callback: F,
    ) -> Result<Subscription, FeedError>
    where
        S: DocumentStore,
        F: Fn(Vec<Post>) + Send + Sync + 'static,
    {
        let query = Self::home_feed_query(store, viewer, tuning).await?;
        let subscription = store
            .watch(
                query,
                Arc::new(move |rows| {
                    let posts = rows
                        .into_iter()
                        .filter_map(|(key, doc)| match decode_post(key, doc) {
                            Ok(post) => Some(post),
                            Err(error) => {
                                warn!(%error, "dropping undecodable post");
                                None
                            }
                        })
                        .collect();
                    callback(posts);
                }),
            )
            .await?;
        Ok(subscription)
    }
}
