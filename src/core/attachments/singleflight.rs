//! Resolution cache with singleflight semantics
//!
//! One entry per attachment URL, shared for the whole run. The first caller
//! to claim a URL becomes its leader and runs the resolution; everyone else
//! subscribes to the leader's result. Claiming is a single `DashMap::entry`
//! call, so two first sightings of the same URL cannot both start work. No
//! lock is held while a resolution is in flight.

use crate::domain::{MirrorError, Result};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::future::Future;
use tokio::sync::watch;

type Outcome = Result<String>;

/// Outcome of claiming a key
pub enum Claim {
    /// Caller owns the resolution and must complete the flight
    Leader(Flight),
    /// Resolution already started elsewhere
    Follower(watch::Receiver<Option<Outcome>>),
}

/// Completion handle held by the leader
///
/// Dropping it without calling [`Flight::complete`] wakes followers with an
/// error instead of leaving them hanging.
pub struct Flight {
    tx: watch::Sender<Option<Outcome>>,
}

impl Flight {
    pub fn complete(self, outcome: Outcome) {
        self.tx.send_replace(Some(outcome));
    }
}

/// URL → resolved location, shared by every document of a run
#[derive(Default)]
pub struct ResolutionCache {
    slots: DashMap<String, watch::Receiver<Option<Outcome>>>,
}

impl ResolutionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically joins the flight for `key` or starts a new one
    pub fn claim(&self, key: &str) -> Claim {
        match self.slots.entry(key.to_string()) {
            Entry::Occupied(slot) => Claim::Follower(slot.get().clone()),
            Entry::Vacant(slot) => {
                let (tx, rx) = watch::channel(None);
                slot.insert(rx);
                Claim::Leader(Flight { tx })
            }
        }
    }

    /// Returns the cached outcome for `key`, running `resolve` if this
    /// caller is the first to ask
    pub async fn get_or_resolve<F, Fut>(&self, key: &str, resolve: F) -> Result<String>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String>>,
    {
        match self.claim(key) {
            Claim::Leader(flight) => {
                let outcome = resolve().await;
                flight.complete(outcome.clone());
                outcome
            }
            Claim::Follower(rx) => wait(key, rx).await,
        }
    }

    /// Completed outcome for `key`, if any
    pub fn peek(&self, key: &str) -> Option<Result<String>> {
        self.slots
            .get(key)
            .and_then(|rx| rx.borrow().as_ref().cloned())
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

async fn wait(key: &str, mut rx: watch::Receiver<Option<Outcome>>) -> Result<String> {
    let abandoned =
        || MirrorError::Other(format!("Resolution of {key} was abandoned before completing"));

    let settled = rx.wait_for(Option::is_some).await.map_err(|_| abandoned())?;
    settled.as_ref().cloned().unwrap_or_else(|| Err(abandoned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_concurrent_callers_share_one_resolution() {
        let cache = Arc::new(ResolutionCache::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let calls = Arc::clone(&calls);
                tokio::spawn(async move {
                    cache
                        .get_or_resolve("https://h/a.png", || async {
                            calls.fetch_add(1, Ordering::SeqCst);
                            tokio::time::sleep(Duration::from_millis(20)).await;
                            Ok("./assets/a.png".to_string())
                        })
                        .await
                })
            })
            .collect();

        for task in tasks {
            assert_eq!(task.await.unwrap().unwrap(), "./assets/a.png");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_errors_are_shared() {
        let cache = ResolutionCache::new();
        let first = cache
            .get_or_resolve("u", || async { Err(MirrorError::Fetch("404".to_string())) })
            .await;
        let second = cache
            .get_or_resolve("u", || async { Ok("unused".to_string()) })
            .await;

        assert!(matches!(first, Err(MirrorError::Fetch(_))));
        assert!(matches!(second, Err(MirrorError::Fetch(_))));
    }

    #[tokio::test]
    async fn test_dropped_leader_releases_followers() {
        let cache = ResolutionCache::new();
        let Claim::Leader(flight) = cache.claim("u") else {
            panic!("first claim must lead");
        };
        let Claim::Follower(rx) = cache.claim("u") else {
            panic!("second claim must follow");
        };

        drop(flight);
        assert!(wait("u", rx).await.is_err());
    }

    #[test]
    fn test_peek() {
        let cache = ResolutionCache::new();
        assert!(cache.peek("u").is_none());

        let Claim::Leader(flight) = cache.claim("u") else {
            panic!("first claim must lead");
        };
        assert!(cache.peek("u").is_none());

        flight.complete(Ok("loc".to_string()));
        assert_eq!(cache.peek("u").unwrap().unwrap(), "loc");
    }
}
