use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::social::views::{TagFeed, UserProfile};

/// Memoized results of one async function, keyed by its arguments.
pub struct Memo<K, V> {
    entries: Arc<Mutex<HashMap<K, V>>>,
}

impl<K, V> Clone for Memo<K, V> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
        }
    }
}

impl<K, V> Default for Memo<K, V> {
    fn default() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl<K: Eq + Hash, V: Clone> Memo<K, V> {
    /// Return the stored value for `key`, or run `init` and store its result.
    /// Errors are returned to the caller and not stored.
    pub async fn get_or_try_init<F, Fut, E>(&self, key: K, init: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        // Held across `init` so concurrent lookups of one key compute it once
        let mut entries = self.entries.lock().await;
        if let Some(value) = entries.get(&key) {
            return Ok(value.clone());
        }

        let value = init().await?;
        entries.insert(key, value.clone());
        Ok(value)
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }
}

pub type FeedKey = (String, Option<String>);
pub type ProfileKey = (String, Option<String>);

/// Per-request cache of read queries.
///
/// One scope is created for every incoming request and dropped with it, so
/// follow state never leaks between requests. `None` entries record a
/// not-found outcome.
#[derive(Clone, Default)]
pub struct RequestScope {
    pub tag_feeds: Memo<FeedKey, Option<Arc<TagFeed>>>,
    pub profiles: Memo<ProfileKey, Option<Arc<UserProfile>>>,
}
