use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Per-key async mutexes, created on first use and evicted once nothing
/// else references them — a sharded keyed-mutex table rather than one
/// global lock or an ever-growing map.
pub struct KeyedLockTable<K> {
    shards: Arc<Mutex<HashMap<K, Arc<AsyncMutex<()>>>>>,
}

impl<K> Default for KeyedLockTable<K> {
    fn default() -> Self {
        Self { shards: Arc::new(Mutex::new(HashMap::new())) }
    }
}

/// Holds the per-key mutex for as long as it's alive; on drop, releases the
/// mutex and evicts its map entry if no other caller is waiting on it.
pub struct KeyGuard<K: Eq + Hash + Clone> {
    shards: Arc<Mutex<HashMap<K, Arc<AsyncMutex<()>>>>>,
    key: K,
    guard: Option<OwnedMutexGuard<()>>,
}

impl<K: Eq + Hash + Clone> Drop for KeyGuard<K> {
    fn drop(&mut self) {
        self.guard.take();
        let mut shards = self.shards.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(entry) = shards.get(&self.key)
            && Arc::strong_count(entry) <= 1
        {
            shards.remove(&self.key);
        }
    }
}

impl<K: Eq + Hash + Clone> KeyedLockTable<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the lock for `key`, creating its mutex if this is the first
    /// caller to ask for it.
    pub async fn lock(&self, key: K) -> KeyGuard<K> {
        let mutex = {
            let mut shards = self.shards.lock().unwrap_or_else(|e| e.into_inner());
            shards.entry(key.clone()).or_insert_with(|| Arc::new(AsyncMutex::new(()))).clone()
        };
        let guard = mutex.lock_owned().await;

        KeyGuard { shards: self.shards.clone(), key, guard: Some(guard) }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn serializes_access_for_the_same_key() {
        let table = Arc::new(KeyedLockTable::<String>::new());
        let counter = Arc::new(AtomicUsize::new(0));
        let concurrent = Arc::new(AtomicUsize::new(0));
        let max_concurrent = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let table = table.clone();
            let counter = counter.clone();
            let concurrent = concurrent.clone();
            let max_concurrent = max_concurrent.clone();
            handles.push(tokio::spawn(async move {
                let _guard = table.lock("shared-key".to_string()).await;
                let now = concurrent.fetch_add(1, Ordering::SeqCst) + 1;
                max_concurrent.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                concurrent.fetch_sub(1, Ordering::SeqCst);
                counter.fetch_add(1, Ordering::SeqCst);
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(counter.load(Ordering::SeqCst), 8);
        assert_eq!(max_concurrent.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn distinct_keys_do_not_block_each_other() {
        let table = Arc::new(KeyedLockTable::<String>::new());
        let _a = table.lock("a".to_string()).await;
        // A lock on a different key must not deadlock behind `_a`.
        let _b = tokio::time::timeout(Duration::from_millis(200), table.lock("b".to_string()))
            .await
            .expect("locking a distinct key should not block");
    }

    #[tokio::test]
    async fn table_does_not_retain_entries_after_use() {
        let table = KeyedLockTable::<String>::new();
        {
            let _guard = table.lock("transient".to_string()).await;
        }
        assert_eq!(table.shards.lock().unwrap().len(), 0);
    }
}
