// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Memory tier implementation using moka.

use std::hash::Hash;

use geotier_tier::{Error, ResultMap, Tier};
use moka::future::Cache;
use thread_aware::{Arc, PerProcess, ThreadAware};

use crate::builder::MemoryTierBuilder;

/// An in-process tier backed by moka.
///
/// Clones share the same store, so a resolver and a test can hold the same tier.
///
/// # Examples
///
/// ```
/// use geotier_memory::MemoryTier;
/// use geotier_tier::{ResultMap, Tier};
/// # futures::executor::block_on(async {
///
/// let tier = MemoryTier::<String, i32>::with_capacity(100, 10);
///
/// tier.persist(&ResultMap::from([("key".to_string(), 42)])).await.unwrap();
/// let hits = tier.resolve(&["key".to_string()]).await.unwrap();
/// assert_eq!(hits.get("key"), Some(&42));
/// # });
/// ```
#[derive(Debug, Clone, ThreadAware)]
pub struct MemoryTier<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    inner: Arc<Cache<K, V>, PerProcess>,
}

impl<K, V> Default for MemoryTier<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> MemoryTier<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Creates a new unbounded memory tier.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Creates a memory tier holding at most `max_size + overflow` entries.
    #[must_use]
    pub fn with_capacity(max_size: u64, overflow: u64) -> Self {
        Self::builder().max_size(max_size).overflow(overflow).build()
    }

    /// Creates a new builder for configuring a memory tier.
    #[must_use]
    pub fn builder() -> MemoryTierBuilder<K, V> {
        MemoryTierBuilder::new()
    }

    pub(crate) fn from_builder(builder: &MemoryTierBuilder<K, V>) -> Self {
        let mut moka_builder = Cache::builder();

        if let Some(capacity) = builder.capacity() {
            moka_builder = moka_builder.max_capacity(capacity);
        }

        if let Some(capacity) = builder.initial_capacity {
            moka_builder = moka_builder.initial_capacity(capacity);
        }

        if let Some(ttl) = builder.time_to_live {
            moka_builder = moka_builder.time_to_live(ttl);
        }

        if let Some(tti) = builder.time_to_idle {
            moka_builder = moka_builder.time_to_idle(tti);
        }

        if let Some(name) = builder.name.as_deref() {
            moka_builder = moka_builder.name(name);
        }

        Self {
            inner: Arc::from_unaware(moka_builder.build()),
        }
    }

    /// Runs moka's pending maintenance (evictions, expirations, size bookkeeping).
    ///
    /// `len` is only exact after this has run.
    pub async fn run_pending_tasks(&self) {
        self.inner.run_pending_tasks().await;
    }

    /// Removes every entry.
    pub fn clear(&self) {
        self.inner.invalidate_all();
    }
}

impl<K, V> Tier<K, V> for MemoryTier<K, V>
where
    K: Clone + Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    async fn resolve(&self, keys: &[K]) -> Result<ResultMap<K, V>, Error> {
        let mut hits = ResultMap::with_capacity(keys.len());
        for key in keys {
            if let Some(value) = self.inner.get(key).await {
                hits.insert(key.clone(), value);
            }
        }
        Ok(hits)
    }

    async fn persist(&self, entries: &ResultMap<K, V>) -> Result<(), Error> {
        for (key, value) in entries {
            self.inner.insert(key.clone(), value.clone()).await;
        }
        Ok(())
    }

    fn len(&self) -> Option<u64> {
        Some(self.inner.entry_count())
    }
}
