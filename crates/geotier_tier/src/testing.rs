// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Mock tier implementation for testing.
//!
//! This module provides `MockTier`, a configurable in-memory tier that
//! records all operations and supports failure injection for testing error paths.

use std::{collections::HashMap, hash::Hash, sync::Arc};

use parking_lot::Mutex;

use crate::{Error, ResultMap, Tier};

/// Recorded tier operation with full context.
#[derive(Debug, Clone)]
pub enum TierOp<K, V> {
    /// A resolve operation was performed with the given keys, in call order.
    Resolve(Vec<K>),
    /// A persist operation was performed with the given entries.
    Persist(ResultMap<K, V>),
}

impl<K, V> PartialEq for TierOp<K, V>
where
    K: Eq + Hash,
    V: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Resolve(a), Self::Resolve(b)) => a == b,
            (Self::Persist(a), Self::Persist(b)) => a == b,
            _ => false,
        }
    }
}

impl<K, V> Eq for TierOp<K, V>
where
    K: Eq + Hash,
    V: Eq,
{
}

type FailPredicate<K, V> = Box<dyn Fn(&TierOp<K, V>) -> bool + Send + Sync>;

/// A configurable mock tier for testing.
///
/// This tier stores values in memory and can be configured to fail
/// operations on demand, making it useful for testing how the resolver
/// degrades. All operations are recorded for later verification.
///
/// # Examples
///
/// ```
/// # #[cfg(feature = "test-util")]
/// # fn main() {
/// use geotier_tier::{testing::{MockTier, TierOp}, ResultMap, Tier};
///
/// # futures::executor::block_on(async {
/// let tier = MockTier::<String, i32>::new();
///
/// let entries = ResultMap::from([("key".to_string(), 42)]);
/// tier.persist(&entries).await.unwrap();
/// let hits = tier.resolve(&["key".to_string(), "other".to_string()]).await.unwrap();
/// assert_eq!(hits, entries);
///
/// assert_eq!(tier.operations(), vec![
///     TierOp::Persist(entries.clone()),
///     TierOp::Resolve(vec!["key".to_string(), "other".to_string()]),
/// ]);
/// # });
/// # }
/// # #[cfg(not(feature = "test-util"))]
/// # fn main() {}
/// ```
///
/// # Failure Injection
///
/// ```
/// # #[cfg(feature = "test-util")]
/// # fn main() {
/// use geotier_tier::{testing::{MockTier, TierOp}, Tier};
///
/// # futures::executor::block_on(async {
/// let tier: MockTier<String, i32> = MockTier::new();
///
/// // Fail every resolve
/// tier.fail_when(|op| matches!(op, TierOp::Resolve(_)));
/// assert!(tier.resolve(&["key".to_string()]).await.is_err());
///
/// // Fail only lookups that include a specific key
/// tier.fail_when(|op| matches!(op, TierOp::Resolve(keys) if keys.iter().any(|k| k == "forbidden")));
/// assert!(tier.resolve(&["forbidden".to_string()]).await.is_err());
/// assert!(tier.resolve(&["allowed".to_string()]).await.is_ok());
/// # });
/// # }
/// # #[cfg(not(feature = "test-util"))]
/// # fn main() {}
/// ```
pub struct MockTier<K, V> {
    data: Arc<Mutex<HashMap<K, V>>>,
    operations: Arc<Mutex<Vec<TierOp<K, V>>>>,
    fail_when: Arc<Mutex<Option<FailPredicate<K, V>>>>,
}

impl<K, V> std::fmt::Debug for MockTier<K, V>
where
    K: std::fmt::Debug,
    V: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTier")
            .field("data", &self.data)
            .field("operations", &self.operations)
            .field("fail_when", &self.fail_when.lock().is_some())
            .finish()
    }
}

impl<K, V> Clone for MockTier<K, V> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
            operations: Arc::clone(&self.operations),
            fail_when: Arc::clone(&self.fail_when),
        }
    }
}

impl<K, V> Default for MockTier<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> MockTier<K, V> {
    /// Creates a new empty mock tier.
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: Arc::new(Mutex::new(HashMap::new())),
            operations: Arc::new(Mutex::new(Vec::new())),
            fail_when: Arc::new(Mutex::new(None)),
        }
    }
}

impl<K, V> MockTier<K, V>
where
    K: Eq + Hash,
{
    /// Creates a mock tier with pre-populated data.
    #[must_use]
    pub fn with_data(data: impl IntoIterator<Item = (K, V)>) -> Self {
        Self {
            data: Arc::new(Mutex::new(data.into_iter().collect())),
            operations: Arc::new(Mutex::new(Vec::new())),
            fail_when: Arc::new(Mutex::new(None)),
        }
    }

    /// Returns the number of entries in the tier.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.data.lock().len()
    }

    /// Returns true if the tier holds the given key.
    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.data.lock().contains_key(key)
    }

    /// Returns a copy of the value stored for `key`.
    #[must_use]
    pub fn value(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        self.data.lock().get(key).cloned()
    }
}

impl<K, V> MockTier<K, V>
where
    K: Clone,
    V: Clone,
{
    /// Sets a predicate that determines when operations should fail.
    ///
    /// The predicate receives the operation and returns `true` if it should fail.
    /// Failed operations are still recorded.
    pub fn fail_when<F>(&self, predicate: F)
    where
        F: Fn(&TierOp<K, V>) -> bool + Send + Sync + 'static,
    {
        *self.fail_when.lock() = Some(Box::new(predicate));
    }

    /// Clears the failure predicate, allowing all operations to succeed.
    pub fn clear_failures(&self) {
        *self.fail_when.lock() = None;
    }

    /// Returns a clone of all recorded operations.
    #[must_use]
    pub fn operations(&self) -> Vec<TierOp<K, V>> {
        self.operations.lock().clone()
    }

    /// Returns the keys of every recorded resolve, in call order.
    #[must_use]
    pub fn resolved_keys(&self) -> Vec<Vec<K>> {
        self.operations
            .lock()
            .iter()
            .filter_map(|op| match op {
                TierOp::Resolve(keys) => Some(keys.clone()),
                TierOp::Persist(_) => None,
            })
            .collect()
    }

    /// Returns how many resolve operations were recorded.
    #[must_use]
    pub fn resolve_count(&self) -> usize {
        self.operations.lock().iter().filter(|op| matches!(op, TierOp::Resolve(_))).count()
    }

    /// Returns how many persist operations were recorded.
    #[must_use]
    pub fn persist_count(&self) -> usize {
        self.operations.lock().iter().filter(|op| matches!(op, TierOp::Persist(_))).count()
    }

    /// Clears all recorded operations.
    pub fn clear_operations(&self) {
        self.operations.lock().clear();
    }

    fn record(&self, op: TierOp<K, V>) {
        self.operations.lock().push(op);
    }

    fn should_fail(&self, op: &TierOp<K, V>) -> bool {
        self.fail_when.lock().as_ref().is_some_and(|predicate| predicate(op))
    }
}

impl<K, V> Tier<K, V> for MockTier<K, V>
where
    K: Clone + Eq + Hash + Send + Sync,
    V: Clone + Send + Sync,
{
    async fn resolve(&self, keys: &[K]) -> Result<ResultMap<K, V>, Error> {
        let op = TierOp::Resolve(keys.to_vec());
        let fail = self.should_fail(&op);
        self.record(op);
        if fail {
            return Err(Error::caused_by("mock: resolve failed"));
        }

        let data = self.data.lock();
        Ok(keys
            .iter()
            .filter_map(|key| data.get(key).map(|value| (key.clone(), value.clone())))
            .collect())
    }

    async fn persist(&self, entries: &ResultMap<K, V>) -> Result<(), Error> {
        let op = TierOp::Persist(entries.clone());
        let fail = self.should_fail(&op);
        self.record(op);
        if fail {
            return Err(Error::caused_by("mock: persist failed"));
        }

        self.data
            .lock()
            .extend(entries.iter().map(|(key, value)| (key.clone(), value.clone())));
        Ok(())
    }

    fn len(&self) -> Option<u64> {
        Some(self.data.lock().len() as u64)
    }
}
