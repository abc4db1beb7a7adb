// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Builder for configuring memory tiers.
//!
//! This module provides a builder API for `MemoryTier` that abstracts
//! the underlying moka configuration, providing a stable API surface
//! without exposing moka's types.

use std::hash::Hash;
use std::marker::PhantomData;
use std::time::Duration;

use crate::tier::MemoryTier;

/// Builder for configuring a `MemoryTier`.
///
/// The tier is bounded by `max_size + overflow` entries. The overflow allowance
/// lets a burst of fresh lookups land without immediately evicting the working
/// set; past it, the least useful entries are evicted.
///
/// # Examples
///
/// ```
/// use geotier_memory::MemoryTier;
/// use std::time::Duration;
///
/// let tier = MemoryTier::<String, (f64, f64)>::builder()
///     .max_size(3000)
///     .overflow(100)
///     .time_to_idle(Duration::from_secs(3600))
///     .name("locations")
///     .build();
/// ```
#[derive(Debug)]
pub struct MemoryTierBuilder<K, V> {
    pub(crate) max_size: Option<u64>,
    pub(crate) overflow: u64,
    pub(crate) initial_capacity: Option<usize>,
    pub(crate) time_to_live: Option<Duration>,
    pub(crate) time_to_idle: Option<Duration>,
    pub(crate) name: Option<String>,
    _phantom: PhantomData<(K, V)>,
}

impl<K, V> Default for MemoryTierBuilder<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> MemoryTierBuilder<K, V> {
    /// Creates a new builder with default settings.
    ///
    /// The default configuration creates an unbounded tier with no time-based
    /// expiration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_size: None,
            overflow: 0,
            initial_capacity: None,
            time_to_live: None,
            time_to_idle: None,
            name: None,
            _phantom: PhantomData,
        }
    }

    /// Sets the nominal maximum number of entries.
    ///
    /// If not set, the tier is unbounded and the overflow allowance is ignored.
    #[must_use]
    pub fn max_size(mut self, max_size: u64) -> Self {
        self.max_size = Some(max_size);
        self
    }

    /// Sets how many entries beyond `max_size` the tier tolerates before evicting.
    #[must_use]
    pub fn overflow(mut self, overflow: u64) -> Self {
        self.overflow = overflow;
        self
    }

    /// Sets the initial capacity (pre-allocation hint) for the tier.
    #[must_use]
    pub fn initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = Some(capacity);
        self
    }

    /// Sets the time-to-live (TTL) for all entries.
    ///
    /// Entries expire this long after insertion, regardless of access patterns.
    #[must_use]
    pub fn time_to_live(mut self, duration: Duration) -> Self {
        self.time_to_live = Some(duration);
        self
    }

    /// Sets the time-to-idle (TTI) for all entries.
    ///
    /// Entries expire after this duration without reads or writes.
    #[must_use]
    pub fn time_to_idle(mut self, duration: Duration) -> Self {
        self.time_to_idle = Some(duration);
        self
    }

    /// Sets a name for the tier.
    ///
    /// This name may appear in logs or debugging output from the
    /// underlying cache implementation.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Returns the hard entry limit, `max_size + overflow`, if the tier is bounded.
    #[must_use]
    pub fn capacity(&self) -> Option<u64> {
        self.max_size.map(|max| max.saturating_add(self.overflow))
    }

    /// Builds the configured `MemoryTier`.
    #[must_use]
    pub fn build(self) -> MemoryTier<K, V>
    where
        K: Hash + Eq + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
    {
        MemoryTier::from_builder(&self)
    }
}
