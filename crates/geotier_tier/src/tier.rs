// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The core trait for lookup tiers.
//!
//! [`Tier`] defines the interface every level of the cascade implements: the
//! in-process memory tier, the persistent local-storage tier and the remote
//! geocoding tier. The resolver is written once against this trait.

use std::collections::HashMap;

use crate::Error;

/// A mapping from lookup key to resolved value.
///
/// Produced by every tier query and by the resolver's final merge. Keys are
/// unique; insertion order is irrelevant.
pub type ResultMap<K, V> = HashMap<K, V>;

/// Trait for lookup tier implementations.
///
/// Both methods are required. `len` and `is_empty` have default implementations:
/// - `len`: Returns `None` (not all tiers track size)
/// - `is_empty`: Delegates to `len`
#[cfg_attr(
    any(test, feature = "dynamic-tier"),
    dynosaur::dynosaur(pub(crate) DynTier = dyn(box) Tier, bridge(none))
)]
pub trait Tier<K, V>: Send + Sync {
    /// Returns the subset of `keys` this tier currently holds.
    ///
    /// Keys the tier does not hold are omitted, never reported as errors. A read
    /// must not mutate the backing store. An error means the tier could not be
    /// consulted at all.
    fn resolve(&self, keys: &[K]) -> impl Future<Output = Result<ResultMap<K, V>, Error>> + Send;

    /// Stores `entries`, overwriting any existing value for the same key.
    fn persist(&self, entries: &ResultMap<K, V>) -> impl Future<Output = Result<(), Error>> + Send;

    /// Returns the number of entries, if supported.
    ///
    /// Returns `None` for implementations that don't track size.
    fn len(&self) -> Option<u64> {
        None
    }

    /// Returns `true` if the tier holds no entries.
    ///
    /// Returns `None` for implementations that don't track size.
    fn is_empty(&self) -> Option<bool> {
        self.len().map(|len| len == 0)
    }
}
