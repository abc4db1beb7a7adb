// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Dynamic tier wrapper for type erasure.

use std::{fmt::Debug, sync::Arc};

use crate::{Error, ResultMap, Tier, tier::DynTier};

/// Extension trait for converting any `Tier` into a `DynamicTier`.
///
/// This trait is automatically implemented for all types that implement `Tier`.
///
/// # Examples
///
/// ```
/// use geotier_tier::{DynamicTier, DynamicTierExt, Tier};
///
/// fn erase<T>(tier: T) -> DynamicTier<String, (f64, f64)>
/// where
///     T: Tier<String, (f64, f64)> + 'static,
/// {
///     tier.into_dynamic()
/// }
/// ```
pub trait DynamicTierExt<K, V>: Sized {
    /// Converts this tier into a `DynamicTier`.
    fn into_dynamic(self) -> DynamicTier<K, V>;
}

impl<K, V, T> DynamicTierExt<K, V> for T
where
    T: Tier<K, V> + 'static,
{
    fn into_dynamic(self) -> DynamicTier<K, V> {
        DynamicTier::new(self)
    }
}

/// A clonable tier with type erasure.
///
/// `DynamicTier` wraps a trait object in an `Arc` to enable cloning while keeping
/// dynamic dispatch. Use it when the concrete tiers of a resolver are chosen at
/// runtime, or to give heterogeneous tiers a single type.
pub struct DynamicTier<K, V>(Arc<DynTier<'static, K, V>>);

impl<K, V> DynamicTier<K, V> {
    pub(crate) fn new<T>(tier: T) -> Self
    where
        T: Tier<K, V> + Send + Sync + 'static,
    {
        Self(DynTier::new_arc(tier))
    }
}

impl<K, V> Debug for DynamicTier<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamicTier").finish()
    }
}

impl<K, V> Clone for DynamicTier<K, V> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<K, V> Tier<K, V> for DynamicTier<K, V>
where
    K: Sync,
    V: Sync,
{
    async fn resolve(&self, keys: &[K]) -> Result<ResultMap<K, V>, Error> {
        self.0.resolve(keys).await
    }

    async fn persist(&self, entries: &ResultMap<K, V>) -> Result<(), Error> {
        self.0.persist(entries).await
    }

    fn len(&self) -> Option<u64> {
        self.0.len()
    }

    fn is_empty(&self) -> Option<bool> {
        self.0.is_empty()
    }
}
