// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Core tier abstractions for the geotier lookup resolver.
//!
//! This crate defines the [`Tier`] trait that every level of the lookup cascade
//! must satisfy, the [`ResultMap`] produced by tier queries, and the [`Error`]
//! type for fallible operations.
//!
//! # Overview
//!
//! A tier is a key-value resolver wrapping one backing store: an in-process map,
//! a persistent local store, or a remote geocoding service. Tiers know nothing
//! about each other. Narrowing the pending key set, merging partial results and
//! writing remote results back into faster tiers is the job of the resolver in
//! the `geotier` crate.
//!
//! # Implementing a Tier
//!
//! ```
//! use geotier_tier::{Error, ResultMap, Tier};
//! use std::collections::HashMap;
//! use std::sync::RwLock;
//!
//! struct SimpleTier<K, V>(RwLock<HashMap<K, V>>);
//!
//! impl<K, V> Tier<K, V> for SimpleTier<K, V>
//! where
//!     K: Clone + Eq + std::hash::Hash + Send + Sync,
//!     V: Clone + Send + Sync,
//! {
//!     async fn resolve(&self, keys: &[K]) -> Result<ResultMap<K, V>, Error> {
//!         let data = self.0.read().map_err(|_| Error::from_message("lock poisoned"))?;
//!         Ok(keys
//!             .iter()
//!             .filter_map(|k| data.get(k).map(|v| (k.clone(), v.clone())))
//!             .collect())
//!     }
//!
//!     async fn persist(&self, entries: &ResultMap<K, V>) -> Result<(), Error> {
//!         let mut data = self.0.write().map_err(|_| Error::from_message("lock poisoned"))?;
//!         data.extend(entries.iter().map(|(k, v)| (k.clone(), v.clone())));
//!         Ok(())
//!     }
//! }
//! ```
//!
//! # Dynamic Dispatch
//!
//! Enable the `dynamic-tier` feature (on by default) for [`DynamicTier`], which
//! wraps any `Tier` in a clonable, type-erased container.

pub mod error;
#[cfg(any(feature = "test-util", test))]
pub mod testing;
pub(crate) mod tier;

#[cfg(any(test, feature = "dynamic-tier"))]
mod dynamic;

#[cfg(any(test, feature = "dynamic-tier"))]
#[doc(inline)]
pub use dynamic::{DynamicTier, DynamicTierExt};
#[doc(inline)]
pub use error::{Error, Result};
#[doc(inline)]
pub use tier::{ResultMap, Tier};
