// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Resolves place names to coordinates through a cascade of tiers.
//!
//! A [`Resolver`] holds three tiers of increasing cost:
//!
//! 1. a bounded in-process [`MemoryTier`],
//! 2. a durable [`PersistentTier`] over a host [`StorageService`],
//! 3. a read-only [`RemoteTier`] wrapping a geocoding service.
//!
//! [`Resolver::resolve_all`] asks each tier only for the keys the faster
//! tiers could not resolve and stops as soon as nothing is pending. Whatever
//! the remote tier returns is written back into the memory and persistent
//! tiers, so repeated lookups stay local. [`Resolver::save_all`] writes known
//! values straight into the two local tiers and returns once the persistent
//! write completes; a memory write still running at that point is handed to
//! the configured [`Spawner`].
//!
//! # Failure handling
//!
//! A tier that fails is skipped for that lookup and the next tier is asked
//! instead; `resolve_all` itself never fails. Keys no tier knows are simply
//! missing from the result. Failed write-backs are logged and otherwise
//! ignored. An optional remote deadline (see
//! [`ResolverBuilder::remote_timeout`]) turns a stalled geocoder into a miss.
//!
//! # Quick start
//!
//! ```
//! use geotier::{Coordinate, Error, GeocodeRequest, InMemoryStorage, LocationDictionary, Resolver, Tier};
//! use layered::Execute;
//! use tick::Clock;
//!
//! # futures::executor::block_on(async {
//! let geocoder = Execute::new(|request: GeocodeRequest<String>| async move {
//!     Ok::<_, Error>(
//!         request
//!             .into_keys()
//!             .into_iter()
//!             .filter(|place| place == "Paris")
//!             .map(|place| (place, Coordinate::new(48.8, 2.3)))
//!             .collect::<LocationDictionary>(),
//!     )
//! });
//!
//! let resolver = Resolver::builder::<String, Coordinate>(Clock::new_frozen())
//!     .default_memory()
//!     .persistent_storage(InMemoryStorage::new())
//!     .remote_service(geocoder)
//!     .build();
//!
//! // First lookup goes all the way to the geocoder...
//! let found = resolver.resolve_all(&["Paris".to_string()]).await;
//! assert_eq!(found.get("Paris"), Some(&Coordinate::new(48.8, 2.3)));
//!
//! // ...and leaves the value in the local tiers.
//! assert_eq!(resolver.persistent().len(), Some(1));
//! # });
//! ```
//!
//! # Telemetry
//!
//! Every tier call emits a `tracing` event named `resolver.event` carrying the
//! resolver name, tier, operation, activity, key count and duration. With the
//! `metrics` feature, [`ResolverBuilder::metrics`] also records the events as
//! OpenTelemetry metrics (`resolver.event.count`, `resolver.tier.duration`).
//!
//! # Features
//!
//! - `metrics`: OpenTelemetry metrics.
//! - `dynamic-tier`: re-exports [`DynamicTier`] for type-erased tiers.
//! - `test-util`: re-exports `MockTier` and enables `tick`'s clock control.
//! - `tokio`: adds `Spawner::new_tokio`.

mod builder;
mod geo;
mod pending;
mod resolver;
mod settings;
mod spawner;
mod telemetry;

#[doc(inline)]
pub use builder::ResolverBuilder;
#[doc(inline)]
pub use geo::{Coordinate, LocationDictionary};
#[doc(inline)]
pub use geotier_memory::{MemoryTier, MemoryTierBuilder};
#[doc(inline)]
pub use geotier_persistent::{
    DEFAULT_DOCUMENT_NAME, FileStorage, InMemoryStorage, PersistentTier, PersistentTierBuilder, StorageService,
};
#[doc(inline)]
pub use geotier_remote::{GeocodeRequest, RemoteTier};
#[cfg(feature = "dynamic-tier")]
#[doc(inline)]
pub use geotier_tier::{DynamicTier, DynamicTierExt};
#[doc(inline)]
pub use geotier_tier::{Error, Result, ResultMap, Tier};
#[cfg(feature = "test-util")]
#[doc(inline)]
pub use geotier_tier::testing::{MockTier, TierOp};
#[doc(inline)]
pub use resolver::{Resolver, ResolverName};
#[doc(inline)]
pub use settings::{DEFAULT_MAX_CACHE_SIZE, DEFAULT_MAX_CACHE_SIZE_OVERFLOW, ResolverSettings};
#[doc(inline)]
pub use spawner::{BoxedFuture, Spawner};
