// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Bounded in-process memory tier backed by moka.
//!
//! This crate provides [`MemoryTier`], the fastest level of the geotier cascade.
//! Use [`MemoryTierBuilder`] to configure the size bound, its overflow allowance,
//! TTL and TTI without exposing moka types directly.
//!
//! # Quick Start
//!
//! ```
//! use geotier_memory::MemoryTierBuilder;
//! use geotier_tier::{ResultMap, Tier};
//!
//! # futures::executor::block_on(async {
//! let tier = MemoryTierBuilder::<String, (f64, f64)>::new()
//!     .max_size(3000)
//!     .overflow(100)
//!     .build();
//!
//! tier.persist(&ResultMap::from([("London".to_string(), (51.5, -0.1))])).await.unwrap();
//! let hits = tier.resolve(&["London".to_string(), "Paris".to_string()]).await.unwrap();
//! assert_eq!(hits.len(), 1);
//! # });
//! ```
//!
//! # Behavior
//!
//! - **Reads never promote**: `resolve` only reads; writing is the resolver's job
//! - **Bounded**: at most `max_size + overflow` entries, evicting least useful first
//! - **Thread-safe**: clones share one store and may be used from many tasks

pub mod builder;
pub mod tier;

#[doc(inline)]
pub use builder::MemoryTierBuilder;
#[doc(inline)]
pub use tier::MemoryTier;
