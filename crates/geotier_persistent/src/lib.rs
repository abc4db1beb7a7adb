// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Durable local-storage tier for the geotier lookup resolver.
//!
//! [`PersistentTier`] sits between the memory tier and the remote geocoding
//! tier: slower than memory, much cheaper than the network, and it survives
//! process restarts. It stores its whole dictionary as one JSON document in a
//! host-provided [`StorageService`].
//!
//! # Storage services
//!
//! - [`InMemoryStorage`]: documents in process memory, shared between clones
//! - [`FileStorage`]: one `<name>.json` file per document, replaced atomically
//!
//! Any other host store (a browser's local storage, a key-value database) only
//! has to implement [`StorageService`].
//!
//! # Failure handling
//!
//! A storage read or write failure is returned as an error; the resolver treats
//! it as the tier being unavailable. A document that cannot be decoded is
//! logged and treated as empty, and the next successful write replaces it.

pub mod storage;
pub mod tier;

#[doc(inline)]
pub use storage::{FileStorage, InMemoryStorage, StorageService};
#[doc(inline)]
pub use tier::{DEFAULT_DOCUMENT_NAME, PersistentTier, PersistentTierBuilder};
