// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Serializable resolver configuration.

use std::time::Duration;

use geotier_memory::MemoryTierBuilder;
use geotier_persistent::DEFAULT_DOCUMENT_NAME;
use serde::{Deserialize, Serialize};

/// Default number of entries the memory tier holds.
pub const DEFAULT_MAX_CACHE_SIZE: u64 = 3000;

/// Default number of entries the memory tier may hold beyond its maximum size.
pub const DEFAULT_MAX_CACHE_SIZE_OVERFLOW: u64 = 100;

/// Settings for a [`Resolver`](crate::Resolver) and its built-in tiers.
///
/// Every field has a default, so a partial document deserializes cleanly.
///
/// # Examples
///
/// ```
/// use geotier::ResolverSettings;
///
/// let settings: ResolverSettings = serde_json::from_str(r#"{ "max_cache_size": 500 }"#).unwrap();
/// assert_eq!(settings.max_cache_size, 500);
/// assert_eq!(settings.max_cache_size_overflow, 100);
/// assert_eq!(settings.remote_timeout, None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverSettings {
    /// Number of entries the memory tier keeps.
    pub max_cache_size: u64,
    /// Extra entries the memory tier may hold before it evicts.
    pub max_cache_size_overflow: u64,
    /// Upper bound on a single remote query. `None` waits indefinitely.
    pub remote_timeout: Option<Duration>,
    /// Storage document the persistent tier keeps its dictionary in.
    pub document_name: String,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            max_cache_size: DEFAULT_MAX_CACHE_SIZE,
            max_cache_size_overflow: DEFAULT_MAX_CACHE_SIZE_OVERFLOW,
            remote_timeout: None,
            document_name: DEFAULT_DOCUMENT_NAME.to_string(),
        }
    }
}

impl ResolverSettings {
    /// Returns a memory tier builder sized from these settings.
    #[must_use]
    pub fn memory_tier_builder<K, V>(&self) -> MemoryTierBuilder<K, V> {
        MemoryTierBuilder::new()
            .max_size(self.max_cache_size)
            .overflow(self.max_cache_size_overflow)
    }
}
