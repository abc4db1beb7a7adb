// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The persistent tier: a dictionary kept as one JSON document in host storage.

use std::{hash::Hash, marker::PhantomData, sync::Arc};

use geotier_tier::{Error, ResultMap, Tier};
use serde::{Serialize, de::DeserializeOwned};
use tokio::sync::Mutex;

use crate::storage::StorageService;

/// Document name used when none is configured.
pub const DEFAULT_DOCUMENT_NAME: &str = "geotier.locations";

struct PersistentTierInner<K, V, S> {
    storage: S,
    document_name: String,
    // `None` until the document has been read from storage.
    snapshot: Mutex<Option<ResultMap<K, V>>>,
}

/// A durable tier backed by a [`StorageService`].
///
/// The complete dictionary lives in a single document. The tier reads it
/// lazily on first use and keeps the decoded snapshot for later lookups; every
/// `persist` writes the merged dictionary back before updating the snapshot.
/// Clones share storage and snapshot.
///
/// # Examples
///
/// ```
/// use geotier_persistent::{InMemoryStorage, PersistentTier};
/// use geotier_tier::{ResultMap, Tier};
///
/// # futures::executor::block_on(async {
/// let tier = PersistentTier::<String, (f64, f64), _>::new(InMemoryStorage::new());
///
/// tier.persist(&ResultMap::from([("Paris".to_string(), (48.8, 2.3))])).await.unwrap();
/// let hits = tier.resolve(&["Paris".to_string()]).await.unwrap();
/// assert_eq!(hits.get("Paris"), Some(&(48.8, 2.3)));
/// # });
/// ```
pub struct PersistentTier<K, V, S> {
    inner: Arc<PersistentTierInner<K, V, S>>,
}

impl<K, V, S> std::fmt::Debug for PersistentTier<K, V, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistentTier")
            .field("document_name", &self.inner.document_name)
            .finish_non_exhaustive()
    }
}

impl<K, V, S> Clone for PersistentTier<K, V, S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, V, S> PersistentTier<K, V, S> {
    /// Creates a persistent tier storing its dictionary under [`DEFAULT_DOCUMENT_NAME`].
    #[must_use]
    pub fn new(storage: S) -> Self {
        Self::builder(storage).build()
    }

    /// Creates a builder for a persistent tier over `storage`.
    #[must_use]
    pub fn builder(storage: S) -> PersistentTierBuilder<K, V, S> {
        PersistentTierBuilder {
            storage,
            document_name: DEFAULT_DOCUMENT_NAME.to_string(),
            _phantom: PhantomData,
        }
    }

    /// Returns the name of the document the dictionary is stored under.
    #[must_use]
    pub fn document_name(&self) -> &str {
        &self.inner.document_name
    }

    /// Returns the storage service.
    #[must_use]
    pub fn storage(&self) -> &S {
        &self.inner.storage
    }

    /// Discards the loaded snapshot so the next access re-reads storage.
    pub async fn reload(&self) {
        *self.inner.snapshot.lock().await = None;
    }
}

impl<K, V, S> PersistentTier<K, V, S>
where
    K: Eq + Hash + DeserializeOwned,
    V: DeserializeOwned,
    S: StorageService,
{
    async fn read_document(&self) -> Result<ResultMap<K, V>, Error> {
        let name = &self.inner.document_name;
        let Some(document) = self.inner.storage.get(name).await? else {
            return Ok(ResultMap::new());
        };

        match serde_json::from_str(&document) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                tracing::warn!(
                    storage.document = name.as_str(),
                    error = %e,
                    "discarding unreadable persistent tier document"
                );
                Ok(ResultMap::new())
            }
        }
    }

    async fn loaded<'a>(&self, slot: &'a mut Option<ResultMap<K, V>>) -> Result<&'a mut ResultMap<K, V>, Error> {
        if slot.is_none() {
            *slot = Some(self.read_document().await?);
        }
        Ok(slot.get_or_insert_with(ResultMap::new))
    }
}

impl<K, V, S> Tier<K, V> for PersistentTier<K, V, S>
where
    K: Clone + Eq + Hash + Serialize + DeserializeOwned + Send + Sync,
    V: Clone + Serialize + DeserializeOwned + Send + Sync,
    S: StorageService,
{
    async fn resolve(&self, keys: &[K]) -> Result<ResultMap<K, V>, Error> {
        let mut slot = self.inner.snapshot.lock().await;
        let snapshot = self.loaded(&mut slot).await?;

        Ok(keys
            .iter()
            .filter_map(|key| snapshot.get(key).map(|value| (key.clone(), value.clone())))
            .collect())
    }

    async fn persist(&self, entries: &ResultMap<K, V>) -> Result<(), Error> {
        if entries.is_empty() {
            return Ok(());
        }

        let mut slot = self.inner.snapshot.lock().await;
        let snapshot = self.loaded(&mut slot).await?;

        let mut next = snapshot.clone();
        next.extend(entries.iter().map(|(key, value)| (key.clone(), value.clone())));
        let document = serde_json::to_string(&next).map_err(Error::from_message)?;

        self.inner.storage.set(&self.inner.document_name, document).await?;
        *snapshot = next;
        Ok(())
    }

    fn len(&self) -> Option<u64> {
        let slot = self.inner.snapshot.try_lock().ok()?;
        slot.as_ref().map(|snapshot| snapshot.len() as u64)
    }
}

/// Builder for configuring a [`PersistentTier`].
#[derive(Debug)]
pub struct PersistentTierBuilder<K, V, S> {
    storage: S,
    document_name: String,
    _phantom: PhantomData<(K, V)>,
}

impl<K, V, S> PersistentTierBuilder<K, V, S> {
    /// Sets the storage document the dictionary is kept under.
    #[must_use]
    pub fn document_name(mut self, name: impl Into<String>) -> Self {
        self.document_name = name.into();
        self
    }

    /// Builds the configured tier.
    #[must_use]
    pub fn build(self) -> PersistentTier<K, V, S> {
        PersistentTier {
            inner: Arc::new(PersistentTierInner {
                storage: self.storage,
                document_name: self.document_name,
                snapshot: Mutex::new(None),
            }),
        }
    }
}
