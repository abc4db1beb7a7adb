// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Adapter from a geocoding `Service` to a `Tier`.

use std::{collections::HashSet, hash::Hash, marker::PhantomData};

use geotier_tier::{Error, ResultMap, Tier};
use layered::Service;

use crate::GeocodeRequest;

/// The read-only remote tier.
///
/// Wraps a `Service<GeocodeRequest<K>>` answering with the subset of keys it
/// could resolve. Keys the service does not know are simply left out of its
/// answer; an `Err` means the service could not be reached.
///
/// # Examples
///
/// ```
/// use geotier_remote::{GeocodeRequest, RemoteTier};
/// use geotier_tier::{Error, ResultMap, Tier};
/// use layered::Execute;
///
/// # futures::executor::block_on(async {
/// let tier = RemoteTier::<String, u32, _>::new(Execute::new(|_: GeocodeRequest<String>| async {
///     Ok::<_, Error>(ResultMap::new())
/// }));
///
/// assert!(tier.persist(&ResultMap::from([("a".to_string(), 1)])).await.is_err());
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct RemoteTier<K, V, S> {
    service: S,
    _phantom: PhantomData<fn() -> (K, V)>,
}

impl<K, V, S> RemoteTier<K, V, S> {
    /// Creates a remote tier over `service`.
    #[must_use]
    pub fn new(service: S) -> Self {
        Self {
            service,
            _phantom: PhantomData,
        }
    }

    /// Returns a reference to the wrapped service.
    #[must_use]
    pub fn inner(&self) -> &S {
        &self.service
    }

    /// Consumes the tier and returns the wrapped service.
    #[must_use]
    pub fn into_inner(self) -> S {
        self.service
    }
}

impl<K, V, S> Tier<K, V> for RemoteTier<K, V, S>
where
    K: Clone + Eq + Hash + Send + Sync,
    V: Send + Sync,
    S: Service<GeocodeRequest<K>, Out = Result<ResultMap<K, V>, Error>>,
{
    async fn resolve(&self, keys: &[K]) -> Result<ResultMap<K, V>, Error> {
        if keys.is_empty() {
            return Ok(ResultMap::new());
        }

        let mut hits = self.service.execute(GeocodeRequest::new(keys.to_vec())).await?;
        // A service may answer with more than it was asked for.
        let requested: HashSet<&K> = keys.iter().collect();
        hits.retain(|key, _| requested.contains(key));
        Ok(hits)
    }

    async fn persist(&self, _entries: &ResultMap<K, V>) -> Result<(), Error> {
        Err(Error::read_only("remote"))
    }
}
