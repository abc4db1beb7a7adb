// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The request handed to a geocoding service.

/// A batch of keys the remote service is asked to resolve.
///
/// The resolver only ever sends the keys no faster tier could resolve, in the
/// order the caller requested them, without duplicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeocodeRequest<K> {
    keys: Vec<K>,
}

impl<K> GeocodeRequest<K> {
    /// Creates a request for `keys`.
    #[must_use]
    pub fn new(keys: Vec<K>) -> Self {
        Self { keys }
    }

    /// Returns the keys to resolve.
    #[must_use]
    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    /// Consumes the request and returns its keys.
    #[must_use]
    pub fn into_keys(self) -> Vec<K> {
        self.keys
    }

    /// Returns the number of keys in the request.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns `true` if the request carries no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl<K> From<Vec<K>> for GeocodeRequest<K> {
    fn from(keys: Vec<K>) -> Self {
        Self::new(keys)
    }
}
