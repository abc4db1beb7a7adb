// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Host storage services backing the persistent tier.
//!
//! A [`StorageService`] stores named text documents. The persistent tier keeps
//! its whole dictionary in a single document, so a service only needs `get` and
//! `set`; durability is the service's business.

use std::{collections::HashMap, io::ErrorKind, path::PathBuf, sync::Arc};

use geotier_tier::Error;
use parking_lot::Mutex;

/// A host-provided key-value store for text documents.
pub trait StorageService: Send + Sync {
    /// Reads the document stored under `name`, or `None` if there is none.
    fn get(&self, name: &str) -> impl Future<Output = Result<Option<String>, Error>> + Send;

    /// Replaces the document stored under `name`.
    fn set(&self, name: &str, document: String) -> impl Future<Output = Result<(), Error>> + Send;
}

/// A storage service that keeps documents in process memory.
///
/// Clones share the same documents. Useful for tests and for hosts that have
/// no durable storage but still want the persistent tier's semantics.
///
/// # Examples
///
/// ```
/// use geotier_persistent::{InMemoryStorage, StorageService};
///
/// # futures::executor::block_on(async {
/// let storage = InMemoryStorage::new();
/// storage.set("doc", "{}".to_string()).await.unwrap();
/// assert_eq!(storage.get("doc").await.unwrap().as_deref(), Some("{}"));
/// # });
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryStorage {
    documents: Arc<Mutex<HashMap<String, String>>>,
}

impl InMemoryStorage {
    /// Creates an empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the document stored under `name`.
    #[must_use]
    pub fn document(&self, name: &str) -> Option<String> {
        self.documents.lock().get(name).cloned()
    }

    /// Returns how many documents are stored.
    #[must_use]
    pub fn document_count(&self) -> usize {
        self.documents.lock().len()
    }
}

impl StorageService for InMemoryStorage {
    async fn get(&self, name: &str) -> Result<Option<String>, Error> {
        Ok(self.document(name))
    }

    async fn set(&self, name: &str, document: String) -> Result<(), Error> {
        self.documents.lock().insert(name.to_string(), document);
        Ok(())
    }
}

/// A storage service that keeps each document in `<root>/<name>.json`.
///
/// Writes go to a temporary sibling file which is then renamed over the
/// target, so a crash mid-write never leaves a truncated document behind.
///
/// File I/O runs on the Tokio runtime's blocking pool. Called outside a Tokio
/// runtime, `get` and `set` return an error.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    /// Creates a file storage rooted at `root`. The directory is created on first write.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the directory documents are stored in.
    #[must_use]
    pub fn root(&self) -> &std::path::Path {
        &self.root
    }

    fn path_for(&self, name: &str, extension: &str) -> Result<PathBuf, Error> {
        if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
            return Err(Error::from_message(format!("invalid storage document name: {name:?}")));
        }
        Ok(self.root.join(format!("{name}.{extension}")))
    }
}

fn require_runtime() -> Result<(), Error> {
    tokio::runtime::Handle::try_current().map(drop).map_err(Error::from_message)
}

impl StorageService for FileStorage {
    async fn get(&self, name: &str) -> Result<Option<String>, Error> {
        let path = self.path_for(name, "json")?;
        require_runtime()?;
        match tokio::fs::read_to_string(&path).await {
            Ok(document) => Ok(Some(document)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::from_message(e)),
        }
    }

    async fn set(&self, name: &str, document: String) -> Result<(), Error> {
        let path = self.path_for(name, "json")?;
        let staging = self.path_for(name, "json.tmp")?;
        require_runtime()?;

        tokio::fs::create_dir_all(&self.root).await.map_err(Error::from_message)?;
        tokio::fs::write(&staging, document).await.map_err(Error::from_message)?;
        tokio::fs::rename(&staging, &path).await.map_err(Error::from_message)
    }
}
