// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Hands off work the resolver does not wait for.

use std::{fmt::Debug, pin::Pin, sync::Arc};

/// A boxed future handed to a [`Spawner`].
pub type BoxedFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

type SpawnFn = dyn Fn(BoxedFuture) + Send + Sync;

/// Runs background work on whatever runtime the host uses.
///
/// [`Resolver::save_all`](crate::Resolver::save_all) returns as soon as the
/// persistent write completes. If the memory write is still running then, it
/// is passed to the spawner. Without a spawner the unfinished memory write is
/// dropped; the entries remain in the persistent tier.
///
/// # Examples
///
/// ```
/// use geotier::Spawner;
///
/// let spawner = Spawner::new(|work| {
///     std::thread::spawn(move || futures::executor::block_on(work));
/// });
/// # let _ = spawner;
/// ```
#[derive(Clone)]
pub struct Spawner(Arc<SpawnFn>);

impl Spawner {
    /// Creates a spawner from a closure that runs each future it receives to
    /// completion.
    #[must_use]
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(BoxedFuture) + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Creates a spawner that uses the Tokio runtime.
    ///
    /// # Panics
    ///
    /// Spawning panics if called outside of a Tokio runtime context.
    #[cfg(feature = "tokio")]
    #[cfg_attr(docsrs, doc(cfg(feature = "tokio")))]
    #[must_use]
    pub fn new_tokio() -> Self {
        Self::new(|work| {
            drop(tokio::spawn(work));
        })
    }

    pub(crate) fn spawn(&self, work: impl Future<Output = ()> + Send + 'static) {
        (self.0)(Box::pin(work));
    }
}

impl Debug for Spawner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Spawner").finish_non_exhaustive()
    }
}
