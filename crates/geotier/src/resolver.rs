// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The tier cascade.

use std::{hash::Hash, marker::PhantomData, sync::Arc, time::Duration};

use futures::{
    future::{Either, select},
    join, pin_mut,
};
use geotier_tier::{Error, ResultMap, Tier};
use tick::{Clock, FutureExt};

use crate::{
    BoxedFuture, Spawner,
    builder::ResolverBuilder,
    pending,
    telemetry::{
        ResolverActivity, ResolverOperation, ResolverTelemetry, TierEvent, TierKind,
        ext::{ClockExt, TimedResult},
    },
};

/// Name identifying a resolver in logs and metrics.
pub type ResolverName = &'static str;

pub(crate) const DEFAULT_RESOLVER_NAME: ResolverName = "geotier";

pub(crate) struct ResolverInner<M, P, R> {
    pub(crate) memory: M,
    pub(crate) persistent: P,
    pub(crate) remote: R,
    pub(crate) clock: Clock,
    pub(crate) remote_timeout: Option<Duration>,
    pub(crate) spawner: Option<Spawner>,
    pub(crate) telemetry: ResolverTelemetry,
}

impl<M, P, R> ResolverInner<M, P, R> {
    fn report_write(&self, kind: TierKind, operation: ResolverOperation, keys: usize, timed: &TimedResult<Result<(), Error>>) {
        let (done, failed) = match operation {
            ResolverOperation::Backfill => (ResolverActivity::Backfilled, ResolverActivity::BackfillFailed),
            ResolverOperation::Resolve | ResolverOperation::Save => (ResolverActivity::Persisted, ResolverActivity::Unavailable),
        };
        let event = TierEvent::new(kind, operation, done, keys).with_duration(timed.duration);

        match &timed.result {
            Ok(()) => self.telemetry.record(&event),
            Err(error) => self.telemetry.record(&TierEvent { activity: failed, ..event }.with_error(error)),
        }
    }
}

/// Resolves keys through a memory, persistent and remote tier, in that order.
///
/// Each tier is only asked for the keys every faster tier missed, and the
/// cascade stops as soon as nothing is left to resolve. Values found remotely
/// are written back into the memory and persistent tiers so the next lookup
/// of the same keys is served locally.
///
/// A failing tier never fails the lookup: it contributes no hits and the next
/// tier is consulted. Keys no tier knows are absent from the result.
///
/// Clones share the same tiers.
///
/// # Examples
///
/// ```
/// use geotier::{Coordinate, GeocodeRequest, InMemoryStorage, LocationDictionary, Resolver};
/// use geotier::Error;
/// use layered::Execute;
/// use tick::Clock;
///
/// # futures::executor::block_on(async {
/// let geocoder = Execute::new(|request: GeocodeRequest<String>| async move {
///     Ok::<_, Error>(
///         request
///             .into_keys()
///             .into_iter()
///             .filter(|place| place == "Tokyo")
///             .map(|place| (place, Coordinate::new(35.7, 139.7)))
///             .collect::<LocationDictionary>(),
///     )
/// });
///
/// let resolver = Resolver::builder::<String, Coordinate>(Clock::new_frozen())
///     .default_memory()
///     .persistent_storage(InMemoryStorage::new())
///     .remote_service(geocoder)
///     .build();
///
/// let found = resolver.resolve_all(&["Tokyo".to_string(), "Atlantis".to_string()]).await;
/// assert_eq!(found.get("Tokyo"), Some(&Coordinate::new(35.7, 139.7)));
/// assert!(!found.contains_key("Atlantis"));
/// # });
/// ```
pub struct Resolver<K, V, M, P, R> {
    pub(crate) inner: Arc<ResolverInner<M, P, R>>,
    _phantom: PhantomData<fn() -> (K, V)>,
}

impl<K, V, M, P, R> std::fmt::Debug for Resolver<K, V, M, P, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("name", &self.inner.telemetry.name())
            .field("remote_timeout", &self.inner.remote_timeout)
            .finish_non_exhaustive()
    }
}

impl<K, V, M, P, R> Clone for Resolver<K, V, M, P, R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            _phantom: PhantomData,
        }
    }
}

impl Resolver<(), (), (), (), ()> {
    /// Starts building a resolver that times its tier calls on `clock`.
    ///
    /// The memory, persistent and remote tiers must all be set before
    /// `build()` becomes available.
    ///
    /// # Examples
    ///
    /// ```
    /// # #[cfg(feature = "test-util")]
    /// # fn main() {
    /// use geotier::{MockTier, Resolver};
    /// use tick::Clock;
    ///
    /// let resolver = Resolver::builder::<String, i32>(Clock::new_frozen())
    ///     .memory(MockTier::new())
    ///     .persistent(MockTier::new())
    ///     .remote(MockTier::new())
    ///     .name("places")
    ///     .build();
    ///
    /// assert_eq!(resolver.name(), "places");
    /// # }
    /// # #[cfg(not(feature = "test-util"))]
    /// # fn main() {}
    /// ```
    #[must_use]
    pub fn builder<K, V>(clock: Clock) -> ResolverBuilder<K, V> {
        ResolverBuilder::new(clock)
    }
}

impl<K, V, M, P, R> Resolver<K, V, M, P, R> {
    pub(crate) fn from_inner(inner: ResolverInner<M, P, R>) -> Self {
        Self {
            inner: Arc::new(inner),
            _phantom: PhantomData,
        }
    }

    /// Returns the memory tier.
    #[must_use]
    pub fn memory(&self) -> &M {
        &self.inner.memory
    }

    /// Returns the persistent tier.
    #[must_use]
    pub fn persistent(&self) -> &P {
        &self.inner.persistent
    }

    /// Returns the remote tier.
    #[must_use]
    pub fn remote(&self) -> &R {
        &self.inner.remote
    }

    /// Returns the name used in logs and metrics.
    #[must_use]
    pub fn name(&self) -> ResolverName {
        self.inner.telemetry.name()
    }

    /// Returns the deadline applied to remote queries, if any.
    #[must_use]
    pub fn remote_timeout(&self) -> Option<Duration> {
        self.inner.remote_timeout
    }
}

impl<K, V, M, P, R> Resolver<K, V, M, P, R>
where
    K: Clone + Eq + Hash + Send + Sync,
    V: Clone + Send + Sync,
    M: Tier<K, V>,
    P: Tier<K, V>,
    R: Tier<K, V>,
{
    /// Resolves as many of `requested` as any tier can.
    ///
    /// Repeated keys are looked up once. An empty request returns an empty
    /// map without touching any tier. When the same key comes back from more
    /// than one tier, the slower tier's value wins.
    ///
    /// Values obtained from the remote tier are written to the memory and
    /// persistent tiers before this returns; failed writes are logged.
    pub async fn resolve_all(&self, requested: &[K]) -> ResultMap<K, V> {
        let pending = pending::dedup(requested);
        if pending.is_empty() {
            return ResultMap::new();
        }

        let memory_hits = self.query(TierKind::Memory, &self.inner.memory, &pending).await;
        let pending = pending::narrow(pending, &memory_hits);
        if pending.is_empty() {
            self.record_short_circuit(TierKind::Memory, memory_hits.len());
            return memory_hits;
        }

        let persistent_hits = self.query(TierKind::Persistent, &self.inner.persistent, &pending).await;
        let pending = pending::narrow(pending, &persistent_hits);
        if pending.is_empty() {
            self.record_short_circuit(TierKind::Persistent, persistent_hits.len());
            return pending::merge([memory_hits, persistent_hits]);
        }

        let remote_hits = self.query_remote(&pending).await;
        if !remote_hits.is_empty() {
            self.backfill(&remote_hits).await;
        }

        pending::merge([memory_hits, persistent_hits, remote_hits])
    }

    /// Writes `entries` to the memory and persistent tiers.
    ///
    /// Returns as soon as the persistent write completes, with that write's
    /// result. A memory write still running at that point is handed to the
    /// configured [`Spawner`](crate::Spawner), or dropped if there is none.
    /// Memory tier failures are only logged. The remote tier is never written.
    ///
    /// # Errors
    ///
    /// Returns the persistent tier's error if its write fails.
    pub async fn save_all(&self, entries: &ResultMap<K, V>) -> Result<(), Error>
    where
        K: 'static,
        V: 'static,
        M: 'static,
        P: 'static,
        R: 'static,
    {
        if entries.is_empty() {
            return Ok(());
        }

        let keys = entries.len();
        let memory = self.save_to_memory(entries.clone());
        let persistent = self.inner.clock.timed_async(self.inner.persistent.persist(entries));
        pin_mut!(persistent);

        let persistent = match select(memory, persistent).await {
            Either::Left(((), persistent)) => persistent.await,
            Either::Right((persistent, memory)) => {
                self.detach(memory, keys);
                persistent
            }
        };

        self.inner
            .report_write(TierKind::Persistent, ResolverOperation::Save, keys, &persistent);
        persistent.result
    }

    async fn query<T: Tier<K, V>>(&self, kind: TierKind, tier: &T, keys: &[K]) -> ResultMap<K, V> {
        let timed = self.inner.clock.timed_async(tier.resolve(keys)).await;
        let event = TierEvent::new(kind, ResolverOperation::Resolve, ResolverActivity::Miss, keys.len()).with_duration(timed.duration);

        match timed.result {
            Ok(hits) => {
                self.inner.telemetry.record(&TierEvent {
                    activity: lookup_activity(&hits),
                    ..event
                });
                hits
            }
            Err(error) => {
                self.inner.telemetry.record(
                    &TierEvent {
                        activity: ResolverActivity::Unavailable,
                        ..event
                    }
                    .with_error(&error),
                );
                ResultMap::new()
            }
        }
    }

    async fn query_remote(&self, keys: &[K]) -> ResultMap<K, V> {
        let timed = self.inner.clock.timed_async(self.remote_with_deadline(keys)).await;
        let event = TierEvent::new(TierKind::Remote, ResolverOperation::Resolve, ResolverActivity::Miss, keys.len())
            .with_duration(timed.duration);

        match timed.result {
            Ok(Ok(hits)) => {
                self.inner.telemetry.record(&TierEvent {
                    activity: lookup_activity(&hits),
                    ..event
                });
                hits
            }
            Ok(Err(error)) => {
                self.inner.telemetry.record(
                    &TierEvent {
                        activity: ResolverActivity::Unavailable,
                        ..event
                    }
                    .with_error(&error),
                );
                ResultMap::new()
            }
            Err(elapsed) => {
                let error = Error::from_message(elapsed);
                self.inner.telemetry.record(
                    &TierEvent {
                        activity: ResolverActivity::TimedOut,
                        ..event
                    }
                    .with_error(&error),
                );
                ResultMap::new()
            }
        }
    }

    async fn remote_with_deadline(&self, keys: &[K]) -> Result<Result<ResultMap<K, V>, Error>, tick::Error> {
        let query = self.inner.remote.resolve(keys);
        match self.inner.remote_timeout {
            Some(limit) => query.timeout(&self.inner.clock, limit).await,
            None => Ok(query.await),
        }
    }

    async fn backfill(&self, entries: &ResultMap<K, V>) {
        let clock = &self.inner.clock;
        let (memory, persistent) = join!(
            clock.timed_async(self.inner.memory.persist(entries)),
            clock.timed_async(self.inner.persistent.persist(entries)),
        );
        self.inner
            .report_write(TierKind::Memory, ResolverOperation::Backfill, entries.len(), &memory);
        self.inner
            .report_write(TierKind::Persistent, ResolverOperation::Backfill, entries.len(), &persistent);
    }

    fn save_to_memory(&self, entries: ResultMap<K, V>) -> BoxedFuture
    where
        K: 'static,
        V: 'static,
        M: 'static,
        P: 'static,
        R: 'static,
    {
        let inner = Arc::clone(&self.inner);
        Box::pin(async move {
            let timed = inner.clock.timed_async(inner.memory.persist(&entries)).await;
            inner.report_write(TierKind::Memory, ResolverOperation::Save, entries.len(), &timed);
        })
    }

    fn detach(&self, memory: BoxedFuture, keys: usize) {
        match &self.inner.spawner {
            Some(spawner) => spawner.spawn(memory),
            None => {
                drop(memory);
                self.inner.telemetry.record(&TierEvent::new(
                    TierKind::Memory,
                    ResolverOperation::Save,
                    ResolverActivity::Abandoned,
                    keys,
                ));
            }
        }
    }

    fn record_short_circuit(&self, kind: TierKind, keys: usize) {
        self.inner.telemetry.record(&TierEvent::new(
            kind,
            ResolverOperation::Resolve,
            ResolverActivity::ShortCircuit,
            keys,
        ));
    }
}

fn lookup_activity<K, V>(hits: &ResultMap<K, V>) -> ResolverActivity {
    if hits.is_empty() {
        ResolverActivity::Miss
    } else {
        ResolverActivity::Hit
    }
}
