// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Type-state builder for [`Resolver`].

use std::{hash::Hash, marker::PhantomData, time::Duration};

use geotier_memory::MemoryTier;
use geotier_persistent::{PersistentTier, StorageService};
use geotier_remote::{GeocodeRequest, RemoteTier};
use geotier_tier::{Error, ResultMap, Tier};
use layered::Service;
#[cfg(any(feature = "metrics", test))]
use opentelemetry::metrics::{Meter, MeterProvider};
use tick::Clock;

use crate::{
    ResolverSettings, Spawner,
    resolver::{DEFAULT_RESOLVER_NAME, Resolver, ResolverInner, ResolverName},
    telemetry::ResolverTelemetry,
};

#[derive(Debug)]
struct Common {
    clock: Clock,
    name: ResolverName,
    settings: ResolverSettings,
    spawner: Option<Spawner>,
    #[cfg(any(feature = "metrics", test))]
    meter: Option<Meter>,
}

/// Builder for a [`Resolver`].
///
/// Created by [`Resolver::builder`]. The three tier slots start empty (`()`);
/// [`build`](Self::build) exists only once every slot holds a [`Tier`].
///
/// Options that derive a tier from [`ResolverSettings`] (`default_memory`,
/// `persistent_storage`) read the settings configured so far, so call
/// [`settings`](Self::settings) first.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use geotier::{Coordinate, Error, GeocodeRequest, InMemoryStorage, LocationDictionary, Resolver, ResolverSettings};
/// use layered::Execute;
/// use tick::Clock;
///
/// let settings = ResolverSettings {
///     max_cache_size: 500,
///     ..ResolverSettings::default()
/// };
///
/// let resolver = Resolver::builder::<String, Coordinate>(Clock::new_frozen())
///     .settings(settings)
///     .default_memory()
///     .persistent_storage(InMemoryStorage::new())
///     .remote_service(Execute::new(|_: GeocodeRequest<String>| async {
///         Ok::<_, Error>(LocationDictionary::new())
///     }))
///     .remote_timeout(Duration::from_secs(10))
///     .name("places")
///     .build();
///
/// assert_eq!(resolver.remote_timeout(), Some(Duration::from_secs(10)));
/// assert_eq!(resolver.persistent().document_name(), "geotier.locations");
/// ```
#[derive(Debug)]
pub struct ResolverBuilder<K, V, M = (), P = (), R = ()> {
    common: Common,
    memory: M,
    persistent: P,
    remote: R,
    _phantom: PhantomData<fn() -> (K, V)>,
}

impl<K, V> ResolverBuilder<K, V> {
    pub(crate) fn new(clock: Clock) -> Self {
        Self {
            common: Common {
                clock,
                name: DEFAULT_RESOLVER_NAME,
                settings: ResolverSettings::default(),
                spawner: None,
                #[cfg(any(feature = "metrics", test))]
                meter: None,
            },
            memory: (),
            persistent: (),
            remote: (),
            _phantom: PhantomData,
        }
    }
}

impl<K, V, M, P, R> ResolverBuilder<K, V, M, P, R> {
    /// Replaces the settings.
    #[must_use]
    pub fn settings(mut self, settings: ResolverSettings) -> Self {
        self.common.settings = settings;
        self
    }

    /// Bounds each remote query. When the deadline passes, the remote tier is
    /// treated as unavailable for that lookup.
    #[must_use]
    pub fn remote_timeout(mut self, timeout: Duration) -> Self {
        self.common.settings.remote_timeout = Some(timeout);
        self
    }

    /// Sets the name reported in logs and metrics.
    #[must_use]
    pub fn name(mut self, name: ResolverName) -> Self {
        self.common.name = name;
        self
    }

    /// Finishes memory writes that are still running when `save_all` returns.
    ///
    /// Without a spawner such writes are dropped.
    #[must_use]
    pub fn spawner(mut self, spawner: Spawner) -> Self {
        self.common.spawner = Some(spawner);
        self
    }

    /// Records tier events as OpenTelemetry metrics on `provider`.
    #[cfg(any(feature = "metrics", test))]
    #[must_use]
    pub fn metrics(mut self, provider: &dyn MeterProvider) -> Self {
        self.common.meter = Some(crate::telemetry::metrics::create_meter(provider));
        self
    }

    /// Sets the memory tier.
    pub fn memory<T>(self, tier: T) -> ResolverBuilder<K, V, T, P, R>
    where
        T: Tier<K, V>,
    {
        ResolverBuilder {
            common: self.common,
            memory: tier,
            persistent: self.persistent,
            remote: self.remote,
            _phantom: PhantomData,
        }
    }

    /// Uses a [`MemoryTier`] bounded by the configured cache size and overflow.
    #[must_use]
    pub fn default_memory(self) -> ResolverBuilder<K, V, MemoryTier<K, V>, P, R>
    where
        K: Clone + Eq + Hash + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
    {
        let tier = self.common.settings.memory_tier_builder::<K, V>().build();
        self.memory(tier)
    }

    /// Sets the persistent tier.
    pub fn persistent<T>(self, tier: T) -> ResolverBuilder<K, V, M, T, R>
    where
        T: Tier<K, V>,
    {
        ResolverBuilder {
            common: self.common,
            memory: self.memory,
            persistent: tier,
            remote: self.remote,
            _phantom: PhantomData,
        }
    }

    /// Uses a [`PersistentTier`] over `storage`, keeping its dictionary under
    /// the configured document name.
    pub fn persistent_storage<S>(self, storage: S) -> ResolverBuilder<K, V, M, PersistentTier<K, V, S>, R>
    where
        K: Clone + Eq + Hash + serde::Serialize + serde::de::DeserializeOwned + Send + Sync,
        V: Clone + serde::Serialize + serde::de::DeserializeOwned + Send + Sync,
        S: StorageService,
    {
        let tier = PersistentTier::builder(storage)
            .document_name(self.common.settings.document_name.clone())
            .build();
        self.persistent(tier)
    }

    /// Sets the remote tier.
    pub fn remote<T>(self, tier: T) -> ResolverBuilder<K, V, M, P, T>
    where
        T: Tier<K, V>,
    {
        ResolverBuilder {
            common: self.common,
            memory: self.memory,
            persistent: self.persistent,
            remote: tier,
            _phantom: PhantomData,
        }
    }

    /// Uses a geocoding service as the remote tier.
    pub fn remote_service<S>(self, service: S) -> ResolverBuilder<K, V, M, P, RemoteTier<K, V, S>>
    where
        K: Clone + Eq + Hash + Send + Sync,
        V: Send + Sync,
        S: Service<GeocodeRequest<K>, Out = Result<ResultMap<K, V>, Error>>,
    {
        self.remote(RemoteTier::new(service))
    }
}

impl<K, V, M, P, R> ResolverBuilder<K, V, M, P, R>
where
    M: Tier<K, V>,
    P: Tier<K, V>,
    R: Tier<K, V>,
{
    /// Builds the resolver.
    #[must_use]
    pub fn build(self) -> Resolver<K, V, M, P, R> {
        let common = self.common;

        let telemetry = ResolverTelemetry::new(common.name);
        #[cfg(any(feature = "metrics", test))]
        let telemetry = match &common.meter {
            Some(meter) => telemetry.with_meter(meter),
            None => telemetry,
        };

        Resolver::from_inner(ResolverInner {
            memory: self.memory,
            persistent: self.persistent,
            remote: self.remote,
            clock: common.clock,
            remote_timeout: common.settings.remote_timeout,
            spawner: common.spawner,
            telemetry,
        })
    }
}
