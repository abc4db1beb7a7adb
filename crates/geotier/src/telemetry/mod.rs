// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Resolver telemetry.
//!
//! Every tier call made by the resolver produces one event. Events are always
//! emitted through `tracing`; a subscriber decides which levels are kept. With
//! the `metrics` feature and a meter provider configured, the same events are
//! counted and timed through OpenTelemetry.

use std::time::Duration;

use geotier_tier::Error;
#[cfg(any(feature = "metrics", test))]
use opentelemetry::{
    KeyValue,
    metrics::{Counter, Histogram, Meter},
};
use tracing::Level;

use crate::resolver::ResolverName;

pub(crate) mod attributes;
pub(crate) mod ext;
#[cfg(any(feature = "metrics", test))]
pub(crate) mod metrics;
#[cfg(test)]
pub(crate) mod testing;

/// The tier an event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TierKind {
    Memory,
    Persistent,
    Remote,
}

impl TierKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Persistent => "persistent",
            Self::Remote => "remote",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ResolverOperation {
    Resolve,
    Save,
    Backfill,
}

impl ResolverOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Resolve => "resolver.resolve",
            Self::Save => "resolver.save",
            Self::Backfill => "resolver.backfill",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ResolverActivity {
    /// The tier resolved at least one key.
    Hit,
    /// The tier resolved none of the keys it was asked for.
    Miss,
    /// The tier resolved every remaining key; slower tiers were skipped.
    ShortCircuit,
    Persisted,
    Backfilled,
    /// The tier failed; the cascade continued without its results.
    Unavailable,
    TimedOut,
    BackfillFailed,
    /// A memory write outlived `save_all` and no spawner was set to finish it.
    Abandoned,
}

impl ResolverActivity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hit => "resolver.hit",
            Self::Miss => "resolver.miss",
            Self::ShortCircuit => "resolver.short_circuit",
            Self::Persisted => "resolver.persisted",
            Self::Backfilled => "resolver.backfilled",
            Self::Unavailable => "resolver.unavailable",
            Self::TimedOut => "resolver.timed_out",
            Self::BackfillFailed => "resolver.backfill_failed",
            Self::Abandoned => "resolver.abandoned",
        }
    }

    pub fn level(self) -> Level {
        match self {
            Self::Hit | Self::Miss | Self::ShortCircuit => Level::DEBUG,
            Self::Persisted | Self::Backfilled | Self::Abandoned => Level::INFO,
            Self::Unavailable | Self::TimedOut | Self::BackfillFailed => Level::WARN,
        }
    }
}

/// One observation about a tier call.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TierEvent<'a> {
    pub tier: TierKind,
    pub operation: ResolverOperation,
    pub activity: ResolverActivity,
    pub keys: usize,
    pub duration: Option<Duration>,
    pub error: Option<&'a Error>,
}

impl<'a> TierEvent<'a> {
    pub fn new(tier: TierKind, operation: ResolverOperation, activity: ResolverActivity, keys: usize) -> Self {
        Self {
            tier,
            operation,
            activity,
            keys,
            duration: None,
            error: None,
        }
    }

    #[must_use]
    pub fn with_duration(self, duration: Duration) -> Self {
        Self {
            duration: Some(duration),
            ..self
        }
    }

    #[must_use]
    pub fn with_error(self, error: &'a Error) -> Self {
        Self { error: Some(error), ..self }
    }
}

/// Records resolver events as logs and, when configured, metrics.
#[derive(Clone, Debug)]
pub(crate) struct ResolverTelemetry {
    name: ResolverName,
    #[cfg(any(feature = "metrics", test))]
    event_counter: Option<Counter<u64>>,
    #[cfg(any(feature = "metrics", test))]
    tier_duration: Option<Histogram<f64>>,
}

impl ResolverTelemetry {
    pub fn new(name: ResolverName) -> Self {
        Self {
            name,
            #[cfg(any(feature = "metrics", test))]
            event_counter: None,
            #[cfg(any(feature = "metrics", test))]
            tier_duration: None,
        }
    }

    #[cfg(any(feature = "metrics", test))]
    #[must_use]
    pub fn with_meter(self, meter: &Meter) -> Self {
        Self {
            event_counter: Some(metrics::create_event_counter(meter)),
            tier_duration: Some(metrics::create_tier_duration_histogram(meter)),
            ..self
        }
    }

    pub fn name(&self) -> ResolverName {
        self.name
    }

    pub fn record(&self, event: &TierEvent<'_>) {
        #[cfg(any(feature = "metrics", test))]
        self.record_metrics(event);

        self.emit(event);
    }

    #[cfg(any(feature = "metrics", test))]
    fn record_metrics(&self, event: &TierEvent<'_>) {
        let attrs = [
            KeyValue::new(attributes::RESOLVER_NAME, self.name),
            KeyValue::new(attributes::RESOLVER_TIER, event.tier.as_str()),
            KeyValue::new(attributes::RESOLVER_OPERATION, event.operation.as_str()),
            KeyValue::new(attributes::RESOLVER_ACTIVITY, event.activity.as_str()),
        ];

        if let Some(counter) = &self.event_counter {
            counter.add(1, &attrs);
        }

        if let (Some(duration), Some(histogram)) = (event.duration, &self.tier_duration) {
            histogram.record(duration.as_secs_f64(), &attrs);
        }
    }

    fn emit(&self, event: &TierEvent<'_>) {
        let name = self.name;
        let tier = event.tier.as_str();
        let op = event.operation.as_str();
        let activity = event.activity.as_str();
        let keys = event.keys;
        let duration_ns = event.duration.map(|d| d.as_nanos());
        let error = event.error.map(tracing::field::display);

        // Tracing levels must be constant, so the level is picked by macro arm.
        macro_rules! emit_event {
            ($level:ident) => {
                tracing::$level!(
                    resolver.name = name,
                    resolver.tier = tier,
                    resolver.operation = op,
                    resolver.activity = activity,
                    resolver.keys = keys,
                    resolver.duration_ns = ?duration_ns,
                    resolver.error = error,
                    "resolver.event"
                )
            };
        }

        match event.activity.level() {
            Level::WARN => emit_event!(warn),
            Level::INFO => emit_event!(info),
            _ => emit_event!(debug),
        }
    }
}
