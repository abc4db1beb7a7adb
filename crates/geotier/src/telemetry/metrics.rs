// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use opentelemetry::{
    InstrumentationScope,
    metrics::{Counter, Histogram, Meter, MeterProvider},
};

const METER_NAME: &str = "geotier";
const VERSION: &str = "v0.1.0";
const SCHEMA_URL: &str = "https://opentelemetry.io/schemas/1.47.0";
pub(crate) const RESOLVER_EVENT_COUNT_NAME: &str = "resolver.event.count";
pub(crate) const RESOLVER_TIER_DURATION_NAME: &str = "resolver.tier.duration";

pub(crate) fn create_meter(meter_provider: &dyn MeterProvider) -> Meter {
    meter_provider.meter_with_scope(
        InstrumentationScope::builder(METER_NAME)
            .with_version(VERSION)
            .with_schema_url(SCHEMA_URL)
            .build(),
    )
}

pub(crate) fn create_event_counter(meter: &Meter) -> Counter<u64> {
    meter
        .u64_counter(RESOLVER_EVENT_COUNT_NAME)
        .with_description("Resolver tier events")
        .with_unit("{event}")
        .build()
}

pub(crate) fn create_tier_duration_histogram(meter: &Meter) -> Histogram<f64> {
    meter
        .f64_histogram(RESOLVER_TIER_DURATION_NAME)
        .with_description("Duration of a single tier call")
        .with_unit("s")
        .build()
}
