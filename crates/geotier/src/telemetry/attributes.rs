// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

// Field names below must match the fields emitted in `ResolverTelemetry::emit`.

#[cfg(any(feature = "metrics", test))]
pub(crate) const RESOLVER_NAME: &str = "resolver.name";

#[cfg(any(feature = "metrics", test))]
pub(crate) const RESOLVER_TIER: &str = "resolver.tier";

#[cfg(any(feature = "metrics", test))]
pub(crate) const RESOLVER_OPERATION: &str = "resolver.operation";

#[cfg(any(feature = "metrics", test))]
pub(crate) const RESOLVER_ACTIVITY: &str = "resolver.activity";

#[cfg(test)]
pub(crate) const RESOLVER_KEYS: &str = "resolver.keys";

#[cfg(test)]
pub(crate) const RESOLVER_DURATION: &str = "resolver.duration_ns";

#[cfg(test)]
pub(crate) const RESOLVER_ERROR: &str = "resolver.error";

#[cfg(test)]
pub(crate) const RESOLVER_EVENT: &str = "resolver.event";
