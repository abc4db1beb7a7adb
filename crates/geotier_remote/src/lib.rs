// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! The remote tier of the geotier lookup resolver.
//!
//! [`RemoteTier`] adapts any [`layered::Service`] taking a [`GeocodeRequest`]
//! and answering with a [`ResultMap`](geotier_tier::ResultMap) into a
//! [`Tier`](geotier_tier::Tier). The geocoding client stays outside this
//! crate: batching, retries, rate limiting and authentication are the
//! service's concern, and any `layered` middleware can be stacked on it
//! before it is wrapped.
//!
//! The remote tier is authoritative and read-only. The resolver only sends it
//! the residual keys no faster tier could resolve, and an empty residual set
//! never reaches the service.

pub mod request;
pub mod tier;

#[doc(inline)]
pub use request::GeocodeRequest;
#[doc(inline)]
pub use tier::RemoteTier;
