// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Resolvers over type-erased tiers.

use geotier::{Coordinate, Resolver};
use geotier_tier::{DynamicTier, DynamicTierExt, testing::MockTier};
use tick::Clock;

#[test]
fn resolver_over_dynamic_tiers() {
    futures::executor::block_on(async {
        let memory = MockTier::<String, Coordinate>::new();
        let remote = MockTier::with_data([("Lima".to_string(), Coordinate::new(-12.0, -77.0))]);

        let resolver: Resolver<String, Coordinate, DynamicTier<_, _>, DynamicTier<_, _>, DynamicTier<_, _>> =
            Resolver::builder::<String, Coordinate>(Clock::new_frozen())
                .memory(memory.clone().into_dynamic())
                .persistent(MockTier::new().into_dynamic())
                .remote(remote.into_dynamic())
                .build();

        let found = resolver.resolve_all(&["Lima".to_string()]).await;

        assert_eq!(found.len(), 1);
        assert!(memory.contains_key(&"Lima".to_string()));
    });
}

#[test]
fn tiers_of_different_types_share_one_resolver_type() {
    let tiers: Vec<DynamicTier<String, Coordinate>> = vec![
        MockTier::new().into_dynamic(),
        geotier::MemoryTier::new().into_dynamic(),
    ];
    assert_eq!(tiers.len(), 2);
}
