// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Integration tests for the tier cascade.

use std::{
    pin::pin,
    sync::Arc,
    task::{Context, Poll, Waker},
};

use geotier::{BoxedFuture, Coordinate, Error, LocationDictionary, Resolver, ResultMap, Spawner, Tier};
use geotier_tier::testing::{MockTier, TierOp};
use parking_lot::Mutex;
use tick::Clock;

type Mock = MockTier<String, Coordinate>;
type MockResolver = Resolver<String, Coordinate, Mock, Mock, Mock>;

const LONDON: Coordinate = Coordinate::new(51.5, -0.1);
const PARIS: Coordinate = Coordinate::new(48.8, 2.3);
const TOKYO: Coordinate = Coordinate::new(35.7, 139.7);

fn block_on<F: std::future::Future>(f: F) -> F::Output {
    futures::executor::block_on(f)
}

fn keys(names: &[&str]) -> Vec<String> {
    names.iter().map(ToString::to_string).collect()
}

fn places(entries: &[(&str, Coordinate)]) -> LocationDictionary {
    entries.iter().map(|(name, at)| ((*name).to_string(), *at)).collect()
}

fn resolver(memory: &Mock, persistent: &Mock, remote: &Mock) -> MockResolver {
    Resolver::builder::<String, Coordinate>(Clock::new_frozen())
        .memory(memory.clone())
        .persistent(persistent.clone())
        .remote(remote.clone())
        .build()
}

#[test]
fn found_in_memory_and_persistent_tiers() {
    block_on(async {
        let memory = Mock::with_data([("London".to_string(), LONDON)]);
        let persistent = Mock::with_data([("Paris".to_string(), PARIS)]);
        let remote = Mock::new();
        let resolver = resolver(&memory, &persistent, &remote);

        let found = resolver.resolve_all(&keys(&["London", "Paris"])).await;

        assert_eq!(found, places(&[("London", LONDON), ("Paris", PARIS)]));
        assert_eq!(remote.resolve_count(), 0);
    });
}

#[test]
fn remote_result_is_backfilled_into_local_tiers() {
    block_on(async {
        let memory = Mock::new();
        let persistent = Mock::new();
        let remote = Mock::with_data([("Tokyo".to_string(), TOKYO)]);
        let resolver = resolver(&memory, &persistent, &remote);

        let found = resolver.resolve_all(&keys(&["Tokyo"])).await;

        assert_eq!(found, places(&[("Tokyo", TOKYO)]));
        assert_eq!(memory.value(&"Tokyo".to_string()), Some(TOKYO));
        assert_eq!(persistent.value(&"Tokyo".to_string()), Some(TOKYO));
        assert_eq!(remote.persist_count(), 0);
    });
}

#[test]
fn empty_request_touches_no_tier() {
    block_on(async {
        let (memory, persistent, remote) = (Mock::new(), Mock::new(), Mock::new());
        let resolver = resolver(&memory, &persistent, &remote);

        let found = resolver.resolve_all(&[]).await;

        assert!(found.is_empty());
        assert!(memory.operations().is_empty());
        assert!(persistent.operations().is_empty());
        assert!(remote.operations().is_empty());
    });
}

#[test]
fn unresolvable_key_is_simply_absent() {
    block_on(async {
        let (memory, persistent, remote) = (Mock::new(), Mock::new(), Mock::new());
        let resolver = resolver(&memory, &persistent, &remote);

        let found = resolver.resolve_all(&keys(&["Atlantis"])).await;

        assert!(found.is_empty());
        assert_eq!(remote.resolved_keys(), vec![keys(&["Atlantis"])]);
        // Nothing came back from the remote tier, so nothing is written back.
        assert_eq!(memory.persist_count(), 0);
        assert_eq!(persistent.persist_count(), 0);
    });
}

#[test]
fn each_tier_sees_only_the_keys_faster_tiers_missed() {
    block_on(async {
        let memory = Mock::with_data([("London".to_string(), LONDON)]);
        let persistent = Mock::with_data([("Paris".to_string(), PARIS)]);
        let remote = Mock::with_data([("Tokyo".to_string(), TOKYO)]);
        let resolver = resolver(&memory, &persistent, &remote);

        let found = resolver
            .resolve_all(&keys(&["Tokyo", "London", "Atlantis", "Paris"]))
            .await;

        assert_eq!(memory.resolved_keys(), vec![keys(&["Tokyo", "London", "Atlantis", "Paris"])]);
        assert_eq!(persistent.resolved_keys(), vec![keys(&["Tokyo", "Atlantis", "Paris"])]);
        assert_eq!(remote.resolved_keys(), vec![keys(&["Tokyo", "Atlantis"])]);
        assert_eq!(found, places(&[("London", LONDON), ("Paris", PARIS), ("Tokyo", TOKYO)]));
    });
}

#[test]
fn memory_hit_for_every_key_skips_slower_tiers() {
    block_on(async {
        let memory = Mock::with_data([("London".to_string(), LONDON), ("Paris".to_string(), PARIS)]);
        let (persistent, remote) = (Mock::new(), Mock::new());
        let resolver = resolver(&memory, &persistent, &remote);

        let found = resolver.resolve_all(&keys(&["Paris", "London"])).await;

        assert_eq!(found.len(), 2);
        assert_eq!(persistent.resolve_count(), 0);
        assert_eq!(remote.resolve_count(), 0);
    });
}

#[test]
fn persistent_hit_for_remaining_keys_skips_remote() {
    block_on(async {
        let memory = Mock::with_data([("London".to_string(), LONDON)]);
        let persistent = Mock::with_data([("Paris".to_string(), PARIS), ("Tokyo".to_string(), TOKYO)]);
        let remote = Mock::new();
        let resolver = resolver(&memory, &persistent, &remote);

        let found = resolver.resolve_all(&keys(&["London", "Paris", "Tokyo"])).await;

        assert_eq!(found.len(), 3);
        assert_eq!(remote.resolve_count(), 0);
        // Persistent hits are not promoted into memory.
        assert_eq!(memory.persist_count(), 0);
    });
}

#[test]
fn second_lookup_after_backfill_is_served_from_memory() {
    block_on(async {
        let (memory, persistent) = (Mock::new(), Mock::new());
        let remote = Mock::with_data([("Tokyo".to_string(), TOKYO), ("Paris".to_string(), PARIS)]);
        let resolver = resolver(&memory, &persistent, &remote);

        let first = resolver.resolve_all(&keys(&["Tokyo", "Paris"])).await;
        remote.clear_operations();
        persistent.clear_operations();

        let second = resolver.resolve_all(&keys(&["Tokyo", "Paris"])).await;

        assert_eq!(first, second);
        assert_eq!(remote.resolve_count(), 0);
        assert_eq!(persistent.resolve_count(), 0);
    });
}

/// A tier that answers with everything it holds, whatever it was asked for.
#[derive(Debug, Clone)]
struct Oversharing(LocationDictionary);

impl Tier<String, Coordinate> for Oversharing {
    async fn resolve(&self, _keys: &[String]) -> Result<LocationDictionary, Error> {
        Ok(self.0.clone())
    }

    async fn persist(&self, _entries: &LocationDictionary) -> Result<(), Error> {
        Ok(())
    }
}

#[test]
fn later_tier_wins_on_conflict() {
    block_on(async {
        let stale = Coordinate::new(0.0, 0.0);
        let resolver = Resolver::builder::<String, Coordinate>(Clock::new_frozen())
            .memory(Oversharing(places(&[("Paris", stale)])))
            .persistent(Oversharing(places(&[("Paris", PARIS), ("Rome", stale)])))
            .remote(Oversharing(places(&[("Rome", Coordinate::new(41.9, 12.5))])))
            .build();

        let found = resolver.resolve_all(&keys(&["Paris", "Rome", "Oslo"])).await;

        assert_eq!(found.get("Paris"), Some(&PARIS));
        assert_eq!(found.get("Rome"), Some(&Coordinate::new(41.9, 12.5)));
    });
}

#[test]
fn duplicate_keys_are_queried_once() {
    block_on(async {
        let (memory, persistent) = (Mock::new(), Mock::new());
        let remote = Mock::with_data([("Tokyo".to_string(), TOKYO)]);
        let resolver = resolver(&memory, &persistent, &remote);

        let found = resolver.resolve_all(&keys(&["Tokyo", "Oslo", "Tokyo", "Oslo"])).await;

        assert_eq!(found, places(&[("Tokyo", TOKYO)]));
        assert_eq!(memory.resolved_keys(), vec![keys(&["Tokyo", "Oslo"])]);
        assert_eq!(remote.resolved_keys(), vec![keys(&["Tokyo", "Oslo"])]);
    });
}

#[test]
fn failing_tiers_fall_through_to_the_next_tier() {
    block_on(async {
        let memory = Mock::with_data([("Paris".to_string(), PARIS)]);
        let persistent = Mock::with_data([("Paris".to_string(), PARIS)]);
        let remote = Mock::with_data([("Paris".to_string(), PARIS)]);
        memory.fail_when(|_| true);
        persistent.fail_when(|_| true);
        let resolver = resolver(&memory, &persistent, &remote);

        let found = resolver.resolve_all(&keys(&["Paris"])).await;

        assert_eq!(found, places(&[("Paris", PARIS)]));
        assert_eq!(persistent.resolved_keys(), vec![keys(&["Paris"])]);
        assert_eq!(remote.resolved_keys(), vec![keys(&["Paris"])]);
    });
}

#[test]
fn failing_remote_yields_local_hits_only() {
    block_on(async {
        let memory = Mock::with_data([("London".to_string(), LONDON)]);
        let persistent = Mock::new();
        let remote = Mock::with_data([("Tokyo".to_string(), TOKYO)]);
        remote.fail_when(|_| true);
        let resolver = resolver(&memory, &persistent, &remote);

        let found = resolver.resolve_all(&keys(&["London", "Tokyo"])).await;

        assert_eq!(found, places(&[("London", LONDON)]));
        assert_eq!(memory.persist_count(), 0);
        assert_eq!(persistent.persist_count(), 0);
    });
}

#[test]
fn backfill_failure_does_not_change_the_result() {
    block_on(async {
        let (memory, persistent) = (Mock::new(), Mock::new());
        let remote = Mock::with_data([("Tokyo".to_string(), TOKYO)]);
        memory.fail_when(|op| matches!(op, TierOp::Persist(_)));
        persistent.fail_when(|op| matches!(op, TierOp::Persist(_)));
        let resolver = resolver(&memory, &persistent, &remote);

        let found = resolver.resolve_all(&keys(&["Tokyo"])).await;

        assert_eq!(found, places(&[("Tokyo", TOKYO)]));
        assert_eq!(memory.persist_count(), 1);
        assert_eq!(persistent.persist_count(), 1);
    });
}

#[test]
fn backfill_writes_only_remote_hits() {
    block_on(async {
        let memory = Mock::with_data([("London".to_string(), LONDON)]);
        let persistent = Mock::with_data([("Paris".to_string(), PARIS)]);
        let remote = Mock::with_data([("Tokyo".to_string(), TOKYO)]);
        let resolver = resolver(&memory, &persistent, &remote);

        let _ = resolver.resolve_all(&keys(&["London", "Paris", "Tokyo"])).await;

        let backfilled = places(&[("Tokyo", TOKYO)]);
        assert!(memory.operations().contains(&TierOp::Persist(backfilled.clone())));
        assert!(persistent.operations().contains(&TierOp::Persist(backfilled)));
    });
}

#[test]
fn save_all_writes_both_local_tiers() {
    block_on(async {
        let (memory, persistent, remote) = (Mock::new(), Mock::new(), Mock::new());
        let resolver = resolver(&memory, &persistent, &remote);
        let entries = places(&[("London", LONDON), ("Paris", PARIS)]);

        resolver.save_all(&entries).await.expect("save failed");

        assert_eq!(memory.entry_count(), 2);
        assert_eq!(persistent.entry_count(), 2);
        assert!(remote.operations().is_empty());
    });
}

#[test]
fn save_all_twice_is_idempotent() {
    block_on(async {
        let (memory, persistent, remote) = (Mock::new(), Mock::new(), Mock::new());
        let resolver = resolver(&memory, &persistent, &remote);
        let entries = places(&[("London", LONDON)]);

        resolver.save_all(&entries).await.expect("save failed");
        let once = (memory.value(&"London".to_string()), persistent.value(&"London".to_string()));
        resolver.save_all(&entries).await.expect("save failed");

        assert_eq!(
            (memory.value(&"London".to_string()), persistent.value(&"London".to_string())),
            once
        );
        assert_eq!(memory.entry_count(), 1);
        assert_eq!(persistent.entry_count(), 1);
    });
}

#[test]
fn save_all_reports_persistent_failure() {
    block_on(async {
        let (memory, persistent, remote) = (Mock::new(), Mock::new(), Mock::new());
        persistent.fail_when(|_| true);
        let resolver = resolver(&memory, &persistent, &remote);

        let result = resolver.save_all(&places(&[("London", LONDON)])).await;

        assert!(result.is_err());
        // The memory write still happened.
        assert!(memory.contains_key(&"London".to_string()));
    });
}

#[test]
fn save_all_ignores_memory_failure() {
    block_on(async {
        let (memory, persistent, remote) = (Mock::new(), Mock::new(), Mock::new());
        memory.fail_when(|_| true);
        let resolver = resolver(&memory, &persistent, &remote);

        resolver
            .save_all(&places(&[("London", LONDON)]))
            .await
            .expect("memory failure must not fail the save");

        assert!(persistent.contains_key(&"London".to_string()));
    });
}

#[test]
fn save_all_with_nothing_to_save_touches_no_tier() {
    block_on(async {
        let (memory, persistent, remote) = (Mock::new(), Mock::new(), Mock::new());
        let resolver = resolver(&memory, &persistent, &remote);

        resolver.save_all(&ResultMap::new()).await.expect("save failed");

        assert!(memory.operations().is_empty());
        assert!(persistent.operations().is_empty());
    });
}

/// Memory tier whose writes never finish.
struct StalledMemory;

impl Tier<String, Coordinate> for StalledMemory {
    async fn resolve(&self, _keys: &[String]) -> Result<LocationDictionary, Error> {
        Ok(LocationDictionary::new())
    }

    async fn persist(&self, _entries: &LocationDictionary) -> Result<(), Error> {
        std::future::pending().await
    }
}

/// Memory tier that needs a second poll before it writes.
struct SlowMemory(Mock);

impl Tier<String, Coordinate> for SlowMemory {
    async fn resolve(&self, keys: &[String]) -> Result<LocationDictionary, Error> {
        self.0.resolve(keys).await
    }

    async fn persist(&self, entries: &LocationDictionary) -> Result<(), Error> {
        let mut yielded = false;
        futures::future::poll_fn(|cx| {
            if yielded {
                Poll::Ready(())
            } else {
                yielded = true;
                cx.waker().wake_by_ref();
                Poll::Pending
            }
        })
        .await;
        self.0.persist(entries).await
    }
}

#[test]
fn save_all_returns_without_waiting_for_memory() {
    let persistent = Mock::new();
    let resolver = Resolver::builder::<String, Coordinate>(Clock::new_frozen())
        .memory(StalledMemory)
        .persistent(persistent.clone())
        .remote(Mock::new())
        .build();
    let entries = places(&[("London", LONDON)]);

    let mut save = pin!(resolver.save_all(&entries));
    let mut cx = Context::from_waker(Waker::noop());

    assert!(matches!(save.as_mut().poll(&mut cx), Poll::Ready(Ok(()))));
    assert!(persistent.contains_key(&"London".to_string()));
}

#[test]
fn unfinished_memory_write_is_handed_to_spawner() {
    let queued = Arc::new(Mutex::new(Vec::<BoxedFuture>::new()));
    let spawner = Spawner::new({
        let queued = Arc::clone(&queued);
        move |work| queued.lock().push(work)
    });
    let (memory, persistent) = (Mock::new(), Mock::new());
    let resolver = Resolver::builder::<String, Coordinate>(Clock::new_frozen())
        .memory(SlowMemory(memory.clone()))
        .persistent(persistent.clone())
        .remote(Mock::new())
        .spawner(spawner)
        .build();

    block_on(resolver.save_all(&places(&[("London", LONDON)]))).expect("save failed");

    assert!(persistent.contains_key(&"London".to_string()));
    assert!(!memory.contains_key(&"London".to_string()));

    let work = queued.lock().pop().expect("memory write was spawned");
    block_on(work);
    assert!(memory.contains_key(&"London".to_string()));
}

#[test]
fn memory_write_finishing_first_is_not_spawned() {
    let queued = Arc::new(Mutex::new(Vec::<BoxedFuture>::new()));
    let spawner = Spawner::new({
        let queued = Arc::clone(&queued);
        move |work| queued.lock().push(work)
    });
    let (memory, persistent) = (Mock::new(), Mock::new());
    let resolver = Resolver::builder::<String, Coordinate>(Clock::new_frozen())
        .memory(memory.clone())
        .persistent(persistent.clone())
        .remote(Mock::new())
        .spawner(spawner)
        .build();

    block_on(resolver.save_all(&places(&[("London", LONDON)]))).expect("save failed");

    assert!(memory.contains_key(&"London".to_string()));
    assert!(queued.lock().is_empty());
}

#[test]
fn saved_entries_are_resolved_locally() {
    block_on(async {
        let (memory, persistent, remote) = (Mock::new(), Mock::new(), Mock::new());
        let resolver = resolver(&memory, &persistent, &remote);

        resolver.save_all(&places(&[("Oslo", Coordinate::new(59.9, 10.7))])).await.expect("save failed");
        let found = resolver.resolve_all(&keys(&["Oslo"])).await;

        assert_eq!(found.len(), 1);
        assert_eq!(persistent.resolve_count(), 0);
        assert_eq!(remote.resolve_count(), 0);
    });
}

#[test]
fn clones_share_tiers() {
    block_on(async {
        let (memory, persistent) = (Mock::new(), Mock::new());
        let remote = Mock::with_data([("Tokyo".to_string(), TOKYO)]);
        let resolver = resolver(&memory, &persistent, &remote);
        let clone = resolver.clone();

        let _ = resolver.resolve_all(&keys(&["Tokyo"])).await;
        remote.clear_operations();
        let found = clone.resolve_all(&keys(&["Tokyo"])).await;

        assert_eq!(found.len(), 1);
        assert_eq!(remote.resolve_count(), 0);
        assert!(clone.memory().contains_key(&"Tokyo".to_string()));
    });
}

#[test]
fn concurrent_lookups_are_independent() {
    block_on(async {
        let memory = Mock::with_data([("London".to_string(), LONDON)]);
        let persistent = Mock::new();
        let remote = Mock::with_data([("Tokyo".to_string(), TOKYO)]);
        let resolver = resolver(&memory, &persistent, &remote);

        let london = keys(&["London"]);
        let tokyo = keys(&["Tokyo"]);
        let (a, b) = futures::join!(resolver.resolve_all(&london), resolver.resolve_all(&tokyo));

        assert_eq!(a, places(&[("London", LONDON)]));
        assert_eq!(b, places(&[("Tokyo", TOKYO)]));
    });
}
