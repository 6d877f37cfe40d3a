use std::sync::Arc;
use std::thread;

use linkdeck_store::{InMemoryStore, Mutation, MutationFilter, StateStore, StoreError};
use proptest::prelude::*;

fn hydrated(links: &[u32]) -> InMemoryStore<u32> {
    let store = InMemoryStore::new();
    store.hydrate_links(links.to_vec()).unwrap();
    store
}

fn session_call() -> impl Strategy<Value = bool> {
    any::<bool>()
}

proptest! {
    #[test]
    fn last_session_call_wins(calls in prop::collection::vec(session_call(), 0..20)) {
        let store = InMemoryStore::<u32>::new();
        for &authorize in &calls {
            if authorize {
                store.authorize().unwrap();
            } else {
                store.de_authorize().unwrap();
            }
        }
        let expected = calls.last().copied().unwrap_or(false);
        prop_assert_eq!(store.is_authorized().unwrap(), expected);
    }

    #[test]
    fn hydrate_then_read_is_identity(links in prop::collection::vec(any::<u32>(), 0..32)) {
        let store = hydrated(&[7, 8, 9]);
        store.hydrate_links(links.clone()).unwrap();
        prop_assert_eq!(store.links().unwrap(), links);
    }

    #[test]
    fn drain_always_empties(links in prop::collection::vec(any::<u32>(), 0..32)) {
        let store = hydrated(&links);
        store.drain_links().unwrap();
        prop_assert!(store.is_empty().unwrap());
    }

    #[test]
    fn add_appends_at_end(links in prop::collection::vec(any::<u32>(), 0..32), x in any::<u32>()) {
        let store = hydrated(&links);
        store.add_link(x).unwrap();
        let after = store.links().unwrap();
        prop_assert_eq!(after.len(), links.len() + 1);
        prop_assert_eq!(after[links.len()], x);
        prop_assert_eq!(&after[..links.len()], &links[..]);
    }

    #[test]
    fn remove_shifts_tail(
        (links, i) in prop::collection::vec(any::<u32>(), 1..32)
            .prop_flat_map(|v| { let n = v.len(); (Just(v), 0..n) })
    ) {
        let store = hydrated(&links);
        store.remove_link(i).unwrap();
        let after = store.links().unwrap();
        prop_assert_eq!(after.len(), links.len() - 1);
        prop_assert_eq!(&after[..i], &links[..i]);
        prop_assert_eq!(&after[i..], &links[i + 1..]);
    }

    #[test]
    fn update_touches_one_slot(
        (links, i) in prop::collection::vec(any::<u32>(), 1..32)
            .prop_flat_map(|v| { let n = v.len(); (Just(v), 0..n) }),
        x in any::<u32>()
    ) {
        let store = hydrated(&links);
        store.update_link(i, x).unwrap();
        let mut expected = links.clone();
        expected[i] = x;
        prop_assert_eq!(store.links().unwrap(), expected);
    }

    #[test]
    fn out_of_range_is_rejected_without_change(
        links in prop::collection::vec(any::<u32>(), 0..16),
        past_end in 0usize..8
    ) {
        let store = hydrated(&links);
        let index = links.len() + past_end;
        let remove = store.remove_link(index);
        let is_out_of_range = matches!(remove, Err(StoreError::IndexOutOfRange { .. }));
        prop_assert!(is_out_of_range);
        prop_assert!(store.update_link(index, 0).is_err());
        prop_assert_eq!(store.links().unwrap(), links);
    }
}

#[test]
fn idempotent_transitions() {
    let once = InMemoryStore::<u32>::new();
    let twice = InMemoryStore::<u32>::new();
    once.authorize().unwrap();
    twice.authorize().unwrap();
    twice.authorize().unwrap();
    assert_eq!(once.snapshot().unwrap(), twice.snapshot().unwrap());

    once.de_authorize().unwrap();
    twice.de_authorize().unwrap();
    twice.de_authorize().unwrap();
    assert_eq!(once.snapshot().unwrap(), twice.snapshot().unwrap());

    let drained = hydrated(&[1, 2]);
    drained.drain_links().unwrap();
    let snapshot = drained.snapshot().unwrap();
    drained.drain_links().unwrap();
    assert_eq!(drained.snapshot().unwrap(), snapshot);
}

#[test]
fn independent_instances_do_not_share_state() {
    let a = InMemoryStore::<u32>::new();
    let b = InMemoryStore::<u32>::new();
    a.authorize().unwrap();
    a.add_link(1).unwrap();
    assert!(!b.is_authorized().unwrap());
    assert!(b.is_empty().unwrap());
}

#[test]
fn replayed_json_script_matches_direct_calls() {
    let script = r#"[
        {"type": "hydrateLinks", "payload": ["A", "B", "C"]},
        {"type": "authorize"},
        {"type": "removeLink", "payload": 1},
        {"type": "updateLink", "payload": {"link": "Z", "ind": 0}},
        {"type": "addLink", "payload": "D"}
    ]"#;
    let mutations: Vec<Mutation<String>> = serde_json::from_str(script).unwrap();
    let store = InMemoryStore::new();
    assert_eq!(store.commit_all(mutations).unwrap(), 5);
    assert!(store.is_authorized().unwrap());
    assert_eq!(store.links().unwrap(), vec!["Z", "C", "D"]);
}

#[test]
fn shared_store_across_threads() {
    let store = Arc::new(InMemoryStore::<usize>::new());
    let mut rx = store.subscribe(MutationFilter::all()).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for i in 0..25 {
                    store.add_link(t * 100 + i).unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(store.len().unwrap(), 100);
    assert_eq!(store.commit_count().unwrap(), 100);

    let mut last_seq = 0;
    let mut last_count = 0;
    while let Ok(event) = rx.try_recv() {
        assert_eq!(event.seq, last_seq + 1);
        assert_eq!(event.link_count, last_count + 1);
        last_seq = event.seq;
        last_count = event.link_count;
    }
    assert_eq!(last_seq, 100);
}
