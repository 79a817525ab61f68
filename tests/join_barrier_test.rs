use std::{cell::Cell, rc::Rc};

use face_ngin::{
    OverlayError,
    resources::{
        ResourceKey,
        join::{FailurePolicy, JoinBarrier, JoinStatus, LoadState},
    },
};

use crate::common::test_utils::permutations;

mod common;

fn keys(names: &[&str]) -> Vec<ResourceKey> {
    names.iter().map(|name| ResourceKey::new(*name)).collect()
}

fn barrier_with(keys: &[ResourceKey], policy: FailurePolicy) -> JoinBarrier<String> {
    let mut barrier = JoinBarrier::new(policy);
    for key in keys {
        barrier.register(key.clone()).expect("fresh key");
    }
    barrier
}

#[test]
fn should_fire_once_after_last_completion_for_every_order() {
    let keys = keys(&["frame", "lenses", "branches", "deco"]);
    for order in permutations(keys.len()) {
        let mut barrier = barrier_with(&keys, FailurePolicy::Exclude);
        let fired = Rc::new(Cell::new(0));
        let counter = fired.clone();
        barrier.on_all_loaded(move |_| counter.set(counter.get() + 1));

        for (step, &idx) in order.iter().enumerate() {
            let status = barrier
                .on_loaded(&keys[idx], keys[idx].to_string())
                .expect("registered key");
            let is_last = step == keys.len() - 1;
            match status {
                JoinStatus::Ready(set) => {
                    assert!(is_last, "fired early for order {:?}", order);
                    let loaded: Vec<_> = set.loaded_keys().into_iter().cloned().collect();
                    // slot order is registration order, not completion order
                    assert_eq!(loaded, keys);
                }
                JoinStatus::Waiting { remaining } => {
                    assert!(!is_last);
                    assert_eq!(remaining, keys.len() - step - 1);
                }
                JoinStatus::Settled => panic!("settled before firing"),
            }
        }
        assert_eq!(fired.get(), 1, "order {:?}", order);
        assert!(barrier.has_fired());
    }
}

#[test]
fn should_attach_each_glasses_part_once_when_branches_finish_first() {
    let keys = keys(&["frame", "lenses", "branches"]);
    let mut barrier = barrier_with(&keys, FailurePolicy::Exclude);

    let branches = barrier.on_loaded(&keys[2], "branches".to_string()).unwrap();
    assert!(matches!(branches, JoinStatus::Waiting { remaining: 2 }));
    let frame = barrier.on_loaded(&keys[0], "frame".to_string()).unwrap();
    assert!(matches!(frame, JoinStatus::Waiting { remaining: 1 }));
    let lenses = barrier.on_loaded(&keys[1], "lenses".to_string()).unwrap();

    let JoinStatus::Ready(set) = lenses else {
        panic!("barrier did not fire after the third completion");
    };
    let assets: Vec<_> = set.slots().map(|(_, a)| a.cloned()).collect();
    assert_eq!(
        assets,
        vec![
            Some("frame".to_string()),
            Some("lenses".to_string()),
            Some("branches".to_string())
        ]
    );
    assert!(set.missing().is_empty());
}

#[test]
fn should_ignore_completions_after_firing() {
    let keys = keys(&["frame"]);
    let mut barrier = barrier_with(&keys, FailurePolicy::Exclude);
    assert!(matches!(
        barrier.on_loaded(&keys[0], "a".to_string()),
        Ok(JoinStatus::Ready(_))
    ));
    assert!(matches!(
        barrier.on_loaded(&keys[0], "b".to_string()),
        Ok(JoinStatus::Settled)
    ));
    assert!(matches!(
        barrier.register(ResourceKey::new("late")),
        Err(OverlayError::BarrierSettled(_))
    ));
}

#[test]
fn should_keep_first_result_of_a_task() {
    let keys = keys(&["frame", "lenses"]);
    let mut barrier = barrier_with(&keys, FailurePolicy::Exclude);
    barrier.on_loaded(&keys[0], "first".to_string()).unwrap();
    let again = barrier.on_loaded(&keys[0], "second".to_string()).unwrap();
    assert!(matches!(again, JoinStatus::Waiting { remaining: 1 }));
    match barrier.tasks()[0].state() {
        LoadState::Loaded(asset) => assert_eq!(asset, "first"),
        other => panic!("unexpected state {:?}", other),
    }
}

#[test]
fn should_reject_unknown_and_duplicate_keys() {
    let keys = keys(&["frame"]);
    let mut barrier = barrier_with(&keys, FailurePolicy::Exclude);
    assert!(matches!(
        barrier.register(keys[0].clone()),
        Err(OverlayError::DuplicateResource(_))
    ));
    assert!(matches!(
        barrier.on_loaded(&ResourceKey::new("hat"), "hat".to_string()),
        Err(OverlayError::UnknownResource(_))
    ));
    assert_eq!(barrier.remaining(), 1);
}

#[test]
fn should_fire_without_failed_asset_when_excluding() {
    let keys = keys(&["frame", "lenses", "bee"]);
    let mut barrier = barrier_with(&keys, FailurePolicy::Exclude);

    let failed = barrier
        .on_load_failed(&keys[2], anyhow::anyhow!("404"))
        .unwrap();
    assert!(matches!(failed, JoinStatus::Waiting { remaining: 2 }));
    barrier.on_loaded(&keys[1], "lenses".to_string()).unwrap();
    let JoinStatus::Ready(set) = barrier.on_loaded(&keys[0], "frame".to_string()).unwrap() else {
        panic!("barrier should fire once the remaining tasks settled");
    };
    assert_eq!(set.len(), 3);
    assert_eq!(set.missing(), vec![&keys[2]]);
    assert!(set.get(&keys[2]).is_none());
    assert_eq!(set.get(&keys[0]).map(String::as_str), Some("frame"));
}

#[test]
fn should_fire_even_if_every_load_failed_when_excluding() {
    let keys = keys(&["frame", "lenses"]);
    let mut barrier = barrier_with(&keys, FailurePolicy::Exclude);
    barrier.on_load_failed(&keys[0], anyhow::anyhow!("gone")).unwrap();
    let status = barrier.on_load_failed(&keys[1], anyhow::anyhow!("gone")).unwrap();
    let JoinStatus::Ready(set) = status else {
        panic!("barrier should fire with an empty scene");
    };
    assert!(set.loaded_keys().is_empty());
}

#[test]
fn should_never_fire_after_abort() {
    let keys = keys(&["frame", "lenses"]);
    let mut barrier = barrier_with(&keys, FailurePolicy::Abort);
    let fired = Rc::new(Cell::new(false));
    let flag = fired.clone();
    barrier.on_all_loaded(move |_| flag.set(true));

    barrier.on_loaded(&keys[0], "frame".to_string()).unwrap();
    let err = barrier
        .on_load_failed(&keys[1], anyhow::anyhow!("corrupt geometry"))
        .unwrap_err();
    match err {
        OverlayError::AssemblyAborted { key, reason } => {
            assert_eq!(key, keys[1]);
            assert!(reason.contains("corrupt geometry"));
        }
        other => panic!("unexpected error {:?}", other),
    }
    assert!(barrier.is_aborted());
    assert!(matches!(
        barrier.on_loaded(&keys[1], "lenses".to_string()),
        Ok(JoinStatus::Settled)
    ));
    assert!(!fired.get());
    assert!(!barrier.has_fired());
}

#[test]
fn should_stay_unfired_while_a_task_is_pending() {
    let keys = keys(&["frame", "lenses"]);
    let mut barrier = barrier_with(&keys, FailurePolicy::Exclude);
    barrier.on_loaded(&keys[0], "frame".to_string()).unwrap();
    assert!(!barrier.has_fired());
    assert_eq!(barrier.remaining(), 1);
    assert!(barrier.tasks()[1].is_pending());
}

#[test]
fn should_never_fire_without_registered_tasks() {
    let mut barrier: JoinBarrier<String> = JoinBarrier::new(FailurePolicy::Exclude);
    let fired = Rc::new(Cell::new(false));
    let flag = fired.clone();
    barrier.on_all_loaded(move |_| flag.set(true));

    assert_eq!(barrier.remaining(), 0);
    assert!(!fired.get());
    assert!(!barrier.has_fired());
    // the set stays open for registrations
    assert!(barrier.register(ResourceKey::new("frame")).is_ok());
}
