#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
//! Per-thread navigation and shared-store locking

use std::sync::{Arc, Barrier};
use std::thread;

use vini::Settings;
use vini::lock::PathLock;

#[test]
fn threads_see_only_their_own_group() {
    let settings = Settings::in_memory();
    let barrier = Barrier::new(2);

    thread::scope(|s| {
        for name in ["A", "B"] {
            let settings = &settings;
            let barrier = &barrier;
            s.spawn(move || {
                settings.begin_group(name).unwrap();
                barrier.wait();
                for i in 0..50 {
                    assert_eq!(settings.group(), name);
                    settings.set_value("counter", i).unwrap();
                }
                barrier.wait();
                assert_eq!(settings.group(), name);
                settings.end_group();
            });
        }
    });

    assert_eq!(settings.value("A/counter").unwrap().as_str(), "49");
    assert_eq!(settings.value("B/counter").unwrap().as_str(), "49");
    assert_eq!(settings.context_count(), 0);
}

#[test]
fn concurrent_array_writers_do_not_mix() {
    let settings = Settings::in_memory();

    thread::scope(|s| {
        for list in ["left", "right"] {
            let settings = &settings;
            s.spawn(move || {
                settings.begin_write_array(list, None).unwrap();
                for i in 0..10 {
                    settings.set_array_index(i);
                    settings.set_value("item", format!("{list}{i}")).unwrap();
                }
                settings.end_array().unwrap();
            });
        }
    });

    for list in ["left", "right"] {
        assert!(settings.is_array(list));
        assert_eq!(settings.begin_read_array(list).unwrap(), 10);
        settings.set_array_index(9);
        assert_eq!(
            settings.value("item").unwrap().as_str(),
            format!("{list}9")
        );
        settings.end_array().unwrap();
    }
}

#[test]
fn clear_context_releases_a_stuck_thread() {
    let settings = Settings::in_memory();

    thread::scope(|s| {
        s.spawn(|| {
            settings.begin_group("left-open").unwrap();
        });
    });
    assert_eq!(settings.context_count(), 1);

    thread::scope(|s| {
        s.spawn(|| {
            settings.begin_group("tidy").unwrap();
            settings.clear_context();
        });
    });
    assert_eq!(settings.context_count(), 1);
}

#[test]
fn handles_on_one_store_share_a_counted_lock() {
    let settings = Arc::new(Settings::in_memory());
    let location = format!("{settings:?}");
    assert!(location.contains("memory:"));

    let copy = (*settings).clone();
    copy.set_value("shared", 1).unwrap();
    assert!(settings.contains("shared"));

    let key = "test:shared-handle-lock";
    let first = PathLock::acquire(key);
    let second = first.clone();
    assert_eq!(PathLock::registered_refs(key), 2);
    drop(first);
    drop(second);
    assert_eq!(PathLock::registered_refs(key), 0);
}

#[test]
fn reentrant_calls_do_not_deadlock() {
    let settings = Settings::in_memory();
    settings.set_value("a/b", 1).unwrap();

    let mut keys = Vec::new();
    settings
        .traverse_array("missing", |_, key, _| {
            keys.push(key.to_string());
            true
        })
        .unwrap();
    assert!(keys.is_empty());

    settings.begin_group("a").unwrap();
    assert!(settings.contains("b"));
    settings.end_group();
}
