//! End-to-end toaster behavior against a manual clock

use std::sync::{Arc, Mutex};

use kestrel_core::{ManualClock, MemoryKv, Subscription};
use kestrel_toast::{
    Persistence, RemoveOutcome, RemoveReason, ToastEvent, ToastId, ToastOptions, ToastPosition,
    ToastSettings, Toaster, ToasterConfig, PERSIST_KEY,
};

fn setup(config: ToasterConfig) -> (Arc<ManualClock>, Toaster) {
    let clock = Arc::new(ManualClock::new());
    let toaster = Toaster::builder(clock.clone())
        .settings(ToastSettings {
            toaster: config,
            ..Default::default()
        })
        .build();
    (clock, toaster)
}

fn record_events(toaster: &Toaster) -> (Arc<Mutex<Vec<ToastEvent>>>, Subscription) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    let sub = toaster.subscribe(move |event| sink.lock().unwrap().push(event.clone()));
    (events, sub)
}

fn titles(toaster: &Toaster, position: ToastPosition) -> Vec<String> {
    toaster
        .toasts(position)
        .into_iter()
        .filter_map(|t| t.title)
        .collect()
}

#[test]
fn duplicate_adds_collapse_within_window() {
    let (clock, toaster) = setup(ToasterConfig::default());

    let first = toaster.add(ToastOptions::titled("Saved").description("All changes stored"));
    clock.advance(100);
    let second = toaster.add(ToastOptions::titled("Saved").description("All changes stored"));
    assert_eq!(first, second);
    assert_eq!(toaster.len(), 1);

    clock.advance(500);
    let third = toaster.add(ToastOptions::titled("Saved").description("All changes stored"));
    assert_ne!(first, third);
    assert_eq!(toaster.len(), 2);
}

#[test]
fn duplicate_of_removed_toast_is_added_again() {
    let (clock, toaster) = setup(ToasterConfig::default());

    let first = toaster.add(ToastOptions::titled("Saved"));
    assert_eq!(toaster.remove(&first), RemoveOutcome::Removed);
    clock.advance(100);

    let again = toaster.add(ToastOptions::titled("Saved"));
    assert_ne!(first, again);
    assert!(toaster.is_active(&again));
    assert_eq!(toaster.len(), 1);
}

#[test]
fn duplicate_of_evicted_toast_is_added_again() {
    let (clock, toaster) = setup(ToasterConfig::default().max(1));

    let first = toaster.add(ToastOptions::titled("Saved"));
    toaster.add(ToastOptions::titled("Other"));
    assert!(!toaster.is_active(&first));
    clock.advance(100);

    let again = toaster.add(ToastOptions::titled("Saved"));
    assert!(toaster.is_active(&again));
    assert_eq!(titles(&toaster, ToastPosition::TopRight), vec!["Saved".to_string()]);
}

#[test]
fn full_bucket_evicts_oldest() {
    let (_, toaster) = setup(ToasterConfig::default().max(2));
    let (events, _sub) = record_events(&toaster);

    for n in 1..=3 {
        toaster.add(ToastOptions::titled(format!("Toast {n}")));
    }

    assert_eq!(
        titles(&toaster, ToastPosition::TopRight),
        vec!["Toast 2".to_string(), "Toast 3".to_string()]
    );
    let evicted = events
        .lock()
        .unwrap()
        .iter()
        .filter(|e| matches!(e, ToastEvent::Removed { reason: RemoveReason::Evicted, .. }))
        .count();
    assert_eq!(evicted, 1);
}

#[test]
fn cap_applies_per_position() {
    let (_, toaster) = setup(ToasterConfig::default().max(1));
    toaster.add(ToastOptions::titled("Top"));
    toaster.add(ToastOptions::titled("Bottom").position(ToastPosition::BottomLeft));
    assert_eq!(toaster.len(), 2);
}

#[test]
fn same_id_updates_in_place() {
    let (_, toaster) = setup(ToasterConfig::default());

    let id = toaster.add(ToastOptions::titled("Syncing").id("sync"));
    toaster.add(ToastOptions::titled("Other"));
    let again = toaster.add(ToastOptions::titled("Synced").id("sync"));

    assert_eq!(id, again);
    assert_eq!(toaster.len(), 2);
    assert_eq!(
        titles(&toaster, ToastPosition::TopRight),
        vec!["Synced".to_string(), "Other".to_string()]
    );
}

#[test]
fn pause_and_resume_keep_remaining_time() {
    let (clock, toaster) = setup(ToasterConfig::default());
    let id = toaster.add(ToastOptions::titled("Heads up").duration_ms(3000));

    clock.advance(1000);
    assert!(toaster.pause(&id));
    assert!(!toaster.pause(&id));

    clock.advance(5000);
    toaster.tick();
    assert!(toaster.is_active(&id));

    assert!(toaster.resume(&id));
    clock.advance(1999);
    toaster.tick();
    assert!(toaster.is_active(&id));

    clock.advance(1);
    toaster.tick();
    assert!(!toaster.is_active(&id));
}

#[test]
fn prevent_close_refuses_remove_but_not_clear() {
    let (_, toaster) = setup(ToasterConfig::default());
    let (events, _sub) = record_events(&toaster);

    let id = toaster.add(ToastOptions::titled("Unsaved changes").prevent_close(true));
    assert_eq!(toaster.remove(&id), RemoveOutcome::Prevented);
    assert!(toaster.is_active(&id));
    assert!(toaster.is_shaking(&id));
    assert!(events
        .lock()
        .unwrap()
        .iter()
        .any(|e| matches!(e, ToastEvent::ClosePrevented { id: prevented } if *prevented == id)));

    toaster.clear();
    assert!(!toaster.is_active(&id));
    assert!(!toaster.is_shaking(&id));
}

#[test]
fn unmount_cancels_pending_removal() {
    let (clock, toaster) = setup(ToasterConfig::default());
    let removed = Arc::new(Mutex::new(Vec::<ToastId>::new()));
    let sink = removed.clone();
    let _sub = toaster.subscribe(move |event| {
        if let ToastEvent::Removed { id, .. } = event {
            sink.lock().unwrap().push(id.clone());
        }
    });

    let id = toaster.add(ToastOptions::titled("Bye").duration_ms(1000));
    assert!(toaster.unmount(&id));

    clock.advance(10_000);
    toaster.tick();
    assert!(removed.lock().unwrap().is_empty());
    assert_eq!(toaster.next_deadline(), None);
}

#[test]
fn stale_timer_does_not_remove_new_toast_with_same_id() {
    let (clock, toaster) = setup(ToasterConfig::default());

    toaster.add(ToastOptions::titled("First").id("job").duration_ms(1000));
    toaster.remove(&ToastId::from("job"));
    clock.advance(500);
    toaster.add(ToastOptions::titled("Second").id("job").duration_ms(1000));

    clock.advance(600);
    toaster.tick();
    assert!(toaster.is_active(&ToastId::from("job")));
}

#[test]
fn snapshot_restored_on_build() {
    let kv = Arc::new(MemoryKv::new());
    let settings = ToastSettings {
        toaster: ToasterConfig::default().persist(true),
        ..Default::default()
    };

    let clock = Arc::new(ManualClock::new());
    let first = Toaster::builder(clock.clone())
        .settings(settings.clone())
        .persistence(Persistence::new(kv.clone()))
        .build();
    first.add(ToastOptions::titled("Survivor").persistent());
    assert!(kv.contains(PERSIST_KEY));

    let second = Toaster::builder(clock)
        .settings(settings)
        .persistence(Persistence::new(kv))
        .build();
    assert_eq!(titles(&second, ToastPosition::TopRight), vec!["Survivor".to_string()]);

    // Fresh ids don't collide with restored ones
    let id = second.add(ToastOptions::titled("New"));
    assert_eq!(second.len(), 2);
    assert!(second.is_active(&id));
}
