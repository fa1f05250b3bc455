use std::time::{Duration, Instant};

use agent_chat::{IndicatorChange, IndicatorManager, IndicatorPhase, IndicatorTimings};
use assert_matches::assert_matches;

#[test]
fn rapid_restart_leaves_one_indicator_and_no_pending_fade() {
    let now = Instant::now();
    let mut manager = IndicatorManager::new(IndicatorTimings::default());

    let first = manager.start("Alex", "get_recent_bills");
    manager.complete("Alex", "get_recent_bills", now);
    let second = manager.start("Alex", "get_recent_bills");

    assert_eq!(manager.len(), 1);
    assert_eq!(manager.next_deadline(), None);
    let removed: Vec<_> = manager
        .drain_changes()
        .into_iter()
        .filter_map(|change| match change {
            IndicatorChange::Removed(handle) => Some(handle),
            _ => None,
        })
        .collect();
    assert_eq!(removed, vec![first]);

    manager.tick(now + Duration::from_secs(60));
    assert_eq!(
        manager.view("Alex", "get_recent_bills").map(|view| view.handle),
        Some(second)
    );
}

#[test]
fn complete_for_unknown_key_changes_nothing() {
    let mut manager = IndicatorManager::default();
    manager.start("Alex", "get_current_plan");
    manager.drain_changes();

    assert!(!manager.complete("Alex", "get_usage_summary", Instant::now()));
    assert!(!manager.complete("PlanAgent", "get_current_plan", Instant::now()));
    assert_eq!(manager.len(), 1);
    assert_eq!(manager.phase("Alex", "get_current_plan"), Some(IndicatorPhase::Active));
    assert!(manager.drain_changes().is_empty());
}

#[test]
fn custom_timings_drive_the_fade() {
    let now = Instant::now();
    let timings = IndicatorTimings {
        complete_delay: Duration::from_millis(10),
        message_delay: Duration::from_millis(5),
        fade_duration: Duration::from_millis(1),
    };
    let mut manager = IndicatorManager::new(timings);
    let handle = manager.start("SupportAgent", "create_support_ticket");
    manager.drain_changes();

    manager.clear_for_agent("SupportAgent", now);
    manager.tick(now + Duration::from_millis(5));
    manager.tick(now + Duration::from_millis(6));

    assert!(manager.is_empty());
    assert_matches!(
        manager.drain_changes().as_slice(),
        [IndicatorChange::Fading(a), IndicatorChange::Removed(b)] if *a == handle && *b == handle
    );
}
