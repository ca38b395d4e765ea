mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{timed, timed_ms, RecordingOpener, Shown, VirtualClock};
use slide_rotation::config::ConcurrentStart;
use slide_rotation::player::{Player, PlayerError};
use slide_rotation::registry::SessionRegistry;

fn secs(s: u64) -> Duration {
    Duration::from_secs(s)
}

#[test]
fn test_two_slide_scenario_wraps() {
    let clock = VirtualClock::with_budget(2);
    let opener = RecordingOpener::timed(Arc::clone(&clock));
    let player = Player::with_clock(clock.clone());

    let session = player
        .start(
            vec![timed(1, "https://a", 1), timed(2, "https://b", 2)],
            &opener,
        )
        .unwrap();
    clock.wait_until_parked();

    assert_eq!(
        opener.shown(),
        vec![
            Shown { at: secs(0), url: "https://a".to_string() },
            Shown { at: secs(1), url: "https://b".to_string() },
            Shown { at: secs(3), url: "https://a".to_string() },
        ]
    );
    assert_eq!(session.current_index(), 0);
    session.stop();
    assert!(!session.is_active());
}

#[test]
fn test_index_after_k_steps_is_k_mod_n() {
    let urls = ["https://s0", "https://s1", "https://s2"];
    for k in [0usize, 1, 2, 3, 7, 10] {
        let clock = VirtualClock::with_budget(k);
        let opener = RecordingOpener::timed(Arc::clone(&clock));
        let player = Player::with_clock(clock.clone());
        let slides = urls
            .iter()
            .enumerate()
            .map(|(i, u)| timed(i as i64, u, 1))
            .collect();

        let session = player.start(slides, &opener).unwrap();
        clock.wait_until_parked();

        assert_eq!(session.current_index(), k % urls.len(), "after {} steps", k);
        let shown = opener.urls();
        assert_eq!(shown.len(), k + 1);
        for (step, url) in shown.iter().enumerate() {
            assert_eq!(url, urls[step % urls.len()]);
        }
        session.stop();
    }
}

#[test]
fn test_waits_follow_each_slide_duration() {
    let clock = VirtualClock::with_budget(6);
    let opener = RecordingOpener::timed(Arc::clone(&clock));
    let player = Player::with_clock(clock.clone());

    let session = player
        .start(
            vec![
                timed(1, "https://five", 5),
                timed(2, "https://one", 1),
                timed(3, "https://ten", 10),
            ],
            &opener,
        )
        .unwrap();
    clock.wait_until_parked();
    session.stop();

    assert_eq!(
        clock.waits(),
        vec![secs(5), secs(1), secs(10), secs(5), secs(1), secs(10)]
    );
    let times: Vec<_> = opener.shown().iter().map(|s| s.at).collect();
    assert_eq!(
        times,
        vec![secs(0), secs(5), secs(6), secs(16), secs(21), secs(22), secs(32)]
    );
}

#[test]
fn test_empty_sequence_opens_nothing() {
    let clock = VirtualClock::with_budget(10);
    let opener = RecordingOpener::timed(Arc::clone(&clock));
    let player = Player::with_clock(clock.clone());

    let result = player.start(Vec::new(), &opener);

    assert_eq!(result.unwrap_err(), PlayerError::EmptySequence);
    assert_eq!(opener.opened(), 0);
    assert!(clock.waits().is_empty());
}

#[test]
fn test_show_one_navigates_once() {
    let clock = VirtualClock::with_budget(10);
    let opener = RecordingOpener::timed(Arc::clone(&clock));
    let player = Player::with_clock(clock.clone());

    let surface = player
        .show_one(&timed(4, "https://single", 5), &opener)
        .unwrap();
    std::thread::sleep(Duration::from_millis(50));

    assert_eq!(opener.urls(), vec!["https://single".to_string()]);
    assert!(clock.waits().is_empty());
    drop(surface);
    assert_eq!(opener.urls().len(), 1);
}

#[test]
fn test_blocked_surface_schedules_nothing() {
    let clock = VirtualClock::with_budget(10);
    let opener = RecordingOpener::blocked();
    let player = Player::with_clock(clock.clone());

    let result = player.start(vec![timed(1, "https://a", 1)], &opener);

    assert!(matches!(result, Err(PlayerError::SurfaceUnavailable(_))));
    assert!(clock.waits().is_empty());

    let result = player.show_one(&timed(1, "https://a", 1), &opener);
    assert!(matches!(result, Err(PlayerError::SurfaceUnavailable(_))));
}

#[test]
fn test_failed_navigation_keeps_rotating() {
    let clock = VirtualClock::with_budget(4);
    let opener = RecordingOpener::timed(Arc::clone(&clock)).failing_on("https://b");
    let player = Player::with_clock(clock.clone());

    let session = player
        .start(
            vec![timed(1, "https://a", 1), timed(2, "https://b", 1)],
            &opener,
        )
        .unwrap();
    clock.wait_until_parked();

    // b never lands on the surface, but the schedule continues past it
    assert_eq!(clock.waits().len(), 4);
    assert_eq!(
        opener.urls(),
        vec!["https://a", "https://a", "https://a"]
    );
    assert!(session.is_active());
    session.stop();
}

#[test]
fn test_closed_surface_ends_rotation() {
    let clock = VirtualClock::with_budget(100);
    let opener = RecordingOpener::timed(Arc::clone(&clock)).closing_after(2);
    let player = Player::with_clock(clock.clone());

    let session = player
        .start(
            vec![timed(1, "https://a", 1), timed(2, "https://b", 1)],
            &opener,
        )
        .unwrap();
    session.wait();

    assert!(!session.is_active());
    assert_eq!(opener.urls(), vec!["https://a", "https://b", "https://a"]);
    assert_eq!(clock.waits().len(), 3);
}

#[test]
fn test_no_navigation_after_stop() {
    let opener = RecordingOpener::new();
    let player = Player::new();

    let session = player
        .start(
            vec![timed_ms(1, "https://a", 5), timed_ms(2, "https://b", 5)],
            &opener,
        )
        .unwrap();
    std::thread::sleep(Duration::from_millis(60));
    session.stop();
    let seen = opener.urls().len();
    assert!(seen > 1, "rotation should have advanced before stop");

    std::thread::sleep(Duration::from_millis(60));
    assert_eq!(opener.urls().len(), seen);
    assert!(!session.is_active());

    // stopping twice is harmless
    session.stop();
}

#[test]
fn test_stop_interrupts_long_wait() {
    let opener = RecordingOpener::new();
    let player = Player::new();

    let session = player
        .start(vec![timed(1, "https://a", 3600)], &opener)
        .unwrap();
    let started = std::time::Instant::now();
    session.stop();

    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(opener.urls(), vec!["https://a"]);
}

#[test]
fn test_dropping_last_handle_stops_rotation() {
    let opener = RecordingOpener::new();
    let player = Player::new();

    let session = player
        .start(
            vec![timed_ms(1, "https://a", 5), timed_ms(2, "https://b", 5)],
            &opener,
        )
        .unwrap();
    let observer = session.clone();
    drop(session);
    assert!(observer.is_active());

    drop(observer);
    let seen = opener.urls().len();
    std::thread::sleep(Duration::from_millis(60));
    assert_eq!(opener.urls().len(), seen);
}

#[test]
fn test_registry_rejects_second_start() {
    let opener = RecordingOpener::new();
    let registry = SessionRegistry::new(Player::new(), ConcurrentStart::Reject);

    let first = registry
        .start(7, vec![timed(1, "https://a", 60)], &opener)
        .unwrap();
    let second = registry.start(7, vec![timed(1, "https://a", 60)], &opener);

    assert_eq!(second.unwrap_err(), PlayerError::SessionActive(7));
    assert_eq!(opener.opened(), 1);
    assert!(first.is_active());

    // another board is unaffected
    registry
        .start(8, vec![timed(2, "https://b", 60)], &opener)
        .unwrap();
    assert_eq!(registry.active_count(8), 1);

    assert_eq!(registry.stop_board(7), 1);
    assert!(!first.is_active());

    // board 7 can start again once stopped
    registry
        .start(7, vec![timed(1, "https://a", 60)], &opener)
        .unwrap();
    registry.stop_all();
    assert_eq!(registry.active_count(7), 0);
}

#[test]
fn test_registry_replace_stops_previous() {
    let opener = RecordingOpener::new();
    let registry = SessionRegistry::new(Player::new(), ConcurrentStart::Replace);

    let first = registry
        .start(3, vec![timed(1, "https://a", 60)], &opener)
        .unwrap();
    let second = registry
        .start(3, vec![timed(1, "https://a", 60)], &opener)
        .unwrap();

    assert!(!first.is_active());
    assert!(second.is_active());
    assert_eq!(registry.active_count(3), 1);
    registry.stop_all();
    assert!(!second.is_active());
}

#[test]
fn test_registry_allow_keeps_duplicates() {
    let opener = RecordingOpener::new();
    let registry = SessionRegistry::new(Player::new(), ConcurrentStart::Allow);

    let first = registry
        .start(3, vec![timed(1, "https://a", 60)], &opener)
        .unwrap();
    let second = registry
        .start(3, vec![timed(1, "https://a", 60)], &opener)
        .unwrap();

    assert_ne!(first.id(), second.id());
    assert_eq!(registry.active_count(3), 2);
    assert_eq!(opener.opened(), 2);
    assert_eq!(registry.stop_board(3), 2);
}
