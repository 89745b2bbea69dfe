// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn starts_closed() {
    let state = CircuitState::new();
    assert!(!state.is_open(Instant::now()));
    assert_eq!(state.failure_count(), 0);
}

#[test]
fn opens_exactly_at_threshold() {
    let mut state = CircuitState::new();
    let now = Instant::now();
    state.record_failure(now, 3, Duration::from_secs(60));
    assert!(!state.is_open(now));
    state.record_failure(now, 3, Duration::from_secs(60));
    assert!(!state.is_open(now));
    state.record_failure(now, 3, Duration::from_secs(60));
    assert!(state.is_open(now));
}

#[test]
fn success_resets_failure_count_and_closes() {
    let mut state = CircuitState::new();
    let now = Instant::now();
    state.record_failure(now, 2, Duration::from_secs(60));
    state.record_failure(now, 2, Duration::from_secs(60));
    assert!(state.is_open(now));

    state.record_success();
    assert!(!state.is_open(now));
    assert_eq!(state.failure_count(), 0);
}

#[test]
fn closes_again_after_open_duration_elapses() {
    let mut state = CircuitState::new();
    let now = Instant::now();
    state.record_failure(now, 1, Duration::from_secs(10));
    assert!(state.is_open(now));
    assert!(!state.is_open(now + Duration::from_secs(11)));
}

#[test]
fn failure_after_open_window_expired_reopens_with_fresh_deadline() {
    let mut state = CircuitState::new();
    let now = Instant::now();
    state.record_failure(now, 1, Duration::from_secs(10));
    let half_open_probe = now + Duration::from_secs(11);
    assert!(!state.is_open(half_open_probe));

    state.record_failure(half_open_probe, 1, Duration::from_secs(10));
    assert!(state.is_open(half_open_probe));
    assert!(state.is_open(half_open_probe + Duration::from_secs(5)));
    assert!(!state.is_open(half_open_probe + Duration::from_secs(11)));
}
