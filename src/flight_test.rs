use super::*;

#[test]
fn first_caller_leads() {
    let flights: SingleFlight<&str, u32> = SingleFlight::new();
    assert_eq!(flights.try_begin("k", 1), Some(1));
    assert!(flights.is_in_flight(&"k"));
    assert!(!flights.has_pending(&"k"));
}

#[test]
fn later_callers_coalesce_last_write_wins() {
    let flights = SingleFlight::new();
    assert_eq!(flights.try_begin("k", 1), Some(1));
    assert_eq!(flights.try_begin("k", 2), None);
    assert_eq!(flights.try_begin("k", 3), None);
    assert!(flights.has_pending(&"k"));
    assert_eq!(flights.next(&"k"), Some(3));
    assert!(flights.is_in_flight(&"k"));
    assert_eq!(flights.next(&"k"), None);
    assert!(!flights.is_in_flight(&"k"));
}

#[test]
fn keys_are_independent() {
    let flights = SingleFlight::new();
    assert_eq!(flights.try_begin("a", 1), Some(1));
    assert_eq!(flights.try_begin("b", 2), Some(2));
}

#[test]
fn rekey_moves_pending_request() {
    let flights = SingleFlight::new();
    flights.try_begin("old", 1);
    flights.try_begin("old", 2);
    flights.rekey(&"old", "new");
    assert!(!flights.is_in_flight(&"old"));
    assert_eq!(flights.try_begin("new", 3), None);
    assert_eq!(flights.next(&"new"), Some(3));
}

#[test]
fn rekey_without_pending_keeps_flight_open() {
    let flights: SingleFlight<&str, u32> = SingleFlight::new();
    flights.try_begin("old", 1);
    flights.rekey(&"old", "new");
    assert!(flights.is_in_flight(&"new"));
    assert_eq!(flights.next(&"new"), None);
}

#[test]
fn abandon_drops_pending_and_ends_flight() {
    let flights = SingleFlight::new();
    flights.try_begin("k", 1);
    flights.try_begin("k", 2);
    assert_eq!(flights.abandon(&"k"), Some(2));
    assert!(!flights.is_in_flight(&"k"));
    assert_eq!(flights.try_begin("k", 4), Some(4));
}

#[test]
fn lead_returns_guard_only_to_leader() {
    let flights = SingleFlight::new();
    let (guard, request) = flights.lead("k", 1).unwrap();
    assert_eq!(request, 1);
    assert_eq!(guard.key(), Some(&"k"));
    assert!(flights.lead("k", 2).is_none());
    drop(guard);
}

#[test]
fn dropping_armed_guard_releases_key() {
    let flights = SingleFlight::new();
    let (guard, _) = flights.lead("k", 1).unwrap();
    assert_eq!(flights.try_begin("k", 2), None);
    drop(guard);
    assert!(!flights.is_in_flight(&"k"));
    assert_eq!(flights.try_begin("k", 3), Some(3));
}

#[test]
fn drained_guard_is_disarmed() {
    let flights = SingleFlight::new();
    let (mut guard, _) = flights.lead("k", 1).unwrap();
    assert_eq!(flights.try_begin("k", 2), None);
    assert_eq!(guard.next(), Some(2));
    assert_eq!(guard.next(), None);
    assert_eq!(guard.key(), None);
    assert_eq!(flights.try_begin("k", 4), Some(4));
    drop(guard);
    assert!(flights.is_in_flight(&"k"));
}

#[test]
fn guard_rekey_follows_flight() {
    let flights = SingleFlight::new();
    let (mut guard, _) = flights.lead("old", 1).unwrap();
    guard.rekey("new");
    assert_eq!(guard.key(), Some(&"new"));
    assert!(!flights.is_in_flight(&"old"));
    drop(guard);
    assert!(!flights.is_in_flight(&"new"));
}

#[test]
fn guard_abandon_returns_parked_request() {
    let flights = SingleFlight::new();
    let (guard, _) = flights.lead("k", 1).unwrap();
    assert_eq!(flights.try_begin("k", 2), None);
    assert_eq!(guard.abandon(), Some(2));
    assert!(!flights.is_in_flight(&"k"));
}
