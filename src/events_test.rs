use super::*;

#[test]
fn emit_without_listeners_is_noop() {
    let events = AuthEvents::new();
    assert_eq!(events.emit(AuthEvent::NeedLogin), 0);
}

#[test]
fn every_subscriber_receives_event() {
    let events = AuthEvents::new();
    let mut a = events.subscribe();
    let mut b = events.clone().subscribe();

    assert_eq!(events.emit(AuthEvent::NeedLogin), 2);
    assert_eq!(a.try_recv().unwrap(), AuthEvent::NeedLogin);
    assert_eq!(b.try_recv().unwrap(), AuthEvent::NeedLogin);
    assert!(a.try_recv().is_err());
}
