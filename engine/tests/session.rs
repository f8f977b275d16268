mod common;

use std::time::Duration;

use common::Scripted;
use hero_engine::session::{RollPhase, RollSession};
use hero_engine::EngineConfig;

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn session() -> RollSession {
    RollSession::new(&EngineConfig::default())
}

#[test]
fn idle_until_first_roll() {
    let s = session();
    assert_eq!(s.phase(), RollPhase::Idle);
    assert!(s.result().is_none());
    assert!(s.flavor().is_none());
}

#[test]
fn roll_resolves_after_delay() {
    let mut s = session();
    let mut roller = Scripted::faces(&[2, 5, 9]);
    s.begin(ms(0));
    assert!(s.is_rolling());
    assert!(s.tick(ms(799), &[6, 8, 10], 0, &mut roller).unwrap().is_none());
    let res = s.tick(ms(800), &[6, 8, 10], 1, &mut roller).unwrap().unwrap();
    assert_eq!(res.final_mid, 6);
    assert_eq!(s.phase(), RollPhase::Resolved);
    assert!(s.flavor().is_some());
}

#[test]
fn flavor_clears_after_display_window() {
    let mut s = session();
    let mut roller = Scripted::faces(&[2, 5, 9]);
    s.begin(ms(0));
    s.tick(ms(800), &[6, 8, 10], 0, &mut roller).unwrap();
    assert_eq!(s.flavor().unwrap().clear_at, ms(2300));
    assert!(!s.expire_flavor(ms(2299)));
    assert!(s.flavor().is_some());
    assert!(s.expire_flavor(ms(2300)));
    assert!(s.flavor().is_none());
    assert!(s.result().is_some());
}

#[test]
fn new_roll_cancels_pending_clear() {
    let mut s = session();
    let mut roller = Scripted::faces(&[2, 5, 9, 1, 1, 4]);
    s.begin(ms(0));
    s.tick(ms(800), &[6, 8, 10], 0, &mut roller).unwrap();

    s.begin(ms(1000));
    assert!(s.flavor().is_none());
    assert!(s.result().is_none());

    s.tick(ms(1800), &[6, 8, 10], 0, &mut roller).unwrap();
    let flavor = *s.flavor().unwrap();
    assert!(flavor.critical_fail);
    // The first roll's clear time has passed; the second roll's text stays.
    s.expire_flavor(ms(2300));
    assert_eq!(s.flavor(), Some(&flavor));
    assert!(s.expire_flavor(ms(3300)));
}

#[test]
fn superseded_ticket_is_discarded() {
    let mut s = session();
    let mut roller = Scripted::faces(&[3, 3, 3, 2, 4, 6]);
    let stale = s.begin(ms(0));
    let fresh = s.begin(ms(100));
    assert_ne!(stale, fresh);

    assert!(s
        .complete(stale, ms(800), &[6, 8, 10], 0, &mut roller)
        .unwrap()
        .is_none());
    assert!(s.is_rolling());

    let res = s
        .complete(fresh, ms(900), &[6, 8, 10], 0, &mut roller)
        .unwrap()
        .unwrap();
    assert_eq!(res.raw_values(), [3, 3, 3]);
    assert!(s
        .complete(fresh, ms(950), &[6, 8, 10], 0, &mut roller)
        .unwrap()
        .is_none());
}

#[test]
fn invalid_dice_returns_to_idle() {
    let mut s = session();
    let mut roller = Scripted::faces(&[]);
    s.begin(ms(0));
    assert!(s.tick(ms(800), &[6, 8], 0, &mut roller).is_err());
    assert_eq!(s.phase(), RollPhase::Idle);
}
