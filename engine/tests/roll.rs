mod common;

use common::Scripted;
use hero_engine::roll::DieRoll;
use hero_engine::{Dice, EngineError, FlavorTier, RollResolver, Roller};
use proptest::prelude::*;

#[test]
fn pair_of_threes_is_doubles() {
    let mut resolver = RollResolver::new();
    let res = resolver
        .roll(&[6, 8, 10], 0, &mut Scripted::faces(&[3, 3, 7]))
        .unwrap();
    assert_eq!(res.tier, FlavorTier::Doubles);
    assert_eq!((res.min, res.mid, res.max), (3, 3, 7));
    assert_eq!(res.flavor, "DOUBLES!");
    assert!(!res.is_critical_fail());
}

#[test]
fn two_ones_beat_doubles() {
    let mut resolver = RollResolver::new();
    let res = resolver
        .roll(&[6, 8, 10], 0, &mut Scripted::faces(&[1, 1, 5]))
        .unwrap();
    assert_eq!(res.tier, FlavorTier::CriticalFail);
    assert!(res.is_critical_fail());
    assert!(["CALAMITY!", "CRITICAL FAIL!"].contains(&res.flavor));
}

#[test]
fn triples_beat_critical_fail() {
    let mut resolver = RollResolver::new();
    let res = resolver
        .roll(&[4, 4, 4], 0, &mut Scripted::faces(&[1, 1, 1]))
        .unwrap();
    assert_eq!(res.tier, FlavorTier::Triples);
    assert_eq!(res.flavor, "TRIPLES!");
}

#[test]
fn modifier_only_touches_mid() {
    let mut resolver = RollResolver::new();
    let res = resolver
        .roll(&[6, 8, 10], -4, &mut Scripted::faces(&[2, 6, 9]))
        .unwrap();
    assert_eq!(res.min, 2);
    assert_eq!(res.mid, 6);
    assert_eq!(res.max, 9);
    assert_eq!(res.final_mid, 2);
    assert_eq!(res.tier, FlavorTier::High);
}

#[test]
fn tier_comes_from_sorted_max() {
    let mut resolver = RollResolver::new();
    let res = resolver
        .roll(&[12, 6, 8], 0, &mut Scripted::faces(&[11, 2, 3]))
        .unwrap();
    assert_eq!(res.tier, FlavorTier::Top);
    let res = resolver
        .roll(&[12, 6, 8], 0, &mut Scripted::faces(&[4, 2, 3]))
        .unwrap();
    assert_eq!(res.tier, FlavorTier::Low);
}

#[test]
fn equal_values_keep_tray_order() {
    let mut resolver = RollResolver::new();
    let draws = [
        DieRoll { die: 10, value: 5 },
        DieRoll { die: 4, value: 2 },
        DieRoll { die: 6, value: 5 },
    ];
    let res = resolver.resolve(draws, 0, &mut Scripted::faces(&[]));
    assert_eq!(res.sorted.map(|r| r.die), [4, 10, 6]);
    assert_eq!(res.raw, draws);
}

#[test]
fn bad_dice_are_invalid_input() {
    let mut resolver = RollResolver::new();
    let mut dice = Dice::from_seed(1);
    assert!(matches!(
        resolver.roll(&[6, 8], 0, &mut dice),
        Err(EngineError::InvalidInput(_))
    ));
    assert!(matches!(
        resolver.roll(&[6, 0, 8], 0, &mut dice),
        Err(EngineError::InvalidInput(_))
    ));
}

#[test]
fn flavor_never_repeats_back_to_back_within_a_tier() {
    let mut resolver = RollResolver::new();
    let mut dice = Dice::from_seed(2024);
    let low = [
        DieRoll { die: 6, value: 2 },
        DieRoll { die: 8, value: 3 },
        DieRoll { die: 10, value: 4 },
    ];
    let mut previous = None;
    let mut seen = std::collections::HashSet::new();
    for _ in 0..1000 {
        let res = resolver.resolve(low, 0, &mut dice);
        assert_eq!(res.tier, FlavorTier::Low);
        assert_ne!(Some(res.flavor), previous);
        assert_eq!(resolver.last_flavor(), Some(res.flavor));
        seen.insert(res.flavor);
        previous = Some(res.flavor);
    }
    assert_eq!(seen.len(), FlavorTier::Low.candidates().len());
}

#[test]
fn two_candidate_tier_alternates() {
    let mut resolver = RollResolver::new();
    let mut dice = Dice::from_seed(9);
    let crit = [
        DieRoll { die: 6, value: 1 },
        DieRoll { die: 8, value: 1 },
        DieRoll { die: 10, value: 7 },
    ];
    let first = resolver.resolve(crit, 0, &mut dice).flavor;
    for i in 1..20 {
        let text = resolver.resolve(crit, 0, &mut dice).flavor;
        assert_eq!(text == first, i % 2 == 0);
    }
}

#[test]
fn single_candidate_tiers_may_repeat() {
    let mut resolver = RollResolver::new();
    let mut roller = Scripted::faces(&[4, 4, 6, 4, 4, 6]);
    let a = resolver.roll(&[6, 6, 6], 0, &mut roller).unwrap();
    let b = resolver.roll(&[6, 6, 6], 0, &mut roller).unwrap();
    assert_eq!(a.flavor, "DOUBLES!");
    assert_eq!(b.flavor, "DOUBLES!");
}

#[test]
fn narration_format() {
    let mut resolver = RollResolver::new();
    let res = resolver
        .roll(&[6, 8, 10], 2, &mut Scripted::faces(&[3, 3, 7]))
        .unwrap();
    insta::assert_snapshot!(res.narrate(), @"[ROLL] d6=3 d8=3 d10=7 → min=3 mid=3 (+2 = 5) max=7 DOUBLES!");
}

#[test]
fn seeded_dice_are_reproducible() {
    let mut a = Dice::from_seed(77);
    let mut b = Dice::from_seed(77);
    let xs: Vec<u32> = (0..20).map(|_| a.roll_die(12)).collect();
    let ys: Vec<u32> = (0..20).map(|_| b.roll_die(12)).collect();
    assert_eq!(xs, ys);
}

#[test]
fn d6_is_roughly_uniform() {
    let mut dice = Dice::from_seed(31337);
    let mut counts = [0u32; 6];
    for _ in 0..60_000 {
        counts[(dice.roll_die(6) - 1) as usize] += 1;
    }
    for c in counts {
        assert!((9_000..11_000).contains(&c), "count {} out of band", c);
    }
}

#[test]
fn secure_dice_stay_in_range() {
    let mut dice = Dice::secure();
    for faces in [1u32, 4, 6, 8, 10, 12, 100] {
        for _ in 0..200 {
            let v = dice.roll_die(faces);
            assert!((1..=faces).contains(&v));
        }
    }
    assert!(dice.uniform_inclusive(5, 4).is_err());
    assert_eq!(dice.uniform_inclusive(7, 7).unwrap(), 7);
    assert!(dice.is_secure());
    assert!(!Dice::from_seed(1).is_secure());
}

/// Hands out `good` words, then errors on every request.
struct FailingSource {
    good: u32,
}

impl rand::RngCore for FailingSource {
    fn next_u32(&mut self) -> u32 {
        0
    }

    fn next_u64(&mut self) -> u64 {
        0
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        dest.fill(0);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        if self.good == 0 {
            return Err(rand::Error::new("entropy source unavailable"));
        }
        self.good -= 1;
        dest.fill(0);
        Ok(())
    }
}

#[test]
fn failed_source_falls_back_silently() {
    let mut dice = Dice::with_source(Box::new(FailingSource { good: 2 }));
    assert!(dice.is_secure());
    assert_eq!(dice.roll_die(6), 1);
    assert_eq!(dice.roll_die(6), 1);
    assert!(dice.is_secure());

    let mut seen = std::collections::HashSet::new();
    for _ in 0..500 {
        let v = dice.roll_die(6);
        assert!((1..=6).contains(&v));
        seen.insert(v);
    }
    assert!(!dice.is_secure());
    assert_eq!(seen.len(), 6);
}

#[test]
fn fallback_dice_still_resolve_rolls() {
    let mut dice = Dice::with_source(Box::new(FailingSource { good: 0 }));
    let mut resolver = RollResolver::new();
    let res = resolver.roll(&[6, 8, 10], 1, &mut dice).unwrap();
    assert!(!dice.is_secure());
    assert!(res.min <= res.mid && res.mid <= res.max);
    assert_eq!(res.final_mid, i64::from(res.mid) + 1);
}

proptest! {
    #[test]
    fn sorted_and_modified(
        a in 1u32..=100, b in 1u32..=100, c in 1u32..=100,
        modifier in -50i64..50,
        seed in any::<u64>(),
    ) {
        let mut resolver = RollResolver::new();
        let mut dice = Dice::from_seed(seed);
        let res = resolver.roll(&[a, b, c], modifier, &mut dice).unwrap();
        prop_assert!(res.min <= res.mid && res.mid <= res.max);
        prop_assert_eq!(res.final_mid, i64::from(res.mid) + modifier);
        for r in res.raw {
            prop_assert!(r.value >= 1 && r.value <= r.die);
        }
        prop_assert_eq!(res.raw.map(|r| r.die), [a, b, c]);
    }
}
