use hero_engine::modifiers::{clear_temporary, DEFAULT_MODIFIER_NAME};
use hero_engine::{EngineError, ModifierEdit, ModifierLedger};
use proptest::prelude::*;

#[test]
fn clear_temporary_narrates_the_total() {
    let mut ledger = ModifierLedger::new();
    ledger.add("Cover", 2.0, true).unwrap();
    ledger.add("Rush", 3.0, false).unwrap();
    let mut lines = Vec::new();
    let removed = clear_temporary("Kite", &mut ledger, |l| lines.push(l));
    assert_eq!(removed, 1);
    assert_eq!(lines, vec!["[MOD][Kite] cleared 1 temporary (total 5 → 2)"]);
}

#[test]
fn empty_ledger_totals_zero() {
    assert_eq!(ModifierLedger::new().active_total(), 0);
}

#[test]
fn add_starts_active_and_counts() {
    let mut ledger = ModifierLedger::new();
    let a = ledger.add("High Ground", 3.0, false).unwrap();
    ledger.add("Cover", 2.0, true).unwrap();
    assert!(ledger.get(&a).unwrap().is_active);
    assert_eq!(ledger.active_total(), 5);
}

#[test]
fn toggle_flips_and_excludes_from_total() {
    let mut ledger = ModifierLedger::new();
    let a = ledger.add("Boost", 2.0, false).unwrap();
    ledger.add("Hinder", -3.0, false).unwrap();
    assert_eq!(ledger.active_total(), -1);
    assert!(!ledger.toggle_active(&a).unwrap());
    assert_eq!(ledger.active_total(), -3);
    assert!(ledger.toggle_active(&a).unwrap());
    assert_eq!(ledger.active_total(), -1);
}

#[test]
fn unknown_ids_are_not_found() {
    let mut ledger = ModifierLedger::new();
    assert!(matches!(ledger.toggle_active("nope"), Err(EngineError::NotFound { .. })));
    assert!(matches!(ledger.remove("nope"), Err(EngineError::NotFound { .. })));
    let edit = ModifierEdit {
        value: Some(1.0),
        ..Default::default()
    };
    assert!(matches!(ledger.edit("nope", edit), Err(EngineError::NotFound { .. })));
}

#[test]
fn non_finite_values_are_rejected() {
    let mut ledger = ModifierLedger::new();
    assert!(matches!(ledger.add("x", f64::NAN, false), Err(EngineError::Validation(_))));
    assert!(matches!(ledger.add("x", f64::NEG_INFINITY, false), Err(EngineError::Validation(_))));
    assert!(ledger.is_empty());
}

#[test]
fn edit_defaults_name_and_requires_value() {
    let mut ledger = ModifierLedger::new();
    let id = ledger.add("Rage", 2.0, false).unwrap();

    let missing_value = ModifierEdit {
        name: Some("Fury".into()),
        value: None,
        is_persistent: Some(true),
    };
    assert!(matches!(ledger.edit(&id, missing_value), Err(EngineError::Validation(_))));
    assert_eq!(ledger.get(&id).unwrap().name, "Rage");

    let edit = ModifierEdit {
        name: None,
        value: Some(-4.0),
        is_persistent: Some(true),
    };
    let m = ledger.edit(&id, edit).unwrap();
    assert_eq!(m.name, DEFAULT_MODIFIER_NAME);
    assert_eq!(m.value, -4);
    assert!(m.is_persistent);
    assert!(m.is_active);
}

#[test]
fn clear_temporary_ignores_active_state() {
    let mut ledger = ModifierLedger::new();
    let keep1 = ledger.add("Armor", 1.0, true).unwrap();
    let temp_on = ledger.add("Smoke", -2.0, false).unwrap();
    let keep2 = ledger.add("Training", 2.0, true).unwrap();
    let temp_off = ledger.add("Flank", 3.0, false).unwrap();
    ledger.toggle_active(&temp_off).unwrap();
    ledger.toggle_active(&keep2).unwrap();

    assert!(ledger.has_temporary());
    assert_eq!(ledger.clear_temporary(), 2);
    assert!(!ledger.has_temporary());
    assert!(ledger.get(&temp_on).is_none());
    let ids: Vec<&str> = ledger.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec![keep1.as_str(), keep2.as_str()]);
    assert!(!ledger.get(&keep2).unwrap().is_active);
    assert_eq!(ledger.active_total(), 1);
}

#[test]
fn ids_are_unique_in_a_burst() {
    let mut ledger = ModifierLedger::new();
    let ids: Vec<String> = (0..50).map(|i| ledger.add("m", f64::from(i), false).unwrap()).collect();
    let mut sorted = ids.clone();
    sorted.dedup();
    assert_eq!(sorted.len(), 50);
    assert!(ids.windows(2).all(|w| w[0].parse::<i64>().unwrap() < w[1].parse::<i64>().unwrap()));
}

proptest! {
    #[test]
    fn total_matches_active_sum_in_any_toggle_order(
        values in prop::collection::vec(-20i32..20, 1..12),
        toggles in prop::collection::vec(0usize..12, 0..30),
    ) {
        let mut forward = ModifierLedger::new();
        let ids: Vec<String> = values
            .iter()
            .map(|v| forward.add("m", f64::from(*v), false).unwrap())
            .collect();
        let mut backward = ModifierLedger::from_entries(forward.to_vec());

        for t in &toggles {
            forward.toggle_active(&ids[t % ids.len()]).unwrap();
        }
        for t in toggles.iter().rev() {
            backward.toggle_active(&ids[t % ids.len()]).unwrap();
        }

        let expected: i64 = forward
            .iter()
            .filter(|m| m.is_active)
            .map(|m| i64::from(m.value))
            .sum();
        prop_assert_eq!(forward.active_total(), expected);
        prop_assert_eq!(forward.active_total(), backward.active_total());
    }

    #[test]
    fn clear_temporary_keeps_exactly_the_persistent(
        entries in prop::collection::vec((-9i32..9, any::<bool>(), any::<bool>()), 0..15),
    ) {
        let mut ledger = ModifierLedger::new();
        for (value, persistent, active) in &entries {
            let id = ledger.add("m", f64::from(*value), *persistent).unwrap();
            if !*active {
                ledger.toggle_active(&id).unwrap();
            }
        }
        let before: Vec<_> = ledger.iter().filter(|m| m.is_persistent).cloned().collect();
        ledger.clear_temporary();
        let after = ledger.to_vec();
        prop_assert_eq!(before, after);
    }
}
