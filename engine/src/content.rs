use std::collections::HashMap;

use crate::roll::FlavorTier;

const TRIPLES: &[&str] = &["TRIPLES!"];
const CRITICAL_FAIL: &[&str] = &["CALAMITY!", "CRITICAL FAIL!"];
const DOUBLES: &[&str] = &["DOUBLES!"];
const TOP: &[&str] = &["KA-POW!", "KA-BLAM!", "BOOM!", "SHRAK!"];
const HIGH: &[&str] = &["CRASH!", "KABOOM!", "BLAM!", "THOOM!"];
const MID: &[&str] = &["BAM!", "POW!", "WHAM!", "SMASH!", "CRUNCH!"];
const LOW: &[&str] = &["ZAP!", "BOINK!", "CLANK!", "PLINK!", "THWACK!"];

pub fn flavor_texts(tier: FlavorTier) -> &'static [&'static str] {
    match tier {
        FlavorTier::Triples => TRIPLES,
        FlavorTier::CriticalFail => CRITICAL_FAIL,
        FlavorTier::Doubles => DOUBLES,
        FlavorTier::Top => TOP,
        FlavorTier::High => HIGH,
        FlavorTier::Mid => MID,
        FlavorTier::Low => LOW,
    }
}

pub fn builtin_heroes() -> HashMap<&'static str, &'static str> {
    HashMap::from([(
        "sample",
        include_str!("../content/heroes/sample.json"),
    )])
}
