use serde::Serialize;
use tracing::debug;

use crate::content;
use crate::error::{EngineError, Result};
use crate::Roller;

/// One die as drawn: its face count and the face that came up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DieRoll {
    pub die: u32,
    pub value: u32,
}

/// Bucket of flavor texts picked by roll classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlavorTier {
    Triples,
    CriticalFail,
    Doubles,
    Top,
    High,
    Mid,
    Low,
}

impl FlavorTier {
    pub const ALL: [FlavorTier; 7] = [
        FlavorTier::Triples,
        FlavorTier::CriticalFail,
        FlavorTier::Doubles,
        FlavorTier::Top,
        FlavorTier::High,
        FlavorTier::Mid,
        FlavorTier::Low,
    ];

    /// Classify from draw-order values and the sorted maximum. First match wins:
    /// triples, then two or more ones, then any pair, then the max thresholds.
    pub fn classify(raw: [u32; 3], max: u32) -> Self {
        let [a, b, c] = raw;
        if a == b && b == c {
            return FlavorTier::Triples;
        }
        if raw.iter().filter(|v| **v == 1).count() >= 2 {
            return FlavorTier::CriticalFail;
        }
        if a == b || b == c || a == c {
            return FlavorTier::Doubles;
        }
        match max {
            11.. => FlavorTier::Top,
            8..=10 => FlavorTier::High,
            5..=7 => FlavorTier::Mid,
            _ => FlavorTier::Low,
        }
    }

    pub fn candidates(self) -> &'static [&'static str] {
        content::flavor_texts(self)
    }

    pub fn is_critical_fail(self) -> bool {
        self == FlavorTier::CriticalFail
    }

    pub fn name(self) -> &'static str {
        match self {
            FlavorTier::Triples => "TRIPLES",
            FlavorTier::CriticalFail => "CRITICAL_FAIL",
            FlavorTier::Doubles => "DOUBLES",
            FlavorTier::Top => "TOP",
            FlavorTier::High => "HIGH",
            FlavorTier::Mid => "MID",
            FlavorTier::Low => "LOW",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RollResult {
    /// Draws in dice-tray order.
    pub raw: [DieRoll; 3],
    /// Draws stably sorted by value; equal values keep tray order.
    pub sorted: [DieRoll; 3],
    pub min: u32,
    pub mid: u32,
    pub max: u32,
    pub modifier_total: i64,
    /// `mid + modifier_total`; min and max are never modified.
    pub final_mid: i64,
    pub tier: FlavorTier,
    pub flavor: &'static str,
}

impl RollResult {
    pub fn is_critical_fail(&self) -> bool {
        self.tier.is_critical_fail()
    }

    pub fn raw_values(&self) -> [u32; 3] {
        self.raw.map(|r| r.value)
    }

    pub fn narrate(&self) -> String {
        let draws = self
            .raw
            .iter()
            .map(|r| format!("d{}={}", r.die, r.value))
            .collect::<Vec<_>>()
            .join(" ");
        let mid = if self.modifier_total == 0 {
            format!("mid={}", self.mid)
        } else {
            format!(
                "mid={} ({} = {})",
                self.mid,
                format_modifier(self.modifier_total),
                self.final_mid
            )
        };
        format!(
            "[ROLL] {} → min={} {} max={} {}",
            draws, self.min, mid, self.max, self.flavor
        )
    }
}

pub fn format_modifier(modifier: i64) -> String {
    if modifier >= 0 {
        format!("+{}", modifier)
    } else {
        format!("-{}", modifier.unsigned_abs())
    }
}

/// Chooses a tier text at random, never the same text twice in a row while
/// another candidate exists.
#[derive(Debug, Clone, Default)]
pub struct FlavorPicker {
    last: Option<&'static str>,
}

impl FlavorPicker {
    pub fn last(&self) -> Option<&'static str> {
        self.last
    }

    pub fn choose(
        &mut self,
        candidates: &'static [&'static str],
        roller: &mut impl Roller,
    ) -> &'static str {
        let mut pool: Vec<&'static str> = candidates
            .iter()
            .copied()
            .filter(|t| Some(*t) != self.last)
            .collect();
        if pool.is_empty() {
            pool = candidates.to_vec();
        }
        let Some(last_idx) = pool.len().checked_sub(1) else {
            return "";
        };
        let text = pool[roller.pick(pool.len()).min(last_idx)];
        self.last = Some(text);
        text
    }
}

/// Three-die roll resolution with flavor-text memory across rolls.
#[derive(Debug, Clone, Default)]
pub struct RollResolver {
    flavor: FlavorPicker,
}

impl RollResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_flavor(&self) -> Option<&'static str> {
        self.flavor.last()
    }

    /// Exactly three positive face counts.
    pub fn validate_dice(dice: &[u32]) -> Result<[u32; 3]> {
        let sizes: [u32; 3] = dice.try_into().map_err(|_| {
            EngineError::InvalidInput(format!("expected exactly 3 dice, got {}", dice.len()))
        })?;
        if let Some(bad) = sizes.iter().find(|s| **s == 0) {
            return Err(EngineError::InvalidInput(format!(
                "die size must be positive, got {}",
                bad
            )));
        }
        Ok(sizes)
    }

    pub fn roll(
        &mut self,
        dice: &[u32],
        modifier_total: i64,
        roller: &mut impl Roller,
    ) -> Result<RollResult> {
        let sizes = Self::validate_dice(dice)?;
        let draws = sizes.map(|die| DieRoll {
            die,
            value: roller.roll_die(die),
        });
        Ok(self.resolve(draws, modifier_total, roller))
    }

    /// Sort, apply the modifier to mid and classify already-drawn dice.
    pub fn resolve(
        &mut self,
        draws: [DieRoll; 3],
        modifier_total: i64,
        roller: &mut impl Roller,
    ) -> RollResult {
        let mut sorted = draws;
        sorted.sort_by_key(|r| r.value);
        let [lo, md, hi] = sorted;
        let raw_values = draws.map(|r| r.value);
        let tier = FlavorTier::classify(raw_values, hi.value);
        let flavor = self.flavor.choose(tier.candidates(), roller);
        let result = RollResult {
            raw: draws,
            sorted,
            min: lo.value,
            mid: md.value,
            max: hi.value,
            modifier_total,
            final_mid: i64::from(md.value) + modifier_total,
            tier,
            flavor,
        };
        debug!(
            raw = ?raw_values,
            min = result.min,
            mid = result.mid,
            max = result.max,
            final_mid = result.final_mid,
            tier = tier.name(),
            "roll resolved"
        );
        result
    }
}
