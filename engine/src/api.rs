use std::collections::BTreeMap;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::roll::{FlavorTier, RollResolver};
use crate::Dice;

const MAX_SAMPLES: u32 = 1_000_000;

fn default_samples() -> u32 {
    1000
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RollConfig {
    pub dice: Vec<u32>,
    #[serde(default)]
    pub modifier: i64,
    #[serde(default)]
    pub seed: u64,
    #[serde(default = "default_samples")]
    pub samples: u32,
    /// Keep one narration line per roll in the result.
    #[serde(default)]
    pub keep_log: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct RollStats {
    pub samples: u32,
    pub tier_counts: BTreeMap<&'static str, u32>,
    pub critical_fails: u32,
    pub mean_min: f64,
    pub mean_mid: f64,
    pub mean_final_mid: f64,
    pub mean_max: f64,
    /// Rolls whose flavor text matched the previous roll's.
    pub repeated_flavor: u32,
    pub log: Vec<String>,
}

/// Seeded batch of rolls for balance checks and the CLI.
pub fn simulate_rolls(cfg: RollConfig) -> Result<RollStats> {
    if cfg.samples == 0 || cfg.samples > MAX_SAMPLES {
        bail!("samples must be in 1..={}", MAX_SAMPLES);
    }
    RollResolver::validate_dice(&cfg.dice).context("invalid dice for simulation")?;

    let mut dice = Dice::from_seed(cfg.seed);
    let mut resolver = RollResolver::new();
    let mut tier_counts: BTreeMap<&'static str, u32> =
        FlavorTier::ALL.iter().map(|t| (t.name(), 0)).collect();
    let mut critical_fails = 0u32;
    let (mut sum_min, mut sum_mid, mut sum_final, mut sum_max) = (0f64, 0f64, 0f64, 0f64);
    let mut repeated_flavor = 0u32;
    let mut previous: Option<&'static str> = None;
    let mut log = Vec::new();

    for _ in 0..cfg.samples {
        let res = resolver.roll(&cfg.dice, cfg.modifier, &mut dice)?;
        *tier_counts.entry(res.tier.name()).or_default() += 1;
        if res.is_critical_fail() {
            critical_fails += 1;
        }
        if previous == Some(res.flavor) {
            repeated_flavor += 1;
        }
        previous = Some(res.flavor);
        sum_min += f64::from(res.min);
        sum_mid += f64::from(res.mid);
        sum_final += res.final_mid as f64;
        sum_max += f64::from(res.max);
        if cfg.keep_log {
            log.push(res.narrate());
        }
    }

    let n = f64::from(cfg.samples);
    Ok(RollStats {
        samples: cfg.samples,
        tier_counts,
        critical_fails,
        mean_min: sum_min / n,
        mean_mid: sum_mid / n,
        mean_final_mid: sum_final / n,
        mean_max: sum_max / n,
        repeated_flavor,
        log,
    })
}
