use serde::{Deserialize, Serialize};

use crate::zones::health_percentage;

/// Hero hit points. Holds `0 <= current <= max` and `max >= 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthPool {
    pub current: u32,
    pub max: u32,
}

impl Default for HealthPool {
    fn default() -> Self {
        Self::new(100)
    }
}

impl HealthPool {
    pub fn new(max: u32) -> Self {
        let max = max.max(1);
        Self { current: max, max }
    }

    pub fn with_current(current: u32, max: u32) -> Self {
        let mut pool = Self::new(max);
        pool.set_current(current);
        pool
    }

    pub fn set_current(&mut self, current: u32) {
        self.current = current.min(self.max);
    }

    /// Changing the maximum re-clamps the current value.
    pub fn set_max(&mut self, max: u32) {
        self.max = max.max(1);
        self.current = self.current.min(self.max);
    }

    pub fn percentage(&self) -> u32 {
        health_percentage(self.current, self.max)
    }

    /// Restore the invariant on values that arrived from outside.
    pub(crate) fn normalize(&mut self) {
        let current = self.current;
        self.set_max(self.max);
        self.set_current(current);
    }
}

/// Apply damage, clamped at 0. Returns true if the hero dropped to 0 this call.
pub fn apply_damage(
    name: &str,
    health: &mut HealthPool,
    dmg: u32,
    mut log: impl FnMut(String),
) -> bool {
    let before = health.current;
    health.current = health.current.saturating_sub(dmg);
    log(format!(
        "[DMG][{}] {} → {} (−{})",
        name, before, health.current, dmg
    ));
    before > 0 && health.current == 0
}

/// Healing, clamped at max.
pub fn heal(name: &str, health: &mut HealthPool, amount: u32, mut log: impl FnMut(String)) {
    if amount == 0 {
        return;
    }
    let before = health.current;
    health.current = health.current.saturating_add(amount).min(health.max);
    log(format!(
        "[HEAL][{}] +{} HP ({} → {})",
        name, amount, before, health.current
    ));
}
