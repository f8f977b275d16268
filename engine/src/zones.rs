use serde::{Deserialize, Serialize};

use crate::config::ZoneMode;
use crate::health::HealthPool;
use crate::DieSize;

/// Health-derived hero state. Declaration order is severity order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    Green,
    Yellow,
    Red,
    Out,
}

impl Zone {
    pub const ALL: [Zone; 4] = [Zone::Green, Zone::Yellow, Zone::Red, Zone::Out];

    pub fn as_str(self) -> &'static str {
        match self {
            Zone::Green => "green",
            Zone::Yellow => "yellow",
            Zone::Red => "red",
            Zone::Out => "out",
        }
    }

    /// Status die the table usually hands a hero in this zone.
    pub fn suggested_status_die(self) -> DieSize {
        match self {
            Zone::Green => DieSize::D10,
            Zone::Yellow => DieSize::D8,
            Zone::Red => DieSize::D6,
            Zone::Out => DieSize::D4,
        }
    }
}

impl std::fmt::Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Zone a power or ability is tagged with. There is no `out` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneTag {
    #[default]
    Green,
    Yellow,
    Red,
}

impl ZoneTag {
    pub const ALL: [ZoneTag; 3] = [ZoneTag::Green, ZoneTag::Yellow, ZoneTag::Red];

    pub fn zone(self) -> Zone {
        match self {
            ZoneTag::Green => Zone::Green,
            ZoneTag::Yellow => Zone::Yellow,
            ZoneTag::Red => Zone::Red,
        }
    }
}

impl std::str::FromStr for ZoneTag {
    type Err = crate::EngineError;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "green" => Ok(ZoneTag::Green),
            "yellow" => Ok(ZoneTag::Yellow),
            "red" => Ok(ZoneTag::Red),
            other => Err(crate::EngineError::Validation(format!(
                "unknown zone '{}'",
                other
            ))),
        }
    }
}

/// Manually forced zones, toggled from the scene tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneOverrides {
    pub green: bool,
    pub yellow: bool,
    pub red: bool,
}

impl ZoneOverrides {
    /// The single "scene override" switch: forces red.
    pub fn scene() -> Self {
        Self {
            red: true,
            ..Self::default()
        }
    }

    pub fn is_enabled(&self, tag: ZoneTag) -> bool {
        match tag {
            ZoneTag::Green => self.green,
            ZoneTag::Yellow => self.yellow,
            ZoneTag::Red => self.red,
        }
    }

    pub fn set(&mut self, tag: ZoneTag, enabled: bool) {
        match tag {
            ZoneTag::Green => self.green = enabled,
            ZoneTag::Yellow => self.yellow = enabled,
            ZoneTag::Red => self.red = enabled,
        }
    }

    /// Flip one override; returns the new state.
    pub fn toggle(&mut self, tag: ZoneTag) -> bool {
        let next = !self.is_enabled(tag);
        self.set(tag, next);
        next
    }

    pub fn any(&self) -> bool {
        self.green || self.yellow || self.red
    }

    /// Most severe enabled override, if any.
    pub fn strongest(&self) -> Option<ZoneTag> {
        ZoneTag::ALL
            .into_iter()
            .rev()
            .find(|tag| self.is_enabled(*tag))
    }
}

/// `floor(current / max * 100)` in integer arithmetic; `max == 0` yields 0.
pub fn health_percentage(current: u32, max: u32) -> u32 {
    if max == 0 {
        return 0;
    }
    (u64::from(current) * 100 / u64::from(max)) as u32
}

pub fn zone_for_percentage(pct: u32) -> Zone {
    if pct >= 75 {
        Zone::Green
    } else if pct >= 35 {
        Zone::Yellow
    } else if pct >= 1 {
        Zone::Red
    } else {
        Zone::Out
    }
}

pub fn zone_for_absolute(current: u32, green_min: u32, yellow_min: u32, red_min: u32) -> Zone {
    if current >= green_min {
        Zone::Green
    } else if current >= yellow_min {
        Zone::Yellow
    } else if current >= red_min {
        Zone::Red
    } else {
        Zone::Out
    }
}

/// Zone from health alone under the given threshold mode.
pub fn health_zone(health: &HealthPool, mode: &ZoneMode) -> Zone {
    match *mode {
        ZoneMode::Percentage => zone_for_percentage(health_percentage(health.current, health.max)),
        ZoneMode::Absolute {
            green_min,
            yellow_min,
            red_min,
        } => zone_for_absolute(health.current, green_min, yellow_min, red_min),
    }
}

/// Active zone under percentage thresholds.
pub fn resolve_zone(health: &HealthPool, overrides: &ZoneOverrides) -> Zone {
    resolve_zone_with(health, overrides, &ZoneMode::Percentage)
}

/// Any enabled override wins outright; the most severe one is the zone.
pub fn resolve_zone_with(health: &HealthPool, overrides: &ZoneOverrides, mode: &ZoneMode) -> Zone {
    match overrides.strongest() {
        Some(tag) => tag.zone(),
        None => health_zone(health, mode),
    }
}

/// Flip one override and narrate it. Returns the new state.
pub fn toggle_override(
    name: &str,
    overrides: &mut ZoneOverrides,
    tag: ZoneTag,
    mut log: impl FnMut(String),
) -> bool {
    let enabled = overrides.toggle(tag);
    log(format!(
        "[ZONE][{}] {} override {}",
        name,
        tag.zone(),
        if enabled { "ENABLED" } else { "OFF" }
    ));
    enabled
}
