use std::{fs, path::Path, time::Duration};

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

pub const DEFAULT_STORAGE_KEY: &str = "hero-character";

/// How health maps onto zones. One mode is applied everywhere a store is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ZoneMode {
    /// Thresholds on `floor(current / max * 100)`: 75 / 35 / 1.
    #[default]
    Percentage,
    /// Precomputed absolute health floors for each zone.
    Absolute {
        green_min: u32,
        yellow_min: u32,
        red_min: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct EngineConfig {
    pub storage_key: String,
    pub zone_mode: ZoneMode,
    pub roll_delay_ms: u64,
    pub flavor_display_ms: u64,
    pub default_dice: [u32; 3],
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            zone_mode: ZoneMode::Percentage,
            roll_delay_ms: 800,
            flavor_display_ms: 1500,
            default_dice: [6, 8, 10],
        }
    }
}

impl EngineConfig {
    pub fn from_yaml_str(text: &str) -> anyhow::Result<Self> {
        let cfg: EngineConfig = serde_yaml::from_str(text).context("failed to parse YAML config")?;
        cfg.validated()
    }

    pub fn from_json_str(text: &str) -> anyhow::Result<Self> {
        let cfg: EngineConfig = serde_json::from_str(text).context("failed to parse JSON config")?;
        cfg.validated()
    }

    /// Load by extension: `.json` is JSON, anything else is YAML.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let parsed = if is_json {
            Self::from_json_str(&text)
        } else {
            Self::from_yaml_str(&text)
        };
        parsed.with_context(|| format!("invalid config: {}", path.display()))
    }

    pub fn roll_delay(&self) -> Duration {
        Duration::from_millis(self.roll_delay_ms)
    }

    pub fn flavor_display(&self) -> Duration {
        Duration::from_millis(self.flavor_display_ms)
    }

    fn validated(self) -> anyhow::Result<Self> {
        if self.storage_key.trim().is_empty() {
            bail!("storage_key must not be empty");
        }
        if self.default_dice.contains(&0) {
            bail!("default_dice must be positive face counts");
        }
        if let ZoneMode::Absolute {
            green_min,
            yellow_min,
            red_min,
        } = self.zone_mode
        {
            if !(green_min >= yellow_min && yellow_min >= red_min) {
                bail!("absolute zone floors must satisfy green_min >= yellow_min >= red_min");
            }
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaml_keeps_defaults_for_missing_keys() {
        let cfg = EngineConfig::from_yaml_str("roll_delay_ms: 10\n").unwrap();
        assert_eq!(cfg.roll_delay_ms, 10);
        assert_eq!(cfg.flavor_display_ms, 1500);
        assert_eq!(cfg.storage_key, DEFAULT_STORAGE_KEY);
        assert_eq!(cfg.zone_mode, ZoneMode::Percentage);
    }

    #[test]
    fn absolute_mode_parses_from_yaml() {
        let text = "zone_mode:\n  kind: absolute\n  green_min: 30\n  yellow_min: 15\n  red_min: 1\n";
        let cfg = EngineConfig::from_yaml_str(text).unwrap();
        assert_eq!(
            cfg.zone_mode,
            ZoneMode::Absolute {
                green_min: 30,
                yellow_min: 15,
                red_min: 1
            }
        );
    }

    #[test]
    fn rejects_unordered_floors() {
        let text = r#"{"zone_mode":{"kind":"absolute","green_min":1,"yellow_min":5,"red_min":1}}"#;
        assert!(EngineConfig::from_json_str(text).is_err());
    }
}
