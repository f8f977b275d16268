use std::collections::HashSet;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::config::ZoneMode;
use crate::error::{EngineError, RecordKind, Result};
use crate::health::HealthPool;
use crate::issues::{IssueCollection, IssueLog};
use crate::powers::{is_available, Ability, AbilityDraft, Power, PowerDraft, Quality};
use crate::zones::{resolve_zone_with, Zone, ZoneOverrides};
use crate::{DieSize, IdClock};

pub const DEFAULT_POWER_NAME: &str = "New Power";
pub const DEFAULT_QUALITY_NAME: &str = "New Quality";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Preferences {
    pub hide_dice_tray: bool,
}

/// The character sheet aggregate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Hero {
    pub name: String,
    pub health: HealthPool,
    pub zone_overrides: ZoneOverrides,
    pub powers: Vec<Power>,
    pub qualities: Vec<Quality>,
    pub abilities: Vec<Ability>,
    pub issues: IssueLog,
    pub principles: String,
    pub hero_points: u32,
    pub preferences: Preferences,
    #[serde(skip)]
    ids: IdClock,
}

impl Hero {
    pub fn zone(&self, mode: &ZoneMode) -> Zone {
        resolve_zone_with(&self.health, &self.zone_overrides, mode)
    }

    pub fn power(&self, id: &str) -> Option<&Power> {
        self.powers.iter().find(|p| p.id == id)
    }

    pub fn is_power_available(&self, id: &str, mode: &ZoneMode) -> Result<bool> {
        let power = self
            .power(id)
            .ok_or_else(|| EngineError::not_found(RecordKind::Power, id))?;
        Ok(is_available(self.zone(mode), power.zone))
    }

    pub fn available_abilities(&self, mode: &ZoneMode) -> Vec<&Ability> {
        let zone = self.zone(mode);
        self.abilities
            .iter()
            .filter(|a| is_available(zone, a.zone))
            .collect()
    }

    pub fn add_power(&mut self, draft: PowerDraft) -> String {
        let id = self.ids.next_id();
        self.powers.push(Power {
            id: id.clone(),
            name: name_or(&draft.name, DEFAULT_POWER_NAME),
            die: draft.die,
            zone: draft.zone,
            text: draft.text,
        });
        id
    }

    pub fn update_power(&mut self, id: &str, draft: PowerDraft) -> Result<()> {
        let p = self
            .powers
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| EngineError::not_found(RecordKind::Power, id))?;
        p.name = name_or(&draft.name, DEFAULT_POWER_NAME);
        p.die = draft.die;
        p.zone = draft.zone;
        p.text = draft.text;
        Ok(())
    }

    pub fn remove_power(&mut self, id: &str) -> Result<Power> {
        let idx = self
            .powers
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| EngineError::not_found(RecordKind::Power, id))?;
        Ok(self.powers.remove(idx))
    }

    pub fn add_quality(&mut self, name: &str, die: DieSize) -> String {
        let id = self.ids.next_id();
        self.qualities.push(Quality {
            id: id.clone(),
            name: name_or(name, DEFAULT_QUALITY_NAME),
            die,
        });
        id
    }

    pub fn update_quality(&mut self, id: &str, name: &str, die: DieSize) -> Result<()> {
        let q = self
            .qualities
            .iter_mut()
            .find(|q| q.id == id)
            .ok_or_else(|| EngineError::not_found(RecordKind::Quality, id))?;
        q.name = name_or(name, DEFAULT_QUALITY_NAME);
        q.die = die;
        Ok(())
    }

    pub fn remove_quality(&mut self, id: &str) -> Result<Quality> {
        let idx = self
            .qualities
            .iter()
            .position(|q| q.id == id)
            .ok_or_else(|| EngineError::not_found(RecordKind::Quality, id))?;
        Ok(self.qualities.remove(idx))
    }

    pub fn add_ability(&mut self, draft: AbilityDraft) -> String {
        let id = self.ids.next_id();
        self.abilities.push(Ability {
            id: id.clone(),
            name: draft.name,
            trait_id: draft.trait_id,
            interaction_type: draft.interaction_type,
            zone: draft.zone,
            text: draft.text,
            actions: draft.actions,
        });
        id
    }

    pub fn update_ability(&mut self, id: &str, draft: AbilityDraft) -> Result<()> {
        let a = self
            .abilities
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| EngineError::not_found(RecordKind::Ability, id))?;
        a.name = draft.name;
        a.trait_id = draft.trait_id;
        a.interaction_type = draft.interaction_type;
        a.zone = draft.zone;
        a.text = draft.text;
        a.actions = draft.actions;
        Ok(())
    }

    pub fn remove_ability(&mut self, id: &str) -> Result<Ability> {
        let idx = self
            .abilities
            .iter()
            .position(|a| a.id == id)
            .ok_or_else(|| EngineError::not_found(RecordKind::Ability, id))?;
        Ok(self.abilities.remove(idx))
    }

    /// Build a hero from stored JSON of any vintage.
    ///
    /// Each field is taken independently: a missing or malformed field keeps
    /// its default, and malformed list entries are skipped. Never fails.
    pub fn from_value_lenient(value: &Value) -> Self {
        let mut hero = Hero::default();
        let Some(obj) = value.as_object() else {
            warn!("stored hero is not an object; using defaults");
            return hero;
        };

        if let Some(name) = field::<String>(obj, "name") {
            hero.name = name;
        }

        if let Some(health) = obj.get("health").and_then(Value::as_object) {
            if let Some(max) = field::<u32>(health, "max") {
                hero.health.max = max;
            }
            if let Some(current) = field::<u32>(health, "current") {
                hero.health.current = current;
            }
        } else {
            if let Some(max) = field::<u32>(obj, "maxHealth") {
                hero.health.max = max;
            }
            if let Some(current) = field::<u32>(obj, "currentHealth") {
                hero.health.current = current;
            }
        }

        if let Some(o) = field::<ZoneOverrides>(obj, "zoneOverrides") {
            hero.zone_overrides = o;
        } else if field::<bool>(obj, "sceneOverride") == Some(true) {
            hero.zone_overrides = ZoneOverrides::scene();
        }

        let powers_key = if obj.contains_key("powers") { "powers" } else { "modules" };
        hero.powers = records(obj, powers_key, &mut hero.ids);
        hero.qualities = records(obj, "qualities", &mut hero.ids);
        hero.abilities = records(obj, "abilities", &mut hero.ids);

        if let Some(issues) = obj.get("issues").and_then(Value::as_object) {
            if let Some(current) = field::<String>(issues, "current") {
                hero.issues.current = current;
            }
            if let Some(past) = issues.get("past").and_then(Value::as_array) {
                hero.issues.past = past
                    .iter()
                    .map(|v| v.as_str().unwrap_or_default().to_string())
                    .collect();
            }
            hero.issues.collections = list::<IssueCollection>(issues, "collections");
        }

        if let Some(principles) = field::<String>(obj, "principles") {
            hero.principles = principles;
        }
        if let Some(points) = field::<u32>(obj, "heroPoints") {
            hero.hero_points = points;
        }
        if let Some(prefs) = field::<Preferences>(obj, "preferences") {
            hero.preferences = prefs;
        }

        hero.normalize();
        hero
    }

    /// Restore invariants on data from outside: health bounds, five past
    /// issues, unique ids within each list.
    pub(crate) fn normalize(&mut self) {
        self.health.normalize();
        self.issues.normalize();
        dedupe_by_id(&mut self.powers, |p| &p.id);
        dedupe_by_id(&mut self.qualities, |q| &q.id);
        dedupe_by_id(&mut self.abilities, |a| &a.id);
        let ids: Vec<String> = self
            .powers
            .iter()
            .map(|p| p.id.clone())
            .chain(self.qualities.iter().map(|q| q.id.clone()))
            .chain(self.abilities.iter().map(|a| a.id.clone()))
            .collect();
        for id in &ids {
            self.ids.observe(id);
        }
    }
}

fn name_or(name: &str, fallback: &str) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

fn field<T: DeserializeOwned>(obj: &Map<String, Value>, key: &str) -> Option<T> {
    let v = obj.get(key)?;
    match serde_json::from_value(v.clone()) {
        Ok(t) => Some(t),
        Err(err) => {
            warn!(key, %err, "ignoring malformed stored field");
            None
        }
    }
}

fn list<T: DeserializeOwned>(obj: &Map<String, Value>, key: &str) -> Vec<T> {
    let Some(items) = obj.get(key).and_then(Value::as_array) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|v| match serde_json::from_value(v.clone()) {
            Ok(t) => Some(t),
            Err(err) => {
                warn!(key, %err, "skipping malformed stored entry");
                None
            }
        })
        .collect()
}

/// Like [`list`], but entries stored without an id get a fresh one.
fn records<T: DeserializeOwned>(obj: &Map<String, Value>, key: &str, ids: &mut IdClock) -> Vec<T> {
    let Some(items) = obj.get(key).and_then(Value::as_array) else {
        return Vec::new();
    };
    let patched: Vec<Value> = items
        .iter()
        .cloned()
        .map(|mut v| {
            if let Some(entry) = v.as_object_mut() {
                let has_id = entry.get("id").is_some_and(|id| id.is_string());
                if !has_id {
                    entry.insert("id".to_string(), Value::String(ids.next_id()));
                }
            }
            v
        })
        .collect();
    let mut wrapper = Map::new();
    wrapper.insert(key.to_string(), Value::Array(patched));
    list(&wrapper, key)
}

fn dedupe_by_id<T>(items: &mut Vec<T>, id: impl Fn(&T) -> &String) {
    let mut seen = HashSet::new();
    items.retain(|item| {
        let fresh = seen.insert(id(item).clone());
        if !fresh {
            warn!(id = %id(item), "dropping entry with duplicate id");
        }
        fresh
    });
}
