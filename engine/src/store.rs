use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::export::{parse_import, ExportDocument};
use crate::health::{apply_damage, heal};
use crate::hero::Hero;
use crate::issues::IssueCollection;
use crate::modifiers::{clear_temporary, Modifier, ModifierEdit, ModifierLedger};
use crate::persistence::Persistence;
use crate::powers::{is_available, AbilityDraft, PowerDraft};
use crate::roll::{RollResolver, RollResult};
use crate::zones::{toggle_override, Zone, ZoneOverrides, ZoneTag};
use crate::{DieSize, Roller};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SavedState<'a> {
    character: &'a Hero,
    modifiers: Vec<Modifier>,
    selected_dice: [u32; 3],
}

/// Owns the hero, its modifiers and dice-tray selection, and writes the
/// whole sheet through to persistence after every change.
pub struct CharacterStore<P: Persistence> {
    persistence: P,
    config: EngineConfig,
    hero: Hero,
    modifiers: ModifierLedger,
    dice: [u32; 3],
    last_save_ok: bool,
}

impl<P: Persistence> CharacterStore<P> {
    /// Load whatever the persistence layer holds, merged over defaults.
    pub fn open(persistence: P, config: EngineConfig) -> Self {
        let mut store = Self {
            persistence,
            dice: config.default_dice,
            config,
            hero: Hero::default(),
            modifiers: ModifierLedger::new(),
            last_save_ok: true,
        };
        if let Some(state) = store.persistence.load() {
            store.apply_saved(&state);
        }
        store
    }

    fn apply_saved(&mut self, state: &Value) {
        let Some(obj) = state.as_object() else {
            warn!("saved state is not an object; keeping defaults");
            return;
        };
        if let Some(character) = obj.get("character").or_else(|| obj.get("hero")) {
            self.hero = Hero::from_value_lenient(character);
        }
        if let Some(items) = obj.get("modifiers").and_then(Value::as_array) {
            let entries = items.iter().filter_map(|v| {
                serde_json::from_value::<Modifier>(v.clone())
                    .map_err(|err| warn!(%err, "skipping malformed stored modifier"))
                    .ok()
            });
            self.modifiers = ModifierLedger::from_entries(entries);
        }
        if let Some(v) = obj.get("selectedDice") {
            match serde_json::from_value::<[u32; 3]>(v.clone()) {
                Ok(dice) if RollResolver::validate_dice(&dice).is_ok() => self.dice = dice,
                _ => warn!("ignoring invalid stored dice selection"),
            }
        }
    }

    pub fn hero(&self) -> &Hero {
        &self.hero
    }

    pub fn modifiers(&self) -> &ModifierLedger {
        &self.modifiers
    }

    pub fn dice(&self) -> [u32; 3] {
        self.dice
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn persistence(&self) -> &P {
        &self.persistence
    }

    pub fn zone(&self) -> Zone {
        self.hero.zone(&self.config.zone_mode)
    }

    pub fn is_available(&self, tag: ZoneTag) -> bool {
        is_available(self.zone(), tag)
    }

    /// Outcome of the most recent write.
    pub fn last_save_ok(&self) -> bool {
        self.last_save_ok
    }

    pub fn save(&mut self) -> bool {
        let state = SavedState {
            character: &self.hero,
            modifiers: self.modifiers.to_vec(),
            selected_dice: self.dice,
        };
        let ok = match serde_json::to_value(&state) {
            Ok(value) => self.persistence.save(&value),
            Err(err) => {
                warn!(%err, "could not serialize sheet");
                false
            }
        };
        if !ok {
            warn!(key = %self.config.storage_key, "sheet save failed");
        }
        self.last_save_ok = ok;
        ok
    }

    /// Wipe storage and reset to a blank sheet.
    pub fn clear(&mut self) -> bool {
        self.hero = Hero::default();
        self.modifiers = ModifierLedger::new();
        self.dice = self.config.default_dice;
        self.persistence.clear()
    }

    fn mutate<T>(&mut self, f: impl FnOnce(&mut Hero) -> Result<T>) -> Result<T> {
        let out = f(&mut self.hero)?;
        self.save();
        Ok(out)
    }

    fn log_name(&self) -> String {
        if self.hero.name.trim().is_empty() {
            "Hero".to_string()
        } else {
            self.hero.name.clone()
        }
    }

    pub fn set_name(&mut self, name: &str) {
        self.hero.name = name.trim().to_string();
        self.save();
    }

    pub fn set_principles(&mut self, text: &str) {
        self.hero.principles = text.to_string();
        self.save();
    }

    pub fn set_hero_points(&mut self, points: u32) {
        self.hero.hero_points = points;
        self.save();
    }

    pub fn set_hide_dice_tray(&mut self, hide: bool) {
        self.hero.preferences.hide_dice_tray = hide;
        self.save();
    }

    pub fn set_health(&mut self, current: u32) {
        self.hero.health.set_current(current);
        self.save();
    }

    pub fn set_max_health(&mut self, max: u32) {
        self.hero.health.set_max(max);
        self.save();
    }

    /// Returns true if this hit dropped the hero to 0.
    pub fn damage(&mut self, amount: u32) -> bool {
        let name = self.log_name();
        let dropped = apply_damage(&name, &mut self.hero.health, amount, |line| debug!("{}", line));
        self.save();
        dropped
    }

    pub fn heal(&mut self, amount: u32) {
        let name = self.log_name();
        heal(&name, &mut self.hero.health, amount, |line| debug!("{}", line));
        self.save();
    }

    /// Returns the override's new state.
    pub fn toggle_override(&mut self, tag: ZoneTag) -> bool {
        let name = self.log_name();
        let enabled = toggle_override(&name, &mut self.hero.zone_overrides, tag, |line| {
            debug!("{}", line)
        });
        self.save();
        enabled
    }

    pub fn set_scene_override(&mut self, on: bool) {
        self.hero.zone_overrides = if on {
            ZoneOverrides::scene()
        } else {
            ZoneOverrides::default()
        };
        self.save();
    }

    pub fn add_power(&mut self, draft: PowerDraft) -> String {
        let id = self.hero.add_power(draft);
        self.save();
        id
    }

    pub fn update_power(&mut self, id: &str, draft: PowerDraft) -> Result<()> {
        self.mutate(|h| h.update_power(id, draft))
    }

    pub fn remove_power(&mut self, id: &str) -> Result<()> {
        self.mutate(|h| h.remove_power(id).map(|_| ()))
    }

    pub fn add_quality(&mut self, name: &str, die: DieSize) -> String {
        let id = self.hero.add_quality(name, die);
        self.save();
        id
    }

    pub fn update_quality(&mut self, id: &str, name: &str, die: DieSize) -> Result<()> {
        self.mutate(|h| h.update_quality(id, name, die))
    }

    pub fn remove_quality(&mut self, id: &str) -> Result<()> {
        self.mutate(|h| h.remove_quality(id).map(|_| ()))
    }

    pub fn add_ability(&mut self, draft: AbilityDraft) -> String {
        let id = self.hero.add_ability(draft);
        self.save();
        id
    }

    pub fn update_ability(&mut self, id: &str, draft: AbilityDraft) -> Result<()> {
        self.mutate(|h| h.update_ability(id, draft))
    }

    pub fn remove_ability(&mut self, id: &str) -> Result<()> {
        self.mutate(|h| h.remove_ability(id).map(|_| ()))
    }

    pub fn set_current_issue(&mut self, text: &str) {
        self.hero.issues.set_current(text);
        self.save();
    }

    pub fn set_past_issue(&mut self, slot: usize, text: &str) -> Result<()> {
        self.mutate(|h| h.issues.set_past(slot, text))
    }

    pub fn can_create_collection(&self) -> bool {
        self.hero.issues.can_create_collection()
    }

    pub fn create_collection(&mut self, name: &str) -> Result<IssueCollection> {
        self.mutate(|h| h.issues.create_collection(name).cloned())
    }

    pub fn rename_collection(&mut self, index: usize, name: &str) -> Result<()> {
        self.mutate(|h| h.issues.rename_collection(index, name))
    }

    pub fn delete_collection(&mut self, index: usize) -> Result<IssueCollection> {
        self.mutate(|h| h.issues.delete_collection(index))
    }

    pub fn add_modifier(&mut self, name: &str, value: f64, is_persistent: bool) -> Result<String> {
        let id = self.modifiers.add(name, value, is_persistent)?;
        self.save();
        Ok(id)
    }

    pub fn toggle_modifier(&mut self, id: &str) -> Result<bool> {
        let active = self.modifiers.toggle_active(id)?;
        self.save();
        Ok(active)
    }

    pub fn edit_modifier(&mut self, id: &str, edit: ModifierEdit) -> Result<()> {
        self.modifiers.edit(id, edit)?;
        self.save();
        Ok(())
    }

    pub fn remove_modifier(&mut self, id: &str) -> Result<()> {
        self.modifiers.remove(id)?;
        self.save();
        Ok(())
    }

    pub fn clear_temporary_modifiers(&mut self) -> usize {
        let name = self.log_name();
        let removed = clear_temporary(&name, &mut self.modifiers, |line| debug!("{}", line));
        self.save();
        removed
    }

    /// Change one dice-tray slot.
    pub fn set_die(&mut self, slot: usize, die: DieSize) -> Result<()> {
        let entry = self.dice.get_mut(slot).ok_or_else(|| {
            EngineError::InvalidInput(format!("dice slot {} out of range (0..3)", slot))
        })?;
        *entry = die.faces();
        self.save();
        Ok(())
    }

    /// Roll the selected dice with the current active modifier total.
    pub fn roll(&self, resolver: &mut RollResolver, roller: &mut impl Roller) -> Result<RollResult> {
        resolver.roll(&self.dice, self.modifiers.active_total(), roller)
    }

    pub fn export_json(&self, at: DateTime<Utc>) -> serde_json::Result<String> {
        ExportDocument::new(&self.hero, at).to_json_pretty()
    }

    /// Replace the hero from an exported document. On error nothing changes.
    pub fn import_json(&mut self, text: &str) -> Result<()> {
        let hero = parse_import(text)?;
        self.hero = hero;
        self.save();
        Ok(())
    }
}
