use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{EngineError, RecordKind, Result};
use crate::IdClock;

pub const DEFAULT_MODIFIER_NAME: &str = "Modifier";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Modifier {
    pub id: String,
    pub name: String,
    pub value: i32,
    pub is_persistent: bool,
    pub is_active: bool,
}

/// Partial update. A missing name resets to "Modifier"; a missing value is rejected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModifierEdit {
    pub name: Option<String>,
    pub value: Option<f64>,
    pub is_persistent: Option<bool>,
}

/// Accept a form value only if it is a finite whole number that fits in i32.
pub fn validate_value(value: f64) -> Result<i32> {
    if !value.is_finite() {
        return Err(EngineError::Validation(format!(
            "modifier value must be a finite number, got {}",
            value
        )));
    }
    if value.fract() != 0.0 || value < f64::from(i32::MIN) || value > f64::from(i32::MAX) {
        return Err(EngineError::Validation(format!(
            "modifier value must be a whole number, got {}",
            value
        )));
    }
    Ok(value as i32)
}

/// Parse text typed into a value field.
pub fn parse_value(text: &str) -> Result<i32> {
    let trimmed = text.trim();
    let value: f64 = trimmed.parse().map_err(|_| {
        EngineError::Validation(format!("modifier value '{}' is not a number", trimmed))
    })?;
    validate_value(value)
}

fn display_name(name: Option<&str>) -> String {
    match name.map(str::trim) {
        Some(n) if !n.is_empty() => n.to_string(),
        _ => DEFAULT_MODIFIER_NAME.to_string(),
    }
}

/// Named roll modifiers in insertion order.
#[derive(Debug, Clone, Default)]
pub struct ModifierLedger {
    entries: IndexMap<String, Modifier>,
    ids: IdClock,
}

impl ModifierLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from stored entries; later duplicates of an id are dropped.
    pub fn from_entries(entries: impl IntoIterator<Item = Modifier>) -> Self {
        let mut ledger = Self::new();
        for m in entries {
            ledger.ids.observe(&m.id);
            if ledger.entries.contains_key(&m.id) {
                tracing::warn!(id = %m.id, "dropping modifier with duplicate id");
                continue;
            }
            ledger.entries.insert(m.id.clone(), m);
        }
        ledger
    }

    /// New modifiers always start active.
    pub fn add(&mut self, name: &str, value: f64, is_persistent: bool) -> Result<String> {
        let value = validate_value(value)?;
        let id = self.ids.next_id();
        let modifier = Modifier {
            id: id.clone(),
            name: display_name(Some(name)),
            value,
            is_persistent,
            is_active: true,
        };
        debug!(id = %id, name = %modifier.name, value, is_persistent, "modifier added");
        self.entries.insert(id.clone(), modifier);
        Ok(id)
    }

    /// Flip `is_active`; returns the new state.
    pub fn toggle_active(&mut self, id: &str) -> Result<bool> {
        let m = self
            .entries
            .get_mut(id)
            .ok_or_else(|| EngineError::not_found(RecordKind::Modifier, id))?;
        m.is_active = !m.is_active;
        Ok(m.is_active)
    }

    pub fn edit(&mut self, id: &str, edit: ModifierEdit) -> Result<&Modifier> {
        let value = match edit.value {
            Some(v) => validate_value(v)?,
            None => {
                return Err(EngineError::Validation(
                    "modifier value is required".to_string(),
                ));
            }
        };
        let m = self
            .entries
            .get_mut(id)
            .ok_or_else(|| EngineError::not_found(RecordKind::Modifier, id))?;
        m.name = display_name(edit.name.as_deref());
        m.value = value;
        if let Some(p) = edit.is_persistent {
            m.is_persistent = p;
        }
        Ok(m)
    }

    pub fn remove(&mut self, id: &str) -> Result<Modifier> {
        self.entries
            .shift_remove(id)
            .ok_or_else(|| EngineError::not_found(RecordKind::Modifier, id))
    }

    /// Drop every temporary modifier, active or not. Returns how many went.
    pub fn clear_temporary(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, m| m.is_persistent);
        before - self.entries.len()
    }

    pub fn active_total(&self) -> i64 {
        self.entries
            .values()
            .filter(|m| m.is_active)
            .map(|m| i64::from(m.value))
            .sum()
    }

    pub fn has_temporary(&self) -> bool {
        self.entries.values().any(|m| !m.is_persistent)
    }

    pub fn get(&self, id: &str) -> Option<&Modifier> {
        self.entries.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Modifier> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_vec(&self) -> Vec<Modifier> {
        self.entries.values().cloned().collect()
    }
}

/// Drop the temporary modifiers and narrate what went.
pub fn clear_temporary(name: &str, ledger: &mut ModifierLedger, mut log: impl FnMut(String)) -> usize {
    let before = ledger.active_total();
    let removed = ledger.clear_temporary();
    log(format!(
        "[MOD][{}] cleared {} temporary (total {} → {})",
        name,
        removed,
        before,
        ledger.active_total()
    ));
    removed
}
