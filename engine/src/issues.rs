use serde::{Deserialize, Serialize};

use crate::error::{EngineError, RecordKind, Result};

pub const MAX_PAST_ISSUES: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IssueCollection {
    pub name: String,
    pub issues: Vec<String>,
}

/// The hero's comic-issue history: the current issue, up to five past
/// issues, and named collections archived from full sets of past issues.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IssueLog {
    pub current: String,
    pub past: Vec<String>,
    pub collections: Vec<IssueCollection>,
}

impl IssueLog {
    pub fn set_current(&mut self, text: impl Into<String>) {
        self.current = text.into();
    }

    /// Write one of the five past-issue slots, padding earlier ones with blanks.
    pub fn set_past(&mut self, slot: usize, text: impl Into<String>) -> Result<()> {
        if slot >= MAX_PAST_ISSUES {
            return Err(EngineError::Validation(format!(
                "past issue slot {} out of range (0..{})",
                slot, MAX_PAST_ISSUES
            )));
        }
        if self.past.len() <= slot {
            self.past.resize(slot + 1, String::new());
        }
        self.past[slot] = text.into();
        Ok(())
    }

    pub fn filled_past_count(&self) -> usize {
        self.past.iter().filter(|i| !i.trim().is_empty()).count()
    }

    /// True once all five past slots hold text.
    pub fn can_create_collection(&self) -> bool {
        self.filled_past_count() == MAX_PAST_ISSUES
    }

    /// Archive the five past issues under `name` and clear them.
    pub fn create_collection(&mut self, name: &str) -> Result<&IssueCollection> {
        let name = name.trim();
        if name.is_empty() {
            return Err(EngineError::Validation(
                "please enter a collection name".to_string(),
            ));
        }
        if !self.can_create_collection() {
            return Err(EngineError::Validation(format!(
                "a collection needs {} past issues, have {}",
                MAX_PAST_ISSUES,
                self.filled_past_count()
            )));
        }
        let issues = std::mem::take(&mut self.past);
        self.collections.push(IssueCollection {
            name: name.to_string(),
            issues,
        });
        Ok(&self.collections[self.collections.len() - 1])
    }

    pub fn rename_collection(&mut self, index: usize, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(EngineError::Validation(
                "collection name must not be empty".to_string(),
            ));
        }
        let c = self
            .collections
            .get_mut(index)
            .ok_or_else(|| EngineError::not_found(RecordKind::Collection, index))?;
        c.name = name.to_string();
        Ok(())
    }

    pub fn delete_collection(&mut self, index: usize) -> Result<IssueCollection> {
        if index >= self.collections.len() {
            return Err(EngineError::not_found(RecordKind::Collection, index));
        }
        Ok(self.collections.remove(index))
    }

    pub(crate) fn normalize(&mut self) {
        self.past.truncate(MAX_PAST_ISSUES);
    }
}
