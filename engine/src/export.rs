use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::error::ImportError;
use crate::hero::Hero;

pub const EXPORT_VERSION: &str = "1.0";

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument<'a> {
    pub character: &'a Hero,
    pub export_date: String,
    pub version: &'static str,
}

impl<'a> ExportDocument<'a> {
    pub fn new(character: &'a Hero, at: DateTime<Utc>) -> Self {
        Self {
            character,
            export_date: at.to_rfc3339_opts(SecondsFormat::Millis, true),
            version: EXPORT_VERSION,
        }
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Suggested download name, `hero-character-<millis>.json`.
pub fn export_file_name(at: DateTime<Utc>) -> String {
    format!("hero-character-{}.json", at.timestamp_millis())
}

/// Parse an exported document. Requires a `character` key; its contents are
/// merged leniently like stored state.
pub fn parse_import(text: &str) -> Result<Hero, ImportError> {
    let doc: Value = serde_json::from_str(text)?;
    let character = doc.get("character").ok_or(ImportError::MissingCharacter)?;
    if character.is_null() {
        return Err(ImportError::MissingCharacter);
    }
    Ok(Hero::from_value_lenient(character))
}
