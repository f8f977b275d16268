use thiserror::Error;

/// What kind of record a lookup failed to find.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Modifier,
    Power,
    Quality,
    Ability,
    Collection,
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RecordKind::Modifier => "modifier",
            RecordKind::Power => "power",
            RecordKind::Quality => "quality",
            RecordKind::Ability => "ability",
            RecordKind::Collection => "collection",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("error reading file: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("invalid character file format")]
    MissingCharacter,
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("{kind} '{id}' not found")]
    NotFound { kind: RecordKind, id: String },
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    Import(#[from] ImportError),
}

impl EngineError {
    pub(crate) fn not_found(kind: RecordKind, id: impl ToString) -> Self {
        EngineError::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
