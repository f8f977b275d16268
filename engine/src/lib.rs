use rand::rngs::OsRng;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::warn;

pub mod api;
pub mod config;
pub mod content;
pub mod error;
pub mod export;
pub mod health;
pub mod hero;
pub mod issues;
pub mod modifiers;
pub mod persistence;
pub mod powers;
pub mod roll;
pub mod session;
pub mod store;
pub mod zones;

pub use config::{EngineConfig, ZoneMode};
pub use error::{EngineError, ImportError, RecordKind, Result};
pub use health::HealthPool;
pub use hero::Hero;
pub use modifiers::{Modifier, ModifierEdit, ModifierLedger};
pub use powers::{is_available, is_locked};
pub use roll::{FlavorTier, RollResolver, RollResult};
pub use store::CharacterStore;
pub use zones::{resolve_zone, Zone, ZoneOverrides, ZoneTag};

/// Anything that can hand out die faces and candidate picks.
pub trait Roller {
    /// Uniform integer in `1..=faces`. Callers never pass zero.
    fn roll_die(&mut self, faces: u32) -> u32;
    /// Uniform index in `0..len`. Callers never pass zero.
    fn pick(&mut self, len: usize) -> usize;
}

/// Unbiased die roller.
///
/// `Dice::secure()` draws from the operating system's CSPRNG and drops to a
/// clock-seeded ChaCha stream if that source ever fails. `Dice::from_seed`
/// gives reproducible rolls for tests and simulations.
pub struct Dice {
    source: Option<Box<dyn RngCore + Send>>,
    rng: ChaCha8Rng,
}

impl Dice {
    pub fn secure() -> Self {
        Self::with_source(Box::new(OsRng))
    }

    /// Draw from `source` until it reports an error, then fall back.
    pub fn with_source(source: Box<dyn RngCore + Send>) -> Self {
        Self {
            source: Some(source),
            rng: ChaCha8Rng::seed_from_u64(clock_seed()),
        }
    }

    pub fn from_seed(seed: u64) -> Self {
        Self {
            source: None,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// False once the secure source has failed, or for seeded dice.
    pub fn is_secure(&self) -> bool {
        self.source.is_some()
    }

    /// Uniform integer in `min..=max`.
    pub fn uniform_inclusive(&mut self, min: u32, max: u32) -> Result<u32> {
        if max < min {
            return Err(EngineError::InvalidInput(format!(
                "invalid range for RNG: {}..={}",
                min, max
            )));
        }
        let range = u64::from(max - min) + 1;
        Ok(min + self.sample_below(range) as u32)
    }

    /// Rejection sampling over 32-bit draws: values past the last whole
    /// bucket of `range` are redrawn so `v % range` stays uniform.
    fn sample_below(&mut self, range: u64) -> u64 {
        const SPAN: u64 = 1 << 32;
        let range = range.clamp(1, SPAN);
        let max_unbiased = (SPAN / range) * range - 1;
        loop {
            let v = u64::from(self.next_u32());
            if v <= max_unbiased {
                return v % range;
            }
        }
    }

    fn next_u32(&mut self) -> u32 {
        if let Some(source) = self.source.as_mut() {
            let mut buf = [0u8; 4];
            match source.try_fill_bytes(&mut buf) {
                Ok(()) => return u32::from_le_bytes(buf),
                Err(err) => {
                    warn!(%err, "secure random source unavailable; using fallback generator");
                    self.source = None;
                    self.rng = ChaCha8Rng::seed_from_u64(clock_seed());
                }
            }
        }
        self.rng.next_u32()
    }
}

impl Roller for Dice {
    fn roll_die(&mut self, faces: u32) -> u32 {
        1 + self.sample_below(u64::from(faces.max(1))) as u32
    }

    fn pick(&mut self, len: usize) -> usize {
        self.sample_below(len.max(1) as u64) as usize
    }
}

fn clock_seed() -> u64 {
    chrono::Utc::now()
        .timestamp_nanos_opt()
        .unwrap_or_default() as u64
}

/// Die ratings a trait or dice-tray slot can carry.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawDie", into = "u32")]
pub enum DieSize {
    D4,
    #[default]
    D6,
    D8,
    D10,
    D12,
}

impl DieSize {
    pub const ALL: [DieSize; 5] = [
        DieSize::D4,
        DieSize::D6,
        DieSize::D8,
        DieSize::D10,
        DieSize::D12,
    ];

    pub fn faces(self) -> u32 {
        match self {
            DieSize::D4 => 4,
            DieSize::D6 => 6,
            DieSize::D8 => 8,
            DieSize::D10 => 10,
            DieSize::D12 => 12,
        }
    }

    pub fn from_faces(faces: u32) -> Option<Self> {
        DieSize::ALL.into_iter().find(|d| d.faces() == faces)
    }
}

impl std::fmt::Display for DieSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "d{}", self.faces())
    }
}

impl std::str::FromStr for DieSize {
    type Err = EngineError;

    /// Accepts `d8`, `D8` or a bare `8`.
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix('d')
            .or_else(|| trimmed.strip_prefix('D'))
            .unwrap_or(trimmed);
        digits
            .parse::<u32>()
            .ok()
            .and_then(DieSize::from_faces)
            .ok_or_else(|| EngineError::Validation(format!("unknown die '{}'", s)))
    }
}

impl From<DieSize> for u32 {
    fn from(d: DieSize) -> u32 {
        d.faces()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDie {
    Faces(u32),
    Label(String),
}

impl TryFrom<RawDie> for DieSize {
    type Error = EngineError;

    fn try_from(raw: RawDie) -> Result<Self> {
        match raw {
            RawDie::Faces(n) => DieSize::from_faces(n)
                .ok_or_else(|| EngineError::Validation(format!("unknown die d{}", n))),
            RawDie::Label(s) => s.parse(),
        }
    }
}

/// Millisecond-timestamp ids, bumped so a run of them stays unique and increasing.
#[derive(Debug, Clone, Default)]
pub struct IdClock {
    last: i64,
}

/// Observed ids at or past this are not timestamps and leave the clock alone.
const ID_CEILING: i64 = i64::MAX / 2;

impl IdClock {
    pub fn next_id(&mut self) -> String {
        let now = chrono::Utc::now().timestamp_millis();
        self.last = now.max(self.last.saturating_add(1));
        self.last.to_string()
    }

    /// Account for an id that already exists so later ids sort after it.
    pub fn observe(&mut self, id: &str) {
        match id.parse::<i64>() {
            Ok(n) if n < ID_CEILING => self.last = self.last.max(n),
            Ok(_) => warn!(id, "ignoring out-of-range id when ordering new ids"),
            Err(_) => {}
        }
    }
}
