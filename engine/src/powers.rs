use serde::{Deserialize, Serialize};

use crate::zones::{Zone, ZoneTag};
use crate::DieSize;

/// Whether an ability tagged `tag` can be used while the hero is in `zone`.
///
/// Access is cumulative: green unlocks green, yellow adds yellow, red adds
/// red, and out unlocks nothing.
pub fn is_available(zone: Zone, tag: ZoneTag) -> bool {
    match zone {
        Zone::Out => false,
        active => tag.zone() <= active,
    }
}

/// Greyed-out framing of [`is_available`].
pub fn is_locked(zone: Zone, tag: ZoneTag) -> bool {
    !is_available(zone, tag)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Power {
    pub id: String,
    pub name: String,
    #[serde(alias = "dieRating")]
    pub die: DieSize,
    #[serde(alias = "zoneTag", default)]
    pub zone: ZoneTag,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quality {
    pub id: String,
    pub name: String,
    pub die: DieSize,
}

/// Form values for adding or editing a power; committed explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PowerDraft {
    pub name: String,
    pub die: DieSize,
    pub zone: ZoneTag,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionType {
    #[default]
    Action,
    Reaction,
    Inherent,
}

impl InteractionType {
    pub fn badge(self) -> &'static str {
        match self {
            InteractionType::Action => "A",
            InteractionType::Reaction => "R",
            InteractionType::Inherent => "I",
        }
    }
}

/// An ability card. It may point at a power or quality by id, or at nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ability {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub trait_id: Option<String>,
    #[serde(default)]
    pub interaction_type: InteractionType,
    #[serde(default)]
    pub zone: ZoneTag,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub actions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AbilityDraft {
    pub name: String,
    pub trait_id: Option<String>,
    pub interaction_type: InteractionType,
    pub zone: ZoneTag,
    pub text: String,
    pub actions: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkedTrait<'a> {
    Power(&'a Power),
    Quality(&'a Quality),
}

impl LinkedTrait<'_> {
    pub fn name(&self) -> &str {
        match self {
            LinkedTrait::Power(p) => &p.name,
            LinkedTrait::Quality(q) => &q.name,
        }
    }

    pub fn die(&self) -> DieSize {
        match self {
            LinkedTrait::Power(p) => p.die,
            LinkedTrait::Quality(q) => q.die,
        }
    }
}

/// Powers are searched before qualities.
pub fn linked_trait<'a>(
    ability: &Ability,
    powers: &'a [Power],
    qualities: &'a [Quality],
) -> Option<LinkedTrait<'a>> {
    let id = ability.trait_id.as_deref()?;
    powers
        .iter()
        .find(|p| p.id == id)
        .map(LinkedTrait::Power)
        .or_else(|| qualities.iter().find(|q| q.id == id).map(LinkedTrait::Quality))
}

pub fn trait_label(ability: &Ability, powers: &[Power], qualities: &[Quality]) -> String {
    match linked_trait(ability, powers, qualities) {
        Some(t) => format!("{} ({})", t.name(), t.die()),
        None => "No Trait Linked".to_string(),
    }
}
