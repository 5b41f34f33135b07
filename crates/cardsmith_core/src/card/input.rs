//! Card record → validated engine input
//!
//! Card data comes from spreadsheet-like sources and saved projects written
//! under several historical conventions, so every field has fallbacks.

use crate::traits::{normalize_base_traits, TraitEngineParams, TraitInput};
use serde_json::{Map, Value};

/// Loosely-typed card data record
pub type CardRecord = Map<String, Value>;

/// Trait fields in priority order (first naming a known base trait wins)
pub const TRAIT_FIELDS: &[&str] = &["baseTraits", "traitsBase", "baseTrait"];

/// Attack fields in priority order (first present wins)
pub const ATTACK_FIELDS: &[&str] = &["baseAttack", "attack"];

/// Defense fields in priority order (first present wins)
pub const DEFENSE_FIELDS: &[&str] = &["baseDefense", "defense"];

/// Engine input extracted from a card record
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CardTraitInput {
    pub traits: TraitInput,
    pub base_attack: f64,
    pub base_defense: f64,
}

impl CardTraitInput {
    pub fn from_record(data: &CardRecord) -> Self {
        // A field naming no known trait does not shadow the fields after it
        let traits = TRAIT_FIELDS
            .iter()
            .filter_map(|field| data.get(*field))
            .map(TraitInput::from)
            .find(|input| !normalize_base_traits(input).is_empty())
            .unwrap_or_default();

        Self {
            traits,
            base_attack: read_stat(data, ATTACK_FIELDS),
            base_defense: read_stat(data, DEFENSE_FIELDS),
        }
    }

    pub fn into_params(self) -> TraitEngineParams {
        TraitEngineParams {
            base_traits: self.traits,
            base_attack: self.base_attack,
            base_defense: self.base_defense,
        }
    }
}

fn read_stat(data: &CardRecord, fields: &[&str]) -> f64 {
    fields
        .iter()
        .filter_map(|field| data.get(*field))
        .find(|value| !value.is_null())
        .map(coerce_number)
        .unwrap_or(0.0)
}

/// Lenient numeric coercion; anything unusable becomes 0
pub fn coerce_number(value: &Value) -> f64 {
    let n = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                0.0
            } else {
                s.parse::<f64>().unwrap_or(0.0)
            }
        }
        Value::Bool(true) => 1.0,
        Value::Bool(false) | Value::Null | Value::Array(_) | Value::Object(_) => 0.0,
    };

    if n.is_finite() {
        n
    } else {
        0.0
    }
}
