//! Trait Engine
//!
//! Pure functions from raw trait input + raw base stats to normalized
//! traits and final card stats. Every function here is total: malformed
//! input degrades to empty traits / zero effect, never to an error.

use crate::traits::registry::{BaseTrait, DerivedTrait, StatEffect, TraitLabel};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use tracing::trace;

/// Delimiters accepted inside a single trait string
pub const TRAIT_DELIMITERS: [char; 2] = [',', '|'];

// ============================================================================
// Input
// ============================================================================

/// Unstructured trait input as it arrives from card data
#[derive(Debug, Clone, PartialEq, Default)]
pub enum TraitInput {
    #[default]
    Absent,
    /// One token per element, elements are not split
    List(Vec<Value>),
    /// Delimited string, e.g. `"human,animal|swordsman"`
    Scalar(String),
}

impl TraitInput {
    pub fn is_absent(&self) -> bool {
        matches!(self, TraitInput::Absent)
    }

    /// Flat list of raw candidate tokens (before trim/lowercase)
    pub fn tokens(&self) -> Vec<String> {
        match self {
            TraitInput::Absent => Vec::new(),
            TraitInput::Scalar(s) => s.split(TRAIT_DELIMITERS).map(str::to_string).collect(),
            TraitInput::List(items) => items.iter().filter_map(coerce_token).collect(),
        }
    }
}

/// Scalars coerce to their display string; null and containers yield no token.
/// Unlike JS string coercion, a nested `["human"]` is dropped, not read as `"human"`.
fn coerce_token(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

impl From<&Value> for TraitInput {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null | Value::Object(_) => TraitInput::Absent,
            Value::Array(items) => TraitInput::List(items.clone()),
            Value::String(s) => TraitInput::Scalar(s.clone()),
            Value::Number(n) => TraitInput::Scalar(n.to_string()),
            Value::Bool(b) => TraitInput::Scalar(b.to_string()),
        }
    }
}

impl From<Value> for TraitInput {
    fn from(value: Value) -> Self {
        match value {
            Value::Array(items) => TraitInput::List(items),
            Value::String(s) => TraitInput::Scalar(s),
            other => TraitInput::from(&other),
        }
    }
}

impl From<&str> for TraitInput {
    fn from(s: &str) -> Self {
        TraitInput::Scalar(s.to_string())
    }
}

impl From<String> for TraitInput {
    fn from(s: String) -> Self {
        TraitInput::Scalar(s)
    }
}

impl From<&[&str]> for TraitInput {
    fn from(items: &[&str]) -> Self {
        TraitInput::List(items.iter().map(|s| Value::from(*s)).collect())
    }
}

impl<const N: usize> From<[&str; N]> for TraitInput {
    fn from(items: [&str; N]) -> Self {
        TraitInput::from(&items[..])
    }
}

impl From<Vec<String>> for TraitInput {
    fn from(items: Vec<String>) -> Self {
        TraitInput::List(items.into_iter().map(Value::String).collect())
    }
}

impl From<&[BaseTrait]> for TraitInput {
    fn from(traits: &[BaseTrait]) -> Self {
        TraitInput::List(traits.iter().map(|t| Value::from(t.id())).collect())
    }
}

impl<T: Into<TraitInput>> From<Option<T>> for TraitInput {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}

// ============================================================================
// Engine operations
// ============================================================================

/// Canonical base traits: trimmed, lowercased, registry members only,
/// first occurrence kept.
pub fn normalize_base_traits(input: &TraitInput) -> Vec<BaseTrait> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    for raw in input.tokens() {
        let token = raw.trim().to_lowercase();
        match BaseTrait::lookup(&token) {
            Some(t) => {
                if seen.insert(t) {
                    out.push(t);
                }
            }
            None => trace!(token = %token, "dropping unknown trait token"),
        }
    }

    out
}

/// Derived traits for the given base traits, deduplicated
pub fn derive_traits(base_traits: &[BaseTrait]) -> Vec<DerivedTrait> {
    let mut seen = HashSet::new();
    base_traits.iter().map(|t| t.derived()).filter(|d| seen.insert(*d)).collect()
}

/// Component-wise sum of every trait's effect
pub fn compute_trait_effect(base_traits: &[BaseTrait]) -> StatEffect {
    base_traits.iter().map(|t| t.effect()).sum()
}

/// Round half away from zero and clamp at 0. NaN counts as 0.
pub fn clamp_stat(value: f64) -> u32 {
    if value.is_nan() {
        return 0;
    }
    // float → int casts saturate
    value.round().max(0.0) as u32
}

// ============================================================================
// Engine entry point
// ============================================================================

/// Raw engine input
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TraitEngineParams {
    pub base_traits: TraitInput,
    pub base_attack: f64,
    pub base_defense: f64,
}

impl TraitEngineParams {
    pub fn new(base_traits: impl Into<TraitInput>, base_attack: f64, base_defense: f64) -> Self {
        Self { base_traits: base_traits.into(), base_attack, base_defense }
    }
}

/// Final non-negative card stats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CardStats {
    pub attack: u32,
    pub defense: u32,
}

/// Full engine output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraitEngineResult {
    pub base_traits: Vec<BaseTrait>,
    pub derived_traits: Vec<DerivedTrait>,
    /// `base_traits` followed by `derived_traits`
    pub all_traits: Vec<TraitLabel>,
    pub effect: StatEffect,
    pub attack: u32,
    pub defense: u32,
}

impl TraitEngineResult {
    pub fn stats(&self) -> CardStats {
        CardStats { attack: self.attack, defense: self.defense }
    }
}

/// normalize → derive → effect → clamp
pub fn apply_trait_engine(params: &TraitEngineParams) -> TraitEngineResult {
    let base_traits = normalize_base_traits(&params.base_traits);
    let derived_traits = derive_traits(&base_traits);
    let effect = compute_trait_effect(&base_traits);

    let attack = clamp_stat(params.base_attack + f64::from(effect.attack));
    let defense = clamp_stat(params.base_defense + f64::from(effect.defense));

    let all_traits = base_traits
        .iter()
        .map(|t| TraitLabel::from(*t))
        .chain(derived_traits.iter().map(|t| TraitLabel::from(*t)))
        .collect();

    TraitEngineResult { base_traits, derived_traits, all_traits, effect, attack, defense }
}

// ============================================================================
// Tests
// ============================================================================
