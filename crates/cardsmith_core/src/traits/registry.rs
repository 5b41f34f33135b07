//! Trait Registry
//!
//! Closed vocabulary of base/derived traits and the relation table that
//! links them. Everything here is static data.
//!
//! Each base trait provides:
//! - Derived: exactly one secondary trait
//! - Effect: additive attack/defense modifier

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use std::str::FromStr;

// ============================================================================
// Base Traits
// ============================================================================

/// Author-assigned card characteristic (directly assignable)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(test, derive(strum_macros::EnumIter))]
#[serde(rename_all = "lowercase")]
pub enum BaseTrait {
    Human,     // → tactical
    Animal,    // → ferocious
    Swordsman, // → swift
}

/// All base traits in registry order
pub const BASE_TRAITS: &[BaseTrait] = &[BaseTrait::Human, BaseTrait::Animal, BaseTrait::Swordsman];

static BASE_TRAIT_INDEX: Lazy<HashMap<&'static str, BaseTrait>> =
    Lazy::new(|| BASE_TRAITS.iter().map(|t| (t.id(), *t)).collect());

impl BaseTrait {
    /// Canonical lowercase identifier
    pub fn id(&self) -> &'static str {
        match self {
            BaseTrait::Human => "human",
            BaseTrait::Animal => "animal",
            BaseTrait::Swordsman => "swordsman",
        }
    }

    /// Exact lookup by canonical id (already trimmed and lowercased)
    pub fn lookup(id: &str) -> Option<BaseTrait> {
        BASE_TRAIT_INDEX.get(id).copied()
    }

    /// Relation entry for this trait
    pub fn relation(&self) -> &'static TraitRelation {
        relation_for(*self)
    }

    pub fn derived(&self) -> DerivedTrait {
        self.relation().derived
    }

    pub fn effect(&self) -> StatEffect {
        self.relation().effect
    }
}

impl fmt::Display for BaseTrait {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for BaseTrait {
    type Err = UnknownTrait;

    /// Lenient parse: trims and ignores case
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim().to_lowercase();
        BaseTrait::lookup(&token).ok_or(UnknownTrait(token))
    }
}

/// Token that is not a registered base trait
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTrait(pub String);

impl fmt::Display for UnknownTrait {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown base trait: '{}'", self.0)
    }
}

impl std::error::Error for UnknownTrait {}

// ============================================================================
// Derived Traits
// ============================================================================

/// Secondary trait, only ever produced by derivation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(test, derive(strum_macros::EnumIter))]
#[serde(rename_all = "lowercase")]
pub enum DerivedTrait {
    Tactical,
    Ferocious,
    Swift,
}

impl DerivedTrait {
    pub fn id(&self) -> &'static str {
        match self {
            DerivedTrait::Tactical => "tactical",
            DerivedTrait::Ferocious => "ferocious",
            DerivedTrait::Swift => "swift",
        }
    }

    /// Base trait whose relation produces this trait
    pub fn source(&self) -> Option<BaseTrait> {
        TRAIT_RELATIONS.iter().find(|r| r.derived == *self).map(|r| r.base)
    }
}

impl fmt::Display for DerivedTrait {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

// ============================================================================
// Trait Label (base or derived, as displayed)
// ============================================================================

/// Either kind of trait, serialized as its bare id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TraitLabel {
    Base(BaseTrait),
    Derived(DerivedTrait),
}

impl TraitLabel {
    pub fn id(&self) -> &'static str {
        match self {
            TraitLabel::Base(t) => t.id(),
            TraitLabel::Derived(t) => t.id(),
        }
    }

    pub fn is_derived(&self) -> bool {
        matches!(self, TraitLabel::Derived(_))
    }
}

impl From<BaseTrait> for TraitLabel {
    fn from(t: BaseTrait) -> Self {
        TraitLabel::Base(t)
    }
}

impl From<DerivedTrait> for TraitLabel {
    fn from(t: DerivedTrait) -> Self {
        TraitLabel::Derived(t)
    }
}

impl fmt::Display for TraitLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

// ============================================================================
// Stat Effect
// ============================================================================

/// Additive attack/defense modifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct StatEffect {
    pub attack: i32,
    pub defense: i32,
}

impl StatEffect {
    pub const ZERO: StatEffect = StatEffect { attack: 0, defense: 0 };

    pub const fn new(attack: i32, defense: i32) -> Self {
        Self { attack, defense }
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

impl Add for StatEffect {
    type Output = StatEffect;

    fn add(self, other: StatEffect) -> StatEffect {
        StatEffect {
            attack: self.attack.saturating_add(other.attack),
            defense: self.defense.saturating_add(other.defense),
        }
    }
}

impl AddAssign for StatEffect {
    fn add_assign(&mut self, other: StatEffect) {
        *self = *self + other;
    }
}

impl Sum for StatEffect {
    fn sum<I: Iterator<Item = StatEffect>>(iter: I) -> StatEffect {
        iter.fold(StatEffect::ZERO, |acc, e| acc + e)
    }
}

// ============================================================================
// Relation Table
// ============================================================================

/// Base trait → (derived trait, effect)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TraitRelation {
    pub base: BaseTrait,
    pub derived: DerivedTrait,
    pub effect: StatEffect,
}

/// Reference relation table, one entry per base trait in `BASE_TRAITS` order.
///
/// Derived traits are unique across the table. Nothing downstream enforces
/// that; derivation deduplicates, so a many-to-one table only yields fewer
/// derived traits.
pub const TRAIT_RELATIONS: &[TraitRelation] = &[
    TraitRelation {
        base: BaseTrait::Human,
        derived: DerivedTrait::Tactical,
        effect: StatEffect::new(0, 1),
    },
    TraitRelation {
        base: BaseTrait::Animal,
        derived: DerivedTrait::Ferocious,
        effect: StatEffect::new(2, 0),
    },
    TraitRelation {
        base: BaseTrait::Swordsman,
        derived: DerivedTrait::Swift,
        effect: StatEffect::new(1, -1),
    },
];

/// Total lookup (exhaustive over `BaseTrait`)
pub fn relation_for(base: BaseTrait) -> &'static TraitRelation {
    match base {
        BaseTrait::Human => &TRAIT_RELATIONS[0],
        BaseTrait::Animal => &TRAIT_RELATIONS[1],
        BaseTrait::Swordsman => &TRAIT_RELATIONS[2],
    }
}

// ============================================================================
// Tests
// ============================================================================
