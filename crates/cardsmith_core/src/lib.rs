//! # cardsmith_core - Card Trait/Stat Derivation Engine
//!
//! Normalizes a card's base traits, derives secondary traits from a fixed
//! relation table and computes the final attack/defense shown on the card.
//!
//! ## Features
//! - Total, pure engine (unknown input degrades, never fails)
//! - Adapter for loosely-typed card records with legacy field names
//! - JSON API and project-file batch recompute for host applications
//! - EN/AR trait labels

pub mod api;
pub mod card;
pub mod config;
pub mod error;
pub mod project;
pub mod traits;

// Re-export engine entry points
pub use traits::{
    apply_trait_engine, compute_trait_effect, derive_traits, normalize_base_traits, BaseTrait,
    CardStats, DerivedTrait, StatEffect, TraitEngineParams, TraitEngineResult, TraitInput,
    TraitLabel, TraitRelation, BASE_TRAITS, TRAIT_RELATIONS,
};

// Re-export card adapter
pub use card::{
    apply_traits_batch, apply_traits_to_data, CardRecord, CardTraitInput, CardTraitsOutcome,
};

pub use config::StudioConfig;
pub use error::{CardError, Result};
pub use project::{CardProject, RecomputeSummary};
