//! Trait system: registry, derivation engine and label localization

pub mod engine;
pub mod localization;
pub mod registry;

pub use engine::*;
pub use localization::{TraitLocalizer, FALLBACK_LOCALE, SUPPORTED_LOCALES};
pub use registry::*;
