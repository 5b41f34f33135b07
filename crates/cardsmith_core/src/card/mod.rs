//! Card data adapter

pub mod input;
pub mod logic;

pub use input::{coerce_number, CardRecord, CardTraitInput};
pub use logic::{apply_traits_batch, apply_traits_to_data, CardTraitsOutcome};
