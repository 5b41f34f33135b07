pub mod card_json;

pub use card_json::{
    apply_traits_batch_json, apply_traits_json, check_trait_tokens, check_trait_tokens_json,
    registry_entries, trait_registry_json, ApiError, ApiResponse, TokenCheck, TraitRegistryEntry,
    API_VERSION,
};
