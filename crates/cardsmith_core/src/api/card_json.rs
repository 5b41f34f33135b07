//! JSON API for card trait operations
//!
//! String-in/string-out endpoints for the host application. Failures are
//! reported inside the response envelope, never as panics.

use crate::card::{apply_traits_batch, apply_traits_to_data, CardRecord};
use crate::config::StudioConfig;
use crate::error::CardError;
use crate::traits::{
    normalize_base_traits, BaseTrait, DerivedTrait, StatEffect, TraitInput, TraitLocalizer,
    BASE_TRAITS, FALLBACK_LOCALE,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, warn};

/// API version for schema compatibility
pub const API_VERSION: &str = "v1";

const SERIALIZATION_FAILED: &str =
    r#"{"success":false,"error":{"code":"SERIALIZATION_FAILED","message":"Serialization failed"}}"#;

/// Standard API response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
    pub schema_version: String,
    pub timestamp: DateTime<Utc>,
}

/// Structured API error with codes and details
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
    pub details: Option<HashMap<String, Value>>,
}

impl ApiError {
    pub fn new(code: &str, message: &str) -> Self {
        Self { code: code.to_string(), message: message.to_string(), details: None }
    }

    pub fn with_details(code: &str, message: &str, details: HashMap<String, Value>) -> Self {
        Self { code: code.to_string(), message: message.to_string(), details: Some(details) }
    }

    pub fn from_card_error(error: &CardError) -> Self {
        let code = match error {
            CardError::Json(_) => "INVALID_JSON",
            CardError::UnsupportedLocale(_) => "UNSUPPORTED_LOCALE",
            CardError::Localization(_) => "LOCALIZATION_FAILED",
            CardError::InvalidProject(_) => "INVALID_PROJECT",
            CardError::InvalidConfig(_) => "INVALID_CONFIG",
            CardError::Io(_) => "IO_ERROR",
        };
        Self::new(code, &error.to_string())
    }
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            schema_version: API_VERSION.to_string(),
            timestamp: Utc::now(),
        }
    }

    pub fn error(error: ApiError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
            schema_version: API_VERSION.to_string(),
            timestamp: Utc::now(),
        }
    }
}

fn to_json<T: Serialize>(response: &ApiResponse<T>) -> String {
    serde_json::to_string(response).unwrap_or_else(|_| SERIALIZATION_FAILED.to_string())
}

fn error_json<T: Serialize>(error: ApiError) -> String {
    to_json(&ApiResponse::<T>::error(error))
}

fn parse_request<'a, R: Deserialize<'a>>(request_json: &'a str) -> Result<R, ApiError> {
    serde_json::from_str(request_json).map_err(|e| {
        ApiError::new("INVALID_JSON", &format!("Failed to parse request JSON: {}", e))
    })
}

fn as_card(value: Value, index: Option<usize>) -> Result<CardRecord, ApiError> {
    match value {
        Value::Object(map) => Ok(map),
        other => {
            let mut details = HashMap::new();
            details.insert("found".to_string(), Value::from(json_type(&other)));
            if let Some(i) = index {
                details.insert("index".to_string(), Value::from(i));
            }
            Err(ApiError::with_details("INVALID_CARD", "Card data must be a JSON object", details))
        }
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ========== Apply traits (single card) ==========

#[derive(Debug, Deserialize)]
struct ApplyTraitsRequest {
    #[serde(default)]
    card: Value,
}

/// Response data for `apply_traits_json`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyTraitsResponse {
    pub next_data: CardRecord,
    pub result: crate::traits::TraitEngineResult,
}

/// `{ "card": {...} }` → merged card record + engine result
pub fn apply_traits_json(request_json: &str) -> String {
    let request: ApplyTraitsRequest = match parse_request(request_json) {
        Ok(r) => r,
        Err(e) => return error_json::<ApplyTraitsResponse>(e),
    };

    let card = match as_card(request.card, None) {
        Ok(c) => c,
        Err(e) => return error_json::<ApplyTraitsResponse>(e),
    };

    let outcome = apply_traits_to_data(&card);
    to_json(&ApiResponse::success(ApplyTraitsResponse {
        next_data: outcome.next_data,
        result: outcome.result,
    }))
}

// ========== Apply traits (batch) ==========

#[derive(Debug, Deserialize)]
struct BatchApplyRequest {
    cards: Vec<Value>,
    parallel_threshold: Option<usize>,
}

/// Response data for `apply_traits_batch_json`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchApplyResponse {
    pub cards: Vec<CardRecord>,
    pub total_processed: usize,
}

/// `{ "cards": [...] }` → merged card records, input order kept
pub fn apply_traits_batch_json(request_json: &str) -> String {
    let request: BatchApplyRequest = match parse_request(request_json) {
        Ok(r) => r,
        Err(e) => return error_json::<BatchApplyResponse>(e),
    };

    let mut cards = Vec::with_capacity(request.cards.len());
    for (i, value) in request.cards.into_iter().enumerate() {
        match as_card(value, Some(i)) {
            Ok(c) => cards.push(c),
            Err(e) => return error_json::<BatchApplyResponse>(e),
        }
    }

    let threshold = request
        .parallel_threshold
        .unwrap_or_else(|| StudioConfig::default().parallel_threshold);
    debug!(cards = cards.len(), threshold, "batch trait request");

    let outcomes = apply_traits_batch(&cards, threshold);
    let total_processed = outcomes.len();
    to_json(&ApiResponse::success(BatchApplyResponse {
        cards: outcomes.into_iter().map(|o| o.next_data).collect(),
        total_processed,
    }))
}

// ========== Registry listing ==========

#[derive(Debug, Default, Deserialize)]
struct RegistryRequest {
    locale: Option<String>,
}

/// One registry row with localized labels
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraitRegistryEntry {
    pub id: BaseTrait,
    pub label: String,
    pub derived: DerivedTrait,
    pub derived_label: String,
    pub effect: StatEffect,
}

/// Response data for `trait_registry_json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraitRegistryResponse {
    pub locale: String,
    pub traits: Vec<TraitRegistryEntry>,
}

/// Registry rows in registry order
pub fn registry_entries(localizer: &TraitLocalizer) -> Vec<TraitRegistryEntry> {
    BASE_TRAITS
        .iter()
        .map(|t| TraitRegistryEntry {
            id: *t,
            label: localizer.label(*t),
            derived: t.derived(),
            derived_label: localizer.label(t.derived()),
            effect: t.effect(),
        })
        .collect()
}

/// `{ "locale": "ar" }` (or empty request) → every base trait with labels
pub fn trait_registry_json(request_json: &str) -> String {
    let request: RegistryRequest = if request_json.trim().is_empty() {
        RegistryRequest::default()
    } else {
        match parse_request(request_json) {
            Ok(r) => r,
            Err(e) => return error_json::<TraitRegistryResponse>(e),
        }
    };

    let locale = request.locale.unwrap_or_else(|| FALLBACK_LOCALE.to_string());
    let localizer = match TraitLocalizer::for_locale(&locale) {
        Ok(l) => l,
        Err(e) => {
            warn!(locale = %locale, error = %e, "registry request with unusable locale");
            return error_json::<TraitRegistryResponse>(ApiError::from_card_error(&e));
        }
    };

    to_json(&ApiResponse::success(TraitRegistryResponse {
        locale,
        traits: registry_entries(&localizer),
    }))
}

// ========== Token check ==========

#[derive(Debug, Deserialize)]
struct CheckTokensRequest {
    #[serde(default)]
    traits: Value,
}

/// Response data for `check_trait_tokens_json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenCheck {
    pub accepted: Vec<BaseTrait>,
    /// Non-blank tokens (trimmed, original case) that name no base trait
    pub unknown: Vec<String>,
}

/// Split trait input into accepted base traits and unknown tokens.
///
/// The engine drops unknown tokens silently; this is for editors that want
/// to warn about them before saving.
pub fn check_trait_tokens(input: &TraitInput) -> TokenCheck {
    let accepted = normalize_base_traits(input);
    let mut unknown: Vec<String> = Vec::new();
    for raw in input.tokens() {
        let token = raw.trim();
        if token.is_empty() || BaseTrait::lookup(&token.to_lowercase()).is_some() {
            continue;
        }
        if !unknown.iter().any(|u| u == token) {
            unknown.push(token.to_string());
        }
    }
    TokenCheck { accepted, unknown }
}

/// `{ "traits": <any> }` → accepted and unknown tokens
pub fn check_trait_tokens_json(request_json: &str) -> String {
    let request: CheckTokensRequest = match parse_request(request_json) {
        Ok(r) => r,
        Err(e) => return error_json::<TokenCheck>(e),
    };

    to_json(&ApiResponse::success(check_trait_tokens(&TraitInput::from(request.traits))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(response: &str) -> Value {
        serde_json::from_str(response).unwrap()
    }

    #[test]
    fn test_apply_traits_json() {
        let response = parse(&apply_traits_json(
            r#"{"card": {"baseTrait": "human", "attack": 4, "defense": 4, "name": "Scout"}}"#,
        ));
        assert_eq!(response["success"], json!(true));
        assert_eq!(response["schema_version"], json!("v1"));

        let data = &response["data"];
        assert_eq!(data["nextData"]["defense"], json!(5));
        assert_eq!(data["nextData"]["name"], json!("Scout"));
        assert_eq!(data["result"]["allTraits"], json!(["human", "tactical"]));
        assert_eq!(data["result"]["effect"], json!({"attack": 0, "defense": 1}));
    }

    #[test]
    fn test_apply_traits_json_errors() {
        let response = parse(&apply_traits_json("{not json"));
        assert_eq!(response["success"], json!(false));
        assert_eq!(response["error"]["code"], json!("INVALID_JSON"));

        let response = parse(&apply_traits_json(r#"{"card": [1, 2]}"#));
        assert_eq!(response["error"]["code"], json!("INVALID_CARD"));
        assert_eq!(response["error"]["details"]["found"], json!("array"));

        let response = parse(&apply_traits_json("{}"));
        assert_eq!(response["error"]["details"]["found"], json!("null"));
    }

    #[test]
    fn test_batch_json() {
        let response = parse(&apply_traits_batch_json(
            r#"{"cards": [
                {"baseTraits": ["swordsman"]},
                {"baseTraits": "animal", "baseAttack": 1},
                {"baseTraits": "human"}
            ], "parallel_threshold": 2}"#,
        ));
        assert_eq!(response["success"], json!(true));
        let data = &response["data"];
        assert_eq!(data["totalProcessed"], json!(3));
        assert_eq!(data["cards"][0]["attack"], json!(1));
        assert_eq!(data["cards"][0]["defense"], json!(0));
        assert_eq!(data["cards"][1]["attack"], json!(3));
        assert_eq!(data["cards"][2]["defense"], json!(1));
    }

    #[test]
    fn test_batch_json_reports_bad_index() {
        let response = parse(&apply_traits_batch_json(r#"{"cards": [{}, "oops"]}"#));
        assert_eq!(response["error"]["code"], json!("INVALID_CARD"));
        assert_eq!(response["error"]["details"]["index"], json!(1));
    }

    #[test]
    fn test_registry_json() {
        let response = parse(&trait_registry_json(""));
        assert_eq!(response["data"]["locale"], json!("en-US"));
        let traits = response["data"]["traits"].as_array().unwrap();
        assert_eq!(traits.len(), BASE_TRAITS.len());
        assert_eq!(traits[2]["id"], json!("swordsman"));
        assert_eq!(traits[2]["derived"], json!("swift"));
        assert_eq!(traits[2]["derivedLabel"], json!("Swift"));
        assert_eq!(traits[2]["effect"], json!({"attack": 1, "defense": -1}));

        let response = parse(&trait_registry_json(r#"{"locale": "ar"}"#));
        assert_eq!(response["data"]["traits"][0]["label"], json!("إنسان"));

        let response = parse(&trait_registry_json(r#"{"locale": "xx"}"#));
        assert_eq!(response["error"]["code"], json!("UNSUPPORTED_LOCALE"));
    }

    #[test]
    fn test_check_trait_tokens() {
        let check = check_trait_tokens(&"Human, elf |animal|| Elf|dwarf".into());
        assert_eq!(check.accepted, vec![BaseTrait::Human, BaseTrait::Animal]);
        assert_eq!(check.unknown, vec!["elf", "Elf", "dwarf"]);

        let response = parse(&check_trait_tokens_json(r#"{"traits": ["swordsman", "ninja"]}"#));
        assert_eq!(response["data"]["accepted"], json!(["swordsman"]));
        assert_eq!(response["data"]["unknown"], json!(["ninja"]));

        let response = parse(&check_trait_tokens_json("{}"));
        assert_eq!(response["data"]["accepted"], json!([]));
    }
}
