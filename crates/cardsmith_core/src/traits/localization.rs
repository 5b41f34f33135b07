//! Trait Label Localization
//!
//! Fluent (FTL) based display names for base/derived traits (EN/AR).
//! Message ids are `trait-<id>`.

use crate::error::{CardError, Result};
use crate::traits::registry::TraitLabel;
use fluent::{FluentBundle, FluentResource};
use fluent_langneg::{negotiate_languages, NegotiationStrategy};
use std::collections::HashMap;
use unic_langid::LanguageIdentifier;

/// Supported locales
pub const SUPPORTED_LOCALES: &[&str] = &["en-US", "ar"];

pub const FALLBACK_LOCALE: &str = "en-US";

const EMBEDDED_FTL: &[(&str, &str)] = &[
    ("en-US", include_str!("../../locales/en-US.ftl")),
    ("ar", include_str!("../../locales/ar.ftl")),
];

pub fn is_supported_locale(locale: &str) -> bool {
    SUPPORTED_LOCALES.contains(&locale)
}

/// Trait label localizer
pub struct TraitLocalizer {
    bundles: HashMap<String, FluentBundle<FluentResource>>,
    current_locale: String,
}

impl TraitLocalizer {
    /// Empty localizer (no locales loaded)
    pub fn empty() -> Self {
        Self { bundles: HashMap::new(), current_locale: FALLBACK_LOCALE.to_string() }
    }

    /// Localizer with every embedded locale loaded
    pub fn with_embedded() -> Result<Self> {
        let mut localizer = Self::empty();
        for (locale, content) in EMBEDDED_FTL {
            localizer.load_locale(locale, content)?;
        }
        Ok(localizer)
    }

    /// Embedded localizer switched to `locale`
    pub fn for_locale(locale: &str) -> Result<Self> {
        let mut localizer = Self::with_embedded()?;
        localizer.set_locale(locale)?;
        Ok(localizer)
    }

    pub fn load_locale(&mut self, locale: &str, ftl_content: &str) -> Result<()> {
        let resource = FluentResource::try_new(ftl_content.to_string()).map_err(|(_, errors)| {
            CardError::Localization(format!("Failed to parse FTL for {}: {:?}", locale, errors))
        })?;

        let lang_id: LanguageIdentifier = locale
            .parse()
            .map_err(|_| CardError::Localization(format!("Invalid locale: {}", locale)))?;

        let mut bundle = FluentBundle::new(vec![lang_id]);
        bundle.set_use_isolating(false);
        bundle.add_resource(resource).map_err(|errors| {
            CardError::Localization(format!("Failed to add resource for {}: {:?}", locale, errors))
        })?;

        self.bundles.insert(locale.to_string(), bundle);
        Ok(())
    }

    pub fn current_locale(&self) -> &str {
        &self.current_locale
    }

    pub fn set_locale(&mut self, locale: &str) -> Result<()> {
        if !self.bundles.contains_key(locale) {
            return Err(CardError::UnsupportedLocale(locale.to_string()));
        }
        self.current_locale = locale.to_string();
        Ok(())
    }

    /// Best loaded locale for the requested list, falling back to `en-US`
    pub fn negotiate_locale(&self, requested: &[&str]) -> String {
        let available: Vec<LanguageIdentifier> =
            self.bundles.keys().filter_map(|k| k.parse().ok()).collect();
        let requested: Vec<LanguageIdentifier> =
            requested.iter().filter_map(|l| l.parse().ok()).collect();
        let default: LanguageIdentifier = match FALLBACK_LOCALE.parse() {
            Ok(id) => id,
            Err(_) => return FALLBACK_LOCALE.to_string(),
        };

        let negotiated = negotiate_languages(
            &requested,
            &available,
            Some(&default),
            NegotiationStrategy::Filtering,
        );

        negotiated.first().map(|l| l.to_string()).unwrap_or_else(|| FALLBACK_LOCALE.to_string())
    }

    /// Display name of a trait in the current locale
    pub fn label(&self, trait_: impl Into<TraitLabel>) -> String {
        let key = format!("trait-{}", trait_.into().id());
        self.format(&key)
    }

    /// Current locale, then fallback, then `[key]`
    pub fn format(&self, key: &str) -> String {
        let locales = [self.current_locale.as_str(), FALLBACK_LOCALE];
        for locale in locales {
            if let Some(text) = self.format_in(locale, key) {
                return text;
            }
        }
        format!("[{}]", key)
    }

    fn format_in(&self, locale: &str, key: &str) -> Option<String> {
        let bundle = self.bundles.get(locale)?;
        let pattern = bundle.get_message(key)?.value()?;
        let mut errors = vec![];
        Some(bundle.format_pattern(pattern, None, &mut errors).to_string())
    }
}
