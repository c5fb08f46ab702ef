//! Translation loader and i18n management
//!
//! Loads per-language JSON translation files and resolves nested keys with
//! `{param}` interpolation. Kazakh is the default language; unsupported or
//! missing languages fall back to it.

use std::collections::HashMap;
use std::path::Path;

use serde_json::{Map, Value};
use tokio::fs;
use tracing::{info, warn};

use crate::config::I18nConfig;
use crate::utils::errors::{GatherBuddyError, Result};

/// Main internationalization manager
#[derive(Debug, Clone)]
pub struct I18n {
    /// Loaded translations by language code
    translations: HashMap<String, Map<String, Value>>,
    default_language: String,
    supported_languages: Vec<String>,
}

/// Translation parameters for message formatting
pub type TranslationParams = HashMap<String, String>;

impl I18n {
    /// Create a new I18n instance
    pub fn new(config: &I18nConfig) -> Self {
        Self {
            translations: HashMap::new(),
            default_language: config.default_language.clone(),
            supported_languages: config.supported_languages.clone(),
        }
    }

    /// Load all translation files from the translations directory
    pub async fn load_translations(&mut self) -> Result<()> {
        let translations_dir = Path::new("translations");

        let supported_languages = self.supported_languages.clone();
        for lang_code in &supported_languages {
            let file_path = translations_dir.join(format!("{}.json", lang_code));

            match self.load_language_file(&file_path, lang_code).await {
                Ok(_) => info!("Loaded translations for language: {}", lang_code),
                Err(e) => {
                    warn!("Failed to load translations for {}: {}", lang_code, e);
                    if lang_code == &self.default_language {
                        return Err(GatherBuddyError::Config(format!(
                            "failed to load default language translations: {e}"
                        )));
                    }
                }
            }
        }

        Ok(())
    }

    /// Load a single language file
    async fn load_language_file(&mut self, file_path: &Path, lang_code: &str) -> Result<()> {
        let content = fs::read_to_string(file_path).await?;
        let translations: Value = serde_json::from_str(&content)?;

        if let Value::Object(map) = translations {
            self.translations.insert(lang_code.to_string(), map);
            Ok(())
        } else {
            Err(GatherBuddyError::Config(format!(
                "invalid translation file format for {lang_code}"
            )))
        }
    }

    /// Get a translated message
    pub fn t(&self, key: &str, lang: &str, params: Option<&TranslationParams>) -> String {
        let effective_lang = self.get_effective_language(lang);

        let value = self
            .get_translation_value(key, &effective_lang)
            .or_else(|| {
                if effective_lang != self.default_language {
                    self.get_translation_value(key, &self.default_language)
                } else {
                    None
                }
            });

        match value {
            Some(Value::String(text)) => self.format_message(&text, params),
            Some(other) => self.format_message(&other.to_string(), params),
            None => {
                warn!("Translation key '{}' not found", key);
                key.to_string()
            }
        }
    }

    /// Check if a language is supported
    pub fn is_language_supported(&self, lang: &str) -> bool {
        self.supported_languages.contains(&lang.to_string())
    }

    /// Pick a supported language from an `Accept-Language` header value
    pub fn detect_language(&self, accept_language: Option<&str>) -> String {
        if let Some(header) = accept_language {
            for entry in header.split(',') {
                let lang = entry.split(';').next().unwrap_or("").trim();
                let code = lang.split('-').next().unwrap_or(lang);
                if self.is_language_supported(code) {
                    return code.to_string();
                }
            }
        }

        self.default_language.clone()
    }

    /// Get default language
    pub fn default_language(&self) -> &str {
        &self.default_language
    }

    /// Get the effective language (fallback to default if not supported)
    fn get_effective_language(&self, lang: &str) -> String {
        if self.is_language_supported(lang) && self.translations.contains_key(lang) {
            lang.to_string()
        } else {
            self.default_language.clone()
        }
    }

    /// Get translation value from nested JSON structure
    fn get_translation_value(&self, key: &str, lang: &str) -> Option<Value> {
        let translations = self.translations.get(lang)?;

        // Support nested keys like "errors.capacity_full"
        let mut keys = key.split('.');
        let mut current = translations.get(keys.next()?)?.clone();
        for k in keys {
            current = current.get(k)?.clone();
        }

        Some(current)
    }

    /// Format message with parameters
    fn format_message(&self, template: &str, params: Option<&TranslationParams>) -> String {
        let Some(params) = params else {
            return template.to_string();
        };

        let mut result = template.to_string();
        for (key, value) in params {
            let placeholder = format!("{{{}}}", key);
            result = result.replace(&placeholder, value);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_i18n() -> I18n {
        let config = I18nConfig {
            default_language: "kk".to_string(),
            supported_languages: vec!["kk".to_string(), "en".to_string()],
        };
        let mut i18n = I18n::new(&config);

        let kk: Value = serde_json::json!({
            "errors": {
                "capacity_full": "Кешіріңіз, іс-шараға барлық орындар толды",
                "capacity_partial": "Кешіріңіз, тек {spots_left} орын қалды"
            }
        });
        let en: Value = serde_json::json!({
            "errors": {
                "capacity_full": "Sorry, this event is full"
            }
        });
        if let Value::Object(map) = kk {
            i18n.translations.insert("kk".to_string(), map);
        }
        if let Value::Object(map) = en {
            i18n.translations.insert("en".to_string(), map);
        }
        i18n
    }

    #[test]
    fn test_nested_key_lookup() {
        let i18n = create_test_i18n();
        assert_eq!(
            i18n.t("errors.capacity_full", "en", None),
            "Sorry, this event is full"
        );
    }

    #[test]
    fn test_parameter_interpolation() {
        let i18n = create_test_i18n();
        let mut params = HashMap::new();
        params.insert("spots_left".to_string(), "2".to_string());
        assert_eq!(
            i18n.t("errors.capacity_partial", "kk", Some(&params)),
            "Кешіріңіз, тек 2 орын қалды"
        );
    }

    #[test]
    fn test_missing_key_falls_back_to_default_language() {
        let i18n = create_test_i18n();
        // "capacity_partial" only exists in Kazakh
        assert_eq!(
            i18n.t("errors.capacity_partial", "en", None),
            "Кешіріңіз, тек {spots_left} орын қалды"
        );
    }

    #[test]
    fn test_unknown_key_returns_key() {
        let i18n = create_test_i18n();
        assert_eq!(i18n.t("errors.nope", "kk", None), "errors.nope");
    }

    #[test]
    fn test_language_detection_from_header() {
        let i18n = create_test_i18n();
        assert_eq!(i18n.detect_language(Some("en-US,en;q=0.9")), "en");
        assert_eq!(i18n.detect_language(Some("fr-FR,kk;q=0.5")), "kk");
        assert_eq!(i18n.detect_language(Some("de")), "kk");
        assert_eq!(i18n.detect_language(None), "kk");
    }
}
