//! Translation lookup
//!
//! Settings text is resolved lazily through a [`Translator`], under keys
//! derived from the key prefix, the mod namespace and the option name:
//!
//! ```text
//! Config.{namespace}.{name}.Name
//! Config.{namespace}.{name}.Description
//! Message.{namespace}.{key}
//! ```

use crate::error::{BridgeError, Result};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Host translation service
pub trait Translator: Send + Sync {
    /// Translate `key`, substituting `{{token}}` placeholders; `None` if the
    /// key has no translation
    fn translate(&self, key: &str, tokens: &[(&str, &str)]) -> Option<String>;
}

/// In-memory translations
#[derive(Debug, Clone, Default)]
pub struct StaticTranslations {
    entries: HashMap<String, String>,
}

impl StaticTranslations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a flat JSON object of key to text
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        Ok(Self {
            entries: serde_json::from_str(json)?,
        })
    }

    /// Add or replace a translation
    pub fn with(mut self, key: impl Into<String>, text: impl Into<String>) -> Self {
        self.entries.insert(key.into(), text.into());
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Translator for StaticTranslations {
    fn translate(&self, key: &str, tokens: &[(&str, &str)]) -> Option<String> {
        let mut text = self.entries.get(key)?.clone();
        for (name, value) in tokens {
            text = text.replace(&format!("{{{{{}}}}}", name), value);
        }
        Some(text)
    }
}

/// Namespaced view over the attached translator
#[derive(Clone, Default)]
pub struct Translations {
    translator: Option<Arc<dyn Translator>>,
    prefix: String,
    namespace: String,
}

impl Translations {
    /// Translations for `namespace`, with option keys under `prefix`
    pub fn new(
        translator: Option<Arc<dyn Translator>>,
        prefix: impl Into<String>,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            translator,
            prefix: prefix.into(),
            namespace: namespace.into(),
        }
    }

    /// The mod namespace
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Translate a full key
    pub fn get_by_key(&self, key: &str, tokens: &[(&str, &str)]) -> Result<Option<String>> {
        let translator = self
            .translator
            .as_ref()
            .ok_or(BridgeError::TranslationUnavailable)?;
        Ok(translator.translate(key, tokens))
    }

    /// Translate `Message.{namespace}.{key}`
    pub fn message(&self, key: &str, tokens: &[(&str, &str)]) -> Result<Option<String>> {
        self.get_by_key(&format!("Message.{}.{}", self.namespace, key), tokens)
    }

    /// Key for a piece of option text, e.g. `Config.Mod.Volume.Name`
    pub fn option_key(&self, name: &str, part: &str) -> String {
        format!("{}.{}.{}.{}", self.prefix, self.namespace, name, part)
    }

    /// Option text, or `fallback` when untranslated
    pub fn option_text(&self, name: &str, part: &str, fallback: &str) -> String {
        self.get_by_key(&self.option_key(name, part), &[])
            .ok()
            .flatten()
            .unwrap_or_else(|| fallback.to_string())
    }

    /// A provider that resolves option text on every call, so language
    /// changes apply without re-registering
    pub(crate) fn provider(
        &self,
        name: &str,
        part: &'static str,
        fallback: &str,
    ) -> Arc<dyn Fn() -> String + Send + Sync> {
        let translations = self.clone();
        let name = name.to_string();
        let fallback = fallback.to_string();
        Arc::new(move || translations.option_text(&name, part, &fallback))
    }
}

impl fmt::Debug for Translations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Translations")
            .field("attached", &self.translator.is_some())
            .field("prefix", &self.prefix)
            .field("namespace", &self.namespace)
            .finish()
    }
}
