//! Language registry: the closed set of languages the dashboard supports.
//!
//! The registry is static data, built once on first access through a
//! `OnceLock`. Everything else in the crate validates language codes against it.

use std::sync::OnceLock;

/// Metadata for one supported language.
#[derive(Debug, Clone)]
pub struct LanguageConfig {
    /// ISO 639-1 language code used throughout the dashboard (e.g., "en", "hi")
    pub code: &'static str,

    /// English name of the language (e.g., "Hindi")
    pub name: &'static str,

    /// Name of the language in its own script (e.g., "हिंदी")
    pub native_name: &'static str,

    /// Code the translation provider expects for this language
    pub provider_code: &'static str,

    /// Whether this is the native language all UI text is authored in
    pub is_canonical: bool,

    /// Whether this language can be selected
    pub enabled: bool,
}

/// Registry of every language known to the dashboard.
#[derive(Debug)]
pub struct LanguageRegistry {
    languages: Vec<LanguageConfig>,
}

static REGISTRY: OnceLock<LanguageRegistry> = OnceLock::new();

impl LanguageRegistry {
    /// Get the shared registry instance, building it on first call.
    pub fn get() -> &'static LanguageRegistry {
        REGISTRY.get_or_init(|| LanguageRegistry {
            languages: default_languages(),
        })
    }

    /// Look up a language by its dashboard code.
    pub fn get_by_code(&self, code: &str) -> Option<&LanguageConfig> {
        self.languages.iter().find(|lang| lang.code == code)
    }

    /// All languages a user may switch to, in display order.
    pub fn list_enabled(&self) -> Vec<&LanguageConfig> {
        self.languages.iter().filter(|lang| lang.enabled).collect()
    }

    /// The canonical (native) language.
    ///
    /// # Panics
    /// Panics if the built-in table does not contain exactly one canonical
    /// language.
    pub fn canonical(&self) -> &LanguageConfig {
        let mut canonical = self.languages.iter().filter(|lang| lang.is_canonical);

        match (canonical.next(), canonical.next()) {
            (Some(config), None) => config,
            (None, _) => panic!("No canonical language found in registry"),
            (Some(_), Some(_)) => panic!("Multiple canonical languages found in registry"),
        }
    }

    /// `true` if the code names an enabled language.
    pub fn is_enabled(&self, code: &str) -> bool {
        self.get_by_code(code)
            .map(|lang| lang.enabled)
            .unwrap_or(false)
    }
}

/// English is the authoring language; Hindi and Punjabi are translation targets.
fn default_languages() -> Vec<LanguageConfig> {
    vec![
        LanguageConfig {
            code: "en",
            name: "English",
            native_name: "English",
            provider_code: "en",
            is_canonical: true,
            enabled: true,
        },
        LanguageConfig {
            code: "hi",
            name: "Hindi",
            native_name: "हिंदी",
            provider_code: "hi",
            is_canonical: false,
            enabled: true,
        },
        LanguageConfig {
            code: "pa",
            name: "Punjabi",
            native_name: "ਪੰਜਾਬੀ",
            provider_code: "pa",
            is_canonical: false,
            enabled: true,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_get_returns_singleton() {
        let registry1 = LanguageRegistry::get();
        let registry2 = LanguageRegistry::get();
        assert!(std::ptr::eq(registry1, registry2));
    }

    #[test]
    fn test_get_by_code_hindi() {
        let config = LanguageRegistry::get()
            .get_by_code("hi")
            .expect("Hindi should be registered");

        assert_eq!(config.name, "Hindi");
        assert_eq!(config.native_name, "हिंदी");
        assert_eq!(config.provider_code, "hi");
        assert!(!config.is_canonical);
    }

    #[test]
    fn test_get_by_code_punjabi() {
        let config = LanguageRegistry::get()
            .get_by_code("pa")
            .expect("Punjabi should be registered");

        assert_eq!(config.name, "Punjabi");
        assert_eq!(config.native_name, "ਪੰਜਾਬੀ");
    }

    #[test]
    fn test_get_by_code_unknown() {
        let registry = LanguageRegistry::get();
        assert!(registry.get_by_code("es").is_none());
        assert!(registry.get_by_code("").is_none());
        assert!(registry.get_by_code("HI").is_none());
    }

    #[test]
    fn test_list_enabled_in_display_order() {
        let codes: Vec<_> = LanguageRegistry::get()
            .list_enabled()
            .iter()
            .map(|lang| lang.code)
            .collect();
        assert_eq!(codes, vec!["en", "hi", "pa"]);
    }

    #[test]
    fn test_canonical_is_english() {
        let canonical = LanguageRegistry::get().canonical();
        assert_eq!(canonical.code, "en");
        assert!(canonical.is_canonical);
    }

    #[test]
    fn test_is_enabled() {
        let registry = LanguageRegistry::get();
        assert!(registry.is_enabled("en"));
        assert!(registry.is_enabled("pa"));
        assert!(!registry.is_enabled("fr"));
    }
}
