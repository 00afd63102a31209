//! Internationalization (i18n) module.
//!
//! Server messages come from catalogs embedded at build time; the locale
//! is picked from the request's `Accept-Language`.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde_json::Value;
use tracing::warn;

/// Catalog used when a key is missing from the requested locale.
pub const FALLBACK_LOCALE: &str = "tr";

/// Locales with a catalog.
pub const SUPPORTED_LOCALES: [&str; 2] = ["tr", "en"];

/// Global translation store: LangCode -> Key -> Text
static TRANSLATIONS: Lazy<HashMap<&'static str, Value>> = Lazy::new(|| {
    let mut map = HashMap::new();
    for (lang, raw) in [("tr", include_str!("tr.json")), ("en", include_str!("en.json"))] {
        match serde_json::from_str(raw) {
            Ok(value) => {
                map.insert(lang, value);
            }
            Err(e) => warn!("Failed to parse {} catalog: {}", lang, e),
        }
    }
    map
});

/// Load the catalogs now instead of on first lookup.
pub fn init() {
    Lazy::force(&TRANSLATIONS);
}

/// Get text for a key in a specific language.
/// Supports nested keys via dot notation, e.g., "errors.duplicate.tc_no".
///
/// Falls back to the Turkish catalog, then to the key itself.
pub fn get_text(lang: &str, key: &str) -> String {
    [lang, FALLBACK_LOCALE]
        .into_iter()
        .filter_map(|lang| TRANSLATIONS.get(lang))
        .find_map(|catalog| resolve_key(catalog, key))
        .unwrap_or_else(|| key.to_string())
}

/// [`get_text`] with `{name}` placeholders substituted.
pub fn format_text(lang: &str, key: &str, args: &[(&str, &str)]) -> String {
    args.iter()
        .fold(get_text(lang, key), |text, (name, value)| text.replace(&format!("{{{name}}}"), value))
}

/// Display name of an entity, e.g. `"Görev"` for `tasks`.
pub fn resource_name(lang: &str, entity: &str) -> String {
    get_text(lang, &format!("resources.{entity}"))
}

fn resolve_key(val: &Value, key: &str) -> Option<String> {
    let mut current = val;
    for part in key.split('.') {
        current = current.get(part)?;
    }
    current.as_str().map(str::to_string)
}

/// Resolve the effective locale from an `Accept-Language` header.
///
/// The first supported language tag wins, in header order (quality values
/// are not weighed); otherwise `default` if supported, else Turkish.
pub fn resolve_locale(accept_language: Option<&str>, default: &str) -> &'static str {
    let requested = accept_language.into_iter().flat_map(|header| {
        header.split(',').filter_map(|part| {
            let tag = part.split(';').next()?.trim();
            let primary = tag.split('-').next()?.to_ascii_lowercase();
            Some(primary)
        })
    });

    requested
        .chain(std::iter::once(default.to_ascii_lowercase()))
        .find_map(|lang| SUPPORTED_LOCALES.into_iter().find(|supported| *supported == lang))
        .unwrap_or(FALLBACK_LOCALE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_lookup_and_fallback() {
        assert_eq!(get_text("tr", "errors.duplicate.tc_no"), "Bu TC Kimlik No zaten kayıtlı");
        assert_eq!(get_text("en", "errors.validation"), "Validation error");
        assert_eq!(get_text("de", "errors.validation"), "Doğrulama hatası");
        assert_eq!(get_text("tr", "errors.nope"), "errors.nope");
    }

    #[test]
    fn test_placeholders() {
        let resource = resource_name("tr", "tasks");
        assert_eq!(
            format_text("tr", "errors.not_found", &[("resource", &resource)]),
            "Görev bulunamadı"
        );
        assert_eq!(format_text("tr", "messages.listed", &[("total", "50")]), "50 kayıt bulundu");
    }

    #[test]
    fn test_resolve_locale() {
        assert_eq!(resolve_locale(None, "tr"), "tr");
        assert_eq!(resolve_locale(Some("en-US,en;q=0.9"), "tr"), "en");
        assert_eq!(resolve_locale(Some("de-DE, tr;q=0.5"), "en"), "tr");
        assert_eq!(resolve_locale(Some("fr"), "en"), "en");
        assert_eq!(resolve_locale(Some("fr"), "xx"), "tr");
    }
}
