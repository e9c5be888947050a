//! Schema-validated settings with defaults.
//!
//! Settings are a flat mapping of typed fields, each declared in the
//! schema with its kind, requiredness, optional pattern or enum
//! constraint, and a default. Every field has a default; loading replaces
//! missing or invalid stored values with their default rather than
//! failing the whole load. Persistence goes through a
//! [`StorageProvider`], with keys namespaced under
//! [`crate::storage::KEY_PREFIX`].

use std::collections::BTreeMap;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::Result;
use crate::error::Validation;
use crate::storage::{KEY_PREFIX, StorageProvider};

/// A typed settings value.
///
/// Untagged so values persist as plain JSON scalars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Int(i64),
    Str(String),
}

impl SettingValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            SettingValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            SettingValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SettingValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

/// Declared kind of a settings field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Str,
    Bool,
    Int,
}

/// One schema entry.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub key: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    /// Regex the value must match (string fields only).
    pub pattern: Option<&'static str>,
    /// Closed set of allowed values (string fields only).
    pub options: Option<&'static [&'static str]>,
    pub default: SettingValue,
}

/// A loaded settings mapping.
pub type Settings = BTreeMap<String, SettingValue>;

// Allows an unconfigured empty value alongside a well-formed slug.
const REPO_PATTERN: &str = r"^$|^[A-Za-z0-9_.-]+/[A-Za-z0-9_.-]+$";
const URL_PATTERN: &str = r"^https?://";

const TOAST_POSITIONS: &[&str] = &["top-right", "top-left", "bottom-right", "bottom-left"];
const THEMES: &[&str] = &["light", "dark", "system"];

fn str_field(key: &'static str, default: &str) -> FieldSpec {
    FieldSpec {
        key,
        kind: FieldKind::Str,
        required: false,
        pattern: None,
        options: None,
        default: SettingValue::Str(default.to_string()),
    }
}

fn bool_field(key: &'static str, default: bool) -> FieldSpec {
    FieldSpec { key, kind: FieldKind::Bool, required: false, pattern: None, options: None, default: SettingValue::Bool(default) }
}

fn int_field(key: &'static str, default: i64) -> FieldSpec {
    FieldSpec { key, kind: FieldKind::Int, required: false, pattern: None, options: None, default: SettingValue::Int(default) }
}

/// The full settings schema.
///
/// Covers capture defaults, the GitHub target, notification behavior,
/// and debug toggles.
pub fn schema() -> Vec<FieldSpec> {
    vec![
        FieldSpec { required: true, ..bool_field("include_images", true) },
        FieldSpec { required: true, ..bool_field("include_links", true) },
        FieldSpec { required: true, ..bool_field("clean_html", true) },
        int_field("capture_timeout", 30),
        int_field("max_content_length", 500_000),
        str_field(
            "user_agent",
            "Mozilla/5.0 (compatible; PrismWeave/1.0; +https://github.com/prismweave/prismweave)",
        ),
        str_field("github_token", ""),
        FieldSpec { pattern: Some(REPO_PATTERN), ..str_field("github_repo", "") },
        str_field("github_branch", "main"),
        str_field("default_folder", "captures"),
        str_field("commit_message_template", "PrismWeave capture: {title}"),
        bool_field("auto_commit", false),
        bool_field("markdown_frontmatter", true),
        bool_field("filename_date_prefix", true),
        bool_field("show_notifications", true),
        int_field("notification_duration", 4000),
        FieldSpec { options: Some(TOAST_POSITIONS), ..str_field("toast_position", "top-right") },
        FieldSpec { pattern: Some(URL_PATTERN), ..str_field("api_base_url", "http://127.0.0.1:8087") },
        FieldSpec { options: Some(THEMES), ..str_field("theme", "system") },
        bool_field("debug_logging", false),
    ]
}

/// The schema's declared defaults.
///
/// Pure; contains every schema key.
pub fn default_settings() -> Settings {
    schema().into_iter().map(|spec| (spec.key.to_string(), spec.default)).collect()
}

/// Check one value against its schema entry.
///
/// Returns a human-readable problem description, `None` when the value
/// conforms.
fn validate_field(spec: &FieldSpec, value: &SettingValue) -> Option<String> {
    let kind_matches = matches!(
        (spec.kind, value),
        (FieldKind::Str, SettingValue::Str(_))
            | (FieldKind::Bool, SettingValue::Bool(_))
            | (FieldKind::Int, SettingValue::Int(_))
    );
    if !kind_matches {
        return Some(format!("{}: wrong type", spec.key));
    }

    if let (Some(pattern), Some(s)) = (spec.pattern, value.as_str()) {
        let re = Regex::new(pattern).expect("schema patterns are valid");
        if !re.is_match(s) {
            return Some(format!("{}: value {:?} does not match pattern", spec.key, s));
        }
    }

    if let (Some(options), Some(s)) = (spec.options, value.as_str())
        && !options.contains(&s)
    {
        return Some(format!("{}: {:?} is not one of {:?}", spec.key, s, options));
    }

    None
}

/// Validate a settings mapping against the schema.
///
/// Checks required fields are present, kinds match, patterns hold, and
/// enum fields stay within their declared options. Unknown keys are
/// reported too.
pub fn validate_settings(settings: &Settings) -> Validation {
    let schema = schema();
    let mut errors = Vec::new();

    for spec in &schema {
        match settings.get(spec.key) {
            Some(value) => {
                if let Some(problem) = validate_field(spec, value) {
                    errors.push(problem);
                }
            }
            None if spec.required => errors.push(format!("{}: required field missing", spec.key)),
            None => {}
        }
    }

    for key in settings.keys() {
        if !schema.iter().any(|spec| spec.key == key) {
            errors.push(format!("{}: unknown settings key", key));
        }
    }

    Validation::from_errors(errors)
}

/// Settings manager over a storage provider.
///
/// Load policy: start from defaults and overlay each stored value that
/// parses and validates; anything missing or invalid silently keeps its
/// default.
pub struct SettingsManager<S: StorageProvider> {
    storage: S,
}

impl<S: StorageProvider> SettingsManager<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    fn storage_key(key: &str) -> String {
        format!("{}{}", KEY_PREFIX, key)
    }

    /// Load settings, falling back to defaults per field.
    pub fn load(&self) -> Settings {
        let mut settings = default_settings();

        for spec in schema() {
            let Ok(Some(raw)) = self.storage.get(&Self::storage_key(spec.key)) else {
                continue;
            };
            let Ok(value) = serde_json::from_str::<SettingValue>(&raw) else {
                continue;
            };
            if validate_field(&spec, &value).is_none() {
                settings.insert(spec.key.to_string(), value);
            }
        }

        settings
    }

    /// Persist schema-known keys.
    ///
    /// Unknown keys are dropped rather than written; the store only ever
    /// holds fields the schema declares.
    pub fn save(&mut self, settings: &Settings) -> Result<()> {
        for spec in schema() {
            if let Some(value) = settings.get(spec.key) {
                let raw = serde_json::to_string(value)?;
                self.storage.set(&Self::storage_key(spec.key), &raw)?;
            }
        }
        Ok(())
    }

    /// Remove every stored field, returning settings to their defaults.
    pub fn reset(&mut self) -> Result<()> {
        for spec in schema() {
            self.storage.remove(&Self::storage_key(spec.key))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn test_default_settings_covers_every_schema_key() {
        let defaults = default_settings();
        for spec in schema() {
            assert!(defaults.contains_key(spec.key), "missing default for {}", spec.key);
        }
        assert_eq!(defaults.len(), schema().len());
    }

    #[test]
    fn test_defaults_validate() {
        let validation = validate_settings(&default_settings());
        assert!(validation.valid, "errors: {:?}", validation.errors);
    }

    #[test]
    fn test_validate_rejects_wrong_type() {
        let mut settings = default_settings();
        settings.insert("include_images".to_string(), SettingValue::Str("yes".to_string()));

        let validation = validate_settings(&settings);
        assert!(!validation.valid);
        assert!(validation.errors.iter().any(|e| e.contains("include_images")));
    }

    #[test]
    fn test_validate_rejects_missing_required() {
        let mut settings = default_settings();
        settings.remove("clean_html");

        let validation = validate_settings(&settings);
        assert!(!validation.valid);
        assert!(validation.errors.iter().any(|e| e.contains("clean_html")));
    }

    #[test]
    fn test_validate_checks_repo_pattern() {
        let mut settings = default_settings();
        settings.insert("github_repo".to_string(), SettingValue::Str("user/notes".to_string()));
        assert!(validate_settings(&settings).valid);

        settings.insert("github_repo".to_string(), SettingValue::Str("not a slug".to_string()));
        assert!(!validate_settings(&settings).valid);
    }

    #[test]
    fn test_validate_checks_enum_options() {
        let mut settings = default_settings();
        settings.insert("toast_position".to_string(), SettingValue::Str("center".to_string()));

        let validation = validate_settings(&settings);
        assert!(!validation.valid);
        assert!(validation.errors.iter().any(|e| e.contains("toast_position")));
    }

    #[test]
    fn test_validate_flags_unknown_keys() {
        let mut settings = default_settings();
        settings.insert("mystery".to_string(), SettingValue::Bool(true));

        let validation = validate_settings(&settings);
        assert!(!validation.valid);
        assert!(validation.errors.iter().any(|e| e.contains("mystery")));
    }

    #[test]
    fn test_manager_load_uses_defaults_when_empty() {
        let manager = SettingsManager::new(MemoryStorage::new());
        assert_eq!(manager.load(), default_settings());
    }

    #[test]
    fn test_manager_roundtrip() {
        let mut manager = SettingsManager::new(MemoryStorage::new());

        let mut settings = default_settings();
        settings.insert("github_repo".to_string(), SettingValue::Str("user/notes".to_string()));
        settings.insert("capture_timeout".to_string(), SettingValue::Int(60));
        manager.save(&settings).unwrap();

        let loaded = manager.load();
        assert_eq!(loaded.get("github_repo").unwrap().as_str(), Some("user/notes"));
        assert_eq!(loaded.get("capture_timeout").unwrap().as_int(), Some(60));
    }

    #[test]
    fn test_manager_load_replaces_invalid_with_default() {
        let mut storage = MemoryStorage::new();
        // wrong type for a boolean field and an unparseable value
        storage.set("prismweave.include_images", "\"maybe\"").unwrap();
        storage.set("prismweave.capture_timeout", "not json").unwrap();
        storage.set("prismweave.toast_position", "\"center\"").unwrap();

        let manager = SettingsManager::new(storage);
        let loaded = manager.load();

        assert_eq!(loaded.get("include_images").unwrap().as_bool(), Some(true));
        assert_eq!(loaded.get("capture_timeout").unwrap().as_int(), Some(30));
        assert_eq!(loaded.get("toast_position").unwrap().as_str(), Some("top-right"));
    }

    #[test]
    fn test_manager_reset_restores_defaults() {
        let mut manager = SettingsManager::new(MemoryStorage::new());

        let mut settings = default_settings();
        settings.insert("auto_commit".to_string(), SettingValue::Bool(true));
        manager.save(&settings).unwrap();
        manager.reset().unwrap();

        assert_eq!(manager.load(), default_settings());
    }

    #[test]
    fn test_storage_keys_are_prefixed() {
        let mut manager = SettingsManager::new(MemoryStorage::new());
        manager.save(&default_settings()).unwrap();

        for key in manager.storage.keys().unwrap() {
            assert!(key.starts_with(KEY_PREFIX), "unprefixed key {}", key);
        }
    }
}
