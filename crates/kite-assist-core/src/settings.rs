//! Settings management for kite-assist.
//!
//! Loads settings from ${KITE_ASSIST_HOME}/config.toml with sensible
//! defaults, and exposes a store with explicit subscribe/notify change
//! propagation for components that want live updates.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::provider::{AssistError, AssistResult};

pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Minimum plausible API key length; anything shorter is a typo.
const MIN_API_KEY_LEN: usize = 10;

/// Returns the default config template with comments.
///
/// Embedded from default_config.toml at compile time.
fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

pub mod paths {
    //! Path resolution for kite-assist configuration and data directories.
    //!
    //! KITE_ASSIST_HOME resolution order:
    //! 1. KITE_ASSIST_HOME environment variable (if set)
    //! 2. ~/.config/kite-assist (default)

    use std::path::PathBuf;

    /// Returns the kite-assist home directory.
    pub fn assist_home() -> PathBuf {
        if let Ok(home) = std::env::var("KITE_ASSIST_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir()
            .map(|h| h.join(".config").join("kite-assist"))
            .expect("Could not determine home directory")
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        assist_home().join("config.toml")
    }

    /// Returns the directory for rotating log files.
    pub fn logs_dir() -> PathBuf {
        assist_home().join("logs")
    }
}

/// Connection settings for the OpenAI-compatible endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistSettings {
    /// Base URL of the chat completions endpoint.
    pub api_url: String,
    /// Bearer credential.
    pub api_key: String,
    /// Model identifier.
    pub model: String,
}

impl Default for AssistSettings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

impl AssistSettings {
    /// Loads settings from the default config path with env overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads settings from a specific path.
    /// Returns defaults if the file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut settings = if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse settings from {}", path.display()))?
        } else {
            AssistSettings::default()
        };
        settings.apply_env_overrides();
        Ok(settings)
    }

    /// Env precedence: OPENAI_API_KEY fills an empty key,
    /// KITE_ASSIST_BASE_URL overrides the URL.
    fn apply_env_overrides(&mut self) {
        if self.api_key.trim().is_empty()
            && let Ok(key) = std::env::var("OPENAI_API_KEY")
            && !key.trim().is_empty()
        {
            self.api_key = key.trim().to_string();
        }
        if let Ok(base_url) = std::env::var("KITE_ASSIST_BASE_URL")
            && !base_url.trim().is_empty()
        {
            self.api_url = base_url.trim().to_string();
        }
    }

    /// Saves the settings to a specific path, preserving comments.
    ///
    /// Starts from the existing file when present (so user edits survive),
    /// otherwise from the embedded commented template.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        use toml_edit::{DocumentMut, value};

        let contents = if path.exists() {
            fs::read_to_string(path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?
        } else {
            default_config_template().to_string()
        };

        let mut doc: DocumentMut = contents
            .parse()
            .with_context(|| format!("Failed to parse settings from {}", path.display()))?;

        doc["api_url"] = value(&self.api_url);
        doc["api_key"] = value(&self.api_key);
        doc["model"] = value(&self.model);

        write_config(path, &doc.to_string())
    }

    /// Creates a default config file at the given path.
    /// Returns an error if the file already exists.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }
        write_config(path, default_config_template())
    }

    /// Validates that the settings are complete enough to issue a request.
    ///
    /// # Errors
    /// Returns a `Configuration` error naming the offending field.
    pub fn validate(&self) -> AssistResult<()> {
        if self.api_url.trim().is_empty() {
            return Err(AssistError::configuration("api_url is required"));
        }
        if url::Url::parse(self.api_url.trim()).is_err() {
            return Err(AssistError::configuration(format!(
                "api_url is not a valid URL: {}",
                self.api_url
            )));
        }
        if self.api_key.trim().is_empty() {
            return Err(AssistError::configuration("api_key is required"));
        }
        if self.api_key.trim().len() < MIN_API_KEY_LEN {
            return Err(AssistError::configuration(
                "api_key looks too short to be valid",
            ));
        }
        if self.model.trim().is_empty() {
            return Err(AssistError::configuration("model is required"));
        }
        Ok(())
    }

    /// Returns the api_key with all but the first four characters masked.
    pub fn masked_api_key(&self) -> String {
        let key = self.api_key.trim();
        if key.is_empty() {
            return "(unset)".to_string();
        }
        let chars = key.chars().count();
        if chars <= 4 {
            return "*".repeat(chars);
        }
        let prefix: String = key.chars().take(4).collect();
        format!("{prefix}{}", "*".repeat(chars - 4))
    }
}

fn write_config(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(path, contents)
        .with_context(|| format!("Failed to write settings to {}", path.display()))
}

/// Identifier handed out by [`SettingsStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

type SettingsCallback = Box<dyn FnMut(&AssistSettings) + Send>;

/// Owns the current settings plus a list of change subscribers.
///
/// Replaces the source dashboard's page-global custom event: components
/// that want live updates register a callback instead of listening for an
/// event by string name. Notification order is subscription order, and the
/// store state is updated before any callback runs.
pub struct SettingsStore {
    path: PathBuf,
    settings: AssistSettings,
    subscribers: Vec<(SubscriberId, SettingsCallback)>,
    next_id: u64,
}

impl SettingsStore {
    /// Opens the store at the default config path.
    pub fn open() -> Result<Self> {
        Self::open_at(paths::config_path())
    }

    /// Opens the store against a specific config file.
    pub fn open_at(path: PathBuf) -> Result<Self> {
        let settings = AssistSettings::load_from(&path)?;
        Ok(Self {
            path,
            settings,
            subscribers: Vec::new(),
            next_id: 0,
        })
    }

    /// Returns a clone of the current settings.
    pub fn current(&self) -> AssistSettings {
        self.settings.clone()
    }

    /// Registers a callback invoked on every successful update.
    pub fn subscribe(&mut self, callback: impl FnMut(&AssistSettings) + Send + 'static) -> SubscriberId {
        let id = SubscriberId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Removes a previously registered callback.
    pub fn unsubscribe(&mut self, id: SubscriberId) {
        self.subscribers.retain(|(sub_id, _)| *sub_id != id);
    }

    /// Persists new settings and notifies every live subscriber.
    pub fn update(&mut self, settings: AssistSettings) -> Result<()> {
        settings.save_to(&self.path)?;
        self.settings = settings;
        for (_, callback) in &mut self.subscribers {
            callback(&self.settings);
        }
        Ok(())
    }

    /// Restores defaults, removing the config file.
    pub fn reset(&mut self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)
                .with_context(|| format!("Failed to remove {}", self.path.display()))?;
        }
        self.settings = AssistSettings::default();
        for (_, callback) in &mut self.subscribers {
            callback(&self.settings);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use tempfile::TempDir;

    use super::*;
    use crate::provider::AssistErrorKind;

    fn valid_settings() -> AssistSettings {
        AssistSettings {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: "sk-0123456789".to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let settings = AssistSettings::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(settings.api_url, DEFAULT_API_URL);
        assert_eq!(settings.model, DEFAULT_MODEL);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let mut settings = valid_settings();
        settings.model = "gpt-4o".to_string();
        settings.save_to(&path).unwrap();

        let loaded = AssistSettings::load_from(&path).unwrap();
        assert_eq!(loaded, settings);

        // Template comments survive the save.
        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("# kite-assist configuration."));
    }

    #[test]
    fn test_validate_reports_offending_field() {
        let mut settings = valid_settings();
        settings.api_key = "short".to_string();
        let err = settings.validate().unwrap_err();
        assert_eq!(err.kind, AssistErrorKind::Configuration);
        assert!(err.message.contains("api_key"));

        let mut settings = valid_settings();
        settings.api_url = "not a url".to_string();
        let err = settings.validate().unwrap_err();
        assert!(err.message.contains("api_url"));

        let mut settings = valid_settings();
        settings.model = "  ".to_string();
        let err = settings.validate().unwrap_err();
        assert!(err.message.contains("model"));
    }

    #[test]
    fn test_init_refuses_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        AssistSettings::init(&path).unwrap();
        assert!(AssistSettings::init(&path).is_err());
    }

    #[test]
    fn test_masked_api_key() {
        let mut settings = valid_settings();
        assert_eq!(settings.masked_api_key(), "sk-0*********");
        settings.api_key = String::new();
        assert_eq!(settings.masked_api_key(), "(unset)");
    }

    #[test]
    fn test_store_notifies_subscribers_in_order() {
        let dir = TempDir::new().unwrap();
        let mut store = SettingsStore::open_at(dir.path().join("config.toml")).unwrap();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_a = seen.clone();
        let seen_b = seen.clone();
        store.subscribe(move |s| seen_a.lock().unwrap().push(("a", s.model.clone())));
        store.subscribe(move |s| seen_b.lock().unwrap().push(("b", s.model.clone())));

        let mut settings = valid_settings();
        settings.model = "gpt-4o".to_string();
        store.update(settings).unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![("a", "gpt-4o".to_string()), ("b", "gpt-4o".to_string())]
        );
    }

    #[test]
    fn test_unsubscribed_callback_is_not_called() {
        let dir = TempDir::new().unwrap();
        let mut store = SettingsStore::open_at(dir.path().join("config.toml")).unwrap();

        let count = Arc::new(Mutex::new(0usize));
        let count_inner = count.clone();
        let id = store.subscribe(move |_| *count_inner.lock().unwrap() += 1);

        store.update(valid_settings()).unwrap();
        store.unsubscribe(id);
        store.update(valid_settings()).unwrap();

        assert_eq!(*count.lock().unwrap(), 1);
    }

    #[test]
    fn test_reset_removes_file_and_restores_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let mut store = SettingsStore::open_at(path.clone()).unwrap();
        store.update(valid_settings()).unwrap();
        assert!(path.exists());

        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_inner = seen.clone();
        store.subscribe(move |s| seen_inner.lock().unwrap().push(s.model.clone()));

        store.reset().unwrap();
        assert!(!path.exists());
        assert_eq!(store.current(), AssistSettings::default());
        assert_eq!(*seen.lock().unwrap(), vec![DEFAULT_MODEL.to_string()]);

        // Resetting an already-default store is fine.
        store.reset().unwrap();
    }

    #[test]
    fn test_store_state_updated_before_callbacks() {
        let dir = TempDir::new().unwrap();
        let mut store = SettingsStore::open_at(dir.path().join("config.toml")).unwrap();

        // The callback observes the post-update value through its argument;
        // the persisted file must already hold it too.
        let path = dir.path().join("config.toml");
        let observed = Arc::new(Mutex::new(String::new()));
        let observed_inner = observed.clone();
        let path_inner = path.clone();
        store.subscribe(move |s| {
            let on_disk = AssistSettings::load_from(&path_inner).unwrap();
            assert_eq!(on_disk.model, s.model);
            *observed_inner.lock().unwrap() = s.model.clone();
        });

        let mut settings = valid_settings();
        settings.model = "gpt-4o".to_string();
        store.update(settings).unwrap();
        assert_eq!(*observed.lock().unwrap(), "gpt-4o");
    }
}
