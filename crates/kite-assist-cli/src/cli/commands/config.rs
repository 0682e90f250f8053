//! Config command handlers.

use anyhow::{Context, Result};
use kite_assist_core::settings::{AssistSettings, SettingsStore, paths};
use kite_assist_core::{ChatClient, ChatClientConfig};

pub fn path() {
    println!("{}", paths::config_path().display());
}

pub fn init() -> Result<()> {
    let config_path = paths::config_path();
    AssistSettings::init(&config_path)
        .with_context(|| format!("init config at {}", config_path.display()))?;
    println!("Created config at {}", config_path.display());
    Ok(())
}

pub fn show() -> Result<()> {
    let settings = AssistSettings::load().context("load settings")?;
    println!("config:  {}", paths::config_path().display());
    println!("api_url: {}", settings.api_url);
    println!("api_key: {}", settings.masked_api_key());
    println!("model:   {}", settings.model);
    Ok(())
}

/// Sets a single field, validating just that field so settings can be
/// filled in one at a time.
pub fn set(store: &mut SettingsStore, field: &str, value: &str) -> Result<()> {
    let value = value.trim();
    let mut settings = store.current();

    match field {
        "api-url" | "api_url" => {
            url::Url::parse(value)
                .with_context(|| format!("'{value}' is not a valid URL"))?;
            settings.api_url = value.to_string();
        }
        "api-key" | "api_key" => {
            if value.len() < 10 {
                anyhow::bail!("api_key looks too short to be valid");
            }
            settings.api_key = value.to_string();
        }
        "model" => {
            if value.is_empty() {
                anyhow::bail!("model must not be empty");
            }
            settings.model = value.to_string();
        }
        other => anyhow::bail!("Unknown field '{other}'. Valid fields: api-url, api-key, model"),
    }

    store.update(settings).context("save settings")?;
    println!("Updated {field}");
    Ok(())
}

pub fn reset(store: &mut SettingsStore) -> Result<()> {
    store.reset().context("reset settings")?;
    println!("Settings reset to defaults");
    Ok(())
}

pub async fn test(settings: &AssistSettings) -> Result<()> {
    let config = ChatClientConfig::from_settings(settings).context("validate settings")?;
    let client = ChatClient::new(config);
    client.test_connection().await.context("connection test")?;
    println!("Connection OK ({} reachable)", settings.api_url);
    Ok(())
}
