use anyhow::{Context, Result};
use pocketpilot_assistant::{AssistantSettings, LookupLimits};
use pocketpilot_core::{Currency, UserId, parse_timezone};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::state::{default_store_path, ensure_pocketpilot_home};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub assistant: AssistantSection,
    #[serde(default)]
    pub store: StoreSection,
    #[serde(default)]
    pub chat: ChatSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantSection {
    /// ISO code; unknown codes fall back to USD
    pub currency: String,
    /// IANA zone used to place expenses on a calendar day
    pub timezone: String,
    pub lookup_window: usize,
    pub fallback_len: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSection {
    /// JSON store file (default: ~/.pocketpilot/store.json)
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatSection {
    pub user: String,
    pub log_level: String,
}

impl Default for AssistantSection {
    fn default() -> Self {
        let defaults = AssistantSettings::default();
        Self {
            currency: defaults.currency.code().to_string(),
            timezone: defaults.timezone.name().to_string(),
            lookup_window: defaults.lookup.window,
            fallback_len: defaults.lookup.fallback,
        }
    }
}

impl Default for ChatSection {
    fn default() -> Self {
        Self {
            user: "local".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn assistant_settings(&self) -> Result<AssistantSettings> {
        let section = &self.assistant;
        Ok(AssistantSettings {
            currency: Currency::normalize(Some(&section.currency)),
            timezone: parse_timezone(&section.timezone)
                .with_context(|| format!("[assistant] timezone = {:?}", section.timezone))?,
            lookup: LookupLimits {
                window: section.lookup_window.max(1),
                fallback: section.fallback_len.max(1),
            },
        })
    }

    pub fn store_path(&self) -> Result<PathBuf> {
        match &self.store.path {
            Some(path) => Ok(path.clone()),
            None => default_store_path(),
        }
    }

    pub fn user(&self) -> UserId {
        UserId::new(self.chat.user.trim())
    }
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_pocketpilot_home()?.join("config.toml"))
}

pub fn parse_config(s: &str) -> Result<Config> {
    toml::from_str(s).context("parse config.toml")
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    parse_config(&s)
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}

pub fn show_config() -> Result<()> {
    let cfg = load_config()?;
    let s = toml::to_string_pretty(&cfg).context("serialize config")?;
    println!("# {}", config_path()?.display());
    print!("{s}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let cfg = parse_config(
            r#"
[assistant]
currency = "eur"

[chat]
user = "alex"
"#,
        )
        .unwrap();
        assert_eq!(cfg.assistant.timezone, "UTC");
        assert_eq!(cfg.assistant.lookup_window, 120);
        assert_eq!(cfg.chat.log_level, "info");
        assert_eq!(cfg.user().as_str(), "alex");
        assert_eq!(cfg.store.path, None);

        let settings = cfg.assistant_settings().unwrap();
        assert_eq!(settings.currency, Currency::Eur);
        assert_eq!(settings.lookup.fallback, 15);
    }

    #[test]
    fn test_config_defaults_match_engine_defaults() {
        let settings = Config::default().assistant_settings().unwrap();
        let engine = AssistantSettings::default();
        assert_eq!(settings.timezone, engine.timezone);
        assert_eq!(settings.currency, engine.currency);
        assert_eq!(settings.lookup, engine.lookup);
    }

    #[test]
    fn test_unknown_currency_falls_back() {
        let cfg = parse_config("[assistant]\ncurrency = \"XYZ\"\n").unwrap();
        assert_eq!(cfg.assistant_settings().unwrap().currency, Currency::Usd);
    }

    #[test]
    fn test_bad_timezone_is_reported() {
        let cfg = parse_config("[assistant]\ntimezone = \"Mars/Olympus\"\n").unwrap();
        let err = cfg.assistant_settings().unwrap_err();
        assert!(format!("{err:#}").contains("Mars/Olympus"));
    }

    #[test]
    fn test_default_round_trips_through_toml() {
        let s = toml::to_string_pretty(&Config::default()).unwrap();
        let back = parse_config(&s).unwrap();
        assert_eq!(back.chat.user, "local");
        assert_eq!(back.assistant.currency, "USD");
    }
}
