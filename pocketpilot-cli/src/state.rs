use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// Resolve the state home from `POCKETPILOT_HOME` or `$HOME/.pocketpilot`.
fn home_from(override_dir: Option<String>, home: Option<String>) -> Result<PathBuf> {
    if let Some(dir) = override_dir.filter(|d| !d.trim().is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    let home = home.context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".pocketpilot"))
}

pub fn pocketpilot_home() -> Result<PathBuf> {
    home_from(
        std::env::var("POCKETPILOT_HOME").ok(),
        std::env::var("HOME").ok(),
    )
}

pub fn ensure_pocketpilot_home() -> Result<PathBuf> {
    let dir = pocketpilot_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

fn ensure_subdir(name: &str) -> Result<PathBuf> {
    let dir = ensure_pocketpilot_home()?.join(name);
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn default_store_path() -> Result<PathBuf> {
    Ok(ensure_pocketpilot_home()?.join("store.json"))
}

pub fn chat_dir() -> Result<PathBuf> {
    ensure_subdir("chat")
}

pub fn logs_dir() -> Result<PathBuf> {
    ensure_subdir("logs")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_wins() {
        let dir = home_from(Some("/tmp/pp".to_string()), Some("/home/me".to_string())).unwrap();
        assert_eq!(dir, PathBuf::from("/tmp/pp"));
    }

    #[test]
    fn test_defaults_under_home() {
        let dir = home_from(Some("  ".to_string()), Some("/home/me".to_string())).unwrap();
        assert_eq!(dir, PathBuf::from("/home/me/.pocketpilot"));
    }

    #[test]
    fn test_missing_home_is_an_error() {
        assert!(home_from(None, None).is_err());
    }
}
