use std::fs;
use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub const DEFAULT_PREFS_FILE: &str = "prefs.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl ThemeMode {
    pub fn toggled(self) -> Self {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        }
    }
}

/// Local, non-sensitive preferences: the chosen theme and the last push token
/// we managed to register (so sign-in does not re-register the same token).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub theme: ThemeMode,
    #[serde(default)]
    pub push_token: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PrefsStore {
    path: PathBuf,
}

impl PrefsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_env() -> Self {
        let path =
            std::env::var("SYMBIHELP_PREFS_FILE").unwrap_or_else(|_| DEFAULT_PREFS_FILE.to_string());
        Self::new(path)
    }

    /// A missing or unreadable file is never an error here; preferences fall
    /// back to defaults and the next save rewrites the file.
    pub fn load(&self) -> Preferences {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Preferences::default(),
            Err(err) => {
                log::warn!("could not read preferences: {}", err);
                return Preferences::default();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(prefs) => prefs,
            Err(err) => {
                log::warn!("preferences file is corrupt ({}), using defaults", err);
                Preferences::default()
            }
        }
    }

    pub fn save(&self, prefs: &Preferences) -> io::Result<()> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }
        let json = serde_json::to_string_pretty(prefs)?;
        fs::write(&self.path, json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(name: &str) -> PrefsStore {
        let mut path = std::env::temp_dir();
        path.push(format!("symbihelp-prefs-{}-{}.json", name, std::process::id()));
        let _ = fs::remove_file(&path);
        PrefsStore::new(path)
    }

    #[test]
    fn missing_file_yields_defaults() {
        let store = temp_store("missing");
        let prefs = store.load();
        assert_eq!(prefs.theme, ThemeMode::Light);
        assert!(prefs.push_token.is_none());
    }

    #[test]
    fn theme_toggle_round_trips_through_disk() {
        let store = temp_store("toggle");
        let mut prefs = store.load();
        prefs.theme = prefs.theme.toggled();
        store.save(&prefs).unwrap();

        let reloaded = store.load();
        assert_eq!(reloaded.theme, ThemeMode::Dark);
        assert_eq!(reloaded.theme.toggled(), ThemeMode::Light);
    }

    #[test]
    fn corrupt_file_falls_back_to_defaults() {
        let store = temp_store("corrupt");
        store.save(&Preferences::default()).unwrap();
        let path = store.path.clone();
        fs::write(&path, "{not json").unwrap();
        let prefs = store.load();
        assert_eq!(prefs.theme, ThemeMode::Light);
    }

    #[test]
    fn push_token_is_cached() {
        let store = temp_store("token");
        let mut prefs = Preferences::default();
        prefs.push_token = Some("ExponentPushToken[abc]".to_string());
        store.save(&prefs).unwrap();
        assert_eq!(store.load().push_token.as_deref(), Some("ExponentPushToken[abc]"));
    }
}
