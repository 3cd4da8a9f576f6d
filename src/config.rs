// src/config.rs - Profile-based settings persisted as JSON
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::error::{GhostHandError, Result};
use crate::features::DEFAULT_CLICK_THRESHOLD;
use crate::input::Sensitivity;
use crate::smoothing::{DEFAULT_BETA, DEFAULT_MIN_CUTOFF};

pub const DEFAULT_PROFILE_NAME: &str = "Default";
pub const CONFIG_FILE_NAME: &str = "config.json";

const DEFAULT_SENSITIVITY: f64 = 1500.0;
const MIN_SENSITIVITY: f64 = 100.0;
const MIN_CLICK_THRESHOLD: f64 = 0.05;
const MAX_CLICK_THRESHOLD: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub sensitivity_x: f64,
    pub sensitivity_y: f64,
    pub click_threshold: f64,
    pub keep_awake: bool,
    pub high_performance: bool,
    pub invert_scroll: bool,
    pub min_cutoff: f64,
    pub beta: f64,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            sensitivity_x: DEFAULT_SENSITIVITY,
            sensitivity_y: DEFAULT_SENSITIVITY,
            click_threshold: DEFAULT_CLICK_THRESHOLD,
            keep_awake: false,
            high_performance: false,
            invert_scroll: false,
            min_cutoff: DEFAULT_MIN_CUTOFF,
            beta: DEFAULT_BETA,
        }
    }
}

pub fn is_valid_click_threshold(value: f64) -> bool {
    value > MIN_CLICK_THRESHOLD && value <= MAX_CLICK_THRESHOLD
}

impl Profile {
    pub fn sensitivity(&self) -> Sensitivity {
        Sensitivity {
            x: self.sensitivity_x,
            y: self.sensitivity_y,
        }
    }

    /// Replace out-of-range values with defaults. Returns true if anything
    /// changed.
    pub fn sanitize(&mut self) -> bool {
        let before = self.clone();

        if !(self.sensitivity_x >= MIN_SENSITIVITY) {
            self.sensitivity_x = DEFAULT_SENSITIVITY;
        }
        if !(self.sensitivity_y >= MIN_SENSITIVITY) {
            self.sensitivity_y = DEFAULT_SENSITIVITY;
        }
        if !is_valid_click_threshold(self.click_threshold) {
            self.click_threshold = DEFAULT_CLICK_THRESHOLD;
        }
        if !(self.min_cutoff.is_finite() && self.min_cutoff > 0.0) {
            self.min_cutoff = DEFAULT_MIN_CUTOFF;
        }
        if !(self.beta.is_finite() && self.beta > 0.0) {
            self.beta = DEFAULT_BETA;
        }

        *self != before
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub current_profile: String,
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        let mut profiles = BTreeMap::new();
        profiles.insert(DEFAULT_PROFILE_NAME.to_string(), Profile::default());
        Self {
            current_profile: DEFAULT_PROFILE_NAME.to_string(),
            profiles,
        }
    }
}

impl Config {
    pub fn default_path() -> PathBuf {
        ProjectDirs::from("com", "ghosthand", "ghost_hand")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
    }

    /// Parse a config document, migrating the legacy flat layout.
    pub fn from_json(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        let Value::Object(map) = &value else {
            return Err(GhostHandError::Config("top level is not an object".to_string()));
        };

        let mut config = if map.contains_key("profiles") {
            serde_json::from_value::<Config>(value)?
        } else {
            info!("Migrating legacy config to profiles");
            let profile: Profile = serde_json::from_value(value)?;
            let mut config = Config::default();
            config.profiles.insert(DEFAULT_PROFILE_NAME.to_string(), profile);
            config
        };

        config.sanitize();
        Ok(config)
    }

    /// Missing or corrupt files fall back to defaults.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            return Config::default();
        }

        match std::fs::read_to_string(path)
            .map_err(GhostHandError::from)
            .and_then(|text| Config::from_json(&text))
        {
            Ok(config) => config,
            Err(e) => {
                warn!("Error loading config {}: {}", path.display(), e);
                Config::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text)?;
        info!("Config saved to {}", path.display());
        Ok(())
    }

    pub fn sanitize(&mut self) {
        if !self.profiles.contains_key(DEFAULT_PROFILE_NAME) {
            self.profiles
                .insert(DEFAULT_PROFILE_NAME.to_string(), Profile::default());
        }
        for (name, profile) in self.profiles.iter_mut() {
            if profile.sanitize() {
                warn!("Profile '{}' had out-of-range values, reset to defaults", name);
            }
        }
        if !self.profiles.contains_key(&self.current_profile) {
            warn!(
                "Profile '{}' not found, using '{}'",
                self.current_profile, DEFAULT_PROFILE_NAME
            );
            self.current_profile = DEFAULT_PROFILE_NAME.to_string();
        }
    }

    pub fn current(&self) -> &Profile {
        // sanitize() keeps current_profile pointing at an existing entry
        self.profiles
            .get(&self.current_profile)
            .or_else(|| self.profiles.get(DEFAULT_PROFILE_NAME))
            .unwrap_or(&DEFAULT_PROFILE)
    }

    pub fn current_mut(&mut self) -> &mut Profile {
        self.profiles.entry(self.current_profile.clone()).or_default()
    }

    pub fn select(&mut self, name: &str) -> Result<()> {
        if !self.profiles.contains_key(name) {
            return Err(GhostHandError::Config(format!("no profile named '{}'", name)));
        }
        self.current_profile = name.to_string();
        Ok(())
    }

    /// New profile cloned from the current one, then selected.
    pub fn add_profile(&mut self, name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(GhostHandError::Config("profile name is empty".to_string()));
        }
        if self.profiles.contains_key(name) {
            return Err(GhostHandError::Config(format!("profile '{}' already exists", name)));
        }
        let profile = self.current().clone();
        self.profiles.insert(name.to_string(), profile);
        self.current_profile = name.to_string();
        Ok(())
    }

    pub fn delete_profile(&mut self, name: &str) -> Result<()> {
        if name == DEFAULT_PROFILE_NAME {
            return Err(GhostHandError::Config("cannot delete the Default profile".to_string()));
        }
        if self.profiles.remove(name).is_none() {
            return Err(GhostHandError::Config(format!("no profile named '{}'", name)));
        }
        if self.current_profile == name {
            self.current_profile = DEFAULT_PROFILE_NAME.to_string();
        }
        Ok(())
    }
}

static DEFAULT_PROFILE: Profile = Profile {
    sensitivity_x: DEFAULT_SENSITIVITY,
    sensitivity_y: DEFAULT_SENSITIVITY,
    click_threshold: DEFAULT_CLICK_THRESHOLD,
    keep_awake: false,
    high_performance: false,
    invert_scroll: false,
    min_cutoff: DEFAULT_MIN_CUTOFF,
    beta: DEFAULT_BETA,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_keys_take_defaults() {
        let config = Config::from_json(
            r#"{"current_profile": "Desk", "profiles": {"Desk": {"sensitivity_x": 2200.0}}}"#,
        )
        .unwrap();
        let desk = config.current();
        assert_eq!(config.current_profile, "Desk");
        assert_eq!(desk.sensitivity_x, 2200.0);
        assert_eq!(desk.sensitivity_y, DEFAULT_SENSITIVITY);
        assert_eq!(desk.click_threshold, DEFAULT_CLICK_THRESHOLD);
        assert!(config.profiles.contains_key(DEFAULT_PROFILE_NAME));
    }

    #[test]
    fn test_legacy_flat_config_migrates() {
        let config = Config::from_json(r#"{"sensitivity_x": 900.0, "keep_awake": true}"#).unwrap();
        assert_eq!(config.current_profile, DEFAULT_PROFILE_NAME);
        let p = config.current();
        assert!(p.keep_awake);
        assert_eq!(p.sensitivity_x, 900.0);
    }

    #[test]
    fn test_sanitize_resets_out_of_range() {
        let mut p = Profile {
            sensitivity_x: 20.0,
            click_threshold: 1.5,
            min_cutoff: -1.0,
            beta: f64::NAN,
            ..Profile::default()
        };
        assert!(p.sanitize());
        assert_eq!(p, Profile::default());

        let mut low = Profile {
            click_threshold: 0.05,
            ..Profile::default()
        };
        low.sanitize();
        assert_eq!(low.click_threshold, DEFAULT_CLICK_THRESHOLD);

        let mut ok = Profile {
            click_threshold: 1.0,
            ..Profile::default()
        };
        assert!(!ok.sanitize());
    }

    #[test]
    fn test_unknown_current_profile_falls_back() {
        let config = Config::from_json(
            r#"{"current_profile": "Gone", "profiles": {"Default": {}}}"#,
        )
        .unwrap();
        assert_eq!(config.current_profile, DEFAULT_PROFILE_NAME);
    }

    #[test]
    fn test_profile_management() {
        let mut config = Config::default();
        config.current_mut().sensitivity_x = 3000.0;
        config.add_profile("Couch").unwrap();
        assert_eq!(config.current_profile, "Couch");
        assert_eq!(config.current().sensitivity_x, 3000.0);
        assert!(config.add_profile("Couch").is_err());

        assert!(config.delete_profile(DEFAULT_PROFILE_NAME).is_err());
        config.delete_profile("Couch").unwrap();
        assert_eq!(config.current_profile, DEFAULT_PROFILE_NAME);
        assert!(config.select("Couch").is_err());
    }

    #[test]
    fn test_non_object_is_error() {
        assert!(Config::from_json("[1, 2]").is_err());
        assert!(Config::from_json("not json").is_err());
    }
}
