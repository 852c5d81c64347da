//! Persisted host settings.
//!
//! A small TOML file carries the offset, the enable flag, and the polling
//! cadence between runs. Loading starts from built-in defaults, layers the
//! file on top (missing keys keep their defaults, unknown keys are
//! rejected), and the host then applies any command-line overrides as a
//! final [`SettingsPatch`].

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SubtickError};

/// File consulted when no settings path is given explicitly.
pub const DEFAULT_SETTINGS_FILE: &str = "subtick.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Display offset in seconds, added to the playback clock.
    pub offset: f64,
    /// Whether lookups match at all.
    pub enabled: bool,
    /// Polling cadence for playback simulation, in milliseconds.
    pub tick_interval_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            offset: 0.0,
            enabled: true,
            tick_interval_ms: 500,
        }
    }
}

/// A partial update: only the present fields override. Both the settings
/// file and the command-line flags reduce to one of these.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SettingsPatch {
    pub offset: Option<f64>,
    pub enabled: Option<bool>,
    pub tick_interval_ms: Option<u64>,
}

impl Settings {
    /// Load settings from `path`, or from [`DEFAULT_SETTINGS_FILE`] if it
    /// exists, or fall back to the defaults. An explicit path that cannot
    /// be read is an error; the implicit default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default = Path::new(DEFAULT_SETTINGS_FILE);
                if default.exists() {
                    Self::from_file(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let patch: SettingsPatch =
            toml::from_str(&text).map_err(|source| SubtickError::SettingsParse {
                path: path.display().to_string(),
                source,
            })?;
        let mut settings = Self::default();
        settings.apply(patch);
        tracing::debug!(path = %path.display(), "loaded settings file");
        Ok(settings)
    }

    /// Layer a patch over the current values.
    pub fn apply(&mut self, patch: SettingsPatch) {
        if let Some(offset) = patch.offset {
            self.offset = offset;
        }
        if let Some(enabled) = patch.enabled {
            self.enabled = enabled;
        }
        if let Some(tick_interval_ms) = patch.tick_interval_ms {
            self.tick_interval_ms = tick_interval_ms;
        }
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
