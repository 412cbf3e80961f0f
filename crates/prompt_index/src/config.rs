use core_types::Millis;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid value for `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Tunables for the panel and the timers around it.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub panel_width_px: u32,
    /// Distance of the toggle from the right edge when the panel is hidden.
    pub toggle_offset_px: u32,
    pub fade_ms: Millis,
    pub highlight_ms: Millis,
    pub reconcile_interval_ms: Millis,
    pub reconcile_duration_ms: Millis,
    pub navigation_settle_ms: Millis,
    pub snippet_chars: usize,
    /// Empty-text scans an element may go through before it is abandoned.
    pub max_empty_retries: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            panel_width_px: 320,
            toggle_offset_px: 12,
            fade_ms: 220,
            highlight_ms: 1_400,
            reconcile_interval_ms: 1_500,
            reconcile_duration_ms: 60_000,
            navigation_settle_ms: 300,
            snippet_chars: 80,
            max_empty_retries: 256,
        }
    }
}

impl Config {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.panel_width_px == 0 {
            return Err(ConfigError::Invalid {
                field: "panel_width_px",
                reason: "must be positive",
            });
        }
        if self.reconcile_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "reconcile_interval_ms",
                reason: "must be positive",
            });
        }
        if self.reconcile_interval_ms > self.reconcile_duration_ms {
            return Err(ConfigError::Invalid {
                field: "reconcile_interval_ms",
                reason: "must not exceed reconcile_duration_ms",
            });
        }
        if self.snippet_chars == 0 {
            return Err(ConfigError::Invalid {
                field: "snippet_chars",
                reason: "must be positive",
            });
        }
        Ok(())
    }

    pub fn panel_width(&self) -> String {
        format!("{}px", self.panel_width_px)
    }

    pub fn toggle_offset(&self, panel_shown: bool) -> String {
        if panel_shown {
            format!("calc({}px + {}px)", self.panel_width_px, self.toggle_offset_px)
        } else {
            format!("{}px", self.toggle_offset_px)
        }
    }
}
