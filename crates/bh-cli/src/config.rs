//! Configuration loading and management.

use std::path::{Path, PathBuf};

use bh_core::{AnalysisConfig, DEFAULT_ANCHOR_OFFSET_HOURS};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Hours added to the `battery usage start` marker.
    pub anchor_offset_hours: i64,

    /// Year for year-less log timestamps. Unset: anchor year, else current year.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_year: Option<i32>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            anchor_offset_hours: DEFAULT_ANCHOR_OFFSET_HOURS,
            reference_year: None,
        }
    }
}

impl Config {
    /// Loads configuration from default locations, then an optional file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (BH_*)
        figment = figment.merge(Env::prefixed("BH_"));

        figment.extract()
    }

    /// Builds the analysis configuration, letting `year` override the file.
    pub fn analysis_config(&self, year: Option<i32>) -> AnalysisConfig {
        AnalysisConfig {
            anchor_offset_hours: self.anchor_offset_hours,
            reference_year: year.or(self.reference_year),
        }
    }
}

/// Returns the platform-specific config directory for bh.
///
/// On Linux: `~/.config/bh`
pub fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("bh"))
}
