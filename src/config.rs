use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{ShelfError, ShelfResult};
use crate::services::access::{AdminRule, CatalogScope, PlanRules};
use crate::services::format;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub display: DisplayConfig,
    pub search: SearchConfig,
    pub access: AccessConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Characters of prompt text shown on a card before "..."
    pub preview_chars: usize,
    /// Offset used for "Updated:" timestamps (420 = UTC+7)
    pub utc_offset_minutes: i32,
    /// chrono format string for "Updated:" timestamps
    pub time_format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub highlight_open: String,
    pub highlight_close: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessConfig {
    pub admin_rule: AdminRule,
    pub admin_id: Option<String>,
    pub plans: PlanTable,
}

/// What each subscription tier may see and do.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanTable {
    pub free: PlanRules,
    pub pro: PlanRules,
    pub ultimate: PlanRules,
    /// Applies to administrators regardless of their plan
    pub admin: PlanRules,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            preview_chars: 180,
            utc_offset_minutes: 420,
            time_format: "%H:%M %d/%m/%Y".to_string(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            highlight_open: "<mark>".to_string(),
            highlight_close: "</mark>".to_string(),
        }
    }
}

impl Default for PlanTable {
    fn default() -> Self {
        Self {
            free: PlanRules {
                catalog: CatalogScope::None,
                can_copy: false,
            },
            pro: PlanRules {
                catalog: CatalogScope::PersonalCopy,
                can_copy: true,
            },
            ultimate: PlanRules {
                catalog: CatalogScope::Live,
                can_copy: true,
            },
            admin: PlanRules {
                catalog: CatalogScope::Live,
                can_copy: true,
            },
        }
    }
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| {
                dirs::home_dir()
                    .map(|h| h.join(".config"))
                    .unwrap_or_else(|| PathBuf::from("/tmp"))
            })
            .join("prompt-shelf")
            .join("config.toml")
    }

    /// Load config from the default location, or return defaults if it is
    /// missing or broken
    pub fn load() -> Self {
        let path = Self::config_path();
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
                Self::default()
            }
        }
    }

    /// Load and validate config from a specific file
    pub fn load_from(path: &Path) -> ShelfResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate config from TOML text
    pub fn from_toml_str(content: &str) -> ShelfResult<Self> {
        let mut config: Self = toml::from_str(content)?;
        config.validate();
        Ok(config)
    }

    /// Validate and clamp config values to acceptable ranges
    fn validate(&mut self) {
        self.display.preview_chars = self.display.preview_chars.clamp(20, 2000);

        // Real-world offsets run from UTC-12 to UTC+14
        self.display.utc_offset_minutes = self.display.utc_offset_minutes.clamp(-720, 840);

        if self.display.time_format.trim().is_empty() {
            self.display.time_format = DisplayConfig::default().time_format;
        } else if !format::is_valid_time_format(&self.display.time_format) {
            warn!(time_format = %self.display.time_format, "invalid time_format, using default");
            self.display.time_format = DisplayConfig::default().time_format;
        }

        if self.access.admin_rule != AdminRule::Role && self.access.admin_id.is_none() {
            warn!(rule = ?self.access.admin_rule, "admin rule needs admin_id; no one will be admin by id");
        }
    }

    /// Save config to the default location
    pub fn save(&self) -> ShelfResult<()> {
        self.save_to(&Self::config_path())
    }

    /// Save config to a specific file
    pub fn save_to(&self, path: &Path) -> ShelfResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ShelfError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}
