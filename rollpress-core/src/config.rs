//! Engine configuration file.
//!
//! Press constants, ink calibration, packaging rates and the preset
//! directory, as read by the CLI. Values here are defaults for a job form;
//! anything the caller supplies in the form wins.
//!
//! # Example
//!
//! ```json
//! {
//!   "presetsDir": "presets",
//!   "defaultRoll": "54in-150ft",
//!   "press": { "gapAllowanceIn": 4.0, "leaderAllowanceIn": 4.0, "secondsPerSection": 200 },
//!   "ink": { "mlPerSqIn": 0.0016, "costPerMl": 0.35, "overheadMultiplier": 1.2 },
//!   "packaging": { "breakpointQty": 250, "costBelow": 1.5, "costAtOrAbove": 4.0 },
//!   "promoCostPerJob": 0.75,
//!   "enabledLines": ["material", "laminate", "ink", "packaging"],
//!   "logging": { "level": "warn" }
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;
use crate::input::{
    CostLineSet, InkCalibration, JobForm, PackagingTable, PressConstants, DEFAULT_PROMO_COST_PER_JOB,
};

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EngineConfig {
    /// Optional JSON schema reference (ignored during parsing).
    #[serde(rename = "$schema", default)]
    _schema: Option<String>,

    /// Directory of additional preset catalogs.
    #[serde(default)]
    pub presets_dir: Option<PathBuf>,

    /// Roll preset applied when a job names none.
    #[serde(default)]
    pub default_roll: Option<String>,

    #[serde(default)]
    pub press: PressConstants,

    #[serde(default)]
    pub ink: InkCalibration,

    #[serde(default)]
    pub packaging: PackagingTable,

    #[serde(default = "default_promo_cost")]
    pub promo_cost_per_job: f64,

    #[serde(default)]
    pub enabled_lines: CostLineSet,

    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_promo_cost() -> f64 {
    DEFAULT_PROMO_COST_PER_JOB
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            _schema: None,
            presets_dir: None,
            default_roll: None,
            press: PressConstants::default(),
            ink: InkCalibration::default(),
            packaging: PackagingTable::default(),
            promo_cost_per_job: DEFAULT_PROMO_COST_PER_JOB,
            enabled_lines: CostLineSet::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first out-of-range value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("ink.mlPerSqIn", self.ink.ml_per_sq_in),
            ("ink.costPerMl", self.ink.cost_per_ml),
            ("ink.overheadMultiplier", self.ink.overhead_multiplier),
        ];
        let non_negative = [
            ("press.gapAllowanceIn", self.press.gap_allowance_in),
            ("press.leaderAllowanceIn", self.press.leader_allowance_in),
            ("packaging.costBelow", self.packaging.cost_below),
            ("packaging.costAtOrAbove", self.packaging.cost_at_or_above),
            ("promoCostPerJob", self.promo_cost_per_job),
        ];

        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::ValidationError {
                    message: format!("{name} must be positive, got {value}"),
                });
            }
        }
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::ValidationError {
                    message: format!("{name} must not be negative, got {value}"),
                });
            }
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "Invalid logging level '{}'. Must be one of: {}",
                    self.logging.level,
                    valid_levels.join(", ")
                ),
            });
        }
        Ok(())
    }

    /// The configured constants as fallback values for a job form.
    pub fn fallback_form(&self) -> JobForm {
        JobForm {
            gap_allowance_in: Some(self.press.gap_allowance_in),
            leader_allowance_in: Some(self.press.leader_allowance_in),
            seconds_per_section: Some(self.press.seconds_per_section),
            ink_ml_per_sq_in: Some(self.ink.ml_per_sq_in),
            ink_cost_per_ml: Some(self.ink.cost_per_ml),
            ink_overhead_multiplier: Some(self.ink.overhead_multiplier),
            packaging_breakpoint_qty: Some(self.packaging.breakpoint_qty),
            packaging_cost_below: Some(self.packaging.cost_below),
            packaging_cost_at_or_above: Some(self.packaging.cost_at_or_above),
            promo_cost_per_job: Some(self.promo_cost_per_job),
            enabled_cost_lines: Some(self.enabled_lines.clone()),
            ..JobForm::default()
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

/// Loads and validates the configuration file.
///
/// With no path, the built-in defaults are used.
///
/// # Errors
///
/// Returns an error if the file is missing, unreadable, malformed or
/// fails validation.
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig, ConfigError> {
    let Some(config_path) = path else {
        return Ok(EngineConfig::default());
    };

    if !config_path.exists() {
        return Err(ConfigError::NotFound { path: config_path.to_path_buf() });
    }

    let contents = std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
        path: config_path.to_path_buf(),
        source: e,
    })?;

    let config: EngineConfig = serde_json::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: config_path.to_path_buf(),
        source: e,
    })?;

    config.validate()?;

    Ok(config)
}
