//! Error Types
//!
//! `NoResult` is the engine's "insufficient input" outcome. It is returned as
//! an ordinary value from the estimate pipeline and never indicates a fault.
//! `PresetError` and `ConfigError` cover the file-backed layers.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Every caller-supplied parameter of an estimate, by name.
/// Serialized under its `JobForm` payload key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum InputField {
    #[serde(rename = "stickerWidthIn")]
    StickerWidth,
    #[serde(rename = "stickerHeightIn")]
    StickerHeight,
    #[serde(rename = "quantity")]
    Quantity,
    #[serde(rename = "usableWidthIn")]
    UsableWidth,
    #[serde(rename = "physicalWidthIn")]
    PhysicalWidth,
    #[serde(rename = "spacingIn")]
    Spacing,
    #[serde(rename = "maxSectionLengthIn")]
    MaxSectionLength,
    #[serde(rename = "rollLengthFt")]
    RollLength,
    #[serde(rename = "gapAllowanceIn")]
    GapAllowance,
    #[serde(rename = "leaderAllowanceIn")]
    LeaderAllowance,
    #[serde(rename = "materialCostPerRoll")]
    MaterialCostPerRoll,
    #[serde(rename = "laminateCostPerRoll")]
    LaminateCostPerRoll,
    #[serde(rename = "inkMlPerSqIn")]
    InkMlPerSqIn,
    #[serde(rename = "inkCostPerMl")]
    InkCostPerMl,
    #[serde(rename = "inkOverheadMultiplier")]
    InkOverheadMultiplier,
    #[serde(rename = "secondsPerSection")]
    SecondsPerSection,
    #[serde(rename = "packagingBreakpointQty")]
    PackagingBreakpoint,
    #[serde(rename = "packagingCostBelow")]
    PackagingCostBelow,
    #[serde(rename = "packagingCostAtOrAbove")]
    PackagingCostAtOrAbove,
    #[serde(rename = "promoCostPerJob")]
    PromoCostPerJob,
}

impl InputField {
    pub const ALL: [InputField; 20] = [
        Self::StickerWidth,
        Self::StickerHeight,
        Self::Quantity,
        Self::UsableWidth,
        Self::PhysicalWidth,
        Self::Spacing,
        Self::MaxSectionLength,
        Self::RollLength,
        Self::GapAllowance,
        Self::LeaderAllowance,
        Self::MaterialCostPerRoll,
        Self::LaminateCostPerRoll,
        Self::InkMlPerSqIn,
        Self::InkCostPerMl,
        Self::InkOverheadMultiplier,
        Self::SecondsPerSection,
        Self::PackagingBreakpoint,
        Self::PackagingCostBelow,
        Self::PackagingCostAtOrAbove,
        Self::PromoCostPerJob,
    ];

    /// Looks a field up by its payload key.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.as_str() == key)
    }

    /// Fields that hold a whole count rather than a measurement or a rate.
    pub const fn is_count(&self) -> bool {
        matches!(self, Self::Quantity | Self::SecondsPerSection | Self::PackagingBreakpoint)
    }

    /// Payload key for this field, as it appears in a `JobForm`.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::StickerWidth => "stickerWidthIn",
            Self::StickerHeight => "stickerHeightIn",
            Self::Quantity => "quantity",
            Self::UsableWidth => "usableWidthIn",
            Self::PhysicalWidth => "physicalWidthIn",
            Self::Spacing => "spacingIn",
            Self::MaxSectionLength => "maxSectionLengthIn",
            Self::RollLength => "rollLengthFt",
            Self::GapAllowance => "gapAllowanceIn",
            Self::LeaderAllowance => "leaderAllowanceIn",
            Self::MaterialCostPerRoll => "materialCostPerRoll",
            Self::LaminateCostPerRoll => "laminateCostPerRoll",
            Self::InkMlPerSqIn => "inkMlPerSqIn",
            Self::InkCostPerMl => "inkCostPerMl",
            Self::InkOverheadMultiplier => "inkOverheadMultiplier",
            Self::SecondsPerSection => "secondsPerSection",
            Self::PackagingBreakpoint => "packagingBreakpointQty",
            Self::PackagingCostBelow => "packagingCostBelow",
            Self::PackagingCostAtOrAbove => "packagingCostAtOrAbove",
            Self::PromoCostPerJob => "promoCostPerJob",
        }
    }
}

impl fmt::Display for InputField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which packing capacity came out as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PackingFactor {
    /// The sticker is wider than the usable roll width.
    RowCapacity,
    /// The sticker is taller than the press's maximum section length.
    SectionCapacity,
}

impl fmt::Display for PackingFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RowCapacity => f.write_str("stickers per row"),
            Self::SectionCapacity => f.write_str("rows per section"),
        }
    }
}

/// The "no result" outcome of an estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum NoResult {
    /// A required dimension or quantity is missing, zero, negative or not a number.
    #[error("insufficient input: {field}")]
    InvalidInput { field: InputField },

    /// The sticker does not fit within the roll or press constraints.
    #[error("sticker does not fit: {factor} is zero")]
    UnsatisfiablePacking { factor: PackingFactor },

    /// A configured rate, roll length or press constant is out of range.
    #[error("invalid configuration value: {field}")]
    ConfigurationError { field: InputField },
}

/// Errors raised while reading a `JobForm` from a JSON payload.
#[derive(Debug, Error)]
pub enum PayloadError {
    /// A known field holds something other than a usable number.
    #[error(transparent)]
    Rejected(#[from] NoResult),

    /// The payload is not JSON, or a non-numeric field is malformed.
    #[error("invalid payload: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Errors raised while loading preset catalogs.
#[derive(Debug, Error)]
pub enum PresetError {
    #[error("failed to read preset file: {path}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse preset file: {path}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("preset catalog requires engine >= {required}, current is {current}")]
    EngineVersionMismatch { required: String, current: String },

    #[error("invalid preset '{id}': {message}")]
    InvalidPreset { id: String, message: String },
}

/// Errors raised while loading the engine configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration file: {path}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration file: {path}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("configuration file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("configuration validation failed: {message}")]
    ValidationError { message: String },
}
