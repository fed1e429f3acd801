//! RollPress Core - Roll-Fed Sticker Layout & Cost Engine
//!
//! # The Five Laws (Non-Negotiable)
//! 1. Every Estimate Is Validated
//! 2. Whole Rows Only
//! 3. Length Is Computed Once
//! 4. Exact Values Out, Rounding Is the Caller's
//! 5. Insufficient Input Is an Outcome, Not a Fault

pub mod config;
pub mod cost;
pub mod error;
pub mod hashing;
pub mod input;
pub mod material;
pub mod packing;
pub mod pipeline;
pub mod presets;
pub mod print_time;
pub mod rolls;
pub mod validation;

pub use cost::{CostBreakdown, LineItem};
pub use error::{ConfigError, InputField, NoResult, PackingFactor, PayloadError, PresetError};
pub use input::{
    CostLine, CostLineSet, InkCalibration, JobForm, JobRequest, MaterialCostTable, PackagingTable,
    PressConstants, RollSpec, StickerSpec,
};
pub use material::MaterialUsage;
pub use packing::PackingLayout;
pub use pipeline::{compute_form, compute_layout, EstimatePipeline, JobEstimate, PackingResult};
pub use presets::{MaterialKind, MaterialPreset, PresetRegistry, RollPreset};
pub use print_time::PrintTime;
pub use rolls::RollUsage;
pub use validation::{ValidationResult, ValidationViolation, Validator};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
