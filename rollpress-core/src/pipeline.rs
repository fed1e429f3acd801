//! Estimate Pipeline - Single Entry Point
//!
//! `compute` always validates before packing. There is no way to price a
//! request that has not passed the validator.

use serde::{Deserialize, Serialize};

use crate::cost::CostBreakdown;
use crate::error::NoResult;
use crate::hashing::compute_request_fingerprint;
use crate::input::{JobForm, JobRequest};
use crate::material::MaterialUsage;
use crate::packing::PackingLayout;
use crate::print_time::PrintTime;
use crate::rolls::RollUsage;
use crate::validation::{ValidationResult, Validator};
use crate::ENGINE_VERSION;

/// Layout, length and roll figures of one job.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackingResult {
    pub layout: PackingLayout,
    pub material: MaterialUsage,
    pub rolls: RollUsage,
}

impl PackingResult {
    pub fn stickers_per_row(&self) -> u64 { self.layout.stickers_per_row }
    pub fn rows_per_section(&self) -> u64 { self.layout.rows_per_section }
    pub fn sections_needed(&self) -> u64 { self.layout.sections_needed }
    pub fn total_rows(&self) -> u64 { self.layout.total_rows }
    pub fn actual_units_printed(&self) -> u64 { self.layout.actual_units_printed }
    pub fn total_length_inches(&self) -> f64 { self.material.total_length_inches }
    pub fn total_length_feet(&self) -> f64 { self.material.total_length_feet }
    pub fn rolls_needed(&self) -> u64 { self.rolls.rolls_needed }
    pub fn remaining_feet_on_last_roll(&self) -> f64 { self.rolls.remaining_feet_on_last_roll }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobEstimate {
    pub engine_version: String,
    pub fingerprint: String,
    pub packing: PackingResult,
    pub cost: CostBreakdown,
    pub print_time: PrintTime,
}

/// The estimate pipeline - single entry point for all estimates
pub struct EstimatePipeline {
    validator: Validator,
}

impl EstimatePipeline {
    pub fn new() -> Self {
        Self {
            validator: Validator::new(),
        }
    }

    /// Validate a request without estimating it.
    pub fn validate(&self, request: &JobRequest) -> ValidationResult {
        self.validator.validate(request)
    }

    /// Compute the full estimate for a request.
    ///
    /// Returns `NoResult` for incomplete or out-of-range input and for
    /// stickers that do not fit the roll. That outcome is an ordinary value.
    pub fn compute(&self, request: &JobRequest) -> Result<JobEstimate, NoResult> {
        self.validate(request).outcome()?;

        let layout = PackingLayout::pack(&request.sticker, &request.roll, request.quantity)?;
        let material = MaterialUsage::measure(&layout, &request.sticker, &request.roll, &request.press);
        let rolls = RollUsage::account(material.total_length_feet, request.roll.roll_length_ft)?;
        let cost = CostBreakdown::estimate(request, &material)?;
        let print_time = PrintTime::for_sections(layout.sections_needed, request.press.seconds_per_section);

        let fingerprint = compute_request_fingerprint(request, ENGINE_VERSION).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "could not fingerprint request");
            String::new()
        });

        tracing::debug!(
            quantity = request.quantity,
            sections = layout.sections_needed,
            rolls = rolls.rolls_needed,
            total_cost = cost.total_cost,
            "estimate computed"
        );

        Ok(JobEstimate {
            engine_version: ENGINE_VERSION.to_string(),
            fingerprint,
            packing: PackingResult { layout, material, rolls },
            cost,
            print_time,
        })
    }

    /// Compute from a caller's form; missing required fields yield `InvalidInput`.
    pub fn compute_form(&self, form: JobForm) -> Result<JobEstimate, NoResult> {
        let request = form.into_request()?;
        self.compute(&request)
    }
}

impl Default for EstimatePipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Compute an estimate with a default pipeline.
pub fn compute_layout(request: &JobRequest) -> Result<JobEstimate, NoResult> {
    EstimatePipeline::new().compute(request)
}

/// Compute an estimate from a form with a default pipeline.
pub fn compute_form(form: JobForm) -> Result<JobEstimate, NoResult> {
    EstimatePipeline::new().compute_form(form)
}
