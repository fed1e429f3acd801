//! Validation System - Rule/Outcome Separation
//!
//! Rules produce structured violations.
//! The first violation decides the "no result" outcome.

use serde::{Deserialize, Serialize};

use crate::error::{InputField, NoResult};
use crate::input::JobRequest;

/// Whether a violation concerns the job itself or the configuration it runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationCategory {
    Input,
    Configuration,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationViolation {
    pub rule: String,
    pub field: InputField,
    pub category: ViolationCategory,
    pub message: String,
    pub expected: String,
    pub actual: Option<f64>,
}

impl ValidationViolation {
    pub fn to_no_result(&self) -> NoResult {
        match self.category {
            ViolationCategory::Input => NoResult::InvalidInput { field: self.field },
            ViolationCategory::Configuration => NoResult::ConfigurationError { field: self.field },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub violations: Vec<ValidationViolation>,
}

impl ValidationResult {
    pub fn success() -> Self {
        Self {
            valid: true,
            violations: vec![],
        }
    }

    pub fn failure(violations: Vec<ValidationViolation>) -> Self {
        Self {
            valid: false,
            violations,
        }
    }

    /// `Ok` when valid, otherwise the outcome of the first violation.
    pub fn outcome(&self) -> Result<(), NoResult> {
        match self.violations.first() {
            Some(violation) => Err(violation.to_no_result()),
            None => Ok(()),
        }
    }
}

/// Validation rule trait - produces violations
pub trait ValidationRule {
    fn name(&self) -> &'static str;
    fn validate(&self, request: &JobRequest) -> Vec<ValidationViolation>;
}

struct Check {
    rule: &'static str,
    category: ViolationCategory,
}

impl Check {
    /// Rejects zero, negative and non-finite values.
    fn positive(&self, field: InputField, value: f64) -> Option<ValidationViolation> {
        if value.is_finite() && value > 0.0 {
            return None;
        }
        Some(self.violation(field, "must be a positive number", "> 0", Some(value)))
    }

    /// Rejects negative and non-finite values.
    fn non_negative(&self, field: InputField, value: f64) -> Option<ValidationViolation> {
        if value.is_finite() && value >= 0.0 {
            return None;
        }
        Some(self.violation(field, "must not be negative", ">= 0", Some(value)))
    }

    fn violation(
        &self,
        field: InputField,
        message: &str,
        expected: &str,
        actual: Option<f64>,
    ) -> ValidationViolation {
        ValidationViolation {
            rule: self.rule.to_string(),
            field,
            category: self.category,
            message: format!("{field} {message}"),
            expected: expected.to_string(),
            actual,
        }
    }
}

// --- Concrete Rules ---

/// Sticker dimensions and quantity.
pub struct StickerRule;

impl ValidationRule for StickerRule {
    fn name(&self) -> &'static str { "sticker" }

    fn validate(&self, request: &JobRequest) -> Vec<ValidationViolation> {
        let check = Check { rule: self.name(), category: ViolationCategory::Input };
        let mut violations = vec![];

        violations.extend(check.positive(InputField::StickerWidth, request.sticker.width_in));
        violations.extend(check.positive(InputField::StickerHeight, request.sticker.height_in));
        if request.quantity == 0 {
            violations.push(check.violation(InputField::Quantity, "must be at least 1", ">= 1", Some(0.0)));
        }

        violations
    }
}

/// Roll and press geometry.
pub struct RollGeometryRule;

impl ValidationRule for RollGeometryRule {
    fn name(&self) -> &'static str { "roll_geometry" }

    fn validate(&self, request: &JobRequest) -> Vec<ValidationViolation> {
        let check = Check { rule: self.name(), category: ViolationCategory::Input };
        let roll = &request.roll;
        let mut violations = vec![];

        violations.extend(check.positive(InputField::UsableWidth, roll.usable_width_in));
        violations.extend(check.positive(InputField::Spacing, roll.spacing_in));
        violations.extend(check.positive(InputField::MaxSectionLength, roll.max_section_length_in));

        if let Some(physical) = roll.physical_width_in {
            match check.positive(InputField::PhysicalWidth, physical) {
                Some(violation) => violations.push(violation),
                None if roll.usable_width_in > physical => violations.push(check.violation(
                    InputField::PhysicalWidth,
                    "is narrower than the usable width",
                    &format!(">= {}", roll.usable_width_in),
                    Some(physical),
                )),
                None => {}
            }
        }

        violations
    }
}

/// Roll length, rates and press constants.
pub struct ConfigurationRule;

impl ValidationRule for ConfigurationRule {
    fn name(&self) -> &'static str { "configuration" }

    fn validate(&self, request: &JobRequest) -> Vec<ValidationViolation> {
        let check = Check { rule: self.name(), category: ViolationCategory::Configuration };
        let mut violations = vec![];

        violations.extend(check.positive(InputField::RollLength, request.roll.roll_length_ft));
        violations.extend(check.positive(InputField::MaterialCostPerRoll, request.costs.material_cost_per_roll));
        violations.extend(check.positive(InputField::LaminateCostPerRoll, request.costs.laminate_cost_per_roll));
        violations.extend(check.positive(InputField::InkMlPerSqIn, request.ink.ml_per_sq_in));
        violations.extend(check.positive(InputField::InkCostPerMl, request.ink.cost_per_ml));
        violations.extend(check.positive(InputField::InkOverheadMultiplier, request.ink.overhead_multiplier));
        violations.extend(check.non_negative(InputField::GapAllowance, request.press.gap_allowance_in));
        violations.extend(check.non_negative(InputField::LeaderAllowance, request.press.leader_allowance_in));
        violations.extend(check.non_negative(InputField::PackagingCostBelow, request.packaging.cost_below));
        violations.extend(check.non_negative(InputField::PackagingCostAtOrAbove, request.packaging.cost_at_or_above));
        violations.extend(check.non_negative(InputField::PromoCostPerJob, request.promo_cost_per_job));

        violations
    }
}

/// Validator runs every rule and collects the violations.
pub struct Validator {
    rules: Vec<Box<dyn ValidationRule + Send + Sync>>,
}

impl Validator {
    pub fn new() -> Self {
        Self {
            rules: vec![
                Box::new(StickerRule),
                Box::new(RollGeometryRule),
                Box::new(ConfigurationRule),
            ],
        }
    }

    pub fn validate(&self, request: &JobRequest) -> ValidationResult {
        let violations: Vec<_> = self.rules.iter()
            .flat_map(|rule| rule.validate(request))
            .collect();

        if violations.is_empty() {
            ValidationResult::success()
        } else {
            tracing::debug!(count = violations.len(), "job request rejected");
            ValidationResult::failure(violations)
        }
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}
