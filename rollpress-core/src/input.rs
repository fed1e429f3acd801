//! Job Inputs
//!
//! Everything an estimate depends on, supplied per call. `JobRequest` is the
//! typed input tuple; `JobForm` is the same data with every field optional,
//! the way a caller holds a form that is still being filled in.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{InputField, NoResult, PayloadError};

/// Inter-section allowance inserted between printed sections, inches.
pub const DEFAULT_GAP_ALLOWANCE_IN: f64 = 4.0;
/// Barcode/leader material reserved once per job, inches.
pub const DEFAULT_LEADER_ALLOWANCE_IN: f64 = 4.0;
/// Press run time for one section (3m20s).
pub const DEFAULT_SECONDS_PER_SECTION: u64 = 200;

/// Area of the calibration job, square inches (250 stickers at 3in x 3in).
pub const REFERENCE_JOB_AREA_SQ_IN: f64 = 2_250.0;
/// Ink consumed by the calibration job, millilitres.
pub const REFERENCE_JOB_INK_ML: f64 = 3.6;
pub const DEFAULT_INK_COST_PER_ML: f64 = 0.35;
/// Purge and waste on top of the ink laid down.
pub const DEFAULT_INK_OVERHEAD_MULTIPLIER: f64 = 1.2;

pub const DEFAULT_PACKAGING_BREAKPOINT_QTY: u64 = 250;
/// Small-parcel mailer, per job.
pub const DEFAULT_PACKAGING_COST_BELOW: f64 = 1.50;
/// Bulk box, per job.
pub const DEFAULT_PACKAGING_COST_AT_OR_ABOVE: f64 = 4.00;
pub const DEFAULT_PROMO_COST_PER_JOB: f64 = 0.75;

/// Sticker dimensions in inches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StickerSpec {
    pub width_in: f64,
    pub height_in: f64,
}

impl StickerSpec {
    pub const fn new(width_in: f64, height_in: f64) -> Self {
        Self { width_in, height_in }
    }

    pub fn area_sq_in(&self) -> f64 {
        self.width_in * self.height_in
    }
}

/// Physical roll and press geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollSpec {
    /// Printable width across the roll, inches.
    pub usable_width_in: f64,
    /// Spacing between neighbouring stickers on both axes, inches.
    pub spacing_in: f64,
    /// Longest section the press prints in one pass, inches.
    pub max_section_length_in: f64,
    pub roll_length_ft: f64,
    /// Full substrate width, when known. Must not be less than the usable width.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physical_width_in: Option<f64>,
}

/// Press-specific allowances and timing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PressConstants {
    pub gap_allowance_in: f64,
    pub leader_allowance_in: f64,
    pub seconds_per_section: u64,
}

impl Default for PressConstants {
    fn default() -> Self {
        Self {
            gap_allowance_in: DEFAULT_GAP_ALLOWANCE_IN,
            leader_allowance_in: DEFAULT_LEADER_ALLOWANCE_IN,
            seconds_per_section: DEFAULT_SECONDS_PER_SECTION,
        }
    }
}

/// Cost per roll of the selected substrate and laminate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialCostTable {
    pub material_cost_per_roll: f64,
    pub laminate_cost_per_roll: f64,
}

/// Ink usage calibration.
///
/// `ml_per_sq_in` is the ratio measured on a reference job of known area.
/// The overhead multiplier is kept separate so purge/waste can be tuned
/// without re-deriving the calibration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InkCalibration {
    pub ml_per_sq_in: f64,
    pub cost_per_ml: f64,
    pub overhead_multiplier: f64,
}

impl InkCalibration {
    /// Derives the per-area constant from a measured job.
    ///
    /// Returns `None` when the reference area is not a positive number.
    pub fn from_reference_job(area_sq_in: f64, ink_ml: f64, cost_per_ml: f64) -> Option<Self> {
        if !(area_sq_in.is_finite() && area_sq_in > 0.0) {
            return None;
        }
        Some(Self {
            ml_per_sq_in: ink_ml / area_sq_in,
            cost_per_ml,
            overhead_multiplier: DEFAULT_INK_OVERHEAD_MULTIPLIER,
        })
    }
}

impl Default for InkCalibration {
    fn default() -> Self {
        Self {
            ml_per_sq_in: REFERENCE_JOB_INK_ML / REFERENCE_JOB_AREA_SQ_IN,
            cost_per_ml: DEFAULT_INK_COST_PER_ML,
            overhead_multiplier: DEFAULT_INK_OVERHEAD_MULTIPLIER,
        }
    }
}

/// Packaging cost as a step function of quantity. Both amounts are per job.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PackagingTable {
    pub breakpoint_qty: u64,
    pub cost_below: f64,
    pub cost_at_or_above: f64,
}

impl PackagingTable {
    pub fn cost_for(&self, quantity: u64) -> f64 {
        if quantity < self.breakpoint_qty {
            self.cost_below
        } else {
            self.cost_at_or_above
        }
    }
}

impl Default for PackagingTable {
    fn default() -> Self {
        Self {
            breakpoint_qty: DEFAULT_PACKAGING_BREAKPOINT_QTY,
            cost_below: DEFAULT_PACKAGING_COST_BELOW,
            cost_at_or_above: DEFAULT_PACKAGING_COST_AT_OR_ABOVE,
        }
    }
}

/// A line of the cost breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CostLine {
    Material,
    Laminate,
    Ink,
    Packaging,
    Promo,
}

impl CostLine {
    pub const ALL: [CostLine; 5] = [
        CostLine::Material,
        CostLine::Laminate,
        CostLine::Ink,
        CostLine::Packaging,
        CostLine::Promo,
    ];

    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "material" | "substrate" => Some(Self::Material),
            "laminate" => Some(Self::Laminate),
            "ink" => Some(Self::Ink),
            "packaging" => Some(Self::Packaging),
            "promo" => Some(Self::Promo),
            _ => None,
        }
    }
}

/// The cost lines that count toward the total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CostLineSet(BTreeSet<CostLine>);

impl CostLineSet {
    pub fn all() -> Self {
        Self(CostLine::ALL.into_iter().collect())
    }

    pub fn none() -> Self {
        Self(BTreeSet::new())
    }

    /// Everything except the opt-in promo insert.
    pub fn standard() -> Self {
        Self::all().without(CostLine::Promo)
    }

    pub fn contains(&self, line: CostLine) -> bool {
        self.0.contains(&line)
    }

    pub fn with(mut self, line: CostLine) -> Self {
        self.0.insert(line);
        self
    }

    pub fn without(mut self, line: CostLine) -> Self {
        self.0.remove(&line);
        self
    }
}

impl Default for CostLineSet {
    fn default() -> Self {
        Self::standard()
    }
}

impl FromIterator<CostLine> for CostLineSet {
    fn from_iter<I: IntoIterator<Item = CostLine>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// The complete input of one estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRequest {
    pub sticker: StickerSpec,
    pub quantity: u64,
    pub roll: RollSpec,
    #[serde(default)]
    pub press: PressConstants,
    pub costs: MaterialCostTable,
    #[serde(default)]
    pub ink: InkCalibration,
    #[serde(default)]
    pub packaging: PackagingTable,
    #[serde(default = "default_promo_cost")]
    pub promo_cost_per_job: f64,
    #[serde(default)]
    pub enabled_lines: CostLineSet,
}

fn default_promo_cost() -> f64 {
    DEFAULT_PROMO_COST_PER_JOB
}

impl JobRequest {
    /// A request with default press constants, ink, packaging and cost lines.
    pub fn new(sticker: StickerSpec, quantity: u64, roll: RollSpec, costs: MaterialCostTable) -> Self {
        Self {
            sticker,
            quantity,
            roll,
            press: PressConstants::default(),
            costs,
            ink: InkCalibration::default(),
            packaging: PackagingTable::default(),
            promo_cost_per_job: DEFAULT_PROMO_COST_PER_JOB,
            enabled_lines: CostLineSet::default(),
        }
    }

    pub fn with_quantity(&self, quantity: u64) -> Self {
        Self {
            quantity,
            ..self.clone()
        }
    }

    pub fn with_enabled_lines(&self, enabled_lines: CostLineSet) -> Self {
        Self {
            enabled_lines,
            ..self.clone()
        }
    }
}

/// A job as collected from a caller, every field optional.
///
/// Sticker, quantity, roll and cost-per-roll fields are required. Press
/// constants, ink, packaging, promo and enabled lines fall back to the
/// engine defaults when absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobForm {
    pub sticker_width_in: Option<f64>,
    pub sticker_height_in: Option<f64>,
    pub quantity: Option<i64>,
    pub usable_width_in: Option<f64>,
    pub physical_width_in: Option<f64>,
    pub spacing_in: Option<f64>,
    pub max_section_length_in: Option<f64>,
    pub roll_length_ft: Option<f64>,
    pub gap_allowance_in: Option<f64>,
    pub leader_allowance_in: Option<f64>,
    pub material_cost_per_roll: Option<f64>,
    pub laminate_cost_per_roll: Option<f64>,
    pub ink_ml_per_sq_in: Option<f64>,
    pub ink_cost_per_ml: Option<f64>,
    pub ink_overhead_multiplier: Option<f64>,
    pub seconds_per_section: Option<u64>,
    pub packaging_breakpoint_qty: Option<u64>,
    pub packaging_cost_below: Option<f64>,
    pub packaging_cost_at_or_above: Option<f64>,
    pub promo_cost_per_job: Option<f64>,
    pub enabled_cost_lines: Option<CostLineSet>,
}

impl JobForm {
    /// Fills every empty field of `self` from `fallback`.
    #[must_use]
    pub fn or(self, fallback: JobForm) -> JobForm {
        JobForm {
            sticker_width_in: self.sticker_width_in.or(fallback.sticker_width_in),
            sticker_height_in: self.sticker_height_in.or(fallback.sticker_height_in),
            quantity: self.quantity.or(fallback.quantity),
            usable_width_in: self.usable_width_in.or(fallback.usable_width_in),
            physical_width_in: self.physical_width_in.or(fallback.physical_width_in),
            spacing_in: self.spacing_in.or(fallback.spacing_in),
            max_section_length_in: self.max_section_length_in.or(fallback.max_section_length_in),
            roll_length_ft: self.roll_length_ft.or(fallback.roll_length_ft),
            gap_allowance_in: self.gap_allowance_in.or(fallback.gap_allowance_in),
            leader_allowance_in: self.leader_allowance_in.or(fallback.leader_allowance_in),
            material_cost_per_roll: self.material_cost_per_roll.or(fallback.material_cost_per_roll),
            laminate_cost_per_roll: self.laminate_cost_per_roll.or(fallback.laminate_cost_per_roll),
            ink_ml_per_sq_in: self.ink_ml_per_sq_in.or(fallback.ink_ml_per_sq_in),
            ink_cost_per_ml: self.ink_cost_per_ml.or(fallback.ink_cost_per_ml),
            ink_overhead_multiplier: self.ink_overhead_multiplier.or(fallback.ink_overhead_multiplier),
            seconds_per_section: self.seconds_per_section.or(fallback.seconds_per_section),
            packaging_breakpoint_qty: self.packaging_breakpoint_qty.or(fallback.packaging_breakpoint_qty),
            packaging_cost_below: self.packaging_cost_below.or(fallback.packaging_cost_below),
            packaging_cost_at_or_above: self
                .packaging_cost_at_or_above
                .or(fallback.packaging_cost_at_or_above),
            promo_cost_per_job: self.promo_cost_per_job.or(fallback.promo_cost_per_job),
            enabled_cost_lines: self.enabled_cost_lines.or(fallback.enabled_cost_lines),
        }
    }

    /// Reads a form from a JSON payload.
    ///
    /// A known field holding anything but a number, or a count holding a
    /// fractional value, is `NoResult::InvalidInput` naming that field.
    /// Whole floats such as `100.0` are accepted for counts. A negative
    /// quantity is left for `into_request` to reject.
    ///
    /// # Errors
    ///
    /// `PayloadError::Rejected` for an unusable field value and
    /// `PayloadError::Malformed` when the text is not a JSON form at all.
    pub fn from_payload(payload: &str) -> Result<Self, PayloadError> {
        let mut value: serde_json::Value = serde_json::from_str(payload)?;
        if let Some(fields) = value.as_object_mut() {
            for (key, entry) in fields.iter_mut() {
                let Some(field) = InputField::from_key(key) else {
                    continue;
                };
                if !entry.is_null() {
                    *entry = numeric_entry(field, entry)?;
                }
            }
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Converts the form into a typed request.
    ///
    /// A missing required field, or a quantity that is zero or negative,
    /// yields `NoResult::InvalidInput` naming that field. Range checks on
    /// the remaining values are the validator's job.
    pub fn into_request(self) -> Result<JobRequest, NoResult> {
        let press_defaults = PressConstants::default();
        let ink_defaults = InkCalibration::default();
        let packaging_defaults = PackagingTable::default();

        let quantity = required(self.quantity, InputField::Quantity)?;
        let quantity = u64::try_from(quantity)
            .ok()
            .filter(|q| *q > 0)
            .ok_or(NoResult::InvalidInput { field: InputField::Quantity })?;

        Ok(JobRequest {
            sticker: StickerSpec {
                width_in: required(self.sticker_width_in, InputField::StickerWidth)?,
                height_in: required(self.sticker_height_in, InputField::StickerHeight)?,
            },
            quantity,
            roll: RollSpec {
                usable_width_in: required(self.usable_width_in, InputField::UsableWidth)?,
                spacing_in: required(self.spacing_in, InputField::Spacing)?,
                max_section_length_in: required(self.max_section_length_in, InputField::MaxSectionLength)?,
                roll_length_ft: required(self.roll_length_ft, InputField::RollLength)?,
                physical_width_in: self.physical_width_in,
            },
            press: PressConstants {
                gap_allowance_in: self.gap_allowance_in.unwrap_or(press_defaults.gap_allowance_in),
                leader_allowance_in: self.leader_allowance_in.unwrap_or(press_defaults.leader_allowance_in),
                seconds_per_section: self.seconds_per_section.unwrap_or(press_defaults.seconds_per_section),
            },
            costs: MaterialCostTable {
                material_cost_per_roll: required(self.material_cost_per_roll, InputField::MaterialCostPerRoll)?,
                laminate_cost_per_roll: required(self.laminate_cost_per_roll, InputField::LaminateCostPerRoll)?,
            },
            ink: InkCalibration {
                ml_per_sq_in: self.ink_ml_per_sq_in.unwrap_or(ink_defaults.ml_per_sq_in),
                cost_per_ml: self.ink_cost_per_ml.unwrap_or(ink_defaults.cost_per_ml),
                overhead_multiplier: self.ink_overhead_multiplier.unwrap_or(ink_defaults.overhead_multiplier),
            },
            packaging: PackagingTable {
                breakpoint_qty: self.packaging_breakpoint_qty.unwrap_or(packaging_defaults.breakpoint_qty),
                cost_below: self.packaging_cost_below.unwrap_or(packaging_defaults.cost_below),
                cost_at_or_above: self
                    .packaging_cost_at_or_above
                    .unwrap_or(packaging_defaults.cost_at_or_above),
            },
            promo_cost_per_job: self.promo_cost_per_job.unwrap_or(DEFAULT_PROMO_COST_PER_JOB),
            enabled_lines: self.enabled_cost_lines.unwrap_or_default(),
        })
    }
}

/// Normalizes one payload value to the JSON number its field deserializes from.
fn numeric_entry(field: InputField, entry: &serde_json::Value) -> Result<serde_json::Value, NoResult> {
    let rejected = NoResult::InvalidInput { field };
    let number = entry.as_f64().ok_or(rejected)?;
    if !field.is_count() || entry.is_u64() || (field == InputField::Quantity && entry.is_i64()) {
        return Ok(entry.clone());
    }

    let signed_ok = number >= 0.0 || field == InputField::Quantity;
    if number.fract() != 0.0 || number.abs() > MAX_EXACT_COUNT || !signed_ok {
        return Err(rejected);
    }
    // Whole and within the exactly representable range.
    #[allow(clippy::cast_possible_truncation)]
    let count = number as i64;
    Ok(serde_json::Value::from(count))
}

/// Largest count a float carries exactly (2^53).
const MAX_EXACT_COUNT: f64 = 9_007_199_254_740_992.0;

fn required<T>(value: Option<T>, field: InputField) -> Result<T, NoResult> {
    value.ok_or(NoResult::InvalidInput { field })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_form() -> JobForm {
        JobForm {
            sticker_width_in: Some(3.0),
            sticker_height_in: Some(3.0),
            quantity: Some(100),
            usable_width_in: Some(53.25),
            spacing_in: Some(0.125),
            max_section_length_in: Some(42.0),
            roll_length_ft: Some(150.0),
            material_cost_per_roll: Some(189.0),
            laminate_cost_per_roll: Some(128.0),
            ..JobForm::default()
        }
    }

    #[test]
    fn complete_form_converts_with_defaults() {
        let request = complete_form().into_request().unwrap();
        assert_eq!(request.quantity, 100);
        assert_eq!(request.press, PressConstants::default());
        assert_eq!(request.ink, InkCalibration::default());
        assert_eq!(request.packaging, PackagingTable::default());
        assert_eq!(request.enabled_lines, CostLineSet::standard());
    }

    #[test]
    fn missing_width_is_invalid_input() {
        let form = JobForm {
            sticker_width_in: None,
            ..complete_form()
        };
        assert_eq!(
            form.into_request(),
            Err(NoResult::InvalidInput { field: InputField::StickerWidth })
        );
    }

    #[test]
    fn non_positive_quantity_is_invalid_input() {
        for quantity in [0, -5] {
            let form = JobForm {
                quantity: Some(quantity),
                ..complete_form()
            };
            assert_eq!(
                form.into_request(),
                Err(NoResult::InvalidInput { field: InputField::Quantity })
            );
        }
    }

    #[test]
    fn payload_with_text_in_a_number_field_is_invalid_input() {
        let result = JobForm::from_payload(r#"{ "stickerWidthIn": "abc", "stickerHeightIn": 3 }"#);
        assert!(matches!(
            result,
            Err(PayloadError::Rejected(NoResult::InvalidInput { field: InputField::StickerWidth }))
        ));

        let result = JobForm::from_payload(r#"{ "rollLengthFt": true }"#);
        assert!(matches!(
            result,
            Err(PayloadError::Rejected(NoResult::InvalidInput { field: InputField::RollLength }))
        ));
    }

    #[test]
    fn fractional_counts_are_invalid_input() {
        let result = JobForm::from_payload(r#"{ "quantity": 2.5 }"#);
        assert!(matches!(
            result,
            Err(PayloadError::Rejected(NoResult::InvalidInput { field: InputField::Quantity }))
        ));

        let result = JobForm::from_payload(r#"{ "secondsPerSection": -1 }"#);
        assert!(matches!(
            result,
            Err(PayloadError::Rejected(NoResult::InvalidInput { field: InputField::SecondsPerSection }))
        ));
    }

    #[test]
    fn payload_accepts_whole_floats_and_nulls() {
        let form = JobForm::from_payload(
            r#"{ "quantity": 100.0, "packagingBreakpointQty": 300, "spacingIn": null, "stickerWidthIn": 2.5 }"#,
        )
        .unwrap();
        assert_eq!(form.quantity, Some(100));
        assert_eq!(form.packaging_breakpoint_qty, Some(300));
        assert_eq!(form.spacing_in, None);
        assert_eq!(form.sticker_width_in, Some(2.5));

        // negative quantities reach into_request, which names the field
        let form = JobForm::from_payload(r#"{ "quantity": -4 }"#).unwrap();
        assert_eq!(form.quantity, Some(-4));
    }

    #[test]
    fn malformed_payload_is_not_a_no_result() {
        assert!(matches!(JobForm::from_payload("{ nope"), Err(PayloadError::Malformed(_))));
        assert!(matches!(
            JobForm::from_payload(r#"{ "enabledCostLines": ["shipping"] }"#),
            Err(PayloadError::Malformed(_))
        ));
    }

    #[test]
    fn form_keys_match_field_keys() {
        let form = JobForm {
            physical_width_in: Some(54.0),
            gap_allowance_in: Some(4.0),
            leader_allowance_in: Some(4.0),
            ink_ml_per_sq_in: Some(0.0016),
            ink_cost_per_ml: Some(0.35),
            ink_overhead_multiplier: Some(1.2),
            seconds_per_section: Some(200),
            packaging_breakpoint_qty: Some(250),
            packaging_cost_below: Some(1.5),
            packaging_cost_at_or_above: Some(4.0),
            promo_cost_per_job: Some(0.75),
            ..complete_form()
        };
        let json = serde_json::to_value(&form).unwrap();
        for field in InputField::ALL {
            assert!(json.get(field.as_str()).is_some_and(|v| !v.is_null()), "{field}");
        }
    }

    #[test]
    fn override_fields_are_plain_values() {
        let form = JobForm {
            packaging_cost_below: Some(9.99),
            ..complete_form()
        };
        let request = form.into_request().unwrap();
        assert!((request.packaging.cost_below - 9.99).abs() < f64::EPSILON);
    }

    #[test]
    fn or_keeps_own_values_first() {
        let fallback = JobForm {
            quantity: Some(5),
            gap_allowance_in: Some(6.0),
            ..JobForm::default()
        };
        let merged = complete_form().or(fallback);
        assert_eq!(merged.quantity, Some(100));
        assert_eq!(merged.gap_allowance_in, Some(6.0));
    }

    #[test]
    fn packaging_step_function() {
        let table = PackagingTable {
            breakpoint_qty: 250,
            cost_below: 1.5,
            cost_at_or_above: 4.0,
        };
        assert!((table.cost_for(249) - 1.5).abs() < f64::EPSILON);
        assert!((table.cost_for(250) - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn ink_calibration_from_reference_job() {
        let ink = InkCalibration::from_reference_job(2_250.0, 3.6, 0.35).unwrap();
        assert!((ink.ml_per_sq_in - 0.0016).abs() < 1e-12);
        assert!(InkCalibration::from_reference_job(0.0, 3.6, 0.35).is_none());
    }

    #[test]
    fn cost_lines_parse_loosely() {
        assert_eq!(CostLine::from_str_loose(" Ink "), Some(CostLine::Ink));
        assert_eq!(CostLine::from_str_loose("substrate"), Some(CostLine::Material));
        assert_eq!(CostLine::from_str_loose("shipping"), None);
    }

    #[test]
    fn cost_line_set_serializes_as_list() {
        let lines = CostLineSet::none().with(CostLine::Ink).with(CostLine::Material);
        let json = serde_json::to_string(&lines).unwrap();
        assert_eq!(json, r#"["material","ink"]"#);
    }
}
