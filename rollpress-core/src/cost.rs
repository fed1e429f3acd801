//! Cost Estimator
//!
//! Prices each line of a job independently. A line's value does not depend
//! on whether it is enabled; enabling only decides what counts toward the
//! total, so a caller can show a disabled line without recomputing.

use serde::{Deserialize, Serialize};

use crate::error::{InputField, NoResult};
use crate::input::{CostLine, CostLineSet, JobRequest};
use crate::material::MaterialUsage;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub value: f64,
    pub enabled: bool,
}

impl LineItem {
    /// The value when enabled, otherwise 0.
    pub fn contribution(&self) -> f64 {
        if self.enabled { self.value } else { 0.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostBreakdown {
    pub material: LineItem,
    pub laminate: LineItem,
    pub ink: LineItem,
    pub ink_volume_ml: f64,
    pub packaging: LineItem,
    pub promo: LineItem,
    pub total_cost: f64,
    pub cost_per_unit: f64,
    /// Units the per-unit figure is divided by (the requested quantity).
    pub quantity: u64,
}

impl CostBreakdown {
    /// # Errors
    ///
    /// `ConfigurationError` for a non-positive roll length, `InvalidInput`
    /// for a zero quantity. Both guard a division.
    pub fn estimate(request: &JobRequest, material: &MaterialUsage) -> Result<Self, NoResult> {
        let roll_length_ft = request.roll.roll_length_ft;
        if !(roll_length_ft.is_finite() && roll_length_ft > 0.0) {
            return Err(NoResult::ConfigurationError { field: InputField::RollLength });
        }
        if request.quantity == 0 {
            return Err(NoResult::InvalidInput { field: InputField::Quantity });
        }

        let lines = &request.enabled_lines;
        let feet = material.total_length_feet;

        let material_cost = feet * (request.costs.material_cost_per_roll / roll_length_ft);
        let laminate_cost = feet * (request.costs.laminate_cost_per_roll / roll_length_ft);

        #[allow(clippy::cast_precision_loss)]
        let ink_volume_ml = request.sticker.area_sq_in() * request.quantity as f64 * request.ink.ml_per_sq_in;
        let ink_cost = ink_volume_ml * request.ink.cost_per_ml * request.ink.overhead_multiplier;

        let packaging_cost = request.packaging.cost_for(request.quantity);

        let line = |kind: CostLine, value: f64| LineItem {
            value,
            enabled: lines.contains(kind),
        };

        let breakdown = Self::from_lines(
            line(CostLine::Material, material_cost),
            line(CostLine::Laminate, laminate_cost),
            line(CostLine::Ink, ink_cost),
            ink_volume_ml,
            line(CostLine::Packaging, packaging_cost),
            line(CostLine::Promo, request.promo_cost_per_job),
            request.quantity,
        );

        tracing::trace!(
            total_cost = breakdown.total_cost,
            cost_per_unit = breakdown.cost_per_unit,
            "priced job"
        );

        Ok(breakdown)
    }

    fn from_lines(
        material: LineItem,
        laminate: LineItem,
        ink: LineItem,
        ink_volume_ml: f64,
        packaging: LineItem,
        promo: LineItem,
        quantity: u64,
    ) -> Self {
        let total_cost = [material, laminate, ink, packaging, promo]
            .iter()
            .map(LineItem::contribution)
            .sum::<f64>();
        #[allow(clippy::cast_precision_loss)]
        let cost_per_unit = if quantity == 0 { 0.0 } else { total_cost / quantity as f64 };

        Self {
            material,
            laminate,
            ink,
            ink_volume_ml,
            packaging,
            promo,
            total_cost,
            cost_per_unit,
            quantity,
        }
    }

    pub fn line(&self, kind: CostLine) -> &LineItem {
        match kind {
            CostLine::Material => &self.material,
            CostLine::Laminate => &self.laminate,
            CostLine::Ink => &self.ink,
            CostLine::Packaging => &self.packaging,
            CostLine::Promo => &self.promo,
        }
    }

    /// Re-totals the same line values under a different selection.
    #[must_use]
    pub fn with_enabled(&self, lines: &CostLineSet) -> Self {
        let toggle = |kind: CostLine| LineItem {
            value: self.line(kind).value,
            enabled: lines.contains(kind),
        };
        Self::from_lines(
            toggle(CostLine::Material),
            toggle(CostLine::Laminate),
            toggle(CostLine::Ink),
            self.ink_volume_ml,
            toggle(CostLine::Packaging),
            toggle(CostLine::Promo),
            self.quantity,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{MaterialCostTable, RollSpec, StickerSpec};
    use crate::packing::PackingLayout;

    const EPS: f64 = 1e-9;

    fn request(quantity: u64) -> JobRequest {
        JobRequest::new(
            StickerSpec::new(3.0, 3.0),
            quantity,
            RollSpec {
                usable_width_in: 53.25,
                spacing_in: 0.125,
                max_section_length_in: 42.0,
                roll_length_ft: 150.0,
                physical_width_in: None,
            },
            MaterialCostTable {
                material_cost_per_roll: 150.0,
                laminate_cost_per_roll: 75.0,
            },
        )
    }

    fn priced(request: &JobRequest) -> (MaterialUsage, CostBreakdown) {
        let layout = PackingLayout::pack(&request.sticker, &request.roll, request.quantity).unwrap();
        let usage = MaterialUsage::measure(&layout, &request.sticker, &request.roll, &request.press);
        let cost = CostBreakdown::estimate(request, &usage).unwrap();
        (usage, cost)
    }

    #[test]
    fn material_and_laminate_are_priced_per_foot() {
        let (usage, cost) = priced(&request(100));
        // $1.00 per foot of substrate, $0.50 per foot of laminate
        assert!((cost.material.value - usage.total_length_feet).abs() < EPS);
        assert!((cost.laminate.value - usage.total_length_feet / 2.0).abs() < EPS);
    }

    #[test]
    fn ink_overhead_is_applied_separately() {
        let (_, cost) = priced(&request(250));
        // 2250 sq in at 0.0016 ml/sq in
        assert!((cost.ink_volume_ml - 3.6).abs() < EPS);
        assert!((cost.ink.value - 3.6 * 0.35 * 1.2).abs() < EPS);
    }

    #[test]
    fn packaging_follows_the_breakpoint() {
        let (_, below) = priced(&request(249));
        let (_, at) = priced(&request(250));
        assert!((below.packaging.value - 1.5).abs() < EPS);
        assert!((at.packaging.value - 4.0).abs() < EPS);
    }

    #[test]
    fn promo_is_opt_in() {
        let req = request(100);
        let (_, cost) = priced(&req);
        assert!(!cost.promo.enabled);
        assert!((cost.promo.value - 0.75).abs() < EPS);

        let (_, with_promo) = priced(&req.with_enabled_lines(CostLineSet::all()));
        assert!((with_promo.total_cost - cost.total_cost - 0.75).abs() < EPS);
    }

    #[test]
    fn total_is_sum_of_enabled_lines() {
        let (_, cost) = priced(&request(100));
        let expected = cost.material.value + cost.laminate.value + cost.ink.value + cost.packaging.value;
        assert!((cost.total_cost - expected).abs() < EPS);
        assert!((cost.cost_per_unit - expected / 100.0).abs() < EPS);
    }

    #[test]
    fn disabling_a_line_keeps_its_value() {
        let (_, cost) = priced(&request(100));
        let without_ink = cost.with_enabled(&CostLineSet::standard().without(CostLine::Ink));
        assert!(!without_ink.ink.enabled);
        assert!((without_ink.ink.value - cost.ink.value).abs() < EPS);
        assert!((cost.total_cost - without_ink.total_cost - cost.ink.value).abs() < EPS);
        assert!(without_ink.cost_per_unit < cost.cost_per_unit);
    }

    #[test]
    fn nothing_enabled_totals_zero() {
        let (_, cost) = priced(&request(100).with_enabled_lines(CostLineSet::none()));
        assert!(cost.total_cost.abs() < EPS);
        assert!(cost.material.value > 0.0);
    }
}
