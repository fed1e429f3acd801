//! Material Length Calculator
//!
//! Turns a packed layout into linear roll consumption. The total is computed
//! once here; every downstream figure (rolls, material and laminate cost)
//! reads `total_length_feet` from this struct rather than re-deriving it.

use serde::{Deserialize, Serialize};

use crate::input::{PressConstants, RollSpec, StickerSpec};
use crate::packing::PackingLayout;

const INCHES_PER_FOOT: f64 = 12.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialUsage {
    pub full_section_length_in: f64,
    pub final_rows: u64,
    /// Length of the trailing partial section, 0 when there is none.
    pub final_section_length_in: f64,
    pub gaps: u64,
    pub gap_length_in: f64,
    pub leader_allowance_in: f64,
    pub total_length_inches: f64,
    /// Exact, never rounded.
    pub total_length_feet: f64,
}

impl MaterialUsage {
    pub fn measure(
        layout: &PackingLayout,
        sticker: &StickerSpec,
        roll: &RollSpec,
        press: &PressConstants,
    ) -> Self {
        let full_section_length_in = run_length(layout.rows_per_section, sticker.height_in, roll.spacing_in);

        let final_rows = layout.final_rows();
        let final_section_length_in = run_length(final_rows, sticker.height_in, roll.spacing_in);

        let gaps = layout.sections_needed.saturating_sub(1);
        #[allow(clippy::cast_precision_loss)]
        let gap_length_in = gaps as f64 * press.gap_allowance_in;

        #[allow(clippy::cast_precision_loss)]
        let base_length_in =
            layout.full_sections as f64 * full_section_length_in + final_section_length_in + gap_length_in;
        let total_length_inches = base_length_in + press.leader_allowance_in;

        tracing::trace!(
            full_section_length_in,
            final_section_length_in,
            gaps,
            total_length_inches,
            "measured material length"
        );

        Self {
            full_section_length_in,
            final_rows,
            final_section_length_in,
            gaps,
            gap_length_in,
            leader_allowance_in: press.leader_allowance_in,
            total_length_inches,
            total_length_feet: total_length_inches / INCHES_PER_FOOT,
        }
    }

    /// Printed length excluding gaps and leader.
    pub fn printed_length_in(&self) -> f64 {
        self.total_length_inches - self.gap_length_in - self.leader_allowance_in
    }
}

/// Length of `rows` rows of height `height` with `spacing` between neighbours.
#[allow(clippy::cast_precision_loss)]
fn run_length(rows: u64, height: f64, spacing: f64) -> f64 {
    if rows == 0 {
        return 0.0;
    }
    rows as f64 * height + (rows - 1) as f64 * spacing
}
