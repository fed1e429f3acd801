//! Row/Section Packer
//!
//! Lays uniform stickers out in a row/column grid across the roll. A row
//! spans the usable width; a section is a run of rows up to the press's
//! maximum single-pass length. Rows are never partially printed: once a row
//! is started it fills to `stickers_per_row`, so a job smaller than one row
//! still consumes a full row.

use serde::{Deserialize, Serialize};

use crate::error::{InputField, NoResult, PackingFactor};
use crate::input::{RollSpec, StickerSpec};

/// Quotients this close to an integer are treated as that integer.
const CAPACITY_SNAP: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackingLayout {
    pub stickers_per_row: u64,
    pub rows_per_section: u64,
    pub stickers_per_section: u64,
    pub full_sections: u64,
    /// Stickers left over after the full sections.
    pub remainder: u64,
    pub sections_needed: u64,
    pub total_rows: u64,
    pub actual_units_printed: u64,
}

impl PackingLayout {
    /// Packs `quantity` stickers onto the roll.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for a zero quantity, `UnsatisfiablePacking` when a
    /// single sticker does not fit across the roll or within one section.
    pub fn pack(sticker: &StickerSpec, roll: &RollSpec, quantity: u64) -> Result<Self, NoResult> {
        if quantity == 0 {
            return Err(NoResult::InvalidInput { field: InputField::Quantity });
        }

        let stickers_per_row = capacity(roll.usable_width_in, sticker.width_in, roll.spacing_in);
        if stickers_per_row == 0 {
            return Err(NoResult::UnsatisfiablePacking { factor: PackingFactor::RowCapacity });
        }

        let rows_per_section = capacity(roll.max_section_length_in, sticker.height_in, roll.spacing_in);
        if rows_per_section == 0 {
            return Err(NoResult::UnsatisfiablePacking { factor: PackingFactor::SectionCapacity });
        }

        let stickers_per_section = stickers_per_row.saturating_mul(rows_per_section);
        let full_sections = quantity / stickers_per_section;
        let remainder = quantity % stickers_per_section;
        let sections_needed = full_sections + u64::from(remainder > 0);
        let total_rows = quantity.div_ceil(stickers_per_row);

        let layout = Self {
            stickers_per_row,
            rows_per_section,
            stickers_per_section,
            full_sections,
            remainder,
            sections_needed,
            total_rows,
            actual_units_printed: total_rows.saturating_mul(stickers_per_row),
        };

        tracing::trace!(
            stickers_per_row,
            rows_per_section,
            sections_needed,
            total_rows,
            "packed layout"
        );

        Ok(layout)
    }

    /// Rows in the trailing partial section, 0 when the quantity fills whole sections.
    pub fn final_rows(&self) -> u64 {
        self.remainder.div_ceil(self.stickers_per_row)
    }

    /// Stickers printed beyond the requested quantity.
    pub fn overage(&self, quantity: u64) -> u64 {
        self.actual_units_printed.saturating_sub(quantity)
    }
}

/// How many items of size `item` fit along `extent` with `spacing` between them.
///
/// `floor((extent + spacing) / (item + spacing))`, returning 0 for any
/// non-positive or non-finite denominator.
pub fn capacity(extent: f64, item: f64, spacing: f64) -> u64 {
    let pitch = item + spacing;
    if !(pitch.is_finite() && pitch > 0.0) {
        return 0;
    }
    let quotient = (extent + spacing) / pitch;
    if !(quotient.is_finite() && quotient > 0.0) {
        return 0;
    }
    let nearest = quotient.round();
    let snapped = if (quotient - nearest).abs() < CAPACITY_SNAP { nearest } else { quotient.floor() };
    // Finite and positive; `as` saturates anything beyond u64::MAX.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let count = snapped as u64;
    count
}
