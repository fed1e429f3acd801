//! Roll Accounting
//!
//! Whole and partial roll counts for a total length. The roll length is a
//! catalog choice made by the caller; nothing here picks one.

use serde::{Deserialize, Serialize};

use crate::error::{InputField, NoResult};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollUsage {
    pub roll_length_ft: f64,
    pub rolls_needed: u64,
    pub full_rolls_used: u64,
    /// Feet consumed from the last, partially used roll.
    pub remaining_feet_on_last_roll: f64,
    /// Stock left on the last opened roll after the job.
    pub unused_feet_on_last_roll: f64,
}

impl RollUsage {
    /// # Errors
    ///
    /// `ConfigurationError` when the roll length is not positive, and
    /// `InvalidInput` when the total length is negative or not finite.
    pub fn account(total_length_feet: f64, roll_length_ft: f64) -> Result<Self, NoResult> {
        if !(roll_length_ft.is_finite() && roll_length_ft > 0.0) {
            return Err(NoResult::ConfigurationError { field: InputField::RollLength });
        }
        if !(total_length_feet.is_finite() && total_length_feet >= 0.0) {
            return Err(NoResult::InvalidInput { field: InputField::Quantity });
        }

        let rolls = total_length_feet / roll_length_ft;
        // Finite and non-negative after the guards above.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let (rolls_needed, full_rolls_used) = (rolls.ceil() as u64, rolls.floor() as u64);
        #[allow(clippy::cast_precision_loss)]
        let (opened_ft, full_ft) = (
            rolls_needed as f64 * roll_length_ft,
            full_rolls_used as f64 * roll_length_ft,
        );

        Ok(Self {
            roll_length_ft,
            rolls_needed,
            full_rolls_used,
            remaining_feet_on_last_roll: total_length_feet - full_ft,
            unused_feet_on_last_roll: opened_ft - total_length_feet,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_foot_over_a_roll_needs_two() {
        let usage = RollUsage::account(151.0, 150.0).unwrap();
        assert_eq!(usage.rolls_needed, 2);
        assert_eq!(usage.full_rolls_used, 1);
        assert!((usage.remaining_feet_on_last_roll - 1.0).abs() < 1e-9);
        assert!((usage.unused_feet_on_last_roll - 149.0).abs() < 1e-9);
    }

    #[test]
    fn exactly_one_roll() {
        let usage = RollUsage::account(150.0, 150.0).unwrap();
        assert_eq!(usage.rolls_needed, 1);
        assert_eq!(usage.full_rolls_used, 1);
        assert!(usage.remaining_feet_on_last_roll.abs() < 1e-9);
        assert!(usage.unused_feet_on_last_roll.abs() < 1e-9);
    }

    #[test]
    fn short_job_opens_one_roll() {
        let usage = RollUsage::account(2.5, 150.0).unwrap();
        assert_eq!(usage.rolls_needed, 1);
        assert_eq!(usage.full_rolls_used, 0);
        assert!((usage.remaining_feet_on_last_roll - 2.5).abs() < 1e-9);
    }

    #[test]
    fn zero_roll_length_is_rejected() {
        assert_eq!(
            RollUsage::account(10.0, 0.0),
            Err(NoResult::ConfigurationError { field: InputField::RollLength })
        );
        assert!(RollUsage::account(10.0, -150.0).is_err());
    }
}
