//! Payload validation
//!
//! Checks that serde cannot express: non-empty names, non-negative
//! quantities, sensible ranges.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Upper bound for set repetitions
pub const MAX_REPS: i64 = 10_000;

/// Upper bound for a workout's duration, in minutes
pub const MAX_DURATION_MINUTES: i64 = 24 * 60;

/// Upper bound for calorie and point counts
pub const MAX_COUNT: i64 = 100_000;

/// Upper bound for a profile's age
pub const MAX_AGE: i64 = 130;

/// One rejected field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Implemented by every incoming payload
pub trait Validate {
    /// What the payload describes, for rejection messages
    const SUBJECT: &'static str;

    fn validate(&self) -> Result<(), Vec<FieldError>>;
}

/// Accumulates field errors for one payload
#[derive(Debug, Default)]
pub(crate) struct Checker {
    errors: Vec<FieldError>,
}

impl Checker {
    pub fn non_empty(&mut self, field: &str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.errors.push(FieldError::new(field, "must not be empty"));
        }
        self
    }

    pub fn non_negative(&mut self, field: &str, value: Option<i64>) -> &mut Self {
        if matches!(value, Some(v) if v < 0) {
            self.errors.push(FieldError::new(field, "must not be negative"));
        }
        self
    }

    pub fn positive(&mut self, field: &str, value: Option<i64>) -> &mut Self {
        if matches!(value, Some(v) if v <= 0) {
            self.errors.push(FieldError::new(field, "must be greater than zero"));
        }
        self
    }

    pub fn non_negative_decimal(&mut self, field: &str, value: Option<Decimal>) -> &mut Self {
        if matches!(value, Some(v) if v.is_sign_negative() && !v.is_zero()) {
            self.errors.push(FieldError::new(field, "must not be negative"));
        }
        self
    }

    pub fn positive_decimal(&mut self, field: &str, value: Option<Decimal>) -> &mut Self {
        if matches!(value, Some(v) if v <= Decimal::ZERO) {
            self.errors.push(FieldError::new(field, "must be greater than zero"));
        }
        self
    }

    pub fn at_most(&mut self, field: &str, value: Option<i64>, max: i64) -> &mut Self {
        if matches!(value, Some(v) if v > max) {
            self.errors.push(FieldError::new(field, format!("must be {max} or less")));
        }
        self
    }

    /// Magnitude must fit a `decimal(precision, scale)` column
    pub fn fits_decimal(
        &mut self,
        field: &str,
        value: Option<Decimal>,
        precision: u32,
        scale: u32,
    ) -> &mut Self {
        let limit = Decimal::from(10_i64.pow(precision - scale));
        if matches!(value, Some(v) if v.abs() >= limit) {
            self.errors.push(FieldError::new(field, format!("must be less than {limit}")));
        }
        self
    }

    pub fn push(&mut self, error: FieldError) -> &mut Self {
        self.errors.push(error);
        self
    }

    pub fn finish(&mut self) -> Result<(), Vec<FieldError>> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(std::mem::take(&mut self.errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checker_collects_all_errors() {
        let result = Checker::default()
            .non_empty("name", "  ")
            .non_negative("duration", Some(-5))
            .positive_decimal("weight", Some(Decimal::ZERO))
            .finish();

        let errors = result.unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["name", "duration", "weight"]);
    }

    #[test]
    fn test_checker_bounds() {
        let errors = Checker::default()
            .at_most("reps", Some(10_001), 10_000)
            .at_most("duration", Some(60), 1440)
            .fits_decimal("weight", Some("10000".parse().unwrap()), 6, 2)
            .fits_decimal("height", Some("999.99".parse().unwrap()), 5, 2)
            .finish()
            .unwrap_err();

        assert_eq!(
            errors,
            vec![
                FieldError::new("reps", "must be 10000 or less"),
                FieldError::new("weight", "must be less than 10000"),
            ]
        );
    }

    #[test]
    fn test_checker_passes_clean_input() {
        assert!(Checker::default()
            .non_empty("name", "Squat")
            .non_negative("reps", None)
            .non_negative_decimal("fat", Some(Decimal::new(125, 1)))
            .finish()
            .is_ok());
    }
}
