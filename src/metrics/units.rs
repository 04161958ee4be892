//! Body measurement conversion constants

use crate::models::{HeightUnit, WeightUnit};

/// Kilograms per pound
pub const KG_PER_LB: f64 = 0.453592;
/// Meters per inch
pub const M_PER_INCH: f64 = 0.0254;
/// Centimeters per inch
pub const CM_PER_INCH: f64 = 2.54;

/// Convert a body weight to kilograms
pub fn weight_to_kg(weight: f64, unit: WeightUnit) -> f64 {
    match unit {
        WeightUnit::Lbs => weight * KG_PER_LB,
        WeightUnit::Kg => weight,
    }
}

/// Convert a height to meters
pub fn height_to_m(height: f64, unit: HeightUnit) -> f64 {
    match unit {
        HeightUnit::Inches => height * M_PER_INCH,
        HeightUnit::Cm => height / 100.0,
    }
}

/// Convert a height to centimeters
pub fn height_to_cm(height: f64, unit: HeightUnit) -> f64 {
    match unit {
        HeightUnit::Inches => height * CM_PER_INCH,
        HeightUnit::Cm => height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weight_to_kg() {
        assert!((weight_to_kg(100.0, WeightUnit::Lbs) - 45.3592).abs() < 1e-9);
        assert_eq!(weight_to_kg(80.0, WeightUnit::Kg), 80.0);
    }

    #[test]
    fn test_height_conversions_agree() {
        let inches = 70.0;
        let cm = inches * CM_PER_INCH;
        assert!((height_to_m(inches, HeightUnit::Inches) - height_to_m(cm, HeightUnit::Cm)).abs() < 1e-9);
        assert!((height_to_cm(inches, HeightUnit::Inches) - 177.8).abs() < 1e-9);
    }
}
