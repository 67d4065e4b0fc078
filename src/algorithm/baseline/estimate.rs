//! Estimated baselines for encounters without a prior value
//!
//! Both estimates back-calculate creatinine from an age-normative eGFR:
//! the height-dependent one with the bedside Schwartz constant, the
//! height-independent one with a sex-specific height-for-age polynomial.

use crate::models::encounter::Sex;

/// Bedside Schwartz constant (mL/min/1.73m² per cm, mg/dL)
pub const HEIGHT_DEPENDENT_CONSTANT: f64 = 0.41;

/// Numerator constant of the height-independent estimate
pub const HEIGHT_INDEPENDENT_CONSTANT: f64 = 107.3;

const MALE_COEFFICIENTS: [f64; 5] = [0.21, 0.057, -0.0075, 0.00064, -0.000016];
const FEMALE_COEFFICIENTS: [f64; 5] = [0.23, 0.034, -0.0018, 0.00017, -0.0000051];

/// `0.41 · height / eGFR`
#[must_use]
pub fn height_dependent_baseline(height_cm: f64, egfr: f64) -> f64 {
    HEIGHT_DEPENDENT_CONSTANT * height_cm / egfr
}

/// Sex-specific quartic `Q(age)`; `None` for unsupported sex
#[must_use]
pub fn height_polynomial(sex: Sex, age_years: f64) -> Option<f64> {
    let coefficients = match sex {
        Sex::Male => &MALE_COEFFICIENTS,
        Sex::Female => &FEMALE_COEFFICIENTS,
        Sex::Unknown => return None,
    };
    // Horner, highest degree first
    Some(
        coefficients
            .iter()
            .rev()
            .fold(0.0, |acc, coefficient| acc * age_years + coefficient),
    )
}

/// `107.3 · Q(age) / eGFR`; `None` for unsupported sex
#[must_use]
pub fn height_independent_baseline(sex: Sex, age_years: f64, egfr: f64) -> Option<f64> {
    height_polynomial(sex, age_years).map(|q| HEIGHT_INDEPENDENT_CONSTANT * q / egfr)
}
