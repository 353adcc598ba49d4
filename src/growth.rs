//! Pure interest projection math.
//!
//! Deterministic and side-effect free: any finite inputs are accepted and
//! produce mathematically consistent output. Callers sanitize user input.

use serde::{Deserialize, Serialize};

/// Projected value of a principal at a single year mark.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GrowthPoint {
    pub year: u32,
    pub simple: f64,
    pub compound: f64,
}

/// Linear growth: `principal * (1 + rate/100 * years)`.
pub fn simple_growth(principal: f64, rate_percent: f64, years: f64) -> f64 {
    principal * (1.0 + (rate_percent / 100.0) * years)
}

/// Exponential growth: `principal * (1 + rate/100) ^ years`.
pub fn compound_growth(principal: f64, rate_percent: f64, years: f64) -> f64 {
    principal * (1.0 + rate_percent / 100.0).powf(years)
}

/// Builds one point per integer year from 0 through `years` inclusive,
/// so the result always has `years + 1` entries.
pub fn build_series(principal: f64, rate_percent: f64, years: u32) -> Vec<GrowthPoint> {
    (0..=years)
        .map(|year| GrowthPoint {
            year,
            simple: simple_growth(principal, rate_percent, f64::from(year)),
            compound: compound_growth(principal, rate_percent, f64::from(year)),
        })
        .collect()
}
