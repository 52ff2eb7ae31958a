//! Rendering of estimates.
//!
//! Text output is the two-line form shown to end users:
//!
//! ```text
//! Predicted Price COP 500,000,000.00
//! Predicted Price Range (-10% to +10%): COP 450,000,000.00 - COP 550,000,000.00
//! ```

use crate::config::DEFAULT_BAND_RATIO;
use crate::predictor::Estimate;
use serde::Serialize;
use serde_json::{json, Value};
use std::fmt::Display;

/// A point estimate with its price band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PredictionResult {
    pub point_estimate: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
}

impl PredictionResult {
    /// Build a result with the default ±10% band.
    pub fn from_point(point: f64) -> Self {
        Self::with_ratio(point, DEFAULT_BAND_RATIO)
    }

    /// Build a result with a band of `ratio` on each side.
    pub fn with_ratio(point: f64, ratio: f64) -> Self {
        Self {
            point_estimate: point,
            lower_bound: point * (1.0 - ratio),
            upper_bound: point * (1.0 + ratio),
        }
    }
}

/// Format an amount with thousands separators and two decimals.
///
/// ```
/// use tasador_serving::presenter::format_amount;
///
/// assert_eq!(format_amount(500_000_000.0), "500,000,000.00");
/// assert_eq!(format_amount(-1234.5), "-1,234.50");
/// ```
pub fn format_amount(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut out = String::with_capacity(fixed.len() + int_part.len() / 3 + 1);
    if value < 0.0 && fixed.bytes().any(|b| b.is_ascii_digit() && b != b'0') {
        out.push('-');
    }
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out.push('.');
    out.push_str(frac_part);
    out
}

fn percent_label(ratio: f64) -> String {
    let pct = (ratio * 100.0 * 1000.0).round() / 1000.0;
    format!("(-{pct}% to +{pct}%)")
}

/// Renders estimates and failures for people and machines.
#[derive(Debug, Clone)]
pub struct Presenter {
    currency: String,
    band_ratio: f64,
}

impl Default for Presenter {
    fn default() -> Self {
        Self::new("COP", DEFAULT_BAND_RATIO)
    }
}

impl Presenter {
    /// Create a presenter for `currency` and a band of `band_ratio`.
    pub fn new(currency: impl Into<String>, band_ratio: f64) -> Self {
        Self {
            currency: currency.into(),
            band_ratio,
        }
    }

    /// Returns the currency label.
    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Render the two-line text form.
    pub fn render_text(&self, result: &PredictionResult) -> String {
        let c = &self.currency;
        format!(
            "Predicted Price {c} {}\nPredicted Price Range {}: {c} {} - {c} {}",
            format_amount(result.point_estimate),
            percent_label(self.band_ratio),
            format_amount(result.lower_bound),
            format_amount(result.upper_bound),
        )
    }

    /// Render an estimate as a JSON document.
    pub fn render_json(&self, estimate: &Estimate) -> Value {
        json!({
            "currency": self.currency,
            "band_ratio": self.band_ratio,
            "point_estimate": estimate.result.point_estimate,
            "lower_bound": estimate.result.lower_bound,
            "upper_bound": estimate.result.upper_bound,
            "model_version": estimate.model_version,
            "unseen": estimate.unseen,
        })
    }

    /// Render a failure.
    pub fn render_error(&self, err: &dyn Display) -> String {
        format!("Error in making prediction: {err}")
    }
}
