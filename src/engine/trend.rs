//! Progression trend using linear regression (linfa)

use chrono::NaiveDate;
use linfa::prelude::*;
use linfa_linear::LinearRegression;
use ndarray::{Array1, Array2};
use serde::Serialize;

use super::records::ProgressionPoint;

/// Minimum data points required for fitting
const MIN_DATA_POINTS: usize = 3;

/// Linear fit of a progression series: value against days since the first point
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressionTrend {
    /// Change of the charted metric per day
    pub slope_per_day: f64,
    pub intercept: f64,
    pub r2: f64,
    pub data_points: usize,
    pub first_period: NaiveDate,
    pub last_period: NaiveDate,
}

impl ProgressionTrend {
    /// Fit a trend; None with fewer than 3 points or a degenerate series
    pub fn fit(series: &[ProgressionPoint]) -> Option<Self> {
        if series.len() < MIN_DATA_POINTS {
            return None;
        }

        let first_period = series.iter().map(|p| p.period_start).min()?;
        let last_period = series.iter().map(|p| p.period_start).max()?;

        // All points in one bucket: no time axis to fit against
        if first_period == last_period {
            return None;
        }

        let x_data: Vec<f64> = series
            .iter()
            .map(|p| (p.period_start - first_period).num_days() as f64)
            .collect();
        let y_data: Vec<f64> = series.iter().map(|p| p.value).collect();
        let n_samples = x_data.len();

        let records = Array2::from_shape_vec((n_samples, 1), x_data).ok()?;
        let targets = Array1::from_vec(y_data);
        let dataset = Dataset::new(records, targets);

        let model = LinearRegression::default().fit(&dataset).ok()?;

        let slope = model.params()[0];
        let intercept = model.intercept();

        let predictions = model.predict(&dataset);
        let r2 = predictions.r2(&dataset).unwrap_or(0.0);

        Some(Self {
            slope_per_day: slope,
            intercept,
            r2: if r2.is_finite() { r2 } else { 0.0 },
            data_points: n_samples,
            first_period,
            last_period,
        })
    }

    /// Projected value `days_ahead` after the last charted period
    pub fn projected_value(&self, days_ahead: i64) -> f64 {
        let day = (self.last_period - self.first_period).num_days() + days_ahead;
        self.slope_per_day * day as f64 + self.intercept
    }

    pub fn is_improving(&self) -> bool {
        self.slope_per_day > 0.0
    }
}
