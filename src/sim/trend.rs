//! Weight trend over the observation log using linear regression (linfa)

use chrono::{DateTime, Utc};
use linfa::prelude::*;
use linfa_linear::LinearRegression;
use ndarray::{Array1, Array2};

use crate::db::Observation;

/// Minimum data points required for a fit
const MIN_DATA_POINTS: usize = 3;

const SECS_PER_DAY: f64 = 86_400.0;

/// Straight-line fit of weight against days since the first observation
pub struct WeightTrend {
    slope: f64,
    intercept: f64,
    r2_score: f64,
    data_points: usize,
    first_date: DateTime<Utc>,
    last_date: DateTime<Utc>,
}

impl WeightTrend {
    /// Fit a trend; `None` with too few points or all points on one instant
    pub fn fit(observations: &[Observation]) -> Option<Self> {
        if observations.len() < MIN_DATA_POINTS {
            return None;
        }

        let first_date = observations.iter().map(|o| o.date).min()?;
        let last_date = observations.iter().map(|o| o.date).max()?;
        if first_date == last_date {
            return None;
        }

        // X = days since first observation, Y = weight
        let x_data: Vec<f64> = observations
            .iter()
            .map(|o| (o.date - first_date).num_seconds() as f64 / SECS_PER_DAY)
            .collect();
        let y_data: Vec<f64> = observations.iter().map(|o| o.weight_kg).collect();
        let n_samples = x_data.len();

        let records = Array2::from_shape_vec((n_samples, 1), x_data).ok()?;
        let targets = Array1::from_vec(y_data);
        let dataset = Dataset::new(records, targets);

        let model = LinearRegression::default().fit(&dataset).ok()?;
        let slope = model.params()[0];
        let intercept = model.intercept();

        let predictions = model.predict(&dataset);
        let r2_score = predictions.r2(&dataset).unwrap_or(0.0);

        Some(Self {
            slope,
            intercept,
            r2_score,
            data_points: n_samples,
            first_date,
            last_date,
        })
    }

    /// Weight change per simulated day
    pub fn kg_per_day(&self) -> f64 {
        self.slope
    }

    /// Model fit quality, 0-1
    pub fn r2_score(&self) -> f64 {
        self.r2_score
    }

    pub fn data_points(&self) -> usize {
        self.data_points
    }

    /// Fitted weight `days_ahead` days after the latest observation
    pub fn weight_after(&self, days_ahead: f64) -> f64 {
        let offset = (self.last_date - self.first_date).num_seconds() as f64 / SECS_PER_DAY;
        self.slope * (offset + days_ahead) + self.intercept
    }

    pub fn format(&self) -> String {
        let sign = if self.slope >= 0.0 { "+" } else { "" };
        format!(
            "Trend: {}{:.3} kg/day over {} points (R2 {:.2})\nIn 30 days: ~{:.1} kg",
            sign,
            self.slope,
            self.data_points,
            self.r2_score,
            self.weight_after(30.0)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn obs(days: i64, weight: f64) -> Observation {
        Observation {
            id: None,
            member_id: 1,
            date: Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap() + Duration::days(days),
            weight_kg: weight,
            bmi: None,
        }
    }

    #[test]
    fn test_trend_insufficient_data() {
        assert!(WeightTrend::fit(&[obs(0, 80.0), obs(7, 79.0)]).is_none());
    }

    #[test]
    fn test_trend_same_instant() {
        assert!(WeightTrend::fit(&[obs(0, 80.0), obs(0, 79.0), obs(0, 78.0)]).is_none());
    }

    #[test]
    fn test_trend_linear_loss() {
        let log = vec![obs(0, 80.0), obs(10, 79.0), obs(20, 78.0)];
        let trend = WeightTrend::fit(&log).unwrap();

        assert!((trend.kg_per_day() + 0.1).abs() < 1e-6, "slope {}", trend.kg_per_day());
        assert!(trend.r2_score() > 0.99, "R2 {}", trend.r2_score());
        assert_eq!(trend.data_points(), 3);
        assert!((trend.weight_after(10.0) - 77.0).abs() < 1e-6);
    }

    #[test]
    fn test_trend_format() {
        let log = vec![obs(0, 60.0), obs(7, 61.0), obs(14, 62.0)];
        let text = WeightTrend::fit(&log).unwrap().format();
        assert!(text.contains("Trend: +"), "{}", text);
        assert!(text.contains("In 30 days"), "{}", text);
    }
}
