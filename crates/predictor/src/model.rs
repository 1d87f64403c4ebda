//! Ordinary least squares fit of `amount = intercept + slope * day`.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ModelError {
    #[error("missing field: {0}")]
    Missing(&'static str),
    #[error("days and amounts differ in length ({days} vs {amounts})")]
    LengthMismatch { days: usize, amounts: usize },
    #[error("at least one data point is required")]
    Empty,
    #[error("input contains a non-finite number")]
    NonFinite,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearFit {
    pub intercept: f64,
    pub slope: f64,
}

impl LinearFit {
    pub fn fit(days: &[f64], amounts: &[f64]) -> Result<Self, ModelError> {
        if days.len() != amounts.len() {
            return Err(ModelError::LengthMismatch {
                days: days.len(),
                amounts: amounts.len(),
            });
        }
        if days.is_empty() {
            return Err(ModelError::Empty);
        }
        if days.iter().chain(amounts).any(|value| !value.is_finite()) {
            return Err(ModelError::NonFinite);
        }

        let n = days.len() as f64;
        let mean_x = days.iter().sum::<f64>() / n;
        let mean_y = amounts.iter().sum::<f64>() / n;

        let (sxy, sxx) = days
            .iter()
            .zip(amounts)
            .fold((0.0, 0.0), |(sxy, sxx), (x, y)| {
                let dx = x - mean_x;
                (sxy + dx * (y - mean_y), sxx + dx * dx)
            });

        // A single distinct day has no slope; the fit collapses to the mean.
        let slope = if sxx == 0.0 { 0.0 } else { sxy / sxx };
        Ok(Self {
            intercept: mean_y - slope * mean_x,
            slope,
        })
    }

    pub fn predict(&self, day: f64) -> f64 {
        self.intercept + self.slope * day
    }
}

/// Predicted amount for the day after the last observed one, rounded to cents.
pub fn forecast_next(days: &[f64], amounts: &[f64]) -> Result<f64, ModelError> {
    let fit = LinearFit::fit(days, amounts)?;
    let next_day = days.iter().copied().fold(f64::NEG_INFINITY, f64::max) + 1.0;
    Ok(round2(fit.predict(next_day)))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_line_extrapolates() {
        assert_eq!(forecast_next(&[0.0, 1.0, 2.0], &[10.0, 20.0, 30.0]), Ok(40.0));
    }

    #[test]
    fn noisy_points_use_least_squares() {
        // slope 0.5, intercept 7/6
        let value = forecast_next(&[0.0, 1.0, 2.0], &[1.0, 2.0, 2.0]).unwrap();
        assert_eq!(value, 2.67);
    }

    #[test]
    fn single_distinct_day_predicts_mean() {
        assert_eq!(forecast_next(&[5.0, 5.0], &[10.0, 30.0]), Ok(20.0));
        assert_eq!(forecast_next(&[0.0], &[12.344]), Ok(12.34));
    }

    #[test]
    fn bad_input_is_rejected() {
        assert_eq!(forecast_next(&[], &[]), Err(ModelError::Empty));
        assert_eq!(
            forecast_next(&[0.0, 1.0], &[1.0]),
            Err(ModelError::LengthMismatch { days: 2, amounts: 1 })
        );
        assert_eq!(
            forecast_next(&[0.0, f64::NAN], &[1.0, 2.0]),
            Err(ModelError::NonFinite)
        );
    }
}
