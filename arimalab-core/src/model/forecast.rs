//! Multi-step forecasts with Gaussian prediction intervals.
//!
//! Point forecasts run the ARMA recursion forward on the differenced scale
//! with future innovations set to zero, then integrate back. The forecast
//! variance at horizon h is `sigma2 * sum(psi_j^2, j < h)` where the psi
//! weights come from the AR polynomial multiplied by `(1 - B)^d`, so
//! intervals widen with the horizon for integrated models.

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};

use super::arima::ArimaFit;
use super::diff::integrate;
use super::error::ModelError;

/// Interval coverage levels reported by default, in percent.
pub const DEFAULT_LEVELS: [f64; 2] = [80.0, 95.0];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionInterval {
    /// Nominal coverage in percent.
    pub level: f64,
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub mean: Vec<f64>,
    /// Standard deviation of the forecast error at each step.
    pub std_errors: Vec<f64>,
    pub intervals: Vec<PredictionInterval>,
}

impl Forecast {
    pub fn horizon(&self) -> usize {
        self.mean.len()
    }

    pub fn interval(&self, level: f64) -> Option<&PredictionInterval> {
        self.intervals
            .iter()
            .find(|pi| (pi.level - level).abs() < 1e-9)
    }
}

/// MA(infinity) weights psi_0..psi_{horizon-1} of an ARIMA model.
pub fn psi_weights(ar: &[f64], ma: &[f64], d: usize, horizon: usize) -> Vec<f64> {
    // phi(B) (1 - B)^d as polynomial coefficients, constant term first
    let mut poly: Vec<f64> = std::iter::once(1.0).chain(ar.iter().map(|a| -a)).collect();
    for _ in 0..d {
        let mut next = vec![0.0; poly.len() + 1];
        for (i, c) in poly.iter().enumerate() {
            next[i] += c;
            next[i + 1] -= c;
        }
        poly = next;
    }
    let phi_star: Vec<f64> = poly[1..].iter().map(|c| -c).collect();

    let mut psi = Vec::with_capacity(horizon);
    for j in 0..horizon {
        if j == 0 {
            psi.push(1.0);
            continue;
        }
        let mut value = ma.get(j - 1).copied().unwrap_or(0.0);
        for (k, phi) in phi_star.iter().enumerate().take(j) {
            value += phi * psi[j - k - 1];
        }
        psi.push(value);
    }
    psi
}

fn validate_level(level: f64) -> Result<(), ModelError> {
    if level.is_finite() && level > 0.0 && level < 100.0 {
        Ok(())
    } else {
        Err(ModelError::InvalidLevel(level))
    }
}

impl ArimaFit {
    /// Forecast `horizon` steps past the end of the training series.
    pub fn forecast(&self, horizon: usize, levels: &[f64]) -> Result<Forecast, ModelError> {
        if horizon == 0 {
            return Err(ModelError::InvalidHorizon);
        }
        for &level in levels {
            validate_level(level)?;
        }

        let d = self.spec().order.d;
        let mu = self.constant.unwrap_or(0.0);
        let m = self.diffed.len();

        let mut w = self.diffed.clone();
        let mut e = self.innovations.clone();
        for _ in 0..horizon {
            let t = w.len();
            let mut pred = mu;
            for (i, phi) in self.ar.iter().enumerate() {
                if let Some(idx) = t.checked_sub(i + 1) {
                    pred += phi * (w[idx] - mu);
                }
            }
            for (j, theta) in self.ma.iter().enumerate() {
                if let Some(idx) = t.checked_sub(j + 1) {
                    pred += theta * e[idx];
                }
            }
            w.push(pred);
            e.push(0.0);
        }
        let mean = integrate(&w[m..], &self.history, d);

        let psi = psi_weights(&self.ar, &self.ma, d, horizon);
        let mut cumulative = 0.0;
        let std_errors: Vec<f64> = psi
            .iter()
            .map(|p| {
                cumulative += p * p;
                (self.sigma2 * cumulative).sqrt()
            })
            .collect();

        let normal = Normal::new(0.0, 1.0).map_err(|e| ModelError::Numerical(e.to_string()))?;
        let intervals = levels
            .iter()
            .map(|&level| {
                let z = normal.inverse_cdf(0.5 + level / 200.0);
                PredictionInterval {
                    level,
                    lower: mean.iter().zip(&std_errors).map(|(m, s)| m - z * s).collect(),
                    upper: mean.iter().zip(&std_errors).map(|(m, s)| m + z * s).collect(),
                }
            })
            .collect();

        Ok(Forecast {
            mean,
            std_errors,
            intervals,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{fit_arima, ArimaSpec};
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn walk(n: usize, drift: f64, seed: u64) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut level = 100.0;
        (0..n)
            .map(|_| {
                level += drift + rng.gen_range(-1.0..1.0);
                level
            })
            .collect()
    }

    #[test]
    fn psi_weights_of_random_walk_are_all_one() {
        assert_eq!(psi_weights(&[], &[], 1, 4), vec![1.0; 4]);
    }

    #[test]
    fn psi_weights_of_ar1_decay_geometrically() {
        let psi = psi_weights(&[0.5], &[], 0, 4);
        assert_eq!(psi, vec![1.0, 0.5, 0.25, 0.125]);
    }

    #[test]
    fn psi_weights_of_ma1_stop_after_lag_one() {
        let psi = psi_weights(&[], &[0.4], 0, 4);
        assert_eq!(psi, vec![1.0, 0.4, 0.0, 0.0]);
    }

    #[test]
    fn psi_weights_of_ima11() {
        // (1 - B) y = (1 + 0.3B) e  =>  psi_j = 1.3 for j >= 1
        let psi = psi_weights(&[], &[0.3], 1, 4);
        for (got, want) in psi.iter().zip([1.0, 1.3, 1.3, 1.3]) {
            assert!((got - want).abs() < 1e-12);
        }
    }

    #[test]
    fn forecast_has_requested_horizon_and_ordered_bounds() {
        let y = walk(300, 0.1, 4);
        let fit = fit_arima(&y, ArimaSpec::new(1, 1, 1, true)).unwrap();
        let fc = fit.forecast(21, &DEFAULT_LEVELS).unwrap();

        assert_eq!(fc.horizon(), 21);
        assert_eq!(fc.intervals.len(), 2);
        for pi in &fc.intervals {
            assert_eq!(pi.lower.len(), 21);
            for h in 0..21 {
                assert!(pi.lower[h] <= fc.mean[h] && fc.mean[h] <= pi.upper[h]);
            }
        }

        let pi80 = fc.interval(80.0).unwrap();
        let pi95 = fc.interval(95.0).unwrap();
        for h in 0..21 {
            assert!(pi95.upper[h] - pi95.lower[h] > pi80.upper[h] - pi80.lower[h]);
        }
    }

    #[test]
    fn integrated_intervals_widen_with_horizon() {
        let y = walk(200, 0.0, 6);
        let fit = fit_arima(&y, ArimaSpec::new(0, 1, 0, false)).unwrap();
        let fc = fit.forecast(10, &[95.0]).unwrap();
        assert!(fc.std_errors.windows(2).all(|w| w[1] > w[0]));
        // Random walk without drift: flat point forecast at the last value
        let last = *y.last().unwrap();
        assert!(fc.mean.iter().all(|m| (m - last).abs() < 1e-12));
    }

    #[test]
    fn drift_extends_linearly() {
        let y = walk(250, 0.5, 2);
        let fit = fit_arima(&y, ArimaSpec::new(0, 1, 0, true)).unwrap();
        let fc = fit.forecast(5, &[]).unwrap();
        let drift = fit.constant().unwrap();
        let last = *y.last().unwrap();
        for (h, m) in fc.mean.iter().enumerate() {
            assert!((m - (last + drift * (h + 1) as f64)).abs() < 1e-9);
        }
    }

    #[test]
    fn zero_horizon_is_rejected() {
        let y = walk(100, 0.0, 1);
        let fit = fit_arima(&y, ArimaSpec::new(0, 1, 0, false)).unwrap();
        assert_eq!(fit.forecast(0, &DEFAULT_LEVELS).unwrap_err(), ModelError::InvalidHorizon);
    }

    #[test]
    fn out_of_range_level_is_rejected() {
        let y = walk(100, 0.0, 1);
        let fit = fit_arima(&y, ArimaSpec::new(0, 1, 0, false)).unwrap();
        assert!(matches!(
            fit.forecast(3, &[100.0]),
            Err(ModelError::InvalidLevel(_))
        ));
    }
}
