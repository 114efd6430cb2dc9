//! Coefficient significance: t statistics and two-tailed p-values.
//!
//! `t = estimate / std_error`, `p = 2 * (1 - F(|t|))` where F is the
//! Student's t CDF with `n - k` degrees of freedom (n training observations,
//! k estimated coefficients).

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};
use thiserror::Error;

use super::arima::ArimaFit;

#[derive(Debug, Error, PartialEq)]
pub enum SignificanceError {
    #[error("standard error of {name} must be positive and finite, got {std_error}")]
    InvalidStdError { name: String, std_error: f64 },

    #[error("no residual degrees of freedom: {observations} observations, {coefficients} coefficients")]
    NoDegreesOfFreedom {
        observations: usize,
        coefficients: usize,
    },

    #[error("t distribution: {0}")]
    Distribution(String),
}

/// Test of one coefficient against zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoefficientTest {
    pub name: String,
    pub estimate: f64,
    pub std_error: f64,
    pub t_statistic: f64,
    pub p_value: f64,
    pub df: usize,
}

impl CoefficientTest {
    pub fn is_significant(&self, alpha: f64) -> bool {
        self.p_value < alpha
    }

    /// Conventional significance stars.
    pub fn stars(&self) -> &'static str {
        match self.p_value {
            p if p < 0.001 => "***",
            p if p < 0.01 => "**",
            p if p < 0.05 => "*",
            p if p < 0.1 => ".",
            _ => "",
        }
    }
}

/// One row of a coefficient table. Test columns are empty when the standard
/// error could not be estimated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoefficientRow {
    pub name: String,
    pub estimate: f64,
    pub std_error: Option<f64>,
    pub t_statistic: Option<f64>,
    pub p_value: Option<f64>,
}

impl From<CoefficientTest> for CoefficientRow {
    fn from(t: CoefficientTest) -> Self {
        Self {
            name: t.name,
            estimate: t.estimate,
            std_error: Some(t.std_error),
            t_statistic: Some(t.t_statistic),
            p_value: Some(t.p_value),
        }
    }
}

/// Two-tailed t test of `estimate` against zero.
pub fn t_test(
    name: &str,
    estimate: f64,
    std_error: f64,
    df: usize,
) -> Result<CoefficientTest, SignificanceError> {
    if !(std_error.is_finite() && std_error > 0.0) {
        return Err(SignificanceError::InvalidStdError {
            name: name.to_string(),
            std_error,
        });
    }
    if df == 0 {
        return Err(SignificanceError::Distribution(
            "degrees of freedom must be at least 1".into(),
        ));
    }

    let dist = StudentsT::new(0.0, 1.0, df as f64)
        .map_err(|e| SignificanceError::Distribution(e.to_string()))?;
    let t_statistic = estimate / std_error;
    let p_value = (2.0 * dist.sf(t_statistic.abs())).clamp(0.0, 1.0);

    Ok(CoefficientTest {
        name: name.to_string(),
        estimate,
        std_error,
        t_statistic,
        p_value,
        df,
    })
}

/// Significance table for every coefficient of a fitted model.
pub fn significance_table(fit: &ArimaFit) -> Result<Vec<CoefficientRow>, SignificanceError> {
    let coefficients = fit.coefficients();
    let observations = fit.n_obs();
    let df = observations.saturating_sub(coefficients.len());
    if df == 0 {
        return Err(SignificanceError::NoDegreesOfFreedom {
            observations,
            coefficients: coefficients.len(),
        });
    }

    coefficients
        .into_iter()
        .map(|c| match c.std_error {
            Some(se) => t_test(&c.name, c.estimate, se, df).map(CoefficientRow::from),
            None => Ok(CoefficientRow {
                name: c.name,
                estimate: c.estimate,
                std_error: None,
                t_statistic: None,
                p_value: None,
            }),
        })
        .collect()
}
