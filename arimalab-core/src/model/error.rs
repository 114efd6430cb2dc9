use thiserror::Error;

/// Errors from ARIMA estimation and forecasting.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    #[error("insufficient data: need at least {needed} observations, got {got}")]
    InsufficientData { needed: usize, got: usize },

    #[error("degenerate series: {0}")]
    DegenerateSeries(String),

    #[error("non-finite observation at index {index}")]
    NonFiniteInput { index: usize },

    #[error("no candidate model could be fitted ({tried} tried)")]
    NoCandidateFitted { tried: usize },

    #[error("forecast horizon must be at least 1")]
    InvalidHorizon,

    #[error("interval level {0} must lie strictly between 0 and 100")]
    InvalidLevel(f64),

    #[error("numerical failure: {0}")]
    Numerical(String),
}
