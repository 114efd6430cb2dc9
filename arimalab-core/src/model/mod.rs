//! ARIMA modelling: estimation, automatic order selection, forecasting and
//! coefficient significance.

pub mod arima;
pub mod auto;
pub mod diff;
pub mod error;
pub mod forecast;
pub mod optimize;
pub mod order;
pub mod significance;

pub use arima::{fit_arima, fit_arima_conditioned, ArimaFit, Coefficient};
pub use auto::{
    auto_arima, AutoArima, AutoArimaConfig, AutoArimaFit, CandidateScore, InformationCriterion,
    MIN_TRAINING_OBSERVATIONS,
};
pub use diff::{difference, integrate, kpss_statistic, ndiffs};
pub use error::ModelError;
pub use forecast::{psi_weights, Forecast, PredictionInterval, DEFAULT_LEVELS};
pub use order::{ArimaOrder, ArimaSpec};
pub use significance::{
    significance_table, t_test, CoefficientRow, CoefficientTest, SignificanceError,
};
