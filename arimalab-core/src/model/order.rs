use std::fmt;

use serde::{Deserialize, Serialize};

/// Non-seasonal ARIMA order (p, d, q).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ArimaOrder {
    pub p: usize,
    pub d: usize,
    pub q: usize,
}

impl ArimaOrder {
    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self { p, d, q }
    }
}

impl fmt::Display for ArimaOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ARIMA({},{},{})", self.p, self.d, self.q)
    }
}

/// An order plus whether a constant term is estimated.
///
/// The constant is a mean when `d == 0` and a drift when `d == 1`. With
/// `d >= 2` a constant would be a polynomial trend, so it is never included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ArimaSpec {
    pub order: ArimaOrder,
    pub include_constant: bool,
}

impl ArimaSpec {
    pub fn new(p: usize, d: usize, q: usize, include_constant: bool) -> Self {
        Self {
            order: ArimaOrder::new(p, d, q),
            include_constant: include_constant && d <= 1,
        }
    }

    /// Number of estimated coefficients, excluding the innovation variance.
    pub fn n_coefficients(&self) -> usize {
        self.order.p + self.order.q + usize::from(self.include_constant)
    }

    /// Smallest training length this spec can be fitted on.
    ///
    /// Enough for the differencing and AR warm-up to leave more effective
    /// observations than parameters (AICc needs `n_eff - k - 1 > 0`).
    pub fn min_observations(&self) -> usize {
        let k = self.n_coefficients() + 1;
        self.order.d + self.order.p + k + 2
    }

    /// Label of the constant term, if any.
    pub fn constant_name(&self) -> Option<&'static str> {
        match (self.include_constant, self.order.d) {
            (false, _) => None,
            (true, 0) => Some("intercept"),
            (true, _) => Some("drift"),
        }
    }
}

impl fmt::Display for ArimaSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.constant_name() {
            Some("intercept") => write!(f, "{} with non-zero mean", self.order),
            Some(_) => write!(f, "{} with drift", self.order),
            None => write!(f, "{}", self.order),
        }
    }
}
