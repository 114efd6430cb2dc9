//! ARIMA estimation by conditional sum of squares.
//!
//! The series is differenced `d` times, then an ARMA(p, q) with optional
//! constant is fitted to the result by minimising the concentrated Gaussian
//! negative log-likelihood `n/2 * ln(CSS / n)`. The first `p` differenced
//! observations (or more, see [`fit_arima_conditioned`]) condition the
//! recursion and pre-sample innovations are zero.
//!
//! AR and MA polynomials are optimised through the partial-autocorrelation
//! reparametrisation, so every point the optimiser visits is stationary and
//! invertible. Standard errors come from the numerical Hessian of the same
//! objective in natural coordinates.

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use super::diff::{difference, is_constant};
use super::error::ModelError;
use super::optimize::{nelder_mead, NelderMeadConfig};
use super::order::ArimaSpec;

/// One estimated coefficient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coefficient {
    pub name: String,
    pub estimate: f64,
    /// `None` when the Hessian gave no positive variance for this parameter.
    pub std_error: Option<f64>,
}

/// A fitted ARIMA model.
#[derive(Debug, Clone)]
pub struct ArimaFit {
    spec: ArimaSpec,
    pub(crate) ar: Vec<f64>,
    pub(crate) ma: Vec<f64>,
    pub(crate) constant: Option<f64>,
    std_errors: Vec<Option<f64>>,
    pub(crate) sigma2: f64,
    log_likelihood: f64,
    aic: f64,
    aicc: f64,
    bic: f64,
    n_obs: usize,
    n_used: usize,
    converged: bool,
    fitted: Vec<f64>,
    residuals: Vec<f64>,
    pub(crate) history: Vec<f64>,
    pub(crate) diffed: Vec<f64>,
    pub(crate) innovations: Vec<f64>,
}

impl ArimaFit {
    pub fn spec(&self) -> ArimaSpec {
        self.spec
    }

    pub fn ar(&self) -> &[f64] {
        &self.ar
    }

    pub fn ma(&self) -> &[f64] {
        &self.ma
    }

    /// Mean (d = 0) or drift (d = 1), when estimated.
    pub fn constant(&self) -> Option<f64> {
        self.constant
    }

    /// Innovation variance `CSS / n_used`.
    pub fn sigma2(&self) -> f64 {
        self.sigma2
    }

    pub fn log_likelihood(&self) -> f64 {
        self.log_likelihood
    }

    pub fn aic(&self) -> f64 {
        self.aic
    }

    pub fn aicc(&self) -> f64 {
        self.aicc
    }

    pub fn bic(&self) -> f64 {
        self.bic
    }

    /// Length of the training series the model was fitted on.
    pub fn n_obs(&self) -> usize {
        self.n_obs
    }

    /// Observations contributing to the sum of squares.
    pub fn n_used(&self) -> usize {
        self.n_used
    }

    pub fn converged(&self) -> bool {
        self.converged
    }

    /// One-step in-sample predictions on the original scale; NaN during warm-up.
    pub fn fitted(&self) -> &[f64] {
        &self.fitted
    }

    /// In-sample residuals aligned with the training series; NaN during warm-up.
    pub fn residuals(&self) -> &[f64] {
        &self.residuals
    }

    /// Coefficients in the order ar1..arp, ma1..maq, constant.
    pub fn coefficients(&self) -> Vec<Coefficient> {
        let mut names: Vec<String> = Vec::with_capacity(self.std_errors.len());
        names.extend((1..=self.ar.len()).map(|i| format!("ar{i}")));
        names.extend((1..=self.ma.len()).map(|i| format!("ma{i}")));
        if let Some(name) = self.spec.constant_name() {
            names.push(name.to_string());
        }

        let estimates = self
            .ar
            .iter()
            .chain(&self.ma)
            .copied()
            .chain(self.constant);

        names
            .into_iter()
            .zip(estimates)
            .zip(&self.std_errors)
            .map(|((name, estimate), &std_error)| Coefficient {
                name,
                estimate,
                std_error,
            })
            .collect()
    }
}

/// Map unconstrained values to the coefficients of a stationary AR polynomial.
///
/// Each value is squashed into (-1, 1) as a partial autocorrelation and the
/// Durbin-Levinson recursion turns those into AR coefficients.
pub(crate) fn partrans(raw: &[f64]) -> Vec<f64> {
    let p = raw.len();
    let mut phi: Vec<f64> = raw.iter().map(|r| r.tanh()).collect();
    let mut work = phi.clone();
    for j in 1..p {
        let a = phi[j];
        for k in 0..j {
            work[k] -= a * phi[j - k - 1];
        }
        phi[..j].copy_from_slice(&work[..j]);
    }
    phi
}

/// Conditional residuals of an ARMA model with mean `mu` on `w`.
///
/// Returns the sum of squares over `t >= start` and the residual vector, zero
/// before `start`. `start` must be at least `ar.len()`.
pub(crate) fn css_residuals(
    w: &[f64],
    ar: &[f64],
    ma: &[f64],
    mu: f64,
    start: usize,
) -> (f64, Vec<f64>) {
    let mut e = vec![0.0; w.len()];
    let mut css = 0.0;
    for t in start..w.len() {
        let mut pred = mu;
        for (i, phi) in ar.iter().enumerate() {
            pred += phi * (w[t - 1 - i] - mu);
        }
        for (j, theta) in ma.iter().enumerate() {
            if let Some(idx) = t.checked_sub(j + 1) {
                pred += theta * e[idx];
            }
        }
        e[t] = w[t] - pred;
        css += e[t] * e[t];
    }
    (css, e)
}

/// Parameter vector layout: `[ar.., ma.., constant?]`.
#[derive(Clone, Copy)]
struct Layout {
    p: usize,
    q: usize,
    constant: bool,
}

impl Layout {
    fn len(&self) -> usize {
        self.p + self.q + usize::from(self.constant)
    }

    fn mu(&self, params: &[f64]) -> f64 {
        if self.constant {
            params[self.p + self.q]
        } else {
            0.0
        }
    }

    /// Unconstrained optimiser coordinates to (ar, ma, mu).
    fn from_raw(&self, raw: &[f64]) -> (Vec<f64>, Vec<f64>, f64) {
        let ar = partrans(&raw[..self.p]);
        let ma = partrans(&raw[self.p..self.p + self.q])
            .into_iter()
            .map(|v| -v)
            .collect();
        (ar, ma, self.mu(raw))
    }

    fn split<'a>(&self, params: &'a [f64]) -> (&'a [f64], &'a [f64], f64) {
        (
            &params[..self.p],
            &params[self.p..self.p + self.q],
            self.mu(params),
        )
    }
}

fn concentrated_nll(css: f64, n_used: usize) -> f64 {
    let n = n_used as f64;
    0.5 * n * (css.max(f64::MIN_POSITIVE) / n).ln()
}

/// Fit `spec` to `y` by conditional sum of squares.
pub fn fit_arima(y: &[f64], spec: ArimaSpec) -> Result<ArimaFit, ModelError> {
    fit_arima_conditioned(y, spec, 0)
}

/// Fit `spec` to `y`, conditioning on the first `max(n_cond, p)` differenced
/// observations.
///
/// Likelihoods and information criteria of fits that share `n_cond` cover the
/// same observations, so they are comparable across AR orders up to `n_cond`.
pub fn fit_arima_conditioned(
    y: &[f64],
    spec: ArimaSpec,
    n_cond: usize,
) -> Result<ArimaFit, ModelError> {
    if let Some(index) = y.iter().position(|v| !v.is_finite()) {
        return Err(ModelError::NonFiniteInput { index });
    }

    let (p, d, q) = (spec.order.p, spec.order.d, spec.order.q);
    let start = n_cond.max(p);
    let needed = spec.min_observations() + (start - p);
    if y.len() < needed {
        return Err(ModelError::InsufficientData {
            needed,
            got: y.len(),
        });
    }
    if is_constant(y) {
        return Err(ModelError::DegenerateSeries("series is constant".into()));
    }

    let w = difference(y, d);
    if is_constant(&w) {
        return Err(ModelError::DegenerateSeries(format!(
            "series differenced {d} time(s) has zero variance"
        )));
    }

    let layout = Layout {
        p,
        q,
        constant: spec.include_constant,
    };
    let n_used = w.len() - start;
    let w_mean = w.iter().sum::<f64>() / w.len() as f64;
    let w_sd = (w.iter().map(|v| (v - w_mean).powi(2)).sum::<f64>() / w.len() as f64).sqrt();

    let mut initial = vec![0.0; layout.len()];
    let mut steps = vec![0.1; layout.len()];
    if layout.constant {
        initial[p + q] = w_mean;
        steps[p + q] = (0.1 * w_sd).max(1e-4);
    }

    let raw_objective = |raw: &[f64]| {
        let (ar, ma, mu) = layout.from_raw(raw);
        let (css, _) = css_residuals(&w, &ar, &ma, mu, start);
        concentrated_nll(css, n_used)
    };
    let optimum = nelder_mead(raw_objective, &initial, &steps, &NelderMeadConfig::default())?;
    if !optimum.value.is_finite() {
        return Err(ModelError::Numerical(format!(
            "{spec}: objective is not finite at the optimum"
        )));
    }

    let (ar, ma, mu) = layout.from_raw(&optimum.point);
    let (css, innovations) = css_residuals(&w, &ar, &ma, mu, start);
    let sigma2 = css / n_used as f64;
    if !(sigma2.is_finite() && sigma2 > 0.0) {
        return Err(ModelError::DegenerateSeries(format!(
            "{spec}: innovation variance is {sigma2}"
        )));
    }

    let natural: Vec<f64> = ar
        .iter()
        .chain(&ma)
        .copied()
        .chain(layout.constant.then_some(mu))
        .collect();
    let std_errors = standard_errors(&natural, |params| {
        let (ar, ma, mu) = layout.split(params);
        let (css, _) = css_residuals(&w, ar, ma, mu, start);
        concentrated_nll(css, n_used)
    });

    let n_eff = n_used as f64;
    let k = (spec.n_coefficients() + 1) as f64;
    let log_likelihood = -0.5 * n_eff * ((2.0 * std::f64::consts::PI * sigma2).ln() + 1.0);
    let aic = -2.0 * log_likelihood + 2.0 * k;
    let aicc = if n_eff - k - 1.0 > 0.0 {
        aic + 2.0 * k * (k + 1.0) / (n_eff - k - 1.0)
    } else {
        f64::INFINITY
    };
    let bic = -2.0 * log_likelihood + k * n_eff.ln();

    let mut fitted = vec![f64::NAN; y.len()];
    let mut residuals = vec![f64::NAN; y.len()];
    for (s, &e) in innovations.iter().enumerate().skip(start) {
        let t = s + d;
        residuals[t] = e;
        fitted[t] = y[t] - e;
    }

    tracing::trace!(
        model = %spec,
        sigma2,
        aicc,
        iterations = optimum.iterations,
        converged = optimum.converged,
        "fitted candidate"
    );

    Ok(ArimaFit {
        spec,
        ar,
        ma,
        constant: layout.constant.then_some(mu),
        std_errors,
        sigma2,
        log_likelihood,
        aic,
        aicc,
        bic,
        n_obs: y.len(),
        n_used,
        converged: optimum.converged,
        fitted,
        residuals,
        history: y.to_vec(),
        diffed: w,
        innovations,
    })
}

/// Standard errors from the inverse of the central-difference Hessian of `f` at `x`.
fn standard_errors<F>(x: &[f64], f: F) -> Vec<Option<f64>>
where
    F: Fn(&[f64]) -> f64,
{
    let n = x.len();
    if n == 0 {
        return Vec::new();
    }

    let h: Vec<f64> = x.iter().map(|v| 1e-4 * v.abs().max(0.1)).collect();
    let f0 = f(x);
    let mut hessian = DMatrix::<f64>::zeros(n, n);
    let mut point = x.to_vec();

    for i in 0..n {
        point[i] = x[i] + h[i];
        let fp = f(&point);
        point[i] = x[i] - h[i];
        let fm = f(&point);
        point[i] = x[i];
        hessian[(i, i)] = (fp - 2.0 * f0 + fm) / (h[i] * h[i]);

        for j in (i + 1)..n {
            let mut corner = |si: f64, sj: f64| {
                point[i] = x[i] + si * h[i];
                point[j] = x[j] + sj * h[j];
                let v = f(&point);
                point[i] = x[i];
                point[j] = x[j];
                v
            };
            let value = (corner(1.0, 1.0) - corner(1.0, -1.0) - corner(-1.0, 1.0)
                + corner(-1.0, -1.0))
                / (4.0 * h[i] * h[j]);
            hessian[(i, j)] = value;
            hessian[(j, i)] = value;
        }
    }

    let Some(covariance) = hessian.try_inverse() else {
        tracing::debug!("hessian is singular; standard errors unavailable");
        return vec![None; n];
    };

    (0..n)
        .map(|i| {
            let var = covariance[(i, i)];
            (var > 0.0 && var.is_finite()).then(|| var.sqrt())
        })
        .collect()
}
