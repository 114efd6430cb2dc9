//! Nelder-Mead simplex minimisation on top of `argmin`.
//!
//! Derivative-free and unconstrained: ARIMA parameters are optimised in a
//! transformed space where every real vector maps to a stationary and
//! invertible model, so no bounds are needed here.

use argmin::core::{CostFunction, Error, Executor, State, TerminationReason};
use argmin::solver::neldermead::NelderMead;

use super::error::ModelError;

/// Configuration for Nelder-Mead optimisation.
#[derive(Debug, Clone)]
pub struct NelderMeadConfig {
    /// Maximum number of iterations per restart.
    pub max_iter: u64,
    /// Converged when the standard deviation of the vertex costs falls below this.
    pub sd_tolerance: f64,
    /// Number of restarts from the best vertex after convergence.
    pub restarts: usize,
}

impl Default for NelderMeadConfig {
    fn default() -> Self {
        Self {
            max_iter: 2_000,
            sd_tolerance: 1e-10,
            restarts: 1,
        }
    }
}

/// Result of a Nelder-Mead run.
#[derive(Debug, Clone)]
pub struct NelderMeadResult {
    pub point: Vec<f64>,
    pub value: f64,
    pub iterations: u64,
    pub converged: bool,
}

/// Adapts a closure to argmin's cost-function interface.
///
/// Non-finite values become +infinity so the simplex moves away from them.
struct Objective<F> {
    f: F,
}

impl<F> Objective<F>
where
    F: Fn(&[f64]) -> f64,
{
    fn eval(&self, x: &[f64]) -> f64 {
        let v = (self.f)(x);
        if v.is_finite() {
            v
        } else {
            f64::INFINITY
        }
    }
}

impl<F> CostFunction for Objective<F>
where
    F: Fn(&[f64]) -> f64,
{
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, param: &Self::Param) -> Result<Self::Output, Error> {
        Ok(self.eval(param))
    }
}

/// Minimise `objective` starting at `initial`, with per-coordinate initial
/// simplex steps `steps`.
pub fn nelder_mead<F>(
    objective: F,
    initial: &[f64],
    steps: &[f64],
    config: &NelderMeadConfig,
) -> Result<NelderMeadResult, ModelError>
where
    F: Fn(&[f64]) -> f64,
{
    let objective = Objective { f: objective };

    if initial.is_empty() {
        return Ok(NelderMeadResult {
            point: Vec::new(),
            value: objective.eval(&[]),
            iterations: 0,
            converged: true,
        });
    }

    let mut best = NelderMeadResult {
        value: objective.eval(initial),
        point: initial.to_vec(),
        iterations: 0,
        converged: false,
    };
    let mut total_iterations = 0;

    for _ in 0..=config.restarts {
        let run = run_simplex(&objective, &best.point, steps, config)?;
        total_iterations += run.iterations;
        let improved = run.value < best.value;
        if run.value <= best.value {
            best = run;
        }
        if !improved {
            break;
        }
    }

    best.iterations = total_iterations;
    Ok(best)
}

fn run_simplex<F>(
    objective: &Objective<F>,
    start: &[f64],
    steps: &[f64],
    config: &NelderMeadConfig,
) -> Result<NelderMeadResult, ModelError>
where
    F: Fn(&[f64]) -> f64,
{
    let mut vertices = Vec::with_capacity(start.len() + 1);
    vertices.push(start.to_vec());
    for i in 0..start.len() {
        let mut vertex = start.to_vec();
        let step = steps.get(i).copied().unwrap_or(0.1);
        vertex[i] += if step != 0.0 { step } else { 0.1 };
        vertices.push(vertex);
    }

    let solver = NelderMead::<Vec<f64>, f64>::new(vertices)
        .with_sd_tolerance(config.sd_tolerance)
        .map_err(|e| ModelError::Numerical(format!("simplex setup: {e}")))?;
    let problem = Objective { f: &objective.f };
    let result = Executor::new(problem, solver)
        .configure(|state| state.max_iters(config.max_iter))
        .run()
        .map_err(|e| ModelError::Numerical(format!("simplex: {e}")))?;

    let state = result.state();
    let point = state
        .get_best_param()
        .cloned()
        .unwrap_or_else(|| start.to_vec());
    Ok(NelderMeadResult {
        value: objective.eval(&point),
        point,
        iterations: state.get_iter(),
        converged: matches!(
            state.get_termination_reason(),
            Some(TerminationReason::SolverConverged)
        ),
    })
}
