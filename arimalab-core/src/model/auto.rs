//! Automatic ARIMA order selection.
//!
//! The differencing order comes from repeated KPSS tests. AR/MA orders and
//! the constant are then chosen by minimising an information criterion,
//! either with a stepwise neighbourhood search or an exhaustive grid.
//!
//! Every candidate conditions on the first `max_p` differenced observations,
//! so all criteria are computed over the same sample whatever the AR order.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::arima::{fit_arima_conditioned, ArimaFit};
use super::diff::{difference, is_constant, ndiffs};
use super::error::ModelError;
use super::order::ArimaSpec;

/// Fewest training observations an automatic search will accept.
pub const MIN_TRAINING_OBSERVATIONS: usize = 10;

/// Criterion used to rank candidate models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InformationCriterion {
    Aic,
    #[default]
    Aicc,
    Bic,
}

impl InformationCriterion {
    pub fn score(&self, fit: &ArimaFit) -> f64 {
        match self {
            Self::Aic => fit.aic(),
            Self::Aicc => fit.aicc(),
            Self::Bic => fit.bic(),
        }
    }
}

impl fmt::Display for InformationCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Aic => "aic",
            Self::Aicc => "aicc",
            Self::Bic => "bic",
        })
    }
}

impl FromStr for InformationCriterion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "aic" => Ok(Self::Aic),
            "aicc" => Ok(Self::Aicc),
            "bic" => Ok(Self::Bic),
            other => Err(format!("unknown information criterion: {other}")),
        }
    }
}

/// Search bounds and strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoArimaConfig {
    pub max_p: usize,
    pub max_q: usize,
    pub max_d: usize,
    /// Upper bound on p + q.
    pub max_order: usize,
    pub stepwise: bool,
    pub criterion: InformationCriterion,
    /// Consider a mean (d = 0) or drift (d = 1) term.
    pub allow_constant: bool,
    /// Stepwise search stops after fitting this many candidates.
    pub max_models: usize,
    /// Force the differencing order instead of testing for it.
    pub d: Option<usize>,
}

impl Default for AutoArimaConfig {
    fn default() -> Self {
        Self {
            max_p: 5,
            max_q: 5,
            max_d: 2,
            max_order: 5,
            stepwise: true,
            criterion: InformationCriterion::Aicc,
            allow_constant: true,
            max_models: 94,
            d: None,
        }
    }
}

impl AutoArimaConfig {
    /// Exhaustive search over every admissible (p, q, constant).
    pub fn exhaustive(mut self) -> Self {
        self.stepwise = false;
        self
    }

    fn admits(&self, p: usize, q: usize) -> bool {
        p <= self.max_p && q <= self.max_q && p + q <= self.max_order
    }
}

/// A candidate that was tried, with its score when it fitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateScore {
    pub spec: ArimaSpec,
    pub score: Option<f64>,
}

/// The selected model and every candidate considered on the way.
#[derive(Debug, Clone)]
pub struct AutoArimaFit {
    pub model: ArimaFit,
    pub criterion: InformationCriterion,
    pub candidates: Vec<CandidateScore>,
}

impl AutoArimaFit {
    pub fn score(&self) -> f64 {
        self.criterion.score(&self.model)
    }
}

/// Automatic ARIMA order selection.
#[derive(Debug, Clone, Default)]
pub struct AutoArima {
    config: AutoArimaConfig,
}

struct Search<'a> {
    y: &'a [f64],
    n_cond: usize,
    criterion: InformationCriterion,
    scores: HashMap<ArimaSpec, Option<f64>>,
    tried: Vec<ArimaSpec>,
    best: Option<(f64, ArimaFit)>,
}

impl<'a> Search<'a> {
    fn new(y: &'a [f64], n_cond: usize, criterion: InformationCriterion) -> Self {
        Self {
            y,
            n_cond,
            criterion,
            scores: HashMap::new(),
            tried: Vec::new(),
            best: None,
        }
    }

    fn evaluate(&mut self, spec: ArimaSpec) -> Option<f64> {
        if let Some(score) = self.scores.get(&spec) {
            return *score;
        }

        let score = match fit_arima_conditioned(self.y, spec, self.n_cond) {
            Ok(fit) => {
                let score = self.criterion.score(&fit);
                if !score.is_finite() {
                    None
                } else {
                    if self.best.as_ref().map_or(true, |(b, _)| score < *b) {
                        self.best = Some((score, fit));
                    }
                    Some(score)
                }
            }
            Err(e) => {
                tracing::debug!(model = %spec, error = %e, "candidate failed");
                None
            }
        };

        self.scores.insert(spec, score);
        self.tried.push(spec);
        score
    }

    fn best_spec(&self) -> Option<ArimaSpec> {
        self.best.as_ref().map(|(_, fit)| fit.spec())
    }

    fn seen(&self, spec: &ArimaSpec) -> bool {
        self.scores.contains_key(spec)
    }
}

const NEIGHBOUR_STEPS: [(isize, isize); 8] = [
    (-1, 0),
    (1, 0),
    (0, -1),
    (0, 1),
    (-1, -1),
    (1, 1),
    (-1, 1),
    (1, -1),
];

impl AutoArima {
    pub fn new(config: AutoArimaConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AutoArimaConfig {
        &self.config
    }

    /// Select and fit a model for `y`.
    pub fn fit(&self, y: &[f64]) -> Result<AutoArimaFit, ModelError> {
        if let Some(index) = y.iter().position(|v| !v.is_finite()) {
            return Err(ModelError::NonFiniteInput { index });
        }
        if y.len() < MIN_TRAINING_OBSERVATIONS {
            return Err(ModelError::InsufficientData {
                needed: MIN_TRAINING_OBSERVATIONS,
                got: y.len(),
            });
        }
        if is_constant(y) {
            return Err(ModelError::DegenerateSeries("training series is constant".into()));
        }

        let d = self
            .config
            .d
            .unwrap_or_else(|| ndiffs(y, self.config.max_d));
        if is_constant(&difference(y, d)) {
            return Err(ModelError::DegenerateSeries(format!(
                "training series differenced {d} time(s) has zero variance"
            )));
        }
        let with_constant = self.config.allow_constant && d <= 1;

        let mut search = Search::new(y, self.config.max_p, self.config.criterion);
        if self.config.stepwise {
            self.stepwise(&mut search, d, with_constant);
        } else {
            self.exhaustive(&mut search, d, with_constant);
        }

        let tried = search.tried.len();
        let candidates = search
            .tried
            .iter()
            .map(|spec| CandidateScore {
                spec: *spec,
                score: search.scores.get(spec).copied().flatten(),
            })
            .collect();

        let Some((score, model)) = search.best else {
            return Err(ModelError::NoCandidateFitted { tried });
        };

        tracing::debug!(
            model = %model.spec(),
            criterion = %self.config.criterion,
            score,
            tried,
            "selected model"
        );

        Ok(AutoArimaFit {
            model,
            criterion: self.config.criterion,
            candidates,
        })
    }

    fn stepwise(&self, search: &mut Search<'_>, d: usize, with_constant: bool) {
        let mut starts = vec![
            ArimaSpec::new(2, d, 2, with_constant),
            ArimaSpec::new(0, d, 0, with_constant),
            ArimaSpec::new(1, d, 0, with_constant),
            ArimaSpec::new(0, d, 1, with_constant),
        ];
        if with_constant {
            starts.push(ArimaSpec::new(0, d, 0, false));
        }
        for spec in starts {
            if self.config.admits(spec.order.p, spec.order.q) {
                search.evaluate(spec);
            }
        }

        while search.tried.len() < self.config.max_models {
            let Some(current) = search.best_spec() else {
                return;
            };

            let mut moved = false;
            for next in self.neighbours(current, with_constant) {
                if search.seen(&next) {
                    continue;
                }
                search.evaluate(next);
                if search.best_spec() != Some(current) {
                    moved = true;
                    break;
                }
                if search.tried.len() >= self.config.max_models {
                    break;
                }
            }
            if !moved {
                return;
            }
        }
    }

    fn neighbours(&self, spec: ArimaSpec, with_constant: bool) -> Vec<ArimaSpec> {
        let (p, d, q) = (spec.order.p, spec.order.d, spec.order.q);
        let mut out: Vec<ArimaSpec> = NEIGHBOUR_STEPS
            .iter()
            .filter_map(|&(dp, dq)| {
                let np = p.checked_add_signed(dp)?;
                let nq = q.checked_add_signed(dq)?;
                self.config
                    .admits(np, nq)
                    .then(|| ArimaSpec::new(np, d, nq, spec.include_constant))
            })
            .collect();
        if with_constant {
            out.push(ArimaSpec::new(p, d, q, !spec.include_constant));
        }
        out
    }

    fn exhaustive(&self, search: &mut Search<'_>, d: usize, with_constant: bool) {
        let constants: &[bool] = if with_constant { &[true, false] } else { &[false] };
        for p in 0..=self.config.max_p {
            for q in 0..=self.config.max_q {
                if !self.config.admits(p, q) {
                    continue;
                }
                for &c in constants {
                    search.evaluate(ArimaSpec::new(p, d, q, c));
                }
            }
        }
    }
}

/// Select and fit a model for `y` with `config`.
pub fn auto_arima(y: &[f64], config: &AutoArimaConfig) -> Result<AutoArimaFit, ModelError> {
    AutoArima::new(config.clone()).fit(y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn walk(n: usize, seed: u64) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut level = 50.0;
        (0..n)
            .map(|_| {
                level += rng.gen_range(-1.0..1.0);
                level
            })
            .collect()
    }

    #[test]
    fn criterion_parses_case_insensitively() {
        assert_eq!("AICc".parse::<InformationCriterion>(), Ok(InformationCriterion::Aicc));
        assert_eq!("bic".parse::<InformationCriterion>(), Ok(InformationCriterion::Bic));
        assert!("hqic".parse::<InformationCriterion>().is_err());
    }

    #[test]
    fn stepwise_selects_the_best_candidate_it_tried() {
        let y = walk(300, 17);
        let result = auto_arima(&y, &AutoArimaConfig::default()).unwrap();

        let best = result
            .candidates
            .iter()
            .filter_map(|c| c.score)
            .fold(f64::INFINITY, f64::min);
        assert_eq!(result.score(), best);
        assert!(result.candidates.len() <= AutoArimaConfig::default().max_models);
    }

    #[test]
    fn candidates_are_never_refitted() {
        let y = walk(200, 23);
        let result = auto_arima(&y, &AutoArimaConfig::default()).unwrap();
        let mut specs: Vec<_> = result.candidates.iter().map(|c| c.spec).collect();
        let before = specs.len();
        specs.sort();
        specs.dedup();
        assert_eq!(specs.len(), before);
    }

    #[test]
    fn respects_order_bounds() {
        let y = walk(200, 5);
        let config = AutoArimaConfig {
            max_p: 1,
            max_q: 1,
            max_order: 1,
            d: Some(1),
            ..Default::default()
        };
        let result = auto_arima(&y, &config.exhaustive()).unwrap();
        for c in &result.candidates {
            assert!(c.spec.order.p + c.spec.order.q <= 1);
        }
        // (0,0), (1,0), (0,1), each with and without a constant
        assert_eq!(result.candidates.len(), 6);
    }

    #[test]
    fn forced_differencing_is_honoured() {
        let y = walk(150, 2);
        let config = AutoArimaConfig {
            d: Some(2),
            ..Default::default()
        };
        let result = auto_arima(&y, &config).unwrap();
        assert_eq!(result.model.spec().order.d, 2);
        assert!(!result.model.spec().include_constant);
    }

    fn scaled(y: &[f64], factor: f64) -> Vec<f64> {
        y.iter().map(|v| v * factor).collect()
    }

    #[test]
    fn selection_does_not_depend_on_price_units() {
        let config = AutoArimaConfig {
            max_p: 5,
            max_q: 0,
            d: Some(1),
            allow_constant: false,
            criterion: InformationCriterion::Aic,
            ..Default::default()
        }
        .exhaustive();
        for seed in [1, 2, 3] {
            let dollars: Vec<f64> = walk(600, seed).iter().map(|v| v * 6.0).collect();
            let cents = scaled(&dollars, 0.01);
            let a = auto_arima(&dollars, &config).unwrap();
            let b = auto_arima(&cents, &config).unwrap();
            assert_eq!(a.model.spec(), b.model.spec(), "seed {seed}");
        }
    }

    #[test]
    fn candidates_share_one_estimation_sample() {
        let y = walk(300, 41);
        let config = AutoArimaConfig {
            d: Some(1),
            ..Default::default()
        };
        let result = auto_arima(&y, &config).unwrap();
        assert_eq!(result.model.n_used(), y.len() - 1 - config.max_p);
    }

    #[test]
    fn stepwise_selection_survives_rescaling() {
        let y: Vec<f64> = walk(400, 77).iter().map(|v| v * 4.0).collect();
        let a = auto_arima(&y, &AutoArimaConfig::default()).unwrap();
        let b = auto_arima(&scaled(&y, 0.01), &AutoArimaConfig::default()).unwrap();
        assert_eq!(a.model.spec(), b.model.spec());
    }

    #[test]
    fn constant_series_is_degenerate() {
        let err = auto_arima(&[3.0; 60], &AutoArimaConfig::default()).unwrap_err();
        assert!(matches!(err, ModelError::DegenerateSeries(_)));
    }

    #[test]
    fn short_series_is_insufficient() {
        let err = auto_arima(&[1.0, 2.0, 3.0], &AutoArimaConfig::default()).unwrap_err();
        assert_eq!(
            err,
            ModelError::InsufficientData {
                needed: MIN_TRAINING_OBSERVATIONS,
                got: 3
            }
        );
    }
}
