//! Batch runner: applies the pipeline to every symbol and ranks by MAPE.
//!
//! Each symbol is evaluated independently into a `Result`; the batch is a
//! pure fold over those results. A failing symbol becomes a `FailureRecord`
//! and never stops the others. Ranking is a stable sort on test-window MAPE,
//! so ties keep input order and parallel runs match sequential ones.

use std::cmp::Ordering;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use arimalab_core::data::PriceProvider;

use crate::pipeline::{run_symbol, PipelineError, PipelineOptions, Stage, SymbolReport};

/// Progress callback for batch runs.
pub trait BatchProgress: Send + Sync {
    /// Called when a symbol's pipeline starts.
    fn on_start(&self, symbol: &str, index: usize, total: usize);

    /// Called when a symbol's pipeline finishes, successfully or not.
    fn on_complete(
        &self,
        symbol: &str,
        index: usize,
        total: usize,
        result: &Result<SymbolReport, PipelineError>,
    );

    /// Called once after every symbol has been processed.
    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize);
}

/// Reports progress through `tracing`.
pub struct TracingProgress;

impl BatchProgress for TracingProgress {
    fn on_start(&self, symbol: &str, index: usize, total: usize) {
        tracing::info!("[{}/{}] {symbol}", index + 1, total);
    }

    fn on_complete(
        &self,
        symbol: &str,
        _index: usize,
        _total: usize,
        result: &Result<SymbolReport, PipelineError>,
    ) {
        match result {
            Ok(report) => tracing::info!(%symbol, model = %report.model.label, mape = report.mape(), "ok"),
            Err(e) => tracing::warn!(%symbol, stage = %e.stage, error = %e.source, "failed"),
        }
    }

    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize) {
        tracing::info!(succeeded, failed, total, "batch complete");
    }
}

/// Discards all progress events.
pub struct NoProgress;

impl BatchProgress for NoProgress {
    fn on_start(&self, _symbol: &str, _index: usize, _total: usize) {}

    fn on_complete(
        &self,
        _symbol: &str,
        _index: usize,
        _total: usize,
        _result: &Result<SymbolReport, PipelineError>,
    ) {
    }

    fn on_batch_complete(&self, _succeeded: usize, _failed: usize, _total: usize) {}
}

/// One symbol's test-window accuracy, before ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccuracyRecord {
    pub symbol: String,
    pub rmse: f64,
    pub mae: f64,
    pub mape: f64,
}

impl From<&SymbolReport> for AccuracyRecord {
    fn from(report: &SymbolReport) -> Self {
        Self {
            symbol: report.symbol.clone(),
            rmse: report.test_metrics.rmse,
            mae: report.test_metrics.mae,
            mape: report.test_metrics.mape,
        }
    }
}

/// A row of the ranked results table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedEntry {
    /// 1-based position, best MAPE first.
    pub rank: usize,
    pub symbol: String,
    pub rmse: f64,
    pub mae: f64,
    pub mape: f64,
}

/// A symbol excluded from the ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureRecord {
    pub symbol: String,
    pub stage: Stage,
    pub reason: String,
}

impl From<&PipelineError> for FailureRecord {
    fn from(e: &PipelineError) -> Self {
        Self {
            symbol: e.symbol.clone(),
            stage: e.stage,
            reason: e.source.to_string(),
        }
    }
}

/// Output of a batch run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchReport {
    /// Successful symbols ordered by ascending MAPE.
    pub ranked: Vec<RankedEntry>,
    /// Failed symbols in input order.
    pub failures: Vec<FailureRecord>,
    /// Full per-symbol reports in the same order as `ranked`.
    pub reports: Vec<SymbolReport>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.ranked.len() + self.failures.len()
    }

    pub fn report(&self, symbol: &str) -> Option<&SymbolReport> {
        self.reports.iter().find(|r| r.symbol == symbol)
    }
}

fn by_mape(a: f64, b: f64) -> Ordering {
    a.total_cmp(&b)
}

/// Rank records by ascending MAPE. The sort is stable: equal MAPE keeps
/// input order.
pub fn rank_by_mape(mut records: Vec<AccuracyRecord>) -> Vec<RankedEntry> {
    records.sort_by(|a, b| by_mape(a.mape, b.mape));
    records
        .into_iter()
        .enumerate()
        .map(|(i, r)| RankedEntry {
            rank: i + 1,
            symbol: r.symbol,
            rmse: r.rmse,
            mae: r.mae,
            mape: r.mape,
        })
        .collect()
}

/// Fold per-symbol results (in input order) into a batch report.
pub fn collect_results(results: Vec<Result<SymbolReport, PipelineError>>) -> BatchReport {
    let (mut reports, failures) = results.into_iter().fold(
        (Vec::new(), Vec::new()),
        |(mut ok, mut failed), result| {
            match result {
                Ok(report) => ok.push(report),
                Err(e) => failed.push(FailureRecord::from(&e)),
            }
            (ok, failed)
        },
    );

    reports.sort_by(|a, b| by_mape(a.mape(), b.mape()));
    let ranked = rank_by_mape(reports.iter().map(AccuracyRecord::from).collect());

    BatchReport {
        ranked,
        failures,
        reports,
    }
}

/// Run the pipeline for every symbol.
///
/// With `parallel` set, symbols are evaluated on the rayon pool; results are
/// still collected in input order before ranking.
pub fn run_batch(
    provider: &dyn PriceProvider,
    symbols: &[String],
    options: &PipelineOptions,
    parallel: bool,
    progress: &dyn BatchProgress,
) -> BatchReport {
    let total = symbols.len();
    let evaluate = |(index, symbol): (usize, &String)| {
        progress.on_start(symbol, index, total);
        let result = run_symbol(provider, symbol, options);
        progress.on_complete(symbol, index, total, &result);
        result
    };

    let results: Vec<Result<SymbolReport, PipelineError>> = if parallel {
        symbols.par_iter().enumerate().map(evaluate).collect()
    } else {
        symbols.iter().enumerate().map(evaluate).collect()
    };

    let batch = collect_results(results);
    progress.on_batch_complete(batch.ranked.len(), batch.failures.len(), total);
    batch
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(symbol: &str, mape: f64) -> AccuracyRecord {
        AccuracyRecord {
            symbol: symbol.into(),
            rmse: mape * 2.0,
            mae: mape * 1.5,
            mape,
        }
    }

    #[test]
    fn ranks_ascending_by_mape() {
        let ranked = rank_by_mape(vec![
            record("Z", 5.00),
            record("X", 1.12),
            record("Y", 2.50),
        ]);
        let order: Vec<&str> = ranked.iter().map(|e| e.symbol.as_str()).collect();
        assert_eq!(order, vec!["X", "Y", "Z"]);
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[2].rank, 3);
        assert_eq!(ranked[0].rmse, 2.24);
    }

    #[test]
    fn ties_keep_input_order() {
        let ranked = rank_by_mape(vec![
            record("B", 2.0),
            record("A", 1.0),
            record("C", 2.0),
            record("D", 2.0),
        ]);
        let order: Vec<&str> = ranked.iter().map(|e| e.symbol.as_str()).collect();
        assert_eq!(order, vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn empty_input_ranks_nothing() {
        assert!(rank_by_mape(Vec::new()).is_empty());
        let batch = collect_results(Vec::new());
        assert_eq!(batch.total(), 0);
    }
}
