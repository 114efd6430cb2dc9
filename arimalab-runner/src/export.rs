//! Artifact export: CSV tables, a JSON dump and a Markdown report.
//!
//! Layout under the output directory (rewritten on every run):
//! - `results.csv`: Rank, Symbol, RMSE, MAE, MAPE in rank order
//! - `failures.csv`: Symbol, Stage, Reason
//! - `forecasts/{SYMBOL}.csv`: date, actual, forecast, lower/upper per level
//! - `coefficients/{SYMBOL}.csv`: Coefficient, Estimate, StandardError, TStatistic, PValue
//! - `report.json`: the whole batch report plus the configuration hash
//! - `report.md`: human-readable summary

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use arimalab_core::data::{check_symbol, DataError};

use crate::batch::BatchReport;
use crate::config::ReportConfig;
use crate::pipeline::SymbolReport;

/// Current schema version of `report.json`.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("cannot name an artifact after symbol: {0}")]
    Symbol(#[from] DataError),
}

/// Paths written by `save_artifacts`.
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub results: PathBuf,
    pub failures: PathBuf,
    pub forecasts: Vec<PathBuf>,
    pub coefficients: Vec<PathBuf>,
    pub json: PathBuf,
    pub markdown: PathBuf,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    schema_version: u32,
    config_hash: String,
    config: &'a ReportConfig,
    batch: &'a BatchReport,
}

/// Write every artifact for `batch` into `dir`.
pub fn save_artifacts(
    batch: &BatchReport,
    config: &ReportConfig,
    dir: &Path,
) -> Result<ArtifactPaths, ExportError> {
    for report in &batch.reports {
        check_symbol(&report.symbol)?;
    }
    fs::create_dir_all(dir.join("forecasts"))?;
    fs::create_dir_all(dir.join("coefficients"))?;

    let results = dir.join("results.csv");
    write_results(&results, batch)?;

    let failures = dir.join("failures.csv");
    write_failures(&failures, batch)?;

    let mut forecasts = Vec::with_capacity(batch.reports.len());
    let mut coefficients = Vec::with_capacity(batch.reports.len());
    for report in &batch.reports {
        let path = dir.join("forecasts").join(format!("{}.csv", report.symbol));
        write_forecast(&path, report)?;
        forecasts.push(path);

        let path = dir.join("coefficients").join(format!("{}.csv", report.symbol));
        write_coefficients(&path, report)?;
        coefficients.push(path);
    }

    let json = dir.join("report.json");
    let payload = JsonReport {
        schema_version: SCHEMA_VERSION,
        config_hash: config.config_hash(),
        config,
        batch,
    };
    fs::write(&json, serde_json::to_string_pretty(&payload)?)?;

    let markdown = dir.join("report.md");
    fs::write(&markdown, render_markdown(batch, config))?;

    tracing::info!(dir = %dir.display(), symbols = batch.reports.len(), "artifacts saved");

    Ok(ArtifactPaths {
        results,
        failures,
        forecasts,
        coefficients,
        json,
        markdown,
    })
}

fn write_results(path: &Path, batch: &BatchReport) -> Result<(), ExportError> {
    let mut w = csv::Writer::from_path(path)?;
    w.write_record(["Rank", "Symbol", "RMSE", "MAE", "MAPE"])?;
    for e in &batch.ranked {
        w.write_record([
            e.rank.to_string(),
            e.symbol.clone(),
            format!("{:.6}", e.rmse),
            format!("{:.6}", e.mae),
            format!("{:.6}", e.mape),
        ])?;
    }
    w.flush()?;
    Ok(())
}

fn write_failures(path: &Path, batch: &BatchReport) -> Result<(), ExportError> {
    let mut w = csv::Writer::from_path(path)?;
    w.write_record(["Symbol", "Stage", "Reason"])?;
    for f in &batch.failures {
        let stage = f.stage.to_string();
        w.write_record([f.symbol.as_str(), stage.as_str(), f.reason.as_str()])?;
    }
    w.flush()?;
    Ok(())
}

fn level_label(level: f64) -> String {
    if level.fract() == 0.0 {
        format!("{level:.0}")
    } else {
        format!("{level}")
    }
}

fn write_forecast(path: &Path, report: &SymbolReport) -> Result<(), ExportError> {
    let levels = report.interval_levels();
    let mut header = vec!["date".to_string(), "actual".into(), "forecast".into()];
    for level in &levels {
        let label = level_label(*level);
        header.push(format!("lower_{label}"));
        header.push(format!("upper_{label}"));
    }

    let mut w = csv::Writer::from_path(path)?;
    w.write_record(&header)?;
    for row in &report.forecast {
        let mut record = vec![
            row.date.to_string(),
            format!("{:.6}", row.actual),
            format!("{:.6}", row.forecast),
        ];
        for bound in &row.intervals {
            record.push(format!("{:.6}", bound.lower));
            record.push(format!("{:.6}", bound.upper));
        }
        w.write_record(&record)?;
    }
    w.flush()?;
    Ok(())
}

fn optional(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.6}")).unwrap_or_default()
}

fn write_coefficients(path: &Path, report: &SymbolReport) -> Result<(), ExportError> {
    let mut w = csv::Writer::from_path(path)?;
    w.write_record(["Coefficient", "Estimate", "StandardError", "TStatistic", "PValue"])?;
    for c in &report.coefficients {
        w.write_record([
            c.name.clone(),
            format!("{:.6}", c.estimate),
            optional(c.std_error),
            optional(c.t_statistic),
            optional(c.p_value),
        ])?;
    }
    w.flush()?;
    Ok(())
}

/// Render the batch as a Markdown report.
pub fn render_markdown(batch: &BatchReport, config: &ReportConfig) -> String {
    let mut report = format!(
        "# ArimaLab Forecast Report\n\n\
Config hash: `{}`\n\n\
- Training window: through {}\n\
- Test window: {} to {}\n\
- Lookback: {} years\n\
- Selection criterion: {}\n\
- Symbols: {} ranked, {} failed\n",
        config.config_hash(),
        config.window.train_end,
        config.window.test_start,
        config.window.test_end,
        config.report.lookback_years,
        config.model.criterion,
        batch.ranked.len(),
        batch.failures.len(),
    );

    report.push_str("\n## Ranking (MAPE ascending)\n\n");
    report.push_str("| Rank | Symbol | Model | RMSE | MAE | MAPE |\n");
    report.push_str("|------|--------|-------|------|-----|------|\n");
    for (entry, detail) in batch.ranked.iter().zip(&batch.reports) {
        report.push_str(&format!(
            "| {} | {} | {} | {:.4} | {:.4} | {:.2}% |\n",
            entry.rank, entry.symbol, detail.model.label, entry.rmse, entry.mae, entry.mape
        ));
    }

    if !batch.failures.is_empty() {
        report.push_str("\n## Failures\n\n");
        report.push_str("| Symbol | Stage | Reason |\n");
        report.push_str("|--------|-------|--------|\n");
        for f in &batch.failures {
            report.push_str(&format!("| {} | {} | {} |\n", f.symbol, f.stage, f.reason));
        }
    }

    for detail in &batch.reports {
        report.push_str(&format!(
            "\n## {}\n\n{} fitted on {} observations ({} to {}), AICc {:.2}\n\n",
            detail.symbol,
            detail.model.label,
            detail.n_train,
            detail.train_start,
            detail.train_end,
            detail.model.aicc,
        ));
        report.push_str("| Coefficient | Estimate | Std. Error | t | p |\n");
        report.push_str("|-------------|----------|------------|---|---|\n");
        for c in &detail.coefficients {
            report.push_str(&format!(
                "| {} | {:.4} | {} | {} | {} |\n",
                c.name,
                c.estimate,
                c.std_error.map(|v| format!("{v:.4}")).unwrap_or_else(|| "-".into()),
                c.t_statistic.map(|v| format!("{v:.3}")).unwrap_or_else(|| "-".into()),
                c.p_value.map(|v| format!("{v:.4}")).unwrap_or_else(|| "-".into()),
            ));
        }
        let in_sample = match &detail.train_metrics {
            Some(m) => format!("RMSE {:.4}, MAE {:.4}, MAPE {:.2}%", m.rmse, m.mae, m.mape),
            None => "undefined".to_string(),
        };
        report.push_str(&format!(
            "\nIn-sample: {in_sample}. Test: RMSE {:.4}, MAE {:.4}, MAPE {:.2}%.\n",
            detail.test_metrics.rmse,
            detail.test_metrics.mae,
            detail.test_metrics.mape,
        ));
    }

    report
}
