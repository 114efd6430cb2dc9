//! ArimaLab Runner: report configuration, per-symbol pipeline, batch ranking, export.
//!
//! This crate builds on `arimalab-core` to provide:
//! - TOML report configuration with validated defaults
//! - The single-symbol pipeline with stage-tagged failures
//! - The batch runner: per-symbol isolation, optional rayon parallelism,
//!   stable MAPE ranking
//! - CSV / JSON / Markdown artifact export

pub mod batch;
pub mod config;
pub mod export;
pub mod pipeline;

pub use batch::{
    collect_results, rank_by_mape, run_batch, AccuracyRecord, BatchProgress, BatchReport,
    FailureRecord, NoProgress, RankedEntry, TracingProgress,
};
pub use config::{ConfigError, ProviderKind, ReportConfig};
pub use export::{render_markdown, save_artifacts, ArtifactPaths, ExportError, SCHEMA_VERSION};
pub use pipeline::{
    run_symbol, ForecastRow, IntervalBound, ModelSummary, PipelineError, PipelineOptions, Stage,
    StageError, SymbolReport,
};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn symbol_report_is_send_sync() {
        assert_send::<SymbolReport>();
        assert_sync::<SymbolReport>();
    }

    #[test]
    fn pipeline_error_is_send_sync() {
        assert_send::<PipelineError>();
        assert_sync::<PipelineError>();
    }

    #[test]
    fn batch_report_is_send_sync() {
        assert_send::<BatchReport>();
        assert_sync::<BatchReport>();
    }

    #[test]
    fn report_config_is_send_sync() {
        assert_send::<ReportConfig>();
        assert_sync::<ReportConfig>();
    }
}
