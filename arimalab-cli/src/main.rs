//! ArimaLab CLI: batch report, single-symbol walkthrough and data export.
//!
//! Commands:
//! - `report`: fit and score every configured symbol, rank by MAPE, save artifacts
//! - `detail`: walk through one symbol: model, coefficient significance, forecast table
//! - `fetch`: download one symbol's daily bars and write them as CSV

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use tracing::Level;

use arimalab_core::data::write_csv;
use arimalab_runner::{
    run_batch, run_symbol, save_artifacts, BatchReport, PipelineOptions, ProviderKind,
    ReportConfig, SymbolReport, TracingProgress,
};

#[derive(Parser)]
#[command(
    name = "arimalab",
    about = "ArimaLab CLI: ARIMA forecasts of daily closing prices"
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fit, forecast and score every symbol, then rank by test-window MAPE.
    Report {
        /// Symbols to evaluate (e.g., AAPL MSFT). Defaults to the config's list.
        #[arg(long, num_args = 1..)]
        symbols: Vec<String>,

        #[command(flatten)]
        run: RunArgs,

        /// Output directory for artifacts.
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Evaluate symbols on the thread pool.
        #[arg(long, default_value_t = false)]
        parallel: bool,

        /// Print the ranking only; write no artifacts.
        #[arg(long, default_value_t = false)]
        no_save: bool,
    },
    /// Single-symbol walkthrough with the coefficient significance table.
    Detail {
        /// Symbol to analyse.
        symbol: String,

        #[command(flatten)]
        run: RunArgs,
    },
    /// Fetch daily bars for one symbol and write them as CSV.
    Fetch {
        /// Symbol to fetch.
        symbol: String,

        /// Start date (YYYY-MM-DD).
        #[arg(long)]
        start: String,

        /// End date (YYYY-MM-DD).
        #[arg(long)]
        end: String,

        /// Output file. Defaults to ./{SYMBOL}.csv.
        #[arg(long)]
        out: Option<PathBuf>,

        /// Data provider: yahoo or synthetic.
        #[arg(long, default_value = "yahoo")]
        provider: ProviderKind,

        /// Request timeout in seconds.
        #[arg(long, default_value_t = 30)]
        timeout_secs: u64,
    },
}

/// Flags shared by `report` and `detail`. Each overrides the config file.
#[derive(Args)]
struct RunArgs {
    /// Path to a TOML report config.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Last training date (YYYY-MM-DD).
    #[arg(long)]
    train_end: Option<String>,

    /// First test date (YYYY-MM-DD).
    #[arg(long)]
    test_start: Option<String>,

    /// Last test date (YYYY-MM-DD).
    #[arg(long)]
    test_end: Option<String>,

    /// Years of history requested before the test end.
    #[arg(long)]
    lookback_years: Option<u32>,

    /// Data provider: yahoo, csv or synthetic.
    #[arg(long)]
    provider: Option<ProviderKind>,

    /// Directory of {SYMBOL}.csv files for the csv provider.
    #[arg(long)]
    csv_dir: Option<PathBuf>,

    /// Search the full order grid instead of stepping.
    #[arg(long, default_value_t = false)]
    exhaustive: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    match cli.command {
        Commands::Report {
            symbols,
            run,
            output_dir,
            parallel,
            no_save,
        } => run_report(symbols, run, output_dir, parallel, no_save),
        Commands::Detail { symbol, run } => run_detail(&symbol, run),
        Commands::Fetch {
            symbol,
            start,
            end,
            out,
            provider,
            timeout_secs,
        } => run_fetch(&symbol, &start, &end, out, provider, timeout_secs),
    }
}

fn init_logging(verbose: u8) -> Result<()> {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("install log subscriber")?;
    Ok(())
}

fn parse_date(value: &str, flag: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .with_context(|| format!("--{flag} expects YYYY-MM-DD, got '{value}'"))
}

/// Load the config file (or defaults) and apply command-line overrides.
fn load_config(run: &RunArgs) -> Result<ReportConfig> {
    let mut config = match &run.config {
        Some(path) => ReportConfig::from_file(path)
            .with_context(|| format!("load config {}", path.display()))?,
        None => ReportConfig::default(),
    };

    if let Some(s) = &run.train_end {
        config.window.train_end = parse_date(s, "train-end")?;
    }
    if let Some(s) = &run.test_start {
        config.window.test_start = parse_date(s, "test-start")?;
    }
    if let Some(s) = &run.test_end {
        config.window.test_end = parse_date(s, "test-end")?;
    }
    if let Some(years) = run.lookback_years {
        config.report.lookback_years = years;
    }
    if let Some(provider) = run.provider {
        config.data.provider = provider;
    }
    if let Some(dir) = &run.csv_dir {
        config.data.csv_dir = Some(dir.clone());
    }
    if run.exhaustive {
        config.model.stepwise = false;
    }
    Ok(config)
}

fn run_report(
    symbols: Vec<String>,
    run: RunArgs,
    output_dir: Option<PathBuf>,
    parallel: bool,
    no_save: bool,
) -> Result<()> {
    let mut config = load_config(&run)?;
    if !symbols.is_empty() {
        config.report.symbols = symbols;
    }
    if let Some(dir) = output_dir {
        config.output.dir = dir;
    }

    let options = PipelineOptions::from_config(&config).context("invalid report configuration")?;
    let provider = config.build_provider().context("set up data provider")?;

    let batch = run_batch(
        provider.as_ref(),
        &config.report.symbols,
        &options,
        parallel,
        &TracingProgress,
    );

    print_ranking(&batch, &config);

    if !no_save {
        let paths = save_artifacts(&batch, &config, &config.output.dir)
            .with_context(|| format!("save artifacts to {}", config.output.dir.display()))?;
        println!("Artifacts saved to: {}", config.output.dir.display());
        println!("Report: {}", paths.markdown.display());
    }

    Ok(())
}

fn print_ranking(batch: &BatchReport, config: &ReportConfig) {
    println!();
    println!("=== Forecast Accuracy ===");
    println!(
        "Train through {}, test {} to {}",
        config.window.train_end, config.window.test_start, config.window.test_end
    );
    println!();
    println!(
        "{:<5} {:<8} {:<28} {:>10} {:>10} {:>8}",
        "Rank", "Symbol", "Model", "RMSE", "MAE", "MAPE"
    );
    println!("{}", "-".repeat(74));
    for (entry, report) in batch.ranked.iter().zip(&batch.reports) {
        println!(
            "{:<5} {:<8} {:<28} {:>10.4} {:>10.4} {:>7.2}%",
            entry.rank, entry.symbol, report.model.label, entry.rmse, entry.mae, entry.mape
        );
    }

    if !batch.failures.is_empty() {
        println!();
        println!("--- Failures ---");
        for f in &batch.failures {
            println!("{:<8} [{}] {}", f.symbol, f.stage, f.reason);
        }
    }
    println!();
}

fn run_detail(symbol: &str, run: RunArgs) -> Result<()> {
    let config = load_config(&run)?;
    let options = PipelineOptions::from_config(&config).context("invalid report configuration")?;
    let provider = config.build_provider().context("set up data provider")?;

    let report = run_symbol(provider.as_ref(), symbol, &options)?;
    print_detail(&report);
    Ok(())
}

fn print_detail(report: &SymbolReport) {
    let model = &report.model;

    println!();
    println!("=== {} ===", report.symbol);
    println!("Source:         {}", report.source);
    println!(
        "Training:       {} to {} ({} closes)",
        report.train_start, report.train_end, report.n_train
    );
    println!("Dataset hash:   {}", report.dataset_hash);
    println!();
    println!("--- Selected Model ---");
    println!("Model:          {}", model.label);
    println!("Candidates:     {}", model.candidates_tried);
    println!("sigma^2:        {:.6}", model.sigma2);
    println!("Log-lik:        {:.3}", model.log_likelihood);
    println!("AIC:            {:.3}", model.aic);
    println!("AICc:           {:.3}", model.aicc);
    println!("BIC:            {:.3}", model.bic);
    println!();
    println!("--- Coefficients ---");
    println!(
        "{:<12} {:>12} {:>12} {:>10} {:>10}",
        "Coefficient", "Estimate", "Std. Error", "t", "p"
    );
    println!("{}", "-".repeat(60));
    for c in &report.coefficients {
        println!(
            "{:<12} {:>12.6} {:>12} {:>10} {:>10}",
            c.name,
            c.estimate,
            c.std_error.map(|v| format!("{v:.6}")).unwrap_or_else(|| "-".into()),
            c.t_statistic.map(|v| format!("{v:.3}")).unwrap_or_else(|| "-".into()),
            c.p_value.map(|v| format!("{v:.4}")).unwrap_or_else(|| "-".into()),
        );
    }

    println!();
    println!("--- Forecast vs Actual ---");
    let mut header = format!("{:<12} {:>10} {:>10}", "Date", "Actual", "Forecast");
    for level in report.interval_levels() {
        header.push_str(&format!(" {:>21}", format!("{level}% interval")));
    }
    println!("{header}");
    for row in &report.forecast {
        let mut line = format!("{:<12} {:>10.2} {:>10.2}", row.date, row.actual, row.forecast);
        for b in &row.intervals {
            line.push_str(&format!(" {:>21}", format!("[{:.2}, {:.2}]", b.lower, b.upper)));
        }
        println!("{line}");
    }

    println!();
    println!("--- Accuracy ---");
    match &report.train_metrics {
        Some(m) => println!(
            "In-sample:      RMSE {:.4}  MAE {:.4}  MAPE {:.2}%",
            m.rmse, m.mae, m.mape
        ),
        None => println!("In-sample:      undefined (zero close in training window)"),
    }
    println!(
        "Test window:    RMSE {:.4}  MAE {:.4}  MAPE {:.2}%",
        report.test_metrics.rmse, report.test_metrics.mae, report.test_metrics.mape
    );
    println!();
}

fn run_fetch(
    symbol: &str,
    start: &str,
    end: &str,
    out: Option<PathBuf>,
    provider: ProviderKind,
    timeout_secs: u64,
) -> Result<()> {
    let mut config = ReportConfig::default();
    config.data.provider = provider;
    config.data.timeout_secs = timeout_secs;
    if provider == ProviderKind::Csv {
        anyhow::bail!("fetch reads from a remote or synthetic provider, not csv");
    }

    let start = parse_date(start, "start")?;
    let end = parse_date(end, "end")?;
    let provider = config.build_provider().context("set up data provider")?;
    let fetched = provider
        .fetch(symbol, start, end)
        .with_context(|| format!("fetch {symbol} from {}", provider.name()))?;

    let path = out.unwrap_or_else(|| PathBuf::from(format!("{symbol}.csv")));
    write_csv(&path, &fetched.bars).with_context(|| format!("write {}", path.display()))?;
    println!(
        "{symbol}: {} bars ({} to {}) written to {}",
        fetched.bars.len(),
        start,
        end,
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn report_flags_override_config() {
        let cli = Cli::try_parse_from([
            "arimalab",
            "report",
            "--symbols",
            "IBM",
            "ORCL",
            "--test-end",
            "2024-10-25",
            "--provider",
            "synthetic",
            "--exhaustive",
            "--no-save",
        ])
        .unwrap();
        let Commands::Report { symbols, run, no_save, .. } = cli.command else {
            panic!("expected report");
        };
        assert_eq!(symbols, vec!["IBM", "ORCL"]);
        assert!(no_save);

        let config = load_config(&run).unwrap();
        assert_eq!(config.window.test_end, NaiveDate::from_ymd_opt(2024, 10, 25).unwrap());
        assert_eq!(config.data.provider, ProviderKind::Synthetic);
        assert!(!config.model.stepwise);
        assert_eq!(config.window.train_end, ReportConfig::default().window.train_end);
    }

    #[test]
    fn bad_date_is_rejected_with_flag_name() {
        let cli = Cli::try_parse_from(["arimalab", "detail", "AAPL", "--train-end", "09/30/2024"])
            .unwrap();
        let Commands::Detail { run, .. } = cli.command else {
            panic!("expected detail");
        };
        let err = load_config(&run).unwrap_err();
        assert!(err.to_string().contains("--train-end"));
    }

    #[test]
    fn verbosity_counts() {
        let cli = Cli::try_parse_from(["arimalab", "-vv", "fetch", "SPY", "--start", "2024-01-02", "--end", "2024-02-01"])
            .unwrap();
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn unknown_provider_is_a_parse_error() {
        assert!(Cli::try_parse_from(["arimalab", "detail", "AAPL", "--provider", "bloomberg"]).is_err());
    }
}
