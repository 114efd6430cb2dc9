//! ArimaLab TUI - runs the forecast batch, then opens an interactive viewer.
//!
//! Keys: `j`/`k` or arrows switch symbol, `g`/`G` jump to first/last, `q` quits.

use std::io::{self, stdout};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::Level;

use arimalab_runner::{run_batch, PipelineOptions, ProviderKind, ReportConfig, TracingProgress};
use arimalab_tui::{handle_key_event, ui, App};

#[derive(Parser)]
#[command(name = "arimalab-tui", about = "Interactive viewer for ArimaLab forecasts")]
struct Args {
    /// Path to a TOML report config.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Symbols to evaluate. Defaults to the config's list.
    #[arg(long, num_args = 1..)]
    symbols: Vec<String>,

    /// Data provider: yahoo, csv or synthetic.
    #[arg(long)]
    provider: Option<ProviderKind>,

    /// Evaluate symbols on the thread pool.
    #[arg(long, default_value_t = false)]
    parallel: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_writer(io::stderr)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("install log subscriber")?;

    let mut config = match &args.config {
        Some(path) => ReportConfig::from_file(path)
            .with_context(|| format!("load config {}", path.display()))?,
        None => ReportConfig::default(),
    };
    if !args.symbols.is_empty() {
        config.report.symbols = args.symbols;
    }
    if let Some(provider) = args.provider {
        config.data.provider = provider;
    }

    // The batch runs before the terminal switches screens so progress lands on stderr.
    let options = PipelineOptions::from_config(&config).context("invalid report configuration")?;
    let provider = config.build_provider().context("set up data provider")?;
    let batch = run_batch(
        provider.as_ref(),
        &config.report.symbols,
        &options,
        args.parallel,
        &TracingProgress,
    );
    let mut app = App::new(batch, config);

    // Restore the terminal before printing a panic.
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), LeaveAlternateScreen);
        default_hook(info);
    }));

    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    while app.running {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(Duration::from_millis(250))? {
            if let Event::Key(key) = event::read()? {
                handle_key_event(app, key);
            }
        }
    }
    Ok(())
}
