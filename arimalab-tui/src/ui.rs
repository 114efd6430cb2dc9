//! Top-level layout: ranking and accuracy bars on the left, the selected
//! symbol's price and forecast charts on the right, status bar below.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::app::App;
use crate::navigation::key_bindings_help;
use crate::theme::Theme;
use crate::widgets::{ForecastChart, MetricsChart, PriceChart, RankingTable};

/// Draw the entire UI.
pub fn draw(f: &mut Frame, app: &App) {
    let theme = Theme::default();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(f.area());

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(42), Constraint::Percentage(58)])
        .split(chunks[0]);

    draw_overview(f, columns[0], app, &theme);
    draw_symbol(f, columns[1], app, &theme);
    draw_status(f, chunks[1], app, &theme);
}

fn draw_overview(f: &mut Frame, area: Rect, app: &App, theme: &Theme) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let models = app.model_labels();
    f.render_widget(
        RankingTable::new(
            &app.batch.ranked,
            &models,
            &app.batch.failures,
            app.selected,
            theme,
        ),
        rows[0],
    );
    f.render_widget(
        MetricsChart::new(&app.batch.ranked, theme)
            .selected(app.selected_report().map(|r| r.symbol.as_str())),
        rows[1],
    );
}

fn draw_symbol(f: &mut Frame, area: Rect, app: &App, theme: &Theme) {
    let Some(report) = app.selected_report() else {
        let block = Block::default()
            .title(" Forecast ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.negative))
            .style(Style::default().bg(theme.background));
        let message = Paragraph::new("No symbol completed the pipeline.")
            .style(Style::default().fg(theme.text_secondary))
            .block(block);
        f.render_widget(message, area);
        return;
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    f.render_widget(PriceChart::new(&report.symbol, &report.history, theme), rows[0]);
    f.render_widget(ForecastChart::new(report, theme), rows[1]);
}

fn draw_status(f: &mut Frame, area: Rect, app: &App, theme: &Theme) {
    let mut spans: Vec<Span> = Vec::new();
    for (keys, action) in key_bindings_help() {
        spans.push(Span::styled(format!(" {keys}: "), Style::default().fg(theme.muted)));
        spans.push(Span::styled(action, Style::default().fg(theme.text_secondary)));
    }

    let window = &app.config.window;
    spans.push(Span::raw(" | "));
    spans.push(Span::styled(
        format!(
            "train ≤ {} | test {} to {}",
            window.train_end, window.test_start, window.test_end
        ),
        Style::default().fg(theme.accent),
    ));

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
