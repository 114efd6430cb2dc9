//! Forecast chart - forecast against the actual test-window closes
//!
//! Displays:
//! - The last `tail` training closes
//! - Actual closes over the test window
//! - Point forecast
//! - Upper and lower bounds of the widest prediction interval

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    symbols,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Widget},
};

use arimalab_runner::SymbolReport;

use super::padded_bounds;
use crate::theme::Theme;

/// Training closes shown ahead of the test window by default.
pub const DEFAULT_TAIL: usize = 60;

pub struct ForecastChart<'a> {
    report: &'a SymbolReport,
    tail: usize,
    theme: &'a Theme,
}

/// Plot series in chart coordinates; x is the day index from the start of the tail.
#[derive(Debug, Default)]
struct Series {
    train: Vec<(f64, f64)>,
    actual: Vec<(f64, f64)>,
    forecast: Vec<(f64, f64)>,
    upper: Vec<(f64, f64)>,
    lower: Vec<(f64, f64)>,
    band_level: Option<f64>,
}

impl<'a> ForecastChart<'a> {
    pub fn new(report: &'a SymbolReport, theme: &'a Theme) -> Self {
        Self {
            report,
            tail: DEFAULT_TAIL,
            theme,
        }
    }

    pub fn tail(mut self, tail: usize) -> Self {
        self.tail = tail;
        self
    }

    fn series(&self) -> Series {
        let train: Vec<f64> = self
            .report
            .history
            .iter()
            .filter(|p| p.date <= self.report.train_end)
            .map(|p| p.close)
            .collect();
        let skip = train.len().saturating_sub(self.tail);
        let offset = (train.len() - skip) as f64;

        let band_level = self
            .report
            .interval_levels()
            .into_iter()
            .max_by(|a, b| a.total_cmp(b));

        let mut series = Series {
            train: train[skip..]
                .iter()
                .enumerate()
                .map(|(i, v)| (i as f64, *v))
                .collect(),
            band_level,
            ..Series::default()
        };

        for (h, row) in self.report.forecast.iter().enumerate() {
            let x = offset + h as f64;
            series.actual.push((x, row.actual));
            series.forecast.push((x, row.forecast));
            if let Some(b) = row.intervals.iter().find(|b| Some(b.level) == band_level) {
                series.upper.push((x, b.upper));
                series.lower.push((x, b.lower));
            }
        }
        series
    }
}

impl<'a> Widget for ForecastChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let series = self.series();
        let mape = self.report.mape();

        let title = format!(
            " {} | {} | MAPE {:.2}% ",
            self.report.symbol, self.report.model.label, mape
        );
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.mape_color(mape)))
            .style(Style::default().bg(self.theme.background));

        let x_max = (series.train.len() + series.actual.len()).saturating_sub(1).max(1) as f64;
        let (y_lower, y_upper) = padded_bounds(
            series
                .train
                .iter()
                .chain(&series.actual)
                .chain(&series.forecast)
                .chain(&series.upper)
                .chain(&series.lower)
                .map(|&(_, v)| v),
        );

        let band_name = series
            .band_level
            .map(|l| format!("{l}% band"))
            .unwrap_or_else(|| "band".into());

        let mut datasets = vec![
            Dataset::default()
                .name("Train")
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(self.theme.muted))
                .data(&series.train),
            Dataset::default()
                .name("Actual")
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(self.theme.accent))
                .data(&series.actual),
            Dataset::default()
                .name("Forecast")
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(self.theme.forecast))
                .data(&series.forecast),
        ];
        if !series.upper.is_empty() {
            datasets.push(
                Dataset::default()
                    .name(band_name)
                    .marker(symbols::Marker::Dot)
                    .graph_type(GraphType::Line)
                    .style(Style::default().fg(self.theme.band))
                    .data(&series.upper),
            );
            datasets.push(
                Dataset::default()
                    .marker(symbols::Marker::Dot)
                    .graph_type(GraphType::Line)
                    .style(Style::default().fg(self.theme.band))
                    .data(&series.lower),
            );
        }

        let first_test = self.report.forecast.first().map(|r| r.date.to_string());
        let last_test = self.report.forecast.last().map(|r| r.date.to_string());
        let x_labels = vec![
            Span::raw(format!("-{}", series.train.len())),
            Span::raw(first_test.unwrap_or_default()),
            Span::raw(last_test.unwrap_or_default()),
        ];
        let y_labels = vec![
            Span::raw(format!("${:.0}", y_lower)),
            Span::raw(format!("${:.0}", (y_lower + y_upper) / 2.0)),
            Span::raw(format!("${:.0}", y_upper)),
        ];

        Chart::new(datasets)
            .block(block)
            .x_axis(
                Axis::default()
                    .style(Style::default().fg(self.theme.muted))
                    .bounds([0.0, x_max])
                    .labels(x_labels),
            )
            .y_axis(
                Axis::default()
                    .style(Style::default().fg(self.theme.muted))
                    .bounds([y_lower, y_upper])
                    .labels(y_labels),
            )
            .render(area, buf);
    }
}
