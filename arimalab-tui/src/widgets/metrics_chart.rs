//! Metrics chart - grouped RMSE / MAE / MAPE bars, one group per symbol.
//!
//! Bars share one vertical scale, as in the reference report figure; the
//! exact value is printed on each bar.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Widget},
};

use arimalab_runner::RankedEntry;

use crate::theme::Theme;

const METRICS: [&str; 3] = ["RMSE", "MAE", "MAPE"];

pub struct MetricsChart<'a> {
    entries: &'a [RankedEntry],
    selected: Option<&'a str>,
    theme: &'a Theme,
}

impl<'a> MetricsChart<'a> {
    pub fn new(entries: &'a [RankedEntry], theme: &'a Theme) -> Self {
        Self {
            entries,
            selected: None,
            theme,
        }
    }

    /// Highlight the group label of `symbol`.
    pub fn selected(mut self, symbol: Option<&'a str>) -> Self {
        self.selected = symbol;
        self
    }

    fn values(entry: &RankedEntry) -> [f64; 3] {
        [entry.rmse, entry.mae, entry.mape]
    }
}

/// Bar heights are integers; hundredths keep two decimals of resolution.
fn bar_height(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        (value * 100.0).round() as u64
    } else {
        0
    }
}

impl<'a> Widget for MetricsChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut title = vec![Span::raw(" Accuracy ")];
        for metric in METRICS {
            title.push(Span::styled(
                format!("■ {metric} "),
                Style::default().fg(self.theme.metric_color(metric)),
            ));
        }
        let block = Block::default()
            .title(Line::from(title))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.accent))
            .style(Style::default().bg(self.theme.background));

        if self.entries.is_empty() {
            let inner = block.inner(area);
            block.render(area, buf);
            buf.set_string(
                inner.x,
                inner.y,
                "No ranked symbols",
                Style::default().fg(self.theme.muted),
            );
            return;
        }

        let mut chart = BarChart::default()
            .block(block)
            .bar_width(6)
            .bar_gap(0)
            .group_gap(2);

        for entry in self.entries {
            let bars: Vec<Bar> = METRICS
                .iter()
                .zip(Self::values(entry))
                .map(|(metric, value)| {
                    let color = self.theme.metric_color(metric);
                    Bar::default()
                        .value(bar_height(value))
                        .text_value(format!("{value:.2}"))
                        .style(Style::default().fg(color))
                        .value_style(Style::default().fg(self.theme.background).bg(color))
                })
                .collect();

            let label_style = if self.selected == Some(entry.symbol.as_str()) {
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(self.theme.text_secondary)
            };
            let group = BarGroup::default()
                .label(Line::styled(entry.symbol.clone(), label_style))
                .bars(&bars);
            chart = chart.data(group);
        }

        chart.render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(rank: usize, symbol: &str, mape: f64) -> RankedEntry {
        RankedEntry {
            rank,
            symbol: symbol.into(),
            rmse: mape * 3.0,
            mae: mape * 2.0,
            mape,
        }
    }

    #[test]
    fn bar_height_keeps_two_decimals() {
        assert_eq!(bar_height(1.126), 113);
        assert_eq!(bar_height(0.0), 0);
        assert_eq!(bar_height(-3.0), 0);
        assert_eq!(bar_height(f64::NAN), 0);
    }

    #[test]
    fn renders_group_labels() {
        let theme = Theme::default();
        let entries = vec![entry(1, "AAPL", 1.1), entry(2, "MSFT", 2.4)];
        let area = Rect::new(0, 0, 80, 16);
        let mut buf = Buffer::empty(area);
        MetricsChart::new(&entries, &theme)
            .selected(Some("MSFT"))
            .render(area, &mut buf);

        let mut content = String::new();
        for y in 0..area.height {
            for x in 0..area.width {
                content.push_str(buf.cell((x, y)).unwrap().symbol());
            }
        }
        assert!(content.contains("AAPL"));
        assert!(content.contains("MSFT"));
        assert!(content.contains("Accuracy"));
    }

    #[test]
    fn empty_entries_render_placeholder() {
        let theme = Theme::default();
        let area = Rect::new(0, 0, 40, 6);
        let mut buf = Buffer::empty(area);
        MetricsChart::new(&[], &theme).render(area, &mut buf);
        let row: String = (0..area.width)
            .map(|x| buf.cell((x, 1)).unwrap().symbol().to_string())
            .collect();
        assert!(row.contains("No ranked symbols"));
    }
}
