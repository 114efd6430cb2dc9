//! Price chart - closing-price history for one symbol

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    symbols,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Widget},
};

use arimalab_core::domain::PricePoint;

use super::padded_bounds;
use crate::theme::Theme;

pub struct PriceChart<'a> {
    symbol: &'a str,
    points: &'a [PricePoint],
    theme: &'a Theme,
}

impl<'a> PriceChart<'a> {
    pub fn new(symbol: &'a str, points: &'a [PricePoint], theme: &'a Theme) -> Self {
        Self {
            symbol,
            points,
            theme,
        }
    }
}

impl<'a> Widget for PriceChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(format!(" {} Close | {} days ", self.symbol, self.points.len()))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.accent))
            .style(Style::default().bg(self.theme.background));

        if self.points.is_empty() {
            let inner = block.inner(area);
            block.render(area, buf);
            buf.set_string(
                inner.x,
                inner.y,
                "No price data",
                Style::default().fg(self.theme.muted),
            );
            return;
        }

        let data: Vec<(f64, f64)> = self
            .points
            .iter()
            .enumerate()
            .map(|(i, p)| (i as f64, p.close))
            .collect();
        let x_max = (data.len() - 1).max(1) as f64;
        let (y_lower, y_upper) = padded_bounds(data.iter().map(|&(_, v)| v));

        let first = self.points[0].date;
        let mid = self.points[self.points.len() / 2].date;
        let last = self.points[self.points.len() - 1].date;
        let x_labels = vec![
            Span::raw(first.to_string()),
            Span::raw(mid.to_string()),
            Span::raw(last.to_string()),
        ];
        let y_labels = vec![
            Span::raw(format!("${:.0}", y_lower)),
            Span::raw(format!("${:.0}", (y_lower + y_upper) / 2.0)),
            Span::raw(format!("${:.0}", y_upper)),
        ];

        let datasets = vec![Dataset::default()
            .name("Close")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(self.theme.accent))
            .data(&data)];

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
                    .title(Span::styled("Close", Style::default().fg(self.theme.text_secondary)))
                    .style(Style::default().fg(self.theme.muted))
                    .bounds([y_lower, y_upper])
                    .labels(y_labels),
            )
            .render(area, buf);
    }
}
