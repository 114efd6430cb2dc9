//! Ranking table - symbols ordered by test-window MAPE, then failures
//!
//! Displays:
//! - Rank, symbol, selected model
//! - RMSE, MAE, MAPE
//! - One row per failed symbol with the stage it failed at

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    widgets::{Block, Borders, Cell, Row, Table, Widget},
};

use arimalab_runner::{FailureRecord, RankedEntry};

use crate::theme::Theme;

pub struct RankingTable<'a> {
    ranked: &'a [RankedEntry],
    models: &'a [&'a str],
    failures: &'a [FailureRecord],
    selected_index: usize,
    theme: &'a Theme,
}

impl<'a> RankingTable<'a> {
    /// `models[i]` is the model label of `ranked[i]`.
    pub fn new(
        ranked: &'a [RankedEntry],
        models: &'a [&'a str],
        failures: &'a [FailureRecord],
        selected_index: usize,
        theme: &'a Theme,
    ) -> Self {
        Self {
            ranked,
            models,
            failures,
            selected_index,
            theme,
        }
    }
}

impl<'a> Widget for RankingTable<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let title = format!(
            " Ranking by MAPE | {} ok, {} failed ",
            self.ranked.len(),
            self.failures.len()
        );
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.accent))
            .style(Style::default().bg(self.theme.background));

        let header = Row::new(["#", "Symbol", "Model", "RMSE", "MAE", "MAPE"].map(|h| {
            Cell::from(h).style(
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD),
            )
        }))
        .height(1);

        let ranked_rows = self.ranked.iter().enumerate().map(|(i, e)| {
            let style = if i == self.selected_index {
                Style::default()
                    .bg(self.theme.band)
                    .fg(self.theme.text_primary)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(self.theme.text_primary)
            };
            let model = self.models.get(i).copied().unwrap_or("-");
            Row::new(vec![
                Cell::from(e.rank.to_string()),
                Cell::from(e.symbol.clone()),
                Cell::from(model.to_string()),
                Cell::from(format!("{:.3}", e.rmse)),
                Cell::from(format!("{:.3}", e.mae)),
                Cell::from(format!("{:.2}%", e.mape))
                    .style(Style::default().fg(self.theme.mape_color(e.mape))),
            ])
            .style(style)
        });

        let failure_rows = self.failures.iter().map(|f| {
            Row::new(vec![
                Cell::from("x"),
                Cell::from(f.symbol.clone()),
                Cell::from(format!("{} failed", f.stage)),
                Cell::from(""),
                Cell::from(""),
                Cell::from(""),
            ])
            .style(Style::default().fg(self.theme.negative))
        });

        let widths = [
            Constraint::Length(3),
            Constraint::Length(7),
            Constraint::Min(14),
            Constraint::Length(9),
            Constraint::Length(9),
            Constraint::Length(8),
        ];

        Table::new(ranked_rows.chain(failure_rows), widths)
            .header(header)
            .block(block)
            .column_spacing(1)
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arimalab_runner::Stage;

    fn text(buf: &Buffer, area: Rect) -> String {
        let mut content = String::new();
        for y in 0..area.height {
            for x in 0..area.width {
                content.push_str(buf.cell((x, y)).unwrap().symbol());
            }
            content.push('\n');
        }
        content
    }

    #[test]
    fn lists_ranked_then_failed_symbols() {
        let theme = Theme::default();
        let ranked = vec![
            RankedEntry { rank: 1, symbol: "AAPL".into(), rmse: 2.5, mae: 2.0, mape: 1.12 },
            RankedEntry { rank: 2, symbol: "NVDA".into(), rmse: 6.1, mae: 5.0, mape: 3.9 },
        ];
        let models = ["ARIMA(0,1,0)", "ARIMA(2,1,2)"];
        let failures = vec![FailureRecord {
            symbol: "MSFT".into(),
            stage: Stage::Fetch,
            reason: "network unreachable".into(),
        }];
        let area = Rect::new(0, 0, 80, 10);
        let mut buf = Buffer::empty(area);
        RankingTable::new(&ranked, &models, &failures, 0, &theme).render(area, &mut buf);

        let content = text(&buf, area);
        assert!(content.contains("2 ok, 1 failed"));
        assert!(content.contains("1.12%"));
        assert!(content.contains("ARIMA(2,1,2)"));
        assert!(content.contains("fetch failed"));

        let aapl = content.find("AAPL").unwrap();
        let nvda = content.find("NVDA").unwrap();
        let msft = content.find("MSFT").unwrap();
        assert!(aapl < nvda && nvda < msft);
    }

    #[test]
    fn missing_model_label_renders_dash() {
        let theme = Theme::default();
        let ranked = vec![RankedEntry { rank: 1, symbol: "X".into(), rmse: 1.0, mae: 1.0, mape: 1.0 }];
        let area = Rect::new(0, 0, 60, 5);
        let mut buf = Buffer::empty(area);
        RankingTable::new(&ranked, &[], &[], 0, &theme).render(area, &mut buf);
        assert!(text(&buf, area).contains(" - "));
    }
}
