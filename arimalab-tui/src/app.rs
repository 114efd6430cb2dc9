//! Viewer state: the finished batch and the selected symbol.

use arimalab_runner::{BatchReport, ReportConfig, SymbolReport};

pub struct App {
    pub batch: BatchReport,
    pub config: ReportConfig,
    /// Index into `batch.ranked` / `batch.reports`.
    pub selected: usize,
    pub running: bool,
}

impl App {
    pub fn new(batch: BatchReport, config: ReportConfig) -> Self {
        Self {
            batch,
            config,
            selected: 0,
            running: true,
        }
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Move to the next ranked symbol, wrapping at the end.
    pub fn select_next(&mut self) {
        let n = self.batch.reports.len();
        if n > 0 {
            self.selected = (self.selected + 1) % n;
        }
    }

    /// Move to the previous ranked symbol, wrapping at the start.
    pub fn select_previous(&mut self) {
        let n = self.batch.reports.len();
        if n > 0 {
            self.selected = (self.selected + n - 1) % n;
        }
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
    }

    pub fn select_last(&mut self) {
        self.selected = self.batch.reports.len().saturating_sub(1);
    }

    pub fn selected_report(&self) -> Option<&SymbolReport> {
        self.batch.reports.get(self.selected)
    }

    /// Model labels aligned with `batch.ranked`.
    pub fn model_labels(&self) -> Vec<&str> {
        self.batch
            .reports
            .iter()
            .map(|r| r.model.label.as_str())
            .collect()
    }
}
