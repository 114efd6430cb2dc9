//! Parrot/neon theme tokens for the forecast viewer.
//!
//! # Color Palette
//! - **Background**: deep charcoal
//! - **Accent**: electric cyan (focus, actual prices)
//! - **Forecast**: neon orange (point forecast)
//! - **Band**: cool purple (prediction interval bounds)
//! - **Positive / Negative**: neon green / hot pink (accuracy grading, failures)

use ratatui::style::Color;

#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub background: Color,
    pub accent: Color,
    pub forecast: Color,
    pub band: Color,
    pub positive: Color,
    pub negative: Color,
    pub warning: Color,
    pub muted: Color,
    pub text_primary: Color,
    pub text_secondary: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::parrot_neon()
    }
}

impl Theme {
    pub fn parrot_neon() -> Self {
        Self {
            background: Color::Rgb(18, 18, 20),
            accent: Color::Rgb(0, 255, 255),
            forecast: Color::Rgb(255, 140, 0),
            band: Color::Rgb(147, 112, 219),
            positive: Color::Rgb(0, 255, 128),
            negative: Color::Rgb(255, 20, 147),
            warning: Color::Rgb(255, 215, 0),
            muted: Color::Rgb(100, 149, 237),
            text_primary: Color::White,
            text_secondary: Color::Rgb(170, 170, 170),
        }
    }

    /// Color for a test-window MAPE (percent): greener is more accurate.
    pub fn mape_color(&self, mape: f64) -> Color {
        match mape {
            m if m < 2.0 => self.positive,
            m if m < 5.0 => self.accent,
            m if m < 10.0 => self.warning,
            _ => self.negative,
        }
    }

    /// Bar color for each metric in the grouped accuracy chart.
    pub fn metric_color(&self, metric: &str) -> Color {
        match metric {
            "RMSE" => self.accent,
            "MAE" => self.band,
            "MAPE" => self.forecast,
            _ => self.text_secondary,
        }
    }
}
