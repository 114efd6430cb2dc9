//! ArimaLab TUI - terminal viewer for a finished forecast batch
//!
//! Shows the MAPE ranking, grouped accuracy bars, and for the selected
//! symbol its closing-price history and forecast against the test window.

pub mod app;
pub mod navigation;
pub mod theme;
pub mod ui;
pub mod widgets;

pub use app::App;
pub use navigation::handle_key_event;
pub use theme::Theme;

#[cfg(test)]
mod test_helpers;
