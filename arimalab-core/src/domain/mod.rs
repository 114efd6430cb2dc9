//! Domain types: daily bars and closing-price series.

pub mod bar;
pub mod series;

pub use bar::DailyBar;
pub use series::{PricePoint, PriceSeries, SeriesError};
