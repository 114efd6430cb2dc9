//! Market data acquisition: provider trait and its implementations.

pub mod csv_source;
pub mod memory;
pub mod provider;
pub mod synthetic;
pub mod yahoo;

pub use csv_source::{read_csv, write_csv, CsvProvider};
pub use memory::{weekday_bars, InMemoryProvider};
pub use provider::{check_symbol, DataError, DataSource, FetchResult, PriceProvider};
pub use synthetic::SyntheticProvider;
pub use yahoo::YahooProvider;
