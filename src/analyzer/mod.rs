// Analyzer module: dataset range resolution, series extraction and statistics.

pub mod price_analysis;
pub mod range;
pub mod series;

// Re-export the entry points for ease of use.
pub use price_analysis::{PriceChange, PriceStatistics};
pub use range::{dataset_bounds, next_period_from_cells};
pub use series::{extract_series, Series};
