mod daily;
mod entry;
mod food;
mod macros;
mod water;

pub use daily::DailySummary;
pub use entry::Entry;
pub use food::{normalize_barcode, Food, PER_100G_GRAMS};
pub use macros::Macros;
pub use water::WaterLog;
