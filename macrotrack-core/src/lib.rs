//! macrotrack core library
//!
//! Food resolution and unit normalization: what a food's nutrition values
//! are measured against, and how a logged quantity turns into totals.

pub mod draft;
pub mod entry_form;
pub mod models;
pub mod numeric;
pub mod serving;

pub use draft::{DraftError, FoodDraft, FoodEdits, OffNutriments, OffProduct, UsdaFood, UsdaNutrient};
pub use entry_form::{EntryDraft, EntryForm, EntryValidationError, FoodBasis, InputMode};
pub use models::{normalize_barcode, DailySummary, Entry, Food, Macros, WaterLog, PER_100G_GRAMS};
pub use numeric::{format_decimal, parse_decimal, parse_decimal_opt, round_to};
pub use serving::{
    nutrition_basis_label, resolve_serving_anchor, MeasureUnit, ServingAnchor, ServingFields,
    ServingSizeUnit,
};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
