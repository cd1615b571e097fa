//! Draft building errors.

use thiserror::Error;

/// Source data was not enough to produce a food draft.
///
/// Callers treat every variant as "not found" and offer manual entry.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DraftError {
    #[error("food name is blank")]
    BlankName,

    #[error("no serving size could be determined")]
    NoServingSize,

    #[error("no {0} value could be determined")]
    MissingNutrient(&'static str),
}
