//! Food drafts: candidate values for a food before it is saved.
//!
//! A draft comes from one of three sources:
//! - a USDA FoodData Central search result ([`FoodDraft::from_usda`])
//! - an Open Food Facts product ([`FoodDraft::from_open_food_facts`])
//! - an already saved food ([`FoodDraft::from_food`])
//!
//! or starts empty for manual entry. User edits are applied with
//! [`FoodDraft::apply`] and the result is committed with [`FoodDraft::commit`].

mod error;
mod open_food_facts;
mod usda;

pub use error::DraftError;
pub use open_food_facts::{OffNutriments, OffProduct};
pub use usda::{UsdaFood, UsdaNutrient};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::{normalize_barcode, Food, Macros, PER_100G_GRAMS};
use crate::numeric::{parse_decimal, parse_decimal_opt};
use crate::serving::{
    nutrition_basis_label, resolve_serving_anchor, ServingAnchor, ServingFields, ServingSizeUnit,
};

/// Candidate values for a food.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FoodDraft {
    pub name: String,
    pub calories_per_serving: f64,
    pub carbs_per_serving: f64,
    pub protein_per_serving: f64,
    pub serving_size: Option<f64>,
    pub serving_size_unit: Option<ServingSizeUnit>,
    pub serving_size_grams: Option<f64>,
    pub serving_label: Option<String>,
    pub barcode: Option<String>,
}

/// Raw user edits to a draft, as typed.
///
/// `None` leaves the field untouched. Numeric text goes through the
/// decimal normalizer.
#[derive(Debug, Clone, Default)]
pub struct FoodEdits {
    pub name: Option<String>,
    pub calories: Option<String>,
    pub carbs: Option<String>,
    pub protein: Option<String>,
    pub serving_size: Option<String>,
    pub serving_size_unit: Option<ServingSizeUnit>,
    pub serving_size_grams: Option<String>,
    pub barcode: Option<String>,
}

impl FoodDraft {
    /// An empty draft for manual entry.
    pub fn manual(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Wraps a saved food's values unchanged. Saved values are already
    /// anchored, so nothing is rescaled.
    pub fn from_food(food: &Food) -> Self {
        Self {
            name: food.name.clone(),
            calories_per_serving: food.calories_per_serving,
            carbs_per_serving: food.carbs_per_serving,
            protein_per_serving: food.protein_per_serving,
            serving_size: food.serving_size,
            serving_size_unit: food.serving_size_unit,
            serving_size_grams: food.serving_size_grams,
            serving_label: food.serving_anchor().map(|a| a.label),
            barcode: food.barcode.clone(),
        }
    }

    pub fn macros(&self) -> Macros {
        Macros::new(
            self.calories_per_serving,
            self.carbs_per_serving,
            self.protein_per_serving,
        )
    }

    fn set_macros(&mut self, macros: Macros) {
        self.calories_per_serving = macros.calories;
        self.carbs_per_serving = macros.carbs;
        self.protein_per_serving = macros.protein;
    }

    pub fn serving_fields(&self) -> ServingFields<'_> {
        ServingFields {
            serving_size_grams: self.serving_size_grams,
            serving_size: self.serving_size,
            serving_size_unit: self.serving_size_unit.as_ref().map(ServingSizeUnit::as_str),
            serving_label: self.serving_label.as_deref(),
        }
    }

    pub fn serving_anchor(&self) -> Option<ServingAnchor> {
        resolve_serving_anchor(self.serving_fields())
    }

    pub fn basis_label(&self) -> String {
        nutrition_basis_label(self.serving_anchor().as_ref())
    }

    /// Applies typed user edits.
    pub fn apply(&mut self, edits: &FoodEdits) {
        if let Some(name) = &edits.name {
            self.name = name.clone();
        }
        if let Some(raw) = &edits.calories {
            self.calories_per_serving = parse_decimal(raw, 0.0);
        }
        if let Some(raw) = &edits.carbs {
            self.carbs_per_serving = parse_decimal(raw, 0.0);
        }
        if let Some(raw) = &edits.protein {
            self.protein_per_serving = parse_decimal(raw, 0.0);
        }
        if edits.serving_size.is_some() || edits.serving_size_unit.is_some() {
            self.apply_serving(edits);
        }
        if let Some(raw) = &edits.serving_size_grams {
            self.serving_size_grams = parse_decimal_opt(raw, 0.0).filter(|v| *v > 0.0);
            self.serving_label = None;
        }
        if let Some(raw) = &edits.barcode {
            self.barcode = normalize_barcode(raw);
        }
    }

    /// Sets a new serving size or unit and keeps the grams value in step.
    ///
    /// An explicit grams edit is applied afterwards and wins.
    fn apply_serving(&mut self, edits: &FoodEdits) {
        let had_grams = self.serving_size_grams.is_some();
        if let Some(raw) = &edits.serving_size {
            self.serving_size = parse_decimal_opt(raw, 0.0).filter(|v| *v > 0.0);
        }
        match edits.serving_size_unit {
            Some(unit) => self.serving_size_unit = Some(unit),
            // A new amount on a per-100 g food, or on a grams-only food,
            // is an amount in grams.
            None if self.serving_size.is_some()
                && (self.serving_size_unit == Some(ServingSizeUnit::Per100g)
                    || (self.serving_size_unit.is_none() && had_grams)) =>
            {
                self.serving_size_unit = Some(ServingSizeUnit::Grams);
            }
            None => {}
        }

        self.serving_size_grams = match self.serving_size_unit {
            Some(ServingSizeUnit::Grams) => self.serving_size,
            Some(ServingSizeUnit::Per100g) => Some(PER_100G_GRAMS),
            Some(ServingSizeUnit::Milliliters) | None => None,
        };
        self.serving_label = None;
    }

    /// Turns the draft into a food ready to be saved.
    ///
    /// When `existing` is given its identity, favorite flag and creation
    /// time are kept.
    pub fn commit(self, existing: Option<&Food>) -> Result<Food, DraftError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(DraftError::BlankName);
        }

        let mut food = Food::new(name, self.macros().floored().rounded());
        food.serving_size = self.serving_size;
        food.serving_size_unit = self.serving_size_unit;
        food.serving_size_grams = self.serving_size_grams;
        food.barcode = self.barcode.as_deref().and_then(normalize_barcode);

        // A label-only anchor would be lost once saved; keep it as real fields.
        if food.serving_anchor().is_none() && food.serving_size_unit.is_none() {
            if let Some(anchor) = self.serving_anchor() {
                food.serving_size = Some(anchor.amount);
                food.serving_size_unit = Some(anchor.unit.into());
            }
        }

        if let Some(existing) = existing {
            food.id = existing.id;
            food.favorite = existing.favorite;
            food.created_at = existing.created_at;
            food.updated_at = Utc::now();
        }

        Ok(food)
    }
}

impl fmt::Display for FoodDraft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.name)?;
        writeln!(f, "  {}: {}", self.basis_label(), self.macros())?;
        if let Some(barcode) = &self.barcode {
            writeln!(f, "  Barcode: {}", barcode)?;
        }
        Ok(())
    }
}
