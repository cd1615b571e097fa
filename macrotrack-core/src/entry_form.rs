//! Entry quantity resolution.
//!
//! An [`EntryForm`] holds the state of one in-progress entry: the selected
//! food's basis, whether the user types servings or grams, and the
//! canonical `servings` multiplier that totals are computed from.
//!
//! Foods with a true serving take a servings count. Foods whose values are
//! per 100 g take grams eaten, and `servings = grams / 100`. Either way the
//! totals are `servings × per-serving value`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Entry, Food, Macros, PER_100G_GRAMS};
use crate::numeric::{format_decimal, parse_decimal, parse_decimal_opt, round_to, STORED_PLACES};
use crate::serving::{nutrition_basis_label, ServingAnchor};

/// Places kept on a servings value derived from grams, so that grams typed
/// with two decimals survive a round trip.
const DERIVED_SERVINGS_PLACES: u32 = 4;

/// Label used when the form has no food basis, only snapshot values.
pub const SNAPSHOT_BASIS_LABEL: &str = "Per serving";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    #[default]
    Servings,
    Grams,
}

/// Why an entry could not be submitted.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EntryValidationError {
    #[error("Enter a food name")]
    BlankFoodName,

    #[error("Enter how many servings you ate")]
    MissingServings,

    #[error("Enter how many grams you ate")]
    MissingGrams,

    #[error("This food has no gram conversion; enter servings instead")]
    MissingConversion,
}

/// How a selected food's values relate to a serving.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodBasis {
    pub anchor: Option<ServingAnchor>,
    /// Grams making up one "serving" of a per-100 g food.
    pub grams_per_serving: Option<f64>,
}

impl FoodBasis {
    pub fn of(food: &Food) -> Self {
        let anchor = food.serving_anchor();
        let grams_per_serving = if anchor.is_none() && food.is_per_100g() {
            Some(PER_100G_GRAMS)
        } else {
            None
        };
        Self {
            anchor,
            grams_per_serving,
        }
    }

    pub fn has_true_serving(&self) -> bool {
        self.anchor.is_some()
    }

    /// Grams mode only for foods without a true serving that still have a
    /// gram conversion. Everything else, including foods with neither,
    /// takes a servings count.
    pub fn input_mode(&self) -> InputMode {
        match (self.has_true_serving(), self.grams_per_serving) {
            (false, Some(grams)) if grams > 0.0 => InputMode::Grams,
            _ => InputMode::Servings,
        }
    }

    pub fn label(&self) -> String {
        nutrition_basis_label(self.anchor.as_ref())
    }
}

/// Finished entry values, ready to be stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryDraft {
    pub food_name: String,
    pub servings: f64,
    pub per_serving: Macros,
}

impl EntryDraft {
    pub fn into_entry(self, date: NaiveDate) -> Entry {
        Entry::new(date, self.food_name, self.servings, self.per_serving)
    }

    /// Overwrites an existing entry's values, keeping its id, date and
    /// creation time.
    pub fn apply_to(self, entry: &mut Entry) {
        entry.food_name = self.food_name;
        entry.servings = self.servings;
        entry.calories_per_serving = self.per_serving.calories;
        entry.carbs_per_serving = self.per_serving.carbs;
        entry.protein_per_serving = self.per_serving.protein;
    }
}

/// State of one entry being added or edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryForm {
    food_name: String,
    per_serving: Macros,
    basis: Option<FoodBasis>,
    input_mode: InputMode,
    servings: f64,
    grams: Option<f64>,
}

impl Default for EntryForm {
    fn default() -> Self {
        Self {
            food_name: String::new(),
            per_serving: Macros::default(),
            basis: None,
            input_mode: InputMode::Servings,
            servings: 1.0,
            grams: None,
        }
    }
}

impl EntryForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects a food, snapshotting its values and picking the input mode.
    ///
    /// The quantity resets to one serving, or 100 g in grams mode.
    pub fn select_food(&mut self, food: &Food) {
        let basis = FoodBasis::of(food);
        self.food_name = food.name.clone();
        self.per_serving = food.macros();
        self.input_mode = basis.input_mode();
        self.servings = 1.0;
        self.grams = match self.input_mode {
            InputMode::Grams => basis.grams_per_serving,
            InputMode::Servings => None,
        };
        self.basis = Some(basis);
    }

    /// Rebuilds the form for editing a stored entry.
    ///
    /// `food` is the catalog food matching the entry's name, if it still
    /// exists. Its current basis decides the input mode; the entry's own
    /// snapshot values are kept either way.
    pub fn from_entry(entry: &Entry, food: Option<&Food>) -> Self {
        let mut form = Self {
            food_name: entry.food_name.clone(),
            per_serving: entry.per_serving(),
            servings: entry.servings,
            ..Self::default()
        };

        if let Some(food) = food {
            let basis = FoodBasis::of(food);
            form.input_mode = basis.input_mode();
            if form.input_mode == InputMode::Grams {
                form.grams = basis
                    .grams_per_serving
                    .map(|grams| round_to(entry.servings * grams, STORED_PLACES));
            }
            form.basis = Some(basis);
        }

        form
    }

    pub fn food_name(&self) -> &str {
        &self.food_name
    }

    pub fn set_food_name(&mut self, name: impl Into<String>) {
        self.food_name = name.into();
    }

    pub fn per_serving(&self) -> Macros {
        self.per_serving
    }

    pub fn input_mode(&self) -> InputMode {
        self.input_mode
    }

    pub fn servings(&self) -> f64 {
        self.servings
    }

    pub fn grams(&self) -> Option<f64> {
        self.grams
    }

    pub fn basis(&self) -> Option<&FoodBasis> {
        self.basis.as_ref()
    }

    fn grams_per_serving(&self) -> Option<f64> {
        self.basis
            .as_ref()
            .and_then(|b| b.grams_per_serving)
            .filter(|g| *g > 0.0)
    }

    pub fn basis_label(&self) -> String {
        match &self.basis {
            Some(basis) => basis.label(),
            None => SNAPSHOT_BASIS_LABEL.to_string(),
        }
    }

    /// Sets the servings count from typed text.
    pub fn set_servings(&mut self, raw: &str) {
        self.servings = parse_decimal(raw, 0.0);
        if self.input_mode == InputMode::Grams {
            self.grams = self
                .grams_per_serving()
                .map(|grams| round_to(self.servings * grams, STORED_PLACES));
        }
    }

    /// Sets grams eaten from typed text and derives servings from it.
    pub fn set_grams(&mut self, raw: &str) {
        self.grams = parse_decimal_opt(raw, 0.0);
        if let (Some(grams), Some(per_serving)) = (self.grams, self.grams_per_serving()) {
            self.servings = round_to(grams / per_serving, DERIVED_SERVINGS_PLACES);
        }
    }

    /// Live totals for the current quantity.
    pub fn totals(&self) -> Macros {
        self.per_serving.scaled(self.servings)
    }

    /// The quantity as the user sees it: "150 g" or "1.5 servings".
    pub fn displayed_quantity(&self) -> String {
        match (self.input_mode, self.grams) {
            (InputMode::Grams, Some(grams)) => format!("{} g", format_decimal(grams)),
            (InputMode::Grams, None) => String::new(),
            (InputMode::Servings, _) => {
                let unit = if self.servings == 1.0 {
                    "serving"
                } else {
                    "servings"
                };
                format!("{} {}", format_decimal(self.servings), unit)
            }
        }
    }

    /// Validates the form and produces the values to store.
    pub fn submit(&self) -> Result<EntryDraft, EntryValidationError> {
        let food_name = self.food_name.trim();
        if food_name.is_empty() {
            return Err(EntryValidationError::BlankFoodName);
        }

        let servings = match self.input_mode {
            InputMode::Servings => Some(self.servings)
                .filter(|s| s.is_finite() && *s > 0.0)
                .ok_or(EntryValidationError::MissingServings)?,
            InputMode::Grams => {
                let grams = self
                    .grams
                    .filter(|g| *g > 0.0)
                    .ok_or(EntryValidationError::MissingGrams)?;
                let per_serving = self
                    .grams_per_serving()
                    .ok_or(EntryValidationError::MissingConversion)?;
                round_to(grams / per_serving, DERIVED_SERVINGS_PLACES)
            }
        };

        Ok(EntryDraft {
            food_name: food_name.to_string(),
            servings,
            per_serving: self.per_serving.floored().rounded(),
        })
    }
}
