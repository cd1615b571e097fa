use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::macros::Macros;
use crate::numeric::format_decimal;
use crate::serving::{
    nutrition_basis_label, resolve_serving_anchor, ServingAnchor, ServingFields, ServingSizeUnit,
};

/// Grams represented by one "serving" of a per-100 g food.
pub const PER_100G_GRAMS: f64 = 100.0;

/// A saved catalog item.
///
/// Macro values are defined per serving when the food has a true serving,
/// otherwise per 100 g.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Food {
    pub id: Uuid,
    pub name: String,
    pub calories_per_serving: f64,
    pub carbs_per_serving: f64,
    pub protein_per_serving: f64,
    pub favorite: bool,
    pub barcode: Option<String>,
    pub serving_size: Option<f64>,
    pub serving_size_unit: Option<ServingSizeUnit>,
    pub serving_size_grams: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Food {
    pub fn new(name: impl Into<String>, macros: Macros) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            calories_per_serving: macros.calories,
            carbs_per_serving: macros.carbs,
            protein_per_serving: macros.protein,
            favorite: false,
            barcode: None,
            serving_size: None,
            serving_size_unit: None,
            serving_size_grams: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_favorite(mut self, favorite: bool) -> Self {
        self.favorite = favorite;
        self
    }

    pub fn with_barcode(mut self, barcode: &str) -> Self {
        self.barcode = normalize_barcode(barcode);
        self
    }

    pub fn with_serving_size(mut self, size: f64, unit: ServingSizeUnit) -> Self {
        self.serving_size = Some(size);
        self.serving_size_unit = Some(unit);
        self
    }

    pub fn with_serving_size_grams(mut self, grams: f64) -> Self {
        self.serving_size_grams = Some(grams);
        self
    }

    /// Marks the food's values as per 100 g.
    pub fn per_100g(mut self) -> Self {
        self.serving_size = Some(PER_100G_GRAMS);
        self.serving_size_unit = Some(ServingSizeUnit::Per100g);
        self.serving_size_grams = Some(PER_100G_GRAMS);
        self
    }

    pub fn macros(&self) -> Macros {
        Macros::new(
            self.calories_per_serving,
            self.carbs_per_serving,
            self.protein_per_serving,
        )
    }

    pub fn serving_fields(&self) -> ServingFields<'_> {
        ServingFields {
            serving_size_grams: self.serving_size_grams,
            serving_size: self.serving_size,
            serving_size_unit: self.serving_size_unit.as_ref().map(ServingSizeUnit::as_str),
            serving_label: None,
        }
    }

    pub fn serving_anchor(&self) -> Option<ServingAnchor> {
        resolve_serving_anchor(self.serving_fields())
    }

    pub fn has_true_serving(&self) -> bool {
        self.serving_anchor().is_some()
    }

    pub fn basis_label(&self) -> String {
        nutrition_basis_label(self.serving_anchor().as_ref())
    }

    pub fn is_per_100g(&self) -> bool {
        self.serving_size_unit == Some(ServingSizeUnit::Per100g)
    }
}

/// Keeps only the digits of a scanned or typed barcode.
pub fn normalize_barcode(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        None
    } else {
        Some(digits)
    }
}

impl fmt::Display for Food {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let star = if self.favorite { " *" } else { "" };
        writeln!(f, "{}{}", self.name, star)?;
        writeln!(f, "{}", "=".repeat(self.name.len() + star.len()))?;
        writeln!(f, "{}", self.basis_label())?;
        writeln!(f, "  {}", self.macros())?;

        if let (Some(size), Some(unit)) = (self.serving_size, self.serving_size_unit) {
            if unit != ServingSizeUnit::Per100g {
                writeln!(f, "Serving size: {} {}", format_decimal(size), unit)?;
            }
        }
        if let Some(barcode) = &self.barcode {
            writeln!(f, "Barcode: {}", barcode)?;
        }

        Ok(())
    }
}
