use serde::{Deserialize, Deserializer, Serialize};

use super::usda::KJ_PER_KCAL;
use super::{DraftError, FoodDraft};
use crate::models::{normalize_barcode, Macros};
use crate::numeric::round_to;
use crate::serving::{resolve_serving_anchor, MeasureUnit, ServingAnchor, ServingFields};

/// A product from the Open Food Facts `/api/v2/product/{code}` response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OffProduct {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub product_name_en: Option<String>,
    #[serde(default)]
    pub generic_name: Option<String>,
    #[serde(default)]
    pub brands: Option<String>,
    #[serde(default)]
    pub serving_size: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub serving_quantity: Option<f64>,
    #[serde(default)]
    pub serving_quantity_unit: Option<String>,
    #[serde(default)]
    pub nutriments: OffNutriments,
}

/// Nutrient map of a product. Energy without a unit suffix is in kJ.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OffNutriments {
    #[serde(rename = "energy-kcal_serving", default, deserialize_with = "lenient_number")]
    pub energy_kcal_serving: Option<f64>,
    #[serde(rename = "energy-kcal_100g", default, deserialize_with = "lenient_number")]
    pub energy_kcal_100g: Option<f64>,
    #[serde(rename = "energy-kj_serving", default, deserialize_with = "lenient_number")]
    pub energy_kj_serving: Option<f64>,
    #[serde(rename = "energy-kj_100g", default, deserialize_with = "lenient_number")]
    pub energy_kj_100g: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub energy_serving: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub energy_100g: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub carbohydrates_serving: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub carbohydrates_100g: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub proteins_serving: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub proteins_100g: Option<f64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

/// Accepts `12.5`, `"12.5"` and `"12,5"`; anything else becomes `None`.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<NumberOrText>::deserialize(deserializer)?;
    let value = match raw {
        Some(NumberOrText::Number(n)) => Some(n),
        Some(NumberOrText::Text(s)) => s.trim().replace(',', ".").parse().ok(),
        None => None,
    };
    Ok(value.filter(|v: &f64| v.is_finite()))
}

impl OffNutriments {
    fn kcal_serving(&self) -> Option<f64> {
        self.energy_kcal_serving
            .or_else(|| self.energy_kj_serving.map(|kj| kj / KJ_PER_KCAL))
            .or_else(|| self.energy_serving.map(|kj| kj / KJ_PER_KCAL))
    }

    fn kcal_100g(&self) -> Option<f64> {
        self.energy_kcal_100g
            .or_else(|| self.energy_kj_100g.map(|kj| kj / KJ_PER_KCAL))
            .or_else(|| self.energy_100g.map(|kj| kj / KJ_PER_KCAL))
    }
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(|s| s.trim()).filter(|s| !s.is_empty())
}

impl OffProduct {
    pub fn display_name(&self) -> Option<&str> {
        non_blank(self.product_name.as_ref())
            .or_else(|| non_blank(self.product_name_en.as_ref()))
            .or_else(|| non_blank(self.generic_name.as_ref()))
    }

    pub fn brand(&self) -> Option<&str> {
        non_blank(self.brands.as_ref()).map(|b| b.split(',').next().unwrap_or(b).trim())
    }

    /// The product's stated serving, in grams or milliliters.
    pub fn serving_anchor(&self) -> Option<ServingAnchor> {
        resolve_serving_anchor(ServingFields {
            serving_size: self.serving_quantity,
            serving_size_unit: self.serving_quantity_unit.as_deref(),
            serving_label: self.serving_size.as_deref(),
            ..Default::default()
        })
    }
}

impl FoodDraft {
    /// Builds a draft from a barcode lookup.
    ///
    /// Per-serving nutrients win; per-100 g nutrients are scaled by the
    /// stated serving. A product without a serving size, or without any of
    /// calories, carbs or protein, yields no draft.
    pub fn from_open_food_facts(product: &OffProduct) -> Result<FoodDraft, DraftError> {
        let name = product.display_name().ok_or(DraftError::BlankName)?;
        let anchor = product.serving_anchor().ok_or(DraftError::NoServingSize)?;

        let factor = anchor.factor();
        let pick = |serving: Option<f64>, per_100g: Option<f64>, nutrient: &'static str| {
            serving
                .or_else(|| per_100g.map(|v| v * factor))
                .ok_or(DraftError::MissingNutrient(nutrient))
        };

        let n = &product.nutriments;
        let calories = pick(n.kcal_serving(), n.kcal_100g(), "calories")?;
        let carbs = pick(n.carbohydrates_serving, n.carbohydrates_100g, "carbs")?;
        let protein = pick(n.proteins_serving, n.proteins_100g, "protein")?;
        let per_serving = Macros::new(calories, carbs, protein).floored();

        let mut draft = FoodDraft {
            name: name.to_string(),
            serving_size: Some(anchor.amount),
            serving_size_unit: Some(anchor.unit.into()),
            serving_size_grams: (anchor.unit == MeasureUnit::Grams).then_some(anchor.amount),
            serving_label: non_blank(product.serving_size.as_ref())
                .map(String::from)
                .or(Some(anchor.label)),
            barcode: product.code.as_deref().and_then(normalize_barcode),
            ..Default::default()
        };
        draft.set_macros(Macros::new(
            round_to(per_serving.calories, 0),
            round_to(per_serving.carbs, 1),
            round_to(per_serving.protein, 1),
        ));

        Ok(draft)
    }
}
