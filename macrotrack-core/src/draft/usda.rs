use serde::{Deserialize, Serialize};

use super::{DraftError, FoodDraft};
use crate::models::{normalize_barcode, Macros, PER_100G_GRAMS};
use crate::numeric::round_to;
use crate::serving::{resolve_serving_anchor, MeasureUnit, ServingFields, ServingSizeUnit};

/// kJ in one kcal.
pub(crate) const KJ_PER_KCAL: f64 = 4.184;

const ENERGY_KCAL: (u32, &str) = (1008, "208");
const ENERGY_ATWATER_GENERAL: (u32, &str) = (2047, "957");
const ENERGY_ATWATER_SPECIFIC: (u32, &str) = (2048, "958");
const ENERGY_KJ: (u32, &str) = (1062, "268");
const CARBOHYDRATE: (u32, &str) = (1005, "205");
const PROTEIN: (u32, &str) = (1003, "203");

/// A food from a FoodData Central `/foods/search` response.
///
/// Nutrient values are per 100 g.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsdaFood {
    #[serde(default)]
    pub fdc_id: Option<u64>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub data_type: Option<String>,
    #[serde(default)]
    pub brand_owner: Option<String>,
    #[serde(default)]
    pub brand_name: Option<String>,
    #[serde(default)]
    pub food_category: Option<String>,
    #[serde(default)]
    pub gtin_upc: Option<String>,
    #[serde(default)]
    pub serving_size: Option<f64>,
    #[serde(default)]
    pub serving_size_unit: Option<String>,
    #[serde(default)]
    pub household_serving_full_text: Option<String>,
    #[serde(default)]
    pub food_nutrients: Vec<UsdaNutrient>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsdaNutrient {
    #[serde(default)]
    pub nutrient_id: Option<u32>,
    #[serde(default)]
    pub nutrient_name: Option<String>,
    #[serde(default)]
    pub nutrient_number: Option<String>,
    #[serde(default)]
    pub unit_name: Option<String>,
    #[serde(default)]
    pub value: Option<f64>,
}

impl UsdaNutrient {
    fn is(&self, (id, number): (u32, &str)) -> bool {
        self.nutrient_id == Some(id) || self.nutrient_number.as_deref() == Some(number)
    }

    fn unit_is(&self, unit: &str) -> bool {
        self.unit_name
            .as_deref()
            .is_some_and(|u| u.eq_ignore_ascii_case(unit))
    }
}

impl UsdaFood {
    fn nutrient(&self, key: (u32, &str)) -> Option<f64> {
        self.food_nutrients
            .iter()
            .filter(|n| n.is(key))
            .find_map(|n| n.value)
            .filter(|v| v.is_finite())
    }

    /// Energy in kcal per 100 g.
    pub fn energy_kcal(&self) -> Option<f64> {
        self.nutrient(ENERGY_KCAL)
            .or_else(|| self.nutrient(ENERGY_ATWATER_GENERAL))
            .or_else(|| self.nutrient(ENERGY_ATWATER_SPECIFIC))
            .or_else(|| self.nutrient(ENERGY_KJ).map(|kj| kj / KJ_PER_KCAL))
            .or_else(|| {
                self.food_nutrients
                    .iter()
                    .filter(|n| {
                        n.unit_is("kJ")
                            && n.nutrient_name
                                .as_deref()
                                .is_some_and(|name| name.starts_with("Energy"))
                    })
                    .find_map(|n| n.value)
                    .map(|kj| kj / KJ_PER_KCAL)
            })
    }

    pub fn carbs(&self) -> Option<f64> {
        self.nutrient(CARBOHYDRATE)
    }

    pub fn protein(&self) -> Option<f64> {
        self.nutrient(PROTEIN)
    }

    /// Brand to show next to the description, if any.
    pub fn brand(&self) -> Option<&str> {
        self.brand_name
            .as_deref()
            .or(self.brand_owner.as_deref())
            .map(str::trim)
            .filter(|b| !b.is_empty())
    }

    /// True when the result's GTIN/UPC equals `barcode` (ignoring leading
    /// zeros, since UPC-A and EAN-13 differ by one).
    pub fn matches_barcode(&self, barcode: &str) -> bool {
        let (Some(ours), Some(theirs)) = (
            self.gtin_upc.as_deref().and_then(normalize_barcode),
            normalize_barcode(barcode),
        ) else {
            return false;
        };
        ours.trim_start_matches('0') == theirs.trim_start_matches('0')
    }
}

impl FoodDraft {
    /// Builds a draft from a USDA search result.
    ///
    /// Only a grams serving counts as an anchor; anything else leaves the
    /// values per 100 g. Calories are rounded to whole numbers, carbs and
    /// protein to one decimal.
    pub fn from_usda(food: &UsdaFood) -> Result<FoodDraft, DraftError> {
        let name = food.description.trim();
        if name.is_empty() {
            return Err(DraftError::BlankName);
        }

        let calories = food
            .energy_kcal()
            .ok_or(DraftError::MissingNutrient("calories"))?;
        let per_100g = Macros::new(
            calories,
            food.carbs().unwrap_or(0.0),
            food.protein().unwrap_or(0.0),
        );

        let anchor = resolve_serving_anchor(ServingFields {
            serving_size: food.serving_size,
            serving_size_unit: food.serving_size_unit.as_deref(),
            ..Default::default()
        })
        .filter(|a| a.unit == MeasureUnit::Grams);

        let factor = anchor.as_ref().map(|a| a.factor()).unwrap_or(1.0);
        let scaled = per_100g.scaled(factor).floored();

        let mut draft = FoodDraft {
            name: name.to_string(),
            barcode: food.gtin_upc.as_deref().and_then(normalize_barcode),
            ..Default::default()
        };
        draft.set_macros(Macros::new(
            round_to(scaled.calories, 0),
            round_to(scaled.carbs, 1),
            round_to(scaled.protein, 1),
        ));

        match anchor {
            Some(anchor) => {
                draft.serving_size = Some(anchor.amount);
                draft.serving_size_unit = Some(ServingSizeUnit::Grams);
                draft.serving_size_grams = Some(anchor.amount);
                draft.serving_label = Some(anchor.label);
            }
            None => {
                draft.serving_size = Some(PER_100G_GRAMS);
                draft.serving_size_unit = Some(ServingSizeUnit::Per100g);
                draft.serving_size_grams = Some(PER_100G_GRAMS);
                draft.serving_label = None;
            }
        }

        Ok(draft)
    }
}
