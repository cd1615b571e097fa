//! Serving anchors: what "one serving" of a food means.
//!
//! Nutrition values are either anchored to a real serving (N grams or N
//! milliliters) or default to a per-100 g basis. Resolution never fails;
//! missing or unparseable data simply means no anchor.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::numeric::format_decimal;

/// Stored value of the per-100 g sentinel unit.
pub const PER_100G: &str = "per100g";

/// Label shown when a food has no true serving.
pub const PER_100G_LABEL: &str = "Per 100 g";

/// Unit a serving amount is measured in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasureUnit {
    Grams,
    Milliliters,
}

impl MeasureUnit {
    /// Looks up a unit spelling. Only the listed spellings are accepted.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "g" | "gr" | "grs" | "gram" | "grams" | "gramme" | "grammes" | "grm" => {
                Some(MeasureUnit::Grams)
            }
            "ml" | "mls" | "milliliter" | "milliliters" | "millilitre" | "millilitres" | "mlt" => {
                Some(MeasureUnit::Milliliters)
            }
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            MeasureUnit::Grams => "g",
            MeasureUnit::Milliliters => "ml",
        }
    }
}

impl fmt::Display for MeasureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// The `servingSizeUnit` stored on a food.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServingSizeUnit {
    #[serde(rename = "g")]
    Grams,
    #[serde(rename = "ml")]
    Milliliters,
    #[serde(rename = "per100g")]
    Per100g,
}

impl ServingSizeUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            ServingSizeUnit::Grams => "g",
            ServingSizeUnit::Milliliters => "ml",
            ServingSizeUnit::Per100g => PER_100G,
        }
    }
}

impl From<MeasureUnit> for ServingSizeUnit {
    fn from(unit: MeasureUnit) -> Self {
        match unit {
            MeasureUnit::Grams => ServingSizeUnit::Grams,
            MeasureUnit::Milliliters => ServingSizeUnit::Milliliters,
        }
    }
}

impl fmt::Display for ServingSizeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ServingSizeUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if is_per_100g(s) {
            return Ok(ServingSizeUnit::Per100g);
        }
        MeasureUnit::parse(s).map(ServingSizeUnit::from).ok_or_else(|| {
            format!(
                "Invalid serving unit '{}'. Valid options: g, ml, {}",
                s, PER_100G
            )
        })
    }
}

fn is_per_100g(raw: &str) -> bool {
    let normalized: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
        .collect::<String>()
        .to_lowercase();
    normalized == PER_100G
}

/// A resolved "one serving = N units" fact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServingAnchor {
    pub amount: f64,
    pub unit: MeasureUnit,
    pub label: String,
}

impl ServingAnchor {
    pub fn new(amount: f64, unit: MeasureUnit) -> Self {
        Self {
            amount,
            unit,
            label: format!("{} {}", format_decimal(amount), unit),
        }
    }

    /// Factor turning per-100-unit values into per-serving values.
    pub fn factor(&self) -> f64 {
        self.amount / 100.0
    }
}

/// Raw serving fields as they appear on a food or a lookup result.
#[derive(Debug, Clone, Copy, Default)]
pub struct ServingFields<'a> {
    pub serving_size_grams: Option<f64>,
    pub serving_size: Option<f64>,
    pub serving_size_unit: Option<&'a str>,
    pub serving_label: Option<&'a str>,
}

fn positive(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}

static LABEL_AMOUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+(?:[.,]\d+)?)\s*(ml|g)\b").expect("serving label pattern is valid")
});

/// Finds the first `<number> g` / `<number> ml` in free text such as
/// `"1 cup (240 ml)"` or `"2 biscuits 30,5g"`.
pub fn parse_serving_label(label: &str) -> Option<ServingAnchor> {
    let caps = LABEL_AMOUNT.captures(label)?;
    let amount: f64 = caps[1].replace(',', ".").parse().ok()?;
    let unit = MeasureUnit::parse(&caps[2])?;
    positive(Some(amount)).map(|amount| ServingAnchor::new(amount, unit))
}

/// Resolves the serving anchor for a set of serving fields.
pub fn resolve_serving_anchor(fields: ServingFields<'_>) -> Option<ServingAnchor> {
    if fields.serving_size_unit.is_some_and(is_per_100g) {
        return None;
    }

    if let Some(grams) = positive(fields.serving_size_grams) {
        return Some(ServingAnchor::new(grams, MeasureUnit::Grams));
    }

    if let (Some(size), Some(unit)) = (
        positive(fields.serving_size),
        fields.serving_size_unit.and_then(MeasureUnit::parse),
    ) {
        return Some(ServingAnchor::new(size, unit));
    }

    fields
        .serving_label
        .filter(|label| !label.trim().is_empty())
        .and_then(parse_serving_label)
}

/// Label naming the denominator of a food's nutrition values.
pub fn nutrition_basis_label(anchor: Option<&ServingAnchor>) -> String {
    match anchor {
        Some(anchor) => format!("Per serving ({})", anchor.label),
        None => PER_100G_LABEL.to_string(),
    }
}
