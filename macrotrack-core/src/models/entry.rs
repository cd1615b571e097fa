use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::macros::Macros;
use crate::numeric::format_decimal;

/// A logged consumption record.
///
/// Macro values are a snapshot of the food at logging time; later edits to
/// the food do not change them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Entry {
    pub id: Uuid,
    pub date: NaiveDate,
    pub food_name: String,
    pub servings: f64,
    pub calories_per_serving: f64,
    pub carbs_per_serving: f64,
    pub protein_per_serving: f64,
    pub created_at: DateTime<Utc>,
}

impl Entry {
    pub fn new(
        date: NaiveDate,
        food_name: impl Into<String>,
        servings: f64,
        per_serving: Macros,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            food_name: food_name.into(),
            servings,
            calories_per_serving: per_serving.calories,
            carbs_per_serving: per_serving.carbs,
            protein_per_serving: per_serving.protein,
            created_at: Utc::now(),
        }
    }

    pub fn per_serving(&self) -> Macros {
        Macros::new(
            self.calories_per_serving,
            self.carbs_per_serving,
            self.protein_per_serving,
        )
    }

    /// `servings × per-serving value` for each macro.
    pub fn totals(&self) -> Macros {
        self.per_serving().scaled(self.servings)
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} x {}: {}",
            format_decimal(self.servings),
            self.food_name,
            self.totals()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
    }

    #[test]
    fn test_entry_totals_are_servings_times_values() {
        let entry = Entry::new(date(), "Oats", 1.5, Macros::new(150.0, 27.0, 5.0));
        let totals = entry.totals();
        assert_eq!(totals.calories, 1.5 * 150.0);
        assert_eq!(totals.carbs, 1.5 * 27.0);
        assert_eq!(totals.protein, 1.5 * 5.0);
    }

    #[test]
    fn test_entry_display() {
        let entry = Entry::new(date(), "Oats", 2.0, Macros::new(150.0, 27.0, 5.0));
        assert_eq!(
            format!("{}", entry),
            "2 x Oats: Calories: 300 | Carbs: 54g | Protein: 10g"
        );
    }

    #[test]
    fn test_entry_json_roundtrip() {
        let entry = Entry::new(date(), "Apple", 0.5, Macros::new(95.0, 25.0, 0.5));
        let json = serde_json::to_string(&entry).unwrap();
        let parsed: Entry = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, entry);
    }
}
