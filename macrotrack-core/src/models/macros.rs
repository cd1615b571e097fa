use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::Add;

use crate::numeric::{clamp_min, format_decimal, round_to, STORED_PLACES};

/// Calories, carbohydrate and protein, either per serving or as totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Macros {
    pub calories: f64,
    pub carbs: f64,
    pub protein: f64,
}

impl Macros {
    pub fn new(calories: f64, carbs: f64, protein: f64) -> Self {
        Self {
            calories,
            carbs,
            protein,
        }
    }

    /// Multiplies every value by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            calories: self.calories * factor,
            carbs: self.carbs * factor,
            protein: self.protein * factor,
        }
    }

    /// Floors every value at zero.
    pub fn floored(&self) -> Self {
        Self {
            calories: clamp_min(self.calories, 0.0),
            carbs: clamp_min(self.carbs, 0.0),
            protein: clamp_min(self.protein, 0.0),
        }
    }

    /// Rounds every value to the stored two-decimal precision.
    pub fn rounded(&self) -> Self {
        Self {
            calories: round_to(self.calories, STORED_PLACES),
            carbs: round_to(self.carbs, STORED_PLACES),
            protein: round_to(self.protein, STORED_PLACES),
        }
    }
}

impl Add for Macros {
    type Output = Macros;

    fn add(self, other: Macros) -> Macros {
        Macros {
            calories: self.calories + other.calories,
            carbs: self.carbs + other.carbs,
            protein: self.protein + other.protein,
        }
    }
}

impl Sum for Macros {
    fn sum<I: Iterator<Item = Macros>>(iter: I) -> Self {
        iter.fold(Macros::default(), Add::add)
    }
}

/// "Calories: 113 | Carbs: 13.5g | Protein: 2.3g"
impl fmt::Display for Macros {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Calories: {} | Carbs: {}g | Protein: {}g",
            format_decimal(self.calories),
            format_decimal(self.carbs),
            format_decimal(self.protein)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaled() {
        let per_serving = Macros::new(100.0, 20.0, 5.0);
        assert_eq!(per_serving.scaled(1.5), Macros::new(150.0, 30.0, 7.5));
    }

    #[test]
    fn test_floored() {
        let macros = Macros::new(-10.0, f64::NAN, 3.0);
        assert_eq!(macros.floored(), Macros::new(0.0, 0.0, 3.0));
    }

    #[test]
    fn test_sum() {
        let total: Macros = vec![Macros::new(100.0, 10.0, 1.0), Macros::new(50.0, 5.0, 2.5)]
            .into_iter()
            .sum();
        assert_eq!(total, Macros::new(150.0, 15.0, 3.5));
    }

    #[test]
    fn test_display() {
        let macros = Macros::new(113.0, 13.5, 2.3);
        assert_eq!(
            format!("{}", macros),
            "Calories: 113 | Carbs: 13.5g | Protein: 2.3g"
        );
    }
}
