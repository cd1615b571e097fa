use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::entry::Entry;
use super::macros::Macros;
use super::water::WaterLog;
use crate::numeric::format_decimal;

/// Everything logged on one day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub entries: Vec<Entry>,
    pub totals: Macros,
    pub water_ml: f64,
}

impl DailySummary {
    /// Builds a summary; entries are ordered by creation time.
    pub fn new(date: NaiveDate, mut entries: Vec<Entry>, water: &[WaterLog]) -> Self {
        entries.sort_by_key(|e| e.created_at);
        let totals = entries.iter().map(Entry::totals).sum();
        let water_ml = water.iter().map(|w| w.amount_ml).sum();
        Self {
            date,
            entries,
            totals,
            water_ml,
        }
    }
}

impl fmt::Display for DailySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.date)?;
        writeln!(f, "{}", "-".repeat(60))?;

        if self.entries.is_empty() {
            writeln!(f, "  No entries")?;
        }
        for entry in &self.entries {
            writeln!(f, "  {}", entry)?;
        }

        writeln!(f, "  {}", "-".repeat(56))?;
        writeln!(f, "  Daily Total: {}", self.totals)?;
        writeln!(f, "  Water: {} ml", format_decimal(self.water_ml))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_summary_totals_and_order() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let mut late = Entry::new(date, "Dinner", 1.0, Macros::new(600.0, 50.0, 40.0));
        let early = Entry::new(date, "Breakfast", 2.0, Macros::new(150.0, 27.0, 5.0));
        late.created_at = early.created_at + Duration::hours(10);

        let water = vec![WaterLog::new(date, 250.0), WaterLog::new(date, 500.0)];
        let summary = DailySummary::new(date, vec![late, early], &water);

        assert_eq!(summary.entries[0].food_name, "Breakfast");
        assert_eq!(summary.totals, Macros::new(900.0, 104.0, 50.0));
        assert_eq!(summary.water_ml, 750.0);

        let output = format!("{}", summary);
        assert!(output.contains("2025-01-01"));
        assert!(output.contains("Daily Total: Calories: 900"));
        assert!(output.contains("Water: 750 ml"));
    }

    #[test]
    fn test_empty_summary() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
        let summary = DailySummary::new(date, Vec::new(), &[]);
        assert_eq!(summary.totals, Macros::default());
        assert!(format!("{}", summary).contains("No entries"));
    }
}
