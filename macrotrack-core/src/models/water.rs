use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::numeric::format_decimal;

/// Water drunk on a given day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WaterLog {
    pub id: Uuid,
    pub date: NaiveDate,
    pub amount_ml: f64,
    pub created_at: DateTime<Utc>,
}

impl WaterLog {
    pub fn new(date: NaiveDate, amount_ml: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            amount_ml,
            created_at: Utc::now(),
        }
    }
}

impl fmt::Display for WaterLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ml at {}",
            format_decimal(self.amount_ml),
            self.created_at.format("%H:%M")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_water_log_new() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let log = WaterLog::new(date, 250.0);
        assert_eq!(log.date, date);
        assert_eq!(log.amount_ml, 250.0);
        assert!(format!("{}", log).starts_with("250 ml at "));
    }
}
