mod config_cmd;
mod day;
mod entry;
mod food;
mod water;

pub use config_cmd::ConfigCommand;
pub use day::DayCommand;
pub use entry::{EntryCommand, EntryRepos};
pub use food::FoodCommand;
pub use water::WaterCommand;

use chrono::{Local, NaiveDate};
use clap::ValueEnum;
use macrotrack_core::Food;
use uuid::Uuid;

use crate::db::FoodRepository;

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Parses `YYYY-MM-DD`, defaulting to today.
fn parse_date(date: Option<&str>) -> Result<NaiveDate, Box<dyn std::error::Error>> {
    match date {
        Some(d) => NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d")
            .map_err(|_| format!("Invalid date format '{}'. Use YYYY-MM-DD.", d).into()),
        None => Ok(Local::now().date_naive()),
    }
}

/// Finds a saved food by UUID, then by name.
async fn find_food(
    repo: &FoodRepository,
    identifier: &str,
) -> Result<Option<Food>, sqlx::Error> {
    if let Ok(uuid) = Uuid::parse_str(identifier) {
        if let Some(food) = repo.get_by_id(uuid).await? {
            return Ok(Some(food));
        }
    }
    repo.get_by_name(identifier).await
}

async fn require_food(
    repo: &FoodRepository,
    identifier: &str,
) -> Result<Food, Box<dyn std::error::Error>> {
    find_food(repo, identifier)
        .await?
        .ok_or_else(|| format!("Food not found: {}", identifier).into())
}

fn truncate(name: &str, width: usize) -> String {
    if name.chars().count() > width {
        let cut: String = name.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", cut)
    } else {
        name.to_string()
    }
}
