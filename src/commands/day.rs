use clap::Args;
use macrotrack_core::DailySummary;

use super::{parse_date, OutputFormat};
use crate::db::{EntryRepository, WaterRepository};

/// Show everything logged on one day
#[derive(Args)]
pub struct DayCommand {
    /// Date (YYYY-MM-DD), defaults to today
    #[arg(long)]
    date: Option<String>,

    /// Output format
    #[arg(long, short, value_enum, default_value = "text")]
    format: OutputFormat,
}

impl DayCommand {
    pub async fn run(
        &self,
        entries: &EntryRepository,
        water: &WaterRepository,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let date = parse_date(self.date.as_deref())?;
        let summary = DailySummary::new(
            date,
            entries.list_by_date(date).await?,
            &water.list_by_date(date).await?,
        );

        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            }
            OutputFormat::Text => {
                print!("{}", summary);
            }
        }
        Ok(())
    }
}
