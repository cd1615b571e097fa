use clap::{Args, Subcommand};
use macrotrack_core::{format_decimal, parse_decimal, WaterLog};
use uuid::Uuid;

use super::{parse_date, OutputFormat};
use crate::db::WaterRepository;

#[derive(Args)]
pub struct WaterCommand {
    #[command(subcommand)]
    pub command: WaterSubcommand,
}

#[derive(Subcommand)]
pub enum WaterSubcommand {
    /// Log water in milliliters
    Add {
        /// Amount (ml)
        amount: String,

        /// Date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,
    },

    /// List water logged on a day
    List {
        /// Date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Delete a water log
    Delete {
        /// Water log ID (UUID)
        id: String,
    },
}

impl WaterCommand {
    pub async fn run(&self, repo: &WaterRepository) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            WaterSubcommand::Add { amount, date } => {
                let amount_ml = parse_amount(amount)?;
                let date = parse_date(date.as_deref())?;

                let log = repo.create(&WaterLog::new(date, amount_ml)).await?;
                println!("Logged {} ml of water on {}", format_decimal(log.amount_ml), log.date);
                Ok(())
            }

            WaterSubcommand::List { date, format } => {
                let date = parse_date(date.as_deref())?;
                let logs = repo.list_by_date(date).await?;

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&logs)?);
                    }
                    OutputFormat::Text => {
                        if logs.is_empty() {
                            println!("No water logged on {}", date);
                            return Ok(());
                        }
                        for log in &logs {
                            println!("  {}", log);
                        }
                        let total: f64 = logs.iter().map(|l| l.amount_ml).sum();
                        println!("\nTotal: {} ml", format_decimal(total));
                    }
                }
                Ok(())
            }

            WaterSubcommand::Delete { id } => {
                let uuid = Uuid::parse_str(id).map_err(|_| format!("Invalid water log ID: {}", id))?;
                repo.delete(uuid).await?;
                println!("Deleted water log {}", uuid);
                Ok(())
            }
        }
    }
}

fn parse_amount(raw: &str) -> Result<f64, String> {
    let amount = parse_decimal(raw, 0.0);
    if amount > 0.0 {
        Ok(amount)
    } else {
        Err(format!("Invalid water amount '{}'. Use a positive number of ml.", raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("250").unwrap(), 250.0);
        assert_eq!(parse_amount("330.5ml").unwrap(), 330.5);
        assert!(parse_amount("0").is_err());
        assert!(parse_amount("lots").is_err());
    }
}
