use clap::{Args, Subcommand};
use macrotrack_core::{format_decimal, Entry, EntryForm, Food, InputMode};
use std::io::{self, Write};
use uuid::Uuid;

use super::{parse_date, require_food, truncate, OutputFormat};
use crate::db::{EntryRepository, FoodRepository};

#[derive(Args)]
pub struct EntryCommand {
    #[command(subcommand)]
    pub command: EntrySubcommand,
}

/// How much was eaten. Grams only apply to foods measured per 100 g.
#[derive(Args, Default)]
pub struct Quantity {
    /// Number of servings
    #[arg(long, conflicts_with = "grams")]
    servings: Option<String>,

    /// Grams eaten
    #[arg(long)]
    grams: Option<String>,
}

impl Quantity {
    fn is_empty(&self) -> bool {
        self.servings.is_none() && self.grams.is_none()
    }

    fn apply(&self, form: &mut EntryForm) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(grams) = &self.grams {
            if form.input_mode() != InputMode::Grams {
                return Err(format!(
                    "'{}' is logged in servings ({}); use --servings",
                    form.food_name(),
                    form.basis_label()
                )
                .into());
            }
            form.set_grams(grams);
        }
        if let Some(servings) = &self.servings {
            form.set_servings(servings);
        }
        Ok(())
    }
}

#[derive(Subcommand)]
pub enum EntrySubcommand {
    /// Log a food
    Add {
        /// Food ID (UUID) or name
        food: String,

        #[command(flatten)]
        quantity: Quantity,

        /// Date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,
    },

    /// Change the quantity of a logged entry
    Edit {
        /// Entry ID (UUID)
        id: String,

        #[command(flatten)]
        quantity: Quantity,
    },

    /// Delete a logged entry
    Delete {
        /// Entry ID (UUID)
        id: String,

        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },

    /// List logged entries
    List {
        /// Single date (YYYY-MM-DD), defaults to today
        #[arg(long, conflicts_with_all = ["from", "to"])]
        date: Option<String>,

        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// End date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        to: Option<String>,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

pub struct EntryRepos<'a> {
    pub entries: &'a EntryRepository,
    pub foods: &'a FoodRepository,
}

impl EntryCommand {
    pub async fn run(&self, repos: &EntryRepos<'_>) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            EntrySubcommand::Add {
                food,
                quantity,
                date,
            } => {
                let date = parse_date(date.as_deref())?;
                let food = require_food(repos.foods, food).await?;
                let form = form_for_food(&food, quantity)?;

                let entry = form.submit()?.into_entry(date);
                let created = repos.entries.create(&entry).await?;
                println!("Logged {} of {}", form.displayed_quantity(), created.food_name);
                println!("  {}", created.totals());
                Ok(())
            }

            EntrySubcommand::Edit { id, quantity } => {
                if quantity.is_empty() {
                    return Err("Nothing to update. Provide --servings or --grams.".into());
                }

                let mut entry = require_entry(repos.entries, id).await?;
                let food = repos.foods.get_by_name(&entry.food_name).await?;
                if food.is_none() {
                    tracing::debug!(
                        "'{}' no longer in catalog; editing snapshot in servings",
                        entry.food_name
                    );
                }

                let mut form = EntryForm::from_entry(&entry, food.as_ref());
                quantity.apply(&mut form)?;
                form.submit()?.apply_to(&mut entry);

                let updated = repos.entries.update(&entry).await?;
                println!("Updated entry:");
                println!("{}", updated);
                Ok(())
            }

            EntrySubcommand::Delete { id, force } => {
                let entry = require_entry(repos.entries, id).await?;

                if !force {
                    print!("Delete entry '{}'? [y/N] ", entry);
                    io::stdout().flush()?;

                    let mut input = String::new();
                    io::stdin().read_line(&mut input)?;

                    if !input.trim().eq_ignore_ascii_case("y") {
                        println!("Deletion cancelled.");
                        return Ok(());
                    }
                }

                repos.entries.delete(entry.id).await?;
                println!("Deleted entry: {} ({})", entry.food_name, entry.date);
                Ok(())
            }

            EntrySubcommand::List {
                date,
                from,
                to,
                format,
            } => {
                let entries = if from.is_some() || to.is_some() {
                    let to_date = parse_date(to.as_deref())?;
                    let from_date = match from {
                        Some(_) => parse_date(from.as_deref())?,
                        None => to_date - chrono::Duration::days(7),
                    };
                    repos.entries.list_range(from_date, to_date).await?
                } else {
                    repos
                        .entries
                        .list_by_date(parse_date(date.as_deref())?)
                        .await?
                };

                if entries.is_empty() {
                    println!("No entries found");
                    return Ok(());
                }

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&entries)?);
                    }
                    OutputFormat::Text => print_entry_table(&entries),
                }
                Ok(())
            }
        }
    }
}

fn form_for_food(food: &Food, quantity: &Quantity) -> Result<EntryForm, Box<dyn std::error::Error>> {
    let mut form = EntryForm::new();
    form.select_food(food);
    quantity.apply(&mut form)?;
    Ok(form)
}

async fn require_entry(
    repo: &EntryRepository,
    id: &str,
) -> Result<Entry, Box<dyn std::error::Error>> {
    let uuid = Uuid::parse_str(id).map_err(|_| format!("Invalid entry ID: {}", id))?;
    repo.get_by_id(uuid)
        .await?
        .ok_or_else(|| format!("Entry not found: {}", id).into())
}

fn print_entry_table(entries: &[Entry]) {
    println!(
        "{:<36}  {:<10}  {:<24}  {:>8}  {:>8}  {:>7}  {:>7}",
        "ID", "DATE", "FOOD", "SERVINGS", "KCAL", "CARBS", "PROTEIN"
    );
    println!("{}", "-".repeat(118));
    for entry in entries {
        let totals = entry.totals();
        println!(
            "{:<36}  {:<10}  {:<24}  {:>8}  {:>8.0}  {:>7.1}  {:>7.1}",
            entry.id,
            entry.date,
            truncate(&entry.food_name, 24),
            format_decimal(entry.servings),
            totals.calories,
            totals.carbs,
            totals.protein
        );
    }
    println!("\nTotal: {} entr{}", entries.len(), if entries.len() == 1 { "y" } else { "ies" });
}
