use clap::{Args, Subcommand};
use macrotrack_core::{normalize_barcode, Food, FoodDraft, FoodEdits, ServingSizeUnit};
use std::io::{self, Write};

use super::{require_food, truncate, OutputFormat};
use crate::db::FoodRepository;
use crate::lookup::{FoodLookup, LookupError};

#[derive(Args)]
pub struct FoodCommand {
    #[command(subcommand)]
    pub command: FoodSubcommand,
}

/// Nutrition values and serving as typed on the command line.
#[derive(Args, Default)]
pub struct FoodValues {
    /// Calories per serving
    #[arg(long)]
    calories: Option<String>,

    /// Carbs per serving (g)
    #[arg(long)]
    carbs: Option<String>,

    /// Protein per serving (g)
    #[arg(long)]
    protein: Option<String>,

    /// Serving size amount
    #[arg(long)]
    serving_size: Option<String>,

    /// Serving size unit: g, ml or per100g
    #[arg(long)]
    unit: Option<ServingSizeUnit>,

    /// Grams in one serving
    #[arg(long)]
    grams: Option<String>,

    /// Product barcode
    #[arg(long)]
    barcode: Option<String>,
}

impl FoodValues {
    fn is_empty(&self) -> bool {
        self.calories.is_none()
            && self.carbs.is_none()
            && self.protein.is_none()
            && self.serving_size.is_none()
            && self.unit.is_none()
            && self.grams.is_none()
            && self.barcode.is_none()
    }

    fn edits(&self, name: Option<&String>) -> FoodEdits {
        let mut edits = FoodEdits {
            name: name.cloned(),
            calories: self.calories.clone(),
            carbs: self.carbs.clone(),
            protein: self.protein.clone(),
            serving_size: self.serving_size.clone(),
            serving_size_unit: self.unit,
            serving_size_grams: self.grams.clone(),
            barcode: self.barcode.clone(),
        };

        // "per100g" alone means values per 100 g.
        if self.unit == Some(ServingSizeUnit::Per100g) {
            edits.serving_size.get_or_insert_with(|| "100".to_string());
            edits.serving_size_grams.get_or_insert_with(|| "100".to_string());
        }
        edits
    }
}

#[derive(Subcommand)]
pub enum FoodSubcommand {
    /// Add a food to the catalog
    Add {
        /// Name of the food
        name: String,

        #[command(flatten)]
        values: FoodValues,

        /// Mark as favorite
        #[arg(long)]
        favorite: bool,
    },

    /// List saved foods
    List {
        /// Only show favorites
        #[arg(long, conflicts_with = "search")]
        favorites: bool,

        /// Only show foods whose name contains this text
        #[arg(long)]
        search: Option<String>,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show a food's details
    Show {
        /// Food ID (UUID) or name
        identifier: String,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Edit a saved food
    Edit {
        /// Food ID (UUID) or name
        identifier: String,

        /// New name
        #[arg(long)]
        name: Option<String>,

        #[command(flatten)]
        values: FoodValues,
    },

    /// Toggle a food's favorite flag
    Favorite {
        /// Food ID (UUID) or name
        identifier: String,
    },

    /// Delete a saved food
    Delete {
        /// Food ID (UUID) or name
        identifier: String,

        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },

    /// Search USDA FoodData Central
    Search {
        /// Search text
        query: String,

        /// Maximum number of results
        #[arg(long, default_value_t = 10)]
        limit: u32,

        /// Save the Nth result to the catalog
        #[arg(long, value_name = "N")]
        save: Option<usize>,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Look up a product by barcode
    Scan {
        /// Barcode digits (EAN/UPC)
        barcode: String,

        /// Save the result to the catalog
        #[arg(long)]
        save: bool,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

impl FoodCommand {
    pub async fn run(
        &self,
        repo: &FoodRepository,
        lookup: &FoodLookup,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            FoodSubcommand::Add {
                name,
                values,
                favorite,
            } => {
                let mut draft = FoodDraft::manual(name.as_str());
                draft.apply(&values.edits(None));
                let food = draft.commit(None)?.with_favorite(*favorite);

                let created = save_new(repo, &food).await?;
                println!("Added food:");
                println!("{}", created);
                Ok(())
            }

            FoodSubcommand::List {
                favorites,
                search,
                format,
            } => {
                let foods = match search {
                    Some(query) => repo.search(query).await?,
                    None => repo.list(*favorites).await?,
                };

                if foods.is_empty() {
                    println!("No foods found");
                    return Ok(());
                }

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&foods)?);
                    }
                    OutputFormat::Text => print_food_table(&foods),
                }
                Ok(())
            }

            FoodSubcommand::Show { identifier, format } => {
                let food = require_food(repo, identifier).await?;
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&food)?);
                    }
                    OutputFormat::Text => {
                        println!("{}", food);
                    }
                }
                Ok(())
            }

            FoodSubcommand::Edit {
                identifier,
                name,
                values,
            } => {
                if name.is_none() && values.is_empty() {
                    return Err("Nothing to update. Provide at least one option.".into());
                }

                let existing = require_food(repo, identifier).await?;
                let mut draft = FoodDraft::from_food(&existing);
                draft.apply(&values.edits(name.as_ref()));
                let food = draft.commit(Some(&existing))?;

                if !food.name.eq_ignore_ascii_case(&existing.name)
                    && repo.get_by_name(&food.name).await?.is_some()
                {
                    return Err(format!("A food named '{}' already exists", food.name).into());
                }

                let updated = repo.update(&food).await?;
                println!("Updated food:");
                println!("{}", updated);
                Ok(())
            }

            FoodSubcommand::Favorite { identifier } => {
                let food = require_food(repo, identifier).await?;
                let updated = repo.toggle_favorite(food.id).await?;
                if updated.favorite {
                    println!("Marked '{}' as favorite", updated.name);
                } else {
                    println!("Removed '{}' from favorites", updated.name);
                }
                Ok(())
            }

            FoodSubcommand::Delete { identifier, force } => {
                let food = require_food(repo, identifier).await?;

                if !force {
                    print!("Delete food '{}'? [y/N] ", food.name);
                    io::stdout().flush()?;

                    let mut input = String::new();
                    io::stdin().read_line(&mut input)?;

                    if !input.trim().eq_ignore_ascii_case("y") {
                        println!("Deletion cancelled.");
                        return Ok(());
                    }
                }

                repo.delete(food.id).await?;
                println!("Deleted food: {}", food.name);
                Ok(())
            }

            FoodSubcommand::Search {
                query,
                limit,
                save,
                format,
            } => {
                let matches = match lookup.usda.search(query, Some(*limit)).await {
                    Err(LookupError::NotFound(_)) => {
                        print_manual_hint(&format!("No USDA results for '{}'.", query));
                        return Ok(());
                    }
                    result => result?,
                };

                if let Some(n) = save {
                    let chosen = n
                        .checked_sub(1)
                        .and_then(|i| matches.get(i))
                        .ok_or_else(|| format!("No result #{} (got {})", n, matches.len()))?;
                    let created = save_draft(repo, chosen.draft.clone()).await?;
                    println!("Saved food:");
                    println!("{}", created);
                    return Ok(());
                }

                match format {
                    OutputFormat::Json => {
                        let drafts: Vec<_> = matches.iter().map(|m| &m.draft).collect();
                        println!("{}", serde_json::to_string_pretty(&drafts)?);
                    }
                    OutputFormat::Text => {
                        for (i, m) in matches.iter().enumerate() {
                            let brand = m
                                .food
                                .brand()
                                .map(|b| format!(" [{}]", b))
                                .unwrap_or_default();
                            println!("{:>2}. {}{}", i + 1, m.draft.name, brand);
                            println!("    {}: {}", m.draft.basis_label(), m.draft.macros());
                        }
                        println!("\nSave one with --save <N>");
                    }
                }
                Ok(())
            }

            FoodSubcommand::Scan {
                barcode,
                save,
                format,
            } => {
                let code = normalize_barcode(barcode)
                    .ok_or_else(|| format!("Invalid barcode: {}", barcode))?;

                if let Some(food) = repo.get_by_barcode(&code).await? {
                    tracing::debug!("Barcode {} already in catalog", code);
                    match format {
                        OutputFormat::Json => {
                            println!("{}", serde_json::to_string_pretty(&food)?);
                        }
                        OutputFormat::Text => {
                            println!("Already saved:");
                            println!("{}", food);
                        }
                    }
                    return Ok(());
                }

                let draft = match lookup.scan(&code).await {
                    Err(LookupError::NotFound(_)) => {
                        print_manual_hint(&format!("No nutrition data found for barcode {}.", code));
                        return Ok(());
                    }
                    result => result?,
                };

                if *save {
                    let created = save_draft(repo, draft).await?;
                    println!("Saved food:");
                    println!("{}", created);
                    return Ok(());
                }

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&draft)?);
                    }
                    OutputFormat::Text => {
                        print!("{}", draft);
                        println!("\nSave it with --save");
                    }
                }
                Ok(())
            }
        }
    }
}

async fn save_new(repo: &FoodRepository, food: &Food) -> Result<Food, Box<dyn std::error::Error>> {
    if repo.get_by_name(&food.name).await?.is_some() {
        return Err(format!("A food named '{}' already exists", food.name).into());
    }
    Ok(repo.create(food).await?)
}

async fn save_draft(
    repo: &FoodRepository,
    draft: FoodDraft,
) -> Result<Food, Box<dyn std::error::Error>> {
    let food = draft.commit(None)?;
    save_new(repo, &food).await
}

fn print_manual_hint(message: &str) {
    println!("{}", message);
    println!("Add it manually with: macrotrack food add <NAME> --calories .. --carbs .. --protein ..");
}

fn print_food_table(foods: &[Food]) {
    println!(
        "{:<36}  {:<30}  {:>8}  {:>7}  {:>7}  BASIS",
        "ID", "NAME", "KCAL", "CARBS", "PROTEIN"
    );
    println!("{}", "-".repeat(110));
    for food in foods {
        let star = if food.favorite { "*" } else { " " };
        println!(
            "{:<36} {}{:<30}  {:>8.0}  {:>7.1}  {:>7.1}  {}",
            food.id,
            star,
            truncate(&food.name, 30),
            food.calories_per_serving,
            food.carbs_per_serving,
            food.protein_per_serving,
            food.basis_label()
        );
    }
    println!("\nTotal: {} food(s)", foods.len());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_per_100g_unit_fills_sentinel_fields() {
        let values = FoodValues {
            calories: Some("130".into()),
            unit: Some(ServingSizeUnit::Per100g),
            ..Default::default()
        };
        let mut draft = FoodDraft::manual("Rice");
        draft.apply(&values.edits(None));
        let food = draft.commit(None).unwrap();

        assert!(food.is_per_100g());
        assert_eq!(food.serving_size, Some(100.0));
        assert_eq!(food.serving_size_grams, Some(100.0));
        assert_eq!(food.basis_label(), "Per 100 g");
    }

    #[test]
    fn test_edits_carry_name_and_values() {
        let values = FoodValues {
            protein: Some("4".into()),
            serving_size: Some("45".into()),
            unit: Some(ServingSizeUnit::Grams),
            ..Default::default()
        };
        let name = "Granola".to_string();
        let edits = values.edits(Some(&name));

        assert_eq!(edits.name.as_deref(), Some("Granola"));
        assert_eq!(edits.protein.as_deref(), Some("4"));
        assert_eq!(edits.serving_size_grams, None);
        assert!(!values.is_empty());
        assert!(FoodValues::default().is_empty());
    }

    #[test]
    fn test_edit_values_move_per_100g_food_to_serving() {
        let rice = Food::new("Rice", macrotrack_core::Macros::new(130.0, 28.0, 2.7)).per_100g();
        let values = FoodValues {
            serving_size: Some("45".into()),
            unit: Some(ServingSizeUnit::Grams),
            ..Default::default()
        };
        let mut draft = FoodDraft::from_food(&rice);
        draft.apply(&values.edits(None));
        let food = draft.commit(Some(&rice)).unwrap();

        assert_eq!(food.id, rice.id);
        assert_eq!(food.serving_size_grams, Some(45.0));
        assert_eq!(food.basis_label(), "Per serving (45 g)");
    }
}
