use clap::{Args, Subcommand};

use super::OutputFormat;
use crate::config::{Config, ConfigValue};

#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show current configuration values
    Show {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

impl ConfigCommand {
    pub fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            ConfigSubcommand::Show { format } => {
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(config)?);
                    }
                    OutputFormat::Text => {
                        println!("Configuration");
                        println!("=============\n");

                        if let Some(path) = &config.config_file {
                            println!("Config file: {}", path.display());
                        } else {
                            println!(
                                "Config file: {} (not found)",
                                Config::default_config_path().display()
                            );
                        }
                        println!();

                        print_value(
                            "database_path",
                            &config.database_path.value.display(),
                            &config.database_path,
                        );

                        let lookup = &config.lookup;
                        print_value("lookup.usda_url", &lookup.usda_url.value, &lookup.usda_url);
                        print_value(
                            "lookup.usda_api_key",
                            &mask(&lookup.usda_api_key.value),
                            &lookup.usda_api_key,
                        );
                        print_value("lookup.off_url", &lookup.off_url.value, &lookup.off_url);
                        print_value(
                            "lookup.timeout_secs",
                            &lookup.timeout_secs.value,
                            &lookup.timeout_secs,
                        );
                    }
                }
                Ok(())
            }
        }
    }
}

fn print_value<T>(key: &str, shown: &dyn std::fmt::Display, value: &ConfigValue<T>) {
    println!("{}: {}", key, shown);
    println!("  source: {}", value.source);
    println!();
}

/// Keeps the last four characters of a secret.
fn mask(secret: &str) -> String {
    let count = secret.chars().count();
    if count <= 4 {
        return "*".repeat(count);
    }
    let tail: String = secret.chars().skip(count - 4).collect();
    format!("{}{}", "*".repeat(count - 4), tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask() {
        assert_eq!(mask("DEMO_KEY"), "****_KEY");
        assert_eq!(mask("abc"), "***");
        assert_eq!(mask(""), "");
    }
}
