use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// USDA's shared key; heavily rate limited but works without sign-up.
pub const DEFAULT_USDA_API_KEY: &str = "DEMO_KEY";
pub const DEFAULT_USDA_URL: &str = "https://api.nal.usda.gov/fdc/v1";
pub const DEFAULT_OFF_URL: &str = "https://world.openfoodfacts.org";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Source of a configuration value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    Default,
    File,
    Environment,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Default => write!(f, "default"),
            ConfigSource::File => write!(f, "file"),
            ConfigSource::Environment => write!(f, "environment"),
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }
}

/// Nutrition lookup services
#[derive(Debug, Clone, Serialize)]
pub struct LookupConfig {
    /// FoodData Central API base URL
    pub usda_url: ConfigValue<String>,
    /// FoodData Central API key
    #[serde(skip_serializing)]
    pub usda_api_key: ConfigValue<String>,
    /// Open Food Facts base URL
    pub off_url: ConfigValue<String>,
    /// HTTP timeout in seconds
    pub timeout_secs: ConfigValue<u64>,
}

/// Application configuration with source tracking
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Path to the SQLite database
    pub database_path: ConfigValue<PathBuf>,
    /// Lookup service settings
    pub lookup: LookupConfig,
    /// Config file path used (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<PathBuf>,
}

/// Internal struct for deserializing config file
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    database_path: Option<PathBuf>,
    lookup: Option<LookupFile>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct LookupFile {
    usda_url: Option<String>,
    usda_api_key: Option<String>,
    off_url: Option<String>,
    timeout_secs: Option<u64>,
}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let default_db_path = Self::default_data_dir().join("macrotrack.db");

        // Start with defaults
        let mut database_path = ConfigValue::new(default_db_path, ConfigSource::Default);
        let mut lookup = LookupConfig {
            usda_url: ConfigValue::new(DEFAULT_USDA_URL.to_string(), ConfigSource::Default),
            usda_api_key: ConfigValue::new(
                DEFAULT_USDA_API_KEY.to_string(),
                ConfigSource::Default,
            ),
            off_url: ConfigValue::new(DEFAULT_OFF_URL.to_string(), ConfigSource::Default),
            timeout_secs: ConfigValue::new(DEFAULT_TIMEOUT_SECS, ConfigSource::Default),
        };
        let mut config_file = None;

        // Try to load from config file
        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            let file_config: ConfigFile = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(path.clone(), e))?;

            config_file = Some(path.clone());

            if let Some(db_path) = file_config.database_path {
                // Resolve relative paths against config file's directory
                let resolved_path = if db_path.is_relative() {
                    path.parent().map(|p| p.join(&db_path)).unwrap_or(db_path)
                } else {
                    db_path
                };
                database_path = ConfigValue::new(resolved_path, ConfigSource::File);
            }
            if let Some(file_lookup) = file_config.lookup {
                if let Some(url) = file_lookup.usda_url {
                    lookup.usda_url = ConfigValue::new(url, ConfigSource::File);
                }
                if let Some(key) = file_lookup.usda_api_key {
                    lookup.usda_api_key = ConfigValue::new(key, ConfigSource::File);
                }
                if let Some(url) = file_lookup.off_url {
                    lookup.off_url = ConfigValue::new(url, ConfigSource::File);
                }
                if let Some(secs) = file_lookup.timeout_secs {
                    lookup.timeout_secs = ConfigValue::new(secs, ConfigSource::File);
                }
            }
        }

        // Apply environment variable overrides
        if let Ok(db_path) = std::env::var("MACROTRACK_DATABASE_PATH") {
            database_path = ConfigValue::new(PathBuf::from(db_path), ConfigSource::Environment);
        }
        if let Ok(key) = std::env::var("MACROTRACK_USDA_API_KEY") {
            lookup.usda_api_key = ConfigValue::new(key, ConfigSource::Environment);
        }
        if let Ok(url) = std::env::var("MACROTRACK_USDA_URL") {
            lookup.usda_url = ConfigValue::new(url, ConfigSource::Environment);
        }
        if let Ok(url) = std::env::var("MACROTRACK_OFF_URL") {
            lookup.off_url = ConfigValue::new(url, ConfigSource::Environment);
        }

        Ok(Self {
            database_path,
            lookup,
            config_file,
        })
    }

    /// Default config directory (platform-specific):
    /// - Linux: ~/.config/macrotrack/
    /// - macOS: ~/Library/Application Support/macrotrack/
    /// - Windows: %APPDATA%/macrotrack/
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("macrotrack")
    }

    /// Default data directory (platform-specific):
    /// - Linux: ~/.local/share/macrotrack/
    /// - macOS: ~/Library/Application Support/macrotrack/
    /// - Windows: %APPDATA%/macrotrack/
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("macrotrack")
    }

    /// Default config file path (platform-specific config dir + config.yaml)
    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join("config.yaml")
    }
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nonexistent.yaml");

        let config = Config::load(Some(config_path)).unwrap();
        assert!(config
            .database_path
            .value
            .to_string_lossy()
            .contains("macrotrack.db"));
        assert_eq!(config.database_path.source, ConfigSource::Default);
        assert_eq!(config.lookup.off_url.value, DEFAULT_OFF_URL);
        assert_eq!(config.lookup.timeout_secs.value, DEFAULT_TIMEOUT_SECS);
        assert!(config.config_file.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "database_path: /custom/path/food.sqlite").unwrap();
        writeln!(file, "lookup:").unwrap();
        writeln!(file, "  usda_api_key: my-key").unwrap();
        writeln!(file, "  timeout_secs: 3").unwrap();

        let config = Config::load(Some(config_path.clone())).unwrap();
        assert_eq!(
            config.database_path.value,
            PathBuf::from("/custom/path/food.sqlite")
        );
        assert_eq!(config.database_path.source, ConfigSource::File);
        assert_eq!(config.lookup.usda_api_key.value, "my-key");
        assert_eq!(config.lookup.usda_api_key.source, ConfigSource::File);
        assert_eq!(config.lookup.timeout_secs.value, 3);
        assert_eq!(config.lookup.usda_url.source, ConfigSource::Default);
        assert_eq!(config.config_file, Some(config_path));
    }

    #[test]
    fn test_relative_database_path_resolves_against_config_dir() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "database_path: data/food.db").unwrap();

        let config = Config::load(Some(config_path)).unwrap();
        assert_eq!(
            config.database_path.value,
            temp_dir.path().join("data/food.db")
        );
    }

    #[test]
    #[ignore] // Run with --ignored; env vars can pollute parallel tests
    fn test_env_var_overrides_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "lookup:").unwrap();
        writeln!(file, "  usda_api_key: fromfile").unwrap();

        std::env::set_var("MACROTRACK_USDA_API_KEY", "fromenv");

        let config = Config::load(Some(config_path)).unwrap();
        assert_eq!(config.lookup.usda_api_key.value, "fromenv");
        assert_eq!(
            config.lookup.usda_api_key.source,
            ConfigSource::Environment
        );

        std::env::remove_var("MACROTRACK_USDA_API_KEY");
    }

    #[test]
    fn test_invalid_yaml_error() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "invalid: yaml: content: [").unwrap();

        let result = Config::load(Some(config_path));
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_api_key_not_serialized() {
        let temp_dir = tempdir().unwrap();
        let config = Config::load(Some(temp_dir.path().join("none.yaml"))).unwrap();
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains(DEFAULT_USDA_API_KEY));
        assert!(json.contains("usda_url"));
    }
}
