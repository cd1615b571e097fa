//! HTTP lookups against public nutrition databases.
//!
//! The clients only fetch and decode; turning a response into a food draft
//! is done by `macrotrack_core::FoodDraft`. A response that decodes but
//! cannot produce a draft is reported as [`LookupError::NotFound`], so the
//! caller can offer manual entry instead of failing.

mod open_food_facts;
mod usda;

use macrotrack_core::FoodDraft;
use std::time::Duration;
use thiserror::Error;

use crate::config::LookupConfig;
use open_food_facts::OffClient;
use usda::UsdaClient;

#[derive(Error, Debug)]
pub enum LookupError {
    #[error("No usable match found for '{0}'")]
    NotFound(String),

    #[error("Lookup request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Lookup service returned status {0}")]
    Status(reqwest::StatusCode),
}

impl LookupError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, LookupError::NotFound(_))
    }
}

/// Both lookup services behind one handle.
pub struct FoodLookup {
    pub usda: UsdaClient,
    pub off: OffClient,
}

impl FoodLookup {
    pub fn new(config: &LookupConfig) -> Result<Self, LookupError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.value))
            .user_agent(concat!("macrotrack/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            usda: UsdaClient::new(
                client.clone(),
                &config.usda_url.value,
                &config.usda_api_key.value,
            ),
            off: OffClient::new(client, &config.off_url.value),
        })
    }

    /// Resolves a barcode: Open Food Facts first, then USDA branded foods.
    pub async fn scan(&self, barcode: &str) -> Result<FoodDraft, LookupError> {
        match self.off.product(barcode).await {
            Err(e) if e.is_not_found() => {
                tracing::debug!("Open Food Facts has no usable product for {}: {}", barcode, e);
                self.usda.find_by_barcode(barcode).await
            }
            result => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_is_distinct() {
        assert!(LookupError::NotFound("123".into()).is_not_found());
        assert!(!LookupError::Status(reqwest::StatusCode::BAD_GATEWAY).is_not_found());
        assert_eq!(
            LookupError::NotFound("123".into()).to_string(),
            "No usable match found for '123'"
        );
    }
}
