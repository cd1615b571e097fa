use macrotrack_core::{normalize_barcode, FoodDraft, UsdaFood};
use serde::Deserialize;

use super::LookupError;

const DEFAULT_PAGE_SIZE: u32 = 10;
const BARCODE_PAGE_SIZE: u32 = 25;

/// FoodData Central search client.
pub struct UsdaClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    #[serde(default)]
    foods: Vec<UsdaFood>,
}

/// A search result together with the draft built from it.
#[derive(Debug, Clone)]
pub struct UsdaMatch {
    pub food: UsdaFood,
    pub draft: FoodDraft,
}

impl UsdaClient {
    pub fn new(client: reqwest::Client, base_url: &str, api_key: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    async fn search_raw(&self, query: &str, page_size: u32) -> Result<Vec<UsdaFood>, LookupError> {
        let url = format!("{}/foods/search", self.base_url);
        tracing::debug!("USDA search '{}'", query);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("query", query),
                ("pageSize", &page_size.to_string()),
                ("api_key", &self.api_key),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(LookupError::Status(response.status()));
        }

        let body: SearchResponse = response.json().await?;
        tracing::debug!("USDA returned {} result(s)", body.foods.len());
        Ok(body.foods)
    }

    /// Searches by name. Results that cannot become a draft are skipped.
    pub async fn search(
        &self,
        query: &str,
        page_size: Option<u32>,
    ) -> Result<Vec<UsdaMatch>, LookupError> {
        let foods = self
            .search_raw(query, page_size.unwrap_or(DEFAULT_PAGE_SIZE))
            .await?;
        let matches = usable_matches(foods);
        if matches.is_empty() {
            return Err(LookupError::NotFound(query.to_string()));
        }
        Ok(matches)
    }

    /// Finds a branded food whose GTIN/UPC equals `barcode`.
    pub async fn find_by_barcode(&self, barcode: &str) -> Result<FoodDraft, LookupError> {
        let code =
            normalize_barcode(barcode).ok_or_else(|| LookupError::NotFound(barcode.to_string()))?;
        let foods = self.search_raw(&code, BARCODE_PAGE_SIZE).await?;
        first_barcode_match(foods, &code).ok_or(LookupError::NotFound(code))
    }
}

fn usable_matches(foods: Vec<UsdaFood>) -> Vec<UsdaMatch> {
    foods
        .into_iter()
        .filter_map(|food| match FoodDraft::from_usda(&food) {
            Ok(draft) => Some(UsdaMatch { food, draft }),
            Err(e) => {
                tracing::debug!("Skipping USDA result '{}': {}", food.description, e);
                None
            }
        })
        .collect()
}

fn first_barcode_match(foods: Vec<UsdaFood>, code: &str) -> Option<FoodDraft> {
    foods
        .iter()
        .filter(|food| food.matches_barcode(code))
        .find_map(|food| FoodDraft::from_usda(food).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESPONSE: &str = r#"{
        "totalHits": 3,
        "foods": [
            {
                "fdcId": 1,
                "description": "OATS, ROLLED",
                "dataType": "Branded",
                "gtinUpc": "0041570054161",
                "servingSize": 40,
                "servingSizeUnit": "g",
                "foodNutrients": [
                    {"nutrientId": 1008, "unitName": "KCAL", "value": 375},
                    {"nutrientId": 1005, "unitName": "G", "value": 67.5},
                    {"nutrientId": 1003, "unitName": "G", "value": 12.5}
                ]
            },
            {
                "fdcId": 2,
                "description": "OATS, NO ENERGY",
                "foodNutrients": [
                    {"nutrientId": 1005, "unitName": "G", "value": 60}
                ]
            },
            {
                "fdcId": 3,
                "description": "Oats, raw",
                "dataType": "Foundation",
                "foodNutrients": [
                    {"nutrientId": 2047, "unitName": "KCAL", "value": 382},
                    {"nutrientId": 1005, "unitName": "G", "value": 67.7},
                    {"nutrientId": 1003, "unitName": "G", "value": 13.5}
                ]
            }
        ]
    }"#;

    fn foods() -> Vec<UsdaFood> {
        let response: SearchResponse = serde_json::from_str(RESPONSE).unwrap();
        response.foods
    }

    #[test]
    fn test_parse_search_response() {
        let foods = foods();
        assert_eq!(foods.len(), 3);
        assert_eq!(foods[0].serving_size, Some(40.0));
        assert_eq!(foods[0].food_nutrients.len(), 3);
    }

    #[test]
    fn test_empty_response() {
        let response: SearchResponse = serde_json::from_str("{}").unwrap();
        assert!(response.foods.is_empty());
    }

    #[test]
    fn test_usable_matches_skip_unbuildable() {
        let matches = usable_matches(foods());
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].draft.calories_per_serving, 150.0);
        assert_eq!(matches[0].draft.basis_label(), "Per serving (40 g)");
        assert_eq!(matches[1].draft.calories_per_serving, 382.0);
        assert_eq!(matches[1].draft.basis_label(), "Per 100 g");
    }

    #[test]
    fn test_barcode_match_ignores_leading_zeros() {
        let draft = first_barcode_match(foods(), "041570054161").unwrap();
        assert_eq!(draft.name, "OATS, ROLLED");
        assert!(first_barcode_match(foods(), "999999").is_none());
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let client = UsdaClient::new(reqwest::Client::new(), "https://example.test/fdc/v1/", "k");
        assert_eq!(client.base_url, "https://example.test/fdc/v1");
    }
}
