use macrotrack_core::{normalize_barcode, FoodDraft, OffProduct};
use reqwest::StatusCode;
use serde::Deserialize;

use super::LookupError;

/// Product-by-barcode client for Open Food Facts.
pub struct OffClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ProductResponse {
    #[serde(default)]
    status: i64,
    #[serde(default)]
    product: Option<OffProduct>,
}

impl OffClient {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn product_url(&self, code: &str) -> String {
        format!("{}/api/v2/product/{}.json", self.base_url, code)
    }

    pub async fn product(&self, barcode: &str) -> Result<FoodDraft, LookupError> {
        let code =
            normalize_barcode(barcode).ok_or_else(|| LookupError::NotFound(barcode.to_string()))?;
        tracing::debug!("Open Food Facts lookup {}", code);

        let response = self.client.get(self.product_url(&code)).send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => return Err(LookupError::NotFound(code)),
            status if !status.is_success() => return Err(LookupError::Status(status)),
            _ => {}
        }

        let body: ProductResponse = response.json().await?;
        draft_from_response(body, code)
    }
}

fn draft_from_response(body: ProductResponse, code: String) -> Result<FoodDraft, LookupError> {
    let product = match body.product {
        Some(product) if body.status == 1 => product,
        _ => return Err(LookupError::NotFound(code)),
    };

    let mut draft = FoodDraft::from_open_food_facts(&product).map_err(|e| {
        tracing::debug!("Open Food Facts product {} unusable: {}", code, e);
        LookupError::NotFound(code.clone())
    })?;
    if draft.barcode.is_none() {
        draft.barcode = Some(code);
    }
    Ok(draft)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(json: &str) -> ProductResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_found_product() {
        let body = response(
            r#"{
                "code": "5000112637922",
                "status": 1,
                "status_verbose": "product found",
                "product": {
                    "product_name": "Cola",
                    "serving_size": "330 ml",
                    "serving_quantity": "330",
                    "serving_quantity_unit": "ml",
                    "nutriments": {
                        "energy-kcal_100g": 42,
                        "carbohydrates_100g": 10.6,
                        "proteins_100g": 0
                    }
                }
            }"#,
        );

        let draft = draft_from_response(body, "5000112637922".into()).unwrap();
        assert_eq!(draft.name, "Cola");
        assert_eq!(draft.calories_per_serving, 139.0);
        assert_eq!(draft.carbs_per_serving, 35.0);
        assert_eq!(draft.protein_per_serving, 0.0);
        assert_eq!(draft.serving_size_grams, None);
        assert_eq!(draft.barcode.as_deref(), Some("5000112637922"));
    }

    #[test]
    fn test_status_zero_is_not_found() {
        let body = response(r#"{"code": "123", "status": 0, "status_verbose": "product not found"}"#);
        let err = draft_from_response(body, "123".into()).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_product_without_serving_is_not_found() {
        let body = response(
            r#"{
                "status": 1,
                "product": {
                    "product_name": "Loose apples",
                    "nutriments": {"energy-kcal_100g": 52, "carbohydrates_100g": 14, "proteins_100g": 0.3}
                }
            }"#,
        );
        let err = draft_from_response(body, "2000000000001".into()).unwrap_err();
        assert!(matches!(err, LookupError::NotFound(code) if code == "2000000000001"));
    }

    #[test]
    fn test_product_url() {
        let client = OffClient::new(reqwest::Client::new(), "https://world.openfoodfacts.org/");
        assert_eq!(
            client.product_url("737628064502"),
            "https://world.openfoodfacts.org/api/v2/product/737628064502.json"
        );
    }
}
