use chrono::Utc;
use macrotrack_core::{Food, ServingSizeUnit};
use sqlx::SqlitePool;
use uuid::Uuid;

use super::{parse_timestamp, parse_uuid};

pub struct FoodRepository {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct FoodRow {
    id: String,
    name: String,
    calories_per_serving: f64,
    carbs_per_serving: f64,
    protein_per_serving: f64,
    favorite: bool,
    barcode: Option<String>,
    serving_size: Option<f64>,
    serving_size_unit: Option<String>,
    serving_size_grams: Option<f64>,
    created_at: String,
    updated_at: String,
}

impl FoodRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, food: &Food) -> Result<Food, sqlx::Error> {
        let id = food.id.to_string();
        let unit = food.serving_size_unit.map(|u| u.as_str());

        sqlx::query(
            r#"
            INSERT INTO foods (id, name, calories_per_serving, carbs_per_serving, protein_per_serving,
                               favorite, barcode, serving_size, serving_size_unit, serving_size_grams,
                               created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&food.name)
        .bind(food.calories_per_serving)
        .bind(food.carbs_per_serving)
        .bind(food.protein_per_serving)
        .bind(food.favorite)
        .bind(&food.barcode)
        .bind(food.serving_size)
        .bind(unit)
        .bind(food.serving_size_grams)
        .bind(food.created_at.to_rfc3339())
        .bind(food.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        tracing::info!("Saved food '{}' ({})", food.name, food.basis_label());

        self.get_by_id(food.id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<Food>, sqlx::Error> {
        let row: Option<FoodRow> = sqlx::query_as("SELECT * FROM foods WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(hydrate_food).transpose()
    }

    pub async fn get_by_name(&self, name: &str) -> Result<Option<Food>, sqlx::Error> {
        let row: Option<FoodRow> =
            sqlx::query_as("SELECT * FROM foods WHERE LOWER(name) = LOWER(?)")
                .bind(name.trim())
                .fetch_optional(&self.pool)
                .await?;

        row.map(hydrate_food).transpose()
    }

    pub async fn get_by_barcode(&self, barcode: &str) -> Result<Option<Food>, sqlx::Error> {
        let row: Option<FoodRow> =
            sqlx::query_as("SELECT * FROM foods WHERE barcode = ? ORDER BY updated_at DESC")
                .bind(barcode)
                .fetch_optional(&self.pool)
                .await?;

        row.map(hydrate_food).transpose()
    }

    /// Lists foods by name with favorites first. `favorites_only` drops the rest.
    pub async fn list(&self, favorites_only: bool) -> Result<Vec<Food>, sqlx::Error> {
        let sql = if favorites_only {
            "SELECT * FROM foods WHERE favorite = 1 ORDER BY name COLLATE NOCASE"
        } else {
            "SELECT * FROM foods ORDER BY favorite DESC, name COLLATE NOCASE"
        };
        let rows: Vec<FoodRow> = sqlx::query_as(sql).fetch_all(&self.pool).await?;

        rows.into_iter().map(hydrate_food).collect()
    }

    /// Case-insensitive substring match on name.
    pub async fn search(&self, query: &str) -> Result<Vec<Food>, sqlx::Error> {
        let pattern = format!("%{}%", escape_like(&query.trim().to_lowercase()));
        let rows: Vec<FoodRow> = sqlx::query_as(
            r"SELECT * FROM foods WHERE LOWER(name) LIKE ? ESCAPE '\'
              ORDER BY favorite DESC, name COLLATE NOCASE",
        )
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(hydrate_food).collect()
    }

    pub async fn update(&self, food: &Food) -> Result<Food, sqlx::Error> {
        let unit = food.serving_size_unit.map(|u| u.as_str());
        let updated_at = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            UPDATE foods
            SET name = ?, calories_per_serving = ?, carbs_per_serving = ?, protein_per_serving = ?,
                favorite = ?, barcode = ?, serving_size = ?, serving_size_unit = ?,
                serving_size_grams = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&food.name)
        .bind(food.calories_per_serving)
        .bind(food.carbs_per_serving)
        .bind(food.protein_per_serving)
        .bind(food.favorite)
        .bind(&food.barcode)
        .bind(food.serving_size)
        .bind(unit)
        .bind(food.serving_size_grams)
        .bind(&updated_at)
        .bind(food.id.to_string())
        .execute(&self.pool)
        .await?;

        self.get_by_id(food.id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    /// Flips the favorite flag and returns the updated food.
    pub async fn toggle_favorite(&self, id: Uuid) -> Result<Food, sqlx::Error> {
        sqlx::query("UPDATE foods SET favorite = NOT favorite, updated_at = ? WHERE id = ?")
            .bind(Utc::now().to_rfc3339())
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        self.get_by_id(id).await?.ok_or(sqlx::Error::RowNotFound)
    }

    /// Deletes a food. Logged entries keep their own snapshot and are
    /// not touched.
    pub async fn delete(&self, id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM foods WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

/// Makes `%`, `_` and `\` match literally in a `LIKE ... ESCAPE '\'` pattern.
fn escape_like(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn hydrate_food(row: FoodRow) -> Result<Food, sqlx::Error> {
    let serving_size_unit = match row.serving_size_unit.as_deref() {
        Some(raw) => match raw.parse::<ServingSizeUnit>() {
            Ok(unit) => Some(unit),
            Err(e) => {
                tracing::warn!("Ignoring serving unit on food '{}': {}", row.name, e);
                None
            }
        },
        None => None,
    };

    Ok(Food {
        id: parse_uuid(&row.id)?,
        name: row.name,
        calories_per_serving: row.calories_per_serving,
        carbs_per_serving: row.carbs_per_serving,
        protein_per_serving: row.protein_per_serving,
        favorite: row.favorite,
        barcode: row.barcode,
        serving_size: row.serving_size,
        serving_size_unit,
        serving_size_grams: row.serving_size_grams,
        created_at: parse_timestamp(&row.created_at),
        updated_at: parse_timestamp(&row.updated_at),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_db;
    use macrotrack_core::Macros;
    use tempfile::TempDir;

    struct TestContext {
        repo: FoodRepository,
        _temp_dir: TempDir, // Keep alive for duration of test
    }

    async fn setup_repo() -> TestContext {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let pool = init_db(&db_path).await.unwrap();
        TestContext {
            repo: FoodRepository::new(pool),
            _temp_dir: temp_dir,
        }
    }

    #[tokio::test]
    async fn test_create_and_get_food() {
        let ctx = setup_repo().await;
        let repo = &ctx.repo;

        let food = Food::new("Granola", Macros::new(190.0, 29.0, 4.0))
            .with_serving_size_grams(45.0)
            .with_barcode("012345678905");

        let created = repo.create(&food).await.unwrap();
        assert_eq!(created.name, "Granola");
        assert_eq!(created.serving_size_grams, Some(45.0));

        let fetched = repo.get_by_id(food.id).await.unwrap().unwrap();
        assert_eq!(fetched.macros(), food.macros());
        assert_eq!(fetched.basis_label(), "Per serving (45 g)");
    }

    #[tokio::test]
    async fn test_per_100g_unit_round_trips() {
        let ctx = setup_repo().await;
        let repo = &ctx.repo;

        let food = Food::new("Rice", Macros::new(130.0, 28.0, 2.7)).per_100g();
        repo.create(&food).await.unwrap();

        let fetched = repo.get_by_id(food.id).await.unwrap().unwrap();
        assert_eq!(fetched.serving_size_unit, Some(ServingSizeUnit::Per100g));
        assert!(!fetched.has_true_serving());
    }

    #[tokio::test]
    async fn test_get_by_name_case_insensitive() {
        let ctx = setup_repo().await;
        let repo = &ctx.repo;

        repo.create(&Food::new("Greek Yogurt", Macros::default()))
            .await
            .unwrap();

        let found = repo.get_by_name("greek yogurt").await.unwrap();
        assert_eq!(found.unwrap().name, "Greek Yogurt");
        assert!(repo.get_by_name("GREEK YOGURT ").await.unwrap().is_some());
        assert!(repo.get_by_name("yogurt").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_name_rejected() {
        let ctx = setup_repo().await;
        let repo = &ctx.repo;

        repo.create(&Food::new("Apple", Macros::default()))
            .await
            .unwrap();
        assert!(repo
            .create(&Food::new("apple", Macros::default()))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_get_by_barcode() {
        let ctx = setup_repo().await;
        let repo = &ctx.repo;

        let food = Food::new("Cola", Macros::new(139.0, 35.0, 0.0)).with_barcode("5449000000996");
        repo.create(&food).await.unwrap();

        let found = repo.get_by_barcode("5449000000996").await.unwrap();
        assert_eq!(found.unwrap().id, food.id);
        assert!(repo.get_by_barcode("123").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_favorites_first() {
        let ctx = setup_repo().await;
        let repo = &ctx.repo;

        repo.create(&Food::new("Banana", Macros::default()))
            .await
            .unwrap();
        repo.create(&Food::new("apple", Macros::default()))
            .await
            .unwrap();
        repo.create(&Food::new("Zucchini", Macros::default()).with_favorite(true))
            .await
            .unwrap();

        let foods = repo.list(false).await.unwrap();
        let names: Vec<&str> = foods.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Zucchini", "apple", "Banana"]);

        let favorites = repo.list(true).await.unwrap();
        assert_eq!(favorites.len(), 1);
        assert_eq!(favorites[0].name, "Zucchini");
    }

    #[tokio::test]
    async fn test_search() {
        let ctx = setup_repo().await;
        let repo = &ctx.repo;

        repo.create(&Food::new("Peanut Butter", Macros::default()))
            .await
            .unwrap();
        repo.create(&Food::new("Butter", Macros::default()))
            .await
            .unwrap();
        repo.create(&Food::new("Bread", Macros::default()))
            .await
            .unwrap();

        let found = repo.search("butter").await.unwrap();
        assert_eq!(found.len(), 2);
    }

    #[tokio::test]
    async fn test_search_treats_wildcards_literally() {
        let ctx = setup_repo().await;
        let repo = &ctx.repo;

        repo.create(&Food::new("100% Rye", Macros::default()))
            .await
            .unwrap();
        repo.create(&Food::new("100 Calorie Pack", Macros::default()))
            .await
            .unwrap();
        repo.create(&Food::new("Pb_Crackers", Macros::default()))
            .await
            .unwrap();
        repo.create(&Food::new("Pbj Crackers", Macros::default()))
            .await
            .unwrap();

        let found = repo.search("100%").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "100% Rye");

        let found = repo.search("pb_").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Pb_Crackers");
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("100%"), r"100\%");
        assert_eq!(escape_like("a_b"), r"a\_b");
        assert_eq!(escape_like(r"c:\"), r"c:\\");
        assert_eq!(escape_like("oats"), "oats");
    }

    #[tokio::test]
    async fn test_update_food() {
        let ctx = setup_repo().await;
        let repo = &ctx.repo;

        let food = Food::new("Oats", Macros::new(380.0, 60.0, 13.0));
        let mut created = repo.create(&food).await.unwrap();

        created.calories_per_serving = 150.0;
        created.serving_size_grams = Some(40.0);
        let updated = repo.update(&created).await.unwrap();
        assert_eq!(updated.calories_per_serving, 150.0);
        assert!(updated.has_true_serving());
    }

    #[tokio::test]
    async fn test_toggle_favorite() {
        let ctx = setup_repo().await;
        let repo = &ctx.repo;

        let food = Food::new("Oats", Macros::default());
        repo.create(&food).await.unwrap();

        assert!(repo.toggle_favorite(food.id).await.unwrap().favorite);
        assert!(!repo.toggle_favorite(food.id).await.unwrap().favorite);
    }

    #[tokio::test]
    async fn test_delete_food() {
        let ctx = setup_repo().await;
        let repo = &ctx.repo;

        let food = Food::new("To Delete", Macros::default());
        repo.create(&food).await.unwrap();
        assert!(repo.get_by_id(food.id).await.unwrap().is_some());

        repo.delete(food.id).await.unwrap();
        assert!(repo.get_by_id(food.id).await.unwrap().is_none());
    }
}
