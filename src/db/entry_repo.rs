use chrono::NaiveDate;
use macrotrack_core::Entry;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::{parse_date, parse_timestamp, parse_uuid};

pub struct EntryRepository {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct EntryRow {
    id: String,
    date: String,
    food_name: String,
    servings: f64,
    calories_per_serving: f64,
    carbs_per_serving: f64,
    protein_per_serving: f64,
    created_at: String,
}

impl EntryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, entry: &Entry) -> Result<Entry, sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO entries (id, date, food_name, servings, calories_per_serving,
                                 carbs_per_serving, protein_per_serving, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(entry.id.to_string())
        .bind(entry.date.to_string())
        .bind(&entry.food_name)
        .bind(entry.servings)
        .bind(entry.calories_per_serving)
        .bind(entry.carbs_per_serving)
        .bind(entry.protein_per_serving)
        .bind(entry.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        tracing::info!(
            "Logged {} x '{}' on {}",
            entry.servings,
            entry.food_name,
            entry.date
        );

        self.get_by_id(entry.id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<Entry>, sqlx::Error> {
        let row: Option<EntryRow> = sqlx::query_as("SELECT * FROM entries WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(hydrate_entry).transpose()
    }

    /// Entries for one day, oldest first.
    pub async fn list_by_date(&self, date: NaiveDate) -> Result<Vec<Entry>, sqlx::Error> {
        self.list_range(date, date).await
    }

    pub async fn list_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Entry>, sqlx::Error> {
        let rows: Vec<EntryRow> = sqlx::query_as(
            "SELECT * FROM entries WHERE date >= ? AND date <= ? ORDER BY date, created_at",
        )
        .bind(from.to_string())
        .bind(to.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(hydrate_entry).collect()
    }

    /// Rewrites quantity and snapshot values. Date and creation time stay.
    pub async fn update(&self, entry: &Entry) -> Result<Entry, sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE entries
            SET food_name = ?, servings = ?, calories_per_serving = ?,
                carbs_per_serving = ?, protein_per_serving = ?
            WHERE id = ?
            "#,
        )
        .bind(&entry.food_name)
        .bind(entry.servings)
        .bind(entry.calories_per_serving)
        .bind(entry.carbs_per_serving)
        .bind(entry.protein_per_serving)
        .bind(entry.id.to_string())
        .execute(&self.pool)
        .await?;

        self.get_by_id(entry.id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM entries WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

fn hydrate_entry(row: EntryRow) -> Result<Entry, sqlx::Error> {
    Ok(Entry {
        id: parse_uuid(&row.id)?,
        date: parse_date(&row.date)?,
        food_name: row.food_name,
        servings: row.servings,
        calories_per_serving: row.calories_per_serving,
        carbs_per_serving: row.carbs_per_serving,
        protein_per_serving: row.protein_per_serving,
        created_at: parse_timestamp(&row.created_at),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{init_db, FoodRepository};
    use macrotrack_core::{Food, Macros};
    use tempfile::TempDir;

    struct TestContext {
        entries: EntryRepository,
        foods: FoodRepository,
        _temp_dir: TempDir,
    }

    async fn setup() -> TestContext {
        let temp_dir = TempDir::new().unwrap();
        let pool = init_db(&temp_dir.path().join("test.db")).await.unwrap();
        TestContext {
            entries: EntryRepository::new(pool.clone()),
            foods: FoodRepository::new(pool),
            _temp_dir: temp_dir,
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
    }

    #[tokio::test]
    async fn test_create_and_get_entry() {
        let ctx = setup().await;

        let entry = Entry::new(day(1), "Oats", 1.5, Macros::new(150.0, 27.0, 5.0));
        let created = ctx.entries.create(&entry).await.unwrap();
        assert_eq!(created.food_name, "Oats");
        assert_eq!(created.servings, 1.5);
        assert_eq!(created.date, day(1));
        assert_eq!(created.totals(), entry.totals());
    }

    #[tokio::test]
    async fn test_list_by_date_orders_by_creation() {
        let ctx = setup().await;

        let mut second = Entry::new(day(2), "Lunch", 1.0, Macros::default());
        let first = Entry::new(day(2), "Breakfast", 1.0, Macros::default());
        second.created_at = first.created_at + chrono::Duration::minutes(5);

        ctx.entries.create(&second).await.unwrap();
        ctx.entries.create(&first).await.unwrap();
        ctx.entries
            .create(&Entry::new(day(3), "Other day", 1.0, Macros::default()))
            .await
            .unwrap();

        let entries = ctx.entries.list_by_date(day(2)).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].food_name, "Breakfast");
        assert_eq!(entries[1].food_name, "Lunch");
    }

    #[tokio::test]
    async fn test_list_range() {
        let ctx = setup().await;

        for d in [1, 5, 10] {
            ctx.entries
                .create(&Entry::new(day(d), "Food", 1.0, Macros::default()))
                .await
                .unwrap();
        }

        let entries = ctx.entries.list_range(day(1), day(5)).await.unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[tokio::test]
    async fn test_update_entry() {
        let ctx = setup().await;

        let entry = Entry::new(day(1), "Oats", 1.0, Macros::new(150.0, 27.0, 5.0));
        let mut created = ctx.entries.create(&entry).await.unwrap();
        created.servings = 2.0;

        let updated = ctx.entries.update(&created).await.unwrap();
        assert_eq!(updated.servings, 2.0);
        assert_eq!(updated.totals().calories, 300.0);
        assert_eq!(updated.date, day(1));
    }

    #[tokio::test]
    async fn test_entry_survives_food_edit_and_delete() {
        let ctx = setup().await;

        let food = Food::new("Granola", Macros::new(190.0, 29.0, 4.0));
        let mut food = ctx.foods.create(&food).await.unwrap();
        let entry = Entry::new(day(1), &food.name, 2.0, food.macros());
        ctx.entries.create(&entry).await.unwrap();

        food.calories_per_serving = 500.0;
        ctx.foods.update(&food).await.unwrap();
        let fetched = ctx.entries.get_by_id(entry.id).await.unwrap().unwrap();
        assert_eq!(fetched.calories_per_serving, 190.0);

        ctx.foods.delete(food.id).await.unwrap();
        let fetched = ctx.entries.get_by_id(entry.id).await.unwrap().unwrap();
        assert_eq!(fetched.totals().calories, 380.0);
    }

    #[tokio::test]
    async fn test_delete_entry() {
        let ctx = setup().await;

        let entry = Entry::new(day(1), "Oats", 1.0, Macros::default());
        ctx.entries.create(&entry).await.unwrap();
        ctx.entries.delete(entry.id).await.unwrap();
        assert!(ctx.entries.get_by_id(entry.id).await.unwrap().is_none());
    }
}
