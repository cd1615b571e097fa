use chrono::NaiveDate;
use macrotrack_core::WaterLog;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::{parse_date, parse_timestamp, parse_uuid};

pub struct WaterRepository {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct WaterRow {
    id: String,
    date: String,
    amount_ml: f64,
    created_at: String,
}

impl WaterRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, log: &WaterLog) -> Result<WaterLog, sqlx::Error> {
        sqlx::query(
            "INSERT INTO water_logs (id, date, amount_ml, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(log.id.to_string())
        .bind(log.date.to_string())
        .bind(log.amount_ml)
        .bind(log.created_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(log.clone())
    }

    pub async fn list_by_date(&self, date: NaiveDate) -> Result<Vec<WaterLog>, sqlx::Error> {
        let rows: Vec<WaterRow> =
            sqlx::query_as("SELECT * FROM water_logs WHERE date = ? ORDER BY created_at")
                .bind(date.to_string())
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(hydrate_water).collect()
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM water_logs WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

fn hydrate_water(row: WaterRow) -> Result<WaterLog, sqlx::Error> {
    Ok(WaterLog {
        id: parse_uuid(&row.id)?,
        date: parse_date(&row.date)?,
        amount_ml: row.amount_ml,
        created_at: parse_timestamp(&row.created_at),
    })
}
