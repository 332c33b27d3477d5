use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use shared::{domain::BookingId, protocol::BookingRecord};

const IN_MEMORY_URL: &str = "sqlite::memory:";

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBooking {
    pub id: i64,
    pub time: String,
    pub name: String,
    pub room_number: String,
    pub number_of_people: u32,
    pub created_at: DateTime<Utc>,
}

impl From<StoredBooking> for BookingRecord {
    fn from(stored: StoredBooking) -> Self {
        Self {
            id: BookingId::from(stored.id),
            time: Some(stored.time),
            name: stored.name,
            room_number: stored.room_number,
            number_of_people: stored.number_of_people,
        }
    }
}

/// Editable part of a booking; `id` and `time` never change after insert.
#[derive(Debug, Clone, Copy)]
pub struct BookingFields<'a> {
    pub name: &'a str,
    pub room_number: &'a str,
    pub number_of_people: u32,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        // Every connection to an in-memory database is a separate database.
        let pool_options = if database_url == IN_MEMORY_URL {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };
        let pool = pool_options.connect_with(connect_options).await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    pub async fn insert_booking(&self, time: &str, fields: BookingFields<'_>) -> Result<StoredBooking> {
        let row = sqlx::query(
            "INSERT INTO bookings (time, name, room_number, number_of_people, created_at)
             VALUES (?, ?, ?, ?, ?)
             RETURNING id, time, name, room_number, number_of_people, created_at",
        )
        .bind(time)
        .bind(fields.name)
        .bind(fields.room_number)
        .bind(i64::from(fields.number_of_people))
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .context("failed to insert booking")?;
        stored_booking(&row)
    }

    pub async fn list_bookings(&self) -> Result<Vec<StoredBooking>> {
        let rows = sqlx::query(
            "SELECT id, time, name, room_number, number_of_people, created_at
             FROM bookings
             ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await
        .context("failed to list bookings")?;
        rows.iter().map(stored_booking).collect()
    }

    pub async fn booking(&self, id: i64) -> Result<Option<StoredBooking>> {
        let row = sqlx::query(
            "SELECT id, time, name, room_number, number_of_people, created_at
             FROM bookings
             WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(stored_booking).transpose()
    }

    /// Returns the updated row, or `None` when no booking has this id.
    pub async fn update_booking(
        &self,
        id: i64,
        fields: BookingFields<'_>,
    ) -> Result<Option<StoredBooking>> {
        let row = sqlx::query(
            "UPDATE bookings
             SET name = ?, room_number = ?, number_of_people = ?
             WHERE id = ?
             RETURNING id, time, name, room_number, number_of_people, created_at",
        )
        .bind(fields.name)
        .bind(fields.room_number)
        .bind(i64::from(fields.number_of_people))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .with_context(|| format!("failed to update booking {id}"))?;
        row.as_ref().map(stored_booking).transpose()
    }

    /// Returns whether a row was removed.
    pub async fn delete_booking(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM bookings WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .with_context(|| format!("failed to delete booking {id}"))?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn purge_bookings(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM bookings")
            .execute(&self.pool)
            .await
            .context("failed to purge bookings")?;
        Ok(result.rows_affected())
    }
}

fn stored_booking(row: &SqliteRow) -> Result<StoredBooking> {
    let id = row.try_get::<i64, _>("id")?;
    let number_of_people = row.try_get::<i64, _>("number_of_people")?;
    Ok(StoredBooking {
        id,
        time: row.try_get("time")?,
        name: row.try_get("name")?,
        room_number: row.try_get("room_number")?,
        number_of_people: u32::try_from(number_of_people)
            .with_context(|| format!("booking {id} has invalid party size {number_of_people}"))?,
        created_at: row.try_get("created_at")?,
    })
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url == IN_MEMORY_URL || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
