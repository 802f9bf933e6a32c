use std::str::FromStr;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use showpro_core::{BookingFees, BookingRepository, FormDraft, NewBookingFees, RepositoryError};
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::debug;

use crate::decimal::{decimal_to_text, get_optional_decimal};

const BOOKING_COLUMNS: &str = "id, reference, sell_fee, buy_fee, vat_rate, vat_rate_artist,
                               vat_rate_client, created_at, updated_at";

pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    /// Connect to `database_url`, which may be a bare file path (created if
    /// missing), a `sqlite:` URL, or `:memory:`.
    pub async fn new(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("Invalid database url: {}", database_url))?
            .create_if_missing(true);
        // An in-memory database lives only as long as its connection.
        let pool_options = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new()
        };
        let pool = pool_options
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to connect to database: {}", database_url))?;
        Ok(Self { pool })
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }
}

fn database_error(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Database(e.to_string())
}

fn row_to_booking(row: &sqlx::sqlite::SqliteRow) -> Result<BookingFees, RepositoryError> {
    Ok(BookingFees {
        id: row.try_get("id").map_err(database_error)?,
        reference: row.try_get("reference").map_err(database_error)?,
        sell_fee: get_optional_decimal(row, "sell_fee")?,
        buy_fee: get_optional_decimal(row, "buy_fee")?,
        vat_rate: get_optional_decimal(row, "vat_rate")?,
        vat_rate_artist: get_optional_decimal(row, "vat_rate_artist")?,
        vat_rate_client: get_optional_decimal(row, "vat_rate_client")?,
        created_at: row
            .try_get::<DateTime<Utc>, _>("created_at")
            .map_err(|e| RepositoryError::Database(format!("Failed to get created_at: {}", e)))?,
        updated_at: row
            .try_get::<DateTime<Utc>, _>("updated_at")
            .map_err(|e| RepositoryError::Database(format!("Failed to get updated_at: {}", e)))?,
    })
}

fn row_to_draft(row: &sqlx::sqlite::SqliteRow) -> Result<FormDraft, RepositoryError> {
    let payload: String = row.try_get("payload").map_err(database_error)?;
    Ok(FormDraft {
        form_key: row.try_get("form_key").map_err(database_error)?,
        payload: serde_json::from_str(&payload).map_err(|e| {
            RepositoryError::Database(format!("Failed to parse draft payload: {}", e))
        })?,
        updated_at: row
            .try_get::<DateTime<Utc>, _>("updated_at")
            .map_err(|e| RepositoryError::Database(format!("Failed to get updated_at: {}", e)))?,
    })
}

#[async_trait]
impl BookingRepository for SqliteRepository {
    async fn create_booking(
        &self,
        booking: NewBookingFees,
    ) -> Result<BookingFees, RepositoryError> {
        let now = Utc::now();

        let result = sqlx::query(
            "INSERT INTO bookings (
                reference, sell_fee, buy_fee, vat_rate, vat_rate_artist, vat_rate_client,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&booking.reference)
        .bind(booking.sell_fee.map(decimal_to_text))
        .bind(booking.buy_fee.map(decimal_to_text))
        .bind(booking.vat_rate.map(decimal_to_text))
        .bind(booking.vat_rate_artist.map(decimal_to_text))
        .bind(booking.vat_rate_client.map(decimal_to_text))
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        let id = result.last_insert_rowid();
        debug!(id, reference = %booking.reference, "created booking");
        self.get_booking(id).await
    }

    async fn get_booking(
        &self,
        id: i64,
    ) -> Result<BookingFees, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(database_error)?
            .ok_or(RepositoryError::NotFound)?;

        row_to_booking(&row)
    }

    async fn update_booking_fees(
        &self,
        booking: &BookingFees,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE bookings SET
                sell_fee = ?, buy_fee = ?, vat_rate = ?, vat_rate_artist = ?,
                vat_rate_client = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(booking.sell_fee.map(decimal_to_text))
        .bind(booking.buy_fee.map(decimal_to_text))
        .bind(booking.vat_rate.map(decimal_to_text))
        .bind(booking.vat_rate_artist.map(decimal_to_text))
        .bind(booking.vat_rate_client.map(decimal_to_text))
        .bind(Utc::now())
        .bind(booking.id)
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        debug!(id = booking.id, "updated booking fees");
        Ok(())
    }

    async fn list_bookings(&self) -> Result<Vec<BookingFees>, RepositoryError> {
        let rows = sqlx::query(&format!("SELECT {BOOKING_COLUMNS} FROM bookings ORDER BY id"))
            .fetch_all(&self.pool)
            .await
            .map_err(database_error)?;

        rows.iter().map(row_to_booking).collect()
    }

    async fn save_draft(
        &self,
        form_key: &str,
        payload: &serde_json::Value,
    ) -> Result<FormDraft, RepositoryError> {
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO form_drafts (form_key, payload, updated_at) VALUES (?, ?, ?)
             ON CONFLICT(form_key) DO UPDATE SET
                payload = excluded.payload,
                updated_at = excluded.updated_at",
        )
        .bind(form_key)
        .bind(payload.to_string())
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(FormDraft {
            form_key: form_key.to_string(),
            payload: payload.clone(),
            updated_at: now,
        })
    }

    async fn get_draft(
        &self,
        form_key: &str,
    ) -> Result<Option<FormDraft>, RepositoryError> {
        sqlx::query("SELECT form_key, payload, updated_at FROM form_drafts WHERE form_key = ?")
            .bind(form_key)
            .fetch_optional(&self.pool)
            .await
            .map_err(database_error)?
            .as_ref()
            .map(row_to_draft)
            .transpose()
    }

    async fn delete_draft(
        &self,
        form_key: &str,
    ) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM form_drafts WHERE form_key = ?")
            .bind(form_key)
            .execute(&self.pool)
            .await
            .map_err(database_error)?;
        Ok(())
    }
}
