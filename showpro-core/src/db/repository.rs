use async_trait::async_trait;
use thiserror::Error;

use crate::models::{BookingFees, FormDraft, NewBookingFees};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Record storage behind the booking-edit form.
///
/// Writes are last-write-wins; there is no optimistic locking.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    // Bookings
    async fn create_booking(
        &self,
        booking: NewBookingFees,
    ) -> Result<BookingFees, RepositoryError>;

    async fn get_booking(
        &self,
        id: i64,
    ) -> Result<BookingFees, RepositoryError>;

    async fn update_booking_fees(
        &self,
        booking: &BookingFees,
    ) -> Result<(), RepositoryError>;

    async fn list_bookings(&self) -> Result<Vec<BookingFees>, RepositoryError>;

    // Form drafts
    async fn save_draft(
        &self,
        form_key: &str,
        payload: &serde_json::Value,
    ) -> Result<FormDraft, RepositoryError>;

    async fn get_draft(
        &self,
        form_key: &str,
    ) -> Result<Option<FormDraft>, RepositoryError>;

    async fn delete_draft(
        &self,
        form_key: &str,
    ) -> Result<(), RepositoryError>;
}
