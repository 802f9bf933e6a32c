use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Fee columns of a stored booking.
///
/// `buy_fee / sell_fee` is how the split ratio is recovered on load; the
/// ratio itself is never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingFees {
    pub id: i64,
    pub reference: String,

    /// Gross fee charged to the client (the total rate).
    pub sell_fee: Option<Decimal>,
    /// Artist net amount.
    pub buy_fee: Option<Decimal>,

    /// Legacy single VAT rate, used when the per-side rates are absent.
    pub vat_rate: Option<Decimal>,
    pub vat_rate_artist: Option<Decimal>,
    pub vat_rate_client: Option<Decimal>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// For creating new bookings (no id or timestamps)
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NewBookingFees {
    pub reference: String,
    pub sell_fee: Option<Decimal>,
    pub buy_fee: Option<Decimal>,
    pub vat_rate: Option<Decimal>,
    pub vat_rate_artist: Option<Decimal>,
    pub vat_rate_client: Option<Decimal>,
}
