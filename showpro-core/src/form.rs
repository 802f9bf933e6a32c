//! Booking-edit form binding for the fee split engine.
//!
//! The form owns one [`FeeSplitEngine`] per edit session. It initialises the
//! engine from a stored booking (or from the default split for a new one),
//! turns raw text from the input fields into engine calls, and writes the
//! amounts back into the booking record on save.
//!
//! Nothing in here reports an error to the user: unparsable input falls back
//! to the field's policy default and is only logged.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use thiserror::Error;
use tracing::debug;

use crate::calculations::common::round_currency;
use crate::calculations::{
    BookingFeeState, CommissionPreset, DEFAULT_VAT_RATE, DisplayAmounts, FALLBACK_SPLIT_RATIO,
    FeeSplitEngine,
};
use crate::models::{BookingFees, NewBookingFees};
use crate::preferences::{PreferenceError, PreferenceStore};

/// Percent shown in the split field when its input cannot be read.
const FALLBACK_SPLIT_PERCENT: Decimal = dec!(85);

/// Input problems the form recovers from locally.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FeeInputIssue {
    #[error("'{input}' is not a number in field {field}, using {fallback}")]
    InvalidNumericInput {
        field: FeeField,
        input: String,
        fallback: Decimal,
    },

    #[error("total rate is zero, split ratio falls back to {fallback}")]
    DivisionByZeroGuard { fallback: Decimal },
}

/// Editable fee fields of the booking form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeeField {
    TotalRate,
    SplitPercent,
    ArtistAmount,
    AgencyAmount,
    VatRateArtist,
    VatRateClient,
}

impl FeeField {
    /// Value substituted when the field's input is not numeric.
    pub fn policy_default(&self) -> Decimal {
        match self {
            Self::TotalRate | Self::ArtistAmount | Self::AgencyAmount => Decimal::ZERO,
            Self::SplitPercent => FALLBACK_SPLIT_PERCENT,
            Self::VatRateArtist | Self::VatRateClient => DEFAULT_VAT_RATE,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TotalRate => "total_rate",
            Self::SplitPercent => "split_percent",
            Self::ArtistAmount => "artist_amount",
            Self::AgencyAmount => "agency_amount",
            Self::VatRateArtist => "vat_rate_artist",
            Self::VatRateClient => "vat_rate_client",
        }
    }
}

impl std::fmt::Display for FeeField {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when text cannot be parsed as an amount.
#[derive(Debug, Error)]
#[error("invalid amount '{input}': {source}")]
pub struct ParseAmountError {
    input: String,
    #[source]
    source: rust_decimal::Error,
}

/// Normalizes input for decimal parsing: trims whitespace and removes
/// thousands separators and a leading currency sign.
fn normalize_amount_input(s: &str) -> String {
    let trimmed = s.trim();
    let trimmed = trimmed.strip_prefix('£').unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix('%').unwrap_or(trimmed);
    trimmed.trim().replace(',', "")
}

/// Parses text typed into an amount or rate field.
///
/// Handles comma as thousands separator (`"1,234.56"`), a leading `£` and a
/// trailing `%`. Empty input is `Ok(None)`.
pub fn parse_amount(s: &str) -> Result<Option<Decimal>, ParseAmountError> {
    let normalized = normalize_amount_input(s);
    if normalized.is_empty() {
        return Ok(None);
    }
    normalized
        .parse()
        .map(Some)
        .map_err(|source| ParseAmountError {
            input: s.to_string(),
            source,
        })
}

/// Parses field input, substituting the field's policy default for empty or
/// non-numeric text.
pub fn parse_field(
    field: FeeField,
    input: &str,
) -> Decimal {
    match parse_amount(input) {
        Ok(Some(value)) => value,
        Ok(None) => field.policy_default(),
        Err(error) => {
            let issue = FeeInputIssue::InvalidNumericInput {
                field,
                input: input.to_string(),
                fallback: field.policy_default(),
            };
            debug!(%issue, %error, "recovered from invalid numeric input");
            field.policy_default()
        }
    }
}

/// Fee section of one booking-edit session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingFeeForm {
    engine: FeeSplitEngine,
}

impl BookingFeeForm {
    /// Starts a form for a booking that does not exist yet. The stored
    /// default split, when there is one, is the initial ratio.
    pub fn for_new_booking(default_split: Option<Decimal>) -> Self {
        let state = BookingFeeState {
            split_ratio: default_split.unwrap_or(FALLBACK_SPLIT_RATIO),
            ..BookingFeeState::default()
        };
        Self {
            engine: FeeSplitEngine::new(state),
        }
    }

    /// Starts a form from a stored booking.
    ///
    /// The ratio is re-derived from `buy_fee / sell_fee`; VAT rates fall back
    /// from the per-side column to the legacy `vat_rate` and then to 20%.
    pub fn from_record(record: &BookingFees) -> Self {
        let total_rate = record.sell_fee.unwrap_or(Decimal::ZERO);
        let split_ratio = match (record.buy_fee, record.sell_fee) {
            (Some(buy), Some(sell)) if sell > Decimal::ZERO => {
                buy.checked_div(sell).unwrap_or(Decimal::MAX)
            }
            _ => FALLBACK_SPLIT_RATIO,
        };
        let state = BookingFeeState {
            total_rate,
            split_ratio,
            vat_rate_artist: record
                .vat_rate_artist
                .or(record.vat_rate)
                .unwrap_or(DEFAULT_VAT_RATE),
            vat_rate_client: record
                .vat_rate_client
                .or(record.vat_rate)
                .unwrap_or(DEFAULT_VAT_RATE),
        };
        debug!(booking_id = record.id, ?state, "loaded booking fees into form");
        Self {
            engine: FeeSplitEngine::new(state),
        }
    }

    /// Restores a form from an autosaved draft payload. Returns `None` when
    /// the payload does not describe a fee state.
    pub fn from_draft(payload: &serde_json::Value) -> Option<Self> {
        match serde_json::from_value::<BookingFeeState>(payload.clone()) {
            Ok(state) => Some(Self {
                engine: FeeSplitEngine::new(state),
            }),
            Err(error) => {
                debug!(%error, "draft payload is not a booking fee state");
                None
            }
        }
    }

    pub fn engine(&self) -> &FeeSplitEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut FeeSplitEngine {
        &mut self.engine
    }

    pub fn display(&self) -> DisplayAmounts {
        self.engine.display()
    }

    pub fn on_total_rate_input(
        &mut self,
        input: &str,
    ) {
        let total = parse_field(FeeField::TotalRate, input);
        self.engine.set_total_rate(total);
    }

    /// Split field input, as the artist's percentage.
    pub fn on_split_percent_input(
        &mut self,
        input: &str,
    ) {
        let percent = parse_field(FeeField::SplitPercent, input);
        self.engine.set_artist_percent_direct(percent);
    }

    pub fn on_artist_amount_input(
        &mut self,
        input: &str,
    ) {
        let amount = parse_field(FeeField::ArtistAmount, input);
        self.log_zero_total_guard();
        self.engine.set_artist_amount(amount);
    }

    pub fn on_agency_amount_input(
        &mut self,
        input: &str,
    ) {
        let amount = parse_field(FeeField::AgencyAmount, input);
        self.log_zero_total_guard();
        self.engine.set_agency_amount(amount);
    }

    pub fn on_vat_artist_input(
        &mut self,
        input: &str,
    ) {
        let rate = parse_field(FeeField::VatRateArtist, input);
        self.engine.set_vat_rate_artist(rate);
    }

    pub fn on_vat_client_input(
        &mut self,
        input: &str,
    ) {
        let rate = parse_field(FeeField::VatRateClient, input);
        self.engine.set_vat_rate_client(rate);
    }

    pub fn on_preset(
        &mut self,
        preset: CommissionPreset,
    ) {
        self.engine.apply_preset(preset);
    }

    /// "Save as Default" button.
    pub fn save_split_as_default(
        &self,
        store: &mut dyn PreferenceStore,
    ) -> Result<(), PreferenceError> {
        self.engine.save_as_default(store)
    }

    /// Writes the fee amounts into `record`. The split ratio is not stored;
    /// it is recovered from `buy_fee / sell_fee` on the next load.
    pub fn apply_to(
        &self,
        record: &mut BookingFees,
    ) {
        let state = self.engine.state();
        record.sell_fee = Some(round_currency(state.total_rate));
        record.buy_fee = Some(round_currency(self.engine.derived().artist_net));
        record.vat_rate_artist = Some(state.vat_rate_artist);
        record.vat_rate_client = Some(state.vat_rate_client);
    }

    /// Fee columns for a booking that is inserted with this form's amounts.
    pub fn new_record(
        &self,
        reference: impl Into<String>,
    ) -> NewBookingFees {
        let state = self.engine.state();
        NewBookingFees {
            reference: reference.into(),
            sell_fee: Some(round_currency(state.total_rate)),
            buy_fee: Some(round_currency(self.engine.derived().artist_net)),
            vat_rate: None,
            vat_rate_artist: Some(state.vat_rate_artist),
            vat_rate_client: Some(state.vat_rate_client),
        }
    }

    /// Current state as a draft payload for autosave.
    pub fn draft_payload(&self) -> serde_json::Value {
        // BookingFeeState is plain data; serialization cannot fail.
        serde_json::to_value(self.engine.state()).unwrap_or(serde_json::Value::Null)
    }

    fn log_zero_total_guard(&self) {
        if self.engine.state().total_rate <= Decimal::ZERO {
            let issue = FeeInputIssue::DivisionByZeroGuard {
                fallback: FALLBACK_SPLIT_RATIO,
            };
            debug!(%issue, "recovered from zero total rate");
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::preferences::{DefaultSplitPreference, MemoryPreferenceStore};

    fn record() -> BookingFees {
        let now = Utc::now();
        BookingFees {
            id: 7,
            reference: "BK-0007".to_string(),
            sell_fee: Some(dec!(150)),
            buy_fee: Some(dec!(127.50)),
            vat_rate: None,
            vat_rate_artist: Some(dec!(20)),
            vat_rate_client: Some(dec!(20)),
            created_at: now,
            updated_at: now,
        }
    }

    // =========================================================================
    // parsing
    // =========================================================================

    #[test]
    fn parse_amount_accepts_separators_and_symbols() {
        assert_eq!(parse_amount("1,234.56").unwrap(), Some(dec!(1234.56)));
        assert_eq!(parse_amount(" £150 ").unwrap(), Some(dec!(150)));
        assert_eq!(parse_amount("92.5%").unwrap(), Some(dec!(92.5)));
    }

    #[test]
    fn parse_amount_empty_is_none() {
        assert_eq!(parse_amount("   ").unwrap(), None);
    }

    #[test]
    fn parse_amount_invalid_returns_error() {
        assert!(parse_amount("abc").is_err());
    }

    #[test]
    fn parse_field_uses_policy_defaults() {
        assert_eq!(parse_field(FeeField::TotalRate, "lots"), Decimal::ZERO);
        assert_eq!(parse_field(FeeField::SplitPercent, "?"), dec!(85));
        assert_eq!(parse_field(FeeField::VatRateArtist, ""), dec!(20));
        assert_eq!(parse_field(FeeField::VatRateClient, "n/a"), dec!(20));
        assert_eq!(parse_field(FeeField::AgencyAmount, "x"), Decimal::ZERO);
    }

    // =========================================================================
    // initialisation
    // =========================================================================

    #[test]
    fn new_booking_uses_stored_default() {
        let mut store = MemoryPreferenceStore::new();
        DefaultSplitPreference::save(&mut store, dec!(0.9)).unwrap();

        let form = BookingFeeForm::for_new_booking(DefaultSplitPreference::load(&store));

        assert_eq!(form.engine().split_ratio(), dec!(0.9));
        assert_eq!(form.engine().state().total_rate, Decimal::ZERO);
    }

    #[test]
    fn new_booking_without_default_uses_fallback() {
        let form = BookingFeeForm::for_new_booking(None);

        assert_eq!(form.engine().split_ratio(), dec!(0.85));
        assert_eq!(form.engine().state().vat_rate_artist, dec!(20));
    }

    #[test]
    fn from_record_derives_ratio_from_fees() {
        let form = BookingFeeForm::from_record(&record());

        assert_eq!(form.engine().split_ratio(), dec!(0.85));
        assert_eq!(form.display().agency_total, dec!(27.00));
    }

    #[test]
    fn from_record_without_sell_fee_uses_fallback_ratio() {
        let mut booking = record();
        booking.sell_fee = None;

        let form = BookingFeeForm::from_record(&booking);

        assert_eq!(form.engine().split_ratio(), dec!(0.85));
        assert_eq!(form.engine().state().total_rate, Decimal::ZERO);
    }

    #[test]
    fn from_record_with_zero_sell_fee_uses_fallback_ratio() {
        let mut booking = record();
        booking.sell_fee = Some(Decimal::ZERO);
        booking.buy_fee = Some(dec!(10));

        let form = BookingFeeForm::from_record(&booking);

        assert_eq!(form.engine().split_ratio(), dec!(0.85));
    }

    #[test]
    fn from_record_clamps_stored_split() {
        let mut booking = record();
        booking.buy_fee = Some(dec!(150));

        let form = BookingFeeForm::from_record(&booking);

        assert_eq!(form.engine().split_ratio(), dec!(0.95));
    }

    #[test]
    fn from_record_falls_back_to_legacy_vat_rate() {
        let mut booking = record();
        booking.vat_rate = Some(dec!(5));
        booking.vat_rate_artist = None;
        booking.vat_rate_client = None;

        let form = BookingFeeForm::from_record(&booking);

        assert_eq!(form.engine().state().vat_rate_artist, dec!(5));
        assert_eq!(form.engine().state().vat_rate_client, dec!(5));
    }

    #[test]
    fn from_record_defaults_missing_vat_to_twenty() {
        let mut booking = record();
        booking.vat_rate_artist = None;
        booking.vat_rate_client = Some(dec!(0));

        let form = BookingFeeForm::from_record(&booking);

        assert_eq!(form.engine().state().vat_rate_artist, dec!(20));
        assert_eq!(form.engine().state().vat_rate_client, dec!(0));
    }

    // =========================================================================
    // input handlers
    // =========================================================================

    #[test]
    fn text_inputs_drive_the_engine() {
        let mut form = BookingFeeForm::for_new_booking(None);

        form.on_total_rate_input("2,000");
        form.on_agency_amount_input("£150");

        assert_eq!(form.engine().split_ratio(), dec!(0.925));
        assert_eq!(form.display().artist_net, dec!(1850.00));
        assert_eq!(form.display().commission_percent, dec!(7.5));
    }

    #[test]
    fn garbage_total_resets_to_zero() {
        let mut form = BookingFeeForm::from_record(&record());

        form.on_total_rate_input("one fifty");

        assert_eq!(form.engine().state().total_rate, Decimal::ZERO);
        assert_eq!(form.engine().split_ratio(), dec!(0.85));
    }

    #[test]
    fn garbage_split_percent_uses_eighty_five() {
        let mut form = BookingFeeForm::from_record(&record());
        form.on_split_percent_input("60");

        form.on_split_percent_input("sixty");

        assert_eq!(form.engine().split_ratio(), dec!(0.85));
    }

    #[test]
    fn garbage_vat_uses_twenty() {
        let mut form = BookingFeeForm::from_record(&record());
        form.on_vat_artist_input("0");

        form.on_vat_artist_input("zero");

        assert_eq!(form.engine().state().vat_rate_artist, dec!(20));
    }

    #[test]
    fn artist_amount_on_zero_total_falls_back() {
        let mut form = BookingFeeForm::for_new_booking(Some(dec!(0.6)));

        form.on_artist_amount_input("100");

        assert_eq!(form.engine().split_ratio(), dec!(0.85));
    }

    // =========================================================================
    // saving
    // =========================================================================

    #[test]
    fn apply_to_writes_fees_but_not_ratio() {
        let mut form = BookingFeeForm::from_record(&record());
        form.on_total_rate_input("200");
        form.on_preset(CommissionPreset::Reduced);
        form.on_vat_client_input("0");

        let mut booking = record();
        form.apply_to(&mut booking);

        assert_eq!(booking.sell_fee, Some(dec!(200.00)));
        assert_eq!(booking.buy_fee, Some(dec!(185.00)));
        assert_eq!(booking.vat_rate_artist, Some(dec!(20)));
        assert_eq!(booking.vat_rate_client, Some(dec!(0)));

        let reloaded = BookingFeeForm::from_record(&booking);
        assert_eq!(reloaded.engine().split_ratio(), dec!(0.925));
    }

    #[test]
    fn largest_typed_total_saturates() {
        let mut form = BookingFeeForm::for_new_booking(None);

        form.on_total_rate_input("79228162514264337593543950335");

        assert_eq!(form.display().total_rate, dec!(1000000000000.00));
        assert_eq!(form.display().artist_net, dec!(850000000000.00));
    }

    #[test]
    fn huge_amount_on_tiny_total_saturates_split() {
        let mut form = BookingFeeForm::for_new_booking(None);
        form.on_total_rate_input("0.0000000000000000000000000001");

        form.on_artist_amount_input("79228162514264337593543950335");

        assert_eq!(form.engine().split_ratio(), dec!(0.95));
    }

    #[test]
    fn from_record_with_tiny_sell_fee_saturates_split() {
        let mut booking = record();
        booking.sell_fee = Some(dec!(0.0000000000000000000000000001));
        booking.buy_fee = Some(Decimal::MAX);

        let form = BookingFeeForm::from_record(&booking);

        assert_eq!(form.engine().split_ratio(), dec!(0.95));
    }

        #[test]
    fn save_split_as_default_writes_preference() {
        let mut store = MemoryPreferenceStore::new();
        let mut form = BookingFeeForm::from_record(&record());
        form.on_split_percent_input("92.5");

        form.save_split_as_default(&mut store).unwrap();

        assert_eq!(DefaultSplitPreference::load(&store), Some(dec!(0.925)));
    }

    #[test]
    fn new_record_carries_rounded_fees() {
        let mut form = BookingFeeForm::for_new_booking(None);
        form.on_total_rate_input("300");
        form.on_artist_amount_input("200");

        let record = form.new_record("BK-0100");

        assert_eq!(record.reference, "BK-0100");
        assert_eq!(record.sell_fee, Some(dec!(300.00)));
        assert_eq!(record.buy_fee, Some(dec!(200.00)));
        assert_eq!(record.vat_rate_artist, Some(dec!(20)));
        assert_eq!(record.vat_rate_client, Some(dec!(20)));
    }

        #[test]
    fn draft_payload_restores_same_state() {
        let mut form = BookingFeeForm::from_record(&record());
        form.on_artist_amount_input("120");

        let restored = BookingFeeForm::from_draft(&form.draft_payload()).unwrap();

        assert_eq!(restored, form);
    }

    #[test]
    fn from_draft_rejects_foreign_payload() {
        let payload = serde_json::json!({ "artist": "The Mighty Boosh" });

        assert_eq!(BookingFeeForm::from_draft(&payload), None);
    }
}
