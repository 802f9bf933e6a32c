//! Booking fee split between artist and agency.
//!
//! A booking carries one gross fee (the total rate charged to the client).
//! The artist receives `split_ratio` of it, the agency keeps the rest as
//! commission, and VAT is applied independently to each side's net share.
//!
//! # Amounts
//!
//! | Amount         | Formula                                   |
//! |----------------|-------------------------------------------|
//! | `artist_net`   | total rate × split ratio                  |
//! | `agency_net`   | total rate × (1 − split ratio)            |
//! | `artist_vat`   | artist net × artist VAT rate / 100        |
//! | `agency_vat`   | agency net × client VAT rate / 100        |
//! | `artist_total` | artist net + artist VAT                   |
//! | `agency_total` | agency net + agency VAT                   |
//!
//! The split ratio always lies in `[0.50, 0.95]`; every edit path, including
//! back-solving the ratio from a typed amount, saturates into that band.
//! Totals saturate at [`MAX_TOTAL_RATE`](crate::calculations::common::MAX_TOTAL_RATE),
//! so no edit can overflow.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use showpro_core::calculations::{BookingFeeState, FeeSplitEngine};
//!
//! let mut engine = FeeSplitEngine::new(BookingFeeState::default());
//! engine.set_total_rate(dec!(150));
//! engine.set_split_ratio_direct(dec!(0.85));
//!
//! let amounts = engine.derived();
//! assert_eq!(amounts.artist_net, dec!(127.50));
//! assert_eq!(amounts.agency_net, dec!(22.50));
//! assert_eq!(amounts.artist_total, dec!(153.00));
//! assert_eq!(amounts.agency_total, dec!(27.00));
//! ```

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::calculations::common::{
    clamp_split_ratio, clamp_total_rate, clamp_vat_rate, max, round_currency, round_percent,
};
use crate::preferences::{DefaultSplitPreference, PreferenceError, PreferenceStore};

/// Ratio used when a back-solve has no total to divide by, and for bookings
/// without a stored split.
pub const FALLBACK_SPLIT_RATIO: Decimal = dec!(0.85);

/// VAT percentage used when a rate is absent or unparsable.
pub const DEFAULT_VAT_RATE: Decimal = dec!(20);

const ONE_HUNDRED: Decimal = dec!(100);

/// Fixed commission presets offered next to the split slider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommissionPreset {
    /// 15% commission.
    Standard,
    /// 7.5% commission.
    Reduced,
}

impl CommissionPreset {
    /// Artist share implied by the preset.
    pub fn ratio(&self) -> Decimal {
        match self {
            Self::Standard => dec!(0.85),
            Self::Reduced => dec!(0.925),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Standard => "15% commission",
            Self::Reduced => "7.5% commission",
        }
    }
}

/// Fee inputs held by one booking-edit session.
///
/// Only these four values are state; everything else is derived on demand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingFeeState {
    /// Gross fee charged to the client.
    pub total_rate: Decimal,

    /// Artist's share of the total rate, kept at full precision.
    pub split_ratio: Decimal,

    /// VAT percentage applied to the artist's net share.
    pub vat_rate_artist: Decimal,

    /// VAT percentage applied to the agency's net share.
    pub vat_rate_client: Decimal,
}

impl Default for BookingFeeState {
    fn default() -> Self {
        Self {
            total_rate: Decimal::ZERO,
            split_ratio: FALLBACK_SPLIT_RATIO,
            vat_rate_artist: DEFAULT_VAT_RATE,
            vat_rate_client: DEFAULT_VAT_RATE,
        }
    }
}

impl BookingFeeState {
    /// Brings every field into its valid range.
    fn normalized(self) -> Self {
        Self {
            total_rate: clamp_total_rate(self.total_rate),
            split_ratio: clamp_split_ratio(self.split_ratio),
            vat_rate_artist: clamp_vat_rate(self.vat_rate_artist),
            vat_rate_client: clamp_vat_rate(self.vat_rate_client),
        }
    }
}

/// Amounts derived from a [`BookingFeeState`], unrounded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedAmounts {
    pub artist_net: Decimal,
    pub agency_net: Decimal,
    pub artist_vat: Decimal,
    pub agency_vat: Decimal,
    pub artist_total: Decimal,
    pub agency_total: Decimal,
}

/// Derived amounts rounded for presentation: currency to 2 places,
/// percentages to 1 place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayAmounts {
    pub total_rate: Decimal,
    pub artist_percent: Decimal,
    pub commission_percent: Decimal,
    pub artist_net: Decimal,
    pub agency_net: Decimal,
    pub artist_vat: Decimal,
    pub agency_vat: Decimal,
    pub artist_total: Decimal,
    pub agency_total: Decimal,
}

/// Computes every derived amount from the fee state.
///
/// `agency_net` is taken as the remainder of the total so that
/// `artist_net + agency_net == total_rate` holds exactly. Out-of-range
/// fields are saturated first, as [`FeeSplitEngine::new`] does.
pub fn compute_derived(state: &BookingFeeState) -> DerivedAmounts {
    let state = state.clone().normalized();
    let artist_net = state.total_rate * state.split_ratio;
    let agency_net = state.total_rate - artist_net;
    let artist_vat = artist_net * state.vat_rate_artist / ONE_HUNDRED;
    let agency_vat = agency_net * state.vat_rate_client / ONE_HUNDRED;

    DerivedAmounts {
        artist_net,
        agency_net,
        artist_vat,
        agency_vat,
        artist_total: artist_net + artist_vat,
        agency_total: agency_net + agency_vat,
    }
}

/// Keeps the total rate, the split ratio and every derived amount in sync,
/// whichever field was edited last.
///
/// Mutations recompute synchronously, so [`FeeSplitEngine::derived`] always
/// reflects the latest edit once a setter returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeSplitEngine {
    state: BookingFeeState,
    derived: DerivedAmounts,
}

impl Default for FeeSplitEngine {
    fn default() -> Self {
        Self::new(BookingFeeState::default())
    }
}

impl FeeSplitEngine {
    /// Creates an engine from an initial state. Out-of-range values are
    /// saturated the same way the setters would.
    pub fn new(state: BookingFeeState) -> Self {
        let state = state.normalized();
        let derived = compute_derived(&state);
        Self { state, derived }
    }

    pub fn state(&self) -> &BookingFeeState {
        &self.state
    }

    pub fn derived(&self) -> &DerivedAmounts {
        &self.derived
    }

    pub fn split_ratio(&self) -> Decimal {
        self.state.split_ratio
    }

    /// Agency share of the total rate.
    pub fn commission_ratio(&self) -> Decimal {
        Decimal::ONE - self.state.split_ratio
    }

    /// Rounded view of the current amounts.
    pub fn display(&self) -> DisplayAmounts {
        DisplayAmounts {
            total_rate: round_currency(self.state.total_rate),
            artist_percent: round_percent(self.state.split_ratio * ONE_HUNDRED),
            commission_percent: round_percent(self.commission_ratio() * ONE_HUNDRED),
            artist_net: round_currency(self.derived.artist_net),
            agency_net: round_currency(self.derived.agency_net),
            artist_vat: round_currency(self.derived.artist_vat),
            agency_vat: round_currency(self.derived.agency_vat),
            artist_total: round_currency(self.derived.artist_total),
            agency_total: round_currency(self.derived.agency_total),
        }
    }

    /// Sets the gross fee; negative input is coerced to zero and huge input
    /// saturates at `MAX_TOTAL_RATE`. The split ratio is kept.
    pub fn set_total_rate(
        &mut self,
        total_rate: Decimal,
    ) {
        self.state.total_rate = clamp_total_rate(total_rate);
        self.recompute();
    }

    /// Sets the artist share directly (slider, preset, percent field).
    pub fn set_split_ratio_direct(
        &mut self,
        ratio: Decimal,
    ) {
        self.state.split_ratio = clamp_split_ratio(ratio);
        self.recompute();
    }

    /// Back-solves the split ratio from a typed artist net amount.
    ///
    /// The displayed artist amount follows the clamped ratio, so it may
    /// differ from the literal input when that input implied a ratio
    /// outside the band.
    pub fn set_artist_amount(
        &mut self,
        artist_net: Decimal,
    ) {
        let artist_net = max(artist_net, Decimal::ZERO);
        // an overflowing quotient is far above the band
        let ratio = self.back_solve(|total| artist_net.checked_div(total).unwrap_or(Decimal::MAX));
        self.set_split_ratio_direct(ratio);
    }

    /// Back-solves the split ratio from a typed agency net amount.
    pub fn set_agency_amount(
        &mut self,
        agency_net: Decimal,
    ) {
        let agency_net = max(agency_net, Decimal::ZERO);
        let ratio = self.back_solve(|total| {
            agency_net
                .checked_div(total)
                .and_then(|share| Decimal::ONE.checked_sub(share))
                .unwrap_or(Decimal::MIN)
        });
        self.set_split_ratio_direct(ratio);
    }

    /// Sets the artist share as a percentage (`85` for 0.85).
    pub fn set_artist_percent_direct(
        &mut self,
        percent: Decimal,
    ) {
        self.set_split_ratio_direct(percent / ONE_HUNDRED);
    }

    pub fn apply_preset(
        &mut self,
        preset: CommissionPreset,
    ) {
        self.set_split_ratio_direct(preset.ratio());
    }

    pub fn set_vat_rate_artist(
        &mut self,
        rate: Decimal,
    ) {
        self.state.vat_rate_artist = clamp_vat_rate(rate);
        self.recompute();
    }

    pub fn set_vat_rate_client(
        &mut self,
        rate: Decimal,
    ) {
        self.state.vat_rate_client = clamp_vat_rate(rate);
        self.recompute();
    }

    /// Stores the current split ratio as the default for new bookings.
    /// The engine state is left untouched.
    pub fn save_as_default(
        &self,
        store: &mut dyn PreferenceStore,
    ) -> Result<(), PreferenceError> {
        DefaultSplitPreference::save(store, self.state.split_ratio)
    }

    fn back_solve(
        &self,
        solve: impl FnOnce(Decimal) -> Decimal,
    ) -> Decimal {
        if self.state.total_rate > Decimal::ZERO {
            solve(self.state.total_rate)
        } else {
            FALLBACK_SPLIT_RATIO
        }
    }

    fn recompute(&mut self) {
        self.derived = compute_derived(&self.state);
    }
}
