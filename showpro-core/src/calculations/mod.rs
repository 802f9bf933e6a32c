//! Fee calculation modules.
//!
//! The fee split engine and the shared rounding and clamping helpers it
//! builds on.

pub mod common;
pub mod fee_split;

pub use fee_split::{
    BookingFeeState, CommissionPreset, DEFAULT_VAT_RATE, DerivedAmounts, DisplayAmounts,
    FALLBACK_SPLIT_RATIO, FeeSplitEngine, compute_derived,
};
