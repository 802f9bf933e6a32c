mod booking;
mod form_draft;

pub use booking::{BookingFees, NewBookingFees};
pub use form_draft::FormDraft;
