//! Command handlers behind the `showpro` binary.
//!
//! Each handler drives a [`BookingFeeForm`] the way the booking-edit screen
//! does: initialise, feed field edits in, then persist.

use std::sync::Arc;

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use showpro_core::calculations::CommissionPreset;
use showpro_core::db::{BookingRepository, RepositoryRegistry};
use showpro_core::drafts::{DraftAutosaver, booking_form_key};
use showpro_core::form::BookingFeeForm;
use showpro_core::models::BookingFees;
use showpro_core::preferences::{DefaultSplitPreference, PreferenceStore};
use showpro_db_sqlite::SqliteRepositoryFactory;
use tracing::{debug, info};

/// Registry with every backend this binary ships.
pub fn build_registry() -> RepositoryRegistry {
    let mut registry = RepositoryRegistry::new();
    registry.register(Box::new(SqliteRepositoryFactory));
    registry
}

/// Field edits collected from the command line, applied in form order:
/// total and VAT first, then whichever split control was used.
///
/// Amount fields carry the raw text so they go through the same recovery
/// as typed input.
#[derive(Debug, Clone, Default)]
pub struct FeeEdits {
    pub total: Option<String>,
    pub vat_artist: Option<String>,
    pub vat_client: Option<String>,
    pub split: Option<Decimal>,
    pub artist_percent: Option<String>,
    pub artist_amount: Option<String>,
    pub agency_amount: Option<String>,
    pub preset: Option<CommissionPreset>,
}

impl FeeEdits {
    pub fn apply(
        &self,
        form: &mut BookingFeeForm,
    ) {
        if let Some(total) = &self.total {
            form.on_total_rate_input(total);
        }
        if let Some(vat) = &self.vat_artist {
            form.on_vat_artist_input(vat);
        }
        if let Some(vat) = &self.vat_client {
            form.on_vat_client_input(vat);
        }
        if let Some(ratio) = self.split {
            form.engine_mut().set_split_ratio_direct(ratio);
        }
        if let Some(percent) = &self.artist_percent {
            form.on_split_percent_input(percent);
        }
        if let Some(preset) = self.preset {
            form.on_preset(preset);
        }
        if let Some(amount) = &self.artist_amount {
            form.on_artist_amount_input(amount);
        }
        if let Some(amount) = &self.agency_amount {
            form.on_agency_amount_input(amount);
        }
    }
}

/// Fee breakdown for a booking that is not stored.
pub fn quote(
    prefs: &dyn PreferenceStore,
    edits: &FeeEdits,
) -> BookingFeeForm {
    let mut form = BookingFeeForm::for_new_booking(DefaultSplitPreference::load(prefs));
    edits.apply(&mut form);
    form
}

/// Creates a booking whose fees start from the stored default split.
pub async fn create_booking(
    repo: &dyn BookingRepository,
    prefs: &dyn PreferenceStore,
    reference: &str,
    edits: &FeeEdits,
) -> Result<BookingFees> {
    let form = quote(prefs, edits);

    let booking = repo
        .create_booking(form.new_record(reference))
        .await
        .context("failed to create booking")?;

    info!(id = booking.id, reference, "created booking");
    Ok(booking)
}

/// What `set_booking_fees` did with the edited form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMode {
    /// Write the fees to the booking and discard any draft.
    Save,
    /// Keep the edits as a draft only.
    Draft,
}

/// Loads a booking into the form, resumes an unsaved draft when one exists,
/// applies `edits`, then saves or drafts the result.
pub async fn set_booking_fees(
    repo: Arc<dyn BookingRepository>,
    id: i64,
    edits: &FeeEdits,
    mode: SaveMode,
) -> Result<(BookingFees, BookingFeeForm)> {
    let mut booking = repo
        .get_booking(id)
        .await
        .with_context(|| format!("failed to load booking {id}"))?;

    let form_key = booking_form_key(id);
    let draft = repo
        .get_draft(&form_key)
        .await
        .with_context(|| format!("failed to load draft for booking {id}"))?;

    let mut form = match draft.as_ref().and_then(|d| BookingFeeForm::from_draft(&d.payload)) {
        Some(form) => {
            info!(id, "resuming unsaved fee draft");
            form
        }
        None => BookingFeeForm::from_record(&booking),
    };
    edits.apply(&mut form);

    match mode {
        SaveMode::Draft => {
            let mut autosaver = DraftAutosaver::new(Arc::clone(&repo), form_key);
            autosaver.schedule(form.draft_payload());
            autosaver.flush().await;
            debug!(id, "fee edits kept as draft");
        }
        SaveMode::Save => {
            form.apply_to(&mut booking);
            repo.update_booking_fees(&booking)
                .await
                .with_context(|| format!("failed to save booking {id}"))?;
            repo.delete_draft(&form_key)
                .await
                .with_context(|| format!("failed to discard draft for booking {id}"))?;
            info!(id, "saved booking fees");
        }
    }

    Ok((booking, form))
}

/// Sets the default split for new bookings. The value goes through the
/// engine so it is clamped like any other edit.
pub fn set_default_split(
    prefs: &mut dyn PreferenceStore,
    ratio: Decimal,
) -> Result<Decimal> {
    let mut form = BookingFeeForm::for_new_booking(None);
    form.engine_mut().set_split_ratio_direct(ratio);
    form.save_split_as_default(prefs)
        .context("failed to save default split")?;
    Ok(form.engine().split_ratio())
}
