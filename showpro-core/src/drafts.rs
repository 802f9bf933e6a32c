//! Debounced autosave of unsaved form contents.
//!
//! Every edit reschedules a single pending upsert; only the last payload
//! within the debounce window reaches the repository. Failed saves are
//! logged and dropped so the form keeps working.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::db::BookingRepository;

/// Delay between the last edit and the draft upsert.
pub const DEFAULT_AUTOSAVE_DELAY: Duration = Duration::from_millis(1500);

/// Form key used for the fee section of booking `id`.
pub fn booking_form_key(id: i64) -> String {
    format!("booking:{id}:fees")
}

pub struct DraftAutosaver {
    repo: Arc<dyn BookingRepository>,
    form_key: String,
    delay: Duration,
    pending: Option<JoinHandle<()>>,
}

impl DraftAutosaver {
    pub fn new(
        repo: Arc<dyn BookingRepository>,
        form_key: impl Into<String>,
    ) -> Self {
        Self::with_delay(repo, form_key, DEFAULT_AUTOSAVE_DELAY)
    }

    pub fn with_delay(
        repo: Arc<dyn BookingRepository>,
        form_key: impl Into<String>,
        delay: Duration,
    ) -> Self {
        Self {
            repo,
            form_key: form_key.into(),
            delay,
            pending: None,
        }
    }

    /// Replaces any pending save with one for `payload`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule(
        &mut self,
        payload: serde_json::Value,
    ) {
        self.cancel();

        let repo = Arc::clone(&self.repo);
        let form_key = self.form_key.clone();
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            match repo.save_draft(&form_key, &payload).await {
                Ok(_) => debug!(form_key = %form_key, "draft autosaved"),
                Err(error) => warn!(form_key = %form_key, %error, "draft autosave failed"),
            }
        }));
    }

    /// Waits for the pending save, if any, to finish.
    pub async fn flush(&mut self) {
        let Some(handle) = self.pending.take() else {
            return;
        };
        if let Err(error) = handle.await {
            if !error.is_cancelled() {
                warn!(form_key = %self.form_key, %error, "draft autosave task panicked");
            }
        }
    }

    /// Drops the pending save without running it.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

impl Drop for DraftAutosaver {
    fn drop(&mut self) {
        self.cancel();
    }
}
