use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unsaved form contents, upserted by form key while the user edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormDraft {
    pub form_key: String,
    pub payload: serde_json::Value,
    pub updated_at: DateTime<Utc>,
}
