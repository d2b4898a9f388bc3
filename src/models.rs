use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A stored paste. `id` and `created_at` are assigned on creation and never
/// rewritten afterwards.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Paste {
    pub id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Request body accepted by create and update.
#[derive(Debug, Deserialize)]
pub struct PasteBody {
    pub content: String,
}
