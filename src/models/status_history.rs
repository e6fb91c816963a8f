use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::candidate::ApplicationStatus;

/// One recorded status transition. Append-only from the client's side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusHistoryEntry {
    pub id: Option<Uuid>,
    pub candidate: Option<Uuid>,
    pub previous_status: Option<ApplicationStatus>,
    pub new_status: ApplicationStatus,
    #[serde(default)]
    pub feedback: String,
    #[serde(default)]
    pub admin_name: String,
    pub admin_email: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}
