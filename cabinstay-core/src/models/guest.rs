use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::email::NormalizedEmail;

pub type GuestId = i64;

/// Internal identity record linked to a login email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Guest {
    pub id: GuestId,
    pub email: NormalizedEmail,
    pub full_name: String,
    pub created_at: DateTime<Utc>,
}
