use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::timestamp;

/// A control-plane user as returned by `auth.getUser`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct User {
    pub id: String,
    #[serde(deserialize_with = "timestamp::lenient")]
    pub created_at: Option<DateTime<Utc>>,
    pub email: String,
    pub admin: bool,
    /// Only present on some deployments; normally empty.
    pub password: Option<String>,
    pub api_token: String,
}
