//! The session log row.

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use trellis_macros::GridRow;

/// One visitor session, as shown in the log grid and stored in the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, GridRow)]
pub struct SessionRecord {
    #[grid(filterable)]
    pub session_id: String,
    #[grid(hidden, filterable)]
    pub user_name: String,
    #[grid(hidden, filterable)]
    pub role: String,
    /// Whether the address has been geolocated.
    #[grid(hidden, filterable)]
    pub verified: bool,
    /// Remote address, suffixed with the gate verdict once classified.
    #[grid(filterable)]
    pub ip_address: String,
    #[grid(hidden, filterable)]
    pub user_agent: String,
    #[grid(filterable)]
    pub city: String,
    #[grid(filterable)]
    pub state: String,
    #[grid(filterable)]
    pub country_code: String,
    #[grid(filterable, format = "g")]
    pub created_on: NaiveDateTime,
}

impl Default for SessionRecord {
    fn default() -> Self {
        Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            user_name: "unknown".to_string(),
            role: "user".to_string(),
            verified: false,
            ip_address: "unknown".to_string(),
            user_agent: "unknown".to_string(),
            city: "unknown".to_string(),
            state: "unknown".to_string(),
            country_code: "US".to_string(),
            created_on: Local::now().naive_local(),
        }
    }
}

impl SessionRecord {
    /// A fresh session with a new id, created now.
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh session for a connection from `ip_address`.
    pub fn for_connection(ip_address: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            ip_address: ip_address.into(),
            user_agent: user_agent.into(),
            ..Self::default()
        }
    }

    /// JSON rendering attached to diagnostics.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|err| format!("{{\"error\":\"{err}\"}}"))
    }
}
