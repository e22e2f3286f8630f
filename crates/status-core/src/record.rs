//! Per-user status record

use serde::{Deserialize, Serialize};

/// `show` value written for unavailable presence.
pub const UNAVAILABLE: &str = "unavailable";

/// Longest client-supplied `show` text that is kept verbatim.
pub const MAX_SHOW_LEN: usize = 19;

/// Availability category stored in the `status` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    Online,
    Offline,
}

impl Availability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Availability::Online => "online",
            Availability::Offline => "offline",
        }
    }
}

/// Last-known status of one user, keyed by bare JID.
///
/// Writes always replace the whole record. Timestamps are seconds since the
/// epoch, `0` meaning "never observed".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRecord {
    pub status: String,
    pub show: String,
    #[serde(rename = "last-login")]
    pub last_login: i64,
    #[serde(rename = "last-logout")]
    pub last_logout: i64,
}

impl StatusRecord {
    pub fn new(availability: Availability, show: impl Into<String>, last_login: i64, last_logout: i64) -> Self {
        Self {
            status: availability.as_str().to_string(),
            show: show.into(),
            last_login,
            last_logout,
        }
    }
}
