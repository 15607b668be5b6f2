//! Share entity model.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Access state of a share. Expiry is never stored; it is computed on read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[repr(i32)]
#[serde(rename_all = "snake_case")]
pub enum ShareStatus {
    /// Nobody has resolved the code yet.
    Unused = 0,
    /// The code has been resolved at least once.
    Accessed = 1,
}

/// Unit applied to a share's expiry quantity.
///
/// Stored as a small integer; anything other than 2 or 3 means minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpireUnit {
    /// Minutes (codes 0 and 1, and any unknown code).
    Minutes,
    /// Hours (code 2).
    Hours,
    /// Days (code 3).
    Days,
}

impl ExpireUnit {
    /// Interpret a stored unit code.
    pub fn from_code(code: i64) -> Self {
        match code {
            2 => Self::Hours,
            3 => Self::Days,
            _ => Self::Minutes,
        }
    }

    /// Length of `quantity` of this unit. Saturates instead of overflowing.
    pub fn duration(self, quantity: i64) -> Duration {
        let minutes = match self {
            Self::Minutes => quantity,
            Self::Hours => quantity.saturating_mul(60),
            Self::Days => quantity.saturating_mul(60 * 24),
        };
        Duration::try_minutes(minutes).unwrap_or(Duration::MAX)
    }
}

/// A shared file and/or text payload plus its access metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Share {
    /// Content fingerprint for file shares, random hex id for text-only shares.
    pub id: String,
    /// Where the bytes live (`<root>/<name>_<suffix><ext>`). `None` for text-only shares.
    pub locator: Option<String>,
    /// Inline text payload.
    pub text: Option<String>,
    /// Expiry quantity; 0 never expires.
    pub expire_quantity: i64,
    /// Raw expiry unit code, see [`ExpireUnit::from_code`].
    pub expire_unit: i64,
    /// Access state.
    pub status: ShareStatus,
    /// Human-facing access code.
    pub code: String,
    /// When the record store accepted the share.
    pub created_at: DateTime<Utc>,
}

impl Share {
    /// The interpreted expiry unit.
    pub fn unit(&self) -> ExpireUnit {
        ExpireUnit::from_code(self.expire_unit)
    }

    /// Whether the share carries file content.
    pub fn has_file(&self) -> bool {
        self.locator.is_some()
    }
}

/// Data required to persist a new share.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateShare {
    /// Share identity.
    pub id: String,
    /// Stored content locator.
    pub locator: Option<String>,
    /// Inline text payload.
    pub text: Option<String>,
    /// Expiry quantity.
    pub expire_quantity: i64,
    /// Raw expiry unit code.
    pub expire_unit: i64,
    /// Access code.
    pub code: String,
}
