use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Challenge lifetime in seconds (5 minutes).
pub const CHALLENGE_TTL_SECS: i64 = 300;

/// Reset token lifetime in seconds (10 minutes).
pub const TOKEN_TTL_SECS: i64 = 600;

/// Failed verifications a challenge survives before it is discarded.
pub const MAX_ATTEMPTS: u32 = 3;

/// One-time code length in digits.
pub const CODE_LEN: usize = 6;

/// Random bytes behind a reset token secret (256 bits).
pub const TOKEN_BYTES: usize = 32;

/// Minimum new-credential length in characters.
pub const MIN_CREDENTIAL_LEN: usize = 8;

/// Longest accepted identifier (RFC 5321 path limit).
pub const MAX_IDENTIFIER_LEN: usize = 254;

/// One-time code issued to an identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Challenge {
    pub identifier: String,
    pub code: String,
    pub created_at: DateTime<Utc>,
    pub attempts: u32,
}

impl Challenge {
    pub fn new(identifier: &str, code: String, now: DateTime<Utc>) -> Self {
        Self {
            identifier: identifier.to_owned(),
            code,
            created_at: now,
            attempts: 0,
        }
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.created_at + Duration::seconds(CHALLENGE_TTL_SECS)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at()
    }

    pub fn is_exhausted(&self) -> bool {
        self.attempts >= MAX_ATTEMPTS
    }

    /// Same issued challenge, whatever its attempt count.
    pub fn is_same_issue(&self, other: &Challenge) -> bool {
        self.identifier == other.identifier
            && self.code == other.code
            && self.created_at == other.created_at
    }

    pub fn remaining_attempts(&self) -> u32 {
        MAX_ATTEMPTS.saturating_sub(self.attempts)
    }
}

/// Single-use bearer credential minted from a verified challenge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetToken {
    pub identifier: String,
    pub secret: String,
    pub issued_at: DateTime<Utc>,
}

impl ResetToken {
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.issued_at + Duration::seconds(TOKEN_TTL_SECS)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at()
    }
}

/// The per-identifier state: pending challenge or issued token. No record
/// means the identifier is idle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResetRecord {
    Challenge(Challenge),
    Token(ResetToken),
}

impl ResetRecord {
    pub fn identifier(&self) -> &str {
        match self {
            Self::Challenge(c) => &c.identifier,
            Self::Token(t) => &t.identifier,
        }
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        match self {
            Self::Challenge(c) => c.expires_at(),
            Self::Token(t) => t.expires_at(),
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at()
    }
}

/// Flat layout of a record in external stores.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoredRecord {
    pub identifier: String,
    pub kind: RecordKind,
    /// Code for challenges, secret for tokens.
    pub secret: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attempts: Option<u32>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Challenge,
    Token,
}

impl From<&ResetRecord> for StoredRecord {
    fn from(record: &ResetRecord) -> Self {
        match record {
            ResetRecord::Challenge(c) => Self {
                identifier: c.identifier.clone(),
                kind: RecordKind::Challenge,
                secret: c.code.clone(),
                created_at: c.created_at,
                attempts: Some(c.attempts),
            },
            ResetRecord::Token(t) => Self {
                identifier: t.identifier.clone(),
                kind: RecordKind::Token,
                secret: t.secret.clone(),
                created_at: t.issued_at,
                attempts: None,
            },
        }
    }
}

impl From<StoredRecord> for ResetRecord {
    fn from(stored: StoredRecord) -> Self {
        match stored.kind {
            RecordKind::Challenge => Self::Challenge(Challenge {
                identifier: stored.identifier,
                code: stored.secret,
                created_at: stored.created_at,
                attempts: stored.attempts.unwrap_or(0),
            }),
            RecordKind::Token => Self::Token(ResetToken {
                identifier: stored.identifier,
                secret: stored.secret,
                issued_at: stored.created_at,
            }),
        }
    }
}

/// Result of a credential write by the external credential store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialUpdate {
    Updated,
    UnknownAccount,
}
