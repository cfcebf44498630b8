use chrono::{DateTime, Utc};

use crate::domain::repository::ResetRecordStore;
use crate::domain::secret::{generate_token_secret, secrets_match};
use crate::domain::types::{Challenge, ResetRecord, ResetToken};
use crate::error::{ResetError, TokenRejection};

/// Result of checking a presented bearer value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenValidation {
    Valid(ResetToken),
    NotFound,
    Expired,
    Mismatch,
}

impl TokenValidation {
    pub fn into_token(self) -> Result<ResetToken, TokenRejection> {
        match self {
            Self::Valid(token) => Ok(token),
            Self::NotFound => Err(TokenRejection::NotFound),
            Self::Expired => Err(TokenRejection::Expired),
            Self::Mismatch => Err(TokenRejection::Mismatch),
        }
    }
}

/// Reset-token view over the per-identifier record store.
pub struct TokenStore<'a, S: ResetRecordStore> {
    records: &'a S,
}

impl<'a, S: ResetRecordStore> TokenStore<'a, S> {
    pub fn new(records: &'a S) -> Self {
        Self { records }
    }

    /// Mint a token for `identifier`, replacing whatever it holds.
    pub async fn issue(&self, identifier: &str, now: DateTime<Utc>) -> Result<String, ResetError> {
        let token = ResetToken {
            identifier: identifier.to_owned(),
            secret: generate_token_secret(),
            issued_at: now,
        };
        self.records.put(&ResetRecord::Token(token.clone())).await?;
        Ok(token.secret)
    }

    /// Mint a token in place of `verified`. The swap only happens if
    /// `verified` is still exactly what the store holds, so one challenge
    /// yields at most one token. Returns `None` when the record changed.
    pub async fn promote(
        &self,
        verified: &Challenge,
        now: DateTime<Utc>,
    ) -> Result<Option<String>, ResetError> {
        let token = ResetToken {
            identifier: verified.identifier.clone(),
            secret: generate_token_secret(),
            issued_at: now,
        };
        let swapped = self
            .records
            .compare_and_set(
                &verified.identifier,
                Some(&ResetRecord::Challenge(verified.clone())),
                Some(&ResetRecord::Token(token.clone())),
            )
            .await?;
        Ok(swapped.then_some(token.secret))
    }

    /// Check `candidate` against the identifier's token. An expired token is
    /// removed on the way out.
    pub async fn validate(
        &self,
        identifier: &str,
        candidate: &str,
        now: DateTime<Utc>,
    ) -> Result<TokenValidation, ResetError> {
        let token = match self.records.get(identifier).await? {
            Some(ResetRecord::Token(token)) => token,
            _ => return Ok(TokenValidation::NotFound),
        };
        if token.is_expired(now) {
            self.records
                .compare_and_delete(&ResetRecord::Token(token))
                .await?;
            return Ok(TokenValidation::Expired);
        }
        if secrets_match(&token.secret, candidate) {
            Ok(TokenValidation::Valid(token))
        } else {
            Ok(TokenValidation::Mismatch)
        }
    }

    /// Drop the identifier's token, if it has one. Idempotent; a pending
    /// challenge is left in place.
    pub async fn consume(&self, identifier: &str) -> Result<(), ResetError> {
        while let Some(record @ ResetRecord::Token(_)) = self.records.get(identifier).await? {
            if self.records.compare_and_delete(&record).await? {
                break;
            }
        }
        Ok(())
    }

    /// Single-use claim: delete `token` if it is still stored. Of any number
    /// of concurrent callers holding the same token exactly one sees `true`.
    pub async fn claim(&self, token: &ResetToken) -> Result<bool, ResetError> {
        self.records
            .compare_and_delete(&ResetRecord::Token(token.clone()))
            .await
    }

    /// Undo [`claim`](Self::claim) after the credential update failed.
    /// Leaves the slot alone if a new challenge was requested meanwhile.
    pub async fn restore(&self, token: &ResetToken) -> Result<bool, ResetError> {
        self.records
            .compare_and_set(
                &token.identifier,
                None,
                Some(&ResetRecord::Token(token.clone())),
            )
            .await
    }
}
