use chrono::{DateTime, Utc};

use crate::domain::repository::ResetRecordStore;
use crate::domain::types::{Challenge, MAX_ATTEMPTS, ResetRecord};
use crate::error::ResetError;

/// Outcome of charging a failed verification to a challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailedAttempt {
    /// Challenge survives with this many attempts left.
    Remaining(u32),
    /// That was the last attempt; the challenge is gone.
    Exhausted,
    /// No challenge to charge (never issued, consumed or replaced).
    Absent,
}

/// Challenge view over the per-identifier record store.
pub struct ChallengeStore<'a, S: ResetRecordStore> {
    records: &'a S,
}

impl<'a, S: ResetRecordStore> ChallengeStore<'a, S> {
    pub fn new(records: &'a S) -> Self {
        Self { records }
    }

    /// Replace whatever the identifier holds with a fresh challenge.
    pub async fn put(
        &self,
        identifier: &str,
        code: String,
        now: DateTime<Utc>,
    ) -> Result<Challenge, ResetError> {
        let challenge = Challenge::new(identifier, code, now);
        self.records
            .put(&ResetRecord::Challenge(challenge.clone()))
            .await?;
        Ok(challenge)
    }

    pub async fn get(&self, identifier: &str) -> Result<Option<Challenge>, ResetError> {
        match self.records.get(identifier).await? {
            Some(ResetRecord::Challenge(challenge)) => Ok(Some(challenge)),
            _ => Ok(None),
        }
    }

    /// Charge a failed verification to `observed`. Only that challenge is
    /// charged: if the identifier now holds a different one (a newer request
    /// replaced it) the result is `Absent`.
    pub async fn record_failed_attempt(
        &self,
        observed: &Challenge,
    ) -> Result<FailedAttempt, ResetError> {
        let mut current = observed.clone();
        loop {
            let attempts = current.attempts + 1;
            let expected = ResetRecord::Challenge(current.clone());

            let applied = if attempts >= MAX_ATTEMPTS {
                self.records.compare_and_delete(&expected).await?
            } else {
                let next = ResetRecord::Challenge(Challenge {
                    attempts,
                    ..current.clone()
                });
                self.records
                    .compare_and_set(&observed.identifier, Some(&expected), Some(&next))
                    .await?
            };
            if applied {
                return Ok(if attempts >= MAX_ATTEMPTS {
                    FailedAttempt::Exhausted
                } else {
                    FailedAttempt::Remaining(MAX_ATTEMPTS - attempts)
                });
            }

            // Concurrent failures against the same challenge only move
            // `attempts`; anything else means it is gone.
            match self.get(&observed.identifier).await? {
                Some(fresh) if fresh.is_same_issue(observed) => current = fresh,
                _ => return Ok(FailedAttempt::Absent),
            }
        }
    }

    /// Drop the identifier's challenge, if it has one. An issued token is
    /// left in place.
    pub async fn remove(&self, identifier: &str) -> Result<(), ResetError> {
        while let Some(current) = self.get(identifier).await? {
            if self
                .records
                .compare_and_delete(&ResetRecord::Challenge(current))
                .await?
            {
                break;
            }
        }
        Ok(())
    }
}
