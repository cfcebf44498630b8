use tracing::{debug, info};

use crate::domain::challenge_store::{ChallengeStore, FailedAttempt};
use crate::domain::repository::{Clock, ResetRecordStore};
use crate::domain::secret::secrets_match;
use crate::domain::token_store::TokenStore;
use crate::domain::types::ResetRecord;
use crate::error::ResetError;
use crate::usecase::input::{validate_code, validate_identifier};

pub struct VerifyChallengeInput {
    pub identifier: String,
    pub code: String,
}

#[derive(Debug)]
pub struct VerifyChallengeOutput {
    pub token: String,
}

pub struct VerifyChallengeUseCase<S: ResetRecordStore, C: Clock> {
    pub records: S,
    pub clock: C,
}

impl<S: ResetRecordStore, C: Clock> VerifyChallengeUseCase<S, C> {
    pub async fn execute(
        &self,
        input: VerifyChallengeInput,
    ) -> Result<VerifyChallengeOutput, ResetError> {
        validate_identifier(&input.identifier)?;
        validate_code(&input.code)?;

        let challenges = ChallengeStore::new(&self.records);
        let tokens = TokenStore::new(&self.records);
        let now = self.clock.now();

        loop {
            let Some(challenge) = challenges.get(&input.identifier).await? else {
                return Err(ResetError::NoActiveChallenge);
            };

            if challenge.is_expired(now) || challenge.is_exhausted() {
                debug!(expired = challenge.is_expired(now), "discarding stale challenge");
                // Only the challenge inspected here; a newer one stays.
                self.records
                    .compare_and_delete(&ResetRecord::Challenge(challenge))
                    .await?;
                return Err(ResetError::NoActiveChallenge);
            }

            if !secrets_match(&challenge.code, &input.code) {
                return match challenges.record_failed_attempt(&challenge).await? {
                    FailedAttempt::Remaining(remaining_attempts) => {
                        Err(ResetError::InvalidCode { remaining_attempts })
                    }
                    FailedAttempt::Exhausted => {
                        info!("reset challenge exhausted");
                        Err(ResetError::InvalidCode {
                            remaining_attempts: 0,
                        })
                    }
                    FailedAttempt::Absent => Err(ResetError::NoActiveChallenge),
                };
            }

            if let Some(token) = tokens.promote(&challenge, now).await? {
                info!("reset challenge verified, token issued");
                return Ok(VerifyChallengeOutput { token });
            }
            // The record moved under us (a concurrent attempt or a new
            // request). Decide again against what is stored now.
        }
    }
}
