use tracing::{debug, error};

use crate::domain::challenge_store::ChallengeStore;
use crate::domain::repository::{AccountDirectory, Clock, CodeDelivery, ResetRecordStore};
use crate::domain::secret::generate_code;
use crate::error::ResetError;
use crate::usecase::input::validate_identifier;

pub struct RequestChallengeInput {
    pub identifier: String,
}

#[derive(Debug)]
pub struct RequestChallengeOutput {
    /// The issued code. Handlers only return it in debug echo mode.
    pub code: String,
}

pub struct RequestChallengeUseCase<S, A, D, C>
where
    S: ResetRecordStore,
    A: AccountDirectory,
    D: CodeDelivery,
    C: Clock,
{
    pub records: S,
    pub accounts: A,
    pub delivery: D,
    pub clock: C,
}

impl<S, A, D, C> RequestChallengeUseCase<S, A, D, C>
where
    S: ResetRecordStore,
    A: AccountDirectory,
    D: CodeDelivery,
    C: Clock,
{
    pub async fn execute(
        &self,
        input: RequestChallengeInput,
    ) -> Result<RequestChallengeOutput, ResetError> {
        validate_identifier(&input.identifier)?;

        // Known and unknown identifiers take the same path through the store
        // so neither the response nor later verification reveals existence.
        let known = self.accounts.exists(&input.identifier).await?;

        let code = generate_code();
        ChallengeStore::new(&self.records)
            .put(&input.identifier, code.clone(), self.clock.now())
            .await?;

        if known {
            if let Err(e) = self.delivery.deliver(&input.identifier, &code).await {
                error!(error = ?e, "failed to enqueue reset code");
            }
        } else {
            debug!("reset requested for unknown identifier, delivery skipped");
        }

        Ok(RequestChallengeOutput { code })
    }
}
