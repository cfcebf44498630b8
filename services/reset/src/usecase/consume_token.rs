use tracing::{error, info, warn};

use crate::domain::repository::{Clock, CredentialStore, ResetRecordStore};
use crate::domain::token_store::TokenStore;
use crate::domain::types::CredentialUpdate;
use crate::error::{ResetError, TokenRejection};
use crate::usecase::input::{validate_identifier, validate_new_credential};

pub struct ConsumeTokenInput {
    pub identifier: String,
    /// Bearer value from the `Authorization` header.
    pub token: String,
    pub new_credential: String,
    pub new_credential_confirmation: String,
}

pub struct ConsumeTokenUseCase<S, W, C>
where
    S: ResetRecordStore,
    W: CredentialStore,
    C: Clock,
{
    pub records: S,
    pub credentials: W,
    pub clock: C,
}

fn reject(reason: TokenRejection) -> ResetError {
    warn!(reason = %reason, "reset token rejected");
    ResetError::Unauthorized(reason)
}

impl<S, W, C> ConsumeTokenUseCase<S, W, C>
where
    S: ResetRecordStore,
    W: CredentialStore,
    C: Clock,
{
    pub async fn execute(&self, input: ConsumeTokenInput) -> Result<(), ResetError> {
        validate_identifier(&input.identifier)?;
        if input.token.is_empty() {
            return Err(reject(TokenRejection::Missing));
        }
        validate_new_credential(&input.new_credential, &input.new_credential_confirmation)?;

        let tokens = TokenStore::new(&self.records);
        let token = tokens
            .validate(&input.identifier, &input.token, self.clock.now())
            .await?
            .into_token()
            .map_err(reject)?;

        // Claim before writing the credential: of concurrent requests with
        // the same token only the claimant reaches the credential store.
        if !tokens.claim(&token).await? {
            return Err(reject(TokenRejection::Consumed));
        }

        match self
            .credentials
            .set_credential(&input.identifier, &input.new_credential)
            .await
        {
            Ok(CredentialUpdate::Updated) => {
                info!("credential reset completed");
                Ok(())
            }
            Ok(CredentialUpdate::UnknownAccount) => Err(reject(TokenRejection::UnknownAccount)),
            Err(e) => {
                // The credential did not change, so the token must stay usable.
                match tokens.restore(&token).await {
                    Ok(true) => {}
                    Ok(false) => warn!("reset token not restored, identifier has a newer record"),
                    Err(restore_err) => error!(error = ?restore_err, "failed to restore reset token"),
                }
                Err(match e {
                    ResetError::DownstreamFailure(_) => e,
                    other => ResetError::DownstreamFailure(other.into()),
                })
            }
        }
    }
}
