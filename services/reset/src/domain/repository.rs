#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};

use crate::domain::types::{CredentialUpdate, ResetRecord};
use crate::error::ResetError;

/// Keyed store holding at most one [`ResetRecord`] per identifier.
///
/// Every call is linearizable per identifier. Implementations must not hold a
/// lock that spans identifiers.
pub trait ResetRecordStore: Send + Sync {
    async fn get(&self, identifier: &str) -> Result<Option<ResetRecord>, ResetError>;

    /// Unconditionally replace the record for `record.identifier()`.
    async fn put(&self, record: &ResetRecord) -> Result<(), ResetError>;

    /// Idempotent delete.
    async fn delete(&self, identifier: &str) -> Result<(), ResetError>;

    /// Atomically replace the stored value with `new` if it currently equals
    /// `expected` (`None` meaning absent on either side). Returns whether the
    /// swap happened.
    async fn compare_and_set(
        &self,
        identifier: &str,
        expected: Option<&ResetRecord>,
        new: Option<&ResetRecord>,
    ) -> Result<bool, ResetError>;

    async fn compare_and_delete(&self, expected: &ResetRecord) -> Result<bool, ResetError> {
        self.compare_and_set(expected.identifier(), Some(expected), None)
            .await
    }

    /// Drop records that expired before `now`. Returns how many were removed.
    /// Opportunistic: expiry is always re-checked on read.
    async fn sweep_expired(&self, now: DateTime<Utc>) -> Result<usize, ResetError>;

    /// Readiness probe.
    async fn ping(&self) -> Result<(), ResetError>;
}

/// Port to the account directory owned by the accounts service.
pub trait AccountDirectory: Send + Sync {
    async fn exists(&self, identifier: &str) -> Result<bool, ResetError>;
}

/// Port to the credential store owned by the accounts service. Hashing and
/// persistence happen on the other side.
pub trait CredentialStore: Send + Sync {
    async fn set_credential(
        &self,
        identifier: &str,
        credential: &str,
    ) -> Result<CredentialUpdate, ResetError>;
}

/// Out-of-band channel that hands a code to the account holder.
pub trait CodeDelivery: Send + Sync {
    async fn deliver(&self, identifier: &str, code: &str) -> Result<(), ResetError>;
}

/// Source of the current time for expiry decisions.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
