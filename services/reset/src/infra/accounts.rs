//! Account directory and credential store, both served by the accounts
//! service over internal HTTP.

use anyhow::{Context as _, anyhow};
use reqwest::{Client, StatusCode, Url};
use serde::Serialize;

use crate::domain::repository::{AccountDirectory, CredentialStore};
use crate::domain::types::CredentialUpdate;
use crate::error::ResetError;

#[derive(Clone)]
pub struct HttpAccountService {
    client: Client,
    base_url: Url,
}

#[derive(Serialize)]
struct SetCredentialBody<'a> {
    password: &'a str,
}

impl HttpAccountService {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let base_url =
            Url::parse(base_url).with_context(|| format!("invalid accounts URL: {base_url}"))?;
        if base_url.cannot_be_a_base() {
            return Err(anyhow!("accounts URL cannot be a base: {base_url}"));
        }
        Ok(Self {
            client: Client::new(),
            base_url,
        })
    }

    /// `{base}/internal/accounts/{identifier}[/{suffix}]`, each segment
    /// percent-encoded.
    fn account_url(&self, identifier: &str, suffix: Option<&str>) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["internal", "accounts", identifier]);
            if let Some(suffix) = suffix {
                segments.push(suffix);
            }
        }
        url
    }
}

impl AccountDirectory for HttpAccountService {
    async fn exists(&self, identifier: &str) -> Result<bool, ResetError> {
        let resp = self
            .client
            .get(self.account_url(identifier, None))
            .send()
            .await
            .context("account lookup request")?;
        match resp.status() {
            s if s.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            s => Err(anyhow!("account lookup returned {s}").into()),
        }
    }
}

impl CredentialStore for HttpAccountService {
    async fn set_credential(
        &self,
        identifier: &str,
        credential: &str,
    ) -> Result<CredentialUpdate, ResetError> {
        let resp = self
            .client
            .put(self.account_url(identifier, Some("credential")))
            .json(&SetCredentialBody {
                password: credential,
            })
            .send()
            .await
            .map_err(|e| ResetError::DownstreamFailure(e.into()))?;
        match resp.status() {
            s if s.is_success() => Ok(CredentialUpdate::Updated),
            StatusCode::NOT_FOUND => Ok(CredentialUpdate::UnknownAccount),
            s => Err(ResetError::DownstreamFailure(anyhow!(
                "credential update returned {s}"
            ))),
        }
    }
}
