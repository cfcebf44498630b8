//! Out-of-band code delivery.
//!
//! Requests only enqueue; a background worker talks to the notifier. Request
//! latency is therefore the same whether or not a code was sent.

use std::fmt;

use anyhow::{Context as _, anyhow};
use reqwest::{Client, Url};
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::domain::repository::CodeDelivery;
use crate::error::ResetError;

#[derive(Clone, Serialize)]
pub struct DeliveryJob {
    pub email: String,
    pub code: String,
}

impl fmt::Debug for DeliveryJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeliveryJob")
            .field("email", &self.email)
            .field("code", &"<redacted>")
            .finish()
    }
}

/// Where the worker sends codes.
#[derive(Clone)]
pub enum Notifier {
    /// POST `{"email","code"}` to the notification service.
    Webhook { client: Client, url: Url },
    /// Development sink: records that a code went out, never the code.
    Log,
}

impl Notifier {
    pub fn webhook(url: &str) -> anyhow::Result<Self> {
        let url = Url::parse(url).with_context(|| format!("invalid notifier URL: {url}"))?;
        Ok(Self::Webhook {
            client: Client::new(),
            url,
        })
    }

    async fn send(&self, job: &DeliveryJob) -> anyhow::Result<()> {
        match self {
            Self::Webhook { client, url } => {
                let resp = client
                    .post(url.clone())
                    .json(job)
                    .send()
                    .await
                    .context("notifier request")?;
                if !resp.status().is_success() {
                    return Err(anyhow!("notifier returned {}", resp.status()));
                }
                Ok(())
            }
            Self::Log => {
                info!("reset code ready for delivery (log sink, not sent)");
                Ok(())
            }
        }
    }
}

/// Producer half handed to the request path.
#[derive(Clone)]
pub struct QueuedDelivery {
    tx: mpsc::Sender<DeliveryJob>,
}

impl CodeDelivery for QueuedDelivery {
    async fn deliver(&self, identifier: &str, code: &str) -> Result<(), ResetError> {
        let job = DeliveryJob {
            email: identifier.to_owned(),
            code: code.to_owned(),
        };
        match self.tx.try_send(job) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                warn!("delivery queue full, dropping reset code");
                Ok(())
            }
            Err(TrySendError::Closed(_)) => {
                Err(anyhow!("delivery worker is not running").into())
            }
        }
    }
}

/// Start the delivery worker. It runs until every [`QueuedDelivery`] is dropped.
pub fn spawn_delivery_worker(
    notifier: Notifier,
    capacity: usize,
) -> (QueuedDelivery, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::channel::<DeliveryJob>(capacity.max(1));
    let handle = tokio::spawn(async move {
        while let Some(job) = rx.recv().await {
            match notifier.send(&job).await {
                Ok(()) => debug!("reset code delivered"),
                Err(e) => warn!(error = %e, "reset code delivery failed"),
            }
        }
    });
    (QueuedDelivery { tx }, handle)
}
