//! Best-effort forwarding of contact submissions to an external webhook,
//! e.g. a spreadsheet ingest script.
//!
//! The relay runs on a detached task with a bounded timeout. Its outcome
//! never reaches the visitor: a failure is logged and the submission still
//! counts as received, since it has already been persisted locally.

use crate::prelude::*;
use crate::utils::config::RelayConfig;

pub struct Relay {
    client: reqwest::Client,
    url: Option<String>,
}

/// The JSON body POSTed to the webhook. `timestamp` is stamped at relay
/// time, not copied from the stored submission.
#[derive(Debug, serde::Serialize)]
struct RelayPayload {
    name: String,
    email: String,
    subject: String,
    message: String,
    timestamp: DateTime<Utc>,
}

impl From<&Submission> for RelayPayload {
    fn from(submission: &Submission) -> Self {
        Self {
            name: submission.name.clone(),
            email: submission.email.clone(),
            subject: submission.subject.clone(),
            message: submission.message.clone(),
            timestamp: Utc::now(),
        }
    }
}

impl Relay {
    pub fn new(config: Option<&RelayConfig>) -> Result<Self> {
        let timeout = config.map(|c| c.timeout_secs).unwrap_or(5);
        let client = reqwest::Client::builder().timeout(Duration::from_secs(timeout)).build()?;
        Ok(Self { client, url: config.map(|c| c.url.clone()) })
    }

    /// Forward `submission` on a detached task, if a webhook is configured.
    pub fn spawn_forward(&self, submission: &Submission) {
        let Some(url) = self.url.clone() else { return };
        let client = self.client.clone();
        let payload = RelayPayload::from(submission);

        tokio::spawn(async move {
            if let Err(e) = deliver(&client, &url, &payload).await {
                tracing::error!("relay: failed to forward submission to {url}: {e}");
            }
        });
    }
}

async fn deliver(client: &reqwest::Client, url: &str, payload: &RelayPayload) -> reqwest::Result<()> {
    client.post(url).json(payload).send().await?.error_for_status()?;
    Ok(())
}
