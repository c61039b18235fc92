use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use serde::Serialize;
use zeroize::Zeroizing;

use crate::{entities::email::EmailContent, errors::MailError};

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &EmailContent) -> Result<(), MailError>;
}

#[async_trait]
impl<T> Mailer for Arc<T>
where
    T: Mailer + ?Sized,
{
    async fn send(&self, email: &EmailContent) -> Result<(), MailError> {
        (**self).send(email).await
    }
}

/// Logs instead of sending. Used when no mail relay is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: &EmailContent) -> Result<(), MailError> {
        tracing::info!(to = %email.to, subject = %email.subject, "Mail relay not configured, email not sent");
        Ok(())
    }
}

#[derive(Serialize)]
struct RelayMessage<'a> {
    from: &'a str,
    #[serde(flatten)]
    content: &'a EmailContent,
}

/// Posts messages as JSON to an HTTP mail relay.
pub struct HttpMailer {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<Zeroizing<String>>,
    from: String,
}

impl HttpMailer {
    pub fn new(
        endpoint: &str,
        api_key: Option<&str>,
        from_name: &str,
        from_address: &str,
    ) -> Result<Self, MailError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| MailError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            api_key: api_key.map(|k| Zeroizing::new(k.to_string())),
            from: format!("\"{}\" <{}>", from_name, from_address),
        })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, email: &EmailContent) -> Result<(), MailError> {
        let mut request = self.client
            .post(&self.endpoint)
            .json(&RelayMessage { from: &self.from, content: email });

        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key.as_str());
        }

        let response = request
            .send()
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MailError::Rejected(status.as_u16()));
        }

        tracing::info!(to = %email.to, "Email sent successfully");
        Ok(())
    }
}
