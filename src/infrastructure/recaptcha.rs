use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use serde::Deserialize;
use zeroize::Zeroizing;

use crate::errors::BotCheckError;

/// Placeholder some clients send when the widget failed to load.
pub const NO_RECAPTCHA_TOKEN: &str = "no-recaptcha";

#[async_trait]
pub trait BotVerifier: Send + Sync {
    async fn verify(&self, token: Option<&str>, remote_ip: Option<&str>) -> Result<(), BotCheckError>;
}

#[async_trait]
impl<T> BotVerifier for Arc<T>
where
    T: BotVerifier + ?Sized,
{
    async fn verify(&self, token: Option<&str>, remote_ip: Option<&str>) -> Result<(), BotCheckError> {
        (**self).verify(token, remote_ip).await
    }
}

/// Accepts everything. Used when no reCAPTCHA secret is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledVerifier;

#[async_trait]
impl BotVerifier for DisabledVerifier {
    async fn verify(&self, _token: Option<&str>, _remote_ip: Option<&str>) -> Result<(), BotCheckError> {
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct SiteVerifyResponse {
    success: bool,
    score: Option<f64>,
    #[serde(rename = "error-codes", default)]
    error_codes: Vec<String>,
}

/// reCAPTCHA v3 `siteverify` client.
pub struct RecaptchaVerifier {
    client: reqwest::Client,
    secret: Zeroizing<String>,
    verify_url: String,
    min_score: f64,
}

impl RecaptchaVerifier {
    pub fn new(secret: &str, verify_url: &str, min_score: f64) -> Result<Self, BotCheckError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| BotCheckError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            secret: Zeroizing::new(secret.to_string()),
            verify_url: verify_url.to_string(),
            min_score,
        })
    }
}

#[async_trait]
impl BotVerifier for RecaptchaVerifier {
    async fn verify(&self, token: Option<&str>, remote_ip: Option<&str>) -> Result<(), BotCheckError> {
        let token = token
            .map(str::trim)
            .filter(|t| !t.is_empty() && *t != NO_RECAPTCHA_TOKEN)
            .ok_or(BotCheckError::MissingToken)?;

        let mut params = vec![("secret", self.secret.as_str()), ("response", token)];
        if let Some(ip) = remote_ip {
            params.push(("remoteip", ip));
        }

        let response: SiteVerifyResponse = self.client
            .post(&self.verify_url)
            .form(&params)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| BotCheckError::Transport(e.to_string()))?
            .json()
            .await
            .map_err(|e| BotCheckError::Transport(e.to_string()))?;

        // v2 responses carry no score; `success` alone decides.
        let score_ok = response.score.is_none_or(|score| score >= self.min_score);

        if response.success && score_ok {
            Ok(())
        } else {
            tracing::info!(
                score = ?response.score,
                error_codes = ?response.error_codes,
                "reCAPTCHA rejected token"
            );
            Err(BotCheckError::Rejected)
        }
    }
}
