use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::validation::RawFields;

pub const NEWSLETTER_SOURCE: &str = "Website Newsletter Form";

#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewsletterForm {
    pub email: Option<String>,
    pub recaptcha_token: Option<String>,
}

impl NewsletterForm {
    pub fn to_fields(&self) -> RawFields {
        self.email
            .iter()
            .map(|email| ("email".to_string(), email.clone()))
            .collect()
    }
}

/// A completed one-time action, one per normalized identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubscriptionRecord {
    pub identity: String,
    pub recorded_at: DateTime<Utc>,
    pub source: String,
}

impl SubscriptionRecord {
    pub fn new(identity: &str, source: &str, recorded_at: DateTime<Utc>) -> Self {
        SubscriptionRecord {
            identity: normalize_identity(identity),
            recorded_at,
            source: source.to_string(),
        }
    }
}

pub fn normalize_identity(identity: &str) -> String {
    identity.trim().to_lowercase()
}

/// Same body whether the address was new or already subscribed.
#[derive(Debug, Serialize)]
pub struct NewsletterResponse {
    pub success: bool,
    pub message: String,
}

impl NewsletterResponse {
    pub fn subscribed() -> Self {
        NewsletterResponse {
            success: true,
            message: "Thank you for subscribing!".to_string(),
        }
    }
}
