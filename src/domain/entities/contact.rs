use std::str::FromStr;

use chrono::{DateTime, Utc};
use derive_more::Display;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::validation::{RawFields, ValidatedSubmission};

/// Project inquiry as posted by the contact form.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactForm {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub project_type: Option<String>,
    pub priority: Option<String>,
    pub project_scope: Option<String>,
    pub implementation_timeframe: Option<String>,
    pub project_scale: Option<String>,
    pub service: Option<String>,
    pub recaptcha_token: Option<String>,
}

impl ContactForm {
    pub fn to_fields(&self) -> RawFields {
        [
            ("fullName", &self.full_name),
            ("email", &self.email),
            ("projectType", &self.project_type),
            ("priority", &self.priority),
            ("projectScope", &self.project_scope),
            ("implementationTimeframe", &self.implementation_timeframe),
            ("projectScale", &self.project_scale),
            ("service", &self.service),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.clone().map(|v| (name.to_string(), v)))
        .collect()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContactStatus {
    #[default]
    #[display("new")]
    New,
    #[display("in-progress")]
    InProgress,
    #[display("completed")]
    Completed,
}

impl FromStr for ContactStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(ContactStatus::New),
            "in-progress" => Ok(ContactStatus::InProgress),
            "completed" => Ok(ContactStatus::Completed),
            other => Err(format!("Invalid contact status: {}", other)),
        }
    }
}

/// Cleaned inquiry, ready to be stored.
#[derive(Debug, Clone)]
pub struct ContactInsert {
    pub full_name: String,
    pub email: String,
    pub project_type: String,
    pub priority: String,
    pub project_scope: String,
    pub implementation_timeframe: Option<String>,
    pub project_scale: Option<String>,
    pub service: Option<String>,
}

impl ContactInsert {
    /// Builds the insert from a submission that passed `CONTACT_RULES`.
    pub fn from_validated(submission: &ValidatedSubmission) -> Option<Self> {
        if !submission.valid {
            return None;
        }
        let owned = |field: &str| submission.get(field).map(str::to_string);

        Some(ContactInsert {
            full_name: owned("fullName")?,
            email: owned("email")?,
            project_type: owned("projectType")?,
            priority: owned("priority")?,
            project_scope: owned("projectScope")?,
            implementation_timeframe: owned("implementationTimeframe"),
            project_scale: owned("projectScale"),
            service: owned("service"),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactSubmission {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub project_type: String,
    pub priority: String,
    pub project_scope: String,
    pub implementation_timeframe: Option<String>,
    pub project_scale: Option<String>,
    pub service: Option<String>,
    pub status: ContactStatus,
    pub created_at: DateTime<Utc>,
}

impl ContactSubmission {
    pub fn new(insert: ContactInsert, created_at: DateTime<Utc>) -> Self {
        ContactSubmission {
            id: Uuid::new_v4(),
            full_name: insert.full_name,
            email: insert.email,
            project_type: insert.project_type,
            priority: insert.priority,
            project_scope: insert.project_scope,
            implementation_timeframe: insert.implementation_timeframe,
            project_scale: insert.project_scale,
            service: insert.service,
            status: ContactStatus::New,
            created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub message: String,
    pub id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct ContactListResponse {
    pub submissions: Vec<ContactSubmission>,
    pub total: i64,
}
