use std::sync::Arc;

use crate::{
    clock::Clock,
    entities::{
        contact::{ContactForm, ContactInsert, ContactListResponse, ContactResponse, ContactSubmission},
        email::{contact_confirmation, contact_notification, Branding},
        subscription::normalize_identity,
    },
    errors::AppError,
    limiter::rate_limiter::RequestThrottle,
    mail::Mailer,
    recaptcha::BotVerifier,
    repositories::contact::ContactRepository,
    use_cases::check_bot,
    validation::{validate, CONTACT_RULES},
};

pub struct ContactHandler<R, M, V>
where
    R: ContactRepository,
    M: Mailer,
    V: BotVerifier,
{
    pub contact_repo: R,
    pub mailer: M,
    pub bot_verifier: V,
    /// Limits inquiries per sender address, independent of client IP
    pub email_throttle: Arc<RequestThrottle>,
    pub branding: Branding,
    pub owner_email: Option<String>,
    pub clock: Arc<dyn Clock>,
}

impl<R, M, V> ContactHandler<R, M, V>
where
    R: ContactRepository,
    M: Mailer,
    V: BotVerifier,
{
    pub fn new(
        contact_repo: R,
        mailer: M,
        bot_verifier: V,
        email_throttle: Arc<RequestThrottle>,
        branding: Branding,
        owner_email: Option<String>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        ContactHandler {
            contact_repo,
            mailer,
            bot_verifier,
            email_throttle,
            branding,
            owner_email,
            clock,
        }
    }

    /// Validates, stores and acknowledges a project inquiry.
    pub async fn submit(&self, form: ContactForm, client_ip: &str) -> Result<ContactResponse, AppError> {
        let validated = validate(&form.to_fields(), &CONTACT_RULES).into_result()?;
        let insert = ContactInsert::from_validated(&validated).ok_or_else(|| {
            AppError::InternalError("Validated contact submission is missing fields".into())
        })?;

        // URL-encode to keep the key free of separators
        let email_key = format!("email:{}", urlencoding::encode(&normalize_identity(&insert.email)));
        self.email_throttle.allow(&email_key)?;

        check_bot(&self.bot_verifier, form.recaptcha_token.as_deref(), client_ip).await?;

        let submission = ContactSubmission::new(insert, self.clock.utc_now());
        self.contact_repo.create_submission(&submission).await?;
        tracing::info!(id = %submission.id, "Contact submission stored");

        self.notify(&submission).await;

        Ok(ContactResponse {
            message: "Your message has been received.".to_string(),
            id: submission.id,
        })
    }

    async fn notify(&self, submission: &ContactSubmission) {
        if let Some(owner) = &self.owner_email {
            let email = contact_notification(&self.branding, owner, submission);
            if let Err(e) = self.mailer.send(&email).await {
                tracing::warn!(id = %submission.id, "Failed to send contact notification: {}", e);
            }
        }

        let email = contact_confirmation(&self.branding, submission);
        if let Err(e) = self.mailer.send(&email).await {
            tracing::warn!(id = %submission.id, "Failed to send contact confirmation: {}", e);
        }
    }

    /// Lists stored inquiries, newest first
    pub async fn list_submissions(&self) -> Result<ContactListResponse, AppError> {
        let submissions = self.contact_repo.list_submissions().await?;
        let total = self.contact_repo.count_submissions().await?;

        Ok(ContactListResponse {
            submissions,
            total,
        })
    }
}
