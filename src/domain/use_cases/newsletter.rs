use std::sync::Arc;

use crate::{
    clock::Clock,
    entities::{
        email::{newsletter_welcome, Branding},
        subscription::{NewsletterForm, NEWSLETTER_SOURCE},
    },
    errors::{AppError, GuardError},
    mail::Mailer,
    recaptcha::BotVerifier,
    repositories::subscription::SubscriptionStore,
    use_cases::{check_bot, guard::SubscriptionGuard},
    validation::{validate, NEWSLETTER_RULES},
};

/// What actually happened. Callers answer both the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscribeOutcome {
    Subscribed,
    AlreadySubscribed,
}

impl SubscribeOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscribeOutcome::Subscribed => "subscribed",
            SubscribeOutcome::AlreadySubscribed => "already_subscribed",
        }
    }
}

pub struct NewsletterHandler<S, M, V>
where
    S: SubscriptionStore,
    M: Mailer,
    V: BotVerifier,
{
    pub guard: SubscriptionGuard<S>,
    pub mailer: M,
    pub bot_verifier: V,
    pub branding: Branding,
}

impl<S, M, V> NewsletterHandler<S, M, V>
where
    S: SubscriptionStore,
    M: Mailer,
    V: BotVerifier,
{
    pub fn new(store: S, mailer: M, bot_verifier: V, branding: Branding, clock: Arc<dyn Clock>) -> Self {
        NewsletterHandler {
            guard: SubscriptionGuard::with_clock(store, clock),
            mailer,
            bot_verifier,
            branding,
        }
    }

    pub async fn subscribe(&self, form: NewsletterForm, client_ip: &str) -> Result<SubscribeOutcome, AppError> {
        let validated = validate(&form.to_fields(), &NEWSLETTER_RULES).into_result()?;
        let email = validated
            .get("email")
            .ok_or_else(|| AppError::InternalError("Validated newsletter form has no email".into()))?;

        check_bot(&self.bot_verifier, form.recaptcha_token.as_deref(), client_ip).await?;

        let outcome = match self.guard.register_if_new(email, NEWSLETTER_SOURCE).await {
            Ok(record) => {
                let welcome = newsletter_welcome(&self.branding, &record.identity);
                if let Err(e) = self.mailer.send(&welcome).await {
                    tracing::warn!(
                        "Newsletter subscription saved but confirmation email failed to send: {}",
                        e
                    );
                }
                SubscribeOutcome::Subscribed
            }
            Err(GuardError::AlreadyExists) => SubscribeOutcome::AlreadySubscribed,
            Err(e) => return Err(e.into()),
        };

        tracing::info!(outcome = outcome.as_str(), "Newsletter signup handled");
        Ok(outcome)
    }
}
