use std::sync::Arc;

mod domain;
mod interfaces;
mod infrastructure;
pub mod errors;
pub mod settings;
pub mod constants;
pub mod graceful_shutdown;
pub mod background_task;
pub mod shared_repos;

pub use domain::{entities, use_cases, validation};
pub use interfaces::{handlers, repositories, routes};
pub use infrastructure::{clock, db, limiter, mail, recaptcha, utils};

use clock::{Clock, SystemClock};
use handlers::system::HealthCache;
use limiter::rate_limiter::RequestThrottle;
use mail::{HttpMailer, LogMailer, Mailer};
use recaptcha::{BotVerifier, DisabledVerifier, RecaptchaVerifier};
use shared_repos::{SharedContactRepo, SharedRepositories, SharedSubscriptionStore};
use use_cases::{contact::ContactHandler, newsletter::NewsletterHandler};

pub type SharedMailer = Arc<dyn Mailer>;
pub type SharedBotVerifier = Arc<dyn BotVerifier>;
pub type AppContactHandler = ContactHandler<SharedContactRepo, SharedMailer, SharedBotVerifier>;
pub type AppNewsletterHandler = NewsletterHandler<SharedSubscriptionStore, SharedMailer, SharedBotVerifier>;

/// Per-endpoint throttles. Each keeps its own counts.
#[derive(Clone)]
pub struct Throttles {
    pub contact: Arc<RequestThrottle>,
    pub newsletter: Arc<RequestThrottle>,
    pub contact_email: Arc<RequestThrottle>,
}

impl Throttles {
    pub fn from_config(config: &settings::AppConfig, clock: Arc<dyn Clock>) -> Self {
        let build = |window, limit| {
            Arc::new(
                RequestThrottle::with_clock(window, limit, clock.clone())
                    .max_tracked_identifiers(config.max_tracked_identifiers),
            )
        };

        Throttles {
            contact: build(config.rate_limit_window(), config.contact_rate_limit),
            newsletter: build(config.rate_limit_window(), config.newsletter_rate_limit),
            contact_email: build(config.contact_email_window(), config.contact_email_limit),
        }
    }

    pub fn all(&self) -> Vec<Arc<RequestThrottle>> {
        vec![
            self.contact.clone(),
            self.newsletter.clone(),
            self.contact_email.clone(),
        ]
    }

    pub fn tracked_identifiers(&self) -> usize {
        self.all().iter().map(|t| t.tracked_identifiers()).sum()
    }
}

pub struct AppState {
    pub contact_handler: AppContactHandler,
    pub newsletter_handler: AppNewsletterHandler,
    pub throttles: Throttles,
    pub repos: SharedRepositories,
    pub trust_x_forwarded_for: bool,
    pub admin_token: Option<String>,
    pub health_cache: HealthCache,
}

impl AppState {
    /// Wires mail delivery and bot verification from the configuration.
    pub fn new(config: &settings::AppConfig, repos: SharedRepositories) -> anyhow::Result<Self> {
        let mailer: SharedMailer = match &config.mail_api_url {
            Some(url) => Arc::new(
                HttpMailer::new(
                    url,
                    config.mail_api_key.as_deref(),
                    &config.mail_from_name,
                    &config.mail_from_address,
                )
                .map_err(|e| anyhow::anyhow!(e.to_string()))?,
            ),
            None => {
                tracing::warn!("MAIL_API_URL not set, emails will only be logged");
                Arc::new(LogMailer)
            }
        };

        let bot_verifier: SharedBotVerifier = match &config.recaptcha_secret {
            Some(secret) => Arc::new(
                RecaptchaVerifier::new(secret, &config.recaptcha_verify_url, config.recaptcha_min_score)
                    .map_err(|e| anyhow::anyhow!(e.to_string()))?,
            ),
            None => {
                tracing::warn!("RECAPTCHA_SECRET not set, bot verification is disabled");
                Arc::new(DisabledVerifier)
            }
        };

        Ok(Self::with_services(config, repos, mailer, bot_verifier, Arc::new(SystemClock)))
    }

    pub fn with_services(
        config: &settings::AppConfig,
        repos: SharedRepositories,
        mailer: SharedMailer,
        bot_verifier: SharedBotVerifier,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let throttles = Throttles::from_config(config, clock.clone());
        let branding = config.branding();

        let contact_handler = ContactHandler::new(
            repos.contact_repo.clone(),
            mailer.clone(),
            bot_verifier.clone(),
            throttles.contact_email.clone(),
            branding.clone(),
            config.owner_email.clone(),
            clock.clone(),
        );
        let newsletter_handler = NewsletterHandler::new(
            repos.subscription_store.clone(),
            mailer,
            bot_verifier,
            branding,
            clock,
        );

        AppState {
            contact_handler,
            newsletter_handler,
            throttles,
            repos,
            trust_x_forwarded_for: config.trust_x_forwarded_for,
            admin_token: config.admin_token.clone(),
            health_cache: HealthCache::default(),
        }
    }
}
