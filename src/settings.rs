use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use dotenv::dotenv;
use std::{env, fmt, str::FromStr, time::Duration};

use crate::entities::email::Branding;

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum AppEnvironment {
    Development,
    Production,
    Testing,
}

impl FromStr for AppEnvironment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" => Ok(AppEnvironment::Development),
            "production" => Ok(AppEnvironment::Production),
            "testing" => Ok(AppEnvironment::Testing),
            _ => Err(ConfigError::Message(format!("Invalid environment: {}", s))),
        }
    }
}

#[derive(Deserialize, Clone)]
#[serde(rename_all = "snake_case")]
pub struct AppConfig {
    /// Set from `APP_ENV` after loading, so any casing is accepted.
    #[serde(skip_deserializing, default = "default_env")]
    pub env: AppEnvironment,

    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_worker_count")]
    pub worker_count: usize,

    #[serde(default)]
    pub database_url: Option<String>,

    #[serde(default = "default_cors_origins")]
    pub cors_allowed_origins: Vec<String>,

    #[serde(default)]
    pub trust_x_forwarded_for: bool,

    #[serde(default = "default_rate_limit_window")]
    pub rate_limit_window_secs: u64,

    #[serde(default = "default_contact_limit")]
    pub contact_rate_limit: u32,

    #[serde(default = "default_newsletter_limit")]
    pub newsletter_rate_limit: u32,

    #[serde(default = "default_contact_email_limit")]
    pub contact_email_limit: u32,

    #[serde(default = "default_contact_email_window")]
    pub contact_email_window_secs: u64,

    #[serde(default = "default_max_tracked")]
    pub max_tracked_identifiers: usize,

    #[serde(default)]
    pub recaptcha_secret: Option<String>,

    #[serde(default = "default_recaptcha_url")]
    pub recaptcha_verify_url: String,

    #[serde(default = "default_recaptcha_min_score")]
    pub recaptcha_min_score: f64,

    #[serde(default)]
    pub mail_api_url: Option<String>,

    #[serde(default)]
    pub mail_api_key: Option<String>,

    #[serde(default = "default_mail_from")]
    pub mail_from_address: String,

    #[serde(default = "default_company")]
    pub mail_from_name: String,

    /// Receives a copy of every contact inquiry
    #[serde(default)]
    pub owner_email: Option<String>,

    #[serde(default)]
    pub admin_token: Option<String>,

    #[serde(default = "default_company")]
    pub company_name: String,

    #[serde(default = "default_newsletter_name")]
    pub newsletter_name: String,

    #[serde(default = "default_blog_url")]
    pub blog_url: String,
}

fn default_env() -> AppEnvironment {
    AppEnvironment::Development
}
fn default_name() -> String {
    "LeadCapture-API".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_worker_count() -> usize {
    num_cpus::get()
}
fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}
fn default_rate_limit_window() -> u64 {
    60
}
fn default_contact_limit() -> u32 {
    3
}
fn default_newsletter_limit() -> u32 {
    5
}
fn default_contact_email_limit() -> u32 {
    2
}
fn default_contact_email_window() -> u64 {
    60 * 60
}
fn default_max_tracked() -> usize {
    10_000
}
fn default_recaptcha_url() -> String {
    "https://www.google.com/recaptcha/api/siteverify".to_string()
}
fn default_recaptcha_min_score() -> f64 {
    0.5
}
fn default_mail_from() -> String {
    "no-reply@localhost".to_string()
}
fn default_company() -> String {
    "EvZone Tech".to_string()
}
fn default_newsletter_name() -> String {
    "Evzone Pulse".to_string()
}
fn default_blog_url() -> String {
    "https://evzonetech.com/blog".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            env: default_env(),
            name: default_name(),
            port: default_port(),
            host: default_host(),
            worker_count: default_worker_count(),
            database_url: None,
            cors_allowed_origins: default_cors_origins(),
            trust_x_forwarded_for: false,
            rate_limit_window_secs: default_rate_limit_window(),
            contact_rate_limit: default_contact_limit(),
            newsletter_rate_limit: default_newsletter_limit(),
            contact_email_limit: default_contact_email_limit(),
            contact_email_window_secs: default_contact_email_window(),
            max_tracked_identifiers: default_max_tracked(),
            recaptcha_secret: None,
            recaptcha_verify_url: default_recaptcha_url(),
            recaptcha_min_score: default_recaptcha_min_score(),
            mail_api_url: None,
            mail_api_key: None,
            mail_from_address: default_mail_from(),
            mail_from_name: default_company(),
            owner_email: None,
            admin_token: None,
            company_name: default_company(),
            newsletter_name: default_newsletter_name(),
            blog_url: default_blog_url(),
        }
    }
}

impl AppConfig {
    pub fn new() -> Result<Self, ConfigError> {
        dotenv().ok();

        let raw_env = env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        Self::load(&raw_env, Self::environment_source())
    }

    /// `APP_`-prefixed variables, `__` for nesting and commas for lists.
    pub fn environment_source() -> Environment {
        Environment::with_prefix("APP")
            .prefix_separator("_")
            .separator("__")
            .list_separator(",")
            .with_list_parse_key("cors_allowed_origins")
            .try_parsing(true)
            .ignore_empty(true)
    }

    /// Layers `config/default`, `config/{env}` and `env_source`, then
    /// validates the result for the named environment.
    pub fn load(raw_env: &str, env_source: Environment) -> Result<Self, ConfigError> {
        let env_name = AppEnvironment::from_str(raw_env)
            .map_err(|_| ConfigError::Message(format!("Invalid APP_ENV value: {}", raw_env)))?;

        let builder = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env_name)).required(false))
            .add_source(env_source);

        let mut config: Self = builder.build()?.try_deserialize()?;

        config.env = env_name;

        // Empty strings from the environment mean "not configured"
        for value in [
            &mut config.database_url,
            &mut config.recaptcha_secret,
            &mut config.mail_api_url,
            &mut config.mail_api_key,
            &mut config.owner_email,
            &mut config.admin_token,
        ] {
            if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
                *value = None;
            }
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.is_production() && self.database_url.is_none() {
            errors.push("DATABASE_URL must be set in production".to_string());
        }
        if self.is_production() && self.cors_origins().iter().any(|o| o == "*") {
            errors.push("Wildcard CORS (*) is not allowed in production".to_string());
        }
        if self.rate_limit_window_secs == 0 || self.contact_email_window_secs == 0 {
            errors.push("Rate limit windows must be at least one second".to_string());
        }
        if self.contact_rate_limit == 0 || self.newsletter_rate_limit == 0 || self.contact_email_limit == 0 {
            errors.push("Rate limits must allow at least one request".to_string());
        }
        if !(0.0..=1.0).contains(&self.recaptcha_min_score) {
            errors.push("RECAPTCHA_MIN_SCORE must be between 0 and 1".to_string());
        }
        if let Err(e) = url::Url::parse(&self.recaptcha_verify_url) {
            errors.push(format!("RECAPTCHA_VERIFY_URL is invalid: {}", e));
        }
        if let Some(mail_url) = &self.mail_api_url {
            if let Err(e) = url::Url::parse(mail_url) {
                errors.push(format!("MAIL_API_URL is invalid: {}", e));
            }
        }
        if let Some(token) = &self.admin_token {
            if token.len() < 32 {
                errors.push("ADMIN_TOKEN must be at least 32 characters".to_string());
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Message(errors.join(", ")))
        }
    }

    pub fn is_production(&self) -> bool {
        self.env == AppEnvironment::Production
    }

    pub fn cors_origins(&self) -> Vec<String> {
        self.cors_allowed_origins
            .iter()
            .flat_map(|origin| origin.split(','))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_secs)
    }

    pub fn contact_email_window(&self) -> Duration {
        Duration::from_secs(self.contact_email_window_secs)
    }

    pub fn branding(&self) -> Branding {
        Branding {
            company: self.company_name.clone(),
            newsletter: self.newsletter_name.clone(),
            blog_url: self.blog_url.clone(),
        }
    }
}

impl fmt::Display for AppEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AppEnvironment::Development => "development",
            AppEnvironment::Production => "production",
            AppEnvironment::Testing => "testing",
        };
        write!(f, "{s}")
    }
}

trait Redact {
    fn redact(&self) -> &str;
}

impl Redact for Option<String> {
    fn redact(&self) -> &str {
        match self.as_deref() {
            None => "[NOT SET]",
            Some(_) => "[REDACTED]",
        }
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("name", &self.name)
            .field("port", &self.port)
            .field("host", &self.host)
            .field("worker_count", &self.worker_count)
            .field("database_url", &self.database_url.redact())
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("trust_x_forwarded_for", &self.trust_x_forwarded_for)
            .field("rate_limit_window_secs", &self.rate_limit_window_secs)
            .field("contact_rate_limit", &self.contact_rate_limit)
            .field("newsletter_rate_limit", &self.newsletter_rate_limit)
            .field("contact_email_limit", &self.contact_email_limit)
            .field("contact_email_window_secs", &self.contact_email_window_secs)
            .field("max_tracked_identifiers", &self.max_tracked_identifiers)
            .field("recaptcha_secret", &self.recaptcha_secret.redact())
            .field("recaptcha_min_score", &self.recaptcha_min_score)
            .field("mail_api_url", &self.mail_api_url)
            .field("mail_api_key", &self.mail_api_key.redact())
            .field("mail_from_address", &self.mail_from_address)
            .field("owner_email", &self.owner_email)
            .field("admin_token", &self.admin_token.redact())
            .field("company_name", &self.company_name)
            .finish()
    }
}
