//! Rule-driven validation of submitted form fields.
//!
//! Fields are checked in the order their rules were declared, so the error
//! list is reproducible. Malformed input never panics; it shows up as a
//! [`FieldError`] in the returned [`ValidatedSubmission`].

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::{errors::{AppError, FieldError}, utils::sanitize::escape_html};

/// Raw field values as submitted, keyed by field name.
pub type RawFields = BTreeMap<String, String>;

pub const EMAIL_PATTERN: &str = r"[^\s@]+@[^\s@]+\.[^\s@]+";
pub const PERSON_NAME_PATTERN: &str = r"[a-zA-Z '-]+";
/// Values that end up in mail headers must stay on one line.
pub const SINGLE_LINE_PATTERN: &str = r"[^\r\n]+";

pub const SERVICES: [&str; 9] = [
    "Web Development",
    "Mobile App Development",
    "E-commerce Solutions",
    "SaaS Development",
    "UI/UX Design",
    "Digital Marketing",
    "QA & Testing",
    "Consultation",
    "Other",
];

#[derive(Debug, Clone, Default)]
pub struct FieldRule {
    pub required: bool,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<Regex>,
    pub sanitize: bool,
    /// Overrides the generated message for any failure on this field
    pub message: Option<String>,
}

impl FieldRule {
    pub fn required() -> Self {
        Self { required: true, ..Self::default() }
    }

    pub fn optional() -> Self {
        Self::default()
    }

    pub fn min_length(mut self, min: usize) -> Self {
        self.min_length = Some(min);
        self
    }

    pub fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    /// The value must match `pattern` as a whole, not just contain a match.
    pub fn pattern(mut self, pattern: &str) -> Result<Self, regex::Error> {
        self.pattern = Some(Regex::new(&format!(r"\A(?:{})\z", pattern))?);
        Ok(self)
    }

    pub fn sanitize(mut self) -> Self {
        self.sanitize = true;
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    fn error(&self, field: &str, fallback: String) -> FieldError {
        FieldError {
            field: field.to_string(),
            message: self.message.clone().unwrap_or(fallback),
        }
    }

    fn check(&self, field: &str, value: Option<&str>) -> Result<Option<String>, FieldError> {
        let trimmed = value.map(str::trim).unwrap_or("");

        if trimmed.is_empty() {
            return if self.required {
                Err(self.error(field, format!("{} is required", field)))
            } else {
                Ok(None)
            };
        }

        let length = trimmed.chars().count();
        if let Some(min) = self.min_length {
            if length < min {
                return Err(self.error(field, format!("{} must be at least {} characters", field, min)));
            }
        }
        if let Some(max) = self.max_length {
            if length > max {
                return Err(self.error(field, format!("{} must be no more than {} characters", field, max)));
            }
        }

        if let Some(pattern) = &self.pattern {
            if !pattern.is_match(trimmed) {
                return Err(self.error(field, format!("{} is invalid", field)));
            }
        }

        let cleaned = if self.sanitize {
            escape_html(trimmed)
        } else {
            trimmed.to_string()
        };
        Ok(Some(cleaned))
    }
}

/// Ordered set of field rules.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<(String, FieldRule)>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: impl Into<String>, rule: FieldRule) -> Self {
        self.rules.push((name.into(), rule));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldRule)> {
        self.rules.iter().map(|(name, rule)| (name.as_str(), rule))
    }
}

#[derive(Debug, Clone, Default)]
pub struct ValidatedSubmission {
    pub fields: BTreeMap<String, String>,
    pub valid: bool,
    pub field_errors: Vec<FieldError>,
}

impl ValidatedSubmission {
    /// Cleaned value of a field that passed validation and was not blank.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn error_for(&self, field: &str) -> Option<&str> {
        self.field_errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    pub fn into_result(self) -> Result<Self, AppError> {
        if self.valid {
            Ok(self)
        } else {
            Err(AppError::ValidationError(self.field_errors))
        }
    }
}

/// Validates `raw` against `rules`. Fields without a rule are dropped.
pub fn validate(raw: &RawFields, rules: &RuleSet) -> ValidatedSubmission {
    let mut submission = ValidatedSubmission::default();

    for (name, rule) in rules.iter() {
        match rule.check(name, raw.get(name).map(String::as_str)) {
            Ok(Some(cleaned)) => {
                submission.fields.insert(name.to_string(), cleaned);
            }
            Ok(None) => {}
            Err(error) => submission.field_errors.push(error),
        }
    }

    submission.valid = submission.field_errors.is_empty();
    submission
}

fn service_pattern() -> String {
    SERVICES
        .iter()
        .map(|s| regex::escape(s))
        .collect::<Vec<_>>()
        .join("|")
}

fn single_line(rule: FieldRule) -> FieldRule {
    rule.pattern(SINGLE_LINE_PATTERN)
        .expect("static single-line pattern")
        .sanitize()
}

pub static CONTACT_RULES: Lazy<RuleSet> = Lazy::new(|| {
    RuleSet::new()
        .field(
            "fullName",
            FieldRule::required()
                .min_length(2)
                .max_length(100)
                .pattern(PERSON_NAME_PATTERN)
                .expect("static name pattern"),
        )
        .field(
            "email",
            FieldRule::required()
                .max_length(254)
                .pattern(EMAIL_PATTERN)
                .expect("static email pattern")
                .message("Invalid email address"),
        )
        .field("projectType", single_line(FieldRule::required().max_length(100)))
        .field("priority", single_line(FieldRule::required().max_length(50)))
        .field(
            "projectScope",
            FieldRule::required().min_length(10).max_length(1000).sanitize(),
        )
        .field("implementationTimeframe", single_line(FieldRule::optional().max_length(100)))
        .field("projectScale", single_line(FieldRule::optional().max_length(100)))
        .field(
            "service",
            FieldRule::optional()
                .pattern(&service_pattern())
                .expect("static service pattern")
                .message("Unknown service"),
        )
});

pub static NEWSLETTER_RULES: Lazy<RuleSet> = Lazy::new(|| {
    RuleSet::new().field(
        "email",
        FieldRule::required()
            .max_length(254)
            .pattern(EMAIL_PATTERN)
            .expect("static email pattern")
            .message("Please provide a valid email address."),
    )
});
