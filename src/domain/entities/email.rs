use chrono::{Datelike, Utc};
use serde::Serialize;

use crate::{
    entities::contact::ContactSubmission,
    utils::sanitize::{escape_html, line_breaks_to_html, unescape_html},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailContent {
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
}

/// Names printed in the email templates.
#[derive(Debug, Clone)]
pub struct Branding {
    pub company: String,
    pub newsletter: String,
    pub blog_url: String,
}

const ACCENT: &str = "#0d9488";

fn layout(branding: &Branding, title: &str, body: &str) -> String {
    format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
  <div style="background-color: {ACCENT}; padding: 20px; text-align: center;">
    <h1 style="color: white; margin: 0;">{title}</h1>
  </div>
  <div style="padding: 20px; background-color: #f9fafb; border: 1px solid #e5e7eb;">
{body}
  </div>
  <div style="text-align: center; padding: 10px; font-size: 12px; color: #6b7280;">
    <p>&copy; {year} {company}. All rights reserved.</p>
  </div>
</div>"#,
        year = Utc::now().year(),
        company = escape_html(&branding.company),
    )
}

/// Notification for the site owner. Submission values arrive escaped for
/// HTML; subject and text get them back in plain form.
pub fn contact_notification(
    branding: &Branding,
    owner: &str,
    submission: &ContactSubmission,
) -> EmailContent {
    let s = submission;
    let body = format!(
        r#"    <h2 style="color: {ACCENT};">Contact Details</h2>
    <p><strong>Name:</strong> {name}</p>
    <p><strong>Email:</strong> {email}</p>
    <h2 style="color: {ACCENT};">Project Information</h2>
    <p><strong>Type:</strong> {kind}</p>
    <p><strong>Priority:</strong> {priority}</p>
    <p><strong>Timeframe:</strong> {timeframe}</p>
    <p><strong>Scale:</strong> {scale}</p>
    <p><strong>Service:</strong> {service}</p>
    <h2 style="color: {ACCENT};">Project Scope</h2>
    <div style="background-color: #f3f4f6; padding: 15px; border-left: 4px solid {ACCENT};">
      <p>{scope}</p>
    </div>"#,
        name = escape_html(&s.full_name),
        email = escape_html(&s.email),
        kind = s.project_type,
        priority = s.priority,
        timeframe = s.implementation_timeframe.as_deref().unwrap_or("-"),
        scale = s.project_scale.as_deref().unwrap_or("-"),
        service = s.service.as_deref().map(escape_html).unwrap_or_else(|| "-".into()),
        scope = line_breaks_to_html(&s.project_scope),
    );

    let kind = unescape_html(&s.project_type);
    let priority = unescape_html(&s.priority);

    EmailContent {
        to: owner.to_string(),
        subject: format!("New Contact Form Submission: {} ({})", kind, priority),
        text: format!(
            "New project inquiry from {} ({})\n\nProject Type: {}\nPriority: {}\n\nProject Scope:\n{}\n",
            unescape_html(&s.full_name),
            s.email,
            kind,
            priority,
            unescape_html(&s.project_scope)
        ),
        html: layout(branding, "New Project Inquiry", &body),
        reply_to: Some(s.email.clone()),
    }
}

/// Confirmation sent back to whoever filled in the contact form.
pub fn contact_confirmation(branding: &Branding, submission: &ContactSubmission) -> EmailContent {
    let s = submission;
    let company = escape_html(&branding.company);
    let body = format!(
        r#"    <p>Dear {name},</p>
    <p>Thank you for reaching out to {company}! We have received your inquiry about <strong>{kind}</strong> services.</p>
    <p>Our team will review your request and get back to you shortly.</p>
    <div style="background-color: #f3f4f6; padding: 15px; border-left: 4px solid {ACCENT}; margin: 20px 0;">
      <h3 style="margin-top: 0; color: {ACCENT};">Project Details</h3>
      <p><strong>Project Type:</strong> {kind}</p>
      <p><strong>Priority:</strong> {priority}</p>
    </div>
    <p>We look forward to the possibility of working with you!</p>
    <p>Best regards,<br>The {company} Team</p>"#,
        name = escape_html(&s.full_name),
        kind = s.project_type,
        priority = s.priority,
    );
    let kind = unescape_html(&s.project_type);

    EmailContent {
        to: s.email.clone(),
        subject: format!("Thank you for contacting {}", branding.company),
        text: format!(
            "Dear {},\n\nThank you for reaching out to {}! We have received your inquiry about {} services.\n\n\
             Our team will review your request and get back to you shortly.\n\n\
             Project Details:\n- Project Type: {}\n- Priority: {}\n\nBest regards,\nThe {} Team\n",
            unescape_html(&s.full_name),
            branding.company,
            kind,
            kind,
            unescape_html(&s.priority),
            branding.company
        ),
        html: layout(branding, "Thank You for Contacting Us", &body),
        reply_to: None,
    }
}

pub fn newsletter_welcome(branding: &Branding, email: &str) -> EmailContent {
    let newsletter = escape_html(&branding.newsletter);
    let body = format!(
        r#"    <p>Thank you for subscribing to {newsletter}!</p>
    <p>You will now receive updates about our latest services, industry insights, and special offers.</p>
    <div style="text-align: center; margin: 30px 0;">
      <a href="{blog}" style="background-color: {ACCENT}; color: white; padding: 10px 20px; text-decoration: none; border-radius: 4px; font-weight: bold;">Check Out Our Blog</a>
    </div>
    <p style="font-size: 12px; color: #6b7280;">If you wish to unsubscribe at any time, use the unsubscribe link at the bottom of any {newsletter} email.</p>"#,
        blog = escape_html(&branding.blog_url),
    );

    EmailContent {
        to: email.to_string(),
        subject: format!("Welcome to {}!", branding.newsletter),
        text: format!(
            "Thank you for subscribing to {}!\n\nYou will now receive updates about our latest services, \
             industry insights, and special offers.\n\nBest regards,\nThe {} Team\n",
            branding.newsletter, branding.company
        ),
        html: layout(branding, &format!("Welcome to {}!", newsletter), &body),
        reply_to: None,
    }
}
