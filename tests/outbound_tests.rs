
use std::sync::Arc;

use leadcapture_backend::{
    clock::SystemClock,
    entities::{email::EmailContent, subscription::NewsletterForm},
    errors::{BotCheckError, MailError},
    mail::{HttpMailer, Mailer},
    recaptcha::{BotVerifier, RecaptchaVerifier},
    repositories::memory::InMemorySubscriptionStore,
    use_cases::newsletter::{NewsletterHandler, SubscribeOutcome},
};
use test_utils::{closed_port_url, RecordingMailer, StubUpstream};

fn verifier_for(stub: &StubUpstream) -> RecaptchaVerifier {
    RecaptchaVerifier::new("site-secret", &stub.url, 0.5).unwrap()
}

fn message() -> EmailContent {
    EmailContent {
        to: "reader@example.com".to_string(),
        subject: "Welcome".to_string(),
        text: "Hello".to_string(),
        html: "<p>Hello</p>".to_string(),
        reply_to: None,
    }
}

#[actix_rt::test]
async fn verifier_passes_high_score_and_forwards_token_and_ip() {
    let stub = StubUpstream::start(200, r#"{"success": true, "score": 0.9}"#);

    let result = verifier_for(&stub).verify(Some("client-token"), Some("10.0.0.1")).await;

    assert_eq!(result, Ok(()));
    let sent = &stub.requests()[0].body;
    assert!(sent.contains("secret=site-secret"));
    assert!(sent.contains("response=client-token"));
    assert!(sent.contains("remoteip=10.0.0.1"));
}

#[actix_rt::test]
async fn verifier_rejects_unsuccessful_response() {
    let stub = StubUpstream::start(
        200,
        r#"{"success": false, "error-codes": ["invalid-input-response"]}"#,
    );

    let result = verifier_for(&stub).verify(Some("forged"), None).await;

    assert_eq!(result, Err(BotCheckError::Rejected));
}

#[actix_rt::test]
async fn verifier_rejects_score_below_threshold() {
    let stub = StubUpstream::start(200, r#"{"success": true, "score": 0.3}"#);

    let result = verifier_for(&stub).verify(Some("token"), None).await;

    assert_eq!(result, Err(BotCheckError::Rejected));
}

#[actix_rt::test]
async fn verifier_accepts_scoreless_success() {
    let stub = StubUpstream::start(200, r#"{"success": true}"#);

    let result = verifier_for(&stub).verify(Some("v2-token"), None).await;

    assert_eq!(result, Ok(()));
}

#[actix_rt::test]
async fn verifier_reports_server_error_as_transport() {
    let stub = StubUpstream::start(500, r#"{"error": "boom"}"#);

    let result = verifier_for(&stub).verify(Some("token"), None).await;

    assert!(matches!(result, Err(BotCheckError::Transport(_))));
}

#[actix_rt::test]
async fn verifier_reports_unparsable_body_as_transport() {
    let stub = StubUpstream::start(200, "<html>maintenance</html>");

    let result = verifier_for(&stub).verify(Some("token"), None).await;

    assert!(matches!(result, Err(BotCheckError::Transport(_))));
}

#[actix_rt::test]
async fn signup_goes_through_when_verifier_is_down() {
    let stub = StubUpstream::start(503, "{}");
    let store = Arc::new(InMemorySubscriptionStore::new());
    let handler = NewsletterHandler::new(
        store.clone(),
        RecordingMailer::default(),
        verifier_for(&stub),
        test_utils::test_config().branding(),
        Arc::new(SystemClock),
    );

    let form = NewsletterForm {
        email: Some("reader@example.com".to_string()),
        recaptcha_token: Some("token".to_string()),
    };
    let outcome = handler.subscribe(form, "10.0.0.1").await.unwrap();

    assert_eq!(outcome, SubscribeOutcome::Subscribed);
    assert_eq!(store.len(), 1);
    assert_eq!(stub.requests().len(), 1);
}

#[actix_rt::test]
async fn mailer_posts_message_with_sender_and_key() {
    let stub = StubUpstream::start(202, r#"{"id": "msg_1"}"#);
    let mailer = HttpMailer::new(&stub.url, Some("relay-key"), "EvZone Tech", "no-reply@example.com").unwrap();

    mailer.send(&message()).await.unwrap();

    let requests = stub.requests();
    assert_eq!(requests[0].authorization.as_deref(), Some("Bearer relay-key"));

    let body: serde_json::Value = serde_json::from_str(&requests[0].body).unwrap();
    assert_eq!(body["from"], "\"EvZone Tech\" <no-reply@example.com>");
    assert_eq!(body["to"], "reader@example.com");
    assert_eq!(body["subject"], "Welcome");
    assert!(body.get("reply_to").is_none());
}

#[actix_rt::test]
async fn mailer_maps_error_status_to_rejected() {
    let stub = StubUpstream::start(422, r#"{"error": "invalid recipient"}"#);
    let mailer = HttpMailer::new(&stub.url, None, "EvZone Tech", "no-reply@example.com").unwrap();

    let result = mailer.send(&message()).await;

    assert_eq!(result, Err(MailError::Rejected(422)));
    assert_eq!(stub.requests()[0].authorization, None);
}

#[actix_rt::test]
async fn mailer_reports_unreachable_relay_as_transport() {
    let mailer = HttpMailer::new(&closed_port_url(), None, "EvZone Tech", "no-reply@example.com").unwrap();

    let result = mailer.send(&message()).await;

    assert!(matches!(result, Err(MailError::Transport(_))));
}
