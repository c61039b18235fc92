
use std::{net::SocketAddr, sync::Arc, time::Duration};

use actix_web::{http::{header, StatusCode}, test, App};
use serde_json::{json, Value};

use leadcapture_backend::{clock::Clock, errors::BotCheckError, routes::configure_routes, settings::AppConfig};
use test_utils::{contact_payload, test_config, StubVerifier, TestContext, ADMIN_TOKEN};

fn peer(ip: &str) -> SocketAddr {
    format!("{}:40000", ip).parse().unwrap()
}

#[actix_rt::test]
async fn contact_submission_is_created() {
    let ctx = TestContext::new();
    let app = test::init_service(App::new().app_data(ctx.state.clone()).configure(configure_routes)).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/contact")
        .peer_addr(peer("10.0.0.1"))
        .set_json(contact_payload("ada@example.com"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Your message has been received.");
    assert!(body["id"].is_string());

    // Owner notification plus sender confirmation
    assert_eq!(
        ctx.mailer.recipients(),
        vec!["owner@example.com".to_string(), "ada@example.com".to_string()]
    );
}

#[actix_rt::test]
async fn invalid_contact_submission_lists_field_errors() {
    let ctx = TestContext::new();
    let app = test::init_service(App::new().app_data(ctx.state.clone()).configure(configure_routes)).await;

    let mut payload = contact_payload("not-an-email");
    payload["projectScope"] = json!("short");

    let req = test::TestRequest::post()
        .uri("/api/v1/contact")
        .peer_addr(peer("10.0.0.1"))
        .set_json(payload)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Validation failed");
    assert_eq!(
        body["details"],
        json!([
            {"field": "email", "message": "Invalid email address"},
            {"field": "projectScope", "message": "projectScope must be at least 10 characters"},
        ])
    );
    assert!(ctx.mailer.recipients().is_empty());
}

#[actix_rt::test]
async fn contact_is_throttled_per_ip_with_retry_after() {
    let ctx = TestContext::new();
    let app = test::init_service(App::new().app_data(ctx.state.clone()).configure(configure_routes)).await;

    for i in 0..3 {
        let req = test::TestRequest::post()
            .uri("/api/v1/contact")
            .peer_addr(peer("10.0.0.7"))
            .set_json(contact_payload(&format!("sender{}@example.com", i)))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);
    }

    let req = test::TestRequest::post()
        .uri("/api/v1/contact")
        .peer_addr(peer("10.0.0.7"))
        .set_json(contact_payload("sender9@example.com"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(resp.headers().get(header::RETRY_AFTER).unwrap(), "60");
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Too many requests, please try again later.");

    // Another client is unaffected
    let req = test::TestRequest::post()
        .uri("/api/v1/contact")
        .peer_addr(peer("10.0.0.8"))
        .set_json(contact_payload("other@example.com"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

    ctx.clock.advance(Duration::from_secs(60));
    let req = test::TestRequest::post()
        .uri("/api/v1/contact")
        .peer_addr(peer("10.0.0.7"))
        .set_json(contact_payload("sender9@example.com"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);
}

#[actix_rt::test]
async fn contact_is_throttled_per_sender_address() {
    let ctx = TestContext::new();
    let app = test::init_service(App::new().app_data(ctx.state.clone()).configure(configure_routes)).await;

    let statuses = {
        let mut statuses = Vec::new();
        for (i, email) in ["repeat@example.com", "Repeat@Example.com", "repeat@example.com"]
            .iter()
            .enumerate()
        {
            let req = test::TestRequest::post()
                .uri("/api/v1/contact")
                .peer_addr(peer(&format!("10.0.1.{}", i)))
                .set_json(contact_payload(email))
                .to_request();
            statuses.push(test::call_service(&app, req).await.status());
        }
        statuses
    };

    assert_eq!(
        statuses,
        vec![StatusCode::CREATED, StatusCode::CREATED, StatusCode::TOO_MANY_REQUESTS]
    );
}

#[actix_rt::test]
async fn forwarded_for_is_ignored_unless_trusted() {
    let ctx = TestContext::new();
    let app = test::init_service(App::new().app_data(ctx.state.clone()).configure(configure_routes)).await;

    for i in 0..6 {
        let req = test::TestRequest::post()
            .uri("/api/v1/newsletter")
            .peer_addr(peer("10.0.0.9"))
            .insert_header(("X-Forwarded-For", format!("203.0.113.{}", i)))
            .set_json(json!({"email": format!("reader{}@example.com", i)}))
            .to_request();
        let status = test::call_service(&app, req).await.status();

        let expected = if i < 5 { StatusCode::OK } else { StatusCode::TOO_MANY_REQUESTS };
        assert_eq!(status, expected);
    }
}

#[actix_rt::test]
async fn missing_captcha_token_is_rejected_when_verification_enabled() {
    let ctx = TestContext::with_verifier(Arc::new(StubVerifier(|| Ok(()))));
    let app = test::init_service(App::new().app_data(ctx.state.clone()).configure(configure_routes)).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/contact")
        .peer_addr(peer("10.0.0.1"))
        .set_json(contact_payload("ada@example.com"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "reCAPTCHA verification is required");

    let mut payload = contact_payload("ada@example.com");
    payload["recaptchaToken"] = json!("valid-token");
    let req = test::TestRequest::post()
        .uri("/api/v1/contact")
        .peer_addr(peer("10.0.0.1"))
        .set_json(payload)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);
}

#[actix_rt::test]
async fn failed_captcha_is_rejected() {
    let ctx = TestContext::with_verifier(Arc::new(StubVerifier(|| Err(BotCheckError::Rejected))));
    let app = test::init_service(App::new().app_data(ctx.state.clone()).configure(configure_routes)).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/newsletter")
        .peer_addr(peer("10.0.0.1"))
        .set_json(json!({"email": "bot@example.com", "recaptchaToken": "forged"}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "reCAPTCHA verification failed");
    assert!(ctx.subscriptions.is_empty());
}

#[actix_rt::test]
async fn duplicate_newsletter_signup_gets_same_answer() {
    let ctx = TestContext::new();
    let app = test::init_service(App::new().app_data(ctx.state.clone()).configure(configure_routes)).await;

    let mut bodies = Vec::new();
    for email in ["reader@example.com", "READER@example.com"] {
        let req = test::TestRequest::post()
            .uri("/api/v1/newsletter")
            .peer_addr(peer("10.0.0.1"))
            .set_json(json!({"email": email}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        bodies.push(test::read_body_json::<Value, _>(resp).await);
    }

    assert_eq!(bodies[0], bodies[1]);
    assert_eq!(bodies[0], json!({"success": true, "message": "Thank you for subscribing!"}));
    assert_eq!(ctx.subscriptions.len(), 1);
    assert_eq!(ctx.mailer.recipients(), vec!["reader@example.com".to_string()]);
}

#[actix_rt::test]
async fn invalid_newsletter_email_is_rejected() {
    let ctx = TestContext::new();
    let app = test::init_service(App::new().app_data(ctx.state.clone()).configure(configure_routes)).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/newsletter")
        .peer_addr(peer("10.0.0.1"))
        .set_json(json!({"email": "nope"}))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["details"][0]["message"], "Please provide a valid email address.");
}

#[actix_rt::test]
async fn listing_contacts_requires_admin_token() {
    let ctx = TestContext::new();
    let app = test::init_service(App::new().app_data(ctx.state.clone()).configure(configure_routes)).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/contact")
        .peer_addr(peer("10.0.0.1"))
        .set_json(contact_payload("ada@example.com"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

    let req = test::TestRequest::get().uri("/api/v1/contact").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::get()
        .uri("/api/v1/contact")
        .insert_header((header::AUTHORIZATION, "Bearer wrong-token"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::get()
        .uri("/api/v1/contact")
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", ADMIN_TOKEN)))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["submissions"][0]["email"], "ada@example.com");
    assert_eq!(body["submissions"][0]["status"], "new");
}

#[actix_rt::test]
async fn near_miss_admin_tokens_are_forbidden() {
    let ctx = TestContext::new();
    let app = test::init_service(App::new().app_data(ctx.state.clone()).configure(configure_routes)).await;

    let same_length = format!("{}x", &ADMIN_TOKEN[..ADMIN_TOKEN.len() - 1]);
    let prefix = &ADMIN_TOKEN[..ADMIN_TOKEN.len() / 2];
    let extended = format!("{}0", ADMIN_TOKEN);

    for token in [same_length.as_str(), prefix, extended.as_str(), ""] {
        let req = test::TestRequest::get()
            .uri("/api/v1/contact")
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::FORBIDDEN,
            "token {:?} should be refused",
            token
        );
    }
}

#[actix_rt::test]
async fn listing_is_closed_without_configured_admin_token() {
    let config = AppConfig {
        admin_token: None,
        ..test_config()
    };
    let ctx = TestContext::with_config(&config);
    let app = test::init_service(App::new().app_data(ctx.state.clone()).configure(configure_routes)).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/contact")
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", ADMIN_TOKEN)))
        .to_request();

    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);
}

#[actix_rt::test]
async fn stored_submission_is_stamped_by_app_clock() {
    let ctx = TestContext::new();
    ctx.clock.advance(Duration::from_secs(3600));
    let app = test::init_service(App::new().app_data(ctx.state.clone()).configure(configure_routes)).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/contact")
        .peer_addr(peer("10.0.0.1"))
        .set_json(contact_payload("ada@example.com"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

    let req = test::TestRequest::get()
        .uri("/api/v1/contact")
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", ADMIN_TOKEN)))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["submissions"][0]["createdAt"], json!(ctx.clock.utc_now()));
}

#[actix_rt::test]
async fn malformed_json_is_bad_request() {
    let ctx = TestContext::new();
    let app = test::init_service(App::new().app_data(ctx.state.clone()).configure(configure_routes)).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/contact")
        .peer_addr(peer("10.0.0.1"))
        .insert_header(header::ContentType::json())
        .set_payload("{\"fullName\": ")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().starts_with("JSON payload error"));
}

#[actix_rt::test]
async fn unknown_route_is_json_not_found() {
    let ctx = TestContext::new();
    let app = test::init_service(App::new().app_data(ctx.state.clone()).configure(configure_routes)).await;

    let req = test::TestRequest::get().uri("/api/v1/unknown").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Not found");
}

#[actix_rt::test]
async fn health_reports_store_status() {
    let ctx = TestContext::new();
    let app = test::init_service(App::new().app_data(ctx.state.clone()).configure(configure_routes)).await;

    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["subscription_store"], "OK");
}

#[actix_rt::test]
async fn health_report_is_cached_per_app_state() {
    let quiet = TestContext::new();
    let quiet_app = test::init_service(App::new().app_data(quiet.state.clone()).configure(configure_routes)).await;

    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let body: Value = test::call_and_read_body_json(&quiet_app, req).await;
    assert_eq!(body["throttled_identifiers"], 0);

    let busy = TestContext::new();
    busy.state.throttles.contact.allow("10.0.0.1").unwrap();
    busy.state.throttles.newsletter.allow("10.0.0.2").unwrap();
    let busy_app = test::init_service(App::new().app_data(busy.state.clone()).configure(configure_routes)).await;

    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let body: Value = test::call_and_read_body_json(&busy_app, req).await;
    assert_eq!(body["throttled_identifiers"], 2);

    // Reused until the cache window lapses.
    busy.state.throttles.contact.allow("10.0.0.3").unwrap();
    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let body: Value = test::call_and_read_body_json(&busy_app, req).await;
    assert_eq!(body["throttled_identifiers"], 2);
}

#[actix_rt::test]
async fn banner_reports_configured_limits() {
    let ctx = TestContext::new();
    let app = test::init_service(App::new().app_data(ctx.state.clone()).configure(configure_routes)).await;

    let req = test::TestRequest::get().uri("/").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "Ok");
    assert_eq!(body["limits"]["contactPerClient"], json!({"requests": 3, "windowSecs": 60}));
    assert_eq!(body["limits"]["contactPerEmail"], json!({"requests": 2, "windowSecs": 3600}));
    assert_eq!(body["limits"]["newsletterPerClient"], json!({"requests": 5, "windowSecs": 60}));
}
