use actix_web::{get, web, HttpResponse, Responder};
use serde_json::json;

use crate::{limiter::rate_limiter::RequestThrottle, AppState};

fn limit_summary(throttle: &RequestThrottle) -> serde_json::Value {
    json!({
        "requests": throttle.limit(),
        "windowSecs": throttle.interval().as_secs(),
    })
}

#[get("/")]
pub async fn home(state: web::Data<AppState>) -> impl Responder {
    let throttles = &state.throttles;

    HttpResponse::Ok().json(json!({
        "message": "Lead capture API for the marketing site",
        "status": "Ok",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": ["/api/v1/contact", "/api/v1/newsletter", "/api/v1/health"],
        "limits": {
            "contactPerClient": limit_summary(&throttles.contact),
            "contactPerEmail": limit_summary(&throttles.contact_email),
            "newsletterPerClient": limit_summary(&throttles.newsletter),
        }
    }))
}

/// Fallback for unmatched paths.
pub async fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(json!({
        "error": "Not found",
        "details": "No route matches this path"
    }))
}
