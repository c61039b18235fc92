use actix_web::{
    error::{InternalError, JsonPayloadError},
    http::StatusCode,
    web, HttpRequest, HttpResponse,
};

/// Form submissions are small; anything bigger is not a real form post.
const MAX_FORM_BYTES: usize = 16 * 1024;

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .limit(MAX_FORM_BYTES)
            .error_handler(payload_error),
    );
}

fn payload_status(err: &JsonPayloadError) -> StatusCode {
    match err {
        JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
            StatusCode::PAYLOAD_TOO_LARGE
        }
        JsonPayloadError::ContentType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        _ => StatusCode::BAD_REQUEST,
    }
}

/// Rejected bodies answer in the same `{"error": ...}` shape as `AppError`.
fn payload_error(err: JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    tracing::debug!(path = %req.path(), "Rejected JSON body: {}", err);

    let response = HttpResponse::build(payload_status(&err)).json(serde_json::json!({
        "error": format!("JSON payload error: {}", err)
    }));
    InternalError::from_response(err, response).into()
}
