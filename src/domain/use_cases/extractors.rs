use actix_web::{http::header::AUTHORIZATION, web, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};
use subtle::ConstantTimeEq;

use crate::{errors::AppError, AppState};

/// Extractor guarding admin-only endpoints with the configured static token.
/// Returns 403 when the token is missing, wrong, or no token is configured.
/// Usage: Add `_admin: AdminToken` as a parameter to your handler function.
#[derive(Debug)]
pub struct AdminToken;

impl FromRequest for AdminToken {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let expected = req
            .app_data::<web::Data<AppState>>()
            .and_then(|state| state.admin_token.as_deref());

        let presented = req
            .headers()
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::trim);

        let authorized = match (expected, presented) {
            (Some(expected), Some(presented)) => expected.as_bytes().ct_eq(presented.as_bytes()).into(),
            _ => false,
        };

        if authorized {
            ready(Ok(AdminToken))
        } else {
            tracing::warn!(path = %req.path(), "Rejected admin request");
            ready(Err(AppError::ForbiddenAccess.into()))
        }
    }
}
