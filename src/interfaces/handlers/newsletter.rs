use actix_web::{web, HttpRequest, HttpResponse, Responder};

use crate::{
    entities::subscription::{NewsletterForm, NewsletterResponse},
    errors::AppError,
    utils::get_client_ip::get_client_ip,
    AppState,
};

pub async fn subscribe(
    req: HttpRequest,
    state: web::Data<AppState>,
    form: web::Json<NewsletterForm>,
) -> Result<impl Responder, AppError> {
    let client_ip = get_client_ip(&req, state.trust_x_forwarded_for);

    state.throttles.newsletter.allow(&client_ip).map_err(|e| {
        tracing::info!(client_ip = %client_ip, "Newsletter signup throttled");
        AppError::from(e)
    })?;

    // Duplicates get the same answer so the endpoint can't be used to test which addresses are subscribed
    state.newsletter_handler
        .subscribe(form.into_inner(), &client_ip)
        .await?;

    Ok(HttpResponse::Ok().json(NewsletterResponse::subscribed()))
}
