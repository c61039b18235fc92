use actix_web::{web, HttpRequest, HttpResponse, Responder};

use crate::{
    entities::contact::ContactForm,
    errors::AppError,
    use_cases::extractors::AdminToken,
    utils::get_client_ip::get_client_ip,
    AppState,
};

pub async fn create_contact(
    req: HttpRequest,
    state: web::Data<AppState>,
    form: web::Json<ContactForm>,
) -> Result<impl Responder, AppError> {
    let client_ip = get_client_ip(&req, state.trust_x_forwarded_for);

    state.throttles.contact.allow(&client_ip).map_err(|e| {
        tracing::info!(client_ip = %client_ip, "Contact form throttled");
        AppError::from(e)
    })?;

    let response = state.contact_handler
        .submit(form.into_inner(), &client_ip)
        .await?;

    Ok(HttpResponse::Created().json(response))
}

pub async fn list_contacts(
    _admin: AdminToken,
    state: web::Data<AppState>,
) -> Result<impl Responder, AppError> {
    let response = state.contact_handler.list_submissions().await?;

    Ok(HttpResponse::Ok().json(response))
}
