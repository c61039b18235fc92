use actix_web::web;

use crate::handlers::contact;

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/contact")
            .route(web::post().to(contact::create_contact))
            .route(web::get().to(contact::list_contacts))
    );
}
