use actix_web::web;

use crate::handlers::newsletter;

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/newsletter")
            .route(web::post().to(newsletter::subscribe))
    );
}
