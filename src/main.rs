use actix_cors::Cors;
use actix_web::{http::header, middleware::NormalizePath, web, App, HttpServer};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::EnvFilter;
use leadcapture_backend::{
    background_task::start_sweep_task,
    db::postgres::create_pool,
    graceful_shutdown::shutdown_signal,
    routes::configure_routes,
    settings::AppConfig,
    shared_repos::SharedRepositories,
    AppState,
};

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    if config.is_production() {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn build_cors(config: &AppConfig) -> Cors {
    let origins = config.cors_origins();
    let cors = Cors::default()
        .allowed_methods(vec!["GET", "POST"])
        .allowed_headers(vec![header::CONTENT_TYPE, header::AUTHORIZATION])
        .max_age(3600);

    if origins.iter().any(|o| o == "*") {
        cors.allow_any_origin()
    } else {
        origins
            .iter()
            .fold(cors, |cors, origin| cors.allowed_origin(origin))
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = match AppConfig::new() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    init_tracing(&config);
    tracing::info!("Loaded configuration: {:?}", config);

    let repos = match &config.database_url {
        Some(url) => SharedRepositories::new(create_pool(url).await?),
        None => {
            tracing::warn!("DATABASE_URL not set, submissions are kept in memory only");
            SharedRepositories::in_memory()
        }
    };

    let app_state = web::Data::new(AppState::new(&config, repos)?);

    let server_addr = format!("{}:{}", config.host, config.port);

    tracing::info!(
        "Starting {} v{} on {}",
        config.name,
        env!("CARGO_PKG_VERSION"),
        server_addr
    );

    tokio::spawn(start_sweep_task(app_state.throttles.all()));

    let server_config = config.clone();
    let server = HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(build_cors(&server_config))
            .wrap(NormalizePath::trim())
            .wrap(TracingLogger::default())
            .configure(configure_routes)
    })
    .workers(config.worker_count)
    .bind(server_addr)?
    .run();

    tokio::select! {
        res = server => res?,
        _ = shutdown_signal() => {},
    }

    Ok(())
}
