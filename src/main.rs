use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use log::{error, info};

use video_vault::app_state::AppState;
use video_vault::config::AppConfig;
use video_vault::logging::init_logging;
use video_vault::service;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let (config, source) = AppConfig::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
    })?;
    init_logging(&config.logging);
    source.log();

    let app_state = AppState::from_config(config.clone()).map_err(|e| {
        error!("Failed to open upload directory {}: {}", config.storage.upload_dir, e);
        e
    })?;
    info!("Upload directory: {}", app_state.store.root().display());
    info!("Starting server on {}:{}", config.server.host, config.server.port);

    let data = web::Data::new(app_state);
    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .wrap(middleware::Logger::default())
            .app_data(data.clone())
            .configure(service::configure)
    })
    .workers(config.server.workers)
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
