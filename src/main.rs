use actix_web::{App, HttpServer, web};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod app;
mod model;
mod service;

use app::AppState;
use model::Config;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present (ignore if missing)
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Configuration problems are fatal before the server binds
    let (config, state) = match Config::from_env()
        .and_then(|config| AppState::new(&config).map(|state| (config, state)))
    {
        Ok(loaded) => loaded,
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            std::process::exit(1);
        }
    };
    let bind_addr = config.bind_addr();

    let analysis_service = web::Data::from(state.analysis_service);

    tracing::info!("Starting ContractRiskAI server on {}", bind_addr);

    HttpServer::new(move || {
        App::new()
            .wrap(api::cors_headers())
            .app_data(analysis_service.clone())
            .configure(api::configure)
    })
    .bind(&bind_addr)?
    .run()
    .await
}
