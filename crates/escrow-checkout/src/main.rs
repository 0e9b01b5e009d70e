use actix_web::{middleware::Logger, web, App, HttpServer};
use escrow_pay::EscrowPayClient;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use escrow_checkout::{config::CheckoutConfig, metrics::register_metrics, routes, state::AppState};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = CheckoutConfig::from_env().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e)
    })?;
    let port = config.port;

    tracing::info!("Starting escrow-checkout on port {}", port);
    tracing::info!("Escrow environment: {} ({})", config.environment, config.api_url);
    tracing::info!("Allowed storefront hosts: {:?}", config.allowed_origin_hosts);
    tracing::info!("Party policy: {:?}", config.party_policy);

    if let Err(e) = register_metrics() {
        tracing::warn!("Failed to register metrics: {}", e);
    }

    let state = AppState::new(config).map_err(|e| {
        tracing::error!("Failed to build Escrow client: {}", e);
        std::io::Error::other(e)
    })?;
    let state_data = web::Data::new(state);

    HttpServer::new(move || {
        App::new()
            .app_data(state_data.clone())
            .wrap(Logger::default())
            .configure(routes::configure::<EscrowPayClient>)
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
