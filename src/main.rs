use axum::Router;
use channel_readiness::config::Config;
use channel_readiness::handlers::{self, AppState};
use channel_readiness::questionnaire::Questionnaire;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the application.
///
/// Initializes tracing, loads configuration and the questionnaire, builds the
/// lead store and starts the Axum server.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "channel_readiness=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    tracing::info!("Configuration loaded successfully");

    let questionnaire = match config.questionnaire_path {
        Some(ref path) => Questionnaire::from_file(path)?,
        None => Questionnaire::channel_readiness(),
    };
    tracing::info!(
        "Questionnaire '{}' ready: {} pillars, {} questions",
        questionnaire.title,
        questionnaire.pillars.len(),
        questionnaire.questions().count()
    );

    let port = config.port;
    let app_state = Arc::new(AppState::new(config, questionnaire));
    tracing::info!("Lead store at {}", app_state.store.path().display());

    // Configure rate limiter: 10 requests/second per IP, burst of 20
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(10)
            .burst_size(20)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .ok_or_else(|| anyhow::anyhow!("Invalid rate limiter configuration"))?,
    );

    let app: Router = handlers::router(app_state)
        .layer(
            ServiceBuilder::new()
                // Form posts are small; 64 KiB is plenty
                .layer(RequestBodyLimitLayer::new(64 * 1024))
                .layer(GovernorLayer {
                    config: governor_conf,
                }),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
