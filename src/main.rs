//! CodeArena - Application Entry Point

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, middleware as axum_middleware};
use redis::Client as RedisClient;
use tokio::net::TcpListener;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use codearena::{
    clients::{AnalysisClient, ExecutionClient, SmtpMailer},
    config::Config,
    db,
    handlers,
    jobs::SweepScheduler,
    middleware::{logging_middleware, rate_limit_middleware, request_id_middleware},
    services::{AuthService, ContestService, NotificationService, SubmissionService, UserService},
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.server.rust_log.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting CodeArena server...");

    // Initialize database connection pool
    tracing::info!("Connecting to database...");
    let db_pool = db::create_pool(&config.database).await?;

    // Run database migrations
    tracing::info!("Running database migrations...");
    db::run_migrations(&db_pool).await?;

    // Initialize Redis connection
    tracing::info!("Connecting to Redis...");
    let redis_client = RedisClient::open(config.redis.url.as_str())?;
    let redis_conn = redis::aio::ConnectionManager::new(redis_client).await?;

    // Collaborator clients
    let mailer = Arc::new(SmtpMailer::new(&config.email)?);
    let executor = ExecutionClient::new(&config.collaborators)?;
    let analysis = AnalysisClient::new(&config.collaborators)?;

    // Services, built once and shared through the state
    let auth = AuthService::new(db_pool.clone(), config.jwt.clone(), mailer.clone());
    let users = UserService::new(db_pool.clone());
    let notifications = NotificationService::new(db_pool.clone(), mailer);
    let contests = ContestService::new(db_pool.clone(), notifications.clone());
    let submissions = SubmissionService::new(db_pool.clone(), executor);

    let state = AppState::new(
        db_pool.clone(),
        redis_conn,
        config.clone(),
        auth,
        users,
        contests,
        submissions,
        notifications,
        analysis,
    );

    // Start the expiry sweep
    let mut sweeper = SweepScheduler::start(&config.schedules, db_pool).await?;

    // Build the router
    let app = Router::new()
        .nest("/api/v1", handlers::routes(state.clone()))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .layer(axum_middleware::from_fn(logging_middleware))
        .layer(axum_middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(build_cors_layer(&config))
        .with_state(state);

    // Start the server
    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);
    let listener = TcpListener::bind(addr).await?;

    tracing::info!("Server listening on http://{}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Shutting down...");
    sweeper.shutdown().await?;

    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install Ctrl+C handler");
}

/// CORS from configured origins; an empty list allows any origin
fn build_cors_layer(config: &Config) -> CorsLayer {
    if config.cors.allowed_origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let origins: Vec<_> = config
        .cors
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}
