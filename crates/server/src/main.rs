//! Launchdesk server entry point.

use std::sync::Arc;
use std::time::Duration;

use axum::{Router, http::HeaderValue, middleware};
use launchdesk_api::{AppState, auth_middleware, router as api_router};
use launchdesk_common::Config;
use launchdesk_core::{
    AuthService, InviteService, MailerService, SubmissionService, UserAdminService,
};
use launchdesk_db::repositories::{
    InviteCodeRepository, SessionRepository, SubmissionRepository, UserRepository,
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

/// Periodically flip overdue `sent` invites to `expired`.
fn spawn_invite_sweep(invite_service: InviteService, interval_minutes: u64) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_minutes * 60));
        loop {
            ticker.tick().await;
            match invite_service.expire_overdue().await {
                Ok(0) => {}
                Ok(n) => info!(count = n, "Expired overdue invites"),
                Err(e) => warn!(error = %e, "Invite expiry sweep failed"),
            }
        }
    });
}

fn cors_layer(cors_origin: Option<&str>) -> Result<CorsLayer, Box<dyn std::error::Error>> {
    use axum::http::{Method, header};

    let layer = match cors_origin {
        Some(origin) => CorsLayer::new()
            .allow_origin(origin.parse::<HeaderValue>()?)
            .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
            .allow_credentials(true),
        None => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    };
    Ok(layer)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "launchdesk=debug,tower_http=debug".into()),
        )
        .init();

    dotenvy::dotenv().ok();

    info!("Starting launchdesk server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database and run migrations
    let db = launchdesk_db::init(&config).await?;
    info!("Connected to database");

    info!("Running database migrations...");
    launchdesk_db::migrate(&db).await?;
    info!("Migrations completed");

    // Initialize repositories
    let db = Arc::new(db);
    let user_repo = UserRepository::new(Arc::clone(&db));
    let session_repo = SessionRepository::new(Arc::clone(&db));
    let submission_repo = SubmissionRepository::new(Arc::clone(&db));
    let invite_repo = InviteCodeRepository::new(Arc::clone(&db));

    // Initialize services
    let mailer = MailerService::new(config.mail.as_ref(), &config.server.url)?;
    if mailer.is_enabled() {
        info!("SMTP mailer configured");
    } else {
        info!("No mail configuration; invite emails disabled");
    }

    let invite_service = InviteService::new(
        invite_repo,
        user_repo.clone(),
        mailer,
        &config,
    );
    let auth_service = AuthService::new(
        user_repo.clone(),
        session_repo,
        invite_service.clone(),
        &config,
    );
    let submission_service = SubmissionService::new(submission_repo, user_repo.clone());
    let user_admin_service = UserAdminService::new(user_repo);

    // Seed the founding super admin when configured and absent
    user_admin_service
        .ensure_bootstrap_admin(config.bootstrap.as_ref())
        .await?;

    // Background invite-expiry sweep
    spawn_invite_sweep(
        invite_service.clone(),
        config.invites.sweep_interval_minutes,
    );

    let state = AppState {
        auth_service,
        submission_service,
        invite_service,
        user_admin_service,
        cookie_name: config.auth.cookie_name.clone(),
        cookie_secure: config.auth.cookie_secure,
    };

    // Build router
    let app = Router::new()
        .nest("/api/v1", api_router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(config.server.cors_origin.as_deref())?)
        .with_state(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}
