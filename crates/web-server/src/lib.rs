use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
    Router,
};
use configuration::Config;
use database::DbRepository;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, Any, CorsLayer, ExposeHeaders},
    trace::TraceLayer,
};
use tracing;

pub mod auth;
pub mod error;
pub mod handlers;

/// The shared application state that all handlers can access.
#[derive(Clone)]
pub struct AppState {
    pub db_repo: DbRepository,
    pub config: Config,
    pub jwt_secret: String,
}

/// The main function to configure and run the web server.
pub async fn run_server(addr: SocketAddr, config: Config) -> anyhow::Result<()> {
    // Note: Tracing is initialized by the main application, so we don't
    // initialize it again here.

    dotenvy::dotenv().ok();
    let jwt_secret = std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?;

    let db_pool = database::connect().await?;
    database::run_migrations(&db_pool).await?;
    let db_repo = DbRepository::new(db_pool);

    let body_limit = config.server.body_limit_mb * 1024 * 1024;
    let app_state = Arc::new(AppState {
        db_repo,
        config,
        jwt_secret,
    });

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods(Any)
        .allow_headers(AllowHeaders::any())
        .expose_headers(ExposeHeaders::any());

    // --- DEFINE THE APPLICATION ROUTES ---
    // Admin-only routes are gated inside the handlers via the `AdminUser`
    // extractor; everything else is public.
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/register", post(handlers::auth::register))
        .route(
            "/api/pets",
            get(handlers::pets::list_pets).post(handlers::pets::create_pet),
        )
        .route("/api/pets/stats", get(handlers::pets::pet_stats))
        .route(
            "/api/pets/:id",
            get(handlers::pets::get_pet)
                .put(handlers::pets::update_pet)
                .delete(handlers::pets::delete_pet),
        )
        .route("/api/pets/:id/status", patch(handlers::pets::update_pet_status))
        .route(
            "/api/candidates",
            get(handlers::candidates::list_candidates).post(handlers::candidates::create_candidate),
        )
        .route(
            "/api/candidates/stats",
            get(handlers::candidates::candidate_stats),
        )
        .route("/api/candidates/:id", get(handlers::candidates::get_candidate))
        .route(
            "/api/candidates/:id/status",
            patch(handlers::candidates::update_candidate_status),
        )
        .route("/api/interests", post(handlers::candidates::create_interest))
        .route(
            "/api/adoptions",
            get(handlers::adoptions::list_adoptions).post(handlers::adoptions::finalize_adoption),
        )
        .route(
            "/api/adoptions/stats",
            get(handlers::adoptions::adoption_stats),
        )
        .route("/api/adoptions/:id", get(handlers::adoptions::get_adoption))
        .route(
            "/api/adoptions/:id/status",
            patch(handlers::adoptions::update_adoption_status),
        )
        .route(
            "/api/adoptions/candidate/:candidate_id",
            get(handlers::adoptions::adoptions_for_candidate),
        )
        .with_state(app_state)
        .layer(cors)
        // This middleware will automatically log information about every
        // incoming request.
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(body_limit));

    tracing::info!("Web server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
