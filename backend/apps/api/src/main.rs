//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    http,
    http::{Method, header},
    routing::get,
};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use auth::domain::repository::SessionStore;
use auth::presentation::middleware::AuthGateState;
use auth::presentation::{AuthAppState, auth_router};
use auth::{AuthConfig, MemorySessionStore, PgUserRepository, RedisSessionStore, TokenCodec};
use catalog::application::MaintenanceUseCase;
use catalog::{CatalogAppState, CatalogConfig, PgCatalogRepository, catalog_router};
use kernel::response::ApiResponse;
use platform::cache::{CacheStore, MemoryCacheStore, RedisCacheStore};
use platform::notify::{EmailNotifier, NoopNotifier, WebhookNotifier};
use platform::object::{FsObjectStore, ObjectStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,auth=info,catalog=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Database connection
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    // Startup sweep: drop expired rentals
    // Errors here should not prevent server startup
    let sweep = MaintenanceUseCase::new(Arc::new(PgCatalogRepository::new(pool.clone())));
    match sweep.run().await {
        Ok(purged) => {
            tracing::info!(rentals_purged = purged, "Startup maintenance completed");
        }
        Err(e) => {
            tracing::warn!(error = %e, "Startup maintenance failed, continuing anyway");
        }
    }

    // Auth configuration
    let auth_config = if let Ok(secret) = env::var("TOKEN_SECRET") {
        anyhow::ensure!(
            secret.len() >= 32,
            "TOKEN_SECRET must be at least 32 bytes"
        );
        AuthConfig {
            token_secret: secret.into_bytes(),
            ..Default::default()
        }
    } else if cfg!(debug_assertions) {
        tracing::warn!("TOKEN_SECRET not set, using a random secret (dev only)");
        AuthConfig::with_random_secret()
    } else {
        anyhow::bail!("TOKEN_SECRET must be set in production");
    };

    let auth_config = AuthConfig {
        bootstrap_admins: env::var("BOOTSTRAP_ADMIN_EMAILS")
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(String::from)
            .collect(),
        password_pepper: env::var("PASSWORD_PEPPER").ok().map(String::into_bytes),
        ..auth_config
    };

    let codec = Arc::new(TokenCodec::new(
        &auth_config.token_secret,
        auth_config.token_ttl,
    ));

    // Object store
    let object_root =
        env::var("OBJECT_STORE_ROOT").unwrap_or_else(|_| "./data/objects".to_string());
    let objects: Arc<dyn ObjectStore> = Arc::new(FsObjectStore::new(object_root));

    // Moderation notifications
    let notifier: Arc<dyn EmailNotifier> = match env::var("NOTIFY_WEBHOOK_URL") {
        Ok(url) => Arc::new(WebhookNotifier::new(url)),
        Err(_) => {
            tracing::info!("NOTIFY_WEBHOOK_URL not set, notifications are logged only");
            Arc::new(NoopNotifier)
        }
    };

    // Session and cache stores: Redis when configured, in-process
    // fallbacks otherwise (single-instance deployments only).
    match env::var("REDIS_URL") {
        Ok(url) => {
            let redis_pool = deadpool_redis::Config::from_url(url)
                .create_pool(Some(deadpool_redis::Runtime::Tokio1))?;
            tracing::info!("Using Redis session and cache stores");
            serve(
                pool,
                Arc::new(RedisSessionStore::new(redis_pool.clone())),
                Arc::new(RedisCacheStore::new(redis_pool)),
                objects,
                notifier,
                Arc::new(auth_config),
                codec,
            )
            .await
        }
        Err(_) => {
            tracing::warn!("REDIS_URL not set, using in-process stores");
            serve(
                pool,
                Arc::new(MemorySessionStore::new()),
                Arc::new(MemoryCacheStore::new()),
                objects,
                notifier,
                Arc::new(auth_config),
                codec,
            )
            .await
        }
    }
}

async fn serve<S>(
    pool: PgPool,
    sessions: Arc<S>,
    cache: Arc<dyn CacheStore>,
    objects: Arc<dyn ObjectStore>,
    notifier: Arc<dyn EmailNotifier>,
    auth_config: Arc<AuthConfig>,
    codec: Arc<TokenCodec>,
) -> anyhow::Result<()>
where
    S: SessionStore + Send + Sync + 'static,
{
    let users = Arc::new(PgUserRepository::new(pool.clone()));
    let catalog_repo = Arc::new(PgCatalogRepository::new(pool));
    let catalog_config = Arc::new(CatalogConfig::default());

    // Hourly maintenance sweep
    {
        let maintenance = MaintenanceUseCase::new(catalog_repo.clone());
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_secs(3600));
            ticker.tick().await; // immediate first tick; startup already swept
            loop {
                ticker.tick().await;
                if let Err(e) = maintenance.run().await {
                    tracing::warn!(error = %e, "Maintenance sweep failed");
                }
            }
        });
    }

    let gate = AuthGateState::new(sessions.clone(), codec.clone());

    let auth_state = AuthAppState {
        users: users.clone(),
        sessions,
        codec,
        config: auth_config,
    };

    let catalog_state = CatalogAppState {
        authors: catalog_repo.clone(),
        books: catalog_repo,
        users,
        objects,
        cache,
        notifier,
        config: catalog_config.clone(),
    };

    // CORS configuration
    let frontend_origins = env::var("FRONTEND_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:5173,http://127.0.0.1:5173".to_string());

    let allowed_origins: Vec<http::HeaderValue> = frontend_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]))
        .allow_credentials(true);

    // Multipart uploads carry the book file plus the cover.
    let body_limit =
        catalog_config.max_book_file_bytes + catalog_config.max_cover_bytes + 1024 * 1024;

    // Build router
    let app = Router::new()
        .route("/api/health", get(health))
        .nest("/api/auth", auth_router(auth_state, gate.clone()))
        .nest("/api", catalog_router(catalog_state, gate))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let port = env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080u16);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

async fn health() -> Json<ApiResponse<serde_json::Value>> {
    Json(ApiResponse::ok(serde_json::json!({ "status": "ok" })))
}
