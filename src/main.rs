//! Personal blog server - main entry point.
//!
//! Starts the Actix-web server with configured routes and middleware.

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, http::header, web};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use personal_blog_lib::api::{self, ApiDoc};
use personal_blog_lib::auth::{Argon2Hasher, PasswordHasher};
use personal_blog_lib::config::Config;
use personal_blog_lib::db::{DbPool, RefreshTokenStore, UserStore};
use personal_blog_lib::middleware::{REQUEST_ID_HEADER, RequestLogger};
use personal_blog_lib::services::{
    AuthSessionManager, CleanupConfig, GitHubOAuthClient, UserService, start_cleanup_task,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            error!("");
            error!("Please check your environment variables:");
            error!("  - RUST_ENV must be set to 'development' or 'production'");
            error!("  - In production, DATABASE_URL and JWT_SECRET must be set");
            error!("  - In production, values must not match development defaults");
            std::process::exit(1);
        }
    };

    info!("========================================");
    info!("  Personal Blog Server");
    info!("  Environment: {}", config.environment);
    info!("========================================");

    if config.is_development() {
        warn!("Running in DEVELOPMENT mode - do not use in production!");
    }

    // Initialize database
    let pool = match DbPool::new(&config).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };
    info!("Database connection established");

    if let Err(e) = pool.run_migrations().await {
        error!("Failed to run migrations: {}", e);
        std::process::exit(1);
    }

    // Wire services
    let users: Arc<dyn UserStore> = Arc::new(pool.clone());
    let refresh_tokens: Arc<dyn RefreshTokenStore> = Arc::new(pool.clone());
    let hasher: Arc<dyn PasswordHasher> = Arc::new(Argon2Hasher::new());

    let sessions = match AuthSessionManager::new(
        users.clone(),
        refresh_tokens,
        hasher.clone(),
        &config.auth,
    ) {
        Ok(sessions) => Arc::new(sessions),
        Err(e) => {
            error!("Failed to initialize session manager: {}", e);
            std::process::exit(1);
        }
    };
    let signer = sessions.signer().clone();
    let user_service = web::Data::new(UserService::new(users.clone(), hasher));

    let github = if config.github_oauth.enabled {
        match GitHubOAuthClient::new(&config.github_oauth) {
            Ok(client) => {
                info!("GitHub sign-in enabled");
                Some(web::Data::new(client))
            }
            Err(e) => {
                error!("Failed to initialize GitHub OAuth client: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        info!("GitHub sign-in disabled (GITHUB_CLIENT_ID/GITHUB_CLIENT_SECRET not set)");
        None
    };

    // Start cleanup background task
    start_cleanup_task(
        sessions.clone(),
        CleanupConfig {
            interval_secs: config.auth.cleanup_interval_secs,
        },
    );

    let bind_address = config.bind_address();
    let is_development = config.is_development();
    let sessions = web::Data::from(sessions);
    let users = web::Data::from(users);
    let signer = web::Data::new(signer);
    let openapi = ApiDoc::openapi();

    let worker_count = if is_development {
        info!(
            "Starting server at http://{} (4 workers - development mode)",
            bind_address
        );
        4
    } else {
        let cpus = num_cpus::get();
        info!(
            "Starting server at http://{} ({} workers)",
            bind_address, cpus
        );
        cpus
    };

    let server = HttpServer::new(move || {
        let cors = if is_development {
            Cors::default()
                .allowed_origin("http://localhost:3000")
                .allowed_origin("http://127.0.0.1:3000")
                .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                .allowed_headers(vec![header::AUTHORIZATION, header::ACCEPT, header::CONTENT_TYPE])
                .expose_headers(vec![REQUEST_ID_HEADER])
                .supports_credentials()
                .max_age(3600)
        } else {
            // Same-origin only
            Cors::default()
                .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                .allowed_headers(vec![header::AUTHORIZATION, header::ACCEPT, header::CONTENT_TYPE])
                .expose_headers(vec![REQUEST_ID_HEADER])
                .max_age(3600)
        };

        let mut app = App::new()
            // CORS must wrap before other middleware
            .wrap(cors)
            .wrap(RequestLogger)
            .app_data(web::Data::new(pool.clone()))
            .app_data(sessions.clone())
            .app_data(users.clone())
            .app_data(user_service.clone())
            .app_data(signer.clone());

        if let Some(ref github) = github {
            app = app.app_data(github.clone());
        }

        app.configure(api::configure_v1).service(
            SwaggerUi::new("/api/docs/{_:.*}").url("/api/openapi.json", openapi.clone()),
        )
    });

    server
        .workers(worker_count)
        .bind(&bind_address)?
        .run()
        .await
}
