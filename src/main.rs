use chirpy::{build_state, router, AppConfig};
use chirpy::auth::SecretHasher;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // A missing .env file is fine; the environment may already be set.
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chirpy=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            std::process::exit(1);
        }
    };

    info!("Starting Chirpy server");

    let pool = match &config.database_url {
        Some(url) => {
            let pool = sqlx::PgPool::connect(url)
                .await
                .expect("Failed to connect to database");
            info!("Using PostgreSQL storage");
            Some(pool)
        }
        None => {
            info!("DB_URL not set, using in-memory storage");
            None
        }
    };

    let app = router(build_state(&config, pool, SecretHasher::new()));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind listener");
    info!("Server running on http://{}", config.bind_addr);
    axum::serve(listener, app).await.expect("Server error");
}
