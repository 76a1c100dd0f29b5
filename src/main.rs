//! Pinnacle Financial site backend server.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use pinnacle_backend::config::Config;
use pinnacle_backend::db::{self, Repository};
use pinnacle_backend::{content, create_router, seed_bootstrap_admin, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Pinnacle site backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Bind address: {}", config.bind_addr);

    if config.has_weak_secret() {
        tracing::warn!(
            "PINNACLE_JWT_SECRET is shorter than {} bytes; use a longer random secret",
            pinnacle_backend::config::RECOMMENDED_SECRET_LEN
        );
    }

    // Initialize database
    let pool = db::init_database(&config.db_path).await?;
    let repo = Repository::new(pool);

    let defaults = content::load_defaults(config.site_defaults_path.as_deref())?;
    match &config.site_defaults_path {
        Some(path) => tracing::info!("Site defaults loaded from {:?}", path),
        None => tracing::info!("Using compiled-in site defaults"),
    }

    if seed_bootstrap_admin(&repo, &config).await? {
        tracing::info!("Bootstrap admin seeded; change its password after first login");
    } else if repo.count_users().await? == 0 {
        tracing::warn!("No admin users exist and no bootstrap admin is configured");
    }

    let bind_addr = config.bind_addr;
    let state = AppState::new(repo, defaults, config);

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Server listening on {}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
