use nest_portfolio::config::AppConfig;
use nest_portfolio::contact::store::SubmissionStore;
use nest_portfolio::gallery::catalog::Catalog;
use nest_portfolio::server::{self, AppState};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env();

    // Initialize the database schema up front.
    // If this fails, we panic because the server cannot function without it.
    let submission_count = {
        let store = SubmissionStore::open(&config.db_path)
            .expect("Failed to initialize database. Check permissions and disk space.");
        store.submission_count().unwrap_or(0)
    };
    info!(
        "📁 Database ready at {} ({} submissions)",
        config.db_path.display(),
        submission_count
    );

    let catalog = match Catalog::load(&config.catalog_path) {
        Ok(catalog) => {
            info!(
                "🖼️  Catalog loaded: {} images from {}",
                catalog.len(),
                config.catalog_path.display()
            );
            catalog
        }
        Err(e) => {
            warn!(
                error = %e,
                path = %config.catalog_path.display(),
                "Catalog unavailable, serving an empty gallery"
            );
            Catalog::default()
        }
    };

    let mailer = config.build_mailer();
    if config.admin_token.is_none() {
        warn!("ADMIN_TOKEN not set; the submission listing endpoint is disabled");
    }

    let state = AppState {
        db_path: config.db_path.clone(),
        catalog: Arc::new(catalog),
        mailer: Arc::new(mailer),
        admin_token: config.admin_token.clone(),
    };
    let app = server::router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .expect("Failed to bind server address");
    info!("🎨 nest-portfolio listening on {}", config.bind_addr);

    axum::serve(listener, app).await.expect("Server error");
}
