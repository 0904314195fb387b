//! # course-forums
//!
//! The entry point that assembles the forum server from settings and
//! compile-time features.

use std::sync::Arc;

use anyhow::{Context, Result};
use api_adapters::{router, AppState, RouterOptions};
use configs::{LogFormat, LogSettings, Settings, StorageBackend};
use domains::{CourseCatalog, ForumRepository};
use services::ForumService;
use storage_adapters::{InMemoryCourseCatalog, InMemoryForumRepository};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {e:#}");
        eprintln!("Fatal error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let settings = Settings::load().context("Failed to load configuration")?;
    init_tracing(&settings.log)?;

    info!(
        app_env = %configs::app_env(),
        addr = %settings.bind_addr(),
        backend = ?settings.database.backend,
        "Starting course-forums"
    );

    let (repo, courses) = build_adapters(&settings).await?;
    let service = ForumService::new(repo, courses);
    let app = router(
        AppState::new(service),
        RouterOptions {
            cors_allow_any_origin: settings.server.cors_allow_any_origin,
        },
    );

    let listener = tokio::net::TcpListener::bind(settings.bind_addr())
        .await
        .context("Failed to bind web server")?;
    info!(addr = %listener.local_addr()?, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Web server error")?;

    info!("Shutdown complete");
    Ok(())
}

async fn build_adapters(
    settings: &Settings,
) -> Result<(Arc<dyn ForumRepository>, Arc<dyn CourseCatalog>)> {
    match settings.database.backend {
        StorageBackend::Memory => {
            let courses = InMemoryCourseCatalog::new(settings.course_summaries());
            Ok((Arc::new(InMemoryForumRepository::new()), Arc::new(courses)))
        }
        #[cfg(feature = "db-postgres")]
        StorageBackend::Postgres => {
            use secrecy::ExposeSecret;
            use storage_adapters::postgres::{self, PgCourseCatalog, PgForumRepository};

            let url = settings
                .database
                .url
                .as_ref()
                .context("database.url is required for the postgres backend")?;
            let pool = postgres::connect(
                url.expose_secret(),
                settings.database.max_connections,
                settings.database.acquire_timeout(),
            )
            .await?;
            info!("Database initialized");
            Ok((
                Arc::new(PgForumRepository::new(pool.clone())),
                Arc::new(PgCourseCatalog::new(pool)),
            ))
        }
        #[cfg(not(feature = "db-postgres"))]
        StorageBackend::Postgres => {
            anyhow::bail!("this build was compiled without the db-postgres feature")
        }
    }
}

fn init_tracing(log: &LogSettings) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&log.filter))
        .context("Invalid log filter")?;

    match log.format {
        // Structured JSON logging for production
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
        // Pretty-printed logging for development
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init(),
    }
    .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutting down...");
}
