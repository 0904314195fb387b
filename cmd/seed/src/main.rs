//! Loads the configured course list into PostgreSQL and opens a forum for
//! each course. Safe to re-run: existing forums are left untouched.

use std::sync::Arc;

use anyhow::{Context, Result};
use configs::Settings;
use domains::DomainError;
use secrecy::ExposeSecret;
use services::ForumService;
use storage_adapters::postgres::{self, PgCourseCatalog, PgForumRepository};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load().context("Failed to load configuration")?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let url = settings
        .database
        .url
        .as_ref()
        .context("database.url must be set to seed")?;
    let pool = postgres::connect(
        url.expose_secret(),
        settings.database.max_connections,
        settings.database.acquire_timeout(),
    )
    .await?;

    let catalog = PgCourseCatalog::new(pool.clone());
    let service = ForumService::new(
        Arc::new(PgForumRepository::new(pool)),
        Arc::new(catalog.clone()),
    );

    let courses = settings.course_summaries();
    if courses.is_empty() {
        warn!("No [[courses]] configured; nothing to seed");
        return Ok(());
    }

    let mut created = 0usize;
    for course in &courses {
        catalog
            .upsert(course)
            .await
            .with_context(|| format!("Failed to upsert course {}", course.course_id))?;

        match service.create_forum(&course.course_id, &course.course_name).await {
            Ok(_) => created += 1,
            Err(DomainError::Duplicate(_)) => {
                info!(course_id = %course.course_id, "forum already present");
            }
            Err(e) => return Err(e).context("Failed to create forum"),
        }
    }

    info!(courses = courses.len(), forums_created = created, "Seed complete");
    Ok(())
}
