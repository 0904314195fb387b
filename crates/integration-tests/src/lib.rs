//! Shared fixtures for the cross-crate tests.

use std::sync::Arc;

use domains::{CourseSummary, ForumRepository};
use fake::faker::lorem::en::{Paragraph, Sentence};
use fake::Fake;
use services::ForumService;
use storage_adapters::{InMemoryCourseCatalog, InMemoryForumRepository};

pub fn sample_courses() -> Vec<CourseSummary> {
    [
        ("C1", "Algorithms"),
        ("C2", "Operating Systems"),
        ("C3", "Advanced Algorithms"),
    ]
    .into_iter()
    .map(|(id, name)| CourseSummary {
        course_id: id.to_string(),
        course_name: name.to_string(),
    })
    .collect()
}

/// Service over fresh in-memory adapters seeded with [`sample_courses`].
pub fn memory_service() -> ForumService {
    service_over(Arc::new(InMemoryForumRepository::new()))
}

pub fn service_over(repo: Arc<dyn ForumRepository>) -> ForumService {
    ForumService::new(repo, Arc::new(InMemoryCourseCatalog::new(sample_courses())))
}

pub fn random_title() -> String {
    Sentence(2..6).fake()
}

pub fn random_body() -> String {
    Paragraph(1..3).fake()
}

#[cfg(feature = "web-axum")]
pub mod server {
    use std::net::SocketAddr;

    use api_adapters::{router, AppState, RouterOptions};
    use tokio::net::TcpListener;

    /// Serves a fresh in-memory app on an ephemeral port.
    pub async fn spawn() -> SocketAddr {
        let app = router(AppState::new(super::memory_service()), RouterOptions::default());
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("test server");
        });
        addr
    }
}

#[cfg(feature = "db-postgres")]
pub mod pg {
    use std::time::Duration;

    use storage_adapters::postgres::{self, PgForumRepository};
    use testcontainers_modules::postgres::Postgres;
    use testcontainers_modules::testcontainers::runners::AsyncRunner;
    use testcontainers_modules::testcontainers::ContainerAsync;

    /// A throwaway PostgreSQL container. Removed when dropped.
    pub struct TestDatabase {
        pub url: String,
        _container: ContainerAsync<Postgres>,
    }

    impl TestDatabase {
        pub async fn start() -> Self {
            let container = Postgres::default()
                .start()
                .await
                .expect("start postgres container");
            let host = container.get_host().await.expect("container host");
            let port = container
                .get_host_port_ipv4(5432)
                .await
                .expect("container port");
            Self {
                url: format!("postgres://postgres:postgres@{host}:{port}/postgres"),
                _container: container,
            }
        }

        /// Connects (running migrations) and wraps the pool in a repository.
        pub async fn repository(&self) -> PgForumRepository {
            let pool = postgres::connect(&self.url, 8, Duration::from_secs(10))
                .await
                .expect("connect to test database");
            PgForumRepository::new(pool)
        }
    }
}
