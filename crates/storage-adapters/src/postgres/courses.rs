//! Course catalog backed by the `courses` table.

use async_trait::async_trait;
use domains::{CourseCatalog, CourseSummary, Result};
use sqlx::{PgPool, Row};

use super::storage_error;

#[derive(Debug, Clone)]
pub struct PgCourseCatalog {
    pool: PgPool,
}

impl PgCourseCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts the course or refreshes its name.
    pub async fn upsert(&self, course: &CourseSummary) -> Result<()> {
        sqlx::query(
            "INSERT INTO courses (course_id, course_name) VALUES ($1, $2)
             ON CONFLICT (course_id) DO UPDATE SET course_name = EXCLUDED.course_name",
        )
        .bind(&course.course_id)
        .bind(&course.course_name)
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;
        Ok(())
    }
}

#[async_trait]
impl CourseCatalog for PgCourseCatalog {
    async fn search_courses(&self, query: &str) -> Result<Vec<CourseSummary>> {
        let rows = sqlx::query(
            "SELECT course_id, course_name FROM courses
             WHERE course_name ILIKE $1 ORDER BY course_name",
        )
        .bind(super::forums::like_pattern(query))
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        rows.iter()
            .map(|row| -> std::result::Result<CourseSummary, sqlx::Error> {
                Ok(CourseSummary {
                    course_id: row.try_get("course_id")?,
                    course_name: row.try_get("course_name")?,
                })
            })
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(storage_error)
    }
}
