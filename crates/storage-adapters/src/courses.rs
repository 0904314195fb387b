//! Course catalog backed by a fixed list, typically loaded from settings.

use async_trait::async_trait;
use domains::{contains_ignore_case, CourseCatalog, CourseSummary, Result};

#[derive(Debug, Clone, Default)]
pub struct InMemoryCourseCatalog {
    courses: Vec<CourseSummary>,
}

impl InMemoryCourseCatalog {
    pub fn new(courses: Vec<CourseSummary>) -> Self {
        Self { courses }
    }
}

#[async_trait]
impl CourseCatalog for InMemoryCourseCatalog {
    async fn search_courses(&self, query: &str) -> Result<Vec<CourseSummary>> {
        Ok(self
            .courses
            .iter()
            .filter(|c| contains_ignore_case(&c.course_name, query))
            .cloned()
            .collect())
    }
}
