//! # storage-adapters
//!
//! Implementations of the `domains` ports. The in-memory adapters are always
//! compiled; PostgreSQL sits behind the `db-postgres` feature.

pub mod courses;
pub mod memory;

#[cfg(feature = "db-postgres")]
pub mod postgres;

pub use courses::InMemoryCourseCatalog;
pub use memory::InMemoryForumRepository;
