//! PostgreSQL-backed sources for the ranking engine

mod article_repo;
mod interactive_repo;

pub use article_repo::PgContentSource;
pub use interactive_repo::PgPopularitySource;
