pub mod chapters;
pub mod config;
pub mod genres;
pub mod migrate;
pub mod songs;
pub mod types;

pub use sqlx::postgres::PgPool;
pub use types::*;
