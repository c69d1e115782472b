//! Songbook HTTP API
//!
//! Serves songs, chapters, genres and lyrics from PostgreSQL and the local
//! filesystem, and proxies Google Drive images and audio through a
//! server-held OAuth credential.

pub mod config;
pub mod credentials;
pub mod error;
pub mod routes;
pub mod server;
pub mod song_order;
pub mod state;

pub use server::create_router;
