//! Shelfwise library inventory server
//!
//! REST JSON API over a PostgreSQL catalog of storage locations and books,
//! with Redis-backed staging carts for the borrow and return desks.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
