//! Armory Weapon Asset Tracking
//!
//! REST JSON API for tracking weapon assets: registration with QR codes,
//! lookup by id or serial number, updates, and an append-only maintenance
//! log, all behind JWT bearer authentication.

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
    pub services: Arc<services::Services>,
}

impl AppState {
    /// Build the services over the given repository
    pub fn new(config: AppConfig, repository: repository::Repository) -> Self {
        let services = services::Services::new(repository, config.auth, &config.qr);
        Self {
            services: Arc::new(services),
        }
    }
}
