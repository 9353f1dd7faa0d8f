//! Business logic services

pub mod assets;
pub mod auth;
pub mod qr;

use std::sync::Arc;

use crate::{
    config::{AuthConfig, QrConfig},
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub assets: assets::AssetsService,
    pub auth: auth::AuthService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, auth_config: AuthConfig, qr_config: &QrConfig) -> Self {
        let qr: Arc<dyn qr::QrEncoder> = Arc::new(qr::SvgQrEncoder::new(qr_config));
        Self {
            assets: assets::AssetsService::new(repository.clone(), qr),
            auth: auth::AuthService::new(repository, auth_config),
        }
    }
}
