//! QR code generation for weapon serial numbers

use base64::{engine::general_purpose::STANDARD, Engine as _};
use qrcode::{render::svg, QrCode};

use crate::{
    config::QrConfig,
    error::{AppError, AppResult},
};

/// Turns a serial number into an opaque string stored as the asset's `qrCode`
#[cfg_attr(test, mockall::automock)]
pub trait QrEncoder: Send + Sync {
    fn encode(&self, serial_number: &str) -> AppResult<String>;
}

/// Renders an SVG QR code and wraps it in a base64 data URL
#[derive(Debug, Clone)]
pub struct SvgQrEncoder {
    min_dimension: u32,
}

impl SvgQrEncoder {
    pub fn new(config: &QrConfig) -> Self {
        Self {
            min_dimension: config.min_dimension,
        }
    }
}

impl QrEncoder for SvgQrEncoder {
    fn encode(&self, serial_number: &str) -> AppResult<String> {
        let code = QrCode::new(serial_number.as_bytes())
            .map_err(|e| AppError::Internal(format!("Failed to encode QR code: {}", e)))?;

        let image = code
            .render::<svg::Color>()
            .min_dimensions(self.min_dimension, self.min_dimension)
            .build();

        Ok(format!("data:image/svg+xml;base64,{}", STANDARD.encode(image)))
    }
}
