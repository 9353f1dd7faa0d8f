//! Data models for Armory

pub mod asset;
pub mod maintenance;
pub mod pagination;
pub mod user;

// Re-export commonly used types
pub use asset::{Asset, AssetDetails, AssetStatus};
pub use maintenance::{MaintenanceEntry, MaintenanceStatus};
pub use pagination::Pagination;
pub use user::{User, UserRef};
