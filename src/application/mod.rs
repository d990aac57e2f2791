pub mod admin;
pub mod download_coordinator;
pub mod export;

pub use admin::{AdminRefresher, RefreshOutcome};
pub use download_coordinator::{DownloadCoordinator, DownloadEvent};
