pub mod error;
pub mod model;
pub mod notification;

pub use error::AppError;
pub use model::{DownloadAttempt, DownloadPhase, DownloadRequest, Progress, QualityTier};
pub use notification::{NotificationKind, NotificationQueue, NOTIFICATION_TTL};
