pub mod error;
pub mod model;

pub use error::AppError;
pub use model::{AudioFormat, DownloadRequest, DownloadResult, FormatOutcome, JobStatus};
