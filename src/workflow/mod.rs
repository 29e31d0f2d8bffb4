pub mod classification_job;
pub mod job_ctx;

pub use classification_job::{ClassificationJob, JobOutput};
pub use job_ctx::JobCtx;
