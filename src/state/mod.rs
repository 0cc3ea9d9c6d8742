//! State module for tracking crawl job progress
//!
//! # Components
//!
//! - `JobStatus`: The lifecycle of a crawl job (idle, pending, running, done, failed)

mod job_status;

pub use job_status::JobStatus;
