//! Job Board Server Library
//!
//! This library exposes the internal modules for testing and potential reuse.

pub mod config;
pub mod errors;
pub mod job;
pub mod job_store;
pub mod jobs;
pub mod server;
pub mod sqlite_persistence;

// Re-export commonly used types for convenience
pub use errors::{ErrorCatalog, JobError, JobResult};
pub use job_store::{JobStore, SqliteJobStore};
pub use jobs::{Actor, JobService, Role};
pub use server::{run_server, RequestsLoggingLevel};
