//! Failures raised by the job-posting core.
//!
//! Entity, store and service all return [`JobError`]. Domain failures expose an
//! [`ErrorKind`]; the [`ErrorCatalog`] turns a kind into a stable code and an
//! HTTP status class when the failure leaves the process.

mod catalog;

pub use catalog::{
    CatalogEntry, ErrorCatalog, ErrorCategory, RenderedError, INTERNAL_ERROR, INTERNAL_MESSAGE,
};

use crate::job::JobStatus;
use thiserror::Error;

/// Domain failure kinds. Infrastructure failures have no kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    AlreadyExists,
    AlreadyArchived,
    NotArchived,
    AlreadyPublished,
    CannotPublish,
    JobArchived,
    HasApplications,
    InvalidJob,
    InsufficientPermissions,
    UnauthorizedUpdate,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 11] = [
        ErrorKind::NotFound,
        ErrorKind::AlreadyExists,
        ErrorKind::AlreadyArchived,
        ErrorKind::NotArchived,
        ErrorKind::AlreadyPublished,
        ErrorKind::CannotPublish,
        ErrorKind::JobArchived,
        ErrorKind::HasApplications,
        ErrorKind::InvalidJob,
        ErrorKind::InsufficientPermissions,
        ErrorKind::UnauthorizedUpdate,
    ];
}

/// Errors that can occur while reading or mutating job postings.
#[derive(Debug, Error)]
pub enum JobError {
    /// The job does not exist, or a conditional write matched no row.
    #[error("Job not found: {0}")]
    NotFound(String),

    #[error("Job already exists: {0}")]
    AlreadyExists(String),

    #[error("Job {0} is already archived")]
    AlreadyArchived(String),

    #[error("Job {0} is not archived")]
    NotArchived(String),

    #[error("Job {0} is already published")]
    AlreadyPublished(String),

    #[error("Job {id} cannot be published from status {status}")]
    CannotPublish { id: String, status: JobStatus },

    #[error("Job {0} is archived and cannot be modified")]
    JobArchived(String),

    #[error("Job {id} has {count} application(s) and cannot be deleted")]
    HasApplications { id: String, count: i64 },

    #[error("Invalid job: {0}")]
    InvalidJob(String),

    /// No actor, or an actor that cannot manage jobs at all.
    #[error("Insufficient permissions")]
    InsufficientPermissions,

    /// The actor is authenticated but does not own the job.
    #[error("User {user_id} is not allowed to modify job {job_id}")]
    UnauthorizedUpdate { user_id: String, job_id: String },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Internal error: {0:#}")]
    Internal(#[from] anyhow::Error),
}

pub type JobResult<T> = std::result::Result<T, JobError>;

impl JobError {
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            JobError::NotFound(_) => Some(ErrorKind::NotFound),
            JobError::AlreadyExists(_) => Some(ErrorKind::AlreadyExists),
            JobError::AlreadyArchived(_) => Some(ErrorKind::AlreadyArchived),
            JobError::NotArchived(_) => Some(ErrorKind::NotArchived),
            JobError::AlreadyPublished(_) => Some(ErrorKind::AlreadyPublished),
            JobError::CannotPublish { .. } => Some(ErrorKind::CannotPublish),
            JobError::JobArchived(_) => Some(ErrorKind::JobArchived),
            JobError::HasApplications { .. } => Some(ErrorKind::HasApplications),
            JobError::InvalidJob(_) => Some(ErrorKind::InvalidJob),
            JobError::InsufficientPermissions => Some(ErrorKind::InsufficientPermissions),
            JobError::UnauthorizedUpdate { .. } => Some(ErrorKind::UnauthorizedUpdate),
            JobError::Cancelled | JobError::Internal(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_infrastructure_errors_have_no_kind() {
        let err: JobError = Err::<(), _>(std::io::Error::other("disk gone"))
            .context("Failed to read job row")
            .unwrap_err()
            .into();
        assert!(err.kind().is_none());
        assert!(JobError::Cancelled.kind().is_none());

        // Context is kept in the rendered message
        let msg = err.to_string();
        assert!(msg.contains("Failed to read job row"));
        assert!(msg.contains("disk gone"));
    }

    #[test]
    fn test_domain_errors_map_to_kinds() {
        assert_eq!(
            JobError::NotFound("a".into()).kind(),
            Some(ErrorKind::NotFound)
        );
        assert_eq!(
            JobError::CannotPublish {
                id: "a".into(),
                status: JobStatus::Closed
            }
            .kind(),
            Some(ErrorKind::CannotPublish)
        );
        assert_eq!(
            JobError::UnauthorizedUpdate {
                user_id: "u".into(),
                job_id: "a".into()
            }
            .kind(),
            Some(ErrorKind::UnauthorizedUpdate)
        );
    }
}
