mod pagination;
mod schema;
mod sqlite_job_store;

pub use pagination::*;
pub use schema::JOB_VERSIONED_SCHEMAS;
pub use sqlite_job_store::SqliteJobStore;

use crate::errors::JobResult;
use crate::job::Job;

/// Durable storage for job postings.
///
/// Status transitions are conditional single-statement writes: each one only
/// matches a row whose current status allows it. A write that matches nothing
/// is reported as [`crate::errors::JobError::NotFound`], whether the job is
/// missing or simply in the wrong state.
#[cfg_attr(feature = "mock", mockall::automock)]
pub trait JobStore: Send + Sync {
    /// Fails with `AlreadyExists` if the id is taken.
    fn create(&self, job: &Job) -> JobResult<()>;
    /// Overwrite the detail fields and `updated_at`. Archived jobs never match.
    fn update(&self, id: &str, job: &Job) -> JobResult<()>;
    fn get_by_id(&self, id: &str) -> JobResult<Job>;
    /// Refused with `HasApplications` while any application references the job.
    fn delete(&self, id: &str) -> JobResult<()>;
    fn exists(&self, id: &str) -> JobResult<bool>;

    // Listings
    fn list(&self, pagination: Pagination) -> JobResult<Page<Job>>;
    fn list_by_user(&self, owner: &str, pagination: Pagination) -> JobResult<Page<Job>>;
    fn list_published(&self, pagination: Pagination) -> JobResult<Page<Job>>;
    fn list_archived(&self, pagination: Pagination) -> JobResult<Page<Job>>;
    fn search(&self, criteria: &SearchCriteria) -> JobResult<Page<Job>>;
    fn get_by_title(&self, title: &str) -> JobResult<Vec<Job>>;

    // Conditional transitions
    /// DRAFT -> PUBLISHED, keeping an earlier `published_at`.
    fn publish(&self, id: &str) -> JobResult<()>;
    /// PUBLISHED -> DRAFT.
    fn unpublish(&self, id: &str) -> JobResult<()>;
    /// Any status -> CLOSED. Only fails when the job is missing.
    fn close(&self, id: &str) -> JobResult<()>;
    /// Any non-archived status -> ARCHIVED.
    fn archive(&self, id: &str) -> JobResult<()>;
    /// ARCHIVED -> DRAFT.
    fn unarchive(&self, id: &str) -> JobResult<()>;

    // Aggregates
    fn count_by_user(&self, owner: &str) -> JobResult<i64>;
    fn count_applications(&self, job_id: &str) -> JobResult<i64>;
}
