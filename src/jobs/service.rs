//! Application service for job postings.
//!
//! Every mutating call authorizes the actor, runs the entity's transition
//! rules on a loaded copy to produce a precise error, then hands the write to
//! the store's conditional operation. Losing a race against another writer
//! surfaces as the store's `NotFound`.

use super::bulk::{distinct_ids, BulkResult, CANCELLED_REASON};
use super::metrics;
use super::permissions::Actor;
use crate::errors::{JobError, JobResult, INTERNAL_MESSAGE};
use crate::job::{timestamp_now, Job, JobDetailsUpdate, JobStats, NewJob};
use crate::job_store::{JobStore, Page, Pagination, SearchCriteria};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Publish,
    Unpublish,
    Close,
    Archive,
    Unarchive,
}

impl Transition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Transition::Publish => "publish",
            Transition::Unpublish => "unpublish",
            Transition::Close => "close",
            Transition::Archive => "archive",
            Transition::Unarchive => "unarchive",
        }
    }

    /// Apply the in-memory rule to a scratch copy of the job.
    fn check(&self, job: &mut Job) -> JobResult<()> {
        let now = timestamp_now();
        match self {
            Transition::Publish => job.publish(now),
            Transition::Unpublish => {
                job.unpublish(now);
                Ok(())
            }
            Transition::Close => {
                job.close(now);
                Ok(())
            }
            Transition::Archive => job.archive(now),
            Transition::Unarchive => job.unarchive(now),
        }
    }

    fn persist(&self, store: &dyn JobStore, id: &str) -> JobResult<()> {
        match self {
            Transition::Publish => store.publish(id),
            Transition::Unpublish => store.unpublish(id),
            Transition::Close => store.close(id),
            Transition::Archive => store.archive(id),
            Transition::Unarchive => store.unarchive(id),
        }
    }
}

fn ensure_not_cancelled(cancel: &CancellationToken) -> JobResult<()> {
    if cancel.is_cancelled() {
        return Err(JobError::Cancelled);
    }
    Ok(())
}

fn require_manager(actor: Option<&Actor>) -> JobResult<&Actor> {
    match actor {
        Some(actor) if actor.can_manage_jobs() => Ok(actor),
        _ => Err(JobError::InsufficientPermissions),
    }
}

fn authorize_owner(actor: &Actor, job: &Job) -> JobResult<()> {
    if actor.can_modify(&job.posted_by) {
        Ok(())
    } else {
        Err(JobError::UnauthorizedUpdate {
            user_id: actor.user_id.clone(),
            job_id: job.id.clone(),
        })
    }
}

fn outcome_label<T>(result: &JobResult<T>) -> &'static str {
    match result {
        Ok(_) => "success",
        Err(JobError::Cancelled) => "cancelled",
        Err(JobError::Internal(_)) => "error",
        Err(_) => "rejected",
    }
}

pub struct JobService {
    store: Arc<dyn JobStore>,
}

impl JobService {
    pub fn new(store: Arc<dyn JobStore>) -> Self {
        Self { store }
    }

    pub fn create_job(
        &self,
        actor: Option<&Actor>,
        content: NewJob,
        cancel: &CancellationToken,
    ) -> JobResult<Job> {
        let actor = require_manager(actor)?;
        let job = Job::new(
            Uuid::new_v4().to_string(),
            actor.user_id.clone(),
            content,
            timestamp_now(),
        );
        job.validate()?;
        ensure_not_cancelled(cancel)?;

        self.store.create(&job)?;
        info!("Job {} created by {}", job.id, actor.user_id);
        Ok(job)
    }

    pub fn get_job(&self, id: &str, cancel: &CancellationToken) -> JobResult<Job> {
        ensure_not_cancelled(cancel)?;
        self.store.get_by_id(id)
    }

    pub fn update_job(
        &self,
        actor: Option<&Actor>,
        id: &str,
        update: JobDetailsUpdate,
        cancel: &CancellationToken,
    ) -> JobResult<Job> {
        let actor = require_manager(actor)?;
        ensure_not_cancelled(cancel)?;

        let mut job = self.store.get_by_id(id)?;
        authorize_owner(actor, &job)?;
        if job.is_archived() {
            return Err(JobError::JobArchived(job.id));
        }
        job.update_details(update, timestamp_now());
        ensure_not_cancelled(cancel)?;

        self.store.update(id, &job)?;
        info!("Job {} updated by {}", id, actor.user_id);
        Ok(job)
    }

    pub fn delete_job(
        &self,
        actor: Option<&Actor>,
        id: &str,
        cancel: &CancellationToken,
    ) -> JobResult<()> {
        let actor = require_manager(actor)?;
        ensure_not_cancelled(cancel)?;

        let job = self.store.get_by_id(id)?;
        authorize_owner(actor, &job)?;
        let count = self.store.count_applications(id)?;
        if count > 0 {
            return Err(JobError::HasApplications {
                id: id.to_string(),
                count,
            });
        }
        ensure_not_cancelled(cancel)?;

        self.store.delete(id)?;
        info!("Job {} deleted by {}", id, actor.user_id);
        Ok(())
    }

    pub fn publish_job(
        &self,
        actor: Option<&Actor>,
        id: &str,
        cancel: &CancellationToken,
    ) -> JobResult<Job> {
        self.apply(Transition::Publish, actor, id, cancel)
    }

    pub fn unpublish_job(
        &self,
        actor: Option<&Actor>,
        id: &str,
        cancel: &CancellationToken,
    ) -> JobResult<Job> {
        self.apply(Transition::Unpublish, actor, id, cancel)
    }

    pub fn close_job(
        &self,
        actor: Option<&Actor>,
        id: &str,
        cancel: &CancellationToken,
    ) -> JobResult<Job> {
        self.apply(Transition::Close, actor, id, cancel)
    }

    pub fn archive_job(
        &self,
        actor: Option<&Actor>,
        id: &str,
        cancel: &CancellationToken,
    ) -> JobResult<Job> {
        self.apply(Transition::Archive, actor, id, cancel)
    }

    pub fn unarchive_job(
        &self,
        actor: Option<&Actor>,
        id: &str,
        cancel: &CancellationToken,
    ) -> JobResult<Job> {
        self.apply(Transition::Unarchive, actor, id, cancel)
    }

    /// Run one transition end to end and return the job as persisted.
    pub fn apply(
        &self,
        transition: Transition,
        actor: Option<&Actor>,
        id: &str,
        cancel: &CancellationToken,
    ) -> JobResult<Job> {
        let result = self.try_apply(transition, actor, id, cancel);
        metrics::record_job_transition(transition.as_str(), outcome_label(&result));
        match &result {
            Ok(_) => info!(
                "Job {} {} by {}",
                id,
                transition.as_str(),
                actor.map(|a| a.user_id.as_str()).unwrap_or("-")
            ),
            Err(JobError::Internal(e)) => warn!("Failed to {} job {}: {:#}", transition.as_str(), id, e),
            Err(e) => debug!("Rejected {} of job {}: {}", transition.as_str(), id, e),
        }
        result
    }

    fn try_apply(
        &self,
        transition: Transition,
        actor: Option<&Actor>,
        id: &str,
        cancel: &CancellationToken,
    ) -> JobResult<Job> {
        let actor = require_manager(actor)?;
        ensure_not_cancelled(cancel)?;

        let job = self.store.get_by_id(id)?;
        authorize_owner(actor, &job)?;
        transition.check(&mut job.clone())?;
        ensure_not_cancelled(cancel)?;

        transition.persist(self.store.as_ref(), id)?;
        self.store.get_by_id(id)
    }

    pub fn bulk_publish(
        &self,
        ids: &[String],
        actor: Option<&Actor>,
        tenant_id: &str,
        cancel: &CancellationToken,
    ) -> BulkResult {
        self.bulk(Transition::Publish, ids, actor, tenant_id, cancel)
    }

    pub fn bulk_archive(
        &self,
        ids: &[String],
        actor: Option<&Actor>,
        tenant_id: &str,
        cancel: &CancellationToken,
    ) -> BulkResult {
        self.bulk(Transition::Archive, ids, actor, tenant_id, cancel)
    }

    /// Apply `transition` to each distinct id independently. Items never
    /// affect each other; once `cancel` fires, the rest are reported failed
    /// without being written.
    fn bulk(
        &self,
        transition: Transition,
        ids: &[String],
        actor: Option<&Actor>,
        tenant_id: &str,
        cancel: &CancellationToken,
    ) -> BulkResult {
        let ids = distinct_ids(ids);
        let mut result = BulkResult::with_total(ids.len());

        let tenant_mismatch = actor
            .and_then(|a| a.tenant_id.as_deref())
            .is_some_and(|t| t != tenant_id);

        for id in ids {
            let outcome = if cancel.is_cancelled() {
                Err(JobError::Cancelled)
            } else if tenant_mismatch {
                Err(JobError::InsufficientPermissions)
            } else {
                self.apply(transition, actor, id, cancel)
            };

            metrics::record_bulk_item(transition.as_str(), outcome_label(&outcome));
            match outcome {
                Ok(_) => result.succeed(id),
                Err(JobError::Cancelled) => result.fail(id, CANCELLED_REASON),
                Err(JobError::Internal(e)) => {
                    warn!("Bulk {} of job {} failed: {:#}", transition.as_str(), id, e);
                    result.fail(id, INTERNAL_MESSAGE);
                }
                Err(e) => result.fail(id, e.to_string()),
            }
        }

        info!(
            "Bulk {} in tenant {}: {} succeeded, {} failed of {}",
            transition.as_str(),
            tenant_id,
            result.successful.len(),
            result.failed.len(),
            result.total
        );
        result
    }

    pub fn list_jobs(&self, pagination: Pagination, cancel: &CancellationToken) -> JobResult<Page<Job>> {
        ensure_not_cancelled(cancel)?;
        self.store.list(pagination)
    }

    pub fn list_published(
        &self,
        pagination: Pagination,
        cancel: &CancellationToken,
    ) -> JobResult<Page<Job>> {
        ensure_not_cancelled(cancel)?;
        self.store.list_published(pagination)
    }

    pub fn list_archived(
        &self,
        pagination: Pagination,
        cancel: &CancellationToken,
    ) -> JobResult<Page<Job>> {
        ensure_not_cancelled(cancel)?;
        self.store.list_archived(pagination)
    }

    pub fn list_by_user(
        &self,
        owner: &str,
        pagination: Pagination,
        cancel: &CancellationToken,
    ) -> JobResult<Page<Job>> {
        ensure_not_cancelled(cancel)?;
        self.store.list_by_user(owner, pagination)
    }

    pub fn search_jobs(
        &self,
        criteria: &SearchCriteria,
        cancel: &CancellationToken,
    ) -> JobResult<Page<Job>> {
        ensure_not_cancelled(cancel)?;
        self.store.search(criteria)
    }

    pub fn find_by_title(&self, title: &str, cancel: &CancellationToken) -> JobResult<Vec<Job>> {
        ensure_not_cancelled(cancel)?;
        self.store.get_by_title(title)
    }

    pub fn count_by_user(&self, owner: &str, cancel: &CancellationToken) -> JobResult<i64> {
        ensure_not_cancelled(cancel)?;
        self.store.count_by_user(owner)
    }

    pub fn job_stats(&self, id: &str, cancel: &CancellationToken) -> JobResult<JobStats> {
        let job = self.get_job(id, cancel)?;
        Ok(job.stats(timestamp_now()))
    }
}
