//! The job-posting aggregate.
//!
//! Transitions here are pure in-memory rules. They know nothing about
//! concurrent callers; the store's conditional writes are what keep racing
//! transitions safe.

use crate::errors::{JobError, JobResult};
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Current time at the precision timestamps are persisted with (microseconds).
pub fn timestamp_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Lifecycle status of a job posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Draft,
    Published,
    Closed,
    Archived,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Draft => "DRAFT",
            JobStatus::Published => "PUBLISHED",
            JobStatus::Closed => "CLOSED",
            JobStatus::Archived => "ARCHIVED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "DRAFT" => Some(JobStatus::Draft),
            "PUBLISHED" => Some(JobStatus::Published),
            "CLOSED" => Some(JobStatus::Closed),
            "ARCHIVED" => Some(JobStatus::Archived),
            _ => None,
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of a requirements or benefits list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

impl LineItem {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }
}

/// A job posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub title: String,
    pub description: String,
    pub position: String,
    /// Display order is significant.
    pub general_requirements: Vec<LineItem>,
    /// Display order is significant.
    pub benefits: Vec<LineItem>,
    /// Owning user, never reassigned.
    pub posted_by: String,
    pub status: JobStatus,
    /// First publication time. Kept through unpublish and close.
    pub published_at: Option<DateTime<Utc>>,
    /// Set exactly while the job is archived.
    pub archived_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Caller-supplied content for a new job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewJob {
    pub title: String,
    pub description: String,
    pub position: String,
    #[serde(default)]
    pub general_requirements: Vec<LineItem>,
    #[serde(default)]
    pub benefits: Vec<LineItem>,
}

/// Partial detail update. Only non-empty values overwrite.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobDetailsUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub position: Option<String>,
    pub general_requirements: Option<Vec<LineItem>>,
    pub benefits: Option<Vec<LineItem>>,
}

/// Read-only projection of a job's lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobStats {
    pub job_id: String,
    pub status: JobStatus,
    pub is_published: bool,
    pub is_archived: bool,
    pub days_since_published: Option<i64>,
    pub days_since_archived: Option<i64>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

impl Job {
    /// Create a new draft job owned by `posted_by`.
    pub fn new(
        id: impl Into<String>,
        posted_by: impl Into<String>,
        content: NewJob,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            title: content.title,
            description: content.description,
            position: content.position,
            general_requirements: content.general_requirements,
            benefits: content.benefits,
            posted_by: posted_by.into(),
            status: JobStatus::Draft,
            published_at: None,
            archived_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check the required text attributes.
    pub fn validate(&self) -> JobResult<()> {
        let missing: Vec<&str> = [
            ("title", &self.title),
            ("description", &self.description),
            ("position", &self.position),
        ]
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(JobError::InvalidJob(format!(
                "missing required field(s): {}",
                missing.join(", ")
            )))
        }
    }

    pub fn is_archived(&self) -> bool {
        self.status == JobStatus::Archived
    }

    pub fn is_published(&self) -> bool {
        self.status == JobStatus::Published
    }

    /// DRAFT -> PUBLISHED. `published_at` is only set the first time.
    pub fn publish(&mut self, now: DateTime<Utc>) -> JobResult<()> {
        if self.status != JobStatus::Draft {
            return Err(JobError::CannotPublish {
                id: self.id.clone(),
                status: self.status,
            });
        }
        self.status = JobStatus::Published;
        if self.published_at.is_none() {
            self.published_at = Some(now);
        }
        self.updated_at = now;
        Ok(())
    }

    pub fn unpublish(&mut self, now: DateTime<Utc>) {
        self.status = JobStatus::Draft;
        self.updated_at = now;
    }

    /// Reachable from any status. Leaving ARCHIVED drops `archived_at`.
    pub fn close(&mut self, now: DateTime<Utc>) {
        self.status = JobStatus::Closed;
        self.archived_at = None;
        self.updated_at = now;
    }

    pub fn archive(&mut self, now: DateTime<Utc>) -> JobResult<()> {
        if self.is_archived() {
            return Err(JobError::AlreadyArchived(self.id.clone()));
        }
        self.status = JobStatus::Archived;
        self.archived_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    pub fn unarchive(&mut self, now: DateTime<Utc>) -> JobResult<()> {
        if !self.is_archived() {
            return Err(JobError::NotArchived(self.id.clone()));
        }
        self.status = JobStatus::Draft;
        self.archived_at = None;
        self.updated_at = now;
        Ok(())
    }

    /// Overwrite the supplied non-empty fields.
    ///
    /// The caller must reject archived jobs before calling this.
    pub fn update_details(&mut self, update: JobDetailsUpdate, now: DateTime<Utc>) {
        if let Some(title) = non_blank(update.title) {
            self.title = title;
        }
        if let Some(description) = non_blank(update.description) {
            self.description = description;
        }
        if let Some(position) = non_blank(update.position) {
            self.position = position;
        }
        if let Some(requirements) = update.general_requirements.filter(|r| !r.is_empty()) {
            self.general_requirements = requirements;
        }
        if let Some(benefits) = update.benefits.filter(|b| !b.is_empty()) {
            self.benefits = benefits;
        }
        self.updated_at = now;
    }

    pub fn stats(&self, now: DateTime<Utc>) -> JobStats {
        JobStats {
            job_id: self.id.clone(),
            status: self.status,
            is_published: self.is_published(),
            is_archived: self.is_archived(),
            days_since_published: self.published_at.map(|t| (now - t).num_days()),
            days_since_archived: self.archived_at.map(|t| (now - t).num_days()),
        }
    }
}
