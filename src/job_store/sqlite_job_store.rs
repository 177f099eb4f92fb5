use super::pagination::{Page, Pagination, SearchCriteria};
use super::schema::JOB_VERSIONED_SCHEMAS;
use super::JobStore;
use crate::errors::{JobError, JobResult};
use crate::job::{timestamp_now, Job, JobStatus, LineItem};
use crate::sqlite_persistence::open_versioned;
use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, ToSql};
use std::path::Path;
use std::sync::{Arc, Mutex};

const JOB_COLUMNS: &str = "id, title, description, position, general_requirements, benefits, \
     posted_by, status, published_at, archived_at, created_at, updated_at";

pub struct SqliteJobStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteJobStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = open_versioned(db_path, JOB_VERSIONED_SCHEMAS, "jobs")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Record an application against a job. Returns the application row id.
    ///
    /// Applications are owned by another subsystem; this exists so that the
    /// delete guard has something to count.
    pub fn insert_application(&self, job_id: &str, applicant_id: &str) -> JobResult<i64> {
        let conn = self.conn.lock().unwrap();
        let inserted = conn
            .execute(
                "INSERT INTO job_applications (job_id, applicant_id, created_at)
                 SELECT ?1, ?2, ?3 WHERE EXISTS (SELECT 1 FROM jobs WHERE id = ?1)",
                params![job_id, applicant_id, format_datetime(&timestamp_now())],
            )
            .context("Failed to insert job application")?;
        if inserted == 0 {
            return Err(JobError::NotFound(job_id.to_string()));
        }
        Ok(conn.last_insert_rowid())
    }

    fn row_to_job(row: &rusqlite::Row) -> rusqlite::Result<Job> {
        let status_str: String = row.get("status")?;
        let status = JobStatus::parse(&status_str).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                7,
                Type::Text,
                format!("unknown job status {}", status_str).into(),
            )
        })?;

        Ok(Job {
            id: row.get("id")?,
            title: row.get("title")?,
            description: row.get("description")?,
            position: row.get("position")?,
            general_requirements: read_line_items(row, "general_requirements")?,
            benefits: read_line_items(row, "benefits")?,
            posted_by: row.get("posted_by")?,
            status,
            published_at: read_optional_datetime(row, "published_at")?,
            archived_at: read_optional_datetime(row, "archived_at")?,
            created_at: read_datetime(row, "created_at")?,
            updated_at: read_datetime(row, "updated_at")?,
        })
    }

    /// Count the rows matching `filter`, then load one page of them.
    ///
    /// `filter` is either empty or starts with `WHERE`, and uses anonymous
    /// `?` placeholders bound from `params` in order.
    fn fetch_page(
        &self,
        filter: &str,
        mut params: Vec<Box<dyn ToSql>>,
        order_by: &str,
        pagination: Pagination,
    ) -> Result<Page<Job>> {
        let conn = self.conn.lock().unwrap();

        let count_sql = format!("SELECT COUNT(*) FROM jobs {}", filter);
        let param_refs: Vec<&dyn ToSql> = params.iter().map(|p| p.as_ref()).collect();
        let total: i64 = conn
            .query_row(&count_sql, param_refs.as_slice(), |row| row.get(0))
            .context("Failed to count jobs")?;

        params.push(Box::new(pagination.limit()));
        params.push(Box::new(pagination.offset()));
        let page_sql = format!(
            "SELECT {} FROM jobs {} ORDER BY {}, rowid DESC LIMIT ? OFFSET ?",
            JOB_COLUMNS, filter, order_by
        );
        let param_refs: Vec<&dyn ToSql> = params.iter().map(|p| p.as_ref()).collect();
        let mut stmt = conn.prepare(&page_sql)?;
        let items = stmt
            .query_map(param_refs.as_slice(), Self::row_to_job)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to load jobs page")?;

        Ok(Page::new(items, pagination, total))
    }

    /// Run a status-guarded update. Zero affected rows means the job is
    /// missing or not in a status the write accepts.
    fn transition(&self, id: &str, sql: &str, operation: &str) -> JobResult<()> {
        let now = format_datetime(&timestamp_now());
        let conn = self.conn.lock().unwrap();
        let updated = conn
            .execute(sql, params![id, now])
            .with_context(|| format!("Failed to {} job {}", operation, id))?;
        if updated == 0 {
            return Err(JobError::NotFound(id.to_string()));
        }
        Ok(())
    }
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    // Fixed width keeps lexicographic order equal to chronological order.
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn conversion_error<E>(row: &rusqlite::Row, column: &str, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    let index = row.as_ref().column_index(column).unwrap_or_default();
    rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(err))
}

fn read_datetime(row: &rusqlite::Row, column: &str) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(column)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(row, column, e))
}

fn read_optional_datetime(
    row: &rusqlite::Row,
    column: &str,
) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let raw: Option<String> = row.get(column)?;
    raw.map(|s| {
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| conversion_error(row, column, e))
    })
    .transpose()
}

fn read_line_items(row: &rusqlite::Row, column: &str) -> rusqlite::Result<Vec<LineItem>> {
    let raw: String = row.get(column)?;
    serde_json::from_str(&raw).map_err(|e| conversion_error(row, column, e))
}

fn encode_line_items(items: &[LineItem]) -> Result<String> {
    serde_json::to_string(items).context("Failed to encode line items")
}

/// Escape LIKE wildcards so user input only ever matches literally.
fn like_pattern(value: &str) -> String {
    let escaped = value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

impl JobStore for SqliteJobStore {
    fn create(&self, job: &Job) -> JobResult<()> {
        let requirements = encode_line_items(&job.general_requirements)?;
        let benefits = encode_line_items(&job.benefits)?;

        let conn = self.conn.lock().unwrap();
        let inserted = conn
            .execute(
                &format!(
                    "INSERT OR IGNORE INTO jobs ({}) \
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                    JOB_COLUMNS
                ),
                params![
                    job.id,
                    job.title,
                    job.description,
                    job.position,
                    requirements,
                    benefits,
                    job.posted_by,
                    job.status.as_str(),
                    job.published_at.as_ref().map(format_datetime),
                    job.archived_at.as_ref().map(format_datetime),
                    format_datetime(&job.created_at),
                    format_datetime(&job.updated_at),
                ],
            )
            .with_context(|| format!("Failed to insert job {}", job.id))?;
        if inserted == 0 {
            return Err(JobError::AlreadyExists(job.id.clone()));
        }
        Ok(())
    }

    fn update(&self, id: &str, job: &Job) -> JobResult<()> {
        let requirements = encode_line_items(&job.general_requirements)?;
        let benefits = encode_line_items(&job.benefits)?;

        let conn = self.conn.lock().unwrap();
        let updated = conn
            .execute(
                "UPDATE jobs SET title = ?1, description = ?2, position = ?3,
                     general_requirements = ?4, benefits = ?5, updated_at = ?6
                 WHERE id = ?7 AND status != 'ARCHIVED'",
                params![
                    job.title,
                    job.description,
                    job.position,
                    requirements,
                    benefits,
                    format_datetime(&job.updated_at),
                    id,
                ],
            )
            .with_context(|| format!("Failed to update job {}", id))?;
        if updated == 0 {
            return Err(JobError::NotFound(id.to_string()));
        }
        Ok(())
    }

    fn get_by_id(&self, id: &str) -> JobResult<Job> {
        let conn = self.conn.lock().unwrap();
        let job = conn
            .query_row(
                &format!("SELECT {} FROM jobs WHERE id = ?1", JOB_COLUMNS),
                params![id],
                Self::row_to_job,
            )
            .optional()
            .with_context(|| format!("Failed to load job {}", id))?;
        job.ok_or_else(|| JobError::NotFound(id.to_string()))
    }

    fn delete(&self, id: &str) -> JobResult<()> {
        let conn = self.conn.lock().unwrap();
        let deleted = conn
            .execute(
                "DELETE FROM jobs WHERE id = ?1
                 AND NOT EXISTS (SELECT 1 FROM job_applications WHERE job_id = ?1)",
                params![id],
            )
            .with_context(|| format!("Failed to delete job {}", id))?;
        if deleted > 0 {
            return Ok(());
        }

        let applications: Option<i64> = conn
            .query_row(
                "SELECT (SELECT COUNT(*) FROM job_applications WHERE job_id = ?1)
                 FROM jobs WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()
            .with_context(|| format!("Failed to check job {} after delete", id))?;
        match applications {
            Some(count) => Err(JobError::HasApplications {
                id: id.to_string(),
                count,
            }),
            None => Err(JobError::NotFound(id.to_string())),
        }
    }

    fn exists(&self, id: &str) -> JobResult<bool> {
        let conn = self.conn.lock().unwrap();
        let exists: bool = conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM jobs WHERE id = ?1)",
                params![id],
                |row| row.get(0),
            )
            .with_context(|| format!("Failed to check job {}", id))?;
        Ok(exists)
    }

    fn list(&self, pagination: Pagination) -> JobResult<Page<Job>> {
        Ok(self.fetch_page("", vec![], "created_at DESC", pagination)?)
    }

    fn list_by_user(&self, owner: &str, pagination: Pagination) -> JobResult<Page<Job>> {
        Ok(self.fetch_page(
            "WHERE posted_by = ?",
            vec![Box::new(owner.to_string())],
            "created_at DESC",
            pagination,
        )?)
    }

    fn list_published(&self, pagination: Pagination) -> JobResult<Page<Job>> {
        Ok(self.fetch_page(
            "WHERE status = 'PUBLISHED'",
            vec![],
            "published_at DESC",
            pagination,
        )?)
    }

    fn list_archived(&self, pagination: Pagination) -> JobResult<Page<Job>> {
        Ok(self.fetch_page(
            "WHERE status = 'ARCHIVED'",
            vec![],
            "archived_at DESC",
            pagination,
        )?)
    }

    fn search(&self, criteria: &SearchCriteria) -> JobResult<Page<Job>> {
        let mut conditions: Vec<&str> = Vec::new();
        let mut params: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(query) = non_blank(&criteria.query) {
            conditions.push(
                "(title LIKE ? ESCAPE '\\' OR description LIKE ? ESCAPE '\\' \
                 OR position LIKE ? ESCAPE '\\')",
            );
            let pattern = like_pattern(query);
            params.push(Box::new(pattern.clone()));
            params.push(Box::new(pattern.clone()));
            params.push(Box::new(pattern));
        }
        if let Some(title) = non_blank(&criteria.title) {
            conditions.push("title LIKE ? ESCAPE '\\'");
            params.push(Box::new(like_pattern(title)));
        }
        if let Some(position) = non_blank(&criteria.position) {
            conditions.push("position LIKE ? ESCAPE '\\'");
            params.push(Box::new(like_pattern(position)));
        }
        if let Some(owner) = non_blank(&criteria.posted_by) {
            conditions.push("posted_by = ?");
            params.push(Box::new(owner.to_string()));
        }

        let filter = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };
        Ok(self.fetch_page(&filter, params, "created_at DESC", criteria.pagination)?)
    }

    fn get_by_title(&self, title: &str) -> JobResult<Vec<Job>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM jobs WHERE title LIKE ?1 ESCAPE '\\' \
                 ORDER BY created_at DESC, rowid DESC",
                JOB_COLUMNS
            ))
            .context("Failed to prepare title lookup")?;
        let jobs = stmt
            .query_map(params![like_pattern(title)], Self::row_to_job)
            .context("Failed to query jobs by title")?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to read jobs by title")?;
        Ok(jobs)
    }

    fn publish(&self, id: &str) -> JobResult<()> {
        self.transition(
            id,
            "UPDATE jobs SET status = 'PUBLISHED', published_at = COALESCE(published_at, ?2),
                 updated_at = ?2
             WHERE id = ?1 AND status = 'DRAFT'",
            "publish",
        )
    }

    fn unpublish(&self, id: &str) -> JobResult<()> {
        self.transition(
            id,
            "UPDATE jobs SET status = 'DRAFT', updated_at = ?2
             WHERE id = ?1 AND status = 'PUBLISHED'",
            "unpublish",
        )
    }

    fn close(&self, id: &str) -> JobResult<()> {
        self.transition(
            id,
            "UPDATE jobs SET status = 'CLOSED', archived_at = NULL, updated_at = ?2
             WHERE id = ?1",
            "close",
        )
    }

    fn archive(&self, id: &str) -> JobResult<()> {
        self.transition(
            id,
            "UPDATE jobs SET status = 'ARCHIVED', archived_at = ?2, updated_at = ?2
             WHERE id = ?1 AND status != 'ARCHIVED'",
            "archive",
        )
    }

    fn unarchive(&self, id: &str) -> JobResult<()> {
        self.transition(
            id,
            "UPDATE jobs SET status = 'DRAFT', archived_at = NULL, updated_at = ?2
             WHERE id = ?1 AND status = 'ARCHIVED'",
            "unarchive",
        )
    }

    fn count_by_user(&self, owner: &str) -> JobResult<i64> {
        let conn = self.conn.lock().unwrap();
        let count = conn
            .query_row(
                "SELECT COUNT(*) FROM jobs WHERE posted_by = ?1",
                params![owner],
                |row| row.get(0),
            )
            .with_context(|| format!("Failed to count jobs for {}", owner))?;
        Ok(count)
    }

    fn count_applications(&self, job_id: &str) -> JobResult<i64> {
        let conn = self.conn.lock().unwrap();
        let count = conn
            .query_row(
                "SELECT COUNT(*) FROM job_applications WHERE job_id = ?1",
                params![job_id],
                |row| row.get(0),
            )
            .with_context(|| format!("Failed to count applications for {}", job_id))?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::NewJob;
    use chrono::Duration;
    use std::sync::Barrier;
    use std::thread;
    use tempfile::TempDir;

    struct TestStore {
        store: SqliteJobStore,
        _temp_dir: TempDir,
    }

    fn create_test_store() -> TestStore {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("jobs.db");
        let store = SqliteJobStore::new(&db_path).unwrap();
        TestStore {
            store,
            _temp_dir: temp_dir,
        }
    }

    fn make_job(id: &str, owner: &str, title: &str) -> Job {
        Job::new(
            id,
            owner,
            NewJob {
                title: title.to_string(),
                description: format!("{} description", title),
                position: "Full-time".to_string(),
                general_requirements: vec![
                    LineItem::new("Rust", "3+ years"),
                    LineItem::new("SQL", ""),
                ],
                benefits: vec![LineItem::new("Remote", "Fully remote")],
            },
            timestamp_now(),
        )
    }

    /// Insert `job` with a creation time `offset_secs` after a fixed base so
    /// listing order is deterministic.
    fn insert_at(store: &SqliteJobStore, mut job: Job, offset_secs: i64) {
        let base = DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        job.created_at = base + Duration::seconds(offset_secs);
        job.updated_at = job.created_at;
        store.create(&job).unwrap();
    }

    #[test]
    fn test_create_and_get_round_trip() {
        let test = create_test_store();
        let store = &test.store;

        let job = make_job("job-1", "user-1", "Backend Engineer");
        store.create(&job).unwrap();

        let loaded = store.get_by_id("job-1").unwrap();
        assert_eq!(loaded, job);
        assert!(store.exists("job-1").unwrap());
        assert!(!store.exists("job-2").unwrap());
    }

    #[test]
    fn test_empty_lists_round_trip_as_empty() {
        let test = create_test_store();
        let mut job = make_job("job-1", "user-1", "Designer");
        job.general_requirements.clear();
        job.benefits.clear();
        test.store.create(&job).unwrap();

        let loaded = test.store.get_by_id("job-1").unwrap();
        assert!(loaded.general_requirements.is_empty());
        assert!(loaded.benefits.is_empty());
    }

    #[test]
    fn test_create_duplicate_id_fails() {
        let test = create_test_store();
        let job = make_job("job-1", "user-1", "Backend Engineer");
        test.store.create(&job).unwrap();

        let err = test.store.create(&job).unwrap_err();
        assert!(matches!(err, JobError::AlreadyExists(id) if id == "job-1"));
    }

    #[test]
    fn test_missing_job_is_not_found() {
        let test = create_test_store();
        let store = &test.store;
        assert!(matches!(store.get_by_id("nope"), Err(JobError::NotFound(_))));
        assert!(matches!(store.delete("nope"), Err(JobError::NotFound(_))));
        assert!(matches!(store.publish("nope"), Err(JobError::NotFound(_))));
        assert!(matches!(store.close("nope"), Err(JobError::NotFound(_))));
    }

    #[test]
    fn test_update_overwrites_details_only() {
        let test = create_test_store();
        let store = &test.store;
        let job = make_job("job-1", "user-1", "Backend Engineer");
        store.create(&job).unwrap();

        let mut changed = job.clone();
        changed.title = "Platform Engineer".to_string();
        changed.benefits = vec![LineItem::new("Gym", "")];
        changed.status = JobStatus::Published;
        changed.updated_at = job.updated_at + Duration::seconds(30);
        store.update("job-1", &changed).unwrap();

        let loaded = store.get_by_id("job-1").unwrap();
        assert_eq!(loaded.title, "Platform Engineer");
        assert_eq!(loaded.benefits, vec![LineItem::new("Gym", "")]);
        assert_eq!(loaded.status, JobStatus::Draft);
        assert_eq!(loaded.updated_at, changed.updated_at);
        assert_eq!(loaded.created_at, job.created_at);
    }

    #[test]
    fn test_update_does_not_touch_archived_job() {
        let test = create_test_store();
        let store = &test.store;
        let job = make_job("job-1", "user-1", "Backend Engineer");
        store.create(&job).unwrap();
        store.archive("job-1").unwrap();

        let mut changed = job.clone();
        changed.title = "Changed".to_string();
        let err = store.update("job-1", &changed).unwrap_err();
        assert!(matches!(err, JobError::NotFound(_)));
        assert_eq!(store.get_by_id("job-1").unwrap().title, "Backend Engineer");
    }

    #[test]
    fn test_publish_is_conditional_on_draft() {
        let test = create_test_store();
        let store = &test.store;
        store.create(&make_job("job-1", "user-1", "Engineer")).unwrap();

        store.publish("job-1").unwrap();
        let published = store.get_by_id("job-1").unwrap();
        assert_eq!(published.status, JobStatus::Published);
        let first_published_at = published.published_at.unwrap();

        // Second publish matches no row.
        assert!(matches!(store.publish("job-1"), Err(JobError::NotFound(_))));

        // Closed and archived jobs cannot be published either.
        store.close("job-1").unwrap();
        assert!(matches!(store.publish("job-1"), Err(JobError::NotFound(_))));
        store.archive("job-1").unwrap();
        assert!(matches!(store.publish("job-1"), Err(JobError::NotFound(_))));

        // Back to draft, republish keeps the first publication time.
        store.unarchive("job-1").unwrap();
        store.publish("job-1").unwrap();
        let republished = store.get_by_id("job-1").unwrap();
        assert_eq!(republished.published_at, Some(first_published_at));
    }

    #[test]
    fn test_unpublish_requires_published() {
        let test = create_test_store();
        let store = &test.store;
        store.create(&make_job("job-1", "user-1", "Engineer")).unwrap();

        assert!(matches!(store.unpublish("job-1"), Err(JobError::NotFound(_))));
        store.publish("job-1").unwrap();
        store.unpublish("job-1").unwrap();

        let job = store.get_by_id("job-1").unwrap();
        assert_eq!(job.status, JobStatus::Draft);
        assert!(job.published_at.is_some());
    }

    #[test]
    fn test_archive_and_unarchive() {
        let test = create_test_store();
        let store = &test.store;
        store.create(&make_job("job-1", "user-1", "Engineer")).unwrap();

        assert!(matches!(store.unarchive("job-1"), Err(JobError::NotFound(_))));

        store.archive("job-1").unwrap();
        let archived = store.get_by_id("job-1").unwrap();
        assert_eq!(archived.status, JobStatus::Archived);
        assert!(archived.archived_at.is_some());
        assert!(matches!(store.archive("job-1"), Err(JobError::NotFound(_))));

        store.unarchive("job-1").unwrap();
        let restored = store.get_by_id("job-1").unwrap();
        assert_eq!(restored.status, JobStatus::Draft);
        assert!(restored.archived_at.is_none());
    }

    #[test]
    fn test_close_from_archived_clears_archived_at() {
        let test = create_test_store();
        let store = &test.store;
        store.create(&make_job("job-1", "user-1", "Engineer")).unwrap();
        store.archive("job-1").unwrap();
        store.close("job-1").unwrap();

        let job = store.get_by_id("job-1").unwrap();
        assert_eq!(job.status, JobStatus::Closed);
        assert!(job.archived_at.is_none());
    }

    #[test]
    fn test_concurrent_publish_has_one_winner() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("jobs.db");
        let first = SqliteJobStore::new(&db_path).unwrap();
        first.create(&make_job("job-1", "user-1", "Engineer")).unwrap();
        let second = SqliteJobStore::new(&db_path).unwrap();

        let stores = [Arc::new(first), Arc::new(second)];
        let barrier = Arc::new(Barrier::new(stores.len()));
        let handles: Vec<_> = stores
            .iter()
            .map(|store| {
                let store = store.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    store.publish("job-1")
                })
            })
            .collect();

        let results: Vec<JobResult<()>> =
            handles.into_iter().map(|h| h.join().unwrap()).collect();
        let winners = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(winners, 1);
        assert!(results
            .iter()
            .any(|r| matches!(r, Err(JobError::NotFound(_)))));

        let job = stores[0].get_by_id("job-1").unwrap();
        assert_eq!(job.status, JobStatus::Published);
        assert!(job.published_at.is_some());
    }

    #[test]
    fn test_list_orders_newest_first_and_paginates() {
        let test = create_test_store();
        let store = &test.store;
        for i in 0..45 {
            insert_at(store, make_job(&format!("job-{:02}", i), "user-1", "Engineer"), i);
        }

        let page = store.list(Pagination::new(1, 20)).unwrap();
        assert_eq!(page.total, 45);
        assert_eq!(page.page_count, 3);
        assert_eq!(page.items.len(), 20);
        assert_eq!(page.items[0].id, "job-44");

        let last = store.list(Pagination::new(3, 20)).unwrap();
        assert_eq!(last.items.len(), 5);
        assert_eq!(last.items[4].id, "job-00");

        let beyond = store.list(Pagination::new(4, 20)).unwrap();
        assert!(beyond.empty);
        assert_eq!(beyond.total, 45);
    }

    #[test]
    fn test_empty_store_lists_empty_page() {
        let test = create_test_store();
        let page = test.store.list(Pagination::default()).unwrap();
        assert!(page.empty);
        assert_eq!(page.total, 0);
        assert_eq!(page.page_count, 0);
    }

    #[test]
    fn test_filtered_listings() {
        let test = create_test_store();
        let store = &test.store;
        insert_at(store, make_job("a", "user-1", "Engineer"), 0);
        insert_at(store, make_job("b", "user-2", "Designer"), 1);
        insert_at(store, make_job("c", "user-1", "Manager"), 2);

        store.publish("a").unwrap();
        store.publish("b").unwrap();
        store.archive("c").unwrap();

        let by_user = store.list_by_user("user-1", Pagination::default()).unwrap();
        let ids: Vec<&str> = by_user.items.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a"]);

        let published = store.list_published(Pagination::default()).unwrap();
        assert_eq!(published.total, 2);
        assert!(published.items.iter().all(|j| j.is_published()));
        // Same publication microsecond is possible, rowid breaks the tie.
        assert_eq!(published.items[0].id, "b");

        let archived = store.list_archived(Pagination::default()).unwrap();
        assert_eq!(archived.total, 1);
        assert_eq!(archived.items[0].id, "c");

        assert_eq!(store.count_by_user("user-1").unwrap(), 2);
        assert_eq!(store.count_by_user("user-3").unwrap(), 0);
    }

    #[test]
    fn test_search_is_conjunctive() {
        let test = create_test_store();
        let store = &test.store;
        insert_at(store, make_job("a", "u1", "Senior Engineer"), 0);
        insert_at(store, make_job("b", "u2", "Engineer"), 1);
        insert_at(store, make_job("c", "u1", "Designer"), 2);

        let both = store
            .search(&SearchCriteria {
                title: Some("Engineer".into()),
                posted_by: Some("u1".into()),
                ..Default::default()
            })
            .unwrap();
        let ids: Vec<&str> = both.items.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(ids, vec!["a"]);

        let title_only = store
            .search(&SearchCriteria {
                title: Some("engineer".into()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(title_only.total, 2);

        let everything = store
            .search(&SearchCriteria {
                query: Some("   ".into()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(everything.total, 3);
    }

    #[test]
    fn test_search_query_spans_text_fields() {
        let test = create_test_store();
        let store = &test.store;
        let mut job = make_job("a", "u1", "Engineer");
        job.description = "Work on the payments ledger".into();
        insert_at(store, job, 0);
        let mut job = make_job("b", "u1", "Analyst");
        job.position = "Contract".into();
        insert_at(store, job, 1);

        let by_description = store
            .search(&SearchCriteria {
                query: Some("ledger".into()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(by_description.items[0].id, "a");
        assert_eq!(by_description.total, 1);

        let by_position = store
            .search(&SearchCriteria {
                query: Some("contract".into()),
                position: Some("Contr".into()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(by_position.total, 1);
        assert_eq!(by_position.items[0].id, "b");
    }

    #[test]
    fn test_search_treats_wildcards_literally() {
        let test = create_test_store();
        let store = &test.store;
        insert_at(store, make_job("a", "u1", "100% Remote"), 0);
        insert_at(store, make_job("b", "u1", "Onsite"), 1);

        let literal = store
            .search(&SearchCriteria {
                title: Some("%".into()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(literal.total, 1);
        assert_eq!(literal.items[0].id, "a");

        let underscore = store.get_by_title("_").unwrap();
        assert!(underscore.is_empty());
    }

    #[test]
    fn test_get_by_title() {
        let test = create_test_store();
        let store = &test.store;
        insert_at(store, make_job("a", "u1", "Rust Engineer"), 0);
        insert_at(store, make_job("b", "u2", "Go Engineer"), 1);
        insert_at(store, make_job("c", "u2", "Designer"), 2);

        let found = store.get_by_title("Engineer").unwrap();
        let ids: Vec<&str> = found.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn test_applications_block_delete() {
        let test = create_test_store();
        let store = &test.store;
        store.create(&make_job("job-1", "user-1", "Engineer")).unwrap();

        assert_eq!(store.count_applications("job-1").unwrap(), 0);
        store.insert_application("job-1", "applicant-1").unwrap();
        store.insert_application("job-1", "applicant-2").unwrap();
        assert_eq!(store.count_applications("job-1").unwrap(), 2);

        let err = store.delete("job-1").unwrap_err();
        assert!(matches!(err, JobError::HasApplications { count: 2, .. }));
        assert!(store.exists("job-1").unwrap());

        let err = store.delete("missing").unwrap_err();
        assert!(matches!(err, JobError::NotFound(_)));

        assert!(matches!(
            store.insert_application("missing", "applicant-1"),
            Err(JobError::NotFound(_))
        ));
    }

    #[test]
    fn test_delete_removes_row() {
        let test = create_test_store();
        let store = &test.store;
        store.create(&make_job("job-1", "user-1", "Engineer")).unwrap();
        store.delete("job-1").unwrap();
        assert!(!store.exists("job-1").unwrap());
    }

    #[test]
    fn test_reopen_existing_database() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("jobs.db");
        {
            let store = SqliteJobStore::new(&db_path).unwrap();
            store.create(&make_job("job-1", "user-1", "Engineer")).unwrap();
        }
        let store = SqliteJobStore::new(&db_path).unwrap();
        assert!(store.exists("job-1").unwrap());
    }

    #[test]
    fn test_v1_database_is_migrated() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("jobs.db");
        {
            let conn = Connection::open(&db_path).unwrap();
            JOB_VERSIONED_SCHEMAS[0].create(&conn).unwrap();
        }

        let store = SqliteJobStore::new(&db_path).unwrap();
        store.create(&make_job("job-1", "user-1", "Engineer")).unwrap();

        let conn = store.conn.lock().unwrap();
        JOB_VERSIONED_SCHEMAS.last().unwrap().validate(&conn).unwrap();
    }
}
