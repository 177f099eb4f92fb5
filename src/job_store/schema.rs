//! SQLite schema definitions for the jobs database.

use crate::sqlite_column;
use crate::sqlite_persistence::{
    Column, ForeignKey, ForeignKeyOnChange, SqlType, Table, VersionedSchema,
};

// =============================================================================
// Version 1 - Jobs and applications
// =============================================================================

const JOBS_COLUMNS: &[Column] = &[
    sqlite_column!("id", &SqlType::Text, is_primary_key = true),
    sqlite_column!("title", &SqlType::Text, non_null = true),
    sqlite_column!("description", &SqlType::Text, non_null = true),
    sqlite_column!("position", &SqlType::Text, non_null = true),
    // JSON array of line items
    sqlite_column!(
        "general_requirements",
        &SqlType::Text,
        non_null = true,
        default_value = Some("'[]'")
    ),
    // JSON array of line items
    sqlite_column!(
        "benefits",
        &SqlType::Text,
        non_null = true,
        default_value = Some("'[]'")
    ),
    sqlite_column!("posted_by", &SqlType::Text, non_null = true),
    sqlite_column!("status", &SqlType::Text, non_null = true),
    sqlite_column!("published_at", &SqlType::Text),
    sqlite_column!("archived_at", &SqlType::Text),
    sqlite_column!("created_at", &SqlType::Text, non_null = true),
    sqlite_column!("updated_at", &SqlType::Text, non_null = true),
];

const JOBS_TABLE_V1: Table = Table {
    name: "jobs",
    columns: JOBS_COLUMNS,
    indices: &[],
};

/// Applications are written by the applications subsystem; this crate only
/// counts them. RESTRICT keeps a job with applications from being deleted
/// even if a caller skips the service-level guard.
const JOB_APPLICATIONS_TABLE_V1: Table = Table {
    name: "job_applications",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!(
            "job_id",
            &SqlType::Text,
            non_null = true,
            foreign_key = Some(&ForeignKey {
                foreign_table: "jobs",
                foreign_column: "id",
                on_delete: ForeignKeyOnChange::Restrict,
            })
        ),
        sqlite_column!("applicant_id", &SqlType::Text, non_null = true),
        sqlite_column!("created_at", &SqlType::Text, non_null = true),
    ],
    indices: &[("idx_job_applications_job_id", "job_id")],
};

// =============================================================================
// Version 2 - Listing indices
// =============================================================================

const JOBS_TABLE_V2: Table = Table {
    name: "jobs",
    columns: JOBS_COLUMNS,
    indices: &[
        ("idx_jobs_created_at", "created_at DESC"),
        ("idx_jobs_posted_by_created_at", "posted_by, created_at DESC"),
        ("idx_jobs_status_published_at", "status, published_at DESC"),
        ("idx_jobs_status_archived_at", "status, archived_at DESC"),
    ],
};

fn migrate_v1_to_v2(conn: &rusqlite::Connection) -> anyhow::Result<()> {
    JOBS_TABLE_V2.create_indices(conn)
}

pub const JOB_VERSIONED_SCHEMAS: &[VersionedSchema] = &[
    VersionedSchema {
        version: 1,
        tables: &[JOBS_TABLE_V1, JOB_APPLICATIONS_TABLE_V1],
        migration: None,
    },
    VersionedSchema {
        version: 2,
        tables: &[JOBS_TABLE_V2, JOB_APPLICATIONS_TABLE_V1],
        migration: Some(migrate_v1_to_v2),
    },
];
