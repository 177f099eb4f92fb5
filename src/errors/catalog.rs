use super::{ErrorKind, JobError};
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    NotFound,
    Conflict,
    Business,
    Authorization,
}

/// How one failure kind is presented outside the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    pub code: &'static str,
    pub category: Option<ErrorCategory>,
    pub http_status: u16,
}

/// Entry used for infrastructure failures and anything without a kind.
/// Public message for failures that carry no catalog kind.
pub const INTERNAL_MESSAGE: &str = "Internal server error";

pub const INTERNAL_ERROR: CatalogEntry = CatalogEntry {
    code: "INTERNAL_ERROR",
    category: None,
    http_status: 500,
};

/// A failure ready to be written to a response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedError {
    pub code: &'static str,
    #[serde(skip)]
    pub http_status: u16,
    pub message: String,
}

/// Immutable kind -> (code, category, status) table.
///
/// Built once at startup and shared by reference; nothing mutates it afterwards.
#[derive(Debug, Clone)]
pub struct ErrorCatalog {
    entries: HashMap<ErrorKind, CatalogEntry>,
}

fn default_entry(kind: ErrorKind) -> CatalogEntry {
    let (code, category, http_status) = match kind {
        ErrorKind::NotFound => ("JOB_NOT_FOUND", ErrorCategory::NotFound, 404),
        ErrorKind::AlreadyExists => ("JOB_ALREADY_EXISTS", ErrorCategory::Conflict, 409),
        ErrorKind::AlreadyArchived => ("JOB_ALREADY_ARCHIVED", ErrorCategory::Business, 422),
        ErrorKind::NotArchived => ("JOB_NOT_ARCHIVED", ErrorCategory::Business, 422),
        ErrorKind::AlreadyPublished => ("JOB_ALREADY_PUBLISHED", ErrorCategory::Business, 422),
        ErrorKind::CannotPublish => ("JOB_CANNOT_PUBLISH", ErrorCategory::Business, 422),
        ErrorKind::JobArchived => ("JOB_ARCHIVED", ErrorCategory::Business, 422),
        ErrorKind::HasApplications => ("JOB_HAS_APPLICATIONS", ErrorCategory::Conflict, 409),
        ErrorKind::InvalidJob => ("JOB_INVALID", ErrorCategory::Business, 400),
        ErrorKind::InsufficientPermissions => (
            "INSUFFICIENT_PERMISSIONS",
            ErrorCategory::Authorization,
            403,
        ),
        ErrorKind::UnauthorizedUpdate => {
            ("UNAUTHORIZED_UPDATE", ErrorCategory::Authorization, 403)
        }
    };
    CatalogEntry {
        code,
        category: Some(category),
        http_status,
    }
}

impl ErrorCatalog {
    pub fn new() -> Self {
        let entries = ErrorKind::ALL
            .iter()
            .map(|kind| (*kind, default_entry(*kind)))
            .collect();
        Self { entries }
    }

    pub fn entry(&self, kind: ErrorKind) -> &CatalogEntry {
        self.entries.get(&kind).unwrap_or(&INTERNAL_ERROR)
    }

    /// Look up the entry for an error. Errors without a kind get [`INTERNAL_ERROR`].
    pub fn entry_for(&self, error: &JobError) -> &CatalogEntry {
        match error.kind() {
            Some(kind) => self.entry(kind),
            None => &INTERNAL_ERROR,
        }
    }

    /// Internal failures never leak their message.
    pub fn render(&self, error: &JobError) -> RenderedError {
        let entry = self.entry_for(error);
        let message = match entry.category {
            Some(_) => error.to_string(),
            None => INTERNAL_MESSAGE.to_string(),
        };
        RenderedError {
            code: entry.code,
            http_status: entry.http_status,
            message,
        }
    }
}

impl Default for ErrorCatalog {
    fn default() -> Self {
        Self::new()
    }
}
