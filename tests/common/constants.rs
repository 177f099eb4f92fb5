//! Shared constants for end-to-end tests

/// Recruiter who owns most fixtures
pub const RECRUITER: &str = "recruiter-1";

/// A second recruiter, used for ownership checks
pub const OTHER_RECRUITER: &str = "recruiter-2";

/// Admin allowed to manage every job
pub const ADMIN: &str = "admin-1";

/// Read-only user
pub const VIEWER: &str = "viewer-1";

/// Tenant every test actor belongs to
pub const TENANT: &str = "acme";

/// Request timeout for the test HTTP client
pub const REQUEST_TIMEOUT_SECS: u64 = 5;

/// How long to wait for the server to accept requests
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Delay between readiness probes
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 20;
