//! Common test infrastructure
//!
//! Tests should only import from this module, not from internal submodules.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{TestServer, TestClient};
//!
//! #[tokio::test]
//! async fn test_create_job() {
//!     let server = TestServer::spawn().await;
//!     let client = TestClient::recruiter(&server.base_url);
//!
//!     let job = client.create_job_ok("Engineer").await;
//!     assert_eq!(job["status"], "DRAFT");
//! }
//! ```

mod client;
mod constants;
mod server;

pub use client::{error_code, TestClient};
pub use constants::*;
pub use server::TestServer;
