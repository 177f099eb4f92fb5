use crate::errors::ErrorCatalog;
use crate::jobs::JobService;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

use super::ServerConfig;

pub type GuardedJobService = Arc<JobService>;
pub type GuardedErrorCatalog = Arc<ErrorCatalog>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub job_service: GuardedJobService,
    pub error_catalog: GuardedErrorCatalog,
    /// Cancelled when the process shuts down; handlers derive per-request
    /// tokens from it.
    pub shutdown: CancellationToken,
}

impl ServerState {
    pub fn new(
        config: ServerConfig,
        job_service: GuardedJobService,
        error_catalog: GuardedErrorCatalog,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            config,
            start_time: Instant::now(),
            job_service,
            error_catalog,
            shutdown,
        }
    }
}
