use super::RequestsLoggingLevel;
use crate::job_store::PageLimits;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub requests_logging_level: RequestsLoggingLevel,
    pub port: u16,
    pub metrics_port: u16,
    /// Clamping applied to `page`/`page_size` query parameters.
    pub page_limits: PageLimits,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            requests_logging_level: RequestsLoggingLevel::Path,
            port: 3001,
            metrics_port: 9091,
            page_limits: PageLimits::default(),
        }
    }
}
