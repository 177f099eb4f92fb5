mod bulk;
pub mod metrics;
mod permissions;
mod service;

pub use bulk::{BulkResult, CANCELLED_REASON};
pub use permissions::{Actor, Permission, Role};
pub use service::{JobService, Transition};
