pub mod config;
mod http_layers;
mod job_routes;
pub mod metrics;
#[allow(clippy::module_inception)]
pub mod server;
pub mod session;
pub mod state;

pub use config::ServerConfig;
pub use http_layers::*;
pub use server::{make_app, run_server};
