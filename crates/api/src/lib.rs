//! Clinicloud API Library
//!
//! HTTP surface of the billing engine: plan catalog, quote previews and
//! registration forwarding.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod telemetry;

pub use config::Config;
pub use error::{ApiError, ApiResult};
pub use state::AppState;
