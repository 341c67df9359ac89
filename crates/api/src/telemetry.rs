//! Tracing subscriber setup

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LogFormat;

const DEFAULT_FILTER: &str = "clinicloud_api=info,clinicloud_billing=info,tower_http=info";

/// Install the global subscriber; `RUST_LOG` overrides the default filter
pub fn init(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let builder = fmt().with_env_filter(filter).with_target(true);
    let result = match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.try_init(),
    };

    if let Err(e) = result {
        // Already installed, e.g. by a test harness
        eprintln!("tracing subscriber not installed: {}", e);
    }
}
