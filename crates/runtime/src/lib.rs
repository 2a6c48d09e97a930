//! Runtime bootstrap: tracing, metrics, configuration and the pipeline driver.

use tracing_subscriber::EnvFilter;

pub mod config;
pub mod metrics;
pub mod pipeline;

pub use config::PipelineConfig;
pub use metrics::{MetricsRegistry, MetricsSnapshot, StageTimer};
pub use pipeline::{PipelineOutput, RetentionPipeline};

/// Install the global fmt subscriber; `RUST_LOG` overrides the `info` default.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
