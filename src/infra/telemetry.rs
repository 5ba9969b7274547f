use std::sync::Once;

use metrics::{Unit, describe_counter};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install a global tracing subscriber writing to stderr.
///
/// Stdout stays reserved for command output so it can be piped.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .try_init()
        .map_err(|err| {
            InfraError::telemetry(format!("failed to install tracing subscriber: {err}"))
        })
}

pub fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            "noticeboard_import_created_total",
            Unit::Count,
            "Total number of posts created by bulk import."
        );
        describe_counter!(
            "noticeboard_import_failed_total",
            Unit::Count,
            "Total number of bulk-import items rejected by the server."
        );
        describe_counter!(
            "noticeboard_cache_hit_total",
            Unit::Count,
            "Total number of post-list cache hits."
        );
        describe_counter!(
            "noticeboard_cache_miss_total",
            Unit::Count,
            "Total number of post-list cache misses."
        );
        describe_counter!(
            "noticeboard_cache_invalidation_total",
            Unit::Count,
            "Total number of post-list cache invalidations."
        );
    });
}
