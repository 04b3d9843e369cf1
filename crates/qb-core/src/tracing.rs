//! Log output for hosts embedding the core.
//!
//! Library code only emits events; a host calls [`init_tracing`] once at
//! startup to decide where they go. Events carry `bank_id` and `question_id`
//! fields wherever a bank or question is involved, so a single import or
//! study session can be followed with a filter such as
//! `RUST_LOG=qb_core=debug`.

use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Environment;

/// Install the global subscriber for `env`.
///
/// Development prints readable multi-line events with source locations at
/// `debug`. Production writes one JSON object per event at `info`, with the
/// `bank_id` / `question_id` fields flattened into the object. In both modes
/// `sqlx` is held at `warn` unless `RUST_LOG` says otherwise.
///
/// Only the first call installs anything; later calls are ignored.
pub fn init_tracing(env: &Environment) {
    if env.is_development() {
        init_development_tracing();
    } else {
        init_production_tracing();
    }
}

const DEVELOPMENT_FILTER: &str = "debug,sqlx=warn";
const PRODUCTION_FILTER: &str = "info,sqlx=warn";

fn filter_or(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

fn init_development_tracing() {
    let layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .pretty()
        .with_filter(filter_or(DEVELOPMENT_FILTER));

    if tracing_subscriber::registry().with(layer).try_init().is_ok() {
        tracing::debug!("Logging to terminal");
    }
}

fn init_production_tracing() {
    let layer = tracing_subscriber::fmt::layer()
        .json()
        .flatten_event(true)
        .with_current_span(true)
        .with_span_list(false)
        .with_target(true)
        .with_filter(filter_or(PRODUCTION_FILTER));

    if tracing_subscriber::registry().with(layer).try_init().is_ok() {
        tracing::info!("Logging as JSON");
    }
}
