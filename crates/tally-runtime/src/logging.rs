//! Global subscriber setup from [`LoggingConfig`].
//!
//! `RUST_LOG`, when set, replaces the configured base level. Per-module
//! filters from `logging.filters` are layered on top either way.

use std::ffi::OsStr;
use std::path::Path;

use tracing_subscriber::filter::Directive;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

use crate::config::{LogFormat, LogOutput, LoggingConfig, SpanEventConfig};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Installs the global subscriber described by `config`.
///
/// Does nothing if a global subscriber is already installed.
pub fn init_from_config(config: &LoggingConfig) {
    let _ = try_init(config);
}

/// Installs the global subscriber, failing if one is already set.
pub fn try_init(config: &LoggingConfig) -> Result<(), TryInitError> {
    tracing_subscriber::registry()
        .with(fmt_layer(config))
        .with(env_filter(config))
        .try_init()
}

fn env_filter(config: &LoggingConfig) -> EnvFilter {
    let base = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_str()));

    directives(config)
        .iter()
        .filter_map(|d| d.parse::<Directive>().ok())
        .fold(base, EnvFilter::add_directive)
}

/// `module=level` directives in module order, so the filter is reproducible.
fn directives(config: &LoggingConfig) -> Vec<String> {
    let mut filters: Vec<_> = config.filters.iter().collect();
    filters.sort_by(|(a, _), (b, _)| a.cmp(b));
    filters
        .into_iter()
        .map(|(module, level)| format!("{module}={}", level.as_str()))
        .collect()
}

fn fmt_layer(config: &LoggingConfig) -> BoxedLayer {
    let layer = fmt::layer()
        .with_writer(writer(config))
        .with_span_events(fmt_span(&config.span_events))
        .with_thread_ids(config.thread_ids)
        .with_file(config.file_location)
        .with_line_number(config.file_location);

    match config.format {
        LogFormat::Compact => layer.compact().boxed(),
        LogFormat::Pretty => layer.pretty().boxed(),
        LogFormat::Full => layer.boxed(),
        #[cfg(feature = "json-log")]
        LogFormat::Json => layer.json().boxed(),
        #[cfg(not(feature = "json-log"))]
        LogFormat::Json => layer.boxed(),
    }
}

fn writer(config: &LoggingConfig) -> BoxMakeWriter {
    match (config.output, config.file_path.as_deref()) {
        (LogOutput::Stdout, _) => BoxMakeWriter::new(std::io::stdout),
        (LogOutput::File, Some(path)) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let name = path.file_name().unwrap_or_else(|| OsStr::new("tally.log"));
            BoxMakeWriter::new(tracing_appender::rolling::never(dir, name))
        }
        // File output without a path is rejected by validation.
        (LogOutput::Stderr | LogOutput::File, _) => BoxMakeWriter::new(std::io::stderr),
    }
}

fn fmt_span(events: &SpanEventConfig) -> FmtSpan {
    [
        (events.new, FmtSpan::NEW),
        (events.enter, FmtSpan::ENTER),
        (events.exit, FmtSpan::EXIT),
        (events.close, FmtSpan::CLOSE),
    ]
    .into_iter()
    .filter(|(enabled, _)| *enabled)
    .fold(FmtSpan::NONE, |acc, (_, span)| acc | span)
}
