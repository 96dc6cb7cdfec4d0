//! Initialization of the `tracing` subscriber from [`config::Logger`].

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, MakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

use crate::{
    config::{self, LogLevel},
    Error, Result,
};

/// Crates whose events pass the level based default filter.
const MODULE_WHITELIST: &[&str] = &["owl2graph", "sqlx::query"];

const LOG_FILE_SUFFIX: &str = "log";

/// Installs the global subscriber.
///
/// The returned guard flushes the file appender when dropped and must live
/// until the process exits. Nothing is installed when both the stdout and
/// the file outputs are disabled.
///
/// # Errors
///
/// When the filter directives are invalid, the log directory cannot be
/// created, or a global subscriber is already installed.
pub fn init(config: &config::Logger) -> Result<Option<WorkerGuard>> {
    let mut layers: Vec<Box<dyn Layer<Registry> + Sync + Send>> = Vec::new();
    let mut guard = None;

    if let Some(appender) = config.file_appender.as_ref().filter(|a| a.enable) {
        let rotation = match appender.rotation {
            config::Rotation::Minutely => tracing_appender::rolling::Rotation::MINUTELY,
            config::Rotation::Hourly => tracing_appender::rolling::Rotation::HOURLY,
            config::Rotation::Daily => tracing_appender::rolling::Rotation::DAILY,
            config::Rotation::Never => tracing_appender::rolling::Rotation::NEVER,
        };
        let file_appender = tracing_appender::rolling::Builder::new()
            .rotation(rotation)
            .filename_prefix(&appender.filename_prefix)
            .filename_suffix(LOG_FILE_SUFFIX)
            .build(&appender.dir)
            .map_err(Error::wrap)?;
        let (writer, work_guard) = tracing_appender::non_blocking(file_appender);
        guard = Some(work_guard);
        layers.push(init_layer(writer, appender.format, false));
    }

    if config.enable {
        layers.push(init_layer(std::io::stdout, config.format, true));
    }

    if layers.is_empty() {
        return Ok(guard);
    }

    let env_filter = init_env_filter(config.override_filter.as_deref(), config.level)?;
    tracing_subscriber::registry()
        .with(layers)
        .with(env_filter)
        .try_init()
        .map_err(Error::wrap)?;
    Ok(guard)
}

fn init_env_filter(override_filter: Option<&str>, level: LogLevel) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    build_filter(override_filter, level)
}

fn build_filter(override_filter: Option<&str>, level: LogLevel) -> Result<EnvFilter> {
    let directives = override_filter.map_or_else(
        || {
            MODULE_WHITELIST
                .iter()
                .map(|module| format!("{module}={level}"))
                .collect::<Vec<_>>()
                .join(",")
        },
        ToString::to_string,
    );
    EnvFilter::try_new(directives).map_err(Error::wrap)
}

fn init_layer<W>(
    make_writer: W,
    format: config::Format,
    ansi: bool,
) -> Box<dyn Layer<Registry> + Sync + Send>
where
    W: for<'writer> MakeWriter<'writer> + Sync + Send + 'static,
{
    match format {
        config::Format::Compact => fmt::Layer::default()
            .with_ansi(ansi)
            .with_writer(make_writer)
            .compact()
            .boxed(),
        config::Format::Pretty => fmt::Layer::default()
            .with_ansi(ansi)
            .with_writer(make_writer)
            .pretty()
            .boxed(),
        config::Format::Json => fmt::Layer::default()
            .with_ansi(ansi)
            .with_writer(make_writer)
            .json()
            .boxed(),
    }
}
