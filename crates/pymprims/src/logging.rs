use clap::ValueEnum;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::prelude::*;

/// Prefix shared by the targets of every pymprims crate.
const CRATE_TARGET: &str = "pymprims";

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_filter(self) -> LevelFilter {
        match self {
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }

    fn is_verbose(self) -> bool {
        matches!(self, LogLevel::Debug | LogLevel::Trace)
    }
}

/// The chosen level applies to the wire, host and endpoint crates; anything
/// else is capped at `warn`.
fn targets(level: LogLevel) -> Targets {
    Targets::new()
        .with_target(CRATE_TARGET, level.as_filter())
        .with_default(level.as_filter().min(LevelFilter::WARN))
}

/// Route endpoint diagnostics to stderr so stdout stays machine-readable.
///
/// At `debug` and `trace` each line names the emitting module, which tells
/// parent and child traffic apart in `simulate`.
pub fn init_logging(format: LogFormat, level: LogLevel) {
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(level.is_verbose());
    let registry = tracing_subscriber::registry().with(targets(level));

    let _ = match format {
        LogFormat::Text => registry.with(layer).try_init(),
        LogFormat::Json => registry.with(layer.json()).try_init(),
    };
}

#[cfg(test)]
mod tests {
    use tracing::Level;

    use super::*;

    #[test]
    fn crate_targets_follow_the_chosen_level() {
        let filter = targets(LogLevel::Debug);
        assert!(filter.would_enable("pymprims_endpoint::parent", &Level::DEBUG));
        assert!(filter.would_enable("pymprims_wire::guard", &Level::DEBUG));
        assert!(!filter.would_enable("pymprims_wire::guard", &Level::TRACE));
    }

    #[test]
    fn other_targets_are_capped_at_warn() {
        let filter = targets(LogLevel::Trace);
        assert!(filter.would_enable("regex", &Level::WARN));
        assert!(!filter.would_enable("regex", &Level::INFO));

        let quiet = targets(LogLevel::Error);
        assert!(!quiet.would_enable("regex", &Level::WARN));
    }
}
