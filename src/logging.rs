//! Logging configuration for msgscope

use std::path::Path;

use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Registry,
};

use crate::config::LoggingConfig;

const LOG_FILE: &str = "msgscope.log";

/// Filter directive for a level, raising the crate's own targets to debug
/// when verbose.
pub fn filter_directive(level: &str, verbose: bool) -> String {
    if verbose {
        format!("{level},msgscope=debug,msgscope_core=debug")
    } else {
        format!("{level},msgscope={level},msgscope_core={level}")
    }
}

/// Console layer on stderr plus a daily-rolling file under the configured
/// directory. `RUST_LOG` wins over the config when set.
///
/// Buffered file lines are flushed when the returned guard drops, so keep it
/// alive until the command finishes.
pub fn init_logging(config: &LoggingConfig, verbose: bool) -> anyhow::Result<WorkerGuard> {
    let logs_dir: &Path = &config.directory;
    if !logs_dir.exists() {
        std::fs::create_dir_all(logs_dir)
            .with_context(|| format!("creating log directory {}", logs_dir.display()))?;
    }

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(&config.level, verbose)));

    let file_appender = tracing_appender::rolling::daily(logs_dir, LOG_FILE);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let console_layer = fmt::layer()
        .with_target(verbose)
        .with_writer(std::io::stderr);

    let file_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(non_blocking)
        .with_ansi(false);

    Registry::default()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .context("installing tracing subscriber")?;

    tracing::debug!(
        level = %config.level,
        dir = %logs_dir.display(),
        "logging initialized, files roll daily as {LOG_FILE}.YYYY-MM-DD"
    );

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_raises_own_targets() {
        assert_eq!(
            filter_directive("warn", true),
            "warn,msgscope=debug,msgscope_core=debug"
        );
        assert_eq!(
            filter_directive("info", false),
            "info,msgscope=info,msgscope_core=info"
        );
    }

    #[test]
    fn file_lines_are_flushed_when_the_guard_drops() {
        let dir = tempfile::tempdir().unwrap();
        let file = tracing_appender::rolling::never(dir.path(), LOG_FILE);
        let (writer, guard) = tracing_appender::non_blocking(file);
        let subscriber =
            Registry::default().with(fmt::layer().with_writer(writer).with_ansi(false));
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("report saved");
        });
        drop(guard);

        let logged = std::fs::read_to_string(dir.path().join(LOG_FILE)).unwrap();
        assert!(logged.contains("report saved"));
    }

    #[test]
    fn directives_parse() {
        for verbose in [true, false] {
            assert!(EnvFilter::try_new(filter_directive("info", verbose)).is_ok());
        }
    }
}
