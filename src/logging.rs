use std::fs;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// The TUI owns the terminal, so its log goes to a daily file. Keep the guard
/// alive until exit or buffered lines are lost.
pub fn init_file_logging(dir: Option<&Path>) -> Option<WorkerGuard> {
    let dir = dir?;
    fs::create_dir_all(dir).ok()?;
    let file_appender = tracing_appender::rolling::daily(dir, "hurling_hub.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let installed = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(non_blocking)
        .with_ansi(false)
        .try_init()
        .is_ok();
    installed.then_some(guard)
}

/// Command-line tools print results on stdout and log on stderr.
pub fn init_stderr_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .try_init();
}
