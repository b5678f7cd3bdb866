//! File-based tracing setup.
//!
//! Stdout carries command output (tables in particular), so events only ever
//! go to a log file. The candidates come from
//! [`circuitry_config::log_file_candidates`]; when none can be opened,
//! events are filtered but not written anywhere.

use std::env;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let mut failures = Vec::new();
    let opened = circuitry_config::log_file_candidates()
        .into_iter()
        .find_map(|path| match open_append(&path) {
            Ok(file) => Some((path, file)),
            Err(e) => {
                failures.push(format!("Cannot log to {}: {e}", path.display()));
                None
            }
        });

    let Some((path, file)) = opened else {
        tracing_subscriber::registry().with(env_filter).init();
        return;
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        .with(env_filter)
        .init();

    tracing::info!(
        path = %path.display(),
        version = env!("CARGO_PKG_VERSION"),
        os = env::consts::OS,
        arch = env::consts::ARCH,
        exe = ?env::current_exe().ok(),
        args = ?env::args().skip(1).collect::<Vec<_>>(),
        "Session started"
    );
    for failure in failures {
        tracing::warn!("{failure}");
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::io::Write;

    use super::open_append;

    #[test]
    fn log_files_are_created_and_appended() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("logs").join("circuitry.log");

        writeln!(open_append(&path).unwrap(), "first").unwrap();
        writeln!(open_append(&path).unwrap(), "second").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "first\nsecond\n");
    }

    #[test]
    fn blocked_directories_are_errors() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("file");
        fs::write(&blocker, "x").unwrap();
        assert!(open_append(&blocker.join("circuitry.log")).is_err());
    }
}
