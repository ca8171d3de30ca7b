use std::error::Error;
use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `BUGHUNT_LOG=debug`
pub const LOG_ENV: &str = "BUGHUNT_LOG";

const DEFAULT_FILTER: &str = "info";

/// Install the global subscriber, appending to `path`.
///
/// The terminal is owned by the UI, so nothing is ever written to stdout or
/// stderr.
pub fn init(path: &Path) -> Result<(), Box<dyn Error + Send + Sync>> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_init_creates_log_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("logs").join("bughunt.log");

        // another test may already own the global subscriber
        let _ = init(&path);

        assert!(path.exists());
    }
}
