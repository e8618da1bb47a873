//! Write probe against a directory.

use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use scrapewire_framework::{RawSnapshot, RawValue, ScrapeError, Source, async_trait};

/// Outcome of one probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ProbeStatus {
    Ok = 0,
    /// The directory cannot be stat'ed.
    NoAccess = 1,
    /// A temporary file cannot be created or written.
    WriteFailed = 2,
    /// The temporary file cannot be flushed to storage.
    CloseFailed = 3,
}

impl ProbeStatus {
    pub fn code(self) -> u8 {
        self as u8
    }
}

const PROBE_CONTENT: &[u8] = b"scrapewire probe";

/// Probe `dir` by writing a temporary file into it.
///
/// The temporary file is removed on every path out of this function.
pub fn probe(dir: &Path) -> ProbeStatus {
    if let Err(e) = std::fs::metadata(dir) {
        debug!(path = %dir.display(), error = %e, "Cannot stat probe path");
        return ProbeStatus::NoAccess;
    }

    let mut file = match tempfile::Builder::new().prefix("tmp-").tempfile_in(dir) {
        Ok(file) => file,
        Err(e) => {
            debug!(path = %dir.display(), error = %e, "Failed to create temporary file");
            return ProbeStatus::WriteFailed;
        }
    };

    if let Err(e) = file.write_all(PROBE_CONTENT) {
        debug!(path = %file.path().display(), error = %e, "Failed to write temporary file");
        return ProbeStatus::WriteFailed;
    }

    if let Err(e) = file.as_file().sync_all() {
        debug!(path = %file.path().display(), error = %e, "Failed to flush temporary file");
        return ProbeStatus::CloseFailed;
    }

    if let Err(e) = file.close() {
        debug!(path = %dir.display(), error = %e, "Failed to remove temporary file");
        return ProbeStatus::CloseFailed;
    }

    ProbeStatus::Ok
}

/// Reports the [`ProbeStatus`] of a directory on every pull. Never fails.
pub struct PathProbeSource {
    path: PathBuf,
}

impl PathProbeSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl Source for PathProbeSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn fetch(&mut self) -> Result<RawSnapshot, ScrapeError> {
        let path = self.path.clone();
        let status = match tokio::task::spawn_blocking(move || probe(&path)).await {
            Ok(status) => status,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Probe task failed");
                ProbeStatus::NoAccess
            }
        };

        if status != ProbeStatus::Ok {
            warn!(path = %self.path.display(), status = ?status, "Probe path not usable");
        }

        Ok(RawValue::object([(
            "status",
            RawValue::from(u64::from(status.code())),
        )]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entries(dir: &Path) -> usize {
        std::fs::read_dir(dir).unwrap().count()
    }

    #[test]
    fn test_probe_writable_dir() {
        let dir = TempDir::new().unwrap();
        assert_eq!(probe(dir.path()), ProbeStatus::Ok);
        assert_eq!(entries(dir.path()), 0);
    }

    #[test]
    fn test_probe_missing_dir() {
        let dir = TempDir::new().unwrap();
        assert_eq!(probe(&dir.path().join("missing")), ProbeStatus::NoAccess);
    }

    #[test]
    fn test_probe_file_instead_of_dir() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("plain");
        std::fs::write(&file, "x").unwrap();

        assert_eq!(probe(&file), ProbeStatus::WriteFailed);
        assert_eq!(entries(dir.path()), 1);
    }

    #[tokio::test]
    async fn test_fetch_never_fails() {
        let mut source = PathProbeSource::new("/nonexistent/eos/path");
        let snapshot = source.fetch().await.unwrap();
        assert_eq!(snapshot.number_or_zero("status"), 1.0);
    }
}
