use std::path::{Path, PathBuf};

use tracing::warn;

use super::error::ScanError;

/// What to do when a reference file cannot be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanPolicy {
    /// Fail the whole scan.
    #[default]
    Abort,
    /// Log and continue; the maximum is taken over the readable files.
    SkipUnreadable,
}

impl ScanPolicy {
    pub fn from_skip_flag(skip_unreadable: bool) -> Self {
        if skip_unreadable {
            ScanPolicy::SkipUnreadable
        } else {
            ScanPolicy::Abort
        }
    }
}

/// A directory of reference images, read fresh on every listing.
#[derive(Debug, Clone)]
pub struct ReferenceCorpus {
    dir: PathBuf,
}

impl ReferenceCorpus {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Regular files in the directory, sorted by name.
    ///
    /// Hidden files and subdirectories are not part of the corpus. A missing
    /// directory is an empty corpus.
    pub fn entries(&self) -> Result<Vec<PathBuf>, ScanError> {
        let read_dir = match std::fs::read_dir(&self.dir) {
            Ok(rd) => rd,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(dir = %self.dir.display(), "Reference corpus directory missing, treating as empty");
                return Ok(Vec::new());
            }
            Err(source) => {
                return Err(ScanError::CorpusUnavailable {
                    path: self.dir.clone(),
                    source,
                });
            }
        };

        let mut files = Vec::new();
        for entry in read_dir {
            let entry = entry.map_err(|source| ScanError::CorpusUnavailable {
                path: self.dir.clone(),
                source,
            })?;

            let hidden = entry.file_name().to_string_lossy().starts_with('.');
            if hidden {
                continue;
            }

            let path = entry.path();
            if path.is_file() {
                files.push(path);
            }
        }

        files.sort();
        Ok(files)
    }
}
