//! Queue directory access
//!
//! AFL keeps every seed of a run in one flat directory and names each entry
//! `id:NNNNNN,...`. Looking up a parent is a scan for that id prefix.

use log::{debug, warn};
use std::io;
use std::path::{Path, PathBuf};

/// Width AFL pads seed ids to in queue filenames
pub const ID_WIDTH: usize = 6;

/// A directory of queue entries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueDir {
    pub path: PathBuf,
}

impl QueueDir {
    pub fn open(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// The directory holding `seed_path` (the working directory for a bare name)
    pub fn containing(seed_path: &Path) -> Self {
        match seed_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => Self::open(parent),
            _ => Self::open("."),
        }
    }

    /// Filename prefix shared by every entry with this id
    pub fn id_prefix(id: u64) -> String {
        format!("id:{:0width$},", id, width = ID_WIDTH)
    }

    /// Find the entry whose name carries `id`.
    ///
    /// A missing id is `Ok(None)`: the parent was pruned or never synced.
    /// Ids are unique under normal operation; if several entries share one,
    /// the first in directory order wins.
    pub fn find(&self, id: u64) -> io::Result<Option<PathBuf>> {
        let prefix = Self::id_prefix(id);
        let mut matches = Vec::new();
        for entry in std::fs::read_dir(&self.path)? {
            let entry = entry?;
            if entry.file_name().to_string_lossy().starts_with(&prefix) {
                matches.push(entry.path());
            }
        }

        if matches.len() > 1 {
            warn!(
                "{} entries in {} share id {}, using {}",
                matches.len(),
                self.path.display(),
                id,
                matches[0].display()
            );
        }
        let found = matches.into_iter().next();
        if found.is_none() {
            debug!("No seed with id {} in {}", id, self.path.display());
        }
        Ok(found)
    }
}
