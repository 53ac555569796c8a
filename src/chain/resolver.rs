//! Lineage resolver
//!
//! Starting from one queue entry, decode its name, look up each parent id in
//! the same directory and recurse until corpus seeds are reached. A parent
//! that is no longer in the queue becomes a `None` link; a name that cannot
//! be decoded anywhere along the way aborts the whole resolution.

use crate::seed::{decode_path, DecodeError, LineageNode, MutationRecord};
use crate::storage::QueueDir;
use log::{debug, info};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Resolver behaviour switches
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Fail with [`ResolveError::CyclicLineage`] when a seed turns out to be
    /// its own ancestor. AFL ids only ever point backwards, so this only
    /// fires on hand-edited or corrupted queues.
    pub detect_cycles: bool,
    /// Resolve each ancestor file once per call and copy the result wherever
    /// splices reconverge on it
    pub reuse_resolved: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            detect_cycles: true,
            reuse_resolved: true,
        }
    }
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("{} is not a valid seed file", .0.display())]
    InvalidInputPath(PathBuf),

    #[error("cannot resolve lineage at {}: {source}", path.display())]
    UnresolvableLineage {
        path: PathBuf,
        #[source]
        source: DecodeError,
    },

    #[error("seed {0} is its own ancestor")]
    CyclicLineage(u64),

    #[error("failed to scan queue directory {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ResolveError {
    /// The filename decode failure behind this error, if any
    pub fn decode_error(&self) -> Option<&DecodeError> {
        match self {
            ResolveError::UnresolvableLineage { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Recursive walker from a seed back to the corpus
#[derive(Debug, Default)]
pub struct ChainResolver {
    pub config: ResolverConfig,
    resolved: HashMap<PathBuf, LineageNode>,
    /// Ids on the current recursion path
    active: Vec<u64>,
}

impl ChainResolver {
    pub fn new(config: ResolverConfig) -> Self {
        Self {
            config,
            resolved: HashMap::new(),
            active: Vec::new(),
        }
    }

    /// Resolve the full lineage of the seed file at `seed_path`
    pub fn resolve(&mut self, seed_path: &Path) -> Result<LineageNode, ResolveError> {
        if !seed_path.is_file() {
            return Err(ResolveError::InvalidInputPath(seed_path.to_path_buf()));
        }

        self.resolved.clear();
        self.active.clear();

        let queue = QueueDir::containing(seed_path);
        let node = self.resolve_seed(&queue, seed_path)?;
        info!(
            "Resolved seed {}: {} generations, origins {:?}, {} missing parents",
            node.id(),
            node.depth(),
            node.origins(),
            node.missing_parents()
        );
        Ok(node)
    }

    fn resolve_seed(
        &mut self,
        queue: &QueueDir,
        seed_path: &Path,
    ) -> Result<LineageNode, ResolveError> {
        if let Some(node) = self.resolved.get(seed_path) {
            return Ok(node.clone());
        }

        let record = decode_path(seed_path).map_err(|source| ResolveError::UnresolvableLineage {
            path: seed_path.to_path_buf(),
            source,
        })?;
        if record.is_origin() {
            return Ok(LineageNode::origin(record));
        }

        let id = record.id();
        if self.config.detect_cycles && self.active.contains(&id) {
            return Err(ResolveError::CyclicLineage(id));
        }

        self.active.push(id);
        let src = self.resolve_parents(queue, &record);
        self.active.pop();

        let node = LineageNode { record, src: src? };
        if self.config.reuse_resolved {
            self.resolved.insert(seed_path.to_path_buf(), node.clone());
        }
        Ok(node)
    }

    fn resolve_parents(
        &mut self,
        queue: &QueueDir,
        record: &MutationRecord,
    ) -> Result<Vec<Option<LineageNode>>, ResolveError> {
        let mut src = Vec::new();
        for parent_id in record.parents() {
            let found = queue.find(parent_id).map_err(|source| ResolveError::Io {
                path: queue.path.clone(),
                source,
            })?;
            match found {
                Some(parent_path) => {
                    debug!("Seed {} <- {}", record.id(), parent_path.display());
                    src.push(Some(self.resolve_seed(queue, &parent_path)?));
                }
                None => {
                    debug!("Seed {}: parent {} not in queue", record.id(), parent_id);
                    src.push(None);
                }
            }
        }
        Ok(src)
    }
}

/// Resolve with the default [`ResolverConfig`]
pub fn resolve(seed_path: &Path) -> Result<LineageNode, ResolveError> {
    ChainResolver::default().resolve(seed_path)
}
