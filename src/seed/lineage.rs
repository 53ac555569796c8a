//! Lineage — a seed with its ancestry resolved
//!
//! Every seed knows where it came from. A `LineageNode` holds the decoded
//! record of one queue entry and, in place of the raw parent ids, the
//! resolved nodes of those parents. Splices reconverge, so the same ancestor
//! can appear under more than one branch; it is duplicated, not shared.

use super::{MutationRecord, Operation};
use serde::{Serialize, Serializer};
use std::collections::BTreeSet;

/// Resolved ancestry of a single seed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineageNode {
    /// Decoded filename of this seed
    pub record: MutationRecord,
    /// One entry per parent id (empty for corpus seeds), `None` where the
    /// parent file is no longer in the queue
    pub src: Vec<Option<LineageNode>>,
}

impl LineageNode {
    /// A corpus seed; always a leaf
    pub fn origin(record: MutationRecord) -> Self {
        Self {
            record,
            src: Vec::new(),
        }
    }

    pub fn id(&self) -> u64 {
        self.record.id()
    }

    pub fn is_origin(&self) -> bool {
        self.record.is_origin()
    }

    /// Number of generations down to the deepest reachable ancestor
    pub fn depth(&self) -> usize {
        self.src
            .iter()
            .flatten()
            .map(|parent| parent.depth() + 1)
            .max()
            .unwrap_or(0)
    }

    /// Names of the corpus seeds this lineage reaches
    pub fn origins(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        self.collect_origins(&mut names);
        names
    }

    fn collect_origins(&self, names: &mut BTreeSet<String>) {
        if let MutationRecord::Origin { orig_seed, .. } = &self.record {
            names.insert(orig_seed.clone());
        }
        for parent in self.src.iter().flatten() {
            parent.collect_origins(names);
        }
    }

    /// Parent links whose file could not be found
    pub fn missing_parents(&self) -> usize {
        self.src
            .iter()
            .map(|parent| match parent {
                Some(node) => node.missing_parents(),
                None => 1,
            })
            .sum()
    }
}

/// Flat JSON shape: the record's own fields with `src` replaced by the
/// resolved parents. Corpus seeds carry no `src` at all.
#[derive(Serialize)]
#[serde(untagged)]
enum NodeView<'a> {
    Origin {
        id: u64,
        orig_seed: &'a str,
    },
    Mutation {
        id: u64,
        op: Operation,
        pos: u64,
        #[serde(skip_serializing_if = "Option::is_none")]
        val_type: Option<&'a str>,
        #[serde(skip_serializing_if = "Option::is_none")]
        val: Option<i64>,
        src: &'a [Option<LineageNode>],
    },
    Repeated {
        id: u64,
        op: Operation,
        rep: u64,
        src: &'a [Option<LineageNode>],
    },
}

impl<'a> From<&'a LineageNode> for NodeView<'a> {
    fn from(node: &'a LineageNode) -> Self {
        let src = node.src.as_slice();
        match &node.record {
            MutationRecord::Origin { id, orig_seed } => NodeView::Origin {
                id: *id,
                orig_seed: orig_seed.as_str(),
            },
            MutationRecord::Mutation {
                id,
                op,
                pos,
                val_type,
                val,
                ..
            } => NodeView::Mutation {
                id: *id,
                op: *op,
                pos: *pos,
                val_type: val_type.as_deref(),
                val: *val,
                src,
            },
            MutationRecord::Havoc { id, op, rep, .. }
            | MutationRecord::Splice { id, op, rep, .. } => NodeView::Repeated {
                id: *id,
                op: *op,
                rep: *rep,
                src,
            },
        }
    }
}

impl Serialize for LineageNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        NodeView::from(self).serialize(serializer)
    }
}
