//! MutationRecord — the decoded form of a queue filename
//!
//! AFL writes one of four shapes:
//!
//! ```text
//! id:000000,orig:seed_name
//! id:000004,src:000001,op:arith8,pos:12,val:be:-3
//! id:000009,src:000004,op:havoc,rep:16
//! id:000010,src:000003+000007,op:splice,rep:2
//! ```
//!
//! Matching is anchored at the start of the name; anything after the
//! recognized fields (`,+cov`, `.bin`, ...) is ignored.

use super::Operation;
use regex::{Captures, Regex};
use serde::Serialize;
use std::path::Path;
use std::str::FromStr;
use std::sync::LazyLock;
use thiserror::Error;

static ORIGIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^id:(?P<id>[0-9]+),orig:(?P<orig_seed>\w+)").expect("origin pattern")
});

static MUTATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        concat!(
            r"^id:(?P<id>[0-9]+),src:(?P<src>[0-9]+),op:(?P<op>\w+),pos:(?P<pos>[0-9]+)",
            r"(?:,val:(?P<val_type>[\w:]+)?(?P<val>[+-][0-9]+))?",
        ),
    )
    .expect("mutation pattern")
});

static HAVOC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^id:(?P<id>[0-9]+),src:(?P<src>[0-9]+),op:(?P<op>havoc),rep:(?P<rep>[0-9]+)")
        .expect("havoc pattern")
});

static SPLICE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        concat!(
            r"^id:(?P<id>[0-9]+),src:(?P<src_1>[0-9]+)\+(?P<src_2>[0-9]+),",
            r"op:(?P<op>splice),rep:(?P<rep>[0-9]+)",
        ),
    )
    .expect("splice pattern")
});

/// Errors raised while decoding a queue filename
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("unrecognized seed filename: {0}")]
    UnrecognizedFilename(String),

    #[error("unknown mutation operation: {0}")]
    UnknownOperation(String),

    #[error("field `{field}` out of range: {value}")]
    InvalidNumber { field: &'static str, value: String },
}

/// One decoded queue filename
///
/// Parent references are raw seed ids; [`super::LineageNode`] is the resolved form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum MutationRecord {
    /// Seed taken from the initial corpus
    Origin { id: u64, orig_seed: String },
    /// Deterministic stage applied at a single position
    Mutation {
        id: u64,
        src: u64,
        op: Operation,
        pos: u64,
        /// Value encoding prefix, e.g. `be:` (only present alongside `val`)
        #[serde(skip_serializing_if = "Option::is_none")]
        val_type: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        val: Option<i64>,
    },
    /// Random stacked tweaks
    Havoc { id: u64, src: u64, op: Operation, rep: u64 },
    /// Two parents spliced together
    Splice {
        id: u64,
        src_1: u64,
        src_2: u64,
        op: Operation,
        rep: u64,
    },
}

impl MutationRecord {
    pub fn id(&self) -> u64 {
        match self {
            MutationRecord::Origin { id, .. }
            | MutationRecord::Mutation { id, .. }
            | MutationRecord::Havoc { id, .. }
            | MutationRecord::Splice { id, .. } => *id,
        }
    }

    /// Stage that produced this seed (`None` for corpus seeds)
    pub fn op(&self) -> Option<Operation> {
        match self {
            MutationRecord::Origin { .. } => None,
            MutationRecord::Mutation { op, .. }
            | MutationRecord::Havoc { op, .. }
            | MutationRecord::Splice { op, .. } => Some(*op),
        }
    }

    /// Parent seed ids, in filename order
    pub fn parents(&self) -> Vec<u64> {
        match self {
            MutationRecord::Origin { .. } => Vec::new(),
            MutationRecord::Mutation { src, .. } | MutationRecord::Havoc { src, .. } => vec![*src],
            MutationRecord::Splice { src_1, src_2, .. } => vec![*src_1, *src_2],
        }
    }

    pub fn is_origin(&self) -> bool {
        matches!(self, MutationRecord::Origin { .. })
    }
}

impl FromStr for MutationRecord {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode(s)
    }
}

/// Decode a queue filename into a [`MutationRecord`]
pub fn decode(name: &str) -> Result<MutationRecord, DecodeError> {
    if let Some(caps) = ORIGIN_RE.captures(name) {
        return Ok(MutationRecord::Origin {
            id: number(&caps, "id")?,
            orig_seed: caps["orig_seed"].to_string(),
        });
    }

    if let Some(caps) = MUTATION_RE.captures(name) {
        // havoc/splice names never carry `pos:`; leave them to their own patterns
        let op = &caps["op"];
        if !op.starts_with("havoc") && !op.starts_with("splice") {
            let val = caps.name("val").is_some();
            return Ok(MutationRecord::Mutation {
                id: number(&caps, "id")?,
                src: number(&caps, "src")?,
                op: Operation::from_code(op)?,
                pos: number(&caps, "pos")?,
                val_type: if val {
                    caps.name("val_type").map(|m| m.as_str().to_string())
                } else {
                    None
                },
                val: if val { Some(number(&caps, "val")?) } else { None },
            });
        }
    }

    if let Some(caps) = HAVOC_RE.captures(name) {
        return Ok(MutationRecord::Havoc {
            id: number(&caps, "id")?,
            src: number(&caps, "src")?,
            op: Operation::from_code(&caps["op"])?,
            rep: number(&caps, "rep")?,
        });
    }

    if let Some(caps) = SPLICE_RE.captures(name) {
        return Ok(MutationRecord::Splice {
            id: number(&caps, "id")?,
            src_1: number(&caps, "src_1")?,
            src_2: number(&caps, "src_2")?,
            op: Operation::from_code(&caps["op"])?,
            rep: number(&caps, "rep")?,
        });
    }

    Err(DecodeError::UnrecognizedFilename(name.to_string()))
}

/// Decode the final component of `path`
pub fn decode_path(path: &Path) -> Result<MutationRecord, DecodeError> {
    match path.file_name() {
        Some(name) => decode(&name.to_string_lossy()),
        None => Err(DecodeError::UnrecognizedFilename(path.display().to_string())),
    }
}

fn number<T: FromStr>(caps: &Captures<'_>, field: &'static str) -> Result<T, DecodeError> {
    let value = caps.name(field).map(|m| m.as_str()).unwrap_or_default();
    value.parse().map_err(|_| DecodeError::InvalidNumber {
        field,
        value: value.to_string(),
    })
}
