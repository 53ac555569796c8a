//! Seed — what a queue filename says about its file
//!
//! A seed name encodes: its own id + the parent id(s) + the mutation stage
//! (and its position/value/repetition parameters), or the original corpus name.

mod operation;
mod mutation;
mod lineage;

pub use operation::Operation;
pub use mutation::{decode, decode_path, DecodeError, MutationRecord};
pub use lineage::LineageNode;
