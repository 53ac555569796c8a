//! AFL Mutation Chain — seed ancestry from queue filenames
//!
//! AFL names every queue entry after the mutation that produced it. Reading
//! those names back, and following the `src` ids through the queue directory,
//! recovers how a test case was derived from the original corpus.

pub mod seed;
pub mod storage;
pub mod chain;

pub use seed::{decode, decode_path, DecodeError, LineageNode, MutationRecord, Operation};
pub use storage::QueueDir;
pub use chain::{
    render, resolve, ChainResolver, LineageGraph, OutputFormat, ResolveError, ResolverConfig,
};
