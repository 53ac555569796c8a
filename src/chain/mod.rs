//! Mutation chain recovery
//!
//! - **Resolver**: follows `src` ids from a seed back to the corpus
//! - **Export**: renders the resolved lineage as JSON, a DOT graph, or a flat chain

pub mod resolver;
pub mod export;

pub use resolver::{resolve, ChainResolver, ResolveError, ResolverConfig};
pub use export::{edge_label, flatten_chain, render, GraphNode, LineageGraph, OutputFormat};
