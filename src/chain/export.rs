//! Lineage export
//!
//! Three renderings of a resolved lineage:
//! - `json`: the nested node as-is, parents inlined under `src`
//! - `dot`: a Graphviz digraph, one labelled edge per parent → child step
//! - `chain`: the flat list of decoded records, seed first, each id once

use crate::seed::{LineageNode, MutationRecord};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::{HashMap, HashSet};
use std::fmt::{self, Write as _};

/// Output format for a resolved lineage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Dot,
    Chain,
}

/// Render `node` in the requested format
pub fn render(node: &LineageNode, format: OutputFormat) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Json => serde_json::to_string(node),
        OutputFormat::Dot => Ok(LineageGraph::from_lineage(node).to_dot()),
        OutputFormat::Chain => serde_json::to_string(&flatten_chain(node)),
    }
}

/// Depth-first list of every record in the lineage, parents in filename order
pub fn flatten_chain(node: &LineageNode) -> Vec<&MutationRecord> {
    let mut seen = HashSet::new();
    let mut chain = Vec::new();
    collect_chain(node, &mut seen, &mut chain);
    chain
}

fn collect_chain<'a>(
    node: &'a LineageNode,
    seen: &mut HashSet<u64>,
    chain: &mut Vec<&'a MutationRecord>,
) {
    if !seen.insert(node.id()) {
        return;
    }
    chain.push(&node.record);
    for parent in node.src.iter().flatten() {
        collect_chain(parent, seen, chain);
    }
}

/// Describe the mutation that produced `record`, e.g. `op: arith 8/8, pos: 12, val: be:-3`.
/// Corpus seeds have no producing mutation.
pub fn edge_label(record: &MutationRecord) -> Option<String> {
    let mut label = format!("op: {}", record.op()?);
    match record {
        MutationRecord::Mutation {
            pos, val_type, val, ..
        } => {
            label.push_str(&format!(", pos: {}", pos));
            if let Some(val) = val {
                label.push_str(&format!(", val: {}{}", val_type.as_deref().unwrap_or(""), val));
            }
        }
        MutationRecord::Havoc { rep, .. } | MutationRecord::Splice { rep, .. } => {
            label.push_str(&format!(", rep: {}", rep));
        }
        MutationRecord::Origin { .. } => {}
    }
    Some(label)
}

/// Graph vertex: a queue id, or the corpus file name for origin seeds
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GraphNode {
    Seed(u64),
    Corpus(String),
}

impl GraphNode {
    pub fn of(record: &MutationRecord) -> Self {
        match record {
            MutationRecord::Origin { orig_seed, .. } => GraphNode::Corpus(orig_seed.clone()),
            other => GraphNode::Seed(other.id()),
        }
    }
}

impl fmt::Display for GraphNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphNode::Seed(id) => write!(f, "{}", id),
            GraphNode::Corpus(name) => f.write_str(name),
        }
    }
}

/// Directed ancestry graph, edges pointing from parent to child
#[derive(Debug, Default)]
pub struct LineageGraph {
    graph: DiGraph<GraphNode, String>,
    index: HashMap<GraphNode, NodeIndex>,
}

impl LineageGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the graph of a whole lineage. The queried seed is always a
    /// vertex, even when it is a corpus seed with no edges.
    pub fn from_lineage(root: &LineageNode) -> Self {
        let mut graph = Self::new();
        graph.vertex(GraphNode::of(&root.record));
        graph.add_lineage(root);
        graph
    }

    /// Add the edges contributed by `node` and, recursively, its located ancestors
    pub fn add_lineage(&mut self, node: &LineageNode) {
        let Some(label) = edge_label(&node.record) else {
            return;
        };
        let child = self.vertex(GraphNode::of(&node.record));
        for parent in node.src.iter().flatten() {
            let from = self.vertex(GraphNode::of(&parent.record));
            self.graph.update_edge(from, child, label.clone());
            self.add_lineage(parent);
        }
    }

    fn vertex(&mut self, node: GraphNode) -> NodeIndex {
        if let Some(&ix) = self.index.get(&node) {
            return ix;
        }
        let ix = self.graph.add_node(node.clone());
        self.index.insert(node, ix);
        ix
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// `(parent, child, label)` triples in insertion order
    pub fn edges(&self) -> Vec<(String, String, String)> {
        self.graph
            .edge_references()
            .map(|edge| {
                (
                    self.graph[edge.source()].to_string(),
                    self.graph[edge.target()].to_string(),
                    edge.weight().clone(),
                )
            })
            .collect()
    }

    /// Graphviz DOT text; vertices are named by seed id or corpus file name
    pub fn to_dot(&self) -> String {
        let mut dot = String::from("digraph {\n");
        for vertex in self.graph.node_weights() {
            let _ = writeln!(dot, "    {};", dot_quote(&vertex.to_string()));
        }
        for edge in self.graph.edge_references() {
            let _ = writeln!(
                dot,
                "    {} -> {} [label={}];",
                dot_quote(&self.graph[edge.source()].to_string()),
                dot_quote(&self.graph[edge.target()].to_string()),
                dot_quote(edge.weight())
            );
        }
        dot.push_str("}\n");
        dot
    }
}

fn dot_quote(text: &str) -> String {
    format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::resolve;
    use crate::seed::decode;
    use std::fs::File;

    fn node(name: &str, src: Vec<Option<LineageNode>>) -> LineageNode {
        LineageNode {
            record: decode(name).unwrap(),
            src,
        }
    }

    fn seed_a() -> LineageNode {
        node("id:000000,orig:seedA", vec![])
    }

    #[test]
    fn test_json_matches_nested_shape() {
        let leaf = node("id:000001,src:000000,op:flip1,pos:5", vec![Some(seed_a())]);
        let json = render(&leaf, OutputFormat::Json).unwrap();
        assert_eq!(
            json,
            r#"{"id":1,"op":"bitflip 1/1","pos":5,"src":[{"id":0,"orig_seed":"seedA"}]}"#
        );
    }

    #[test]
    fn test_single_edge_graph() {
        let leaf = node("id:000001,src:000000,op:flip1,pos:5", vec![Some(seed_a())]);
        let graph = LineageGraph::from_lineage(&leaf);
        assert_eq!(graph.node_count(), 2);
        assert_eq!(
            graph.edges(),
            vec![("seedA".to_string(), "1".to_string(), "op: bitflip 1/1, pos: 5".to_string())]
        );

        let dot = render(&leaf, OutputFormat::Dot).unwrap();
        assert_eq!(
            dot,
            concat!(
                "digraph {\n",
                "    \"1\";\n",
                "    \"seedA\";\n",
                "    \"seedA\" -> \"1\" [label=\"op: bitflip 1/1, pos: 5\"];\n",
                "}\n"
            )
        );
    }

    #[test]
    fn test_dot_names_vertices_by_seed() {
        let dir = tempfile::tempdir().unwrap();
        File::create(dir.path().join("id:000000,orig:seedA")).unwrap();
        File::create(dir.path().join("id:000001,src:000000,op:flip1,pos:5")).unwrap();

        let lineage = resolve(&dir.path().join("id:000001,src:000000,op:flip1,pos:5")).unwrap();
        let dot = render(&lineage, OutputFormat::Dot).unwrap();
        assert!(dot.contains("\"seedA\" -> \"1\" [label=\"op: bitflip 1/1, pos: 5\"];"));
        assert!(!dot.contains("0 -> "));
        assert!(!dot.contains("1 -> "));
    }

    #[test]
    fn test_dot_escapes_quotes() {
        assert_eq!(dot_quote(r#"a"b\c"#), r#""a\"b\\c""#);
    }

    #[test]
    fn test_edge_labels() {
        let arith = decode("id:000004,src:000001,op:arith8,pos:12,val:be:-3").unwrap();
        assert_eq!(
            edge_label(&arith).unwrap(),
            "op: arith 8/8, pos: 12, val: be:-3"
        );
        let interest = decode("id:000005,src:000001,op:int16,pos:2,val:+7").unwrap();
        assert_eq!(
            edge_label(&interest).unwrap(),
            "op: interest 16/8, pos: 2, val: 7"
        );
        let havoc = decode("id:000009,src:000004,op:havoc,rep:16").unwrap();
        assert_eq!(edge_label(&havoc).unwrap(), "op: havoc, rep: 16");
        let origin = decode("id:000000,orig:seedA").unwrap();
        assert_eq!(edge_label(&origin), None);
    }

    #[test]
    fn test_splice_graph() {
        let three = node("id:000003,src:000000,op:flip4,pos:2", vec![Some(seed_a())]);
        let seven = node("id:000007,src:000000,op:havoc,rep:4", vec![Some(seed_a())]);
        let ten = node(
            "id:000010,src:000003+000007,op:splice,rep:2",
            vec![Some(three), Some(seven)],
        );
        let graph = LineageGraph::from_lineage(&ten);

        assert_eq!(graph.node_count(), 4);
        let edges = graph.edges();
        assert_eq!(edges.len(), 4);
        assert!(edges.contains(&("3".into(), "10".into(), "op: splice, rep: 2".into())));
        assert!(edges.contains(&("7".into(), "10".into(), "op: splice, rep: 2".into())));
        assert!(edges.contains(&("seedA".into(), "3".into(), "op: bitflip 4/1, pos: 2".into())));
        assert!(edges.contains(&("seedA".into(), "7".into(), "op: havoc, rep: 4".into())));
    }

    #[test]
    fn test_missing_parents_add_no_edges() {
        let orphan = node("id:000010,src:000003+000007,op:splice,rep:2", vec![None, None]);
        let graph = LineageGraph::from_lineage(&orphan);
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_origin_root_graph() {
        let graph = LineageGraph::from_lineage(&seed_a());
        assert_eq!(graph.node_count(), 1);
        assert!(graph.edges().is_empty());
    }

    #[test]
    fn test_repeated_parent_single_edge() {
        let one = node("id:000001,src:000000,op:flip1,pos:0", vec![Some(seed_a())]);
        let two = node(
            "id:000002,src:000001+000001,op:splice,rep:1",
            vec![Some(one.clone()), Some(one)],
        );
        let graph = LineageGraph::from_lineage(&two);
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn test_chain_format() {
        let one = node("id:000001,src:000000,op:flip1,pos:0", vec![Some(seed_a())]);
        let two = node(
            "id:000002,src:000001+000000,op:splice,rep:1",
            vec![Some(one), Some(seed_a())],
        );
        let ids: Vec<u64> = flatten_chain(&two).iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec![2, 1, 0]);

        let json = render(&two, OutputFormat::Chain).unwrap();
        assert_eq!(
            json,
            concat!(
                r#"[{"id":2,"src_1":1,"src_2":0,"op":"splice","rep":1},"#,
                r#"{"id":1,"src":0,"op":"bitflip 1/1","pos":0},"#,
                r#"{"id":0,"orig_seed":"seedA"}]"#
            )
        );
    }
}
