use std::collections::HashMap;
use serde::{Deserialize, Serialize};

/// Synthetic identifier of a deduplicated node. Doubles as the index into
/// the [`DepGraph`] node arena: nodes are never removed, so ids are
/// monotone across a whole run and never reused.
pub type NodeId = u32;

/// Sentinel module prefix for functions whose label carries no underscore
/// (RTOS primitives and other unprefixed symbols).
pub const UNPREFIXED_MODULE: &str = "RTOS";

/// One function extracted from a node_stmt, after deduplication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Synthetic id, assigned once the node is confirmed non-duplicate
    pub id: NodeId,

    /// Function name from the statement's label attribute; the dedup key
    pub label: String,

    /// Label text before the first underscore, e.g. "ADC", "CONT"
    pub module_prefix: String,

    /// True iff the label matches the enclosing digraph's declared name,
    /// i.e. this is the entry function of that file's call graph
    pub is_root: bool,

    /// Visibility classification derived from the label's capitalization
    pub is_public: bool,
}

/// One call relationship between two deduplicated functions. Endpoint ids
/// reference the [`DepGraph`] arena; the raw statement ids are kept for
/// diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    /// Left-hand node_id of the edge_stmt as written in the input file
    pub source_id: String,

    /// Right-hand node_id of the edge_stmt as written in the input file
    pub destination_id: String,

    /// Canonical source node
    pub source: NodeId,

    /// Canonical destination node
    pub destination: NodeId,
}

/// A named bucket of nodes sharing one module prefix.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Module {
    /// Upper-cased module prefix, e.g. "ADC", "BAL"
    pub prefix: String,

    /// Ids of the member nodes, in arena order
    pub nodes: Vec<NodeId>,
}

impl Module {
    pub fn new(prefix: String) -> Self {
        Self {
            prefix,
            nodes: Vec::new(),
        }
    }
}

/// The reconciled module dependency graph: an owned node arena plus the
/// label lookup used for cross-file deduplication, the retained
/// cross-module edges, and the module buckets.
///
/// This is the single mutable store the builder threads its files
/// through; after parsing it is a read-only input to the writer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DepGraph {
    /// All deduplicated nodes, indexed by their synthetic id
    pub nodes: Vec<Node>,

    /// Retained cross-module edges, in retention order
    pub edges: Vec<Edge>,

    /// Module buckets, in discovery order
    pub modules: Vec<Module>,

    /// label -> id lookup backing deduplication
    #[serde(skip)]
    by_label: HashMap<String, NodeId>,
}

impl DepGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the canonical node for a function label.
    pub fn node_by_label(&self, label: &str) -> Option<NodeId> {
        self.by_label.get(label).copied()
    }

    /// Add a node to the arena, assigning the next synthetic id. The
    /// caller is responsible for checking [`Self::node_by_label`] first;
    /// this always inserts.
    pub fn insert_node(
        &mut self,
        label: String,
        module_prefix: String,
        is_root: bool,
        is_public: bool,
    ) -> NodeId {
        let id = self.nodes.len() as NodeId;
        self.by_label.insert(label.clone(), id);
        self.nodes.push(Node {
            id,
            label,
            module_prefix,
            is_root,
            is_public,
        });
        id
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id as usize]
    }

    /// Find or create the module bucket for an upper-cased prefix,
    /// preserving discovery order.
    pub fn module_mut(&mut self, prefix: &str) -> &mut Module {
        let pos = match self.modules.iter().position(|m| m.prefix == prefix) {
            Some(pos) => pos,
            None => {
                self.modules.push(Module::new(prefix.to_string()));
                self.modules.len() - 1
            }
        };
        &mut self.modules[pos]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_assigns_sequential_ids() {
        let mut graph = DepGraph::new();
        let a = graph.insert_node("ADC_A".into(), "ADC".into(), false, true);
        let b = graph.insert_node("BAL_B".into(), "BAL".into(), false, true);

        assert_eq!(a, 0);
        assert_eq!(b, 1);
        assert_eq!(graph.node_by_label("ADC_A"), Some(0));
        assert_eq!(graph.node(b).label, "BAL_B");
    }

    #[test]
    fn test_module_mut_preserves_discovery_order() {
        let mut graph = DepGraph::new();
        graph.module_mut("CONT").nodes.push(0);
        graph.module_mut("ADC").nodes.push(1);
        graph.module_mut("CONT").nodes.push(2);

        let prefixes: Vec<&str> = graph.modules.iter().map(|m| m.prefix.as_str()).collect();
        assert_eq!(prefixes, vec!["CONT", "ADC"]);
        assert_eq!(graph.modules[0].nodes, vec![0, 2]);
    }
}
