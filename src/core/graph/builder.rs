use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{DepgraphError, Result};
use super::lexer::{Lexer, TokenKind};
use super::model::{DepGraph, Edge, NodeId, UNPREFIXED_MODULE};

/// Counters describing one parse run, logged by the engine as a summary.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ParseReport {
    /// Input files processed
    pub files: usize,
    /// Canonical nodes in the global table
    pub nodes: usize,
    /// Local nodes discarded as cross-file duplicates
    pub duplicates: usize,
    /// Edges retained in the global list
    pub edges: usize,
    /// Edges dropped because both endpoints share a module
    pub intra_module_dropped: usize,
    /// Edges dropped because an endpoint never resolved
    pub unresolved_dropped: usize,
    /// Statements skipped with a recoverable parse error
    pub failed_statements: usize,
}

/// A node statement as seen in one file, before deduplication. The
/// synthetic id is only assigned once the node is confirmed
/// non-duplicate, so local nodes carry the raw statement identifier.
#[derive(Debug)]
struct LocalNode {
    statement_id: String,
    label: String,
    module_prefix: String,
    is_root: bool,
    is_public: bool,
}

/// An edge statement as seen in one file. Endpoints are indexes into the
/// file's local node list; a failed lookup is tolerated and retried once
/// the file's lines are exhausted.
#[derive(Debug)]
struct LocalEdge {
    source_id: String,
    destination_id: String,
    source: Option<usize>,
    destination: Option<usize>,
}

/// Drives the lexer over one or more call-graph files and reconciles the
/// results into a single [`DepGraph`].
///
/// Files are processed strictly in the order supplied: the node table
/// and the synthetic-id sequence are shared, mutable state, so the
/// processing order is observable in the output. That makes sequential
/// processing a correctness requirement, not an optimization choice.
pub struct GraphBuilder {
    lexer: Lexer,
    graph: DepGraph,
    report: ParseReport,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self {
            lexer: Lexer::new(),
            graph: DepGraph::new(),
            report: ParseReport::default(),
        }
    }

    /// Parse a batch of file contents (one string per input file),
    /// merging each file's nodes and edges into the global graph.
    pub fn parse(&mut self, files: &[String]) {
        for contents in files {
            self.parse_file(contents);
        }
    }

    /// Counters accumulated so far.
    pub fn report(&self) -> &ParseReport {
        &self.report
    }

    /// Assign module buckets and hand over the finished graph.
    pub fn finish(mut self) -> DepGraph {
        self.assign_modules();
        self.graph
    }

    /// Process one file: tokenize line by line, collect local nodes and
    /// edges, run the second resolution pass, then merge into the global
    /// state.
    fn parse_file(&mut self, contents: &str) {
        let mut graph_name: Option<String> = None;
        let mut local_nodes: Vec<LocalNode> = Vec::new();
        let mut local_edges: Vec<LocalEdge> = Vec::new();

        for line in contents.lines() {
            let token = self.lexer.tokenize(line);

            match token.kind {
                TokenKind::DigraphDef => {
                    graph_name = Some(token.value);
                }
                TokenKind::NodeStmt => {
                    match parse_node_statement(&token.value, graph_name.as_deref()) {
                        Ok(node) => local_nodes.push(node),
                        Err(e) => {
                            warn!(line, error = %e, "skipping malformed node statement");
                            self.report.failed_statements += 1;
                        }
                    }
                }
                TokenKind::EdgeStmt => {
                    match parse_edge_statement(&token.value) {
                        Ok((source_id, destination_id)) => {
                            // First resolution attempt, against the nodes
                            // seen so far in this file. Forward references
                            // stay unresolved until the second pass.
                            let source = find_local(&local_nodes, &source_id);
                            let destination = find_local(&local_nodes, &destination_id);
                            local_edges.push(LocalEdge {
                                source_id,
                                destination_id,
                                source,
                                destination,
                            });
                        }
                        Err(e) => {
                            warn!(line, error = %e, "skipping malformed edge statement");
                            self.report.failed_statements += 1;
                        }
                    }
                }
                // Braces, default-attribute statements and unrecognized
                // lines carry nothing the graph needs.
                TokenKind::NodeAttrStmt
                | TokenKind::EdgeAttrStmt
                | TokenKind::OpenBrace
                | TokenKind::CloseBrace
                | TokenKind::Ignored => {}
            }
        }

        // Second pass: the local node list is complete now, so retry
        // every lookup that failed mid-file.
        for edge in &mut local_edges {
            if edge.source.is_none() {
                edge.source = find_local(&local_nodes, &edge.source_id);
            }
            if edge.destination.is_none() {
                edge.destination = find_local(&local_nodes, &edge.destination_id);
            }
        }

        self.report.files += 1;
        self.merge(local_nodes, local_edges);
    }

    /// Deduplicate one file's nodes against the global table and rewrite
    /// its edges onto canonical nodes.
    fn merge(&mut self, local_nodes: Vec<LocalNode>, local_edges: Vec<LocalEdge>) {
        // Maps local list position -> canonical arena id.
        let mut id_map: Vec<NodeId> = Vec::with_capacity(local_nodes.len());

        for local in local_nodes {
            match self.graph.node_by_label(&local.label) {
                Some(existing) => {
                    // Duplicate function seen through another call graph;
                    // the first occurrence keeps its id and attributes.
                    debug!(label = %local.label, id = existing, "duplicate node, reusing canonical");
                    self.report.duplicates += 1;
                    id_map.push(existing);
                }
                None => {
                    let id = self.graph.insert_node(
                        local.label,
                        local.module_prefix,
                        local.is_root,
                        local.is_public,
                    );
                    self.report.nodes += 1;
                    id_map.push(id);
                }
            }
        }

        for edge in local_edges {
            let (source, destination) = match (edge.source, edge.destination) {
                (Some(s), Some(d)) => (id_map[s], id_map[d]),
                _ => {
                    warn!(
                        source = %edge.source_id,
                        destination = %edge.destination_id,
                        "edge endpoint never resolved; dropping edge"
                    );
                    self.report.unresolved_dropped += 1;
                    continue;
                }
            };

            // Same-module calls are implementation detail at this zoom
            // level; only cross-module edges survive.
            if self.graph.node(source).module_prefix == self.graph.node(destination).module_prefix {
                self.report.intra_module_dropped += 1;
                continue;
            }

            self.graph.edges.push(Edge {
                source_id: edge.source_id,
                destination_id: edge.destination_id,
                source,
                destination,
            });
            self.report.edges += 1;
        }
    }

    /// Partition the final node table into module buckets, upper-casing
    /// the prefix. Idempotent: buckets are rebuilt from scratch.
    fn assign_modules(&mut self) {
        self.graph.modules.clear();

        let memberships: Vec<(String, NodeId)> = self
            .graph
            .nodes
            .iter()
            .filter(|n| !n.module_prefix.is_empty())
            .map(|n| (n.module_prefix.to_uppercase(), n.id))
            .collect();

        for (prefix, id) in memberships {
            self.graph.module_mut(&prefix).nodes.push(id);
        }
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Front-to-back search of the local node list by raw statement id.
fn find_local(nodes: &[LocalNode], statement_id: &str) -> Option<usize> {
    nodes.iter().position(|n| n.statement_id == statement_id)
}

/// Build a [`LocalNode`] from a node statement value such as
/// `Node0[label=ADC_DoThing,fontsize=10]`.
fn parse_node_statement(value: &str, graph_name: Option<&str>) -> Result<LocalNode> {
    let statement_id = match value.find('[') {
        Some(i) => &value[..i],
        None => value,
    };
    let label = label_from_statement(value)?;

    Ok(LocalNode {
        statement_id: statement_id.to_string(),
        module_prefix: module_prefix(&label),
        is_root: graph_name == Some(label.as_str()),
        is_public: is_public(&label),
        label,
    })
}

/// The label is the value of the first `key=value` pair of the attribute
/// list. Doxygen always emits it first; anything else is malformed.
fn label_from_statement(value: &str) -> Result<String> {
    let attrs = match value.find('[') {
        Some(i) => &value[i + 1..],
        None => {
            return Err(DepgraphError::Parse(format!(
                "node statement '{}' has no attribute list",
                value
            )))
        }
    };

    // First attribute runs to the first `,`, or to `]` when it is the
    // only one.
    let first = match attrs.find(|c| c == ',' || c == ']') {
        Some(i) => &attrs[..i],
        None => attrs,
    };

    match first.split_once('=') {
        Some(("label", label)) if !label.is_empty() => Ok(label.to_string()),
        _ => Err(DepgraphError::Parse(format!(
            "node statement '{}' is missing a label attribute",
            value
        ))),
    }
}

/// Split an edge statement value such as `Node0->Node1[color=black]`
/// into its raw endpoint ids.
fn parse_edge_statement(value: &str) -> Result<(String, String)> {
    let dash = value.find('-').ok_or_else(|| {
        DepgraphError::Parse(format!("edge statement '{}' has no edge operator", value))
    })?;
    let arrow = value.find('>').ok_or_else(|| {
        DepgraphError::Parse(format!("edge statement '{}' has no edge operator", value))
    })?;

    let source = value[..dash].to_string();
    let rest = &value[arrow + 1..];
    let destination = match rest.find('[') {
        Some(i) => &rest[..i],
        None => rest,
    };

    Ok((source, destination.to_string()))
}

/// Module prefix of a function: the label text before the first
/// underscore, or the RTOS sentinel for unprefixed names.
fn module_prefix(label: &str) -> String {
    match label.find('_') {
        Some(i) => label[..i].to_string(),
        None => UNPREFIXED_MODULE.to_string(),
    }
}

/// Visibility of a function. Names without an underscore belong to no
/// module and count as public; otherwise the label's second character
/// (the first character of the module prefix after the label's first
/// character) decides - lower-case means private.
fn is_public(label: &str) -> bool {
    if !label.contains('_') {
        return true;
    }

    match label.chars().nth(1) {
        Some(c) => !c.is_lowercase(),
        None => true,
    }
}
