use std::path::Path;
use tracing::debug;

use crate::config::TemplateConfig;
use crate::error::{DepgraphError, Result};
use super::graph::{DepGraph, Edge, Module, Node};

/// General form of a node definition in DOT based on the official grammar.
const NODE_DEFINITION: &str = "%node.id% [label=\"%node.label%\"];";

/// General form of an edge definition in DOT based on the official grammar.
const EDGE_DEFINITION: &str = "%edge.src.id% -> %edge.dest.id%;";

/// Bundled templates, used whenever a configured template path does not
/// exist (`init` writes these same files out for customization).
pub(crate) const DEFAULT_GRAPH_TEMPLATE: &str = include_str!("../../templates/graph.temp");
pub(crate) const DEFAULT_OUTER_TEMPLATE: &str = include_str!("../../templates/subgraph-outer.temp");
pub(crate) const DEFAULT_INNER_TEMPLATE: &str = include_str!("../../templates/subgraph-inner.temp");

/// Renders the reconciled graph back into DOT text by filling three
/// substitution templates: the document, one outer cluster per module,
/// and a public/private inner cluster pair within each module.
///
/// Substitution is a literal find-and-replace over a small fixed
/// placeholder set - the replacement text is part of the output
/// contract, so no templating engine sits in between. A placeholder
/// absent from a template is simply a no-op.
pub struct GraphWriter {
    graph_template: String,
    outer_subgraph_template: String,
    inner_subgraph_template: String,
}

impl GraphWriter {
    pub fn new(
        graph_template: String,
        outer_subgraph_template: String,
        inner_subgraph_template: String,
    ) -> Self {
        Self {
            graph_template,
            outer_subgraph_template,
            inner_subgraph_template,
        }
    }

    /// Build a writer from the configured template paths, falling back
    /// to the bundled templates for any path that does not exist.
    pub fn from_config(templates: &TemplateConfig) -> Result<Self> {
        Ok(Self::new(
            read_template(&templates.graph, DEFAULT_GRAPH_TEMPLATE)?,
            read_template(&templates.subgraph_outer, DEFAULT_OUTER_TEMPLATE)?,
            read_template(&templates.subgraph_inner, DEFAULT_INNER_TEMPLATE)?,
        ))
    }

    /// Produce the finished DOT document. Modules and edges appear in
    /// processing order; no sorting happens here.
    pub fn render(&self, graph: &DepGraph) -> String {
        let mut subgraph_clusters = String::new();
        for module in &graph.modules {
            subgraph_clusters.push_str(&self.render_module(graph, module));
        }

        let mut edge_defs = String::new();
        for edge in &graph.edges {
            edge_defs.push_str(&edge_definition(edge));
            edge_defs.push('\n');
        }

        self.graph_template
            .replace("%graph.subgraph_cluster%", &subgraph_clusters)
            .replace("%graph.edge_defs%", &edge_defs)
    }

    /// One outer cluster: the module's nodes partitioned by visibility
    /// into two filled copies of the inner template.
    fn render_module(&self, graph: &DepGraph, module: &Module) -> String {
        let mut public_node_defs = String::new();
        let mut private_node_defs = String::new();

        for &id in &module.nodes {
            let node = graph.node(id);
            let definition = node_definition(node);
            if node.is_public {
                public_node_defs.push_str(&definition);
                public_node_defs.push('\n');
            } else {
                private_node_defs.push_str(&definition);
                private_node_defs.push('\n');
            }
        }

        let public_subgraph =
            self.fill_inner(module, "pub", "Public", &public_node_defs);
        let private_subgraph =
            self.fill_inner(module, "priv", "Private", &private_node_defs);

        self.outer_subgraph_template
            .replace("%subgraph.modulePrefix%", &module.prefix)
            .replace(
                "%subgraph.node_clusters%",
                &(public_subgraph + &private_subgraph),
            )
    }

    fn fill_inner(
        &self,
        module: &Module,
        visibility: &str,
        visibility_long: &str,
        node_defs: &str,
    ) -> String {
        self.inner_subgraph_template
            .replace("%subgraph.visibility%", visibility)
            .replace("%subgraph.visibility_long%", visibility_long)
            .replace("%subgraph.modulePrefix%", &module.prefix)
            .replace("%subgraph.node_defs%", node_defs)
    }
}

/// Synthetic ids render in the same `Node<n>` form the input dialect
/// uses, so the output stays valid input for this tool.
fn dot_id(id: u32) -> String {
    format!("Node{}", id)
}

fn node_definition(node: &Node) -> String {
    NODE_DEFINITION
        .replace("%node.id%", &dot_id(node.id))
        .replace("%node.label%", &node.label)
}

fn edge_definition(edge: &Edge) -> String {
    EDGE_DEFINITION
        .replace("%edge.src.id%", &dot_id(edge.source))
        .replace("%edge.dest.id%", &dot_id(edge.destination))
}

fn read_template(path: &Path, default: &str) -> Result<String> {
    if path.exists() {
        debug!(template = %path.display(), "loading template");
        std::fs::read_to_string(path).map_err(|e| {
            DepgraphError::Template(format!("failed to read {}: {}", path.display(), e))
        })
    } else {
        debug!(template = %path.display(), "template not found, using bundled default");
        Ok(default.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::graph::GraphBuilder;

    fn sample_graph() -> DepGraph {
        let file = r#"digraph "ADC_DoThing" {
Node0 [label="ADC_DoThing"];
Node1 [label="adc_helper"];
Node2 [label="BAL_DoOther"];
Node0 -> Node2;
}"#
        .to_string();

        let mut builder = GraphBuilder::new();
        builder.parse(&[file]);
        builder.finish()
    }

    fn default_writer() -> GraphWriter {
        GraphWriter::new(
            DEFAULT_GRAPH_TEMPLATE.to_string(),
            DEFAULT_OUTER_TEMPLATE.to_string(),
            DEFAULT_INNER_TEMPLATE.to_string(),
        )
    }

    #[test]
    fn test_node_definition_form() {
        let graph = sample_graph();
        let document = default_writer().render(&graph);

        assert!(document.contains("Node0 [label=\"ADC_DoThing\"];"));
        assert!(document.contains("Node1 [label=\"adc_helper\"];"));
    }

    #[test]
    fn test_edge_definition_form() {
        let graph = sample_graph();
        let document = default_writer().render(&graph);

        assert!(document.contains("Node0 -> Node2;"));
    }

    #[test]
    fn test_visibility_partitioning() {
        let graph = sample_graph();
        let document = default_writer().render(&graph);

        assert!(document.contains("cluster_ADC_pub"));
        assert!(document.contains("cluster_ADC_priv"));

        // The private helper lands in the priv cluster, after the pub one.
        let priv_pos = document.find("cluster_ADC_priv").unwrap();
        let helper_pos = document.find("Node1 [label=\"adc_helper\"];").unwrap();
        assert!(helper_pos > priv_pos);
    }

    #[test]
    fn test_no_placeholders_survive_substitution() {
        let graph = sample_graph();
        let document = default_writer().render(&graph);

        assert!(!document.contains('%'));
    }

    #[test]
    fn test_missing_placeholder_is_a_no_op() {
        let graph = sample_graph();
        let writer = GraphWriter::new(
            "digraph fixed {}\n".to_string(),
            String::new(),
            String::new(),
        );

        assert_eq!(writer.render(&graph), "digraph fixed {}\n");
    }

    #[test]
    fn test_exact_substitution_with_minimal_templates() {
        let graph = sample_graph();
        let writer = GraphWriter::new(
            "%graph.subgraph_cluster%|%graph.edge_defs%".to_string(),
            "<%subgraph.modulePrefix%:%subgraph.node_clusters%>".to_string(),
            "(%subgraph.visibility% %subgraph.node_defs%)".to_string(),
        );
        let document = writer.render(&graph);

        assert!(document.starts_with("<ADC:(pub Node0 [label=\"ADC_DoThing\"];\n)"));
        assert!(document.contains("(priv Node1 [label=\"adc_helper\"];\n)"));
        assert!(document.ends_with("|Node0 -> Node2;\n"));
    }

    #[test]
    fn test_modules_render_in_discovery_order() {
        let graph = sample_graph();
        let document = default_writer().render(&graph);

        let adc = document.find("cluster_ADC").unwrap();
        let bal = document.find("cluster_BAL").unwrap();
        assert!(adc < bal);
    }
}
