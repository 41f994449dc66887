use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{DepgraphError, Result};
use super::graph::GraphBuilder;
use super::reader::Reader;
use super::renderer::ImageRenderer;
use super::writer::{
    GraphWriter, DEFAULT_GRAPH_TEMPLATE, DEFAULT_INNER_TEMPLATE, DEFAULT_OUTER_TEMPLATE,
};

/// Main orchestration engine: reads call-graph files, rebuilds them as
/// one module-level dependency graph, serializes it, and optionally
/// hands the result to Graphviz.
pub struct Engine {
    config: Config,
    reader: Reader,
    renderer: ImageRenderer,
}

impl Engine {
    pub async fn new(config_path: Option<&Path>) -> Result<Self> {
        let config = Config::load_or_default(config_path)?;

        debug!("Loaded configuration: {:?}", config);

        Ok(Self {
            config,
            reader: Reader::new(),
            renderer: ImageRenderer::new(),
        })
    }

    /// Scaffold a project: default config plus the bundled templates,
    /// ready for customization.
    pub async fn init(&self, path: Option<PathBuf>, force: bool) -> Result<()> {
        let root = path.unwrap_or_else(|| PathBuf::from("."));
        let config_path = root.join("Depgraph.toml");

        if config_path.exists() && !force {
            return Err(DepgraphError::Config(format!(
                "{} already exists (use --force to overwrite)",
                config_path.display()
            )));
        }

        std::fs::create_dir_all(&root)?;
        Config::default().save(&config_path)?;

        let template_dir = root.join("templates");
        std::fs::create_dir_all(&template_dir)?;
        std::fs::write(template_dir.join("graph.temp"), DEFAULT_GRAPH_TEMPLATE)?;
        std::fs::write(template_dir.join("subgraph-outer.temp"), DEFAULT_OUTER_TEMPLATE)?;
        std::fs::write(template_dir.join("subgraph-inner.temp"), DEFAULT_INNER_TEMPLATE)?;

        info!("Initialized depgraph project in {}", root.display());
        Ok(())
    }

    /// The main flow: read inputs, build the module dependency graph,
    /// write the DOT document, optionally export JSON and render.
    pub async fn generate(
        &mut self,
        single_file: Option<PathBuf>,
        directory: Option<PathBuf>,
        output: Option<PathBuf>,
        render: bool,
        format: Option<String>,
        export_json: bool,
    ) -> Result<()> {
        let files = self.read_inputs(single_file, directory)?;
        info!("Parsing {} call graph file(s)", files.len());

        let mut builder = GraphBuilder::new();
        builder.parse(&files);

        let report = builder.report().clone();
        info!(
            "Reconciled {} nodes ({} duplicates), kept {} cross-module edges ({} intra-module dropped)",
            report.nodes, report.duplicates, report.edges, report.intra_module_dropped
        );
        if report.unresolved_dropped > 0 {
            warn!(
                "{} edge(s) referenced nodes that never resolved and were dropped",
                report.unresolved_dropped
            );
        }
        if report.failed_statements > 0 {
            warn!(
                "{} malformed statement(s) were skipped",
                report.failed_statements
            );
        }

        let graph = builder.finish();
        debug!("Modules: {:?}", graph.modules.iter().map(|m| &m.prefix).collect::<Vec<_>>());

        let writer = GraphWriter::from_config(&self.config.templates)?;
        let document = writer.render(&graph);

        let output_path = output.unwrap_or_else(|| self.config.output.file_name.clone());
        std::fs::write(&output_path, &document)?;
        info!("Wrote {}", output_path.display());

        if export_json {
            let json_path = output_path.with_extension("json");
            std::fs::write(&json_path, serde_json::to_string_pretty(&graph)?)?;
            info!("Exported {}", json_path.display());
        }

        if render || self.config.output.render_image {
            let format = format.unwrap_or_else(|| self.config.output.image_format.clone());
            let image_path = output_path.with_extension(&format);
            self.renderer.render(&output_path, &format, &image_path).await?;
            info!("Rendered {}", image_path.display());
        }

        Ok(())
    }

    /// Render an existing DOT document.
    pub async fn render(
        &self,
        input: PathBuf,
        format: Option<String>,
        output: Option<PathBuf>,
    ) -> Result<()> {
        let (format, output) = match (format, output) {
            (Some(format), Some(output)) => (format, output),
            (None, Some(output)) => (ImageRenderer::format_from_extension(&output)?, output),
            (Some(format), None) => {
                let output = input.with_extension(&format);
                (format, output)
            }
            (None, None) => {
                let format = self.config.output.image_format.clone();
                let output = input.with_extension(&format);
                (format, output)
            }
        };

        self.renderer.render(&input, &format, &output).await?;
        info!("Rendered {}", output.display());
        Ok(())
    }

    /// Input precedence: explicit file, explicit directory, configured
    /// directory. Anything else is a configuration error.
    fn read_inputs(
        &self,
        single_file: Option<PathBuf>,
        directory: Option<PathBuf>,
    ) -> Result<Vec<String>> {
        if let Some(file) = single_file {
            self.reader.read_single_file(file)
        } else if let Some(dir) = directory {
            self.reader.read_directory(dir)
        } else if let Some(dir) = &self.config.project.input_dir {
            self.reader.read_directory(dir)
        } else {
            Err(DepgraphError::Config(
                "no input given: pass --single-file or --directory, or set project.input_dir"
                    .to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[tokio::test]
    async fn test_generate_writes_dot_document() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("adc.dot");
        fs::write(
            &input,
            "digraph \"ADC_DoThing\" {\nNode0 [label=\"ADC_DoThing\"];\nNode1 [label=\"BAL_DoOther\"];\nNode0 -> Node1;\n}\n",
        )
        .unwrap();
        let output = dir.path().join("deps.dot");

        let mut engine = Engine::new(None).await.unwrap();
        engine
            .generate(Some(input), None, Some(output.clone()), false, None, false)
            .await
            .unwrap();

        let document = fs::read_to_string(&output).unwrap();
        assert!(document.contains("cluster_ADC"));
        assert!(document.contains("cluster_BAL"));
        assert!(document.contains("Node0 -> Node1;"));
    }

    #[tokio::test]
    async fn test_generate_export_json() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("adc.dot");
        fs::write(&input, "digraph \"ADC_A\" {\nNode0 [label=\"ADC_A\"];\n}\n").unwrap();
        let output = dir.path().join("deps.dot");

        let mut engine = Engine::new(None).await.unwrap();
        engine
            .generate(Some(input), None, Some(output.clone()), false, None, true)
            .await
            .unwrap();

        let json = fs::read_to_string(dir.path().join("deps.json")).unwrap();
        assert!(json.contains("\"ADC_A\""));
    }

    #[tokio::test]
    async fn test_generate_without_input_is_a_config_error() {
        let mut engine = Engine::new(None).await.unwrap();
        let result = engine.generate(None, None, None, false, None, false).await;
        assert!(matches!(result, Err(DepgraphError::Config(_))));
    }

    #[tokio::test]
    async fn test_init_scaffolds_config_and_templates() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("project");

        let engine = Engine::new(None).await.unwrap();
        engine.init(Some(root.clone()), false).await.unwrap();

        assert!(root.join("Depgraph.toml").exists());
        assert!(root.join("templates/graph.temp").exists());
        assert!(root.join("templates/subgraph-outer.temp").exists());
        assert!(root.join("templates/subgraph-inner.temp").exists());

        // A second init without --force must refuse.
        let result = engine.init(Some(root), false).await;
        assert!(matches!(result, Err(DepgraphError::Config(_))));
    }
}
