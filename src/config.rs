use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{DepgraphError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Project configuration
    pub project: ProjectConfig,

    /// Graph template customization
    pub templates: TemplateConfig,

    /// Output settings
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Project name
    pub name: String,

    /// Default directory of doxygen call-graph DOT files to process when
    /// the command line names no input
    pub input_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateConfig {
    /// Path to the graph template
    pub graph: PathBuf,

    /// Path to the outer (per-module) subgraph template
    pub subgraph_outer: PathBuf,

    /// Path to the inner (per-visibility) subgraph template
    pub subgraph_inner: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Name of the generated DOT document
    pub file_name: PathBuf,

    /// Image format handed to Graphviz when rendering (see dot(1))
    pub image_format: String,

    /// Whether `generate` should also invoke the renderer
    pub render_image: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            project: ProjectConfig {
                name: "Unnamed Project".to_string(),
                input_dir: None,
            },
            templates: TemplateConfig {
                graph: PathBuf::from("templates/graph.temp"),
                subgraph_outer: PathBuf::from("templates/subgraph-outer.temp"),
                subgraph_inner: PathBuf::from("templates/subgraph-inner.temp"),
            },
            output: OutputConfig {
                file_name: PathBuf::from("out.dot"),
                image_format: "pdf".to_string(),
                render_image: false,
            },
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| DepgraphError::Config(e.to_string()))?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| DepgraphError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load configuration with fallback to default
    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        match path {
            Some(p) => {
                if p.as_ref().exists() {
                    Self::load(p)
                } else {
                    Ok(Self::default())
                }
            }
            None => {
                // Try common config file locations
                let candidates = [
                    "Depgraph.toml",
                    "depgraph.toml",
                    ".depgraph.toml",
                ];

                for candidate in &candidates {
                    if Path::new(candidate).exists() {
                        return Self::load(candidate);
                    }
                }

                Ok(Self::default())
            }
        }
    }
}
