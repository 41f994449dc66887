use clap::{Parser, Subcommand};
use std::path::PathBuf;
use anyhow::Result;

use crate::core::Engine;

#[derive(Parser)]
#[command(name = "depgraph")]
#[command(about = "Module-level dependency graphs from doxygen C call-graph DOT files")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default Depgraph.toml and the bundled graph templates
    Init {
        /// Target directory (defaults to current directory)
        #[arg(short, long)]
        path: Option<PathBuf>,

        /// Overwrite an existing configuration
        #[arg(long)]
        force: bool,
    },

    /// Build the module dependency graph from call-graph DOT files
    Generate {
        /// Single DOT file to process
        #[arg(short = 's', long)]
        single_file: Option<PathBuf>,

        /// Directory of DOT files to process
        #[arg(short, long)]
        directory: Option<PathBuf>,

        /// Name of the generated DOT document
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also render an image of the generated graph
        #[arg(long)]
        render: bool,

        /// Image format to render (see dot(1))
        #[arg(long)]
        format: Option<String>,

        /// Also export the reconciled graph as JSON next to the output
        #[arg(long)]
        export_json: bool,
    },

    /// Render an existing DOT document with Graphviz
    Render {
        /// DOT document to render
        input: PathBuf,

        /// Image format (derived from the output name when omitted)
        #[arg(long)]
        format: Option<String>,

        /// Output image file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

impl Cli {
    pub async fn execute(self, mut engine: Engine) -> Result<()> {
        match self.command {
            Commands::Init { path, force } => {
                engine.init(path, force).await?
            }
            Commands::Generate { single_file, directory, output, render, format, export_json } => {
                engine.generate(single_file, directory, output, render, format, export_json).await?
            }
            Commands::Render { input, format, output } => {
                engine.render(input, format, output).await?
            }
        }

        Ok(())
    }
}
