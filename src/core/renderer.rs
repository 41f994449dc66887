use std::path::Path;
use tokio::process::Command;
use tracing::debug;

use crate::error::{DepgraphError, Result};

/// Image types dot can generate. See dot(1).
pub const OUTPUT_FORMATS: &[&str] = &[
    "dot", "xdot", "ps", "pdf", "svg", "fig", "png", "gif", "jpg", "jpeg", "json", "imap", "cmapx",
];

/// Shells out to the Graphviz `dot` program to turn a generated DOT
/// document into an image. Nothing in the core pipeline depends on
/// Graphviz being installed; only this collaborator does, and only when
/// rendering is actually requested.
pub struct ImageRenderer;

impl ImageRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Run `dot -T<format> -o <output> <dot_file>`.
    pub async fn render(&self, dot_file: &Path, format: &str, output: &Path) -> Result<()> {
        if !OUTPUT_FORMATS.contains(&format) {
            return Err(DepgraphError::Render(format!(
                "unsupported output format '{}' (supported: {})",
                format,
                OUTPUT_FORMATS.join(", ")
            )));
        }

        debug!(input = %dot_file.display(), format, output = %output.display(), "invoking dot");

        let result = Command::new("dot")
            .arg(format!("-T{}", format))
            .arg("-o")
            .arg(output)
            .arg(dot_file)
            .output()
            .await
            .map_err(|e| {
                DepgraphError::Render(format!(
                    "failed to run dot: {} (is Graphviz installed?)",
                    e
                ))
            })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(DepgraphError::Render(format!(
                "dot exited with {}: {}",
                result.status,
                stderr.trim()
            )));
        }

        Ok(())
    }

    /// Derive the Graphviz format from an output file name's extension.
    pub fn format_from_extension(file_name: &Path) -> Result<String> {
        let extension = file_name
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| {
                DepgraphError::Render(format!(
                    "{} has no extension to derive a format from",
                    file_name.display()
                ))
            })?;

        if OUTPUT_FORMATS.contains(&extension) {
            Ok(extension.to_string())
        } else {
            Err(DepgraphError::Render(format!(
                "invalid output format '{}'",
                extension
            )))
        }
    }
}

impl Default for ImageRenderer {
    fn default() -> Self {
        Self::new()
    }
}
