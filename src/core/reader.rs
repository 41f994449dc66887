use std::path::Path;
use ignore::WalkBuilder;
use tracing::debug;

use crate::error::{DepgraphError, Result};

/// Discovers and reads doxygen call-graph DOT files. The rest of the
/// pipeline only ever sees file contents as strings, one per input
/// file, in a stable order.
pub struct Reader;

impl Reader {
    pub fn new() -> Self {
        Self
    }

    /// Read a single DOT file. The extension gate is deliberate: the
    /// tool is pointed at doxygen output directories, and anything else
    /// is a user mistake worth surfacing.
    pub fn read_single_file<P: AsRef<Path>>(&self, path: P) -> Result<Vec<String>> {
        let path = path.as_ref();

        if !is_dot_file(path) {
            return Err(DepgraphError::FileSystem(format!(
                "{} is not a .dot file",
                path.display()
            )));
        }

        debug!(file = %path.display(), "reading call graph");
        Ok(vec![std::fs::read_to_string(path)?])
    }

    /// Read every DOT file under a directory, in file-name order so the
    /// synthetic-id assignment downstream is reproducible run to run.
    pub fn read_directory<P: AsRef<Path>>(&self, dir: P) -> Result<Vec<String>> {
        let dir = dir.as_ref();
        let walker = WalkBuilder::new(dir)
            .hidden(false)
            .git_ignore(true)
            .sort_by_file_name(|a, b| a.cmp(b))
            .build();

        let mut contents = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|e| DepgraphError::FileSystem(e.to_string()))?;
            let path = entry.path();

            if path.is_file() && is_dot_file(path) {
                debug!(file = %path.display(), "reading call graph");
                contents.push(std::fs::read_to_string(path)?);
            }
        }

        if contents.is_empty() {
            return Err(DepgraphError::FileSystem(format!(
                "{} does not contain any .dot files",
                dir.display()
            )));
        }

        Ok(contents)
    }
}

impl Default for Reader {
    fn default() -> Self {
        Self::new()
    }
}

fn is_dot_file(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == "dot")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_read_single_file_rejects_wrong_extension() {
        let reader = Reader::new();
        let result = reader.read_single_file("graph.txt");
        assert!(matches!(result, Err(DepgraphError::FileSystem(_))));
    }

    #[test]
    fn test_read_single_file_returns_one_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("adc.dot");
        fs::write(&path, "digraph \"ADC_A\" {\n}\n").unwrap();

        let contents = Reader::new().read_single_file(&path).unwrap();
        assert_eq!(contents.len(), 1);
        assert!(contents[0].contains("ADC_A"));
    }

    #[test]
    fn test_read_directory_collects_only_dot_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.dot"), "digraph \"A_X\" {}\n").unwrap();
        fs::write(dir.path().join("b.dot"), "digraph \"B_X\" {}\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "not a graph").unwrap();

        let contents = Reader::new().read_directory(dir.path()).unwrap();
        assert_eq!(contents.len(), 2);
    }

    #[test]
    fn test_read_directory_is_file_name_ordered() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("zz.dot"), "z").unwrap();
        fs::write(dir.path().join("aa.dot"), "a").unwrap();

        let contents = Reader::new().read_directory(dir.path()).unwrap();
        assert_eq!(contents, vec!["a".to_string(), "z".to_string()]);
    }

    #[test]
    fn test_empty_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = Reader::new().read_directory(dir.path());
        assert!(matches!(result, Err(DepgraphError::FileSystem(_))));
    }
}
