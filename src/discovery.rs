//! Input discovery for aggregation passes.
//!
//! A directory given as input stands for every interface file beneath it.
//! Files are returned sorted by path so registry order does not depend on
//! directory iteration order.

use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::diagnostic::CompilerError;

/// Extension of annotated interface files.
pub const INTERFACE_EXTENSION: &str = "ssf";

pub fn expand_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, CompilerError> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            files.extend(find_interface_files(input)?);
        } else {
            files.push(input.clone());
        }
    }
    Ok(files)
}

/// Recursively find all interface files in a directory
fn find_interface_files(dir: &Path) -> Result<Vec<PathBuf>, CompilerError> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir).follow_links(true) {
        let entry = entry.map_err(|e| CompilerError::Read {
            path: dir.to_path_buf(),
            source: io::Error::from(e),
        })?;
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == INTERFACE_EXTENSION) {
            files.push(path.to_path_buf());
        }
    }

    files.sort();
    Ok(files)
}
