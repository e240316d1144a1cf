//! Source parsing.
//!
//! Files are parsed with the tree-sitter Python grammar. Import extraction
//! reduces the tree to the two statement forms the resolver understands,
//! see [`ImportStatement`].

use std::fs;
use std::path::Path;

use crate::error::{ReconError, Result};

pub mod python;

mod helpers;

/// A statically resolvable import statement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImportStatement {
    /// `import a.b.c, d` - one dotted name per imported module.
    Import { names: Vec<String> },

    /// `from X import Y` - `level` counts the leading dots; `module` is the
    /// dotted name after them, absent for `from . import Y`.
    From {
        level: usize,
        module: Option<String>,
    },
}

/// Read a source file as UTF-8 text.
pub fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| ReconError::read(path, e))
}

/// Read and parse a file, returning its import statements.
pub fn parse_file_imports(path: &Path) -> Result<Vec<ImportStatement>> {
    let source = read_source(path)?;
    let tree = python::parse(&source, path)?;
    Ok(python::extract_imports(&tree, &source))
}
