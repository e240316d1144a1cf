//! Python parsing and import extraction using tree-sitter.

use std::path::Path;
use tree_sitter::{Node, Parser, Tree};

use super::helpers::{
    find_child_by_type, find_first_error, get_dotted_text, get_node_text, get_start_column,
    get_start_line,
};
use super::ImportStatement;
use crate::error::{ReconError, Result};

/// Parse Python source code into a syntax tree.
///
/// tree-sitter recovers from syntax errors; this function does not. Any error
/// or missing-token node makes the whole file a [`ReconError::Syntax`].
pub fn parse(source: &str, path: &Path) -> Result<Tree> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_python::LANGUAGE.into())
        .map_err(|e| ReconError::Language(e.to_string()))?;

    let tree = parser
        .parse(source, None)
        .ok_or_else(|| ReconError::syntax(path, 0, 0, "parser produced no tree"))?;

    if let Some(error) = find_first_error(tree.root_node()) {
        let message = if error.is_missing() {
            format!("missing {}", error.kind())
        } else {
            let snippet = get_node_text(&error, source)
                .lines()
                .next()
                .unwrap_or_default()
                .trim();
            format!("invalid syntax near '{snippet}'")
        };
        return Err(ReconError::syntax(
            path,
            get_start_line(&error),
            get_start_column(&error),
            message,
        ));
    }

    Ok(tree)
}

/// Collect every import statement in the module, in source order.
///
/// Imports nested in functions, classes or conditional blocks are included;
/// `from __future__` imports are not.
pub fn extract_imports(tree: &Tree, source: &str) -> Vec<ImportStatement> {
    let mut imports = Vec::new();
    let mut stack = vec![tree.root_node()];

    while let Some(node) = stack.pop() {
        match node.kind() {
            "import_statement" => imports.push(extract_import(&node, source)),
            "import_from_statement" => imports.push(extract_from_import(&node, source)),
            _ => {
                let mut cursor = node.walk();
                let children: Vec<Node> = node.named_children(&mut cursor).collect();
                stack.extend(children.into_iter().rev());
            }
        }
    }

    imports
}

/// `import a.b, c as d` -> `Import { names: ["a.b", "c"] }`
fn extract_import(node: &Node, source: &str) -> ImportStatement {
    let mut names = Vec::new();
    let mut cursor = node.walk();
    for child in node.children_by_field_name("name", &mut cursor) {
        let dotted = match child.kind() {
            "aliased_import" => child.child_by_field_name("name"),
            "dotted_name" => Some(child),
            _ => None,
        };
        if let Some(dotted) = dotted {
            names.push(get_dotted_text(&dotted, source));
        }
    }
    ImportStatement::Import { names }
}

/// `from ..core import x` -> `From { level: 2, module: Some("core") }`
fn extract_from_import(node: &Node, source: &str) -> ImportStatement {
    let Some(module_node) = node.child_by_field_name("module_name") else {
        return ImportStatement::From {
            level: 0,
            module: None,
        };
    };

    match module_node.kind() {
        "relative_import" => {
            let level = find_child_by_type(&module_node, "import_prefix")
                .map(|prefix| {
                    get_node_text(&prefix, source)
                        .chars()
                        .filter(|&c| c == '.')
                        .count()
                })
                .unwrap_or(0);
            let module = find_child_by_type(&module_node, "dotted_name")
                .map(|name| get_dotted_text(&name, source));
            ImportStatement::From { level, module }
        }
        _ => ImportStatement::From {
            level: 0,
            module: Some(get_dotted_text(&module_node, source)),
        },
    }
}
