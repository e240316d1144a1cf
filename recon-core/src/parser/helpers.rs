//! Helper functions for tree-sitter AST navigation.

use tree_sitter::Node;

/// Get the text content of a node.
pub fn get_node_text<'a>(node: &Node, source: &'a str) -> &'a str {
    let start = node.start_byte();
    let end = node.end_byte();
    if start < source.len() && end <= source.len() && start < end {
        &source[start..end]
    } else {
        ""
    }
}

/// Get a dotted name with any interior whitespace removed (`a . b` -> `a.b`).
pub fn get_dotted_text(node: &Node, source: &str) -> String {
    get_node_text(node, source)
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}

/// Find the first child of a specific type.
#[allow(clippy::manual_find)]
pub fn find_child_by_type<'a>(node: &Node<'a>, type_name: &str) -> Option<Node<'a>> {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() == type_name {
            return Some(child);
        }
    }
    None
}

/// Find the first node in the subtree that tree-sitter flagged as an error
/// or as a missing token.
pub fn find_first_error<'a>(node: Node<'a>) -> Option<Node<'a>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if let Some(found) = find_first_error(child) {
            return Some(found);
        }
    }
    None
}

/// Get line number (1-indexed) from a node.
pub fn get_start_line(node: &Node) -> usize {
    node.start_position().row + 1
}

/// Get column number (1-indexed) from a node.
pub fn get_start_column(node: &Node) -> usize {
    node.start_position().column + 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use tree_sitter::Parser;

    fn parse(source: &str) -> tree_sitter::Tree {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .unwrap();
        parser.parse(source, None).unwrap()
    }

    #[test]
    fn test_find_first_error_on_clean_source() {
        let tree = parse("x = 1\n");
        assert!(find_first_error(tree.root_node()).is_none());
    }

    #[test]
    fn test_find_first_error_reports_position() {
        let source = "x = 1\ndef broken(:\n    pass\n";
        let tree = parse(source);
        let error = find_first_error(tree.root_node()).unwrap();
        assert_eq!(get_start_line(&error), 2);
    }

    #[test]
    fn test_get_dotted_text() {
        let source = "import a.b.c\n";
        let tree = parse(source);
        let stmt = tree.root_node().child(0).unwrap();
        let name = find_child_by_type(&stmt, "dotted_name").unwrap();
        assert_eq!(get_dotted_text(&name, source), "a.b.c");
    }
}
