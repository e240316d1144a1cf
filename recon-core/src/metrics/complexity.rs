//! Cyclomatic complexity of Python blocks.
//!
//! Calculates McCabe complexity per block (function, method, class) by
//! counting decision points in the tree-sitter AST, scored the way radon
//! scores them:
//!
//! - function / method: 1 + decision points in its body. Nested functions
//!   and classes are not counted and are not blocks of their own.
//! - class: `1 + class-level decisions + sum(method complexity)`, averaged
//!   over the methods (`real / n + (n > 1)`), or the raw value when the class
//!   has no methods.
//!
//! Module-level code outside any block contributes nothing, so a file
//! without blocks has complexity 0.

use once_cell::sync::Lazy;
use std::collections::HashSet;
use tree_sitter::{Node, Tree};

/// Decision point node types (tree-sitter-python node names).
static DECISION_POINTS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        "if_statement",
        "elif_clause",
        "for_statement",
        "while_statement",
        "except_clause",
        "except_group_clause",
        "assert_statement",
        "boolean_operator", // 'and', 'or' wrapped by tree-sitter
        "conditional_expression", // ternary
        "case_clause",
        // Comprehension clauses (count each loop/condition inside)
        "for_in_clause",
        "if_clause",
    ])
});

/// Statements whose `else` branch is an extra path.
static ELSE_OWNERS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| HashSet::from(["for_statement", "while_statement", "try_statement"]));

/// Kind of complexity block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockKind {
    Function,
    Method,
    Class,
}

/// A scored block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Block {
    pub name: String,
    pub kind: BlockKind,
    pub line: usize,
    pub complexity: u32,
}

/// Collect every block of the module with its complexity.
pub fn analyze(tree: &Tree, source: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    collect_blocks(tree.root_node(), source, &mut blocks);
    blocks
}

/// Sum of block complexities for the module.
pub fn total_complexity(tree: &Tree, source: &str) -> u32 {
    analyze(tree, source).iter().map(|b| b.complexity).sum()
}

fn collect_blocks(node: Node, source: &str, blocks: &mut Vec<Block>) {
    match node.kind() {
        "function_definition" => blocks.push(function_block(&node, source, BlockKind::Function)),
        "class_definition" => class_blocks(&node, source, blocks),
        _ => {
            let mut cursor = node.walk();
            for child in node.named_children(&mut cursor) {
                collect_blocks(child, source, blocks);
            }
        }
    }
}

fn block_name(node: &Node, source: &str) -> String {
    node.child_by_field_name("name")
        .and_then(|n| n.utf8_text(source.as_bytes()).ok())
        .unwrap_or("<anonymous>")
        .to_string()
}

fn function_block(node: &Node, source: &str, kind: BlockKind) -> Block {
    let complexity = 1 + node
        .child_by_field_name("body")
        .map_or(0, |body| count_decisions(&body));
    Block {
        name: block_name(node, source),
        kind,
        line: node.start_position().row + 1,
        complexity,
    }
}

/// Unwrap `@decorator def f()` to the inner definition.
fn definition_of<'a>(node: Node<'a>) -> Node<'a> {
    if node.kind() == "decorated_definition" {
        node.child_by_field_name("definition").unwrap_or(node)
    } else {
        node
    }
}

fn class_blocks(node: &Node, source: &str, blocks: &mut Vec<Block>) {
    let mut methods = Vec::new();
    let mut class_level = 0u32;

    if let Some(body) = node.child_by_field_name("body") {
        let mut cursor = body.walk();
        for statement in body.named_children(&mut cursor) {
            let definition = definition_of(statement);
            match definition.kind() {
                "function_definition" => {
                    methods.push(function_block(&definition, source, BlockKind::Method));
                }
                // Inner classes are neither blocks nor part of the outer score.
                "class_definition" => {}
                _ => class_level += count_decisions(&statement),
            }
        }
    }

    let real = 1 + class_level + methods.iter().map(|m| m.complexity).sum::<u32>();
    let complexity = match methods.len() as u32 {
        0 => real,
        n => real / n + u32::from(n > 1),
    };

    blocks.push(Block {
        name: block_name(node, source),
        kind: BlockKind::Class,
        line: node.start_position().row + 1,
        complexity,
    });
    blocks.extend(methods);
}

/// Count decision points under `node`, not descending into nested
/// function or class definitions.
fn count_decisions(node: &Node) -> u32 {
    let mut count = 0u32;
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        let kind = child.kind();
        if kind == "function_definition" || kind == "class_definition" {
            continue;
        }
        if DECISION_POINTS.contains(kind) {
            count += 1;
        } else if kind == "else_clause" && ELSE_OWNERS.contains(node.kind()) {
            count += 1;
        }
        count += count_decisions(&child);
    }
    count
}
