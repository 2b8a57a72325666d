//! Parser adapter: tree-sitter-typescript → [`SyntaxTree`].

use tracing::trace;
use tree_sitter::{Language, Node, Parser};

use crate::error::{HoistError, Result};
use crate::syntax::{Dialect, Field, NodeId, NodeKind, Position, SyntaxNode, SyntaxTree, TextRange};

fn language(dialect: Dialect) -> Language {
    match dialect {
        Dialect::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
        Dialect::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
    }
}

/// Parse `source` and lower the result into an arena tree.
///
/// Sources with syntax errors still produce a tree; check
/// [`SyntaxTree::has_errors`].
pub fn parse(source: &str, dialect: Dialect) -> Result<SyntaxTree> {
    let mut parser = Parser::new();
    parser
        .set_language(&language(dialect))
        .map_err(|e| HoistError::ParserSetup(e.to_string()))?;

    let tree = parser.parse(source, None).ok_or(HoistError::ParseFailed)?;
    let root = tree.root_node();
    let nodes = lower(root);
    trace!(nodes = nodes.len(), has_error = root.has_error(), "lowered syntax tree");

    Ok(SyntaxTree::from_parts(
        source.to_owned(),
        nodes,
        root.has_error(),
    ))
}

/// Anonymous tokens worth keeping. `readonly` on a parameter marks a
/// parameter property just like an accessibility modifier does.
fn is_kept_token(parent_kind: &str, kind: &str) -> bool {
    kind == "readonly" && matches!(parent_kind, "required_parameter" | "optional_parameter")
}

fn range_of(node: &Node<'_>) -> TextRange {
    let start = node.start_position();
    let end = node.end_position();
    TextRange {
        start: Position {
            line: start.row + 1,
            column: start.column + 1,
        },
        end: Position {
            line: end.row + 1,
            column: end.column + 1,
        },
        start_byte: node.start_byte(),
        end_byte: node.end_byte(),
    }
}

/// Pre-order lowering with an explicit work stack, so deeply nested sources
/// cannot overflow the call stack.
fn lower(root: Node<'_>) -> Vec<SyntaxNode> {
    let mut nodes: Vec<SyntaxNode> = Vec::new();
    let mut pending: Vec<(Node<'_>, Option<NodeId>, Option<Field>)> = vec![(root, None, None)];

    while let Some((node, parent, field)) = pending.pop() {
        let id = NodeId::new(nodes.len());
        nodes.push(SyntaxNode {
            kind: NodeKind::from_grammar(node.kind()),
            grammar_kind: node.kind(),
            field,
            range: range_of(&node),
            parent,
            children: Vec::new(),
        });
        if let Some(parent) = parent {
            nodes[parent.index()].children.push(id);
        }

        let mut children = Vec::new();
        let mut cursor = node.walk();
        if cursor.goto_first_child() {
            loop {
                let child = cursor.node();
                if child.is_named() || is_kept_token(node.kind(), child.kind()) {
                    let field = cursor.field_name().and_then(Field::from_grammar);
                    children.push((child, Some(id), field));
                }
                if !cursor.goto_next_sibling() {
                    break;
                }
            }
        }
        // Reverse so the first child is popped next.
        pending.extend(children.into_iter().rev());
    }

    nodes
}
