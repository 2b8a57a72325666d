use std::collections::HashSet;

use crate::syntax::{Field, NodeId, NodeKind, SyntaxTree};

/// A name used inside `literal` that would be out of scope once the literal
/// is hoisted to just before `anchor`.
///
/// That is `this`, or a type parameter declared on the anchor or on any node
/// between the literal and the anchor. Type parameters declared further out
/// still enclose the anchor and stay in scope.
pub fn captured_type_reference(tree: &SyntaxTree, literal: NodeId, anchor: NodeId) -> Option<String> {
    let declared: HashSet<&str> = tree
        .ancestors(literal)
        .take_while(|&id| id != anchor)
        .chain(std::iter::once(anchor))
        .flat_map(|scope| type_parameter_names(tree, scope))
        .collect();

    tree.descendants(literal).find_map(|id| match tree.kind(id) {
        NodeKind::This => Some("this".to_string()),
        NodeKind::TypeIdentifier if declared.contains(tree.text(id)) => {
            Some(tree.text(id).to_string())
        }
        _ => None,
    })
}

/// `<T, U extends X>` on `scope` → `["T", "U"]`.
fn type_parameter_names(tree: &SyntaxTree, scope: NodeId) -> Vec<&str> {
    tree.children(scope)
        .iter()
        .filter(|&&child| tree.kind(child) == NodeKind::TypeParameters)
        .flat_map(|&list| tree.children(list).iter().copied())
        .filter(|&param| tree.kind(param) == NodeKind::TypeParameter)
        .filter_map(|param| tree.child_by_field(param, Field::Name))
        .map(|name| tree.text(name))
        .collect()
}
