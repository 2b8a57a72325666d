use crate::syntax::{NodeId, NodeKind, SyntaxTree};

/// Where the alias declaration goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertionPoint {
    /// Insert immediately before this statement.
    Anchor(NodeId),
    /// No statement-level declaration encloses the annotation.
    Unresolved,
}

fn is_target(kind: NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::VariableDeclaration
            | NodeKind::FunctionDeclaration
            | NodeKind::ClassDeclaration
            | NodeKind::TypeAliasDeclaration
            | NodeKind::InterfaceDeclaration
    )
}

fn is_wrapper(kind: NodeKind) -> bool {
    matches!(kind, NodeKind::ExportWrapper | NodeKind::AmbientWrapper)
}

fn is_container(kind: NodeKind) -> bool {
    matches!(kind, NodeKind::Program | NodeKind::Block) || is_wrapper(kind)
}

fn wraps_target(tree: &SyntaxTree, wrapper: NodeId) -> bool {
    tree.children(wrapper)
        .iter()
        .any(|&child| is_target(tree.kind(child)))
}

/// `export declare const x` nests two wrappers; the alias goes before both.
fn outermost_wrapper(tree: &SyntaxTree, wrapper: NodeId) -> NodeId {
    let mut current = wrapper;
    while let Some(parent) = tree.parent(current).filter(|&p| is_wrapper(tree.kind(p))) {
        current = parent;
    }
    current
}

/// Walk up from `annotation` to the nearest declaration that sits directly
/// in a statement container.
///
/// A declaration inside an export (or `declare`) wrapper resolves to the
/// wrapper, so the alias never lands between `export` and the declaration.
/// Ascent stops at the program root.
pub fn resolve_insertion_point(tree: &SyntaxTree, annotation: NodeId) -> InsertionPoint {
    let chain = std::iter::once(annotation).chain(tree.ancestors(annotation));

    for current in chain {
        let kind = tree.kind(current);
        if kind == NodeKind::Program {
            break;
        }
        if is_wrapper(kind) && wraps_target(tree, current) {
            return InsertionPoint::Anchor(outermost_wrapper(tree, current));
        }
        if !is_target(kind) {
            continue;
        }
        match tree.parent(current) {
            Some(parent) if is_wrapper(tree.kind(parent)) => {
                return InsertionPoint::Anchor(outermost_wrapper(tree, parent));
            }
            Some(parent) if is_container(tree.kind(parent)) => {
                return InsertionPoint::Anchor(current);
            }
            _ => {}
        }
    }

    InsertionPoint::Unresolved
}
