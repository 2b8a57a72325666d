use tracing::debug;

use crate::operations::{Finding, FixUnavailable, MessageKind};
use crate::plugin::RuleContext;
use crate::syntax::{Field, NodeId, NodeKind, SyntaxTree};

use super::{
    build_fix, captured_type_reference, derive_name, resolve_insertion_point, AnnotationRole,
    InsertionPoint, TypeAnnotationContext,
};

pub fn check_variable_binding(cx: &mut RuleContext<'_>, binding: NodeId) {
    if let Some(annotation) = cx.tree.child_by_field(binding, Field::Type) {
        check_annotation(
            cx,
            TypeAnnotationContext {
                annotation,
                owner: binding,
                role: AnnotationRole::VariableBinding,
            },
        );
    }
}

pub fn check_class_property(cx: &mut RuleContext<'_>, property: NodeId) {
    if let Some(annotation) = cx.tree.child_by_field(property, Field::Type) {
        check_annotation(
            cx,
            TypeAnnotationContext {
                annotation,
                owner: property,
                role: AnnotationRole::ClassProperty,
            },
        );
    }
}

/// Parameters first, in source order, then the return type.
pub fn check_function(cx: &mut RuleContext<'_>, function: NodeId) {
    let tree = cx.tree;

    if let Some(parameters) = tree.child_by_field(function, Field::Parameters) {
        for &parameter in tree.children(parameters) {
            if tree.kind(parameter) != NodeKind::Parameter {
                continue;
            }
            if let Some(annotation) = tree.child_by_field(parameter, Field::Type) {
                check_annotation(
                    cx,
                    TypeAnnotationContext {
                        annotation,
                        owner: parameter,
                        role: parameter_role(tree, parameter),
                    },
                );
            }
        }
    }

    // Type predicates and `asserts` annotations are never object literals.
    if let Some(annotation) = tree
        .child_by_field(function, Field::ReturnType)
        .filter(|&node| tree.kind(node) == NodeKind::TypeAnnotation)
    {
        check_annotation(
            cx,
            TypeAnnotationContext {
                annotation,
                owner: function,
                role: AnnotationRole::FunctionReturn,
            },
        );
    }
}

fn parameter_role(tree: &SyntaxTree, parameter: NodeId) -> AnnotationRole {
    let has_modifier = tree
        .first_child_of_kind(parameter, NodeKind::ParameterModifier)
        .is_some();

    match tree
        .child_by_field(parameter, Field::Pattern)
        .map(|pattern| tree.kind(pattern))
    {
        Some(NodeKind::Identifier) if has_modifier => AnnotationRole::ParameterProperty,
        Some(NodeKind::Identifier) => AnnotationRole::FunctionParameter,
        Some(NodeKind::ObjectPattern) => AnnotationRole::DestructuredObjectParameter,
        Some(NodeKind::ArrayPattern) => AnnotationRole::DestructuredArrayParameter,
        _ => AnnotationRole::Unknown,
    }
}

/// The object-type literal occupying the annotation slot itself, if any.
/// Literals nested deeper belong to their enclosing type.
fn annotated_literal(tree: &SyntaxTree, annotation: NodeId) -> Option<NodeId> {
    if tree.kind(annotation) != NodeKind::TypeAnnotation {
        return None;
    }
    tree.children(annotation)
        .iter()
        .copied()
        .find(|&child| tree.kind(child) != NodeKind::Comment)
        .filter(|&child| tree.kind(child) == NodeKind::ObjectTypeLiteral)
}

fn check_annotation(cx: &mut RuleContext<'_>, ctx: TypeAnnotationContext) {
    let tree = cx.tree;
    let Some(literal) = annotated_literal(tree, ctx.annotation) else {
        return;
    };
    let range = tree.range(literal);
    if !range.is_multiline() {
        return;
    }

    let derived = derive_name(tree, &ctx);
    let anchor = match resolve_insertion_point(tree, ctx.annotation) {
        InsertionPoint::Anchor(anchor) => match captured_type_reference(tree, literal, anchor) {
            None => Ok(anchor),
            Some(captured) => {
                debug!(
                    line = range.start.line,
                    column = range.start.column,
                    alias = %derived,
                    captured = %captured,
                    "inline type literal uses a name bound below the insertion point; fix withheld"
                );
                Err(FixUnavailable::CapturesTypeParameter)
            }
        },
        InsertionPoint::Unresolved => {
            debug!(
                line = range.start.line,
                column = range.start.column,
                alias = %derived,
                "no enclosing statement for inline type literal; fix withheld"
            );
            Err(FixUnavailable::NoInsertionPoint)
        }
    };

    let (alias_name, fix) = match anchor {
        Ok(anchor) => {
            let name = cx.names.claim(&derived);
            let fix = build_fix(tree, literal, &name, anchor);
            (name, Ok(fix))
        }
        Err(reason) => (derived, Err(reason)),
    };

    cx.report(Finding {
        message: MessageKind::InlineTypeLiteral,
        range,
        alias_name,
        fix,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::syntax::Dialect;

    fn roles(source: &str) -> Vec<AnnotationRole> {
        let tree = parse(source, Dialect::TypeScript).unwrap();
        tree.preorder()
            .filter(|&id| tree.kind(id) == NodeKind::Parameter)
            .map(|id| parameter_role(&tree, id))
            .collect()
    }

    #[test]
    fn test_parameter_roles() {
        let source = "class A {\n  constructor(private svc: S, readonly opts: O, plain: P) {}\n}\n\
                      function f({ a }: X, [b]: Y) {}\n";
        assert_eq!(
            roles(source),
            vec![
                AnnotationRole::ParameterProperty,
                AnnotationRole::ParameterProperty,
                AnnotationRole::FunctionParameter,
                AnnotationRole::DestructuredObjectParameter,
                AnnotationRole::DestructuredArrayParameter,
            ]
        );
    }

    #[test]
    fn test_annotated_literal_only_direct_slot() {
        let source = "let a: { x: number };\nlet b: Array<{ x: number }>;\n";
        let tree = parse(source, Dialect::TypeScript).unwrap();
        let literals: Vec<_> = tree
            .preorder()
            .filter(|&id| tree.kind(id) == NodeKind::TypeAnnotation)
            .filter_map(|id| annotated_literal(&tree, id))
            .collect();
        assert_eq!(literals.len(), 1);
        assert_eq!(tree.text(literals[0]), "{ x: number }");
    }
}
