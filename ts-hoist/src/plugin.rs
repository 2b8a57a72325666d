//! Host-facing registration for the rule: metadata, the visitor table and
//! the reporting channel. Kept thin so the rule helpers stay host-agnostic.

use serde::Serialize;

use crate::operations::{Finding, MessageKind};
use crate::rule::{self, NameScope};
use crate::syntax::{NodeId, NodeKind, SyntaxTree};

#[derive(Debug, Clone, Copy, Serialize)]
pub struct RuleMeta {
    pub name: &'static str,
    pub description: &'static str,
    pub fixable: bool,
    pub messages: &'static [MessageKind],
}

pub const META: RuleMeta = RuleMeta {
    name: "no-multiline-inline-type",
    description: "Disallow multiline inline object type annotations; hoist them into named type aliases.",
    fixable: true,
    messages: &[MessageKind::InlineTypeLiteral],
};

/// Receives findings as the rule produces them.
pub trait Reporter {
    fn report(&mut self, finding: Finding);
}

impl Reporter for Vec<Finding> {
    fn report(&mut self, finding: Finding) {
        self.push(finding);
    }
}

/// Per-pass state handed to every visitor.
pub struct RuleContext<'a> {
    pub tree: &'a SyntaxTree,
    pub names: NameScope,
    reporter: &'a mut dyn Reporter,
}

impl<'a> RuleContext<'a> {
    pub fn new(tree: &'a SyntaxTree, names: NameScope, reporter: &'a mut dyn Reporter) -> Self {
        Self {
            tree,
            names,
            reporter,
        }
    }

    pub fn report(&mut self, finding: Finding) {
        self.reporter.report(finding);
    }
}

pub type Visitor = fn(&mut RuleContext<'_>, NodeId);

/// Node kinds that have a visitor.
pub const VISITED_KINDS: [NodeKind; 6] = [
    NodeKind::VariableBinding,
    NodeKind::ClassPropertyDefinition,
    NodeKind::FunctionDeclaration,
    NodeKind::FunctionExpression,
    NodeKind::ArrowFunction,
    NodeKind::MethodDefinition,
];

/// The visitor table. No wildcard arm: a new `NodeKind` must be placed here.
pub fn visitor(kind: NodeKind) -> Option<Visitor> {
    match kind {
        NodeKind::VariableBinding => Some(rule::check_variable_binding as Visitor),
        NodeKind::ClassPropertyDefinition => Some(rule::check_class_property as Visitor),
        NodeKind::FunctionDeclaration
        | NodeKind::FunctionExpression
        | NodeKind::ArrowFunction
        | NodeKind::MethodDefinition => Some(rule::check_function as Visitor),
        NodeKind::Program
        | NodeKind::Block
        | NodeKind::ExportWrapper
        | NodeKind::AmbientWrapper
        | NodeKind::VariableDeclaration
        | NodeKind::ClassDeclaration
        | NodeKind::ClassBody
        | NodeKind::FormalParameters
        | NodeKind::Parameter
        | NodeKind::ParameterModifier
        | NodeKind::TypeAnnotation
        | NodeKind::ObjectTypeLiteral
        | NodeKind::TypeAliasDeclaration
        | NodeKind::InterfaceDeclaration
        | NodeKind::EnumDeclaration
        | NodeKind::ImportStatement
        | NodeKind::Identifier
        | NodeKind::TypeIdentifier
        | NodeKind::PropertyIdentifier
        | NodeKind::PrivatePropertyIdentifier
        | NodeKind::TypeParameters
        | NodeKind::TypeParameter
        | NodeKind::This
        | NodeKind::ObjectPattern
        | NodeKind::ArrayPattern
        | NodeKind::Comment
        | NodeKind::Error
        | NodeKind::Other => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visited_kinds_match_table() {
        for kind in VISITED_KINDS {
            assert!(visitor(kind).is_some(), "{kind:?} should be visited");
        }
        assert!(visitor(NodeKind::TypeAliasDeclaration).is_none());
        assert!(visitor(NodeKind::ObjectTypeLiteral).is_none());
        assert!(visitor(NodeKind::InterfaceDeclaration).is_none());
    }

    #[test]
    fn test_meta_serializes() {
        let json = serde_json::to_value(META).unwrap();
        assert_eq!(json["name"], "no-multiline-inline-type");
        assert_eq!(json["fixable"], true);
        assert_eq!(json["messages"][0], "inlineTypeLiteral");
    }
}
