use std::collections::HashSet;

use crate::syntax::{Field, NodeId, NodeKind, SyntaxTree};

use super::{AnnotationRole, TypeAnnotationContext};

/// Name used when no naming rule applies.
pub const FALLBACK_NAME: &str = "ExtractedType";

/// Derive the alias name for the literal held by `ctx`.
///
/// Pure and deterministic. Never fails: anything unexpected yields
/// [`FALLBACK_NAME`].
pub fn derive_name(tree: &SyntaxTree, ctx: &TypeAnnotationContext) -> String {
    derive(tree, ctx)
        .filter(|name| is_valid_identifier(name))
        .unwrap_or_else(|| FALLBACK_NAME.to_string())
}

fn derive(tree: &SyntaxTree, ctx: &TypeAnnotationContext) -> Option<String> {
    match ctx.role {
        AnnotationRole::VariableBinding => {
            let name = named_child(tree, ctx.owner, Field::Name, &[NodeKind::Identifier])?;
            Some(format!("{}Type", pascal_case(name)))
        }
        AnnotationRole::FunctionParameter | AnnotationRole::ParameterProperty => {
            let name = named_child(tree, ctx.owner, Field::Pattern, &[NodeKind::Identifier])?;
            Some(format!("{}Type", pascal_case(name)))
        }
        AnnotationRole::DestructuredObjectParameter => {
            let function_name = tree
                .ancestors(ctx.owner)
                .find(|&id| tree.kind(id).is_function_like())
                .and_then(|function| function_name(tree, function));
            Some(match function_name {
                Some(name) => format!("{}Props", pascal_case(name)),
                None => "PropsType".to_string(),
            })
        }
        AnnotationRole::DestructuredArrayParameter => Some("ParamsType".to_string()),
        AnnotationRole::ClassProperty => {
            let name = named_child(
                tree,
                ctx.owner,
                Field::Name,
                &[NodeKind::PropertyIdentifier, NodeKind::PrivatePropertyIdentifier],
            )?;
            Some(format!("{}Type", pascal_case(name.trim_start_matches('#'))))
        }
        AnnotationRole::FunctionReturn => {
            let base = function_name(tree, ctx.owner)
                .or_else(|| assigned_variable_name(tree, ctx.owner))
                .map_or_else(|| "Function".to_string(), pascal_case);
            Some(format!("{base}ReturnType"))
        }
        AnnotationRole::Unknown => None,
    }
}

fn named_child<'t>(
    tree: &'t SyntaxTree,
    owner: NodeId,
    field: Field,
    kinds: &[NodeKind],
) -> Option<&'t str> {
    tree.child_by_field(owner, field)
        .filter(|&child| kinds.contains(&tree.kind(child)))
        .map(|child| tree.text(child))
}

/// Own name of a function or method, if it has a plain one. A private
/// method's `#` is dropped.
fn function_name(tree: &SyntaxTree, function: NodeId) -> Option<&str> {
    named_child(
        tree,
        function,
        Field::Name,
        &[
            NodeKind::Identifier,
            NodeKind::PropertyIdentifier,
            NodeKind::PrivatePropertyIdentifier,
        ],
    )
    .map(|name| name.trim_start_matches('#'))
}

/// `const fetchData = function () {}` / `const fetchData = () => {}`.
fn assigned_variable_name(tree: &SyntaxTree, function: NodeId) -> Option<&str> {
    let node = tree.node(function);
    let binding = node.parent.filter(|&parent| {
        tree.kind(parent) == NodeKind::VariableBinding && node.field == Some(Field::Value)
    })?;
    named_child(tree, binding, Field::Name, &[NodeKind::Identifier])
}

/// `snake_case` → `SnakeCase`; the first character is upper-cased.
///
/// Only an underscore followed by a letter is collapsed.
pub fn pascal_case(name: &str) -> String {
    let mut collapsed = String::with_capacity(name.len());
    let mut chars = name.chars().peekable();
    while let Some(c) = chars.next() {
        match chars.peek() {
            Some(&next) if c == '_' && next.is_alphabetic() => {
                collapsed.extend(next.to_uppercase());
                chars.next();
            }
            _ => collapsed.push(c),
        }
    }

    let mut chars = collapsed.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => collapsed,
    }
}

pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' || first == '$' => {
            chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
        }
        _ => false,
    }
}

/// Type-space names already taken in one file.
///
/// Seeded from the file's own declarations and imports; every name handed
/// out by [`NameScope::claim`] is recorded so later findings in the same
/// pass see it too.
#[derive(Debug, Clone, Default)]
pub struct NameScope {
    taken: HashSet<String>,
    disambiguate: bool,
}

impl NameScope {
    pub fn from_tree(tree: &SyntaxTree, disambiguate: bool) -> Self {
        let mut taken = HashSet::new();
        for id in tree.preorder() {
            match tree.kind(id) {
                NodeKind::TypeAliasDeclaration
                | NodeKind::InterfaceDeclaration
                | NodeKind::ClassDeclaration
                | NodeKind::EnumDeclaration => {
                    if let Some(name) = tree.child_by_field(id, Field::Name) {
                        taken.insert(tree.text(name).to_string());
                    }
                }
                NodeKind::Identifier | NodeKind::TypeIdentifier
                    if tree
                        .ancestors(id)
                        .any(|ancestor| tree.kind(ancestor) == NodeKind::ImportStatement) =>
                {
                    taken.insert(tree.text(id).to_string());
                }
                _ => {}
            }
        }
        Self {
            taken,
            disambiguate,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.taken.contains(name)
    }

    /// Reserve `base`, or `base2`, `base3`, … when it is taken.
    ///
    /// With disambiguation off, `base` is returned unchanged.
    pub fn claim(&mut self, base: &str) -> String {
        if !self.disambiguate {
            return base.to_string();
        }

        let mut candidate = base.to_string();
        let mut suffix = 2usize;
        while self.taken.contains(&candidate) {
            candidate = format!("{base}{suffix}");
            suffix += 1;
        }
        self.taken.insert(candidate.clone());
        candidate
    }
}
