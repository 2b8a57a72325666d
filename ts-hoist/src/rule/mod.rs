//! The `no-multiline-inline-type` rule.
//!
//! The matcher finds multiline object-type literals sitting directly in an
//! annotation slot, then asks pure helpers for a name, an anchor statement
//! and the pair of edits. A literal that uses a type parameter or `this`
//! bound between it and the anchor keeps its finding but gets no fix. None
//! of the helpers mutates the tree.

mod capture;
mod insertion;
mod matcher;
mod naming;
mod rewrite;

pub use capture::captured_type_reference;
pub use insertion::{resolve_insertion_point, InsertionPoint};
pub use matcher::{check_class_property, check_function, check_variable_binding};
pub use naming::{derive_name, is_valid_identifier, pascal_case, NameScope, FALLBACK_NAME};
pub use rewrite::{alias_declaration, build_fix};

use crate::syntax::NodeId;

/// Syntactic role of the annotation that holds a candidate literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotationRole {
    VariableBinding,
    FunctionParameter,
    ParameterProperty,
    DestructuredObjectParameter,
    DestructuredArrayParameter,
    ClassProperty,
    FunctionReturn,
    Unknown,
}

/// A type annotation paired with the node that owns it.
///
/// `owner` is the binding, parameter or class property for most roles, and
/// the function itself for [`AnnotationRole::FunctionReturn`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeAnnotationContext {
    pub annotation: NodeId,
    pub owner: NodeId,
    pub role: AnnotationRole,
}
