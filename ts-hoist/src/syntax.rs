//! Arena-backed syntax tree for TypeScript sources.
//!
//! The tree owns every node top-down in a flat `Vec`. Children are listed by
//! id on their parent; the `parent` link is a plain index used only for
//! upward navigation and never implies ownership.

use serde::{Deserialize, Serialize};

/// Index of a node inside its [`SyntaxTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Closed set of node kinds the rule cares about.
///
/// Grammar kinds without a dedicated variant lower to [`NodeKind::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    Program,
    Block,
    ExportWrapper,
    AmbientWrapper,
    VariableDeclaration,
    VariableBinding,
    FunctionDeclaration,
    FunctionExpression,
    ArrowFunction,
    MethodDefinition,
    ClassDeclaration,
    ClassBody,
    ClassPropertyDefinition,
    FormalParameters,
    Parameter,
    ParameterModifier,
    TypeAnnotation,
    ObjectTypeLiteral,
    TypeAliasDeclaration,
    InterfaceDeclaration,
    EnumDeclaration,
    ImportStatement,
    Identifier,
    TypeIdentifier,
    PropertyIdentifier,
    PrivatePropertyIdentifier,
    TypeParameters,
    TypeParameter,
    This,
    ObjectPattern,
    ArrayPattern,
    Comment,
    Error,
    Other,
}

impl NodeKind {
    /// Map a tree-sitter-typescript grammar kind onto the closed set.
    pub fn from_grammar(kind: &str) -> Self {
        match kind {
            "program" => Self::Program,
            "statement_block" => Self::Block,
            "export_statement" => Self::ExportWrapper,
            "ambient_declaration" => Self::AmbientWrapper,
            "lexical_declaration" | "variable_declaration" => Self::VariableDeclaration,
            "variable_declarator" => Self::VariableBinding,
            "function_declaration" | "generator_function_declaration" => {
                Self::FunctionDeclaration
            }
            "function_expression" | "function" | "generator_function" => {
                Self::FunctionExpression
            }
            "arrow_function" => Self::ArrowFunction,
            "method_definition" => Self::MethodDefinition,
            "class_declaration" | "abstract_class_declaration" => Self::ClassDeclaration,
            "class_body" => Self::ClassBody,
            "public_field_definition" => Self::ClassPropertyDefinition,
            "formal_parameters" => Self::FormalParameters,
            "required_parameter" | "optional_parameter" => Self::Parameter,
            "accessibility_modifier" | "override_modifier" | "readonly" => {
                Self::ParameterModifier
            }
            "type_annotation" => Self::TypeAnnotation,
            "object_type" => Self::ObjectTypeLiteral,
            "type_alias_declaration" => Self::TypeAliasDeclaration,
            "interface_declaration" => Self::InterfaceDeclaration,
            "enum_declaration" => Self::EnumDeclaration,
            "import_statement" => Self::ImportStatement,
            "identifier" => Self::Identifier,
            "type_identifier" => Self::TypeIdentifier,
            "property_identifier" => Self::PropertyIdentifier,
            "private_property_identifier" => Self::PrivatePropertyIdentifier,
            "type_parameters" => Self::TypeParameters,
            "type_parameter" => Self::TypeParameter,
            "this_type" | "this" => Self::This,
            "object_pattern" => Self::ObjectPattern,
            "array_pattern" => Self::ArrayPattern,
            "comment" => Self::Comment,
            "ERROR" => Self::Error,
            _ => Self::Other,
        }
    }

    /// Function-like nodes: annotation sites for parameters and return type.
    pub fn is_function_like(self) -> bool {
        matches!(
            self,
            Self::FunctionDeclaration
                | Self::FunctionExpression
                | Self::ArrowFunction
                | Self::MethodDefinition
        )
    }
}

/// Grammar field a node occupies inside its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Type,
    Value,
    Pattern,
    Parameters,
    ReturnType,
    Body,
    Declaration,
}

impl Field {
    pub fn from_grammar(field: &str) -> Option<Self> {
        match field {
            "name" => Some(Self::Name),
            "type" => Some(Self::Type),
            "value" => Some(Self::Value),
            "pattern" => Some(Self::Pattern),
            "parameters" => Some(Self::Parameters),
            "return_type" => Some(Self::ReturnType),
            "body" => Some(Self::Body),
            "declaration" => Some(Self::Declaration),
            _ => None,
        }
    }
}

/// A 1-based line/column position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

/// Source range of a node: 1-based line/column plus byte offsets into the
/// buffer held by the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRange {
    pub start: Position,
    pub end: Position,
    pub start_byte: usize,
    pub end_byte: usize,
}

impl TextRange {
    pub fn is_multiline(&self) -> bool {
        self.end.line > self.start.line
    }

    pub fn contains(&self, other: &TextRange) -> bool {
        self.start_byte <= other.start_byte && other.end_byte <= self.end_byte
    }
}

#[derive(Debug, Clone)]
pub struct SyntaxNode {
    pub kind: NodeKind,
    /// Raw grammar kind, kept for diagnostics.
    pub grammar_kind: &'static str,
    pub field: Option<Field>,
    pub range: TextRange,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

/// Source-text accessor handed to the rule.
pub trait SourceText {
    /// Exact substring covered by `range`, if it lies within the buffer.
    fn slice(&self, range: &TextRange) -> Option<&str>;
}

/// Which TypeScript grammar produced the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    TypeScript,
    Tsx,
}

impl Dialect {
    pub fn from_path(path: &std::path::Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "ts" | "mts" | "cts" => Some(Self::TypeScript),
            "tsx" => Some(Self::Tsx),
            _ => None,
        }
    }
}

/// Immutable syntax tree plus the source buffer it was parsed from.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    source: String,
    nodes: Vec<SyntaxNode>,
    has_errors: bool,
}

impl SyntaxTree {
    pub(crate) fn from_parts(source: String, nodes: Vec<SyntaxNode>, has_errors: bool) -> Self {
        Self {
            source,
            nodes,
            has_errors,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn has_errors(&self) -> bool {
        self.has_errors
    }

    /// The program node. Lowering always pushes it first.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &SyntaxNode {
        &self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.node(id).kind
    }

    pub fn range(&self, id: NodeId) -> TextRange {
        self.node(id).range
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// First child sitting in grammar field `field`.
    pub fn child_by_field(&self, id: NodeId, field: Field) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|&child| self.node(child).field == Some(field))
    }

    pub fn first_child_of_kind(&self, id: NodeId, kind: NodeKind) -> Option<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .find(|&child| self.kind(child) == kind)
    }

    /// Source text of a node.
    pub fn text(&self, id: NodeId) -> &str {
        self.slice(&self.range(id)).unwrap_or("")
    }

    /// Ancestors of `id`, nearest first, ending at the root.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&current| self.parent(current))
    }

    /// Strict descendants of `id`, in pre-order.
    ///
    /// A subtree occupies a contiguous run of ids right after its root.
    pub fn descendants(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        (id.index() + 1..self.nodes.len())
            .map(NodeId::new)
            .take_while(move |&node| self.ancestors(node).any(|ancestor| ancestor == id))
    }

    /// All node ids in pre-order (source order).
    pub fn preorder(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId::new)
    }

    /// Whitespace between the start of the node's line and the node itself.
    ///
    /// Empty when other text precedes the node on that line.
    pub fn leading_indent(&self, id: NodeId) -> &str {
        let start = self.range(id).start_byte;
        let line_start = self.source[..start].rfind('\n').map_or(0, |i| i + 1);
        let prefix = &self.source[line_start..start];
        if prefix.chars().all(|c| c == ' ' || c == '\t') {
            prefix
        } else {
            ""
        }
    }
}

impl SourceText for SyntaxTree {
    fn slice(&self, range: &TextRange) -> Option<&str> {
        self.source.get(range.start_byte..range.end_byte)
    }
}
