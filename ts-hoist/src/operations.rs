use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::surgical::Edit;
use crate::syntax::TextRange;

/// The single message the rule reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MessageKind {
    InlineTypeLiteral,
}

impl MessageKind {
    pub fn id(self) -> &'static str {
        match self {
            MessageKind::InlineTypeLiteral => "inlineTypeLiteral",
        }
    }

    pub fn text(self) -> &'static str {
        match self {
            MessageKind::InlineTypeLiteral => {
                "inline type literal annotations are disallowed; extract to a named type declaration."
            }
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct NodeLocation {
    pub line: usize,
    pub column: usize,
    pub end_line: usize,
    pub end_column: usize,
}

impl From<TextRange> for NodeLocation {
    fn from(range: TextRange) -> Self {
        Self {
            line: range.start.line,
            column: range.start.column,
            end_line: range.end.line,
            end_column: range.end.column,
        }
    }
}

/// The two coordinated edits that hoist one literal: the alias declaration
/// inserted before the anchor statement, then the literal replaced by the
/// alias name. Applied together or not at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fix {
    pub alias_name: String,
    pub edits: [Edit; 2],
}

/// Why a finding carries no fix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FixUnavailable {
    /// No statement-level declaration encloses the annotation.
    NoInsertionPoint,
    /// The literal uses a type parameter or `this` that is not in scope
    /// before the anchor statement.
    CapturesTypeParameter,
}

impl std::fmt::Display for FixUnavailable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoInsertionPoint => write!(f, "no enclosing statement to insert before"),
            Self::CapturesTypeParameter => {
                write!(f, "uses a type parameter or `this` not in scope at the insertion point")
            }
        }
    }
}

/// A reported multiline inline type literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub message: MessageKind,
    /// Range of the literal itself; findings are keyed by it.
    pub range: TextRange,
    /// Name the alias gets (or would get) when hoisted.
    pub alias_name: String,
    pub fix: Result<Fix, FixUnavailable>,
}

impl Finding {
    pub fn location(&self) -> NodeLocation {
        self.range.into()
    }

    pub fn is_fixable(&self) -> bool {
        self.fix.is_ok()
    }
}

/// Serializable view of a finding for `check --format json`.
#[derive(Debug, Serialize, Deserialize)]
pub struct FindingReport {
    pub file_path: PathBuf,
    pub rule: String,
    pub message_id: String,
    pub message: String,
    pub location: NodeLocation,
    pub alias_name: String,
    pub fixable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fix_unavailable: Option<FixUnavailable>,
}

impl FindingReport {
    pub fn new(file_path: PathBuf, rule: &str, finding: &Finding) -> Self {
        Self {
            file_path,
            rule: rule.to_string(),
            message_id: finding.message.id().to_string(),
            message: finding.message.text().to_string(),
            location: finding.location(),
            alias_name: finding.alias_name.clone(),
            fixable: finding.is_fixable(),
            fix_unavailable: finding.fix.as_ref().err().copied(),
        }
    }
}
