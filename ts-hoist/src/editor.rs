use tracing::{debug, trace};

use crate::config::RuleConfig;
use crate::error::{HoistError, Result};
use crate::operations::Finding;
use crate::parser::parse;
use crate::surgical::{apply_surgical_edits, select_fixes};
use crate::syntax::{Dialect, SyntaxTree};
use crate::visitor::collect_findings;

/// One file's source plus its current parse.
pub struct TypeScriptEditor {
    content: String,
    dialect: Dialect,
    tree: SyntaxTree,
}

/// What `fix_all` did to a file.
#[derive(Debug, Default)]
pub struct FixOutcome {
    /// Fixes applied across all passes.
    pub applied: usize,
    pub passes: usize,
    /// Alias names introduced, in application order.
    pub aliases: Vec<String>,
    /// Findings left after the last pass (fix withheld, or pass limit hit).
    pub remaining: Vec<Finding>,
}

impl TypeScriptEditor {
    pub fn new(content: &str, dialect: Dialect) -> Result<Self> {
        let tree = parse(content, dialect)?;
        Ok(Self {
            content: content.to_string(),
            dialect,
            tree,
        })
    }

    pub fn tree(&self) -> &SyntaxTree {
        &self.tree
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn has_errors(&self) -> bool {
        self.tree.has_errors()
    }

    pub fn findings(&self, config: &RuleConfig) -> Vec<Finding> {
        collect_findings(&self.tree, config)
    }

    /// Apply fixes until none are left or `max_passes` is reached.
    ///
    /// Each pass applies every non-overlapping fix, then re-parses and
    /// re-lints; deferred fixes are recomputed against the new text. A file
    /// that already has syntax errors is left alone, and a pass whose output
    /// fails to parse cleanly aborts without touching the editor's content.
    pub fn fix_all(&mut self, config: &RuleConfig, max_passes: usize) -> Result<FixOutcome> {
        if self.tree.has_errors() {
            return Err(HoistError::SourceHasErrors);
        }

        let mut outcome = FixOutcome::default();
        while outcome.passes < max_passes {
            let findings = collect_findings(&self.tree, config);
            let selection = select_fixes(findings.iter().filter_map(|f| f.fix.as_ref().ok()));
            if selection.accepted.is_empty() {
                break;
            }

            let output = apply_surgical_edits(&self.content, selection.edits())?;
            let tree = parse(&output, self.dialect)?;
            if tree.has_errors() {
                return Err(HoistError::UnparseableFix);
            }

            outcome.passes += 1;
            outcome.applied += selection.accepted.len();
            outcome
                .aliases
                .extend(selection.accepted.iter().map(|fix| fix.alias_name.clone()));
            debug!(
                pass = outcome.passes,
                applied = selection.accepted.len(),
                deferred = selection.deferred.len(),
                "applied fix pass"
            );

            self.content = output;
            self.tree = tree;
        }

        outcome.remaining = collect_findings(&self.tree, config);
        trace!(remaining = outcome.remaining.len(), "fixing finished");
        Ok(outcome)
    }
}
