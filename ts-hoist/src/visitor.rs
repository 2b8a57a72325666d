//! Tree walker driving the rule's visitor table.

use crate::config::RuleConfig;
use crate::operations::Finding;
use crate::plugin::{visitor, Reporter, RuleContext};
use crate::rule::NameScope;
use crate::syntax::SyntaxTree;

/// Visit every node in source order and dispatch through the visitor table.
pub fn run_rule(tree: &SyntaxTree, config: &RuleConfig, reporter: &mut dyn Reporter) {
    let names = NameScope::from_tree(tree, config.disambiguate_names);
    let mut cx = RuleContext::new(tree, names, reporter);

    for id in tree.preorder() {
        if let Some(visit) = visitor(tree.kind(id)) {
            visit(&mut cx, id);
        }
    }
}

pub fn collect_findings(tree: &SyntaxTree, config: &RuleConfig) -> Vec<Finding> {
    let mut findings = Vec::new();
    run_rule(tree, config, &mut findings);
    findings
}
