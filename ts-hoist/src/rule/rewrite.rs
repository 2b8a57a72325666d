use crate::operations::Fix;
use crate::surgical::Edit;
use crate::syntax::{NodeId, SyntaxTree};

/// `type <name> = <literal>;`
pub fn alias_declaration(name: &str, literal: &str) -> String {
    format!("type {name} = {literal};")
}

/// Build the two edits that hoist `literal` into an alias named `name`
/// declared right before `anchor`.
///
/// The literal text is copied verbatim. The anchor's indentation is
/// repeated after the blank line so the anchor keeps its column.
pub fn build_fix(tree: &SyntaxTree, literal: NodeId, name: &str, anchor: NodeId) -> Fix {
    let indent = tree.leading_indent(anchor);
    let declaration = alias_declaration(name, tree.text(literal));
    let literal_range = tree.range(literal);

    Fix {
        alias_name: name.to_string(),
        edits: [
            Edit::Insert {
                offset: tree.range(anchor).start_byte,
                text: format!("{declaration}\n\n{indent}"),
            },
            Edit::Replace {
                start: literal_range.start_byte,
                end: literal_range.end_byte,
                text: name.to_string(),
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::surgical::apply_surgical_edits;
    use crate::syntax::{Dialect, NodeKind};

    #[test]
    fn test_alias_declaration() {
        assert_eq!(
            alias_declaration("PointType", "{ x: number }"),
            "type PointType = { x: number };"
        );
    }

    #[test]
    fn test_fix_keeps_anchor_indentation() {
        let source = "function f() {\n    let p: { x: number } = { x: 1 };\n}\n";
        let tree = parse(source, Dialect::TypeScript).unwrap();
        let literal = tree
            .preorder()
            .find(|&id| tree.kind(id) == NodeKind::ObjectTypeLiteral)
            .unwrap();
        let anchor = tree
            .preorder()
            .find(|&id| tree.kind(id) == NodeKind::VariableDeclaration)
            .unwrap();

        let fix = build_fix(&tree, literal, "PType", anchor);
        let output = apply_surgical_edits(source, fix.edits.to_vec()).unwrap();
        assert_eq!(
            output,
            "function f() {\n    type PType = { x: number };\n\n    let p: PType = { x: 1 };\n}\n"
        );
    }
}
