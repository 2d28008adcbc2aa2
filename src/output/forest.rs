//! LaTeX `forest` output, the structural rendering of the document mode
//!
//! Each tree becomes one `forest` environment in bracket notation. Labels are
//! braced so commas and brackets inside them stay part of the label.

use std::io::{self, Write};

use crate::output::latex::escape;
use crate::output::Dumper;
use crate::tree::Node;

#[derive(Debug, Default, Clone, Copy)]
pub struct ForestDumper;

impl Dumper for ForestDumper {
    fn dump(&self, node: &Node, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "\\begin{{forest}}")?;
        dump_node(node, 0, out)?;
        writeln!(out, "\\end{{forest}}")?;
        writeln!(out)
    }
}

fn dump_node(node: &Node, depth: usize, out: &mut dyn Write) -> io::Result<()> {
    let indent = "  ".repeat(depth);
    let label = escape(&node.label);

    if node.is_leaf() {
        return writeln!(out, "{}[{{{}}}]", indent, label);
    }

    writeln!(out, "{}[{{{}}}", indent, label)?;
    for child in &node.children {
        dump_node(child, depth + 1, out)?;
    }
    writeln!(out, "{}]", indent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forest_bracket_notation() {
        let tree = Node::branch(
            "DELETE FROM t",
            vec![Node::branch(
                "WHERE",
                vec![Node::branch("=", vec![Node::leaf("a_b"), Node::leaf("1")])],
            )],
        );
        let expected = "\\begin{forest}\n\
                        [{DELETE FROM t}\n  \
                        [{WHERE}\n    \
                        [{=}\n      \
                        [{a\\_b}]\n      \
                        [{1}]\n    \
                        ]\n  \
                        ]\n\
                        ]\n\
                        \\end{forest}\n\n";
        assert_eq!(ForestDumper.dump_to_string(&tree).unwrap(), expected);
    }
}
