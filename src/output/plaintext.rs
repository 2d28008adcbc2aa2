//! Plain text tree output: two spaces of indentation per level, ASCII only

use std::io::{self, Write};

use crate::output::Dumper;
use crate::tree::Node;

const INDENT: &str = "  ";

#[derive(Debug, Default, Clone, Copy)]
pub struct PlaintextDumper;

impl Dumper for PlaintextDumper {
    fn dump(&self, node: &Node, out: &mut dyn Write) -> io::Result<()> {
        dump_at(node, 0, out)
    }
}

fn dump_at(node: &Node, depth: usize, out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "{}{}", INDENT.repeat(depth), node.label)?;
    for child in &node.children {
        dump_at(child, depth + 1, out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plaintext_indentation() {
        let tree = Node::branch(
            "=",
            vec![Node::leaf("a"), Node::branch("+", vec![Node::leaf("1"), Node::leaf("2")])],
        );
        assert_eq!(
            PlaintextDumper.dump_to_string(&tree).unwrap(),
            "=\n  a\n  +\n    1\n    2\n"
        );
    }
}
