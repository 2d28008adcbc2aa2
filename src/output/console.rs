//! Console tree output
//!
//! One node per line, with box-drawing connectors showing the nesting:
//!
//! ```text
//! statements
//! └─ SELECT
//!    ├─ columns
//!    │  └─ a
//!    └─ FROM
//!       └─ t
//! ```

use std::io::{self, Write};

use crate::output::Dumper;
use crate::tree::Node;

#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleDumper;

impl Dumper for ConsoleDumper {
    fn dump(&self, node: &Node, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "{}", node.label)?;
        dump_children(&node.children, "", out)
    }
}

fn dump_children(children: &[Node], prefix: &str, out: &mut dyn Write) -> io::Result<()> {
    for (i, child) in children.iter().enumerate() {
        let is_last = i == children.len() - 1;
        let connector = if is_last { "└─" } else { "├─" };
        writeln!(out, "{}{} {}", prefix, connector, child.label)?;

        let new_prefix = format!("{}{}", prefix, if is_last { "   " } else { "│  " });
        dump_children(&child.children, &new_prefix, out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_console_connectors() {
        let tree = Node::branch(
            "statements",
            vec![Node::branch(
                "SELECT",
                vec![
                    Node::branch("columns", vec![Node::leaf("a")]),
                    Node::branch("FROM", vec![Node::leaf("t")]),
                ],
            )],
        );
        let expected = "statements\n\
                        └─ SELECT\n   \
                        ├─ columns\n   \
                        │  └─ a\n   \
                        └─ FROM\n      \
                        └─ t\n";
        assert_eq!(ConsoleDumper.dump_to_string(&tree).unwrap(), expected);
    }

    #[test]
    fn test_console_single_node() {
        assert_eq!(
            ConsoleDumper.dump_to_string(&Node::leaf("statements")).unwrap(),
            "statements\n"
        );
    }
}
