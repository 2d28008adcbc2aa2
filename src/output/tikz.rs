//! TikZ output, the visual rendering of the document mode
//!
//! Each tree becomes one `tikzpicture` drawn with the `child` syntax.

use std::io::{self, Write};

use crate::output::latex::escape;
use crate::output::Dumper;
use crate::tree::Node;

const PICTURE_OPTIONS: &str = "level distance=1.2cm, sibling distance=2.4cm, \
                               level/.style={sibling distance=2.4cm/#1}, \
                               every node/.style={font=\\ttfamily\\small}";

#[derive(Debug, Default, Clone, Copy)]
pub struct TikzDumper;

impl Dumper for TikzDumper {
    fn dump(&self, node: &Node, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "\\begin{{tikzpicture}}[{}]", PICTURE_OPTIONS)?;
        writeln!(out, "\\node {{{}}}", escape(&node.label))?;
        for child in &node.children {
            dump_child(child, 1, out)?;
        }
        writeln!(out, ";")?;
        writeln!(out, "\\end{{tikzpicture}}")?;
        writeln!(out)
    }
}

fn dump_child(node: &Node, depth: usize, out: &mut dyn Write) -> io::Result<()> {
    let indent = "  ".repeat(depth);
    let label = escape(&node.label);

    if node.is_leaf() {
        return writeln!(out, "{}child {{ node {{{}}} }}", indent, label);
    }

    writeln!(out, "{}child {{ node {{{}}}", indent, label)?;
    for child in &node.children {
        dump_child(child, depth + 1, out)?;
    }
    writeln!(out, "{}}}", indent)
}
