//! Common interface of the tree dumpers

use std::io::{self, Write};

use crate::tree::Node;

pub trait Dumper {
    /// Write `node` and its whole subtree to `out`
    fn dump(&self, node: &Node, out: &mut dyn Write) -> io::Result<()>;

    fn dump_to_string(&self, node: &Node) -> io::Result<String> {
        let mut buffer = Vec::new();
        self.dump(node, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}
