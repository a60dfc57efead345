use nldialogue_core::{NodeId, Tree};

/// One level of in-progress traversal: a node and the index of the next child to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub node: NodeId,
    pub pc: usize,
}

impl Frame {
    pub fn new(node: NodeId, pc: usize) -> Self {
        Self { node, pc }
    }

    pub fn current(&self, tree: &Tree) -> Option<NodeId> {
        tree.children(self.node).get(self.pc).copied()
    }

    pub fn advance(&mut self) {
        self.pc += 1;
    }
}
