//! Token tree produced by the parser.
//!
//! Every node lives in a single arena owned by [`Tree`] and is addressed by a
//! [`NodeId`]. Jumps refer to their destination section by id, so the tree has
//! no ownership cycles. All nodes carry a [`Span`] that identifies the source
//! location they were parsed from.

use std::ops::Index;

use rustc_hash::FxHashMap;

use crate::lexer::Span;

/// Handle to a node inside a [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub span: Span,
    pub kind: NodeKind,
}

/// The kinds of token a dialogue file is made of.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// A named scope that can be jumped to. The root is a section without key.
    Section(Section),
    /// A line of dialogue shown to the player.
    Line { text: String },
    /// Never surfaced to the runner, kept for tooling.
    Comment { text: String },
    /// Opaque instruction for the interpreter; children run when it succeeds.
    Command(Command),
    /// A selectable option, optionally guarded by a condition.
    Choice(Choice),
    /// One-way transfer to a section. `target` is `None` when unresolved.
    Jump { key: String, target: Option<NodeId> },
    /// Resume below the closest section on the traversal stack.
    Return,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Section {
    pub key: Option<String>,
    pub children: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    /// Consecutive `#` lines are joined with `\n`.
    pub text: String,
    pub children: Vec<NodeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Choice {
    pub text: String,
    pub condition: Option<String>,
    pub children: Vec<NodeId>,
}

impl Choice {
    pub fn is_conditional(&self) -> bool {
        self.condition.is_some()
    }
}

impl NodeKind {
    /// Ordered children, empty for leaves.
    pub fn children(&self) -> &[NodeId] {
        match self {
            NodeKind::Section(s) => &s.children,
            NodeKind::Command(c) => &c.children,
            NodeKind::Choice(c) => &c.children,
            _ => &[],
        }
    }

    fn children_mut(&mut self) -> Option<&mut Vec<NodeId>> {
        match self {
            NodeKind::Section(s) => Some(&mut s.children),
            NodeKind::Command(c) => Some(&mut c.children),
            NodeKind::Choice(c) => Some(&mut c.children),
            _ => None,
        }
    }

    pub fn is_section(&self) -> bool {
        matches!(self, NodeKind::Section(_))
    }

    pub fn is_choice(&self) -> bool {
        matches!(self, NodeKind::Choice(_))
    }

    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Section(_) => "Section",
            NodeKind::Line { .. } => "Line",
            NodeKind::Comment { .. } => "Comment",
            NodeKind::Command(_) => "Command",
            NodeKind::Choice(c) if c.is_conditional() => "ConditionalChoice",
            NodeKind::Choice(_) => "Choice",
            NodeKind::Jump { .. } => "Jump",
            NodeKind::Return => "Return",
        }
    }
}

/// Arena holding the whole parsed file.
#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    nodes: Vec<Node>,
    sections: FxHashMap<String, NodeId>,
}

impl Default for Tree {
    fn default() -> Self {
        Tree::new()
    }
}

impl Tree {
    /// Creates a tree containing only the root section.
    pub fn new() -> Self {
        let root = Node {
            span: Span::new(0, 0),
            kind: NodeKind::Section(Section::default()),
        };
        Tree {
            nodes: vec![root],
            sections: FxHashMap::default(),
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self[id].kind.children()
    }

    /// Looks a declared section up by key.
    pub fn section(&self, key: &str) -> Option<NodeId> {
        self.sections.get(key).copied()
    }

    /// Declared sections in source order.
    pub fn sections(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.children(self.root())
            .iter()
            .copied()
            .filter(|id| self[*id].kind.is_section())
    }

    /// Number of nodes in the arena, detached ones included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// True when the root holds no content at all.
    pub fn is_empty(&self) -> bool {
        self.children(self.root()).is_empty()
    }

    /// Pre-order walk over every node reachable from the root, root excluded.
    pub fn walk(&self) -> Walk<'_> {
        let mut stack: Vec<NodeId> = self.children(self.root()).to_vec();
        stack.reverse();
        Walk { tree: self, stack }
    }

    pub(crate) fn push(&mut self, parent: NodeId, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        if let Some(children) = self.nodes[parent.0].kind.children_mut() {
            children.push(id);
        }
        id
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub(crate) fn register_section(&mut self, key: String, id: NodeId) {
        self.sections.insert(key, id);
    }

    pub(crate) fn set_children(&mut self, id: NodeId, children: Vec<NodeId>) {
        if let Some(slot) = self.nodes[id.0].kind.children_mut() {
            *slot = children;
        }
    }
}

impl Index<NodeId> for Tree {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }
}

pub struct Walk<'a> {
    tree: &'a Tree,
    stack: Vec<NodeId>,
}

impl Iterator for Walk<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack.extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}
