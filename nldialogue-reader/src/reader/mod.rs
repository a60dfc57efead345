mod call_stack;
mod frame;

use std::sync::Arc;

use nldialogue_core::{NodeId, NodeKind, Tree};

use crate::error::ReaderError;
use crate::runner::{ChoiceOffer, Runner};
use call_stack::CallStack;
pub use frame::Frame;

/// Playback cursor over a parsed tree.
///
/// Each call to [`Reader::step`] plays until a line is shown, choices are
/// offered or the session ends. Several readers may share one tree.
#[derive(Debug, Clone)]
pub struct Reader {
    tree: Arc<Tree>,
    call_stack: CallStack,
    pending_choice: Vec<NodeId>,
    finished: bool,
}

impl Reader {
    /// Starts at the content preceding the first section.
    pub fn new(tree: Arc<Tree>) -> Self {
        let root = tree.root();
        let mut call_stack = CallStack::default();
        call_stack.push(Frame::new(root, 0));
        Reader {
            tree,
            call_stack,
            pending_choice: Vec::new(),
            finished: false,
        }
    }

    /// Starts inside the section declared as `key`.
    pub fn start(tree: Arc<Tree>, key: &str) -> Result<Self, ReaderError> {
        let section = tree
            .section(key)
            .ok_or_else(|| ReaderError::UnknownSection(key.to_string()))?;
        let mut reader = Reader::new(tree);
        reader.call_stack.pop();
        reader.call_stack.push(Frame::new(section, 0));
        Ok(reader)
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Frames currently open, outermost first.
    pub fn frames(&self) -> &[Frame] {
        &self.call_stack.stack
    }

    pub fn depth(&self) -> usize {
        self.call_stack.len()
    }

    /// Choices offered by the last step and not chosen yet.
    pub fn pending_choices(&self) -> &[NodeId] {
        &self.pending_choice
    }

    pub fn is_waiting_for_choice(&self) -> bool {
        !self.pending_choice.is_empty()
    }

    /// True once a step reported that no content is left.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Plays until something must be shown to the runner.
    ///
    /// Returns `Ok(false)` when the session is over: the stack is empty, the
    /// current section ran out of content, or playback reached the next
    /// section by falling through.
    pub fn step<R: Runner + ?Sized>(&mut self, runner: &mut R) -> Result<bool, ReaderError> {
        if !self.pending_choice.is_empty() {
            return Err(ReaderError::ChoicePending);
        }
        let tree: &Tree = &self.tree;

        loop {
            let Some(frame) = self.call_stack.top_mut() else {
                log::debug!("Call stack empty, playback finished");
                self.finished = true;
                return Ok(false);
            };

            let Some(id) = frame.current(tree) else {
                if tree[frame.node].kind.is_section() {
                    log::debug!("End of section on line {}, playback finished", tree[frame.node].span.line);
                    self.finished = true;
                    return Ok(false);
                }
                self.call_stack.pop();
                continue;
            };

            let node = &tree[id];
            if node.kind.is_section() {
                log::debug!("Reached section on line {}, playback finished", node.span.line);
                self.finished = true;
                return Ok(false);
            }
            frame.advance();
            log::trace!("step: {} on line {}", node.kind.name(), node.span.line);

            match &node.kind {
                NodeKind::Line { text } => {
                    runner.display_line(text);
                    return Ok(true);
                }
                NodeKind::Command(cmd) => {
                    let has_body = !cmd.children.is_empty();
                    if runner.evaluate_command(&cmd.text, has_body) && has_body {
                        self.call_stack.push(Frame::new(id, 0));
                    }
                }
                NodeKind::Jump { key, target } => match target {
                    Some(section) => {
                        log::debug!("Jump to '{}'", key);
                        self.call_stack.push(Frame::new(*section, 0));
                    }
                    None => log::warn!("Skipping unresolved jump to '{}' on line {}", key, node.span.line),
                },
                NodeKind::Return => loop {
                    match self.call_stack.pop() {
                        Some(popped) if tree[popped.node].kind.is_section() => {
                            log::debug!("Return out of section on line {}", tree[popped.node].span.line);
                            break;
                        }
                        Some(_) => {}
                        None => {
                            self.finished = true;
                            return Ok(false);
                        }
                    }
                },
                NodeKind::Choice(_) => {
                    self.pending_choice.push(id);
                    while let Some(next) = frame.current(tree) {
                        if !tree[next].kind.is_choice() {
                            break;
                        }
                        self.pending_choice.push(next);
                        frame.advance();
                    }

                    self.pending_choice.retain(|choice| match &tree[*choice].kind {
                        NodeKind::Choice(c) => match &c.condition {
                            Some(condition) => runner.evaluate_command(condition, true),
                            None => true,
                        },
                        _ => false,
                    });
                    if self.pending_choice.is_empty() {
                        continue;
                    }

                    let offers: Vec<ChoiceOffer<'_>> = self
                        .pending_choice
                        .iter()
                        .filter_map(|choice| match &tree[*choice].kind {
                            NodeKind::Choice(c) => Some(ChoiceOffer { text: &c.text, conditional: c.is_conditional() }),
                            _ => None,
                        })
                        .collect();
                    runner.present_choices(&offers);
                    return Ok(true);
                }
                NodeKind::Comment { .. } | NodeKind::Section(_) => {}
            }
        }
    }

    /// Enters the body of the pending choice at `index`.
    pub fn choose(&mut self, index: usize) -> Result<(), ReaderError> {
        if self.pending_choice.is_empty() {
            return Err(ReaderError::NoPendingChoice);
        }
        let Some(&choice) = self.pending_choice.get(index) else {
            return Err(ReaderError::ChoiceOutOfRange { index, len: self.pending_choice.len() });
        };
        log::debug!("Choice {} picked", index);
        self.call_stack.push(Frame::new(choice, 0));
        self.pending_choice.clear();
        Ok(())
    }
}
