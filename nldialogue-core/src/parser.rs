//! Indentation-aware parser.
//!
//! Nesting is derived from leading tabs only. The parser keeps an explicit
//! stack of open blocks; a shallower line closes blocks until the stack depth
//! matches the line's depth, a section declaration closes everything.
//! Jumps are resolved and commands validated once every line has been read.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::interpreter::Interpreter;
use crate::issue::{Issue, ParseError};
use crate::lexer::{self, LineTok, Marker, Span};
use crate::options::{DuplicateSections, ParserOptions};
use crate::tree::{Choice, Command, Node, NodeId, NodeKind, Section, Tree};

static CONDITIONAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<text>[^#]*)#(?P<guard>.*)#$").expect("conditional choice pattern"));

#[derive(PartialEq)]
enum Status {
    Run,
    Stop,
}

struct PendingJump {
    line: usize,
    column: usize,
    node: NodeId,
    key: String,
}

/// Result of a parse run: the tree, every issue found and the line count.
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed {
    pub tree: Tree,
    pub issues: Vec<Issue>,
    /// Number of lines in the input, including lines skipped after an abort.
    pub total_lines: usize,
}

impl Parsed {
    pub fn contains_errors(&self) -> bool {
        self.issues.iter().any(Issue::is_error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|i| i.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(|i| !i.is_error())
    }

    /// Maps every source line to the node declared on it.
    pub fn tokens_as_lines(&self) -> Vec<Option<NodeId>> {
        let mut lines = vec![None; self.total_lines];
        for id in self.tree.walk() {
            if let Some(slot) = lines.get_mut(self.tree[id].span.line) {
                *slot = Some(id);
            }
        }
        lines
    }

    pub fn into_tree(self) -> Tree {
        self.tree
    }
}

pub struct Parser<'i> {
    interpreter: &'i mut dyn Interpreter,
    options: ParserOptions,
    tree: Tree,
    stack: Vec<NodeId>,
    jumps: Vec<PendingJump>,
    issues: Vec<Issue>,
    total_lines: usize,
    status: Status,
}

impl<'i> Parser<'i> {
    pub fn new(interpreter: &'i mut dyn Interpreter) -> Self {
        Self {
            interpreter,
            options: ParserOptions::default(),
            tree: Tree::new(),
            stack: Vec::new(),
            jumps: Vec::new(),
            issues: Vec::new(),
            total_lines: 0,
            status: Status::Run,
        }
    }

    pub fn with_options(mut self, options: ParserOptions) -> Self {
        self.options = options;
        self
    }

    pub fn parse(self, source: &str) -> Result<Parsed, ParseError> {
        self.parse_lines(source.lines())
    }

    pub fn parse_lines<I, S>(mut self, lines: I) -> Result<Parsed, ParseError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let root = self.tree.root();
        self.stack.push(root);

        for (idx, line) in lines.into_iter().enumerate() {
            self.total_lines = idx + 1;
            if self.status == Status::Stop {
                continue;
            }
            if let Some(tok) = lexer::scan(idx, line.as_ref()) {
                self.line(tok)?;
            }
        }

        self.close_all(self.total_lines);
        self.tree.node_mut(root).span.end = self.total_lines;

        self.resolve_jumps();
        self.validate_commands(root);

        log::debug!(
            "Parsed {} lines: {} nodes, {} issues",
            self.total_lines,
            self.tree.node_count(),
            self.issues.len()
        );
        Ok(Parsed {
            tree: self.tree,
            issues: self.issues,
            total_lines: self.total_lines,
        })
    }

    fn top(&self) -> NodeId {
        self.stack.last().copied().unwrap_or_else(|| self.tree.root())
    }

    fn append(&mut self, span: Span, kind: NodeKind) -> NodeId {
        let parent = self.top();
        self.tree.push(parent, Node { span, kind })
    }

    fn close(&mut self, id: NodeId, line: usize) {
        self.tree.node_mut(id).span.end = line;
    }

    fn close_all(&mut self, line: usize) {
        while let Some(id) = self.stack.pop() {
            self.close(id, line);
        }
    }

    /// Pops blocks until the stack depth equals `depth`. Fails when a section
    /// would have to be closed on the way.
    fn close_to(&mut self, depth: usize, line: usize) -> bool {
        while self.stack.len() > depth {
            let top = self.top();
            if self.tree[top].kind.is_section() {
                return false;
            }
            self.stack.pop();
            self.close(top, line);
        }
        true
    }

    fn line(&mut self, tok: LineTok<'_>) -> Result<(), ParseError> {
        if tok.depth > self.stack.len() {
            self.issues.push(Issue::indentation_too_deep(tok.line, tok.column));
            return Ok(());
        }

        if !self.close_to(tok.depth, tok.line) {
            log::warn!("Invalid dedent on line {}, ignoring the rest of the file", tok.line);
            self.issues.push(Issue::invalid_dedent(tok.line, tok.column));
            self.status = Status::Stop;
            return Ok(());
        }

        match tok.marker {
            Marker::Section => self.section(tok)?,
            Marker::Command => self.command(tok),
            Marker::Choice => self.choice(tok),
            Marker::Comment => self.comment(tok),
            Marker::Jump => self.jump(tok),
            Marker::Return => self.go_back(tok),
            Marker::Text => self.text(tok),
        }
        Ok(())
    }

    fn section(&mut self, tok: LineTok<'_>) -> Result<(), ParseError> {
        if tok.depth != 1 {
            self.issues.push(Issue::indentation_too_deep(tok.line, tok.column));
            if self.options.strict_section_indentation {
                return Ok(());
            }
        }

        let Some(payload) = tok.payload() else {
            self.issues.push(Issue::token_empty(
                tok.line,
                tok.column,
                "looks like a Section, you should append a name to it",
            ));
            return Ok(());
        };

        let key = payload.text.to_string();
        let mut register = true;
        if let Some(existing) = self.tree.section(&key) {
            let first_line = self.tree[existing].span.line;
            match self.options.duplicate_sections {
                DuplicateSections::Fail => {
                    return Err(ParseError::DuplicateScope { key, line: tok.line, first_line });
                }
                DuplicateSections::Report => {
                    self.issues.push(Issue::duplicate_scope(tok.line, payload.column, &key, first_line));
                    register = false;
                }
            }
        }

        self.close_all(tok.line);
        let root = self.tree.root();
        let id = self.tree.push(
            root,
            Node {
                span: Span::new(tok.line, payload.column),
                kind: NodeKind::Section(Section { key: Some(key.clone()), children: Vec::new() }),
            },
        );
        if register {
            log::debug!("Section '{}' declared on line {}", key, tok.line);
            self.tree.register_section(key, id);
        }
        self.stack.push(id);
        Ok(())
    }

    fn command(&mut self, tok: LineTok<'_>) {
        let Some(payload) = tok.payload() else {
            self.issues.push(Issue::token_empty(
                tok.line,
                tok.column,
                "looks like you want to create a Command here but you didn't provide the actual command",
            ));
            return;
        };

        // Consecutive `#` lines at one depth form a single command.
        if let Some(&last) = self.tree.children(self.top()).last() {
            let node = self.tree.node_mut(last);
            if let NodeKind::Command(cmd) = &mut node.kind {
                if cmd.children.is_empty() {
                    cmd.text.push('\n');
                    cmd.text.push_str(payload.text);
                    node.span.end = tok.line + 1;
                    self.stack.push(last);
                    return;
                }
            }
        }

        let id = self.append(
            Span::new(tok.line, payload.column),
            NodeKind::Command(Command { text: payload.text.to_string(), children: Vec::new() }),
        );
        self.stack.push(id);
    }

    fn choice(&mut self, tok: LineTok<'_>) {
        let Some(payload) = tok.payload() else {
            self.issues.push(Issue::token_empty(
                tok.line,
                tok.column,
                "looks like a Choice, you must append a line of text to this choice",
            ));
            return;
        };

        let (text, condition) = match CONDITIONAL.captures(payload.text) {
            Some(caps) => {
                let (Some(text), Some(guard)) = (caps.name("text"), caps.name("guard")) else {
                    return;
                };
                let condition = guard.as_str().trim();
                let lead = guard.as_str().len() - guard.as_str().trim_start().len();
                let column = payload.column + payload.text[..guard.start() + lead].chars().count();
                if condition.is_empty() {
                    self.issues.push(Issue::token_empty(
                        tok.line,
                        column,
                        "looks like a ConditionalChoice, you must provide a command between its '#'",
                    ));
                    return;
                }
                if let Err(rejection) = self.interpreter.can_interpret_conditional_choice(condition) {
                    self.issues.push(Issue::failed_conditional(tok.line, column, rejection));
                    return;
                }
                (text.as_str().trim(), Some(condition.to_string()))
            }
            None => (payload.text, None),
        };

        let id = self.append(
            Span::new(tok.line, payload.column),
            NodeKind::Choice(Choice { text: text.to_string(), condition, children: Vec::new() }),
        );
        self.stack.push(id);
    }

    fn comment(&mut self, tok: LineTok<'_>) {
        let (column, text) = match tok.payload() {
            Some(p) => (p.column, p.text.to_string()),
            None => (tok.column, String::new()),
        };
        self.append(Span::new(tok.line, column), NodeKind::Comment { text });
    }

    fn jump(&mut self, tok: LineTok<'_>) {
        let Some(payload) = tok.payload() else {
            self.issues.push(Issue::token_empty(
                tok.line,
                tok.column,
                "looks like a Jump, you must append the name of a section as a destination",
            ));
            return;
        };

        let key = payload.text.to_string();
        let node = self.append(
            Span::new(tok.line, payload.column),
            NodeKind::Jump { key: key.clone(), target: None },
        );
        self.jumps.push(PendingJump { line: tok.line, column: tok.after_marker(), node, key });
    }

    fn go_back(&mut self, tok: LineTok<'_>) {
        if let Some(payload) = tok.payload() {
            self.issues.push(Issue::token_non_empty(tok.line, payload.column, payload.text));
        }
        self.append(Span::new(tok.line, tok.column), NodeKind::Return);
    }

    fn text(&mut self, tok: LineTok<'_>) {
        if let Some(payload) = tok.payload() {
            self.append(
                Span::new(tok.line, payload.column),
                NodeKind::Line { text: payload.text.to_string() },
            );
        }
    }

    fn resolve_jumps(&mut self) {
        for jump in std::mem::take(&mut self.jumps) {
            match self.tree.section(&jump.key) {
                Some(section) => {
                    if let NodeKind::Jump { target, .. } = &mut self.tree.node_mut(jump.node).kind {
                        *target = Some(section);
                    }
                }
                None => self.issues.push(Issue::unknown_scope(jump.line, jump.column, &jump.key)),
            }
        }
    }

    /// Validates every command, deepest and rightmost first, dropping rejected
    /// ones together with their body.
    fn validate_commands(&mut self, id: NodeId) {
        let children = self.tree.children(id).to_vec();
        let mut kept = Vec::with_capacity(children.len());
        for &child in children.iter().rev() {
            self.validate_commands(child);
            let node = &self.tree[child];
            if let NodeKind::Command(cmd) = &node.kind {
                if let Err(rejection) = self.interpreter.can_interpret_command(&cmd.text) {
                    log::debug!("Command on line {} rejected: {}", node.span.line, rejection);
                    self.issues.push(Issue::failed_command(node.span.line, node.span.column, rejection));
                    continue;
                }
            }
            kept.push(child);
        }
        if kept.len() != children.len() {
            kept.reverse();
            self.tree.set_children(id, kept);
        }
    }
}
