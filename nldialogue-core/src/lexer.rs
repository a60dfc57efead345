//! Line scanner: turns one raw source line into its nesting depth, its marker
//! and the position of its payload.

/// Source position of a node.
///
/// `line` and `column` locate the node's payload; `end` is the exclusive line
/// at which the node's block was closed (`line + 1` for leaves).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub line: usize,
    pub column: usize,
    pub end: usize,
}

impl Span {
    pub fn new(line: usize, column: usize) -> Self {
        Span { line, column, end: line + 1 }
    }

    /// Number of source lines covered by the node.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.line)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, line: usize) -> bool {
        (self.line..self.end).contains(&line)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// `=`
    Section,
    /// `#`
    Command,
    /// `*`
    Choice,
    /// `//`
    Comment,
    /// `->`
    Jump,
    /// `<-`
    Return,
    Text,
}

impl Marker {
    /// Byte width of the marker itself.
    pub fn width(self) -> usize {
        match self {
            Marker::Section | Marker::Command | Marker::Choice => 1,
            Marker::Comment | Marker::Jump | Marker::Return => 2,
            Marker::Text => 0,
        }
    }
}

/// A non-blank source line after the indentation scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineTok<'a> {
    pub line: usize,
    /// One plus the number of leading tabs.
    pub depth: usize,
    /// Byte offset of the first non-whitespace character.
    pub indent: usize,
    /// Character column of the first non-whitespace character.
    pub column: usize,
    pub marker: Marker,
    pub src: &'a str,
}

/// Trimmed text with the character column it starts at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Payload<'a> {
    pub column: usize,
    pub text: &'a str,
}

impl<'a> LineTok<'a> {
    /// Trimmed content following the marker, `None` when only whitespace remains.
    pub fn payload(&self) -> Option<Payload<'a>> {
        trim_from(self.src, self.indent + self.marker.width())
    }

    /// Character column right after the marker.
    pub fn after_marker(&self) -> usize {
        self.column + self.marker.width()
    }
}

/// Scans one line. Blank and whitespace-only lines yield `None`.
///
/// Leading tabs each add one level of depth; other leading whitespace is
/// skipped without affecting it.
pub fn scan(line: usize, src: &str) -> Option<LineTok<'_>> {
    let mut depth = 1;
    let mut column = 0;
    let mut indent = None;
    for (idx, c) in src.char_indices() {
        if c == '\t' {
            depth += 1;
        } else if !c.is_whitespace() {
            indent = Some(idx);
            break;
        }
        column += 1;
    }
    let indent = indent?;

    let rest = &src[indent..];
    let marker = if rest.starts_with('=') {
        Marker::Section
    } else if rest.starts_with('#') {
        Marker::Command
    } else if rest.starts_with('*') {
        Marker::Choice
    } else if rest.starts_with("//") {
        Marker::Comment
    } else if rest.starts_with("->") {
        Marker::Jump
    } else if rest.starts_with("<-") {
        Marker::Return
    } else {
        Marker::Text
    };

    log::trace!("line {}: depth {} {:?}", line, depth, marker);
    Some(LineTok { line, depth, indent, column, marker, src })
}

/// Trims whitespace around `src[from..]`.
pub fn trim_from(src: &str, from: usize) -> Option<Payload<'_>> {
    let tail = src.get(from..)?;
    let text = tail.trim();
    if text.is_empty() {
        return None;
    }
    let lead = tail.len() - tail.trim_start().len();
    let column = src[..from + lead].chars().count();
    Some(Payload { column, text })
}
