use serde::{Deserialize, Serialize};

/// What to do when a section key is declared a second time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicateSections {
    /// Abort the parse with [`crate::ParseError::DuplicateScope`].
    #[default]
    Fail,
    /// Record a `DuplicateScope` issue and keep the first declaration.
    Report,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserOptions {
    pub duplicate_sections: DuplicateSections,
    /// Refuse to create a section from an indented `=` line.
    pub strict_section_indentation: bool,
}

impl ParserOptions {
    /// Reads the `[parser]` table of the shared configuration.
    pub fn from_config() -> Self {
        nldialogue_shared::config::get("parser")
    }
}
