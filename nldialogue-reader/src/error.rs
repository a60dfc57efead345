use thiserror::Error;

/// Misuse of the [`crate::Reader`] step/choose protocol.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReaderError {
    #[error("cannot step while choices are pending, call choose first")]
    ChoicePending,
    #[error("no choice is pending")]
    NoPendingChoice,
    #[error("choice {index} is out of range, {len} choices are pending")]
    ChoiceOutOfRange { index: usize, len: usize },
    #[error("no section named '{0}'")]
    UnknownSection(String),
}
