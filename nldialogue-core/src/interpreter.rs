use std::fmt;

/// Opaque reason an interpreter gives for refusing a command or condition.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Rejection(pub String);

impl Rejection {
    pub fn new(reason: impl Into<String>) -> Self {
        Rejection(reason.into())
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validates command text while a file is parsed.
///
/// Conditions are checked as soon as their choice line is read. Commands are
/// checked once the whole tree exists, deepest and rightmost first, so an
/// implementation may accept or reject them based on everything it saw before.
pub trait Interpreter {
    fn can_interpret_command(&mut self, command: &str) -> Result<(), Rejection>;
    fn can_interpret_conditional_choice(&mut self, condition: &str) -> Result<(), Rejection>;
}

/// Accepts everything; used when only the structure of a file matters.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullInterpreter;

impl Interpreter for NullInterpreter {
    fn can_interpret_command(&mut self, _command: &str) -> Result<(), Rejection> {
        Ok(())
    }

    fn can_interpret_conditional_choice(&mut self, _condition: &str) -> Result<(), Rejection> {
        Ok(())
    }
}
