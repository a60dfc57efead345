/// A choice as offered to the runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChoiceOffer<'a> {
    pub text: &'a str,
    pub conditional: bool,
}

/// Host side of a playback session.
pub trait Runner {
    /// Shows one line of dialogue. Playback is suspended until the next `step`.
    fn display_line(&mut self, line: &str);

    /// Runs a command or evaluates a choice condition.
    ///
    /// For commands the return value decides whether the nested block is
    /// played, `has_body` telling whether there is one. For conditions
    /// `has_body` is `true` and `false` hides the choice.
    fn evaluate_command(&mut self, command: &str, has_body: bool) -> bool;

    /// Presents the available choices. The host must answer with
    /// [`crate::Reader::choose`] before stepping again.
    fn present_choices(&mut self, choices: &[ChoiceOffer<'_>]);
}
