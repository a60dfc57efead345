use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use nldialogue_core::{NullInterpreter, Tree};
use nldialogue_reader::{ChoiceOffer, Reader, ReaderError, Runner};

#[derive(Debug, Clone, PartialEq)]
enum Event {
    Line(String),
    Command(String, bool),
    Choices(Vec<(String, bool)>),
}

/// Records everything and answers `false` for the commands listed in `refuse`.
#[derive(Default)]
struct RecordingRunner {
    events: Vec<Event>,
    refuse: HashSet<String>,
}

impl RecordingRunner {
    fn refusing(commands: &[&str]) -> Self {
        RecordingRunner {
            events: Vec::new(),
            refuse: commands.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl Runner for RecordingRunner {
    fn display_line(&mut self, line: &str) {
        self.events.push(Event::Line(line.to_string()));
    }

    fn evaluate_command(&mut self, command: &str, has_body: bool) -> bool {
        self.events.push(Event::Command(command.to_string(), has_body));
        !self.refuse.contains(command)
    }

    fn present_choices(&mut self, choices: &[ChoiceOffer<'_>]) {
        self.events.push(Event::Choices(
            choices.iter().map(|c| (c.text.to_string(), c.conditional)).collect(),
        ));
    }
}

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn tree(src: &str) -> Arc<Tree> {
    init_logger();
    let parsed = nldialogue_core::parse(src, &mut NullInterpreter).unwrap();
    Arc::new(parsed.into_tree())
}

/// Plays to the end, answering choices from `picks` in order.
fn play(reader: &mut Reader, runner: &mut RecordingRunner, picks: &[usize]) {
    let mut picks: VecDeque<usize> = picks.iter().copied().collect();
    while reader.step(runner).unwrap() {
        if reader.is_waiting_for_choice() {
            let pick = picks.pop_front().expect("ran out of picks");
            reader.choose(pick).unwrap();
        }
    }
}

fn line(text: &str) -> Event {
    Event::Line(text.to_string())
}

fn lines(runner: &RecordingRunner) -> Vec<&str> {
    runner
        .events
        .iter()
        .filter_map(|e| match e {
            Event::Line(l) => Some(l.as_str()),
            _ => None,
        })
        .collect()
}

#[test]
fn root_content_stops_at_first_section() {
    let mut reader = Reader::new(tree("Hello\n= A\nInside A\n"));
    let mut runner = RecordingRunner::default();

    assert!(reader.step(&mut runner).unwrap());
    assert_eq!(runner.events, vec![line("Hello")]);
    assert!(!reader.step(&mut runner).unwrap());
    assert_eq!(runner.events.len(), 1);
    assert!(reader.is_finished());
    // Stays finished.
    assert!(!reader.step(&mut runner).unwrap());
}

#[test]
fn return_resumes_after_jump() {
    let src = "-> A\n= A\na1\n-> B\na2\n= B\nb1\n<-\nnever\n";
    let mut reader = Reader::new(tree(src));
    let mut runner = RecordingRunner::default();
    play(&mut reader, &mut runner, &[]);
    assert_eq!(lines(&runner), vec!["a1", "b1", "a2"]);
}

#[test]
fn jump_does_not_return_on_its_own() {
    let src = "-> A\nafter jump\n= A\n-> B\na2\n= B\nb1\n";
    let mut reader = Reader::new(tree(src));
    let mut runner = RecordingRunner::default();
    play(&mut reader, &mut runner, &[]);
    assert_eq!(lines(&runner), vec!["b1"]);
    // Root and A frames are still below B.
    assert_eq!(reader.depth(), 3);
}

#[test]
fn return_pops_through_choices() {
    let src = "-> A\nback in root\n= A\n* Go\n\t# check\n\t\t<-\n\tnot reached\nnot reached either\n";
    let mut reader = Reader::new(tree(src));
    let mut runner = RecordingRunner::default();
    play(&mut reader, &mut runner, &[0]);
    assert_eq!(lines(&runner), vec!["back in root"]);
}

#[test]
fn return_from_root_ends_session() {
    let mut reader = Reader::new(tree("first\n<-\nsecond\n"));
    let mut runner = RecordingRunner::default();
    play(&mut reader, &mut runner, &[]);
    assert_eq!(lines(&runner), vec!["first"]);
    assert_eq!(reader.depth(), 0);
}

#[test]
fn choice_body_then_continue() {
    let src = "Question\n* Yes\n\tYou said yes\n* No\n\tYou said no\nAfterwards\n";
    let mut reader = Reader::new(tree(src));
    let mut runner = RecordingRunner::default();
    play(&mut reader, &mut runner, &[1]);
    assert_eq!(
        runner.events,
        vec![
            line("Question"),
            Event::Choices(vec![("Yes".into(), false), ("No".into(), false)]),
            line("You said no"),
            line("Afterwards"),
        ]
    );
}

#[test]
fn conditional_choices_are_filtered() {
    let src = "* Open # has_key #\n* Knock\n";
    let mut reader = Reader::new(tree(src));
    let mut runner = RecordingRunner::refusing(&["has_key"]);

    assert!(reader.step(&mut runner).unwrap());
    assert_eq!(
        runner.events,
        vec![
            Event::Command("has_key".into(), true),
            Event::Choices(vec![("Knock".into(), false)]),
        ]
    );
    assert_eq!(reader.pending_choices().len(), 1);
}

#[test]
fn all_choices_filtered_continues() {
    let src = "* Open # a #\n\tnope\n* Break # b #\nNext line\n";
    let mut reader = Reader::new(tree(src));
    let mut runner = RecordingRunner::refusing(&["a", "b"]);

    assert!(reader.step(&mut runner).unwrap());
    assert!(!reader.is_waiting_for_choice());
    assert_eq!(runner.events.last(), Some(&line("Next line")));
    assert!(!runner.events.iter().any(|e| matches!(e, Event::Choices(_))));
}

#[test]
fn merged_command_evaluated_once() {
    let src = "# a\n# b\nline\n";
    let mut reader = Reader::new(tree(src));
    let mut runner = RecordingRunner::default();
    play(&mut reader, &mut runner, &[]);
    assert_eq!(runner.events, vec![Event::Command("a\nb".into(), false), line("line")]);
}

#[test]
fn command_gates_body() {
    let src = "# yes\n\tin yes\n# no\n\tin no\nend\n";
    let mut reader = Reader::new(tree(src));
    let mut runner = RecordingRunner::refusing(&["no"]);
    play(&mut reader, &mut runner, &[]);
    assert_eq!(
        runner.events,
        vec![
            Event::Command("yes".into(), true),
            line("in yes"),
            Event::Command("no".into(), true),
            line("end"),
        ]
    );
}

#[test]
fn comments_are_skipped() {
    let mut reader = Reader::new(tree("// hidden\nshown\n"));
    let mut runner = RecordingRunner::default();
    play(&mut reader, &mut runner, &[]);
    assert_eq!(runner.events, vec![line("shown")]);
}

#[test]
fn unresolved_jump_is_skipped() {
    let mut reader = Reader::new(tree("-> missing\nstill here\n"));
    let mut runner = RecordingRunner::default();
    play(&mut reader, &mut runner, &[]);
    assert_eq!(lines(&runner), vec!["still here"]);
}

#[test]
fn step_while_choices_pending_is_an_error() {
    let mut reader = Reader::new(tree("* One\n* Two\n"));
    let mut runner = RecordingRunner::default();

    assert_eq!(reader.choose(0), Err(ReaderError::NoPendingChoice));
    assert!(reader.step(&mut runner).unwrap());
    assert_eq!(reader.step(&mut runner), Err(ReaderError::ChoicePending));
    assert_eq!(reader.choose(5), Err(ReaderError::ChoiceOutOfRange { index: 5, len: 2 }));
    reader.choose(0).unwrap();
    assert!(!reader.is_waiting_for_choice());
    assert!(!reader.step(&mut runner).unwrap());
}

#[test]
fn readers_share_a_tree() {
    let shared = tree("* Left\n\tgo left\n* Right\n\tgo right\n");
    let mut left = Reader::new(Arc::clone(&shared));
    let mut right = Reader::new(shared);
    let mut left_runner = RecordingRunner::default();
    let mut right_runner = RecordingRunner::default();

    assert!(left.step(&mut left_runner).unwrap());
    assert!(right.step(&mut right_runner).unwrap());
    left.choose(0).unwrap();
    right.choose(1).unwrap();
    play(&mut left, &mut left_runner, &[]);
    play(&mut right, &mut right_runner, &[]);

    assert_eq!(lines(&left_runner), vec!["go left"]);
    assert_eq!(lines(&right_runner), vec!["go right"]);
}

#[test]
fn start_at_section() {
    let shared = tree("root line\n= Intro\nintro line\n<-\n");
    let mut reader = Reader::start(Arc::clone(&shared), "Intro").unwrap();
    let mut runner = RecordingRunner::default();
    play(&mut reader, &mut runner, &[]);
    assert_eq!(lines(&runner), vec!["intro line"]);

    assert_eq!(
        Reader::start(shared, "Outro").unwrap_err(),
        ReaderError::UnknownSection("Outro".into())
    );
}
