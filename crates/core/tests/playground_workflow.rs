use std::cell::RefCell;
use std::fs;

use pastepad_core::{Playground, PlaygroundError};
use pastepad_project::{ArchiveMember, ImportError, LanguageTag};
use pastepad_runexec::{
    ExecutionRequest, ExecutionResponse, LineKind, RunError, RunOutput, Transport,
};
use tempfile::tempdir;

/// Records every request and answers with a canned response.
struct StubTransport {
    reply: fn() -> Result<ExecutionResponse, RunError>,
    seen: RefCell<Vec<ExecutionRequest>>,
}

impl StubTransport {
    fn new(reply: fn() -> Result<ExecutionResponse, RunError>) -> Self {
        Self {
            reply,
            seen: RefCell::new(Vec::new()),
        }
    }
}

impl Transport for StubTransport {
    fn execute(&self, request: &ExecutionRequest) -> Result<ExecutionResponse, RunError> {
        self.seen.borrow_mut().push(request.clone());
        (self.reply)()
    }
}

fn echo_reply() -> Result<ExecutionResponse, RunError> {
    Ok(ExecutionResponse {
        run: Some(RunOutput {
            stdout: Some("3 4\n".into()),
            stderr: None,
        }),
    })
}

const C_PROJECT: &str = "//--- main.c ---\n// input(\"Width\")\n// input(\"Height\")\nint main(){}\n//--- util.h ---\n#pragma once";

#[test]
fn run_sends_entry_file_and_joined_inputs() {
    let mut playground = Playground::new();
    playground.parse_text(C_PROJECT).unwrap();
    assert_eq!(playground.language(), LanguageTag::C);
    playground.set_input_value(0, "3").unwrap();
    playground.set_input_value(1, "4").unwrap();

    let transport = StubTransport::new(echo_reply);
    let lines = playground.run_with(&transport).unwrap();

    let seen = transport.seen.borrow();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].language, "c");
    assert_eq!(seen[0].stdin, "3\n4");
    assert_eq!(seen[0].files.len(), 1);
    assert!(seen[0].files[0].content.starts_with("// input(\"Width\")"));

    assert_eq!(lines[0].kind, LineKind::Output);
    assert_eq!(lines[0].text, "3 4\n");
    assert_eq!(lines.last().map(|line| line.kind), Some(LineKind::Info));
}

#[test]
fn missing_inputs_never_reach_the_transport() {
    let mut playground = Playground::new();
    playground.parse_text(C_PROJECT).unwrap();
    playground.set_input_value(0, "3").unwrap();

    let transport = StubTransport::new(echo_reply);
    match playground.run_with(&transport) {
        Err(PlaygroundError::MissingInputs { slots }) => assert_eq!(slots, vec![1]),
        other => panic!("unexpected {other:?}"),
    }
    assert!(transport.seen.borrow().is_empty());
}

#[test]
fn stale_results_are_discarded_after_reparse() {
    let mut playground = Playground::new();
    playground.parse_text("//--- main.py ---\nprint(1)").unwrap();
    let ticket = playground.prepare_run().unwrap();
    let completion = ticket.dispatch(&StubTransport::new(echo_reply));

    playground.parse_text("//--- main.py ---\nprint(2)").unwrap();
    assert!(playground.accept_run(completion).is_none());

    let fresh = playground
        .prepare_run()
        .unwrap()
        .dispatch(&StubTransport::new(echo_reply));
    assert!(playground.accept_run(fresh).is_some());
}

#[test]
fn transport_failure_renders_one_error_line() {
    let mut playground = Playground::new();
    playground.parse_text("//--- main.py ---\nprint(1)").unwrap();
    let transport = StubTransport::new(|| Err(RunError::Transport("refused".into())));
    let lines = playground.run_with(&transport).unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].kind, LineKind::Error);
    assert_eq!(lines[0].text, "connection error: refused");
}

#[test]
fn imported_members_round_trip_through_export() {
    let mut playground = Playground::new();
    playground
        .import_members(&[
            ArchiveMember::new("index.html", "<head></head><body></body>"),
            ArchiveMember::new("css/site.css", "body{}"),
        ])
        .unwrap();
    assert_eq!(playground.language(), LanguageTag::Web);
    assert_eq!(playground.files().len(), 2);

    let out = tempdir().unwrap();
    assert_eq!(playground.export_to(out.path()).unwrap(), 2);
    assert_eq!(
        fs::read_to_string(out.path().join("css").join("site.css")).unwrap(),
        "body{}"
    );

    let mut reloaded = Playground::new();
    reloaded.import_path(out.path()).unwrap();
    assert_eq!(reloaded.files(), playground.files());
}

#[test]
fn failed_import_keeps_current_project() {
    let mut playground = Playground::new();
    playground.parse_text("//--- main.py ---\nprint(1)").unwrap();
    let empty = tempdir().unwrap();
    assert!(matches!(
        playground.import_path(empty.path()),
        Err(PlaygroundError::Import(_))
    ));
    assert_eq!(playground.files().get("main.py"), Some("print(1)"));
}

#[test]
fn import_with_extensionless_files_is_refused_whole() {
    let mut playground = Playground::new();
    playground.parse_text("//--- main.py ---\nprint(1)").unwrap();
    let revision = playground.revision();

    let source = tempdir().unwrap();
    fs::write(source.path().join("index.html"), "<p>hi</p>").unwrap();
    fs::write(source.path().join("run"), "echo build").unwrap();
    fs::write(source.path().join("Makefile"), "all:").unwrap();

    assert!(matches!(
        playground.import_path(source.path()),
        Err(PlaygroundError::Import(ImportError::UnrepresentablePath(_)))
    ));
    assert_eq!(playground.files().len(), 1);
    assert_eq!(playground.files().get("main.py"), Some("print(1)"));
    assert_eq!(playground.revision(), revision);
}
