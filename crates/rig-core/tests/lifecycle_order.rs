//! Cross-module sequencing tests: real actions, recorded execution.
//!
//! These go through the public library surface the way an embedding
//! program would: construct actions against a recording runner, hand
//! them to a control script, and assert on the exact invocation order.

use rig_common::IdAllocator;
use rig_core::action::{CommandAction, OnStop, ServiceAction, Sleep};
use rig_core::platform::OsFamily;
use rig_core::runner::RecordingRunner;
use rig_core::script::{ControlScript, Mode, RunOutcome};
use std::fs;

#[test]
fn start_runs_commands_in_order_and_halts_at_failure() {
    let ids = IdAllocator::new();
    let runner = RecordingRunner::with_exit_codes(&[0, 1]);
    let dir = tempfile::tempdir().unwrap();

    let script = ControlScript::new(vec![
        Box::new(
            CommandAction::new(&ids, "a", Some("start-a".into()), None)
                .with_runner(runner.clone()),
        ),
        Box::new(
            CommandAction::new(&ids, "b", Some("start-b".into()), None)
                .with_runner(runner.clone()),
        ),
        Box::new(
            CommandAction::new(&ids, "c", Some("start-c".into()), None)
                .with_runner(runner.clone()),
        ),
    ]);

    let outcome = script
        .start(&dir.path().join("scenario.param"))
        .unwrap();
    assert_eq!(outcome, RunOutcome::Halted);
    assert_eq!(
        runner.calls(),
        vec![vec!["start-a".to_string()], vec!["start-b".to_string()]]
    );
}

#[test]
fn stop_runs_commands_in_reverse_order() {
    let ids = IdAllocator::new();
    let runner = RecordingRunner::new();

    let script = ControlScript::new(vec![
        Box::new(
            CommandAction::new(&ids, "a", None, Some("stop-a".into())).with_runner(runner.clone()),
        ),
        Box::new(
            CommandAction::new(&ids, "b", None, Some("stop-b".into()))
                .with_active(false)
                .with_runner(runner.clone()),
        ),
        Box::new(
            CommandAction::new(&ids, "c", None, Some("stop-c".into())).with_runner(runner.clone()),
        ),
    ]);

    script.stop();
    // Inactive b is still stopped: stop undoes everything regardless.
    assert_eq!(
        runner.calls(),
        vec![
            vec!["stop-c".to_string()],
            vec!["stop-b".to_string()],
            vec!["stop-a".to_string()]
        ]
    );
}

#[test]
fn on_stop_wrapper_holds_its_command_until_the_stop_run() {
    let ids = IdAllocator::new();
    let runner = RecordingRunner::new();
    let dir = tempfile::tempdir().unwrap();

    let teardown = CommandAction::new(&ids, "teardown", Some("setup".into()), Some("cleanup".into()))
        .with_runner(runner.clone());
    let script = ControlScript::new(vec![Box::new(OnStop::new(&ids, Box::new(teardown)))]);

    // Start run: the wrapped start half is suppressed.
    script
        .run(Mode::Start, &dir.path().join("scenario.param"))
        .unwrap();
    assert!(runner.calls().is_empty());

    // Stop run: the wrapped stop half executes.
    script
        .run(Mode::Stop, &dir.path().join("scenario.param"))
        .unwrap();
    assert_eq!(runner.calls(), vec![vec!["cleanup".to_string()]]);
}

#[test]
fn param_dump_lists_values_then_schema_blocks_with_id_chain() {
    let ids = IdAllocator::new();
    let runner = RecordingRunner::new();
    let dir = tempfile::tempdir().unwrap();
    let param = dir.path().join("scenario.param");

    let script = ControlScript::new(vec![
        Box::new(
            CommandAction::new(&ids, "db", Some("db-start".into()), Some("db-stop".into()))
                .with_runner(runner.clone()),
        ),
        Box::new(Sleep::new(&ids, 0.0).with_message("settling")),
        Box::new(
            ServiceAction::for_family(&ids, "web", "nginx", OsFamily::Posix)
                .with_runner(runner.clone()),
        ),
    ]);

    script.start(&param).unwrap();
    let content = fs::read_to_string(&param).unwrap();
    let lines: Vec<&str> = content.lines().collect();

    // Action 1: values only.
    assert_eq!(lines[0], "1.description=\"db\"");
    assert_eq!(lines[1], "1.type=Command");

    // Action 2: values, then its schema keyed by kind, then the chain.
    let sleep_values = lines
        .iter()
        .position(|l| *l == "2.type=Sleep")
        .expect("sleep values present");
    let sleep_schema = lines
        .iter()
        .position(|l| *l == "Sleep.description=string")
        .expect("sleep schema present");
    let first_chain = lines
        .iter()
        .position(|l| *l == "processes=2")
        .expect("first chain line present");
    assert!(sleep_values < sleep_schema);
    assert!(sleep_schema < first_chain);

    // Action 3 extends the chain.
    assert!(lines.contains(&"processes=2|3"));
    assert!(lines.contains(&"Service.serviceName=string"));

    // No chain line for the first action.
    assert!(!lines.contains(&"processes=1"));
}
