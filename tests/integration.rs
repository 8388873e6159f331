//! Integration tests for the frontline binary.
//!
//! Tests full controller sessions by spawning the process, sending commands
//! via stdin, and verifying the JSON lines on stdout.

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::Value;

/// Writes a config with fluctuation events switched off and returns its path.
fn calm_config() -> PathBuf {
    static NEXT: AtomicUsize = AtomicUsize::new(0);
    let path = std::env::temp_dir().join(format!(
        "frontline-calm-{}-{}.json",
        std::process::id(),
        NEXT.fetch_add(1, Ordering::Relaxed)
    ));
    std::fs::write(&path, r#"{"event_chance_percent":0}"#).unwrap();
    path
}

/// Sends a sequence of commands to a calm game and collects stdout lines.
fn run_engine(commands: &[&str]) -> Vec<String> {
    let config = calm_config();
    let lines = run_with_args(&["--config", config.to_str().unwrap()], commands);
    let _ = std::fs::remove_file(config);
    lines
}

/// Sends a sequence of commands to the binary and collects stdout lines.
fn run_with_args(args: &[&str], commands: &[&str]) -> Vec<String> {
    let exe = env!("CARGO_BIN_EXE_frontline");
    let mut child = Command::new(exe)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("failed to start frontline");

    let mut stdin = child.stdin.take().unwrap();
    let stdout = child.stdout.take().unwrap();
    let reader = std::io::BufReader::new(stdout);

    for cmd in commands {
        writeln!(stdin, "{}", cmd).unwrap();
    }
    stdin.flush().unwrap();
    drop(stdin);

    let lines: Vec<String> = reader.lines().map(|l| l.unwrap()).collect();
    let status = child.wait().expect("failed to wait on child");
    assert!(status.success());
    lines
}

fn parse(line: &str) -> Value {
    serde_json::from_str(line).unwrap_or_else(|e| panic!("not JSON ({}): {}", e, line))
}

#[test]
fn state_is_one_json_line() {
    let lines = run_engine(&["state", "quit"]);
    assert_eq!(lines.len(), 1);
    let state = parse(&lines[0]);
    assert_eq!(state["turn"], 1);
    assert_eq!(state["phase"], "FLUCTUATION");
    assert_eq!(state["current_player"], "blue");
    assert_eq!(state["nodes"].as_object().unwrap().len(), 11);
}

#[test]
fn summary_names_the_active_faction() {
    let lines = run_engine(&["summary", "quit"]);
    let summary = parse(&lines[0]);
    assert_eq!(summary["faction"], "blue");
    assert_eq!(summary["resources"], 10);
    assert_eq!(summary["catalogue"].as_array().unwrap().len(), 3);
}

#[test]
fn unknown_commands_are_ignored() {
    let lines = run_engine(&["foobar", "orders", "newgame soon", "quit"]);
    assert!(lines.is_empty());
}

#[test]
fn empty_lines_are_ignored() {
    let lines = run_engine(&["", "   ", "quit"]);
    assert!(lines.is_empty());
}

#[test]
fn advance_walks_the_phase_cycle() {
    let lines = run_engine(&["advance", "advance", "advance", "advance", "advance", "quit"]);
    let phases: Vec<String> = lines
        .iter()
        .map(|l| parse(l)["phase"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(
        phases,
        vec!["RESOURCE", "DEPLOYMENT", "ATTACK", "MANEUVER", "FLUCTUATION"]
    );
    assert_eq!(parse(&lines[4])["player"], "red");
}

#[test]
fn deploy_session() {
    let lines = run_engine(&[
        "advance",
        "advance",
        r#"orders [{"type":"DEPLOY","unitType":"infantry","nodeId":"blue_hq","quantity":2},{"type":"DEPLOY","unitType":"armor","nodeId":"relay_w","quantity":1},{"type":"WARP"}]"#,
        "quit",
    ]);
    assert_eq!(lines.len(), 3);
    let reply = parse(&lines[2]);
    let outcomes = reply["outcomes"].as_array().unwrap();
    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0]["status"], "applied");
    assert_eq!(outcomes[1]["status"], "rejected");
    assert_eq!(outcomes[1]["rejection"]["reason"], "node_not_owned");
    assert_eq!(reply["skipped"][0]["index"], 2);
}

#[test]
fn unreadable_batch_is_a_pass() {
    let lines = run_engine(&["advance", "advance", "orders deploy everything", "quit"]);
    let reply = parse(&lines[2]);
    assert!(reply["error"].is_string());
    assert_eq!(reply["outcomes"][0]["status"], "passed");
}

#[test]
fn unreadable_batch_is_journaled() {
    let lines = run_engine(&["advance", "advance", "orders ???", "journal 1", "quit"]);
    let entries = parse(&lines[3]);
    assert_eq!(entries[0]["kind"], "decision");
    assert_eq!(entries[0]["phase"], "DEPLOYMENT");
}

#[test]
fn second_batch_in_a_phase_is_rejected() {
    let deploy = r#"orders [{"type":"DEPLOY","unitType":"infantry","nodeId":"blue_hq","quantity":1}]"#;
    let lines = run_engine(&["advance", "advance", deploy, deploy, "pass", "summary", "quit"]);
    assert_eq!(parse(&lines[2])["outcomes"][0]["status"], "applied");
    for line in &lines[3..5] {
        let reply = parse(line);
        assert_eq!(reply["outcomes"][0]["status"], "rejected");
        assert_eq!(reply["outcomes"][0]["rejection"]["reason"], "batch_already_submitted");
    }
    assert_eq!(parse(&lines[5])["resources"], 15);
}

#[test]
fn orders_in_wrong_phase_are_rejected() {
    let lines = run_engine(&["pass", "quit"]);
    let reply = parse(&lines[0]);
    assert_eq!(reply["outcomes"][0]["status"], "rejected");
    assert_eq!(reply["outcomes"][0]["rejection"]["reason"], "wrong_phase");
}

#[test]
fn newgame_resets_state() {
    let lines = run_engine(&["advance", "advance", "newgame", "state", "quit"]);
    let reset = parse(&lines[2]);
    assert_eq!(reset["phase"], "FLUCTUATION");
    assert_eq!(reset["turn"], 1);
    let state = parse(&lines[3]);
    assert_eq!(state["players"]["blue"]["resources"], 10);
}

#[test]
fn newgame_with_seed_is_reproducible() {
    let session = [
        "newgame 7",
        "advance",
        "advance",
        "advance",
        "advance",
        "advance",
        "state",
        "quit",
    ];
    // Events enabled: the seed drives the deck as well as the dice.
    let a = run_with_args(&[], &session);
    let b = run_with_args(&[], &session);
    assert_eq!(a, b);
}

#[test]
fn bad_arguments_exit_with_failure() {
    let status = Command::new(env!("CARGO_BIN_EXE_frontline"))
        .args(["--config", "/nonexistent/frontline.json"])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .unwrap();
    assert!(!status.success());
}

#[test]
fn journal_reports_recent_entries() {
    let lines = run_engine(&["advance", "journal 1", "quit"]);
    let entries = parse(&lines[1]);
    let entries = entries.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["kind"], "economy");
}

#[test]
fn eof_exits_cleanly() {
    let lines = run_engine(&["state"]);
    assert_eq!(lines.len(), 1);
}
