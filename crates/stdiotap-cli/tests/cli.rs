//! Drives the real `stdiotap` binary.

#![cfg(unix)]

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

fn stdiotap(log_dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_stdiotap"));
    cmd.arg("--log-dir")
        .arg(log_dir)
        .env_remove("STDIOTAP_SHELL")
        .env_remove("STDIOTAP_LOG_DIR")
        .env_remove("STDIOTAP_LOG");
    cmd
}

fn run_with_input(cmd: &mut Command, input: &[u8]) -> Output {
    let mut child = cmd
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child.stdin.take().unwrap().write_all(input).unwrap();
    child.wait_with_output().unwrap()
}

fn log_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<_> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .filter(|path| {
            path.file_name()
                .is_some_and(|name| name.to_string_lossy().starts_with("stdio-"))
        })
        .collect();
    files.sort();
    files
}

fn single_log(dir: &Path) -> String {
    let files = log_files(dir);
    assert_eq!(files.len(), 1, "expected exactly one log file: {files:?}");
    fs::read_to_string(&files[0]).unwrap()
}

/// Log records with their timestamp removed.
fn bodies(log: &str) -> Vec<&str> {
    log.lines()
        .filter_map(|line| line.split_once(' ').map(|(_, body)| body))
        .collect()
}

#[test]
fn exit_code_of_child_is_returned() {
    let temp = TempDir::new().unwrap();

    let output = run_with_input(stdiotap(temp.path()).args(["exit", "3"]), b"");

    assert_eq!(output.status.code(), Some(3));
    assert_eq!(log_files(temp.path()).len(), 1);
}

#[test]
fn cat_is_transparent_and_logged() {
    let temp = TempDir::new().unwrap();

    let output = run_with_input(stdiotap(temp.path()).arg("cat"), b"alpha\nbeta\n");

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(output.stdout, b"alpha\nbeta\n");
    assert!(output.stderr.is_empty());

    let log = single_log(temp.path());
    let bodies = bodies(&log);
    assert!(bodies.contains(&"out: alpha"));
    assert!(bodies.contains(&"out: beta"));
    assert!(bodies.iter().any(|b| b.starts_with("in: alpha")));
    assert!(bodies.contains(&"--- input closed: end of stream ---"));
    assert!(log.ends_with('\n'));
}

#[test]
fn missing_program_is_reported_in_log() {
    let temp = TempDir::new().unwrap();

    let output = run_with_input(stdiotap(temp.path()).arg("stdiotap-no-such-program"), b"");

    assert_eq!(output.status.code(), Some(125));
    assert!(output.stdout.is_empty());
    let log = single_log(temp.path());
    assert!(
        bodies(&log)
            .contains(&"!!! Logger Error: command not found: stdiotap-no-such-program")
    );
}

#[test]
fn no_command_prints_usage() {
    let temp = TempDir::new().unwrap();

    let output = run_with_input(&mut stdiotap(temp.path()), b"");

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Usage: stdiotap"));
    assert!(log_files(temp.path()).is_empty());
}

#[test]
fn each_run_gets_its_own_log() {
    let temp = TempDir::new().unwrap();

    for _ in 0..2 {
        let output = run_with_input(stdiotap(temp.path()).arg("true"), b"");
        assert_eq!(output.status.code(), Some(0));
    }

    assert_eq!(log_files(temp.path()).len(), 2);
}

#[test]
fn stderr_stays_on_stderr() {
    let temp = TempDir::new().unwrap();

    let output = run_with_input(stdiotap(temp.path()).args(["echo", "'err: already'", ">&2"]), b"");

    assert_eq!(output.status.code(), Some(0));
    assert!(output.stdout.is_empty());
    assert_eq!(output.stderr, b"err: already\n");
    let log = single_log(temp.path());
    assert!(bodies(&log).contains(&"err: already"));
    assert!(!log.contains("err: err:"));
}

#[test]
fn direct_mode_skips_the_shell() {
    let temp = TempDir::new().unwrap();

    let output = run_with_input(
        stdiotap(temp.path()).args(["--no-shell", "printf", "%s", "$HOME"]),
        b"",
    );

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(output.stdout, b"$HOME");
}

#[test]
fn unusable_log_dir_fails_before_running() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("plain-file");
    fs::write(&file, b"").unwrap();
    let marker = temp.path().join("ran");

    let output = run_with_input(stdiotap(&file).args(["touch", marker.to_str().unwrap()]), b"");

    assert_eq!(output.status.code(), Some(74));
    assert!(String::from_utf8_lossy(&output.stderr).contains("cannot open log file"));
    assert!(!marker.exists());
}
