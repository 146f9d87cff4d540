#![cfg(unix)]

use std::path::Path;
use std::process::Command;

use diana::launch::{dispatch, exit_code, missing_report};
use diana::LaunchCommand;

fn sh(script: &str) -> std::process::ExitStatus {
    Command::new("sh").arg("-c").arg(script).status().expect("run sh")
}

#[test]
fn plain_codes_pass_through() {
    assert_eq!(exit_code(sh("exit 0")), 0);
    assert_eq!(exit_code(sh("exit 3")), 3);
    assert_eq!(exit_code(sh("exit 255")), 255);
}

#[test]
fn signal_maps_to_128_plus_signal() {
    assert_eq!(exit_code(sh("kill -9 $$")), 137);
}

#[test]
fn dispatch_waits_and_returns_status() {
    let cmd = LaunchCommand::parse("true").unwrap();
    let status = dispatch(&cmd, Path::new("/ignored/path.toml")).unwrap();
    assert!(status.success());
}

#[test]
fn report_has_label_then_path() {
    let [label, path] = missing_report(Path::new("/proj/resource/a.toml"));
    assert_eq!(label, "error: resource file not found");
    assert_eq!(path, "/proj/resource/a.toml");
}
