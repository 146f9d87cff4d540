use std::fs;
use std::process::Command;

use tempfile::tempdir;

fn run(cmd: &mut Command) -> (i32, String, String) {
    let out = cmd.output().expect("failed to run diana-srv");
    let code = out.status.code().unwrap_or(-1);
    let stdout = String::from_utf8_lossy(&out.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&out.stderr).into_owned();
    (code, stdout, stderr)
}

#[test]
fn missing_config_exits_1() {
    let td = tempdir().unwrap();
    let exe = env!("CARGO_BIN_EXE_diana-srv");
    let (code, _out, err) = run(Command::new(exe).arg(td.path().join("absent.toml")));
    assert_eq!(code, 1);
    assert!(err.contains("config file not found"), "{err}");
}

#[test]
fn invalid_config_exits_1() {
    let td = tempdir().unwrap();
    let cfg = td.path().join("bad.toml");
    fs::write(&cfg, "ip = \"not-an-ip\"\nport = 1\n").unwrap();
    let exe = env!("CARGO_BIN_EXE_diana-srv");
    let (code, _out, err) = run(Command::new(exe).arg(&cfg));
    assert_eq!(code, 1);
    assert!(err.contains("not-an-ip"), "{err}");
}

#[test]
fn unbindable_address_exits_1() {
    let td = tempdir().unwrap();
    let cfg = td.path().join("srv.toml");
    // TEST-NET-1 is never assigned to a local interface.
    fs::write(&cfg, "[server]\nip = \"192.0.2.1\"\nport = 8080\n").unwrap();
    let exe = env!("CARGO_BIN_EXE_diana-srv");
    let (code, _out, err) = run(Command::new(exe).arg(&cfg).env("RUST_LOG", "off"));
    assert_eq!(code, 1);
    assert!(err.contains("192.0.2.1:8080"), "{err}");
}
