use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};

use diana::error::LaunchError;
use diana::launch::{Env, LaunchCommand, Resolution, resolve};

#[derive(Default)]
struct FakeEnv {
    cwd: Option<PathBuf>,
    files: HashSet<PathBuf>,
    vars: HashMap<String, String>,
}

impl FakeEnv {
    fn with_cwd(mut self, p: impl Into<PathBuf>) -> Self {
        self.cwd = Some(p.into());
        self
    }
    fn add_file(mut self, p: impl Into<PathBuf>) -> Self {
        self.files.insert(p.into());
        self
    }
    fn set_var(mut self, k: impl Into<String>, v: impl Into<String>) -> Self {
        self.vars.insert(k.into(), v.into());
        self
    }
}

impl Env for FakeEnv {
    fn current_dir(&self) -> io::Result<PathBuf> {
        self.cwd
            .clone()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "cwd removed"))
    }
    fn is_file(&self, p: &Path) -> bool {
        self.files.contains(p)
    }
    fn env_var(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }
}

#[test]
fn existing_file_is_found() {
    let env = FakeEnv::default()
        .with_cwd("/proj")
        .add_file("/proj/resource/config.toml");
    let res = resolve("config.toml", &env).unwrap();
    assert_eq!(
        res,
        Resolution::Found(PathBuf::from("/proj/resource/config.toml"))
    );
}

#[test]
fn absent_file_reports_attempted_path() {
    let env = FakeEnv::default()
        .with_cwd("/proj")
        .add_file("/proj/resource/other.toml");
    let res = resolve("config.toml", &env).unwrap();
    assert_eq!(
        res,
        Resolution::Missing(PathBuf::from("/proj/resource/config.toml"))
    );
    assert_eq!(res.path(), Path::new("/proj/resource/config.toml"));
}

#[test]
fn empty_fragment_takes_failure_branch() {
    let env = FakeEnv::default().with_cwd("/proj");
    let res = resolve("", &env).unwrap();
    assert!(matches!(res, Resolution::Missing(_)));
    assert_eq!(res.path().to_str(), Some("/proj/resource/"));
}

#[test]
fn resolution_is_repeatable() {
    let env = FakeEnv::default()
        .with_cwd("/proj")
        .add_file("/proj/resource/a.toml");
    assert_eq!(resolve("a.toml", &env).unwrap(), resolve("a.toml", &env).unwrap());
    assert_eq!(resolve("b.toml", &env).unwrap(), resolve("b.toml", &env).unwrap());
}

#[test]
fn unavailable_cwd_is_an_error() {
    let env = FakeEnv::default();
    let err = resolve("a.toml", &env).unwrap_err();
    assert!(matches!(err, LaunchError::CurrentDir(_)));
    assert!(err.to_string().contains("cwd removed"), "{err}");
}

#[test]
fn default_command_runs_server_binary() {
    let cmd = LaunchCommand::from_env(&FakeEnv::default());
    assert_eq!(cmd.program(), "cargo");
    assert_eq!(cmd.args(), ["run", "--bin", "diana-srv", "--"]);
    assert_eq!(cmd, LaunchCommand::default());
}

#[test]
fn env_var_overrides_command() {
    let env = FakeEnv::default().set_var("DIANA_LAUNCH_COMMAND", "  ./target/release/diana-srv  --quiet ");
    let cmd = LaunchCommand::from_env(&env);
    assert_eq!(cmd.program(), "./target/release/diana-srv");
    assert_eq!(cmd.args(), ["--quiet"]);
}

#[test]
fn blank_env_var_falls_back_to_default() {
    let env = FakeEnv::default().set_var("DIANA_LAUNCH_COMMAND", "   ");
    assert_eq!(LaunchCommand::from_env(&env), LaunchCommand::default());
}

#[test]
fn command_appends_path_as_last_argument() {
    let cmd = LaunchCommand::parse("runner --flag").unwrap();
    let proc = cmd.command(Path::new("/proj/resource/a.toml"));
    let args: Vec<_> = proc.get_args().map(|a| a.to_string_lossy().into_owned()).collect();
    assert_eq!(proc.get_program(), "runner");
    assert_eq!(args, ["--flag", "/proj/resource/a.toml"]);
}
