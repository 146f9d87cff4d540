use std::env;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use tracing::debug;

use crate::error::LaunchError;
use crate::fsio;

/// Directory, relative to the working directory, holding launchable resources.
pub const RESOURCE_DIR: &str = "resource";
/// Environment variable overriding the run command.
pub const LAUNCH_COMMAND_VAR: &str = "DIANA_LAUNCH_COMMAND";
pub const DEFAULT_LAUNCH_COMMAND: [&str; 5] = ["cargo", "run", "--bin", "diana-srv", "--"];

/// Environment access needed by the launcher, injectable for tests.
pub trait Env {
    /// Current working directory.
    ///
    /// # Errors
    /// Returns an error when the working directory cannot be determined.
    fn current_dir(&self) -> io::Result<PathBuf>;
    fn is_file(&self, p: &Path) -> bool;
    fn env_var(&self, key: &str) -> Option<String>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemEnv;

impl Env for SystemEnv {
    fn current_dir(&self) -> io::Result<PathBuf> {
        env::current_dir()
    }
    fn is_file(&self, p: &Path) -> bool {
        fsio::is_regular_file(p)
    }
    fn env_var(&self, key: &str) -> Option<String> {
        env::var(key).ok()
    }
}

/// `<cwd>/resource/<fragment>` by plain string concatenation.
///
/// The fragment is not normalized or validated; an empty fragment yields the
/// resource directory itself.
#[must_use]
pub fn candidate_path(cwd: &Path, fragment: &str) -> PathBuf {
    let mut joined = OsString::from(cwd.as_os_str());
    joined.push("/");
    joined.push(RESOURCE_DIR);
    joined.push("/");
    joined.push(fragment);
    PathBuf::from(joined)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Found(PathBuf),
    Missing(PathBuf),
}

impl Resolution {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Found(p) | Self::Missing(p) => p,
        }
    }
}

/// Resolve a fragment against the resource directory of the current working directory.
///
/// # Errors
/// Returns `LaunchError::CurrentDir` when the working directory is unavailable.
pub fn resolve(fragment: &str, envx: &dyn Env) -> Result<Resolution, LaunchError> {
    let cwd = envx.current_dir().map_err(LaunchError::CurrentDir)?;
    let path = candidate_path(&cwd, fragment);
    let found = envx.is_file(&path);
    debug!(path = %path.display(), found, "resolved resource");
    Ok(if found {
        Resolution::Found(path)
    } else {
        Resolution::Missing(path)
    })
}

/// The external program dispatched to, plus its leading arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchCommand {
    program: String,
    args: Vec<String>,
}

impl Default for LaunchCommand {
    fn default() -> Self {
        Self {
            program: DEFAULT_LAUNCH_COMMAND[0].to_string(),
            args: DEFAULT_LAUNCH_COMMAND[1..]
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        }
    }
}

impl LaunchCommand {
    /// Split a whitespace-separated command line. Returns `None` when blank.
    #[must_use]
    pub fn parse(line: &str) -> Option<Self> {
        let mut words = line.split_whitespace().map(str::to_string);
        let program = words.next()?;
        Some(Self {
            program,
            args: words.collect(),
        })
    }

    /// The command from `DIANA_LAUNCH_COMMAND`, or the default when unset or blank.
    #[must_use]
    pub fn from_env(envx: &dyn Env) -> Self {
        envx.env_var(LAUNCH_COMMAND_VAR)
            .and_then(|line| Self::parse(&line))
            .unwrap_or_default()
    }

    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Build the process invocation with `path` as the final argument.
    #[must_use]
    pub fn command(&self, path: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).arg(path);
        cmd
    }
}

/// Run the command against `path` with inherited stdio and wait for it.
///
/// # Errors
/// Returns `LaunchError::Spawn` when the program cannot be started.
pub fn dispatch(command: &LaunchCommand, path: &Path) -> Result<ExitStatus, LaunchError> {
    debug!(program = command.program(), path = %path.display(), "dispatching");
    command
        .command(path)
        .status()
        .map_err(|source| LaunchError::Spawn {
            program: command.program().to_string(),
            source,
        })
}

/// Process exit code mirroring a child's status.
///
/// A child killed by a signal maps to `128 + signal`, as shells report it.
#[must_use]
pub fn exit_code(status: ExitStatus) -> u8 {
    if let Some(code) = status.code() {
        return u8::try_from(code & 0xff).unwrap_or(1);
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return u8::try_from((128 + signal) & 0xff).unwrap_or(1);
        }
    }
    1
}

/// The two lines printed when the candidate path is not a file.
#[must_use]
pub fn missing_report(path: &Path) -> [String; 2] {
    [
        "error: resource file not found".to_string(),
        path.display().to_string(),
    ]
}
