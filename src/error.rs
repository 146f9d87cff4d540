use std::path::PathBuf;

/// Failures of the launcher before or while starting the run command.
#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    #[error("failed to determine current directory: {0}")]
    CurrentDir(#[source] std::io::Error),
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum FsError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid TOML in {}: {source}", path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {}", .0.display())]
    Missing(PathBuf),
    #[error(transparent)]
    Fs(#[from] FsError),
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: ip '{0}' is not an IP address")]
    InvalidIp(String),
    #[error("invalid config: {0} should be at least 1")]
    ZeroLimit(&'static str),
}

/// Reasons a buffered request has no usable body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BodyError {
    #[error("request headers are not terminated")]
    NoHeaderEnd,
    #[error("request has no Content-Length header")]
    MissingLength,
    #[error("Content-Length is not a number")]
    InvalidLength,
    #[error("body of {0} bytes exceeds the limit")]
    TooLarge(u64),
    #[error("body truncated: expected {expected} bytes, received {received}")]
    Incomplete { expected: usize, received: usize },
}
