#![forbid(unsafe_code)]
#![deny(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]

pub mod config;
pub mod error;
pub mod fsio;
pub mod http;
pub mod launch;
pub mod logging;
pub mod server;

pub use config::ServerConfig;
pub use launch::{LaunchCommand, Resolution};
pub use server::Server;
