//! Accept loop and per-connection handling.
//!
//! Every accepted connection runs on its own task and holds one permit of a
//! semaphore sized by `max_connected_hosts`. A connection arriving while no permit
//! is free is answered `403 Forbidden` and closed without reading its request.

use std::io;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::config::{ServerConfig, config_toml};
use crate::error::{BodyError, ConfigError};
use crate::http::{self, MAX_REQUEST_SIZE, Method, Response, Status};

pub const GREETING: &str = "Hello World!";

const READ_CHUNK: usize = 1024;

#[derive(Debug)]
pub struct Server {
    config: ServerConfig,
    permits: Arc<Semaphore>,
}

impl Server {
    #[must_use]
    pub fn new(config: ServerConfig) -> Self {
        let limit = usize::try_from(config.max_connected_hosts()).unwrap_or(Semaphore::MAX_PERMITS);
        Self {
            permits: Arc::new(Semaphore::new(limit.min(Semaphore::MAX_PERMITS))),
            config,
        }
    }

    /// Build a server from a config file path.
    ///
    /// # Errors
    /// Returns an error when the path is not a file or the config is invalid.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let path = config_toml(path)?;
        ServerConfig::load(&path).map(Self::new)
    }

    #[must_use]
    pub const fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Number of connections currently holding a slot.
    #[must_use]
    pub fn connected_hosts(&self) -> u32 {
        let free = u32::try_from(self.permits.available_permits()).unwrap_or(u32::MAX);
        self.config.max_connected_hosts().saturating_sub(free)
    }

    /// Bind the configured address.
    ///
    /// # Errors
    /// Returns the bind error from the OS.
    pub async fn bind(&self) -> io::Result<TcpListener> {
        TcpListener::bind(self.config.addr()).await
    }

    /// Bind and serve until the process exits.
    ///
    /// # Errors
    /// Returns an error only when binding fails.
    pub async fn run(self: Arc<Self>) -> io::Result<()> {
        let listener = self.bind().await?;
        info!(addr = %listener.local_addr()?, "server is running");
        self.serve(listener).await;
        Ok(())
    }

    /// Accept connections from `listener` forever.
    pub async fn serve(self: Arc<Self>, listener: TcpListener) {
        loop {
            let (stream, peer) = match listener.accept().await {
                Ok(pair) => pair,
                Err(e) => {
                    warn!("accept failed: {e}");
                    continue;
                }
            };
            let permit = Arc::clone(&self.permits).try_acquire_owned().ok();
            let server = Arc::clone(&self);
            tokio::spawn(async move {
                match permit {
                    Some(permit) => server.conn_handler(stream, peer, permit).await,
                    None => refuse(stream, peer).await,
                }
            });
        }
    }

    async fn conn_handler(
        &self,
        mut stream: TcpStream,
        peer: SocketAddr,
        _permit: OwnedSemaphorePermit,
    ) {
        debug!(%peer, hosts = self.connected_hosts(), "connection accepted");
        let buffer = match timeout(self.config.timeout(), read_request(&mut stream)).await {
            Ok(Ok(buffer)) => buffer,
            Ok(Err(e)) => {
                error!(%peer, "failed to read request: {e}");
                return;
            }
            Err(_) => {
                warn!(%peer, "timed out waiting for request");
                return;
            }
        };
        info!(%peer, bytes = buffer.len(), "read request");

        let Some(response) = respond(&buffer) else {
            return;
        };
        if let Err(e) = stream.write_all(&response.to_bytes()).await {
            error!(%peer, "failed to send response: {e}");
            return;
        }
        if let Err(e) = stream.shutdown().await {
            debug!(%peer, "failed to shut down connection: {e}");
        }
    }
}

async fn refuse(mut stream: TcpStream, peer: SocketAddr) {
    warn!(%peer, "connection limit reached, refusing");
    let response = Response::empty(Status::Forbidden);
    if let Err(e) = stream.write_all(&response.to_bytes()).await {
        debug!(%peer, "failed to send refusal: {e}");
    }
    if let Err(e) = stream.shutdown().await {
        debug!(%peer, "failed to shut down refused connection: {e}");
    }
}

/// Buffer one request: stop at EOF, once the request is complete, or at
/// `MAX_REQUEST_SIZE` bytes (a full header block plus a `MAX_BODY_SIZE` body).
///
/// # Errors
/// Propagates read errors from `reader`.
pub async fn read_request<R: AsyncRead + Unpin>(reader: &mut R) -> io::Result<Vec<u8>> {
    let mut buffer = Vec::with_capacity(MAX_REQUEST_SIZE);
    let mut chunk = [0u8; READ_CHUNK];
    loop {
        let n = reader.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        let room = MAX_REQUEST_SIZE - buffer.len();
        buffer.extend_from_slice(&chunk[..n.min(room)]);
        if buffer.len() >= MAX_REQUEST_SIZE || http::request_complete(&buffer) {
            break;
        }
    }
    Ok(buffer)
}

/// Choose the response for a buffered request. `None` means the peer sent nothing.
#[must_use]
pub fn respond(buffer: &[u8]) -> Option<Response> {
    if buffer.is_empty() {
        return None;
    }
    let method = Method::parse(buffer);
    let response = match http::request_body(buffer) {
        Ok(body) => {
            debug!(method = method.as_str(), bytes = body.len(), "request body");
            Response::new(Status::NotFound, GREETING)
        }
        Err(BodyError::MissingLength) => {
            warn!(method = method.as_str(), "no request body, assuming handshake");
            Response::empty(Status::NoContent)
        }
        Err(e) => {
            warn!(method = method.as_str(), "rejecting request: {e}");
            Response::new(Status::BadRequest, e.to_string())
        }
    };
    Some(response)
}
