//! The connection acceptor.

use crate::endpoint::Endpoint;
use crate::handler::RpcHandler;
use crate::net;
use std::{io, sync::Arc};
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tokio::task;
use tracing::{debug, info, warn};

/// Serves an [`RpcHandler`] over TCP.
///
/// Each accepted connection is handled on its own task: read one request,
/// dispatch it, write the response, close. The accept loop never waits on a
/// connection.
#[derive(Default)]
pub struct RpcServer {
    handler: RpcHandler,
}

impl RpcServer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `endpoint` as `name`. The first registration for a name
    /// wins. Registration ends when serving starts: `serve_tcp` consumes the
    /// server, and the registry is immutable from then on.
    pub fn add_endpoint<E>(&mut self, name: impl Into<String>, endpoint: E)
    where
        E: Endpoint + 'static,
    {
        self.handler.add_endpoint(name, endpoint);
    }

    /// Binds `addr` and serves until the accept loop fails.
    pub async fn serve_tcp(self, addr: impl ToSocketAddrs) -> io::Result<()> {
        let listener = TcpListener::bind(addr).await?;
        self.serve_with_listener(listener).await
    }

    /// Serves on an already-bound listener.
    pub async fn serve_with_listener(self, listener: TcpListener) -> io::Result<()> {
        info!(addr = %listener.local_addr()?, "serving");
        let handler = Arc::new(self.handler);
        loop {
            let (stream, peer) = listener.accept().await?;
            debug!(%peer, "connection accepted");
            let handler = Arc::clone(&handler);
            task::spawn(async move {
                if let Err(err) = handle_connection(&handler, stream).await {
                    warn!(%peer, error = %err, "connection failed");
                }
            });
        }
    }
}

async fn handle_connection(handler: &RpcHandler, mut stream: TcpStream) -> io::Result<()> {
    let request = net::read_message(&mut stream).await?;
    let response = handler.handle_request(&request);
    stream.write_all(response.as_bytes()).await?;
    stream.write_all(b"\n").await?;
    Ok(())
}
