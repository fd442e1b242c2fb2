//! One-shot client: a fresh connection per call.

use crate::envelope::{self, Params, RequestEnvelope, RequestId};
use crate::net;
use serde_json::Value;
use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicI64, Ordering};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

/// Calls methods on a remote [`RpcServer`](crate::net::server::RpcServer).
pub struct RpcClient {
    addr: SocketAddr,
    next_id: AtomicI64,
}

/// A failure visible to the caller of [`RpcClient::call`]. Not retried.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("transport failure: {0}")]
    Io(#[from] io::Error),
    #[error("the response from the server was not valid JSON")]
    InvalidJson,
    #[error("the server sent neither a result nor an error")]
    NoResultOrError,
    #[error("the server reported an error: {message} (code {code})")]
    Rpc { code: i64, message: String },
}

impl RpcClient {
    pub fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            next_id: AtomicI64::new(1),
        }
    }

    /// Calls `method` under a fresh request id.
    pub async fn call(&self, method: &str, params: Params) -> Result<Value, ClientError> {
        let id = RequestId::Number(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.call_with_id(method, params, id).await
    }

    /// Calls `method` under a caller-supplied id.
    pub async fn call_with_id(
        &self,
        method: &str,
        params: Params,
        id: RequestId,
    ) -> Result<Value, ClientError> {
        let request = RequestEnvelope::new(method, params, id);
        let raw = self.send_recv(&envelope::encode(&request)).await?;
        extract_result(&raw)
    }

    async fn send_recv(&self, request: &str) -> io::Result<String> {
        let mut stream = TcpStream::connect(self.addr).await?;
        stream.write_all(request.as_bytes()).await?;
        stream.write_all(b"\n").await?;
        net::read_message(stream).await
    }
}

fn extract_result(raw: &str) -> Result<Value, ClientError> {
    let response = envelope::decode(raw).map_err(|_| ClientError::InvalidJson)?;
    let response = match response.as_object() {
        Some(map) => map,
        None => return Err(ClientError::NoResultOrError),
    };

    if let Some(result) = response.get("result") {
        return Ok(result.clone());
    }

    match response.get("error") {
        Some(err) => Err(ClientError::Rpc {
            code: err.get("code").and_then(Value::as_i64).unwrap_or_default(),
            message: err
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_owned(),
        }),
        None => Err(ClientError::NoResultOrError),
    }
}
