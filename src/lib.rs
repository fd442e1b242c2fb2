//! A minimal JSON-RPC 2.0 request/response library.
//!
//! The core is a synchronous dispatch engine ([`RpcHandler`]): it validates
//! an inbound envelope, resolves the method against a registry of named
//! endpoints, binds positional or named parameters, invokes the endpoint,
//! and renders exactly one result or error envelope. Around it sit a TCP
//! acceptor ([`RpcServer`]) that handles each connection on its own task and
//! a one-shot client ([`RpcClient`]) that opens a fresh connection per call.
//!
//! ```no_run
//! use quickjsonrpc::{typed, Params, RpcClient, RpcServer};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut server = RpcServer::new();
//!     server.add_endpoint("add", typed(|(x, y): (i64, i64)| Ok(x + y)));
//!     tokio::spawn(server.serve_tcp("127.0.0.1:1337"));
//!
//!     let client = RpcClient::new("127.0.0.1:1337".parse().unwrap());
//!     let sum = client
//!         .call("add", Params::Positional(vec![json!(2), json!(3)]))
//!         .await
//!         .unwrap();
//!     assert_eq!(sum, json!(5));
//! }
//! ```

pub mod endpoint;
pub mod envelope;
pub mod handler;
pub mod net;
pub mod registry;

pub use endpoint::{typed, Endpoint, EndpointError, TypedEndpoint};
pub use envelope::{
    decode, encode, ErrorEnvelope, ErrorKind, ErrorObject, Params, ParseError, RequestEnvelope,
    RequestId, ResultEnvelope, PROTOCOL_VERSION,
};
pub use handler::RpcHandler;
pub use net::client::{ClientError, RpcClient};
pub use net::server::RpcServer;
pub use registry::EndpointRegistry;
