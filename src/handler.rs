//! The dispatch engine: one raw request in, one serialized envelope out.

use crate::endpoint::Endpoint;
use crate::envelope::{self, ErrorEnvelope, ErrorKind, Params, RequestId, ResultEnvelope};
use crate::registry::EndpointRegistry;
use tracing::warn;

/// Validates a request envelope, dispatches it to a registered endpoint, and
/// renders the response envelope.
///
/// Each handler owns its own registry; endpoints registered on one handler
/// are not visible to any other.
#[derive(Default)]
pub struct RpcHandler {
    registry: EndpointRegistry,
}

impl RpcHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `endpoint` as `name`. The first registration for a name
    /// wins.
    pub fn add_endpoint<E>(&mut self, name: impl Into<String>, endpoint: E)
    where
        E: Endpoint + 'static,
    {
        self.registry.register(name, endpoint);
    }

    /// Handles one request, always producing a syntactically valid envelope.
    ///
    /// Validation gates run in a fixed order and the first failing gate
    /// short-circuits to its error envelope; a request malformed in several
    /// ways reports only the first failure. No failure propagates past this
    /// boundary.
    pub fn handle_request(&self, raw: &str) -> String {
        let decoded = match envelope::decode(raw) {
            Ok(value) => value,
            Err(_) => return error_response(ErrorKind::ParseError, RequestId::Null),
        };

        let request = match decoded.as_object() {
            Some(map) => map,
            None => return error_response(ErrorKind::InvalidRequest, RequestId::Null),
        };

        // Key presence only; values are not validated here. A readable id in
        // a request failing this gate is still reported as null.
        for member in ["jsonrpc", "method", "id"] {
            if !request.contains_key(member) {
                return error_response(ErrorKind::InvalidRequest, RequestId::Null);
            }
        }

        let id = RequestId::from_value(&request["id"]);

        let endpoint = match request["method"]
            .as_str()
            .and_then(|name| self.registry.resolve(name))
        {
            Some(endpoint) => endpoint,
            None => return error_response(ErrorKind::MethodNotFound, id),
        };

        let params = match Params::classify(request.get("params")) {
            Some(params) => params,
            None => return error_response(ErrorKind::InvalidParams, id),
        };

        match endpoint.call(params) {
            Ok(result) => envelope::encode(&ResultEnvelope::new(result, id)),
            Err(err) => {
                // The cause stays in the log; the wire carries only the
                // generic internal-error envelope.
                warn!(method = %request["method"], error = %err, "endpoint invocation failed");
                error_response(ErrorKind::InternalError, id)
            }
        }
    }
}

fn error_response(kind: ErrorKind, id: RequestId) -> String {
    envelope::encode(&ErrorEnvelope::new(kind, id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::{typed, EndpointError};
    use serde::Deserialize;
    use serde_json::{json, Value};

    #[derive(Deserialize)]
    struct AddArgs {
        x: i64,
        y: i64,
    }

    fn handler() -> RpcHandler {
        let mut handler = RpcHandler::new();
        handler.add_endpoint("hello", typed(|_: ()| Ok("Hello, World!")));
        handler.add_endpoint("add", typed(|args: AddArgs| Ok(args.x + args.y)));
        handler.add_endpoint("fail", |_: Params| {
            Err::<Value, _>(EndpointError::failed("boom"))
        });
        handler
    }

    fn response(raw: &str) -> Value {
        let rendered = handler().handle_request(raw);
        serde_json::from_str(&rendered).expect("response must be valid JSON")
    }

    #[test]
    fn invalid_json_is_a_parse_error_with_null_id() {
        assert_eq!(
            response(""),
            json!({
                "jsonrpc": "2.0",
                "id": null,
                "error": {
                    "code": -32700,
                    "message": "Invalid JSON was received by the server."
                }
            })
        );
    }

    #[test]
    fn non_object_payloads_are_invalid_requests() {
        for raw in ["[1,2,3]", "42", "\"hi\"", "null"] {
            let resp = response(raw);
            assert_eq!(resp["error"]["code"], json!(-32600), "payload: {raw}");
            assert_eq!(resp["id"], Value::Null);
        }
    }

    #[test]
    fn objects_missing_required_members_are_invalid_requests() {
        assert_eq!(
            response(r#"{ "am i evil": "Yes I am!" }"#),
            json!({
                "jsonrpc": "2.0",
                "id": null,
                "error": {
                    "code": -32600,
                    "message": "Invalid JSON-RPC request was received by the server."
                }
            })
        );
    }

    #[test]
    fn a_readable_id_is_not_echoed_when_a_required_member_is_missing() {
        // "jsonrpc" is absent; the id present in the request stays null in
        // the error envelope.
        let resp = response(r#"{"method": "hello", "id": "1"}"#);
        assert_eq!(resp["error"]["code"], json!(-32600));
        assert_eq!(resp["id"], Value::Null);
    }

    #[test]
    fn unknown_methods_report_method_not_found_with_the_request_id() {
        let resp = response(r#"{"jsonrpc": "2.0", "method": "not_actually_there", "id": "1"}"#);
        assert_eq!(resp["error"]["code"], json!(-32601));
        assert_eq!(resp["error"]["message"], json!("Method not found."));
        assert_eq!(resp["id"], json!("1"));
    }

    #[test]
    fn non_string_method_values_never_resolve() {
        let resp = response(r#"{"jsonrpc": "2.0", "method": 5, "id": 1}"#);
        assert_eq!(resp["error"]["code"], json!(-32601));
        assert_eq!(resp["id"], json!(1));
    }

    #[test]
    fn zero_argument_calls_succeed() {
        let resp = response(r#"{"jsonrpc": "2.0", "method": "hello", "id": "1"}"#);
        assert_eq!(
            resp,
            json!({"jsonrpc": "2.0", "result": "Hello, World!", "id": "1"})
        );
    }

    #[test]
    fn positional_params_bind_in_sequence_order() {
        let resp = response(r#"{"jsonrpc": "2.0", "method": "add", "params": [2, 3], "id": "1"}"#);
        assert_eq!(resp, json!({"jsonrpc": "2.0", "result": 5, "id": "1"}));
    }

    #[test]
    fn named_params_bind_by_parameter_name() {
        let resp = response(
            r#"{"jsonrpc": "2.0", "method": "add", "params": {"x": 2, "y": 3}, "id": "1"}"#,
        );
        assert_eq!(resp, json!({"jsonrpc": "2.0", "result": 5, "id": "1"}));
    }

    #[test]
    fn numeric_ids_echo_back_as_numbers() {
        let resp = response(r#"{"jsonrpc": "2.0", "method": "add", "params": [2, 3], "id": 7}"#);
        assert_eq!(resp["id"], json!(7));
    }

    #[test]
    fn params_of_any_other_shape_are_invalid() {
        for params in ["\"positional\"", "5", "null", "true"] {
            let raw =
                format!(r#"{{"jsonrpc": "2.0", "method": "add", "params": {params}, "id": "1"}}"#);
            let resp = response(&raw);
            assert_eq!(resp["error"]["code"], json!(-32602), "params: {params}");
            assert_eq!(resp["error"]["message"], json!("Invalid method parameter(s)"));
            assert_eq!(resp["id"], json!("1"));
        }
    }

    #[test]
    fn endpoint_failures_flatten_to_the_generic_internal_error() {
        let resp = response(r#"{"jsonrpc": "2.0", "method": "fail", "id": "1"}"#);
        assert_eq!(resp["error"]["code"], json!(-32603));
        assert_eq!(
            resp["error"]["message"],
            json!("There was an error in the executed method.")
        );
        assert_eq!(resp["id"], json!("1"));
    }

    #[test]
    fn arity_mismatches_are_endpoint_failures() {
        let resp = response(r#"{"jsonrpc": "2.0", "method": "add", "params": [2], "id": "1"}"#);
        assert_eq!(resp["error"]["code"], json!(-32603));
    }

    #[test]
    fn gates_run_in_order_and_the_first_failure_wins() {
        // Unknown method and malformed params at once: method resolution runs
        // before params classification.
        let resp =
            response(r#"{"jsonrpc": "2.0", "method": "missing", "params": "bad", "id": "1"}"#);
        assert_eq!(resp["error"]["code"], json!(-32601));

        // Missing required member and malformed params at once: the shape
        // gate runs first and reports a null id.
        let resp = response(r#"{"method": "add", "params": "bad", "id": "1"}"#);
        assert_eq!(resp["error"]["code"], json!(-32600));
        assert_eq!(resp["id"], Value::Null);
    }
}
