//! Callables that serve a registered method name.

use crate::envelope::Params;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::marker::PhantomData;
use thiserror::Error;

/// A named callable servable through the dispatch engine.
///
/// Implemented directly by closures taking [`Params`], or through
/// [`typed`] for functions with a serde-bound argument type.
pub trait Endpoint: Send + Sync {
    fn call(&self, params: Params) -> Result<Value, EndpointError>;
}

/// A failure inside an endpoint. The dispatcher converts every variant to the
/// generic internal-error envelope; the detail stays on the server.
#[derive(Debug, Error)]
pub enum EndpointError {
    /// The supplied parameters did not bind to the endpoint's signature.
    #[error("argument binding: {0}")]
    Binding(#[from] serde_json::Error),
    /// The endpoint itself reported a failure.
    #[error("{0}")]
    Failed(String),
}

impl EndpointError {
    pub fn failed(message: impl Into<String>) -> Self {
        EndpointError::Failed(message.into())
    }
}

impl<F> Endpoint for F
where
    F: Fn(Params) -> Result<Value, EndpointError> + Send + Sync,
{
    fn call(&self, params: Params) -> Result<Value, EndpointError> {
        self(params)
    }
}

/// Wraps a plain function so its arguments bind through serde.
///
/// Positional params bind as a sequence and named params bind by field name,
/// both through the argument type's `Deserialize` impl, so one registered
/// function accepts either convention.
pub struct TypedEndpoint<F, A> {
    func: F,
    _args: PhantomData<fn(A)>,
}

/// Adapts `func` into an [`Endpoint`].
pub fn typed<F, A, R>(func: F) -> TypedEndpoint<F, A>
where
    F: Fn(A) -> Result<R, EndpointError> + Send + Sync,
    A: DeserializeOwned,
    R: Serialize,
{
    TypedEndpoint {
        func,
        _args: PhantomData,
    }
}

impl<F, A, R> Endpoint for TypedEndpoint<F, A>
where
    F: Fn(A) -> Result<R, EndpointError> + Send + Sync,
    A: DeserializeOwned,
    R: Serialize,
{
    fn call(&self, params: Params) -> Result<Value, EndpointError> {
        let args: A = serde_json::from_value(params.into_value())?;
        let retval = (self.func)(args)?;
        Ok(serde_json::to_value(retval)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::{json, Map};

    #[derive(Deserialize)]
    struct AddArgs {
        x: i64,
        y: i64,
    }

    #[test]
    fn typed_binds_positional_arguments_in_order() {
        let add = typed(|(x, y): (i64, i64)| Ok(x + y));
        let result = add
            .call(Params::Positional(vec![json!(2), json!(3)]))
            .unwrap();
        assert_eq!(result, json!(5));
    }

    #[test]
    fn typed_binds_named_arguments_by_field() {
        let add = typed(|args: AddArgs| Ok(args.x + args.y));
        let mut named = Map::new();
        named.insert("x".to_owned(), json!(2));
        named.insert("y".to_owned(), json!(3));
        let result = add.call(Params::Named(named)).unwrap();
        assert_eq!(result, json!(5));
    }

    #[test]
    fn struct_arguments_also_accept_positional_binding() {
        let add = typed(|args: AddArgs| Ok(args.x + args.y));
        let result = add
            .call(Params::Positional(vec![json!(2), json!(3)]))
            .unwrap();
        assert_eq!(result, json!(5));
    }

    #[test]
    fn zero_argument_endpoints_accept_absent_and_empty_params() {
        let hello = typed(|_: ()| Ok("Hello, World!"));
        assert_eq!(hello.call(Params::None).unwrap(), json!("Hello, World!"));
        assert_eq!(
            hello.call(Params::Positional(Vec::new())).unwrap(),
            json!("Hello, World!")
        );
        assert_eq!(
            hello.call(Params::Named(Map::new())).unwrap(),
            json!("Hello, World!")
        );
    }

    #[test]
    fn arity_mismatch_is_a_binding_error() {
        let add = typed(|(x, y): (i64, i64)| Ok(x + y));
        let err = add.call(Params::Positional(vec![json!(2)])).unwrap_err();
        assert!(matches!(err, EndpointError::Binding(_)));
    }

    #[test]
    fn closures_over_raw_params_are_endpoints() {
        let echo = |params: Params| Ok::<_, EndpointError>(params.into_value());
        let result = echo.call(Params::Positional(vec![json!("x")])).unwrap();
        assert_eq!(result, json!(["x"]));
    }
}
