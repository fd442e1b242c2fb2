//! The name-to-endpoint mapping consulted by every dispatch.

use crate::endpoint::Endpoint;
use std::{collections::BTreeMap, sync::Arc};

/// Maps method names to registered [`Endpoint`]s.
///
/// Owned by one [`RpcHandler`](crate::handler::RpcHandler). Registration
/// happens during setup; once the handler is shared for serving, the map is
/// only ever read.
#[derive(Default)]
pub struct EndpointRegistry {
    endpoints: BTreeMap<String, Arc<dyn Endpoint>>,
}

impl EndpointRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `endpoint` under `name`. The first registration for a name
    /// wins; later registrations under the same name are silently ignored.
    pub fn register<E>(&mut self, name: impl Into<String>, endpoint: E)
    where
        E: Endpoint + 'static,
    {
        self.endpoints
            .entry(name.into())
            .or_insert_with(|| Arc::new(endpoint));
    }

    pub fn resolve(&self, name: &str) -> Option<&dyn Endpoint> {
        self.endpoints.get(name).map(|endpoint| &**endpoint)
    }
}
