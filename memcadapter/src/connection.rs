//! Connection handles and the registry that shares them by persistence name.

use crate::address::ServerAddress;
use crate::client::{ConnectionSpec, Connector, SharedClient};
use crate::error::Result;
use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;

/// Opaque handle to a client bound to a fixed set of servers
#[derive(Clone)]
pub struct ConnectionHandle {
    persistent_id: Option<Arc<str>>,
    servers: Arc<[ServerAddress]>,
    client: SharedClient,
}

impl fmt::Debug for ConnectionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionHandle")
            .field("persistent_id", &self.persistent_id)
            .field("servers", &self.servers)
            .finish()
    }
}

impl ConnectionHandle {
    pub fn open(
        persistent_id: Option<&str>,
        spec: &ConnectionSpec,
        connector: &dyn Connector,
    ) -> Result<ConnectionHandle> {
        let client = connector.connect(spec)?;
        info!(
            "Opened connection handle {} for {} server(s)",
            persistent_id.unwrap_or("<private>"),
            spec.servers.len()
        );
        Ok(ConnectionHandle {
            persistent_id: persistent_id.map(Arc::from),
            servers: Arc::from(spec.servers.as_slice()),
            client,
        })
    }

    pub fn persistent_id(&self) -> Option<&str> {
        self.persistent_id.as_deref()
    }

    pub fn servers(&self) -> &[ServerAddress] {
        &self.servers
    }

    pub(crate) fn client(&self) -> &SharedClient {
        &self.client
    }

    /// True when both handles drive the same underlying client
    pub fn shares_client_with(&self, other: &ConnectionHandle) -> bool {
        Arc::ptr_eq(&self.client, &other.client)
    }
}

/// Handles keyed by persistence name.
///
/// Adapters initialized with the same name share one handle; whoever opens
/// it first decides its servers. Nothing checks that later configs agree.
#[derive(Default)]
pub struct ConnectionRegistry {
    handles: DashMap<String, ConnectionHandle>,
}

impl ConnectionRegistry {
    pub fn new() -> ConnectionRegistry {
        ConnectionRegistry {
            handles: DashMap::new(),
        }
    }

    /// Returns the shared handle for `persistent_id`, opening it on first use.
    /// Without a name every call opens a private handle.
    pub fn acquire(
        &self,
        persistent_id: Option<&str>,
        spec: &ConnectionSpec,
        connector: &dyn Connector,
    ) -> Result<ConnectionHandle> {
        let name = match persistent_id {
            Some(name) => name,
            None => return ConnectionHandle::open(None, spec, connector),
        };

        let handle = match self.get(name) {
            Some(handle) => handle,
            None => {
                // opened outside the shard lock, the first handle inserted wins
                let opened = ConnectionHandle::open(Some(name), spec, connector)?;
                self.handles
                    .entry(name.to_string())
                    .or_insert(opened)
                    .value()
                    .clone()
            }
        };

        if handle.servers() != spec.servers.as_slice() {
            warn!(
                "Persistent connection {} is already bound to other servers, ignoring requested pool",
                name
            );
        }
        Ok(handle)
    }

    pub fn get(&self, persistent_id: &str) -> Option<ConnectionHandle> {
        self.handles
            .get(persistent_id)
            .map(|handle| handle.value().clone())
    }

    /// Forgets a shared handle; adapters still holding it keep working.
    pub fn release(&self, persistent_id: &str) -> bool {
        self.handles.remove(persistent_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}
