use crate::adapter::CacheAdapter;
use crate::client::timer::ManualTimer;
use crate::client::{ConnectionSpec, Connector, KeyValueClient, MemoryClient, SharedClient};
use crate::codec::Payload;
use crate::config::AdapterConfig;
use crate::connection::ConnectionRegistry;
use crate::error::Result;
use std::sync::{Arc, Mutex};

pub const MOCK_NOW: u32 = 1_700_000_000;

/// Memory client that remembers what it was asked to do
pub struct RecordingClient {
    inner: MemoryClient,
    pub ttls: Mutex<Vec<(String, u32)>>,
    pub keys: Mutex<Vec<String>>,
}

impl RecordingClient {
    pub fn new(timer: Arc<ManualTimer>) -> Self {
        RecordingClient {
            inner: MemoryClient::new(timer),
            ttls: Mutex::new(Vec::new()),
            keys: Mutex::new(Vec::new()),
        }
    }

    fn touch(&self, key: &str) {
        self.keys.lock().unwrap().push(key.to_string());
    }

    pub fn last_ttl(&self) -> Option<u32> {
        self.ttls.lock().unwrap().last().map(|(_key, ttl)| *ttl)
    }

    pub fn last_key(&self) -> Option<String> {
        self.keys.lock().unwrap().last().cloned()
    }
}

impl KeyValueClient for RecordingClient {
    fn set(&self, key: &str, payload: &Payload, ttl: u32) -> Result<()> {
        self.touch(key);
        self.ttls.lock().unwrap().push((key.to_string(), ttl));
        self.inner.set(key, payload, ttl)
    }

    fn get(&self, key: &str) -> Result<Option<Payload>> {
        self.touch(key);
        self.inner.get(key)
    }

    fn increment(&self, key: &str, offset: u64) -> Result<u64> {
        self.touch(key);
        self.inner.increment(key, offset)
    }

    fn decrement(&self, key: &str, offset: u64) -> Result<u64> {
        self.touch(key);
        self.inner.decrement(key, offset)
    }

    fn delete(&self, key: &str) -> Result<bool> {
        self.touch(key);
        self.inner.delete(key)
    }
}

/// Connector handing out recording clients, keeping every one it created
pub struct RecordingConnector {
    pub timer: Arc<ManualTimer>,
    pub clients: Mutex<Vec<(ConnectionSpec, Arc<RecordingClient>)>>,
}

impl Default for RecordingConnector {
    fn default() -> Self {
        RecordingConnector {
            timer: Arc::new(ManualTimer::new(MOCK_NOW)),
            clients: Mutex::new(Vec::new()),
        }
    }
}

impl RecordingConnector {
    pub fn client(&self, index: usize) -> Arc<RecordingClient> {
        self.clients.lock().unwrap()[index].1.clone()
    }

    pub fn connections(&self) -> usize {
        self.clients.lock().unwrap().len()
    }
}

impl Connector for RecordingConnector {
    fn connect(&self, spec: &ConnectionSpec) -> Result<SharedClient> {
        let client = Arc::new(RecordingClient::new(self.timer.clone()));
        self.clients
            .lock()
            .unwrap()
            .push((spec.clone(), client.clone()));
        let shared: SharedClient = client;
        Ok(shared)
    }
}

pub struct MockAdapter {
    pub adapter: CacheAdapter,
    pub connector: RecordingConnector,
    pub registry: ConnectionRegistry,
}

impl MockAdapter {
    pub fn client(&self) -> Arc<RecordingClient> {
        self.connector.client(0)
    }
}

pub fn create_adapter(config: AdapterConfig) -> MockAdapter {
    let connector = RecordingConnector::default();
    let registry = ConnectionRegistry::new();
    let adapter = CacheAdapter::init(config, &registry, &connector).unwrap();
    MockAdapter {
        adapter,
        connector,
        registry,
    }
}
