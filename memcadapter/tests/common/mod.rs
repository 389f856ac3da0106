use memcadapter::client::timer::ManualTimer;
use memcadapter::{AdapterConfig, CacheAdapter, ConnectionRegistry, MemoryConnector};
use std::sync::Arc;

pub const START_TIME: u32 = 1_700_000_000;
const LIVE_SERVER_ENV: &str = "MEMCACHED_URL";

#[allow(dead_code)]
pub struct MemoryBackedAdapter {
    pub adapter: CacheAdapter,
    pub timer: Arc<ManualTimer>,
    pub registry: ConnectionRegistry,
    pub connector: MemoryConnector,
}

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn memory_connector() -> (MemoryConnector, Arc<ManualTimer>) {
    let timer = Arc::new(ManualTimer::new(START_TIME));
    (MemoryConnector::new(timer.clone()), timer)
}

pub fn spawn_memory_adapter(config: AdapterConfig) -> MemoryBackedAdapter {
    init_logger();
    let (connector, timer) = memory_connector();
    let registry = ConnectionRegistry::new();
    let adapter = CacheAdapter::init(config, &registry, &connector).unwrap();
    MemoryBackedAdapter {
        adapter,
        timer,
        registry,
        connector,
    }
}

/// Address of a running memcached, e.g. `127.0.0.1:11211`
#[allow(dead_code)]
pub fn live_server() -> Option<String> {
    std::env::var(LIVE_SERVER_ENV).ok()
}
