use super::*;
use crate::client::timer::SetableTimer;
use crate::client::SharedClient;
use crate::config::SerializeFormat;
use crate::mock::{create_adapter, RecordingConnector};
use serde_derive::{Deserialize, Serialize};
use test_case::test_case;

const DAY: u64 = 60 * 60 * 24;

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Session {
    user: String,
    roles: Vec<String>,
}

fn session() -> Session {
    Session {
        user: String::from("alice"),
        roles: vec![String::from("admin")],
    }
}

fn config() -> AdapterConfig {
    AdapterConfig::builder()
        .with_servers(vec!["127.0.0.1:11211"])
        .build()
        .unwrap()
}

#[test]
fn write_then_read() {
    let mock = create_adapter(config());
    assert!(mock.adapter.write("session", &session()));
    assert_eq!(mock.adapter.read::<Session>("session"), Some(session()));
}

#[test]
fn keys_are_prefixed() {
    let mock = create_adapter(config());
    mock.adapter.write("foo", "bar");
    assert_eq!(mock.client().last_key().as_deref(), Some("cake_foo"));
    mock.adapter.delete("foo");
    assert_eq!(mock.client().last_key().as_deref(), Some("cake_foo"));
}

#[test]
fn custom_prefix_is_used() {
    let mock = create_adapter(
        AdapterConfig::builder()
            .with_prefix("app_")
            .build()
            .unwrap(),
    );
    mock.adapter.increment("hits", 1);
    assert_eq!(mock.client().last_key().as_deref(), Some("app_hits"));
}

#[test_case(40 * DAY, 0 ; "forty_days_never_expires")]
#[test_case(10 * DAY, 864_000 ; "ten_days_kept")]
#[test_case(30 * DAY, 2_592_000 ; "thirty_days_kept")]
#[test_case(30 * DAY + 1, 0 ; "just_over_thirty_days")]
#[test_case(3600, 3600 ; "one_hour")]
#[test_case(0, 0 ; "zero")]
fn write_remaps_long_durations(duration: u64, ttl: u32) {
    let mock = create_adapter(
        AdapterConfig::builder()
            .with_duration(duration)
            .build()
            .unwrap(),
    );
    assert!(mock.adapter.write("foo", "bar"));
    assert_eq!(mock.client().last_ttl(), Some(ttl));
}

#[test]
fn read_of_unknown_key_is_none() {
    let mock = create_adapter(config());
    assert_eq!(mock.adapter.read::<String>("never-written"), None);
}

#[test]
fn expired_and_missing_keys_look_the_same() {
    let mock = create_adapter(AdapterConfig::builder().with_duration(10).build().unwrap());
    assert!(mock.adapter.write("short-lived", "value"));
    mock.connector.timer.add_seconds(11);
    let expired = mock.adapter.read::<String>("short-lived");
    let missing = mock.adapter.read::<String>("never-written");
    assert_eq!(expired, None);
    assert_eq!(expired, missing);
}

#[test]
fn read_with_wrong_type_is_none() {
    let mock = create_adapter(config());
    mock.adapter.write("foo", "bar");
    assert_eq!(mock.adapter.read::<Session>("foo"), None);
}

#[test]
fn counters_work_on_written_integers() {
    let mock = create_adapter(config());
    assert!(mock.adapter.write("counter", &40u64));
    assert_eq!(mock.adapter.increment("counter", 2), Some(42));
    assert_eq!(mock.adapter.decrement("counter", DEFAULT_OFFSET), Some(41));
    assert_eq!(mock.adapter.read::<u64>("counter"), Some(41));
}

#[test]
fn increment_of_missing_key_is_none() {
    let mock = create_adapter(config());
    assert_eq!(mock.adapter.increment("missing", DEFAULT_OFFSET), None);
    assert_eq!(mock.adapter.decrement("missing", DEFAULT_OFFSET), None);
}

#[test]
fn increment_of_non_numeric_value_is_none() {
    let mock = create_adapter(config());
    mock.adapter.write("foo", "bar");
    assert_eq!(mock.adapter.increment("foo", DEFAULT_OFFSET), None);
}

#[test]
fn delete_reports_removal() {
    let mock = create_adapter(config());
    mock.adapter.write("foo", "bar");
    assert!(mock.adapter.delete("foo"));
    assert!(!mock.adapter.delete("foo"));
    assert_eq!(mock.adapter.read::<String>("foo"), None);
}

#[test_case(SerializeFormat::Native ; "native")]
#[test_case(SerializeFormat::Json ; "json")]
#[test_case(SerializeFormat::Compact ; "compact")]
fn every_format_round_trips_through_the_store(format: SerializeFormat) {
    let mock = create_adapter(
        AdapterConfig::builder()
            .with_serialize(format)
            .with_compress(true)
            .build()
            .unwrap(),
    );
    let large = "x".repeat(10_000);
    assert!(mock.adapter.write("large", &large));
    assert_eq!(mock.adapter.read::<String>("large"), Some(large));
}

#[test]
fn unsupported_operations_always_fail() {
    let mock = create_adapter(config());
    let adapter = &mock.adapter;
    assert_eq!(
        adapter.write_many::<u32>(&[]).unwrap_err(),
        AdapterError::Unsupported(Operation::WriteMany)
    );
    assert_eq!(
        adapter.write_many(&[("a", 1u32)]).unwrap_err(),
        AdapterError::Unsupported(Operation::WriteMany)
    );
    assert_eq!(
        adapter.read_many::<String>(&[]).unwrap_err(),
        AdapterError::Unsupported(Operation::ReadMany)
    );
    assert_eq!(
        adapter.read_many::<String>(&["a", "b"]).unwrap_err(),
        AdapterError::Unsupported(Operation::ReadMany)
    );
    assert_eq!(
        adapter.delete_many(&[]).unwrap_err(),
        AdapterError::Unsupported(Operation::DeleteMany)
    );
    assert_eq!(
        adapter.clear(false).unwrap_err(),
        AdapterError::Unsupported(Operation::Clear)
    );
    assert_eq!(
        adapter.clear(true).unwrap_err(),
        AdapterError::Unsupported(Operation::Clear)
    );
    assert_eq!(
        adapter.groups().unwrap_err(),
        AdapterError::Unsupported(Operation::Groups)
    );
    assert_eq!(
        adapter.clear_group("").unwrap_err(),
        AdapterError::Unsupported(Operation::ClearGroup)
    );
}

#[test]
fn unsupported_operations_leave_store_untouched() {
    let mock = create_adapter(config());
    mock.adapter.write("foo", "bar");
    let _ = mock.adapter.clear(false);
    let _ = mock.adapter.delete_many(&["foo"]);
    assert_eq!(mock.adapter.read::<String>("foo"), Some(String::from("bar")));
}

#[test]
fn capabilities_match_unsupported_operations() {
    let mock = create_adapter(config());
    let capabilities = mock.adapter.capabilities();
    for operation in capabilities.unsupported() {
        assert!(!mock.adapter.is_supported(operation));
    }
    assert_eq!(capabilities.unsupported().count(), 6);
    assert!(mock.adapter.is_supported(Operation::Read));
}

#[test]
fn reinit_keeps_connection_handle() {
    let mut mock = create_adapter(config());
    let original: Vec<ServerAddress> = mock.adapter.connection().servers().to_vec();

    let other = AdapterConfig::builder()
        .with_servers(vec!["10.0.0.1:11211", "10.0.0.2:11211"])
        .with_prefix("other_")
        .build()
        .unwrap();
    mock.adapter.reinit(other).unwrap();

    assert_eq!(mock.adapter.connection().servers(), original.as_slice());
    assert_eq!(mock.connector.connections(), 1);
    assert_eq!(mock.adapter.config().prefix, "other_");
    assert_eq!(mock.adapter.config().servers.len(), 2);
}

#[test_case(AdapterConfig { servers: vec![], ..config() } ; "empty_server_list")]
#[test_case(AdapterConfig { probability: 101, ..config() } ; "probability_out_of_range")]
#[test_case(AdapterConfig { password: Some(String::from("secret")), ..config() } ; "password_without_username")]
fn reinit_always_succeeds(other: AdapterConfig) {
    let mut mock = create_adapter(config());
    let original = mock.adapter.servers().to_vec();
    assert_eq!(mock.adapter.reinit(other.clone()), Ok(()));
    assert_eq!(mock.adapter.servers(), original.as_slice());
    assert_eq!(mock.connector.connections(), 1);
    assert_eq!(mock.adapter.config(), &other);
    assert!(mock.adapter.write("foo", "bar"));
}

#[test]
fn host_and_port_take_precedence() {
    let mock = create_adapter(
        AdapterConfig::builder()
            .with_servers(vec!["a:1", "b:2"])
            .with_host("cache")
            .with_port(11222)
            .build()
            .unwrap(),
    );
    assert_eq!(
        mock.adapter.connection().servers(),
        &[ServerAddress::Tcp {
            host: String::from("cache"),
            port: 11222
        }]
    );
}

#[test]
fn connector_receives_credentials_and_options() {
    let mock = create_adapter(
        AdapterConfig::builder()
            .with_credentials("user", "secret")
            .with_option("protocol", "binary")
            .build()
            .unwrap(),
    );
    let clients = mock.connector.clients.lock().unwrap();
    let spec = &clients[0].0;
    assert_eq!(spec.credentials.as_ref().unwrap().username, "user");
    assert_eq!(spec.options.get("protocol").map(String::as_str), Some("binary"));
}

#[test]
fn invalid_address_fails_init() {
    let connector = RecordingConnector::default();
    let registry = ConnectionRegistry::new();
    let config = AdapterConfig::builder()
        .with_server("cache:port")
        .build()
        .unwrap();
    let result = CacheAdapter::init(config, &registry, &connector);
    assert!(matches!(
        result,
        Err(AdapterError::InvalidServerAddress(_))
    ));
    assert_eq!(connector.connections(), 0);
}

#[test]
fn missing_engine_fails_init() {
    struct NoEngine;
    impl Connector for NoEngine {
        fn connect(&self, _spec: &ConnectionSpec) -> Result<SharedClient> {
            Err(AdapterError::EngineUnavailable(String::from(
                "memcached support not available",
            )))
        }
    }
    let registry = ConnectionRegistry::new();
    let result = CacheAdapter::init(config(), &registry, &NoEngine);
    assert!(matches!(result, Err(AdapterError::EngineUnavailable(_))));
}

#[test]
fn persistent_adapters_share_the_store() {
    let connector = RecordingConnector::default();
    let registry = ConnectionRegistry::new();
    let shared = AdapterConfig::builder()
        .with_persistent("pool")
        .build()
        .unwrap();
    let first = CacheAdapter::init(shared.clone(), &registry, &connector).unwrap();
    let second = CacheAdapter::init(shared, &registry, &connector).unwrap();
    assert_eq!(connector.connections(), 1);
    assert_eq!(second.persistent_id(), Some("pool"));
    assert!(first.write("foo", "bar"));
    assert_eq!(second.read::<String>("foo"), Some(String::from("bar")));
}

#[test]
fn mock_registry_is_empty_for_private_handles() {
    let mock = create_adapter(config());
    assert!(mock.registry.is_empty());
    assert_eq!(mock.adapter.persistent_id(), None);
}
