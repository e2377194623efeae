#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use datalogger_gateway::config::{self, OnError, StoreBackend};

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
gateway:
  listen: "0.0.0.0:3001"
ingest:
  topik: "typo" # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "BAD_CONFIG");
}

#[test]
fn ok_minimal_config() {
    let cfg = config::load_from_str("version: 1\n").expect("must parse");
    assert_eq!(cfg.version, 1);
    assert_eq!(cfg.gateway.listen, "0.0.0.0:3001");
    assert_eq!(cfg.ingest.topic, "platform-console-backend-metric-update");
    assert_eq!(cfg.ingest.on_error, OnError::Halt);
    assert_eq!(cfg.store.backend, StoreBackend::Memory);
    assert_eq!(cfg.sink.url, "plaintext://localhost:2003/");
    assert_eq!(cfg.sink.queue_capacity, 1024);
    assert_eq!(cfg.sink.reconnect_backoff_ms, 5000);
    assert_eq!(cfg.ingest.enums.len(), 1);
    assert_eq!(cfg.ingest.enums[0].pattern, "health");
    assert_eq!(cfg.ingest.enums[0].values["WARN"], 1);
}

#[test]
fn wrong_version_is_rejected() {
    let err = config::load_from_str("version: 2\n").expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "UNSUPPORTED_VERSION");
}

#[test]
fn full_config_keeps_enum_order() {
    let ok = r#"
version: 1
gateway:
  listen: "127.0.0.1:9000"
  hostname: "console.pnda"
  extra_origins: ["https://ops.example"]
ingest:
  on_error: continue
  enums:
    - pattern: "kafka"
      values: { UP: 1, DOWN: 0 }
    - pattern: "health"
      values: { OK: 0, WARN: 1, ERROR: 2 }
store:
  backend: redis
  url: "redis://10.0.0.2:6379/"
sink:
  url: "plaintext://graphite:2003/"
  write_timeout_ms: 500
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.gateway.hostname.as_deref(), Some("console.pnda"));
    assert_eq!(cfg.ingest.on_error, OnError::Continue);
    assert_eq!(cfg.ingest.enums[0].pattern, "kafka");
    assert_eq!(cfg.ingest.enums[1].pattern, "health");
    assert_eq!(cfg.store.backend, StoreBackend::Redis);
    assert_eq!(cfg.sink.write_timeout_ms, 500);
}

#[test]
fn range_checks() {
    for bad in [
        "version: 1\ngateway:\n  listen: \"nope\"\n",
        "version: 1\nsink:\n  url: \"udp://graphite:2003/\"\n",
        "version: 1\nsink:\n  connect_timeout_ms: 5\n",
        "version: 1\nsink:\n  queue_capacity: 0\n",
        "version: 1\nsink:\n  reconnect_backoff_ms: 1\n",
        "version: 1\ningest:\n  max_body_bytes: 10\n",
        "version: 1\nstore:\n  backend: redis\n  url: \"http://x\"\n",
    ] {
        let err = config::load_from_str(bad).expect_err("must fail");
        assert_eq!(err.client_code().as_str(), "BAD_CONFIG", "config={bad}");
    }
}
