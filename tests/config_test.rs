#[path = "common/mod.rs"]
mod common;

use common::BidwavesTest;
use serial_test::serial;

// ============================================================================
// Config command tests
// ============================================================================

#[test]
#[serial]
fn test_config_show_defaults() {
    let bw = BidwavesTest::new();

    let output = bw.run_success(&["config", "show"]);
    assert!(output.contains("Configuration"));
    assert!(output.contains("http://localhost:8080/api"));
    assert!(output.contains("not configured"));
}

#[test]
#[serial]
fn test_config_show_json() {
    let bw = BidwavesTest::new();
    bw.run_success(&["config", "set", "list.page_size", "50"]);

    let value = bw.run_json(&["config", "show", "--json"]);
    assert_eq!(value["list"]["page_size"], 50);
    assert_eq!(value["list"]["debounce_ms"], 500);
    assert_eq!(value["auth"]["token_configured"], false);
    assert!(value["request_timeout"].is_null());
}

#[test]
#[serial]
fn test_config_set_and_get() {
    let bw = BidwavesTest::new();

    bw.run_success(&["config", "set", "list.debounce_ms", "250"]);
    let output = bw.run_success(&["config", "get", "list.debounce_ms"]);
    assert_eq!(output.trim(), "250");

    bw.run_success(&["config", "set", "api.base_url", "https://ads.example.com/api/"]);
    let output = bw.run_success(&["config", "get", "api.base_url"]);
    assert_eq!(output.trim(), "https://ads.example.com/api");
}

#[test]
#[serial]
fn test_config_token_is_masked() {
    let bw = BidwavesTest::new();

    let output = bw.run_success(&["config", "set", "auth.token", "sk-live-abcdef"]);
    assert!(!output.contains("sk-live-abcdef"));

    let output = bw.run_success(&["config", "get", "auth.token"]);
    assert!(!output.contains("sk-live-abcdef"));
    assert!(output.contains("sk"));

    let output = bw.run_success(&["config", "show"]);
    assert!(!output.contains("sk-live-abcdef"));
    assert!(output.contains("configured"));

    assert!(bw.read_config().contains("sk-live-abcdef"));
}

#[test]
#[serial]
fn test_config_get_not_set() {
    let bw = BidwavesTest::new();

    let stderr = bw.run_failure(&["config", "get", "request_timeout"]);
    assert!(stderr.contains("not set"));
}

#[test]
#[serial]
fn test_config_set_invalid_key() {
    let bw = BidwavesTest::new();

    let stderr = bw.run_failure(&["config", "set", "invalid.key", "value"]);
    assert!(stderr.contains("unknown config key"));
}

#[test]
#[serial]
fn test_config_set_invalid_values_leave_file_alone() {
    let bw = BidwavesTest::new();
    bw.run_success(&["config", "set", "list.page_size", "20"]);

    let stderr = bw.run_failure(&["config", "set", "list.page_size", "30"]);
    assert!(stderr.contains("invalid page size 30"));

    let stderr = bw.run_failure(&["config", "set", "api.base_url", "not a url"]);
    assert!(stderr.contains("invalid api.base_url"));

    let stderr = bw.run_failure(&["config", "set", "list.notify_errors", "sometimes"]);
    assert!(stderr.contains("invalid value"));

    let output = bw.run_success(&["config", "get", "list.page_size"]);
    assert_eq!(output.trim(), "20");
}

#[test]
#[serial]
fn test_config_invalid_file_is_reported() {
    let bw = BidwavesTest::new();
    bw.write_config("list:\n  page_size: 7\n");

    let stderr = bw.run_failure(&["config", "show"]);
    assert!(stderr.contains("invalid page size 7"));
}

#[cfg(unix)]
#[test]
#[serial]
fn test_config_file_is_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let bw = BidwavesTest::new();
    bw.run_success(&["config", "set", "auth.token", "secret-token"]);

    let mode = std::fs::metadata(bw.root().join("config.yaml"))
        .unwrap()
        .permissions()
        .mode();
    assert_eq!(mode & 0o777, 0o600);
}
