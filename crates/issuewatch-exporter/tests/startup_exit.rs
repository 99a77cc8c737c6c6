#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::process::Command;

#[test]
fn missing_credentials_exit_with_status_1_before_binding() {
    // Bind target that would be occupied if the binary got as far as serving.
    let spare = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = spare.local_addr().unwrap().port();
    drop(spare);

    let out = Command::new(env!("CARGO_BIN_EXE_issuewatch-exporter"))
        .env_clear()
        .env("EXPORTER_LISTEN", format!("127.0.0.1:{port}"))
        .env("SENTRY_EXPORTER_ORG", "acme")
        .output()
        .unwrap();

    assert_eq!(out.status.code(), Some(1));
    let logs = String::from_utf8_lossy(&out.stdout);
    assert!(logs.contains("SENTRY_AUTH_TOKEN"), "logs: {logs}");
    assert!(!logs.contains("listening"));

    // port is still free
    std::net::TcpListener::bind(("127.0.0.1", port)).unwrap();
}

#[test]
fn unreadable_config_file_exits_with_status_1() {
    let out = Command::new(env!("CARGO_BIN_EXE_issuewatch-exporter"))
        .env_clear()
        .env("ISSUEWATCH_CONFIG", "/nonexistent/issuewatch.yaml")
        .output()
        .unwrap();

    assert_eq!(out.status.code(), Some(1));
}
