// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use evd_wire::control::{read_response, write_request, ControlRequest};
use serial_test::serial;
use tokio::net::UnixStream;

#[test]
fn sibling_resolver_finds_a_file_beside_the_parent() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("base.conf"), "[GlobalServer]\n").expect("write");
    let resolver = SiblingResolver { dir: dir.path().to_path_buf() };

    assert_eq!(resolver.resolve("base"), Some(dir.path().join("base.conf")));
    assert_eq!(resolver.resolve("missing"), None);
}

#[test]
fn no_tls_material_configured_yields_no_acceptor() {
    let server = ServerConfig::default();
    let acceptor = build_tls_acceptor(&server).expect("no io attempted without paths");
    assert!(acceptor.is_none());
}

#[test]
fn no_tls_material_configured_means_no_cert_watcher_either() {
    let server = ServerConfig::default();
    let acceptor: SharedTlsAcceptor = Arc::new(parking_lot::RwLock::new(None));
    assert!(spawn_tls_cert_watch(&server, acceptor).is_none());
}

#[tokio::test]
#[serial]
async fn control_channel_round_trips_a_version_request() {
    let runtime_dir = tempfile::tempdir().expect("tempdir");
    std::env::set_var("XDG_RUNTIME_DIR", runtime_dir.path());

    let config_dir = tempfile::tempdir().expect("tempdir");
    let config_path = config_dir.path().join("evd.conf");
    std::fs::write(&config_path, "[GlobalServer]\nListen=127.0.0.1:0\n").expect("write config");

    let daemon = bootstrap(&config_path).await.expect("bootstrap");
    let run_handle = tokio::spawn(daemon.run());

    let socket_path = env::control_socket_path().expect("control socket path");
    let mut stream = None;
    for _ in 0..100 {
        if let Ok(s) = UnixStream::connect(&socket_path).await {
            stream = Some(s);
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }
    let mut stream = stream.expect("control socket never came up");

    write_request(&mut stream, &ControlRequest::new(vec!["version".to_string()])).await.expect("write request");
    let response = read_response(&mut stream).await.expect("read response");
    assert_eq!(response.code, control::OK);
    assert!(response.message.expect("version message").starts_with("evd "));

    drop(stream);
    run_handle.abort();
    std::env::remove_var("XDG_RUNTIME_DIR");
}

#[tokio::test]
#[serial]
async fn reload_rebuilds_the_routing_table_from_a_changed_config_file() {
    let runtime_dir = tempfile::tempdir().expect("tempdir");
    std::env::set_var("XDG_RUNTIME_DIR", runtime_dir.path());

    let config_dir = tempfile::tempdir().expect("tempdir");
    let config_path = config_dir.path().join("evd.conf");
    std::fs::write(
        &config_path,
        "[GlobalServer]\nListen=127.0.0.1:0\n\n[chat ping]\nActions=noop\nImportance=5\n",
    )
    .expect("write config v1");

    let daemon = bootstrap(&config_path).await.expect("bootstrap");
    let run_handle = tokio::spawn(daemon.run());

    let socket_path = env::control_socket_path().expect("control socket path");
    let mut stream = None;
    for _ in 0..100 {
        if let Ok(s) = UnixStream::connect(&socket_path).await {
            stream = Some(s);
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }
    let mut stream = stream.expect("control socket never came up");

    write_request(
        &mut stream,
        &ControlRequest::new(vec!["dump".to_string(), "event".to_string(), "chat ping".to_string()]),
    )
    .await
    .expect("write request");
    let before = read_response(&mut stream).await.expect("read response");
    assert!(before.message.expect("dump message").contains("importance=5"));

    std::fs::write(
        &config_path,
        "[GlobalServer]\nListen=127.0.0.1:0\n\n[chat ping]\nActions=noop\nImportance=9\n",
    )
    .expect("write config v2");

    write_request(&mut stream, &ControlRequest::new(vec!["reload".to_string()])).await.expect("write request");
    let reload_response = read_response(&mut stream).await.expect("read response");
    assert_eq!(reload_response.code, control::OK);

    write_request(
        &mut stream,
        &ControlRequest::new(vec!["dump".to_string(), "event".to_string(), "chat ping".to_string()]),
    )
    .await
    .expect("write request");
    let after = read_response(&mut stream).await.expect("read response");
    assert!(after.message.expect("dump message").contains("importance=9"));

    drop(stream);
    run_handle.abort();
    std::env::remove_var("XDG_RUNTIME_DIR");
}
