// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use evd_wire::evp::encode_frame;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufReader};

#[tokio::test]
async fn sends_hello_then_forwards_subscribe_and_event_then_disconnects_on_bye() {
    let (mut client, server) = tokio::io::duplex(4096);
    let (server_read, server_write) = tokio::io::split(server);
    let (commands_tx, mut commands_rx) = mpsc::unbounded_channel();
    let (_fan_in, fan_out) = channel();
    let id = new_session_id();

    let handle = tokio::spawn(run(
        id,
        BufReader::new(server_read),
        server_write,
        commands_tx,
        fan_out,
        Duration::ZERO,
    ));

    let mut hello = vec![0u8; 64];
    let n = client.read(&mut hello).await.unwrap();
    assert!(String::from_utf8_lossy(&hello[..n]).starts_with("HELLO "));

    client.write_all(&encode_frame(&Frame::Subscribe(SubscribeScope::All))).await.unwrap();
    let event = Event::builder("app", "ping").build();
    client.write_all(&encode_frame(&Frame::Event(event.clone()))).await.unwrap();
    client.write_all(&encode_frame(&Frame::Bye)).await.unwrap();

    let mut bye = vec![0u8; 16];
    let n = client.read(&mut bye).await.unwrap();
    assert_eq!(&bye[..n], b"BYE\n");

    let (_, cmd1) = commands_rx.recv().await.unwrap();
    assert!(matches!(cmd1, SessionCommand::Subscribe(SubscribeScope::All)));
    let (_, cmd2) = commands_rx.recv().await.unwrap();
    assert!(matches!(cmd2, SessionCommand::Event(e) if e.uuid() == event.uuid()));
    let (_, cmd3) = commands_rx.recv().await.unwrap();
    assert!(matches!(cmd3, SessionCommand::Disconnected));

    handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn a_fan_out_event_is_written_to_the_peer() {
    let (mut client, server) = tokio::io::duplex(4096);
    let (server_read, server_write) = tokio::io::split(server);
    let (commands_tx, _commands_rx) = mpsc::unbounded_channel();
    let (fan_in, fan_out) = channel();
    let id = new_session_id();

    let handle = tokio::spawn(run(id, BufReader::new(server_read), server_write, commands_tx, fan_out, Duration::ZERO));

    let mut hello = vec![0u8; 64];
    client.read(&mut hello).await.unwrap();

    let event = Event::builder("app", "notify").build();
    fan_in.send(event.clone()).unwrap();

    let mut buf = vec![0u8; 4096];
    let n = client.read(&mut buf).await.unwrap();
    assert!(String::from_utf8_lossy(&buf[..n]).starts_with("EVENT"));

    client.write_all(&encode_frame(&Frame::Bye)).await.unwrap();
    let mut bye = vec![0u8; 16];
    client.read(&mut bye).await.unwrap();
    handle.await.unwrap().unwrap();
}
