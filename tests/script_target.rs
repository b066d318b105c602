//! Re-invocation of a real script: stderr decoration, abnormal exit, timeout.
//!
//! Kept in its own test binary so the script is written before any other
//! test in the process spawns children.

#![cfg(unix)]

use std::net::SocketAddr;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;
use std::time::Duration;

use clap::Command;
use garter::{AppState, CommandExecutor, ServerConfig, build_router, tree};
use tokio::io::{AsyncReadExt, AsyncWriteExt};

const SCRIPT: &str = r#"#!/bin/sh
case "$1" in
  warn) echo "out $2"; echo "careful" 1>&2 ;;
  fail) echo "never shown"; echo "bad input" 1>&2; exit 2 ;;
  hang) sleep 5 ;;
  *) echo "plain $*" ;;
esac
"#;

fn write_script() -> PathBuf {
    let path = std::env::temp_dir().join(format!("garter_script_{}.sh", std::process::id()));
    std::fs::write(&path, SCRIPT).expect("write script");
    let mut perms = std::fs::metadata(&path).expect("metadata").permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).expect("chmod script");
    path
}

async fn get(addr: SocketAddr, path: &str) -> (u16, String) {
    let mut stream = tokio::net::TcpStream::connect(addr)
        .await
        .expect("connect server");
    let req = format!("GET {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n");
    stream
        .write_all(req.as_bytes())
        .await
        .expect("write request");
    let mut response = String::new();
    stream
        .read_to_string(&mut response)
        .await
        .expect("read response");
    let (head, body) = response
        .split_once("\r\n\r\n")
        .expect("http response separator");
    let status = head
        .split_whitespace()
        .nth(1)
        .and_then(|s| s.parse::<u16>().ok())
        .expect("status");
    (status, body.to_string())
}

#[tokio::test]
async fn script_outcomes_map_to_responses() {
    let script = write_script();

    let root = Command::new("tool")
        .subcommand(Command::new("warn"))
        .subcommand(Command::new("fail"))
        .subcommand(Command::new("hang"));
    let state = AppState::new(
        tree::build(&root),
        ServerConfig::new("tool", &script),
        CommandExecutor::unbounded(),
    )
    .with_timeout(Duration::from_millis(500));
    let app = build_router(state).into_make_service_with_connect_info::<SocketAddr>();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move { axum::serve(listener, app).await.expect("serve app") });

    let (status, body) = get(addr, "/tool/warn?argv=x").await;
    assert_eq!(status, 200);
    assert_eq!(body, "out x\n(careful\n)");

    let (status, body) = get(addr, "/tool?argv=a,b").await;
    assert_eq!(status, 200);
    assert_eq!(body, "plain a b\n");

    let (status, body) = get(addr, "/tool/fail").await;
    assert_eq!(status, 500);
    assert!(body.starts_with("Error: Failed to run command"), "{body}");
    assert!(body.contains("bad input"));
    assert!(!body.contains("never shown"));

    let (status, body) = get(addr, "/tool/hang").await;
    assert_eq!(status, 500);
    assert!(body.contains("timed out"), "{body}");

    let _ = std::fs::remove_file(script);
}
