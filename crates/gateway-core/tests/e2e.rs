//! End-to-end coverage for the gateway-core scenarios (`initialize` through
//! a real downstream session): S1 (pure stdio passthrough), S3 (mid-session
//! config change), S4 (downstream crash mid-call), and S5 (remote member
//! that fails auth at `initialize`).
//!
//! Every downstream here is a small Python script speaking the exact
//! newline-delimited JSON-RPC framing `ChildProcessTransport` expects —
//! there is no seam to inject an in-process mock `Transport` once a config
//! is handed to `Aggregator::new`, so a real stdio subprocess is the only
//! way to exercise C1 through C5 together. Grounded on
//! `turbomcp-client`'s own subprocess-fixture tests, which drive a real
//! child process over stdio rather than mocking the transport away.

use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use gateway_core::aggregator::{Aggregator, CloseReason, RequestTimeouts};
use gateway_core::model::{Namespace, NamespaceMember, ServerConfig, TransportKind};
use gateway_core::pool::{PoolInvalidation, SessionPool};
use gateway_core::session::ClientSessionManager;
use turbomcp_protocol::jsonrpc::JsonRpcResponsePayload;
use turbomcp_protocol::{JsonRpcRequest, MessageId as RequestId, ServerInfo};

/// A fake downstream MCP server, in the same newline-delimited JSON-RPC
/// shape `ChildProcessTransport` speaks. Kept as one script with a few
/// environment-variable knobs rather than several scripts so every
/// scenario drives the same, easy-to-audit fixture.
const FAKE_DOWNSTREAM: &str = r#"
import json
import os
import sys
import time

pidfile = os.environ.get("FAKE_DOWNSTREAM_PIDFILE")
if pidfile:
    with open(pidfile, "a") as f:
        f.write(f"{os.getpid()}\n")

init_error = os.environ.get("FAKE_DOWNSTREAM_INIT_ERROR")
crash_on = set(filter(None, os.environ.get("FAKE_DOWNSTREAM_CRASH_ON", "").split(",")))
slow_tools = {}
for entry in filter(None, os.environ.get("FAKE_DOWNSTREAM_SLOW_TOOLS", "").split(",")):
    name, secs = entry.split("=")
    slow_tools[name] = float(secs)

TOOLS = [
    {"name": "echo", "description": "echoes its input", "inputSchema": {"type": "object"}},
    {"name": "slow-echo", "description": "echoes after a delay", "inputSchema": {"type": "object"}},
    {"name": "crash", "description": "terminates the server", "inputSchema": {"type": "object"}},
]

def write(obj):
    sys.stdout.write(json.dumps(obj) + "\n")
    sys.stdout.flush()

for line in sys.stdin:
    line = line.strip()
    if not line:
        continue
    msg = json.loads(line)
    method = msg.get("method")
    msg_id = msg.get("id")

    if method == "initialize":
        if init_error:
            code, message = init_error.split(":", 1)
            write({"jsonrpc": "2.0", "id": msg_id, "error": {"code": int(code), "message": message}})
        else:
            write({
                "jsonrpc": "2.0",
                "id": msg_id,
                "result": {
                    "protocolVersion": "2025-06-18",
                    "capabilities": {},
                    "serverInfo": {"name": "fake-downstream", "version": "1.0.0"},
                },
            })
    elif method == "notifications/initialized":
        continue
    elif method == "tools/list":
        write({"jsonrpc": "2.0", "id": msg_id, "result": {"tools": TOOLS}})
    elif method in ("prompts/list", "resources/list", "resources/templates/list"):
        key = method.split("/")[0] if method != "resources/templates/list" else "resourceTemplates"
        write({"jsonrpc": "2.0", "id": msg_id, "result": {key: []}})
    elif method == "tools/call":
        name = (msg.get("params") or {}).get("name")
        if name in crash_on:
            sys.exit(1)
        if name in slow_tools:
            time.sleep(slow_tools[name])
        write({
            "jsonrpc": "2.0",
            "id": msg_id,
            "result": {"content": [{"type": "text", "text": f"ran {name}"}]},
        })
    else:
        write({"jsonrpc": "2.0", "id": msg_id, "error": {"code": -32601, "message": f"unknown method {method}"}})
"#;

/// Write [`FAKE_DOWNSTREAM`] to a fresh temp file, to be referenced by one
/// or more [`ServerConfig`]s via [`stdio_config`].
fn write_fake_downstream_script() -> tempfile::TempPath {
    let mut script = tempfile::NamedTempFile::new().expect("create temp script");
    script.write_all(FAKE_DOWNSTREAM.as_bytes()).expect("write fake downstream script");
    script.into_temp_path()
}

/// Build the [`ServerConfig`] that launches `script` with the given
/// environment knobs. Two configs built from the same `script` path and
/// `env` fingerprint identically (spec.md §3) — used by the S3 test to
/// prove a second lease after invalidation spawns a fresh process rather
/// than reusing the evicted one.
fn stdio_config(id: &str, script: &std::path::Path, env: Vec<(&str, &str)>) -> ServerConfig {
    let mut env_map = HashMap::new();
    for (k, v) in env {
        env_map.insert(k.to_string(), v.to_string());
    }
    ServerConfig {
        id: id.to_string(),
        transport: TransportKind::Stdio {
            command: "python3".to_string(),
            args: vec![script.to_string_lossy().into_owned()],
            env: env_map,
        },
        description: None,
    }
}

/// Write a fresh script and build the config that launches it in one step,
/// for the tests that only ever need one lease of this member.
fn fake_downstream_config(id: &str, env: Vec<(&str, &str)>) -> (ServerConfig, tempfile::TempPath) {
    let script = write_fake_downstream_script();
    let config = stdio_config(id, &script, env);
    (config, script)
}

fn namespace(id: &str, members: Vec<NamespaceMember>) -> Namespace {
    Namespace { id: id.to_string(), members, middleware: vec![] }
}

fn enabled_member(server: ServerConfig) -> NamespaceMember {
    NamespaceMember { server, enabled: true, disabled_tools: Default::default() }
}

fn server_info() -> ServerInfo {
    ServerInfo { name: "gateway".to_string(), version: "0.1.0".to_string() }
}

fn call_request(id: &str, name: &str) -> JsonRpcRequest {
    JsonRpcRequest::new(
        "tools/call".to_string(),
        Some(serde_json::json!({ "name": name, "arguments": {} })),
        RequestId::from(id),
    )
}

fn pid_lines(path: &std::path::Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap_or_default()
        .lines()
        .map(|l| l.to_string())
        .collect()
}

/// S1: a single stdio member, happy path — `initialize`'s disambiguated
/// catalog surfaces the downstream's tools unchanged and a `tools/call`
/// round-trips successfully.
#[tokio::test]
async fn s1_pure_stdio_passthrough() {
    let (config, _script) = fake_downstream_config("fake", vec![]);
    let pool = Arc::new(SessionPool::new());
    let ns = namespace("ns-s1", vec![enabled_member(config)]);

    let aggregator = Aggregator::new(&ns, pool.clone(), server_info(), RequestTimeouts::default())
        .await
        .expect("single healthy member must construct cleanly");

    let list = aggregator
        .handle_request(JsonRpcRequest::new("tools/list".to_string(), None, RequestId::from("list")))
        .await;
    let JsonRpcResponsePayload::Success { result } = list.payload else { panic!("tools/list failed: {list:?}") };
    let names: Vec<&str> = result["tools"].as_array().unwrap().iter().map(|t| t["name"].as_str().unwrap()).collect();
    assert!(names.contains(&"echo"));

    let call = aggregator.handle_request(call_request("call-1", "echo")).await;
    let JsonRpcResponsePayload::Success { result } = call.payload else { panic!("tools/call failed: {call:?}") };
    assert_eq!(result["content"][0]["text"], "ran echo");

    aggregator.close().await;
    pool.shutdown().await;
}

/// S3: a `tools/call` in flight while the namespace's fingerprint is
/// invalidated and the client session is closed concurrently. The
/// in-flight call must complete successfully, and the member session must
/// be closed rather than returned to the idle pool — a fresh lease for the
/// same fingerprint afterward must spawn a new process, not reuse the old
/// one, which the pidfile's second line proves.
#[tokio::test]
async fn s3_invalidation_during_in_flight_call_closes_not_pools_the_session() {
    let pidfile = tempfile::NamedTempFile::new().expect("create pidfile");
    let pidfile_path = pidfile.path().to_path_buf();
    let script = write_fake_downstream_script();
    let env = vec![
        ("FAKE_DOWNSTREAM_PIDFILE", pidfile_path.to_str().unwrap()),
        ("FAKE_DOWNSTREAM_SLOW_TOOLS", "slow-echo=0.3"),
    ];

    let config = stdio_config("fake", &script, env.clone());
    let fingerprint = config.fingerprint();

    let pool = Arc::new(SessionPool::with_target_idle(0));
    let ns = namespace("ns-s3", vec![enabled_member(config)]);
    let aggregator = Aggregator::new(&ns, pool.clone(), server_info(), RequestTimeouts::default())
        .await
        .expect("single healthy member must construct cleanly");

    let manager = ClientSessionManager::new(None);
    let session = manager.create("demo".to_string(), "ns-s3".to_string(), None, aggregator);

    let in_flight = {
        let session = session.clone();
        tokio::spawn(async move { session.handle(call_request("slow-call", "slow-echo")).await })
    };
    // Give the call time to actually reach the downstream before we
    // invalidate and close out from under it.
    tokio::time::sleep(Duration::from_millis(50)).await;

    pool.invalidate(PoolInvalidation::Fingerprint(fingerprint));
    manager.close(&session.id, CloseReason::StaleConfiguration).await;

    let response = tokio::time::timeout(Duration::from_secs(5), in_flight)
        .await
        .expect("close must wait for the in-flight call to finish")
        .expect("session task must not panic");
    let JsonRpcResponsePayload::Success { result } = response.payload else {
        panic!("in-flight call must still succeed: {response:?}")
    };
    assert_eq!(result["content"][0]["text"], "ran slow-echo");
    assert!(manager.get(&session.id).is_none(), "session must be gone after close");

    // A fresh lease for the same fingerprint must spawn a new process: the
    // old one was closed, not returned to the idle pool, because its
    // generation had gone stale by the time it was released.
    let fresh_config = stdio_config("fake", &script, env);
    assert_eq!(fresh_config.fingerprint(), fingerprint, "identical command/args/env must fingerprint identically");
    let fresh_ns = namespace("ns-s3-again", vec![enabled_member(fresh_config)]);
    let fresh_aggregator = Aggregator::new(&fresh_ns, pool.clone(), server_info(), RequestTimeouts::default())
        .await
        .expect("re-lease after invalidation must succeed");
    fresh_aggregator.close().await;

    assert_eq!(pid_lines(&pidfile_path).len(), 2, "a fresh process must have spawned, not reused the old one");

    pool.shutdown().await;
}

/// S4: the downstream process exits mid-`tools/call` without responding.
/// The outer client must see `code == -32002` (`Unavailable`), the dead
/// session must be evicted rather than kept in the member slot, and the
/// next call must transparently re-lease a fresh process.
#[tokio::test]
async fn s4_downstream_crash_mid_call_surfaces_unavailable_and_recovers() {
    let pidfile = tempfile::NamedTempFile::new().expect("create pidfile");
    let (config, _script) = fake_downstream_config(
        "fake",
        vec![
            ("FAKE_DOWNSTREAM_PIDFILE", pidfile.path().to_str().unwrap()),
            ("FAKE_DOWNSTREAM_CRASH_ON", "crash"),
        ],
    );
    let pool = Arc::new(SessionPool::with_target_idle(0));
    let ns = namespace("ns-s4", vec![enabled_member(config)]);
    let aggregator = Aggregator::new(&ns, pool.clone(), server_info(), RequestTimeouts::default())
        .await
        .expect("single healthy member must construct cleanly");

    let crashed = aggregator.handle_request(call_request("crash-call", "crash")).await;
    let JsonRpcResponsePayload::Error { error } = crashed.payload else {
        panic!("a crashed downstream must surface as an error: {crashed:?}")
    };
    assert_eq!(error.code, -32002, "a dead downstream must surface as Unavailable, not a generic failure");
    assert_eq!(pid_lines(pidfile.path()).len(), 1);

    let recovered = aggregator.handle_request(call_request("after-crash", "echo")).await;
    let JsonRpcResponsePayload::Success { result } = recovered.payload else {
        panic!("a call after the crash must re-lease and succeed: {recovered:?}")
    };
    assert_eq!(result["content"][0]["text"], "ran echo");
    assert_eq!(pid_lines(pidfile.path()).len(), 2, "recovery must spawn a fresh process");

    aggregator.close().await;
    pool.shutdown().await;
}

/// S5: one member fails auth at `initialize` (a 401 from a remote MCP
/// server), the other is healthy. The degraded member's tools never enter
/// the catalog, and a `tools/call` routed at its name surfaces the real
/// `Unauthorized` cause rather than a generic tool-not-found.
#[tokio::test]
async fn s5_degraded_member_surfaces_unauthorized_and_is_excluded_from_the_catalog() {
    let (healthy, _healthy_script) = fake_downstream_config("healthy", vec![]);
    let (degraded, _degraded_script) =
        fake_downstream_config("degraded", vec![("FAKE_DOWNSTREAM_INIT_ERROR", "-32001:token expired")]);

    let pool = Arc::new(SessionPool::new());
    let ns = namespace("ns-s5", vec![enabled_member(healthy), enabled_member(degraded)]);
    let aggregator = Aggregator::new(&ns, pool.clone(), server_info(), RequestTimeouts::default())
        .await
        .expect("one healthy member is enough to construct the aggregator");

    let list = aggregator
        .handle_request(JsonRpcRequest::new("tools/list".to_string(), None, RequestId::from("list")))
        .await;
    let JsonRpcResponsePayload::Success { result } = list.payload else { panic!("tools/list failed: {list:?}") };
    let names: Vec<&str> = result["tools"].as_array().unwrap().iter().map(|t| t["name"].as_str().unwrap()).collect();
    assert_eq!(names.iter().filter(|n| **n == "echo").count(), 1, "only the healthy member's tools are listed");

    let call = aggregator.handle_request(call_request("call-degraded", "missing-on-degraded-member")).await;
    let JsonRpcResponsePayload::Error { error } = call.payload else {
        panic!("a call against an unknown name with one degraded member must surface its cause: {call:?}")
    };
    assert_eq!(error.code, -32003, "the degraded member's real cause (401) must surface as Unauthorized");

    aggregator.close().await;
    pool.shutdown().await;
}
