//! CLI integration tests for the offline subcommands.
//!
//! Uses `assert_cmd` to spawn the `reelops` binary against a temporary JSON
//! data file and verify exit codes, stdout content, and stderr content.

use std::fs;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const FIXTURE: &str = r#"[
  {
    "id": "pending-1",
    "status": "Pending Script",
    "processed": false,
    "caption": "Three habits that changed my mornings",
    "hashtags": ["morning", "habits"],
    "created_at": "2025-03-01T10:00:00Z",
    "updated_at": "2025-03-01T10:00:00Z"
  },
  {
    "id": "ready-1",
    "status": "Video Ready (Preview)",
    "processed": false,
    "video_url": "https://cdn.example.com/ready-1.mp4",
    "created_at": "2025-03-02T10:00:00Z",
    "updated_at": "2025-03-02T10:00:00Z"
  },
  {
    "id": "ready-done",
    "status": "Video Ready (Preview)",
    "processed": true,
    "created_at": "2025-03-03T10:00:00Z",
    "updated_at": "2025-03-03T10:00:00Z"
  },
  {
    "id": "posted-1",
    "status": "Posted",
    "processed": true,
    "created_at": "2025-03-04T10:00:00Z",
    "updated_at": "2025-03-04T10:00:00Z"
  }
]"#;

/// Temp dir holding a fresh copy of the fixture.
fn data_file() -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("scripts.json");
    fs::write(&path, FIXTURE).unwrap();
    (dir, path)
}

/// A `reelops` command isolated from the caller's environment.
fn reelops() -> Command {
    let mut cmd = cargo_bin_cmd!("reelops");
    for var in [
        "N8N_BASE_URL",
        "N8N_WEBHOOK_SECRET",
        "REELOPS_DATA",
        "REELOPS_API_KEY",
        "REELOPS_TENANT_ID",
        "REELOPS_WEBHOOK_TIMEOUT_SECS",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

fn record(path: &Path, id: &str) -> serde_json::Value {
    let all: Vec<serde_json::Value> =
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
    all.into_iter()
        .find(|r| r["id"] == id)
        .unwrap_or_else(|| panic!("record {} missing", id))
}

/// One-shot webhook receiver. Answers the first request with `status` and
/// sends the raw request text back over the channel.
fn mock_engine(status: u16) -> (String, mpsc::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let Ok((stream, _)) = listener.accept() else {
            return;
        };
        let mut reader = BufReader::new(stream);
        let mut head = String::new();
        let mut content_length = 0usize;
        let mut chunked = false;
        loop {
            let mut line = String::new();
            if reader.read_line(&mut line).unwrap_or(0) == 0 || line == "\r\n" {
                break;
            }
            if let Some((name, value)) = line.split_once(':') {
                if name.eq_ignore_ascii_case("content-length") {
                    content_length = value.trim().parse().unwrap_or(0);
                }
                if name.eq_ignore_ascii_case("transfer-encoding") {
                    chunked = value.trim().eq_ignore_ascii_case("chunked");
                }
            }
            head.push_str(&line);
        }
        let mut body = Vec::new();
        if chunked {
            loop {
                let mut size = String::new();
                let _ = reader.read_line(&mut size);
                let size = usize::from_str_radix(size.trim(), 16).unwrap_or(0);
                let mut chunk = vec![0u8; size + 2];
                let _ = reader.read_exact(&mut chunk);
                if size == 0 {
                    break;
                }
                body.extend_from_slice(&chunk[..size]);
            }
        } else {
            body.resize(content_length, 0);
            let _ = reader.read_exact(&mut body);
        }
        head.push_str("\r\n");
        head.push_str(&String::from_utf8_lossy(&body));

        let reply = format!(
            "HTTP/1.1 {} X\r\nContent-Length: 2\r\nConnection: close\r\n\r\nok",
            status
        );
        let _ = reader.get_mut().write_all(reply.as_bytes());
        let _ = tx.send(head);
    });
    (base, rx)
}

// ──────────────────────────────────────────────
// help, list, show
// ──────────────────────────────────────────────

#[test]
fn help_lists_subcommands() {
    reelops()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("approve"))
        .stdout(predicate::str::contains("serve"));
}

#[test]
fn list_prints_newest_first() {
    let (_dir, path) = data_file();
    let out = reelops()
        .args(["list", "--data"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("4 of 4 scripts"))
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8(out).unwrap();
    let posted = text.find("posted-1").unwrap();
    let pending = text.find("pending-1").unwrap();
    assert!(posted < pending);
}

#[test]
fn list_filters_by_status_as_json() {
    let (_dir, path) = data_file();
    let out = reelops()
        .args(["--output", "json", "list", "--status", "Video Ready (Preview)", "--data"])
        .arg(&path)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let page: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(page["total"], 2);
    assert_eq!(page["scripts"][0]["id"], "ready-done");
}

#[test]
fn list_rejects_unknown_status() {
    let (_dir, path) = data_file();
    reelops()
        .args(["list", "--status", "Draft", "--data"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Must be one of"));
}

#[test]
fn list_reads_data_path_from_env() {
    let (_dir, path) = data_file();
    reelops()
        .arg("list")
        .env("REELOPS_DATA", &path)
        .assert()
        .success()
        .stdout(predicate::str::contains("pending-1"));
}

#[test]
fn missing_data_file_argument_exits_1() {
    reelops()
        .args(["show", "pending-1"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no data file given"));
}

#[test]
fn show_prints_fields() {
    let (_dir, path) = data_file();
    reelops()
        .args(["show", "pending-1", "--data"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Pending Script"))
        .stdout(predicate::str::contains("#morning #habits"));
}

#[test]
fn show_unknown_id_exits_1() {
    let (_dir, path) = data_file();
    reelops()
        .args(["show", "nope", "--data"])
        .arg(&path)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Script not found: nope"));
}

// ──────────────────────────────────────────────
// approve / post
// ──────────────────────────────────────────────

#[test]
fn approve_without_webhook_is_reverted() {
    let (_dir, path) = data_file();
    reelops()
        .args(["approve", "pending-1", "--actor", "u-1", "--data"])
        .arg(&path)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("not configured"));
    assert_eq!(record(&path, "pending-1")["status"], "Pending Script");
}

#[test]
fn approve_with_unreachable_engine_is_reverted() {
    let (_dir, path) = data_file();
    let port = TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    reelops()
        .args(["approve", "pending-1", "--actor", "u-1", "--data"])
        .arg(&path)
        .env("N8N_BASE_URL", format!("http://127.0.0.1:{}", port))
        .env("REELOPS_WEBHOOK_TIMEOUT_SECS", "5")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("approve-script"));
    assert_eq!(record(&path, "pending-1")["status"], "Pending Script");
}

#[test]
fn approve_triggers_engine_and_persists() {
    let (_dir, path) = data_file();
    let (base, rx) = mock_engine(200);
    reelops()
        .args(["approve", "pending-1", "--actor", "u-1", "--data"])
        .arg(&path)
        .env("N8N_BASE_URL", &base)
        .env("N8N_WEBHOOK_SECRET", "shh")
        .assert()
        .success()
        .stdout(predicate::str::contains("Script Approved"));

    let request = rx.recv().unwrap();
    assert!(request.starts_with("POST /webhook/approve-script"));
    assert!(request.to_lowercase().contains("x-webhook-secret: shh"));
    let (_, body) = request.split_once("\r\n\r\n").unwrap();
    let body: serde_json::Value = serde_json::from_str(body).unwrap();
    assert_eq!(body["script_id"], "pending-1");
    assert_eq!(body["requested_by_user_id"], "u-1");
    assert_eq!(record(&path, "pending-1")["status"], "Script Approved");
}

#[test]
fn approve_rejected_by_engine_is_reverted() {
    let (_dir, path) = data_file();
    let (base, _rx) = mock_engine(404);
    reelops()
        .args(["--output", "json", "approve", "pending-1", "--actor", "u-1", "--data"])
        .arg(&path)
        .env("N8N_BASE_URL", &base)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("NOTIFY_FAILED"))
        .stderr(predicate::str::contains("\"reverted\":true"));
    assert_eq!(record(&path, "pending-1")["status"], "Pending Script");
}

#[test]
fn approve_wrong_status_names_required_status() {
    let (_dir, path) = data_file();
    reelops()
        .args(["approve", "posted-1", "--actor", "u-1", "--data"])
        .arg(&path)
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "Only scripts with status \"Pending Script\" can be approved",
        ));
}

#[test]
fn approve_requires_actor_value() {
    let (_dir, path) = data_file();
    reelops()
        .args(["approve", "pending-1", "--actor", " ", "--data"])
        .arg(&path)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("requested_by_user_id is required"));
}

#[test]
fn post_already_processed_is_rejected() {
    let (_dir, path) = data_file();
    reelops()
        .args(["post", "ready-done", "--actor", "u-1", "--data"])
        .arg(&path)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("already processed"));
}

#[test]
fn post_marks_processed_and_keeps_status() {
    let (_dir, path) = data_file();
    let (base, rx) = mock_engine(200);
    reelops()
        .args(["post", "ready-1", "--actor", "u-2", "--data"])
        .arg(&path)
        .env("N8N_BASE_URL", &base)
        .assert()
        .success()
        .stdout(predicate::str::contains("posting initiated for ready-1"));

    assert!(rx.recv().unwrap().starts_with("POST /webhook/post-video"));
    let rec = record(&path, "ready-1");
    assert_eq!(rec["processed"], true);
    assert_eq!(rec["status"], "Video Ready (Preview)");
}

#[test]
fn post_without_webhook_clears_processed() {
    let (_dir, path) = data_file();
    reelops()
        .args(["post", "ready-1", "--actor", "u-2", "--data"])
        .arg(&path)
        .assert()
        .code(1);
    assert_eq!(record(&path, "ready-1")["processed"], false);
}

#[test]
fn serve_refuses_tls_it_cannot_provide() {
    let (_dir, path) = data_file();
    let assert = reelops()
        .args(["serve", "--port", "0", "--tls-cert", "cert.pem", "--tls-key", "key.pem", "--data"])
        .arg(&path)
        .timeout(std::time::Duration::from_secs(20))
        .assert()
        .code(1);
    if cfg!(not(feature = "tls")) {
        assert.stderr(predicate::str::contains("lacks the `tls` feature"));
    }
}
