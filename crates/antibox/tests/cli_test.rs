//! Integration tests for the `antibox` binary.
//!
//! The vendor API is a wiremock server; every invocation runs inside its own
//! temporary directory so log files never land in the source tree.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::{Value, json};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `antibox` binary with env isolation.
fn antibox_cmd(workdir: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("antibox");
    cmd.current_dir(workdir)
        .env("HOME", workdir)
        .env("XDG_CONFIG_HOME", workdir)
        .env("ANTIBOX_CONFIG", workdir.join("absent.toml"))
        .env_remove("DEVICE_NAME")
        .env_remove("DEVICE_MAC")
        .env_remove("RULE_NAME")
        .env_remove("ANTIBOX_ALL")
        .env_remove("VERBOSITY")
        .env_remove("LOGPATH")
        .env_remove("ALTIBOX_SITE_ID")
        .env_remove("ALTIBOX_BASE_URL")
        .env_remove("ALTIBOX_TIMEOUT")
        .env_remove("ALTIBOX_USER")
        .env_remove("ALTIBOX_PASS");
    cmd
}

/// Same, pointed at `server` with working credentials.
fn antibox_against(server: &MockServer, workdir: &Path) -> assert_cmd::Command {
    let mut cmd = antibox_cmd(workdir);
    cmd.env("ALTIBOX_BASE_URL", format!("{}/api", server.uri()))
        .env("ALTIBOX_USER", "kari")
        .env("ALTIBOX_PASS", "hunter2");
    cmd
}

fn router_config(vpn_octet: &str) -> Value {
    json!({
        "router": {
            "routes": {
                "0": { "id": 1, "name": "vpn_rule", "type": "udp", "ext_from": "1194",
                       "ext_to": "1194", "int_ip": vpn_octet, "int_from": "1194", "int_to": "1194" }
            }
        },
        "wifis": { "band2": { "ssid": "hjemme" } }
    })
}

async fn mount_gateway(server: &MockServer, vpn_octet: &str) {
    Mock::given(method("GET"))
        .and(path("/api/authentication/authenticate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "data": {
                "sessionTicket": { "identifier": "ticket-abc" },
                "user": { "firstName": "Kari", "lastName": "Nordmann" }
            }
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/wifi/getlandevices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "networkClients": [
                { "hostname": "myhost", "macAddress": "AA:BB:CC:DD:EE:FF", "ipAddress": "10.0.0.55" }
            ]
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/wifi/getwifibylocation"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "data": { "2373251": router_config(vpn_octet) }
        })))
        .mount(server)
        .await;
}

// ── Usage ───────────────────────────────────────────────────────────

#[test]
fn test_help_flag() {
    let dir = tempfile::tempdir().unwrap();
    antibox_cmd(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("--hostname")
                .and(predicate::str::contains("--mac"))
                .and(predicate::str::contains("--rule")),
        );
}

#[test]
fn test_version_flag() {
    let dir = tempfile::tempdir().unwrap();
    antibox_cmd(dir.path())
        .arg("-V")
        .assert()
        .success()
        .stdout(predicate::str::contains("antibox"));
}

#[test]
fn test_no_targets_prints_help_and_exits_2() {
    let dir = tempfile::tempdir().unwrap();
    antibox_cmd(dir.path())
        .assert()
        .code(2)
        .stdout(
            predicate::str::contains("Usage")
                .and(predicate::str::contains("| ERROR | MAIN => No targets found")),
        );
}

#[test]
fn test_unknown_flag_exits_2() {
    let dir = tempfile::tempdir().unwrap();
    antibox_cmd(dir.path()).arg("--frobnicate").assert().code(2);
}

#[test]
fn test_unknown_verbosity_falls_back_to_info() {
    let dir = tempfile::tempdir().unwrap();
    antibox_cmd(dir.path())
        .args(["-v", "LOUD"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("| INFO  | LOG => Unknown verbosity `LOUD`"));
}

#[test]
fn test_bad_log_dir_falls_back_to_cwd() {
    let dir = tempfile::tempdir().unwrap();
    antibox_cmd(dir.path())
        .args(["-l", "/definitely/not/here"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("is not a directory"));

    assert!(dir.path().join("antibox.log").exists());
}

#[test]
fn test_malformed_config_file_exits_2() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    std::fs::write(&config, "entries = 'not a list'\n").unwrap();

    antibox_cmd(dir.path())
        .env("ANTIBOX_CONFIG", &config)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Failed to load config file"));
}

// ── Runs against a fake gateway ─────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_single_target_updates_rule() {
    let server = MockServer::start().await;
    mount_gateway(&server, "10").await;

    Mock::given(method("POST"))
        .and(path("/api/wifi/updatewififorlocation"))
        .and(body_string_contains("%22int_ip%22%3A%2255%22"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "message": "Lagret",
            "data": { "2373251": router_config("55") }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let logs = tempfile::tempdir().unwrap();
    antibox_against(&server, dir.path())
        .args(["-h", "myhost", "-r", "vpn_rule"])
        .arg("-l")
        .arg(logs.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("| INFO  | OK vpn_rule"));

    let log = std::fs::read_to_string(logs.path().join("antibox.log")).unwrap();
    assert!(log.contains("| INFO  | OK vpn_rule"), "log file:\n{log}");
    assert!(!dir.path().join("antibox.log").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_up_to_date_rule_is_left_alone() {
    let server = MockServer::start().await;
    mount_gateway(&server, "55").await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    antibox_against(&server, dir.path())
        .args(["-m", "AA:BB:CC:DD:EE:FF", "-r", "vpn_rule", "-v", "DEBUG"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("| DEBUG | SET_RULE => Firewall rule IP already up to date.")
                .and(predicate::str::contains("OK vpn_rule")),
        );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_error_verbosity_still_prints_status() {
    let server = MockServer::start().await;
    mount_gateway(&server, "55").await;

    let dir = tempfile::tempdir().unwrap();
    let output = antibox_against(&server, dir.path())
        .args(["-h", "myhost", "-r", "vpn_rule", "-v", "ERROR"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 1, "stdout:\n{stdout}");
    assert!(lines[0].ends_with("| INFO  | OK vpn_rule"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_missing_credentials_exits_2() {
    let server = MockServer::start().await;
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    antibox_cmd(dir.path())
        .env("ALTIBOX_BASE_URL", format!("{}/api", server.uri()))
        .args(["-h", "myhost", "-r", "vpn_rule"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("| ERROR | AUTH => No credentials found."));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_batch_with_failure_exits_2() {
    let server = MockServer::start().await;
    mount_gateway(&server, "55").await;

    let dir = tempfile::tempdir().unwrap();
    antibox_against(&server, dir.path())
        .args(["-a", "ghost||vpn_rule,|AA:BB:CC:DD:EE:FF|vpn_rule"])
        .assert()
        .code(2)
        .stdout(
            predicate::str::contains("No device found by filter `hostname=ghost`")
                .and(predicate::str::contains("OK vpn_rule")),
        );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_batch_from_config_file() {
    let server = MockServer::start().await;
    mount_gateway(&server, "55").await;

    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    std::fs::write(
        &config,
        "username = \"kari\"\n\n\
         [[entries]]\nhostname = \"myhost\"\nrule = \"vpn_rule\"\n\n\
         [[entries]]\nmac = \"AA:BB:CC:DD:EE:FF\"\nrule = \"vpn_rule\"\n",
    )
    .unwrap();

    let output = antibox_cmd(dir.path())
        .env("ANTIBOX_CONFIG", &config)
        .env("ALTIBOX_BASE_URL", format!("{}/api", server.uri()))
        .env("ALTIBOX_PASS", "hunter2")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.matches("OK vpn_rule").count(), 2, "stdout:\n{stdout}");
}
