//! Integration tests for the kontakty command line

use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::path::PathBuf;
use std::thread::{self, JoinHandle};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

// =============================================================================
// Test Helpers
// =============================================================================

/// Isolated config and data directory
struct TestEnv {
    temp_dir: TempDir,
    config_path: PathBuf,
}

impl TestEnv {
    fn new(base_url: &str) -> Self {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        let data_dir = temp_dir.path().join("data");
        let config = format!(
            "base_url = \"{base_url}\"\ndata_dir = \"{}\"\nrequest_timeout_secs = 5\n",
            data_dir.display()
        );
        fs::write(&config_path, config).unwrap();
        Self {
            temp_dir,
            config_path,
        }
    }

    fn data_dir(&self) -> PathBuf {
        self.temp_dir.path().join("data")
    }

    fn cmd(&self) -> Command {
        let mut cmd = kontakty_cmd();
        cmd.arg("--config").arg(&self.config_path);
        cmd
    }
}

fn kontakty_cmd() -> Command {
    let mut cmd = Command::cargo_bin("kontakty").unwrap();
    cmd.env_remove("KONTAKTY_CONFIG");
    cmd.env_remove("KONTAKTY_LOG");
    cmd
}

/// Serves one canned JSON body per expected request, in order, and returns
/// the request lines it saw.
fn serve(bodies: Vec<&'static str>) -> (String, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let handle = thread::spawn(move || {
        let mut seen = Vec::new();
        for body in bodies {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();
            loop {
                let mut header = String::new();
                reader.read_line(&mut header).unwrap();
                if header == "\r\n" || header.is_empty() {
                    break;
                }
            }
            seen.push(request_line.trim_end().to_string());

            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).unwrap();
            stream.flush().unwrap();
        }
        seen
    });

    (base_url, handle)
}

const TWO_CONTACTS: &str = r#"[
    {"id": 1, "first_name": "Анна", "last_name": "Коваль", "email": "anna@example.com",
     "birthday": "1990-05-01", "phone_numbers": [{"number": "+380501112233", "label": "mobile"}]},
    {"id": 2, "first_name": "Богдан", "last_name": "Шевчук", "email": "b@example.com",
     "birthday": "1985-11-20", "phone_numbers": []}
]"#;

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn test_missing_config_is_reported() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("nope.toml");

    kontakty_cmd()
        .arg("--config")
        .arg(&missing)
        .arg("log")
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration file not found"))
        .stderr(predicate::str::contains("nope.toml"));
}

#[test]
fn test_config_without_base_url_fails() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "page_limit = 10\n").unwrap();

    kontakty_cmd()
        .arg("--config")
        .arg(&config_path)
        .arg("log")
        .assert()
        .failure()
        .stderr(predicate::str::contains("base_url"));
}

#[test]
fn test_config_from_environment() {
    let env = TestEnv::new("http://127.0.0.1:9");

    kontakty_cmd()
        .env("KONTAKTY_CONFIG", &env.config_path)
        .arg("log")
        .assert()
        .success()
        .stdout(predicate::str::contains("Журнал порожній"));
}

// =============================================================================
// Footer log
// =============================================================================

#[test]
fn test_log_prints_newest_first() {
    let env = TestEnv::new("http://127.0.0.1:9");
    fs::create_dir_all(env.data_dir()).unwrap();
    fs::write(
        env.data_dir().join("footer_log.json"),
        r#"[
            {"msg": "перше", "type": "info", "ts": 1000},
            {"msg": "друге", "type": "error", "ts": 2000}
        ]"#,
    )
    .unwrap();

    let output = env.cmd().arg("log").assert().success().get_output().stdout.clone();
    let stdout = String::from_utf8(output).unwrap();
    let first = stdout.find("друге").unwrap();
    let second = stdout.find("перше").unwrap();
    assert!(first < second, "newest entry should come first:\n{stdout}");
    assert!(stdout.contains("[error] друге"));
}

// =============================================================================
// Contacts
// =============================================================================

#[test]
fn test_list_prints_named_tiles() {
    let (base_url, server) = serve(vec![TWO_CONTACTS]);
    let env = TestEnv::new(&base_url);

    env.cmd()
        .args(["list", "--mode", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[АК] Анна Коваль"))
        .stdout(predicate::str::contains("[БШ] Богдан Шевчук"));

    let seen = server.join().unwrap();
    assert_eq!(seen.len(), 1);
    assert!(seen[0].starts_with("GET /contacts/?"), "{}", seen[0]);
    assert!(seen[0].contains("sort=asc"), "{}", seen[0]);
}

#[test]
fn test_list_search_uses_detailed_rows() {
    let (base_url, server) = serve(vec![TWO_CONTACTS]);
    let env = TestEnv::new(&base_url);

    env.cmd()
        .args(["list", "--search", "Ан", "--desc"])
        .assert()
        .success()
        .stdout(predicate::str::contains("anna@example.com"));

    let seen = server.join().unwrap();
    assert!(seen[0].contains("sort=desc"), "{}", seen[0]);
}

#[test]
fn test_list_empty_result() {
    let (base_url, server) = serve(vec![r#"{"detail": "nothing"}"#]);
    let env = TestEnv::new(&base_url);

    env.cmd()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("контактів не знайдено"));

    server.join().unwrap();
}

#[test]
fn test_list_server_unreachable() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);
    let env = TestEnv::new(&base_url);

    env.cmd().arg("list").assert().failure();
}

// =============================================================================
// Database maintenance
// =============================================================================

#[test]
fn test_db_drop_requires_confirmation() {
    let env = TestEnv::new("http://127.0.0.1:9");

    env.cmd()
        .args(["db", "drop"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--yes"));
}

#[test]
fn test_db_check_reports_and_logs() {
    let (base_url, server) = serve(vec![r#"{"status": "ok", "count": 2}"#]);
    let env = TestEnv::new(&base_url);

    env.cmd()
        .args(["db", "check"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Контактів у базі: 2"));

    let seen = server.join().unwrap();
    assert!(seen[0].starts_with("GET /db/check-state"), "{}", seen[0]);

    env.cmd()
        .arg("log")
        .assert()
        .success()
        .stdout(predicate::str::contains("[success] Контактів у базі: 2"));
}
