use std::time::Duration;

use assert_cmd::Command;
use predicates::prelude::*;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod common;

use common::http_mock::{card_json, mount_login, mount_protected, mount_refresh, user_json};

fn namecard_cmd(home: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("namecard").unwrap();
    cmd.env("HOME", home)
        .env_remove("NAMECARD_CONFIG")
        .env_remove("NAMECARD_PROFILE")
        .env_remove("NAMECARD_BASE_URL")
        .env_remove("NAMECARD_PASSWORD");
    cmd
}

#[test]
fn help_lists_commands() {
    let home = tempfile::tempdir().unwrap();
    namecard_cmd(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("login"))
        .stdout(predicate::str::contains("cards"))
        .stdout(predicate::str::contains("--profile"));
}

#[test]
fn config_show_annotates_profiles() {
    let dir = tempfile::tempdir().unwrap();
    let config = common::write_config(dir.path(), "https://api.example.com/api/v1");
    namecard_cmd(dir.path())
        .args(["config", "show"])
        .env("NAMECARD_CONFIG", &config)
        .assert()
        .success()
        .stdout(predicate::str::contains("test (default)"))
        .stdout(predicate::str::contains("URL: https://api.example.com/api/v1"))
        .stdout(predicate::str::contains("namecard.json"));
}

#[test]
fn config_show_json_hides_header_values() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("namecard.json");
    std::fs::write(
        &config,
        r#"{"profiles": {"prod": {
            "baseUrl": "https://api.example.com",
            "headers": {"X-Api-Key": "${NAMECARD_TEST_API_KEY}"}
        }}}"#,
    )
    .unwrap();

    let output = namecard_cmd(dir.path())
        .args(["--json", "--config", config.to_str().unwrap(), "config", "show"])
        .env("NAMECARD_TEST_API_KEY", "s3cr3t-value")
        .assert()
        .success()
        .stdout(predicate::str::contains("s3cr3t-value").not())
        .get_output()
        .stdout
        .clone();

    let shown: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(shown["profiles"]["prod"]["headers"]["X-Api-Key"], "<redacted>");
    assert_eq!(shown["profiles"]["prod"]["baseUrl"], "https://api.example.com");
}

#[test]
fn status_without_session_reports_not_logged_in() {
    let dir = tempfile::tempdir().unwrap();
    let config = common::write_config(dir.path(), "https://api.example.com");
    namecard_cmd(dir.path())
        .args(["--config", config.to_str().unwrap(), "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Profile: test"))
        .stdout(predicate::str::contains("not logged in"));
}

#[test]
fn status_json_reads_token_claims() {
    let dir = tempfile::tempdir().unwrap();
    let config = common::write_config(dir.path(), "https://api.example.com");
    let access = common::jwt(serde_json::json!({ "sub": "u1", "roles": ["admin"], "exp": 4_102_444_800u64 }));
    common::write_session(dir.path(), &access, "R1");

    let output = namecard_cmd(dir.path())
        .args(["--config", config.to_str().unwrap(), "--json", "status"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let status: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(status["loggedIn"], true);
    assert_eq!(status["roles"], serde_json::json!(["admin"]));
    assert_eq!(status["accessTokenExpired"], false);
}

#[test]
fn unknown_profile_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = common::write_config(dir.path(), "https://api.example.com");
    namecard_cmd(dir.path())
        .args(["--config", config.to_str().unwrap(), "--profile", "missing", "status"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Profile 'missing' not found"));
}

#[test]
fn cleartext_base_url_is_rejected_without_opt_in() {
    let dir = tempfile::tempdir().unwrap();
    namecard_cmd(dir.path())
        .args(["--config", "/nonexistent/namecard.json", "status"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));

    let config = serde_json::json!({
        "profiles": { "default": { "baseUrl": "http://api.example.com" } }
    });
    let path = dir.path().join("namecard.json");
    std::fs::write(&path, config.to_string()).unwrap();
    namecard_cmd(dir.path())
        .args(["--config", path.to_str().unwrap(), "status"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cleartext HTTP is not allowed"));
}

#[test]
fn cards_requires_login() {
    let dir = tempfile::tempdir().unwrap();
    let config = common::write_config(dir.path(), "https://api.example.com");
    namecard_cmd(dir.path())
        .args(["--config", config.to_str().unwrap(), "cards"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not logged in"));
}

#[test]
fn json_errors_are_structured() {
    let dir = tempfile::tempdir().unwrap();
    let config = common::write_config(dir.path(), "https://api.example.com");
    namecard_cmd(dir.path())
        .args(["--config", config.to_str().unwrap(), "--json", "cards"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("\"code\": \"auth_required\""));
}

#[test]
fn card_create_rejects_unknown_template() {
    let dir = tempfile::tempdir().unwrap();
    let config = common::write_config(dir.path(), "https://api.example.com");
    common::write_session(dir.path(), "A1", "R1");
    namecard_cmd(dir.path())
        .args(["--config", config.to_str().unwrap(), "card", "create", "card_type:Modrn"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Did you mean 'Modern'?"));
}

#[tokio::test(flavor = "multi_thread")]
async fn login_then_list_cards_with_refresh() {
    let server = MockServer::start().await;
    mount_login(&server, "A1", "R1").await;
    mount_protected(
        &server,
        "/card/get-cards",
        "A2",
        serde_json::json!({ "cards": [card_json("c1", "Engineer")] }),
    )
    .await;
    mount_refresh(&server, "R1", "A2", 1, Duration::ZERO).await;

    let dir = tempfile::tempdir().unwrap();
    let config = common::write_config(dir.path(), &server.uri());
    let config_arg = config.to_str().unwrap().to_string();
    let home = dir.path().to_path_buf();

    let (login, cards) = tokio::task::spawn_blocking(move || {
        let login = namecard_cmd(&home)
            .args(["--config", &config_arg, "login", "jdoe", "-p", "hunter2"])
            .output()
            .unwrap();
        let cards = namecard_cmd(&home)
            .args(["--config", &config_arg, "cards"])
            .output()
            .unwrap();
        (login, cards)
    })
    .await
    .unwrap();

    assert!(login.status.success(), "{}", String::from_utf8_lossy(&login.stderr));
    assert!(String::from_utf8_lossy(&login.stdout).contains("Logged in as jdoe"));
    assert!(cards.status.success(), "{}", String::from_utf8_lossy(&cards.stderr));
    let stdout = String::from_utf8_lossy(&cards.stdout);
    assert!(stdout.contains("c1 [Modern]"));
    assert!(stdout.contains("Job: Engineer"));

    let session: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("session.json")).unwrap())
            .unwrap();
    assert_eq!(session["accessToken"], "A2");
    assert_eq!(session["refreshToken"], "R1");
}

#[tokio::test(flavor = "multi_thread")]
async fn public_cards_print_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/card/get-card-username/jdoe"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "card": [card_json("c1", "Engineer")]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/user/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "data": user_json("jdoe") })))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let home = dir.path().to_path_buf();
    let base_url = server.uri();

    let output = tokio::task::spawn_blocking(move || {
        namecard_cmd(&home)
            .env("NAMECARD_BASE_URL", &base_url)
            .args(["--json", "card", "public", "jdoe"])
            .output()
            .unwrap()
    })
    .await
    .unwrap();

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let cards: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(cards[0]["id"], "c1");
    assert_eq!(cards[0]["job"], "Engineer");
}
