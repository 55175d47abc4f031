//! Runs the `geodatahub` binary against a throwaway configuration
//!
//! None of these commands reach the network: parsing uses rules only and the
//! configured provider listens on a closed local port.

use serde_json::Value;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const ENV_VARS: &[&str] = &[
    "GEODATAHUB_LLM_BACKEND",
    "GEODATAHUB_PROVIDERS_FILE",
    "GEODATAHUB_DOWNLOAD_DIR",
    "GEODATAHUB_GEOCODER_URL",
    "GROQ_API_KEY",
    "OPENROUTER_API_KEY",
];

/// Config dir with a single local provider on a port nothing listens on
fn workspace() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let providers = dir.path().join("providers.toml");
    std::fs::write(
        &providers,
        format!(
            r#"
[[provider]]
id = "local_stac"
url = "http://127.0.0.1:{}"
priority = 5

[provider.collections]
S2_MSI_L2A = "sentinel-2-l2a"
"#,
            port
        ),
    )
    .unwrap();

    std::fs::write(
        dir.path().join("config.toml"),
        format!(
            "llm_backend = \"regex\"\nproviders_file = {:?}\ndownload_dir = {:?}\n",
            providers.display().to_string(),
            dir.path().join("downloads").display().to_string()
        ),
    )
    .unwrap();
    dir
}

fn run(config_dir: &Path, args: &[&str]) -> Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_geodatahub"));
    for var in ENV_VARS {
        command.env_remove(var);
    }
    command
        .env("RUST_LOG", "off")
        .arg("--config")
        .arg(config_dir.join("config.toml"))
        .args(args)
        .output()
        .expect("failed to run geodatahub")
}

fn stdout_json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be JSON")
}

#[test]
fn test_help_lists_commands() {
    let output = Command::new(env!("CARGO_BIN_EXE_geodatahub")).arg("--help").output().unwrap();
    assert!(output.status.success());

    let text = String::from_utf8_lossy(&output.stdout);
    for command in ["search", "download", "list", "config"] {
        assert!(text.contains(command), "help should mention {}", command);
    }
}

#[test]
fn test_list_providers_json() {
    let dir = workspace();
    let output = run(dir.path(), &["list", "providers", "--json"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let body = stdout_json(&output);
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"][0]["id"], "local_stac");
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[test]
fn test_list_products_for_provider() {
    let dir = workspace();
    let output = run(dir.path(), &["list", "products", "--provider", "local_stac", "--json"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let body = stdout_json(&output);
    let ids: Vec<&str> = body["data"].as_array().unwrap().iter().map(|p| p["id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec!["S2_MSI_L2A"]);
}

#[test]
fn test_config_reports_sources() {
    let dir = workspace();
    let output = run(dir.path(), &["config", "--json"]);
    assert!(output.status.success());

    let body = stdout_json(&output);
    let rows = body["data"].as_array().unwrap();
    let backend = rows.iter().find(|r| r["key"] == "llm_backend").unwrap();
    assert_eq!(backend["value"], "regex");
    assert_eq!(backend["source"], "file");

    let output = run(dir.path(), &["--llm", "auto", "config", "--json"]);
    let body = stdout_json(&output);
    let rows = body["data"].as_array().unwrap();
    let backend = rows.iter().find(|r| r["key"] == "llm_backend").unwrap();
    assert_eq!(backend["value"], "auto");
    assert_eq!(backend["source"], "cli");
}

#[test]
fn test_unparseable_query_exits_with_failure() {
    let dir = workspace();
    let output = run(dir.path(), &["search", "show me something nice"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Could not understand the query"));
}

#[test]
fn test_search_without_criteria_fails() {
    let dir = workspace();
    let output = run(dir.path(), &["search"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Nothing to search for"));
}

#[test]
fn test_provider_failure_exits_with_failure() {
    let dir = workspace();
    let output = run(
        dir.path(),
        &["search", "--product", "S2_MSI_L2A", "--bbox", "2.22", "48.81", "2.47", "48.90", "--json"],
    );
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());

    let error: Value = serde_json::from_slice(&output.stderr).expect("stderr should be JSON");
    assert_eq!(error["status"], "error");
}
