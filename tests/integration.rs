//! End-to-end tests for the vindicator test runner
//!
//! These tests verify the complete run workflow by:
//! 1. Loading plan fixtures from `tests/fixtures`
//! 2. Running them through the library against in-memory devices
//! 3. Running the `vindicator` binary in dry-run mode with an isolated config

use std::collections::VecDeque;
use std::env;
use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use vindicator::backend::{ResultStore, ScriptedBackend};
use vindicator::testing::Outcome;
use vindicator::{Backend, Cursor, ResultRecord, RunState, TestExecutor, TestPlan};

/// Test context with isolated config and data directories
struct TestContext {
    /// Temporary directory for this test
    temp_dir: PathBuf,
    /// Path to fixtures directory
    fixtures_dir: PathBuf,
    /// Config file passed with --config
    config_path: PathBuf,
}

impl TestContext {
    fn new(test_name: &str) -> Self {
        let temp_dir = env::temp_dir().join("vindicator-tests").join(test_name);

        // Clean up any previous test artifacts
        let _ = fs::remove_dir_all(&temp_dir);
        fs::create_dir_all(&temp_dir).expect("Failed to create temp dir");

        let config_path = temp_dir.join("config.toml");
        fs::write(
            &config_path,
            format!("[results]\ndir = {:?}\n", temp_dir.join("results")),
        )
        .expect("Failed to write config");

        let fixtures_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("fixtures");

        Self {
            temp_dir,
            fixtures_dir,
            config_path,
        }
    }

    fn fixture(&self, name: &str) -> PathBuf {
        self.fixtures_dir.join(name)
    }

    /// Run the binary with the isolated config
    fn vindicator(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_vindicator"))
            .arg("--config")
            .arg(&self.config_path)
            .args(args)
            .env("XDG_CONFIG_HOME", self.temp_dir.join("xdg-config"))
            .env("XDG_DATA_HOME", self.temp_dir.join("xdg-data"))
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG")
            .output()
            .expect("Failed to run vindicator")
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.temp_dir);
    }
}

/// Device double that answers each read with the last command it received
#[derive(Default)]
struct EchoDevice {
    last_line: Mutex<Option<String>>,
    reads: Mutex<VecDeque<String>>,
}

#[async_trait]
impl Backend for EchoDevice {
    async fn write_to_port(&self, _port_name: &str, data: &str) -> vindicator::Result<()> {
        *self.last_line.lock().unwrap() = Some(data.trim_end().to_string());
        Ok(())
    }

    async fn read_device_status(&self, _port_name: &str) -> vindicator::Result<String> {
        let status = self
            .last_line
            .lock()
            .unwrap()
            .clone()
            .map(|line| format!("ACK {}", line))
            .ok_or(vindicator::Error::PortClosed("echo".to_string()))?;
        self.reads.lock().unwrap().push_back(status.clone());
        Ok(status)
    }

    async fn save_results(&self, results: &[ResultRecord]) -> vindicator::Result<String> {
        Ok(format!("{} records", results.len()))
    }
}

#[tokio::test]
async fn test_yaml_fixture_runs_to_completion() {
    let ctx = TestContext::new("yaml_fixture");
    let plan = TestPlan::load(&ctx.fixture("init_reset.yaml")).unwrap();
    let backend = Arc::new(ScriptedBackend::new());
    let exec = TestExecutor::new("COM4", plan, backend.clone()).unwrap();

    exec.start().await;

    assert_eq!(exec.state(), RunState::Finished);
    assert_eq!(exec.cursor(), Cursor::new(1, 0));
    assert_eq!(exec.results(), vec![ResultRecord::new("INIT", "OK")]);
    assert_eq!(backend.writes().await.len(), 2);
}

#[tokio::test]
async fn test_custom_backend_sees_full_lines() {
    let ctx = TestContext::new("custom_backend");
    let plan = TestPlan::load(&ctx.fixture("board_check.json")).unwrap();
    let device = Arc::new(EchoDevice::default());
    let exec = TestExecutor::new("/dev/ttyACM1", plan, device.clone()).unwrap();

    exec.start().await;

    assert_eq!(
        exec.results(),
        vec![
            ResultRecord::new("VER", "ACK VER?"),
            ResultRecord::new("SN", "ACK SN?"),
            ResultRecord::new("STATUS", "ACK STATUS"),
        ]
    );
    assert_eq!(device.reads.lock().unwrap().len(), 3);
    assert_eq!(exec.save_results().await.as_deref(), Some("3 records"));
}

#[tokio::test]
async fn test_results_saved_to_store_after_partial_failure() {
    let ctx = TestContext::new("store_after_failure");
    let plan = TestPlan::load(&ctx.fixture("board_check.json")).unwrap();
    let backend = Arc::new(ScriptedBackend::new().with_statuses(["2.0.1", "B77"]));
    backend.fail_writes_starting_with("VOL").await;
    let exec = TestExecutor::new("COM4", plan, backend.clone()).unwrap();

    exec.start().await;

    assert!(exec.is_finished());
    let failed: Vec<_> = exec
        .outcomes()
        .into_iter()
        .filter(|o| !o.outcome.is_success())
        .collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].command, "VOL");
    assert_eq!(failed[0].cursor, Cursor::new(1, 0));
    assert!(matches!(failed[0].outcome, Outcome::Failed(_)));

    let store = ResultStore::new(ctx.temp_dir.join("results"));
    let path = store.save(&exec.results()).unwrap();
    let saved: Vec<ResultRecord> = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(
        saved,
        vec![
            ResultRecord::new("VER", "2.0.1"),
            ResultRecord::new("SN", "B77"),
            ResultRecord::new("STATUS", "OK"),
        ]
    );
}

#[test]
fn test_cli_dry_run_json() {
    let ctx = TestContext::new("cli_dry_run_json");
    let plan = ctx.fixture("init_reset.yaml");
    let output = ctx.vindicator(&["run", plan.to_str().unwrap(), "--dry-run", "--json"]);

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let run: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(run["state"], "finished");
    assert_eq!(run["cursor"]["step_index"], 1);
    assert_eq!(run["cursor"]["command_index"], 0);
    assert_eq!(run["results"][0]["command"], "INIT");
    assert_eq!(run["results"][0]["result"], "OK");
    assert_eq!(run["outcomes"].as_array().unwrap().len(), 2);
}

#[test]
fn test_cli_dry_run_report() {
    let ctx = TestContext::new("cli_dry_run_report");
    let plan = ctx.fixture("board_check.json");
    let output = ctx.vindicator(&["run", plan.to_str().unwrap(), "--dry-run", "--save"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Board check"));
    assert!(stdout.contains("Step 2: Audio"));
    assert!(stdout.contains("VER -> OK"));
    assert!(stdout.contains("Test Finished"));
    assert!(stdout.contains("Results saved to memory:1"));
}

#[test]
fn test_cli_rejects_empty_step() {
    let ctx = TestContext::new("cli_empty_step");
    let plan = ctx.fixture("empty_step.yaml");
    let output = ctx.vindicator(&["run", plan.to_str().unwrap(), "--dry-run"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("has no commands"), "stderr: {}", stderr);
}

#[test]
fn test_cli_requires_port_without_dry_run() {
    let ctx = TestContext::new("cli_requires_port");
    let plan = ctx.fixture("init_reset.yaml");
    let output = ctx.vindicator(&["run", plan.to_str().unwrap()]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("No serial port given"), "stderr: {}", stderr);
}

#[test]
fn test_cli_info() {
    let ctx = TestContext::new("cli_info");
    let output = ctx.vindicator(&["info"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Vindicator Test System"));
    assert!(stdout.contains("https://v2.tauri.app"));
    assert!(stdout.contains("https://unocss.dev"));
}
