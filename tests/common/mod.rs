//! Shared test infrastructure for integration tests.

use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

/// A dataset export in a temp dir plus helpers to run the binary on it.
pub struct DatasetFixture {
    _dir: TempDir,
    pub path: PathBuf,
}

/// Exit status and decoded streams from one binary run.
#[derive(Debug)]
pub struct RunResult {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl RunResult {
    fn from_output(output: Output) -> Self {
        Self {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

impl DatasetFixture {
    /// Write `documents` as NDJSON into a fresh temp dir.
    pub fn new(documents: &[Value]) -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let path = dir.path().join("production.ndjson");
        let body: String = documents.iter().map(|doc| format!("{doc}\n")).collect();
        fs::write(&path, body).expect("write dataset export");
        Self { _dir: dir, path }
    }

    /// Run `scpb-migrate <args> --dataset-file <export>`.
    pub fn run(&self, args: &[&str]) -> RunResult {
        let output = Command::new(binary())
            .args(args)
            .arg("--dataset-file")
            .arg(&self.path)
            .env_remove("RUST_LOG")
            .output()
            .expect("spawn scpb-migrate");
        RunResult::from_output(output)
    }

    /// Documents currently on disk, keyed by `_id`.
    pub fn document(&self, id: &str) -> Option<Value> {
        fs::read_to_string(&self.path)
            .expect("read dataset export")
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str::<Value>(line).expect("valid NDJSON line"))
            .find(|doc| doc["_id"] == id)
    }

    pub fn contents(&self) -> String {
        fs::read_to_string(&self.path).expect("read dataset export")
    }
}

pub fn binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_scpb-migrate"))
}

/// Run the binary without a dataset file.
pub fn run_plain(args: &[&str]) -> RunResult {
    let output = Command::new(binary())
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("spawn scpb-migrate");
    RunResult::from_output(output)
}
