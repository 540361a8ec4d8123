#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Runs the `bidwaves` binary against an isolated config root.
pub struct BidwavesTest {
    pub temp_dir: TempDir,
    binary_path: &'static str,
}

impl BidwavesTest {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        BidwavesTest {
            temp_dir,
            binary_path: env!("CARGO_BIN_EXE_bidwaves"),
        }
    }

    pub fn root(&self) -> PathBuf {
        self.temp_dir.path().join(".bidwaves")
    }

    pub fn run(&self, args: &[&str]) -> Output {
        Command::new(self.binary_path)
            .args(args)
            .current_dir(self.temp_dir.path())
            .env("BIDWAVES_ROOT", self.root())
            .env_remove("BIDWAVES_API_URL")
            .env_remove("BIDWAVES_TOKEN")
            .env_remove("RUST_LOG")
            .output()
            .expect("Failed to execute bidwaves command")
    }

    pub fn run_success(&self, args: &[&str]) -> String {
        let output = self.run(args);
        if !output.status.success() {
            panic!(
                "Command {:?} failed with status {:?}\nstdout: {}\nstderr: {}",
                args,
                output.status,
                String::from_utf8_lossy(&output.stdout),
                String::from_utf8_lossy(&output.stderr)
            );
        }
        String::from_utf8_lossy(&output.stdout).to_string()
    }

    pub fn run_failure(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(
            !output.status.success(),
            "Expected command {:?} to fail, but it succeeded",
            args
        );
        String::from_utf8_lossy(&output.stderr).to_string()
    }

    pub fn run_json(&self, args: &[&str]) -> serde_json::Value {
        let stdout = self.run_success(args);
        serde_json::from_str(&stdout).expect("Failed to parse JSON output")
    }

    pub fn write_config(&self, content: &str) {
        let dir = self.root();
        fs::create_dir_all(&dir).expect("Failed to create .bidwaves directory");
        fs::write(dir.join("config.yaml"), content).expect("Failed to write config file");
    }

    pub fn read_config(&self) -> String {
        fs::read_to_string(self.root().join("config.yaml")).expect("Failed to read config file")
    }
}
