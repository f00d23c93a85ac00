// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! CLI Integration Tests
//!
//! Covers the commands that work without network access.

use std::fs;
use std::process::{Command, Output};
use tempfile::TempDir;

const DEVICE: &str = "device-123";
const REWARD_SIGNATURE: &str = "65ba42032fed6827c6a34122bd0d823536e9aeec";

/// Runs CLI commands in an isolated data directory
struct CliTestContext {
    data_dir: TempDir,
}

impl CliTestContext {
    fn new() -> Self {
        let data_dir = TempDir::new().expect("Failed to create temp dir");
        fs::write(data_dir.path().join("device_id"), DEVICE).unwrap();
        Self { data_dir }
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_placard"));
        cmd.env_remove("PLACARD_TOKEN")
            .env_remove("PLACARD_SECRET")
            .env_remove("PLACARD_API_URL")
            .arg("--data-dir")
            .arg(self.data_dir.path());
        cmd
    }

    /// Run with credentials
    fn run(&self, args: &[&str]) -> Output {
        self.command()
            .args(["--token", "tok", "--secret", "s3cr3t"])
            .args(args)
            .output()
            .expect("Failed to execute command")
    }

    fn run_success(&self, args: &[&str]) -> String {
        let output = self.run(args);
        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        assert!(
            output.status.success(),
            "Command {:?} failed.\nStdout: {}\nStderr: {}",
            args,
            stdout,
            stderr
        );
        stdout
    }

    fn run_failure(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(
            !output.status.success(),
            "Command {:?} should have failed but succeeded",
            args
        );
        String::from_utf8_lossy(&output.stderr).to_string()
    }
}

mod signing {
    use super::*;

    #[test]
    fn test_sign_prints_signed_url() {
        let ctx = CliTestContext::new();
        let output = ctx.run_success(&["sign", "/v3/publisher/content/", "placement_id=menu"]);

        assert!(output.starts_with("https://api.placard.app/v3/publisher/content/?"));
        assert!(output.contains("placement_id=menu"));
        assert!(output.contains("token=tok"));
        assert!(output.contains(&format!("device={DEVICE}")));
        assert!(output.contains("signature="));
        assert!(output.contains("nonce="));
    }

    #[test]
    fn test_sign_json_output() {
        let ctx = CliTestContext::new();
        let output = ctx.run_success(&["sign", "/v3/publisher/open/", "--json"]);

        let params: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(params["token"], "tok");
        assert_eq!(params["device"], DEVICE);
        assert_eq!(params["signature"].as_str().unwrap().len(), 40);
    }

    #[test]
    fn test_sign_rejects_malformed_param() {
        let ctx = CliTestContext::new();
        let stderr = ctx.run_failure(&["sign", "/v3/publisher/open/", "broken"]);
        assert!(stderr.contains("key=value"));
    }

    #[test]
    fn test_missing_credentials_fail() {
        let ctx = CliTestContext::new();
        let output = ctx
            .command()
            .args(["sign", "/v3/publisher/open/"])
            .output()
            .unwrap();

        assert!(!output.status.success());
        assert!(String::from_utf8_lossy(&output.stderr).contains("credentials missing"));
    }
}

mod verification {
    use super::*;

    #[test]
    fn test_valid_reward_signature() {
        let ctx = CliTestContext::new();
        let output = ctx.run_success(&[
            "verify",
            "reward",
            "coins",
            "10",
            "receipt-abc",
            REWARD_SIGNATURE,
        ]);
        assert!(output.contains("Reward signature is valid"));
    }

    #[test]
    fn test_tampered_reward_signature() {
        let ctx = CliTestContext::new();
        let stderr = ctx.run_failure(&[
            "verify",
            "reward",
            "coins",
            "100",
            "receipt-abc",
            REWARD_SIGNATURE,
        ]);
        assert!(stderr.contains("does not match"));
    }
}

mod session {
    use super::*;

    #[test]
    fn test_fresh_session_totals_are_zero() {
        let ctx = CliTestContext::new();
        let output = ctx.run_success(&["session", "show"]);

        assert!(output.contains("total time:"));
        assert!(output.contains("0s"));
        assert!(output.contains("sessions:"));
    }

    #[test]
    fn test_reset_clears_totals() {
        let ctx = CliTestContext::new();
        let output = ctx.run_success(&["session", "reset"]);
        assert!(output.contains("Session totals cleared"));
    }
}
