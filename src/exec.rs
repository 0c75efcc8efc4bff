use anyhow::{bail, Context, Result};
use std::collections::VecDeque;
use std::process::{Command, Stdio};
use std::sync::Mutex;

/// Executes external commands for collection-related queries.
pub trait Runner {
    /// Runs a command and returns trimmed stdout on success.
    /// Parameters: `program` (&str) executable name.
    /// Parameters: `args` (&[&str]) argument list.
    /// Returns: Result<String> with trimmed stdout or an error.
    // Abstract external command execution for testability.
    fn run_capture(&self, program: &str, args: &[&str]) -> Result<String>;
}

/// Runner implementation that invokes system binaries.
pub struct SystemRunner;

impl Runner for SystemRunner {
    fn run_capture(&self, program: &str, args: &[&str]) -> Result<String> {
        // Capture stdout and stderr to surface kubectl/helm errors clearly.
        let output = Command::new(program)
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .with_context(|| format!("failed to run {program}"))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("{program} failed: {stderr}");
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

#[derive(Debug, Default, Clone)]
/// One command executed through a runner.
pub struct CommandRecord {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandRecord {
    /// Returns true when any argument equals `needle`.
    pub fn has_arg(&self, needle: &str) -> bool {
        self.args.iter().any(|a| a == needle)
    }
}

#[derive(Debug, Default)]
/// Test runner that replays scripted responses and records every call.
pub struct FakeRunner {
    responses: Mutex<VecDeque<Result<String>>>,
    pub calls: Mutex<Vec<CommandRecord>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a successful response for the next unmatched call.
    pub fn push_ok(&self, stdout: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(stdout.to_string()));
    }

    /// Queues a failing response for the next unmatched call.
    pub fn push_err(&self, message: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(anyhow::anyhow!("{message}")));
    }

    /// Returns a copy of everything executed so far.
    pub fn recorded(&self) -> Vec<CommandRecord> {
        self.calls.lock().unwrap().clone()
    }
}

impl Runner for FakeRunner {
    fn run_capture(&self, program: &str, args: &[&str]) -> Result<String> {
        // Record calls so tests don't need kubectl or helm installed.
        self.calls.lock().unwrap().push(CommandRecord {
            program: program.to_string(),
            args: args.iter().map(|s| s.to_string()).collect(),
        });

        // Unscripted calls succeed with empty output.
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(String::new()))
    }
}
