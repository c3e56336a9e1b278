//! Shared scripted command runner for integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use eks_bootstrap::error::Result;
use eks_bootstrap::runner::{CommandRunner, ExecResult};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Mutex;

/// One recorded invocation
#[derive(Debug, Clone)]
pub struct Call {
    pub line: String,
    pub stdin: Option<String>,
}

struct Rule {
    pattern: String,
    remaining: Option<u32>,
    exit_code: i32,
    stdout: String,
    stderr: String,
}

/// Scripted runner: records every invocation and answers from substring
/// rules. Unmatched invocations succeed with empty output.
pub struct MockRunner {
    calls: Mutex<Vec<Call>>,
    tools: HashSet<String>,
    rules: Mutex<Vec<Rule>>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            tools: HashSet::new(),
            rules: Mutex::new(Vec::new()),
        }
    }

    /// Tools reported as present on PATH.
    pub fn with_tools(mut self, tools: &[&str]) -> Self {
        self.tools = tools.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Respond to every invocation whose command line contains `pattern`.
    pub fn with_rule(self, pattern: &str, exit_code: i32, stdout: &str, stderr: &str) -> Self {
        self.push_rule(pattern, None, exit_code, stdout, stderr);
        self
    }

    /// Like `with_rule`, but only for the first `times` matches.
    pub fn with_rule_times(
        self,
        pattern: &str,
        times: u32,
        exit_code: i32,
        stdout: &str,
        stderr: &str,
    ) -> Self {
        self.push_rule(pattern, Some(times), exit_code, stdout, stderr);
        self
    }

    fn push_rule(
        &self,
        pattern: &str,
        remaining: Option<u32>,
        exit_code: i32,
        stdout: &str,
        stderr: &str,
    ) {
        self.rules.lock().unwrap().push(Rule {
            pattern: pattern.to_string(),
            remaining,
            exit_code,
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
        });
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_matching(&self, pattern: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.line.contains(pattern))
            .count()
    }

    fn respond(&self, line: String, stdin: Option<String>) -> ExecResult {
        self.calls.lock().unwrap().push(Call {
            line: line.clone(),
            stdin,
        });

        let mut rules = self.rules.lock().unwrap();
        for rule in rules.iter_mut() {
            if !line.contains(&rule.pattern) {
                continue;
            }
            match rule.remaining {
                Some(0) => continue,
                Some(ref mut n) => *n -= 1,
                None => {}
            }
            return ExecResult {
                exit_code: rule.exit_code,
                stdout: rule.stdout.clone(),
                stderr: rule.stderr.clone(),
            };
        }

        ExecResult {
            exit_code: 0,
            stdout: String::new(),
            stderr: String::new(),
        }
    }
}

#[async_trait]
impl CommandRunner for MockRunner {
    async fn run(&self, program: &str, args: &[String]) -> Result<ExecResult> {
        let line = format!("{} {}", program, args.join(" "));
        Ok(self.respond(line, None))
    }

    async fn run_with_stdin(
        &self,
        program: &str,
        args: &[String],
        stdin: &str,
    ) -> Result<ExecResult> {
        let line = format!("{} {}", program, args.join(" "));
        Ok(self.respond(line, Some(stdin.to_string())))
    }

    async fn run_shell(&self, script: &str) -> Result<ExecResult> {
        Ok(self.respond(format!("sh -c {}", script), None))
    }

    fn lookup(&self, tool: &str) -> Option<PathBuf> {
        if self.tools.contains(tool) {
            Some(PathBuf::from(format!("/usr/bin/{}", tool)))
        } else {
            None
        }
    }
}

/// Every tool the installer probes for, for "nothing to do" scenarios.
pub const ALL_TOOLS: &[&str] = &["tar", "jq", "aws", "kubectl", "eksctl", "docker"];
