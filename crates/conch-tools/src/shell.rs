use std::convert::Infallible;
use std::fmt;
use std::process::Stdio;

use tokio::process::Command;

use crate::config::ShellConfig;

const REPORT_HEADER: &str = "Output of your previous commands:";

/// How a single command finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome {
    Success,
    /// Non-zero exit; `code` is `None` when the process was killed by a signal.
    Failed { code: Option<i32> },
    SpawnError(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub command: String,
    pub outcome: ExecutionOutcome,
}

impl ExecutionResult {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.outcome == ExecutionOutcome::Success
    }
}

impl fmt::Display for ExecutionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cmd = &self.command;
        match &self.outcome {
            ExecutionOutcome::Success => write!(f, "Command \"{cmd}\" executed successfully."),
            ExecutionOutcome::Failed { code: Some(code) } => {
                write!(f, "Command \"{cmd}\" exited with code {code}")
            }
            ExecutionOutcome::Failed { code: None } => {
                write!(f, "Command \"{cmd}\" was terminated by a signal")
            }
            ExecutionOutcome::SpawnError(message) => {
                write!(f, "Error executing command \"{cmd}\": {message}")
            }
        }
    }
}

/// Hooks invoked around each command by [`ShellRunner::run_observed`].
pub trait ExecutionObserver: Send {
    type Error;

    fn before(&mut self, command: &str) -> impl Future<Output = Result<(), Self::Error>> + Send;

    fn after(
        &mut self,
        result: &ExecutionResult,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

impl ExecutionObserver for () {
    type Error = Infallible;

    async fn before(&mut self, _command: &str) -> Result<(), Infallible> {
        Ok(())
    }

    async fn after(&mut self, _result: &ExecutionResult) -> Result<(), Infallible> {
        Ok(())
    }
}

/// Runs approved commands one at a time through the configured shell.
///
/// Each child inherits the terminal's stdin, stdout and stderr, and is awaited
/// to exit before the next one starts so output never interleaves.
#[derive(Debug, Clone)]
pub struct ShellRunner {
    program: String,
    args: Vec<String>,
}

impl ShellRunner {
    #[must_use]
    pub fn new(config: &ShellConfig) -> Self {
        Self {
            program: config.program.clone(),
            args: config.args.clone(),
        }
    }

    /// Run every command in order, continuing past failures.
    pub async fn run(&self, commands: &[String]) -> Vec<ExecutionResult> {
        let Ok(results) = self.run_observed(commands, &mut ()).await;
        results
    }

    /// Like [`ShellRunner::run`], calling `observer` around each command.
    ///
    /// # Errors
    ///
    /// Stops at the first observer error; commands after it are not started.
    pub async fn run_observed<O: ExecutionObserver>(
        &self,
        commands: &[String],
        observer: &mut O,
    ) -> Result<Vec<ExecutionResult>, O::Error> {
        let mut results = Vec::with_capacity(commands.len());
        for command in commands {
            observer.before(command).await?;
            let result = self.run_one(command).await;
            observer.after(&result).await?;
            results.push(result);
        }
        Ok(results)
    }

    pub async fn run_one(&self, command: &str) -> ExecutionResult {
        tracing::info!(command, "executing command");
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(command)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await;

        let outcome = match status {
            Ok(status) if status.success() => ExecutionOutcome::Success,
            Ok(status) => ExecutionOutcome::Failed {
                code: status.code(),
            },
            Err(e) => {
                tracing::warn!(command, "failed to spawn command: {e}");
                ExecutionOutcome::SpawnError(e.to_string())
            }
        };
        tracing::debug!(command, ?outcome, "command finished");

        ExecutionResult {
            command: command.to_owned(),
            outcome,
        }
    }
}

/// Consolidated report fed back to the model after an execution round.
#[must_use]
pub fn format_report(results: &[ExecutionResult]) -> String {
    let mut out = String::from(REPORT_HEADER);
    if results.is_empty() {
        out.push_str("\nNo commands were executed.");
    }
    for result in results {
        out.push('\n');
        out.push_str(&result.to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(command: &str, outcome: ExecutionOutcome) -> ExecutionResult {
        ExecutionResult {
            command: command.to_owned(),
            outcome,
        }
    }

    #[test]
    fn display_lines() {
        assert_eq!(
            result("ls", ExecutionOutcome::Success).to_string(),
            "Command \"ls\" executed successfully."
        );
        assert_eq!(
            result("false", ExecutionOutcome::Failed { code: Some(1) }).to_string(),
            "Command \"false\" exited with code 1"
        );
        assert_eq!(
            result("sleep 9", ExecutionOutcome::Failed { code: None }).to_string(),
            "Command \"sleep 9\" was terminated by a signal"
        );
        assert_eq!(
            result("x", ExecutionOutcome::SpawnError("No such file".into())).to_string(),
            "Error executing command \"x\": No such file"
        );
    }

    #[test]
    fn report_keeps_invocation_order() {
        let report = format_report(&[
            result("a", ExecutionOutcome::Success),
            result("b", ExecutionOutcome::Failed { code: Some(2) }),
        ]);
        assert_eq!(
            report,
            "Output of your previous commands:\n\
             Command \"a\" executed successfully.\n\
             Command \"b\" exited with code 2"
        );
    }

    #[test]
    fn empty_report_says_nothing_ran() {
        assert_eq!(
            format_report(&[]),
            "Output of your previous commands:\nNo commands were executed."
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn mixed_outcomes_run_in_order() {
        let runner = ShellRunner::new(&ShellConfig::default());
        let ok = runner.run_one("true").await;
        assert!(ok.is_success());

        let bad_shell = ShellRunner::new(&ShellConfig {
            program: "/nonexistent/shell-xyz".into(),
            args: vec!["-c".into()],
        });

        let mut results = runner.run(&["true".into(), "exit 2".into()]).await;
        results.push(bad_shell.run_one("echo unreachable").await);

        assert_eq!(results[0].outcome, ExecutionOutcome::Success);
        assert_eq!(results[1].outcome, ExecutionOutcome::Failed { code: Some(2) });
        assert!(matches!(results[2].outcome, ExecutionOutcome::SpawnError(_)));

        let report = format_report(&results);
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[1].contains("\"true\" executed successfully"));
        assert!(lines[2].contains("2"));
        let spawn_err = std::process::Command::new("/nonexistent/shell-xyz")
            .status()
            .unwrap_err();
        assert_eq!(
            lines[3],
            format!("Error executing command \"echo unreachable\": {spawn_err}")
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failure_does_not_abort_remaining_commands() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("ran");
        let runner = ShellRunner::new(&ShellConfig::default());
        let results = runner
            .run(&["exit 7".into(), format!("touch {}", marker.display())])
            .await;
        assert_eq!(results[0].outcome, ExecutionOutcome::Failed { code: Some(7) });
        assert!(results[1].is_success());
        assert!(marker.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn commands_run_sequentially() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("log");
        let runner = ShellRunner::new(&ShellConfig::default());
        let log = log.display();
        runner
            .run(&[
                format!("sleep 0.2; echo first >> {log}"),
                format!("echo second >> {log}"),
            ])
            .await;
        let content = std::fs::read_to_string(dir.path().join("log")).unwrap();
        assert_eq!(content, "first\nsecond\n");
    }

    #[derive(Default)]
    struct Recorder {
        seen: Vec<String>,
        fail_after: Option<usize>,
    }

    impl ExecutionObserver for Recorder {
        type Error = String;

        async fn before(&mut self, command: &str) -> Result<(), String> {
            self.seen.push(format!("before {command}"));
            Ok(())
        }

        async fn after(&mut self, result: &ExecutionResult) -> Result<(), String> {
            self.seen.push(format!("after {}", result.command));
            if self.fail_after == Some(self.seen.len() / 2) {
                return Err("observer gone".into());
            }
            Ok(())
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn observer_brackets_each_command() {
        let runner = ShellRunner::new(&ShellConfig::default());
        let mut recorder = Recorder::default();
        let results = runner
            .run_observed(&["true".into(), "exit 4".into()], &mut recorder)
            .await
            .unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(
            recorder.seen,
            vec!["before true", "after true", "before exit 4", "after exit 4"]
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn observer_error_stops_remaining_commands() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("late");
        let runner = ShellRunner::new(&ShellConfig::default());
        let mut recorder = Recorder {
            fail_after: Some(1),
            ..Recorder::default()
        };
        let err = runner
            .run_observed(
                &["true".into(), format!("touch {}", marker.display())],
                &mut recorder,
            )
            .await
            .unwrap_err();
        assert_eq!(err, "observer gone");
        assert!(!marker.exists());
        assert_eq!(recorder.seen, vec!["before true", "after true"]);
    }
}
