// agent-core/src/infrastructure/process.rs

use crate::infrastructure::error::InfrastructureError;
use std::collections::HashMap;
use std::path::Path;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

/// The outcome of launching and awaiting a child process: everything the
/// module layer needs to build an `ActionOutcome`, before outcome parsing
/// has had a chance to interpret it.
#[derive(Debug)]
pub struct ProcessOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

/// Launches processes, captures stdout/stderr/exit, and optionally reports
/// the child's pid back to the caller before the child has finished running.
pub struct ChildProcessRunner;

impl ChildProcessRunner {
    /// Spawn `program` with `args`, feeding `stdin` and waiting for exit.
    ///
    /// `on_spawn` is invoked with the child's pid as soon as it is known,
    /// before stdout/stderr are drained — this is the hook
    /// `ExternalModule`'s non-blocking path uses to write the `pid` file.
    ///
    /// `envs`: `None` inherits the agent's own environment unchanged (the
    /// metadata probe path); `Some(vars)` clears the inherited environment
    /// first and rebuilds it from exactly `vars` (the action-call path), so
    /// a module action never sees more than what was explicitly handed to
    /// it.
    pub async fn run(
        program: &Path,
        args: &[&str],
        stdin: &[u8],
        envs: Option<&HashMap<String, String>>,
        on_spawn: Option<impl FnOnce(u32)>,
    ) -> Result<ProcessOutput, InfrastructureError> {
        let mut command = Self::build_command(program, args, envs);
        command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = command
            .spawn()
            .map_err(|e| InfrastructureError::SpawnError(e.to_string()))?;

        if let Some(pid) = child.id() {
            if let Some(cb) = on_spawn {
                cb(pid);
            }
        }

        if let Some(mut child_stdin) = child.stdin.take() {
            // A child that never reads stdin (e.g. exits immediately) makes
            // this a non-fatal best-effort write.
            let _ = child_stdin.write_all(stdin).await;
            drop(child_stdin);
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| InfrastructureError::SpawnError(e.to_string()))?;

        let exit_code = output.status.code().unwrap_or(-1);
        debug!(exit_code, "child process exited");

        Ok(ProcessOutput {
            exit_code,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    /// On Windows the launch is indirected through the command interpreter;
    /// everywhere else the executable is invoked directly.
    #[cfg(target_os = "windows")]
    fn build_command(program: &Path, args: &[&str], envs: Option<&HashMap<String, String>>) -> Command {
        let mut command = Command::new("cmd.exe");
        command.arg("/c").arg(program);
        command.args(args);
        Self::apply_envs(&mut command, envs);
        command
    }

    #[cfg(not(target_os = "windows"))]
    fn build_command(program: &Path, args: &[&str], envs: Option<&HashMap<String, String>>) -> Command {
        let mut command = Command::new(program);
        command.args(args);
        Self::apply_envs(&mut command, envs);
        command
    }

    fn apply_envs(command: &mut Command, envs: Option<&HashMap<String, String>>) {
        if let Some(vars) = envs {
            command.env_clear();
            command.envs(vars);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
#[allow(unsafe_code)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn captures_stdout_and_exit_code() {
        let output = ChildProcessRunner::run(
            Path::new("/bin/sh"),
            &["-c", "cat; exit 3"],
            b"hello",
            None,
            None::<fn(u32)>,
        )
        .await
        .unwrap();

        assert_eq!(output.exit_code, 3);
        assert_eq!(output.stdout, "hello");
    }

    #[tokio::test]
    async fn invokes_spawn_callback_with_pid() {
        let pid_seen = std::sync::Arc::new(std::sync::Mutex::new(0u32));
        let pid_seen_clone = pid_seen.clone();

        let output = ChildProcessRunner::run(
            Path::new("/bin/sh"),
            &["-c", "exit 0"],
            b"",
            None,
            Some(move |pid: u32| {
                *pid_seen_clone.lock().unwrap() = pid;
            }),
        )
        .await
        .unwrap();

        assert_eq!(output.exit_code, 0);
        assert!(*pid_seen.lock().unwrap() > 0);
    }

    #[tokio::test]
    async fn launch_failure_returns_spawn_error() {
        let result = ChildProcessRunner::run(
            Path::new("/no/such/executable-xyz"),
            &[],
            b"",
            None,
            None::<fn(u32)>,
        )
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn probe_path_inherits_the_agent_s_environment() {
        unsafe {
            std::env::set_var("NODE_AGENT_TEST_PROBE_VAR", "probe-visible");
        }
        let output = ChildProcessRunner::run(
            Path::new("/bin/sh"),
            &["-c", "printf %s \"$NODE_AGENT_TEST_PROBE_VAR\""],
            b"",
            None,
            None::<fn(u32)>,
        )
        .await
        .unwrap();
        unsafe {
            std::env::remove_var("NODE_AGENT_TEST_PROBE_VAR");
        }

        assert_eq!(output.stdout, "probe-visible");
    }

    #[tokio::test]
    async fn call_path_only_sees_the_explicitly_given_environment() {
        unsafe {
            std::env::set_var("NODE_AGENT_TEST_LEAK_VAR", "should-not-leak");
        }
        let mut envs = HashMap::new();
        envs.insert("ONLY_THIS_VAR".to_string(), "present".to_string());

        let output = ChildProcessRunner::run(
            Path::new("/bin/sh"),
            &["-c", "printf '%s|%s' \"$ONLY_THIS_VAR\" \"$NODE_AGENT_TEST_LEAK_VAR\""],
            b"",
            Some(&envs),
            None::<fn(u32)>,
        )
        .await
        .unwrap();
        unsafe {
            std::env::remove_var("NODE_AGENT_TEST_LEAK_VAR");
        }

        assert_eq!(output.stdout, "present|");
    }
}
