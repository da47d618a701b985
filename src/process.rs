// ABOUTME: External process execution for the slidev-mcp application
// ABOUTME: Runs npm/npx/node commands in an explicit working directory with a timeout

use crate::errors::{Result, SlidevError};
use log::{debug, warn};
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

/// A single external command invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
    pub timeout: Duration,
}

impl CommandSpec {
    pub fn new(program: &str, cwd: &Path, timeout: Duration) -> Self {
        Self {
            program: program.to_string(),
            args: Vec::new(),
            cwd: cwd.to_path_buf(),
            timeout,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.contains(' ') {
                write!(f, " \"{}\"", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// Captured output of a finished command
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }

    /// stderr and stdout joined, for error messages
    pub fn combined(&self) -> String {
        let mut text = self.stderr.trim().to_string();
        let stdout = self.stdout.trim();
        if !stdout.is_empty() {
            if !text.is_empty() {
                text.push('\n');
            }
            text.push_str(stdout);
        }
        text
    }

    /// Turn a non-zero exit into a `CommandFailed` error
    pub fn into_result(self, command: &CommandSpec) -> Result<CommandOutput> {
        if self.success() {
            return Ok(self);
        }
        Err(SlidevError::CommandFailed {
            command: command.to_string(),
            status: self
                .status
                .map(|s| s.to_string())
                .unwrap_or_else(|| "signal".to_string()),
            output: self.combined(),
        })
    }
}

/// Executes external commands. Swapped for a fake in tests.
pub trait CommandRunner: Send + Sync {
    fn run(&self, command: &CommandSpec) -> Result<CommandOutput>;
}

/// Runs commands as real child processes.
///
/// Each call drives the child on its own current-thread runtime, so this must
/// not be called from inside an async context.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, command: &CommandSpec) -> Result<CommandOutput> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        runtime.block_on(run_with_timeout(command))
    }
}

async fn run_with_timeout(command: &CommandSpec) -> Result<CommandOutput> {
    debug!("Running {} in {:?}", command, command.cwd);

    let mut std_cmd = std::process::Command::new(platform_program(&command.program));
    std_cmd
        .args(&command.args)
        .current_dir(&command.cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    // Own process group, so a timeout also reaches the renderer npx spawns
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        std_cmd.process_group(0);
    }

    let mut cmd = Command::from(std_cmd);
    cmd.kill_on_drop(true);

    let child = cmd.spawn().map_err(|e| match e.kind() {
        ErrorKind::NotFound => SlidevError::CommandNotFound(command.program.clone()),
        _ => SlidevError::Io(e),
    })?;
    let pid = child.id();

    // The deadline covers output collection too: a grandchild holding the
    // pipes open keeps wait_with_output pending after the child exits
    match timeout(command.timeout, child.wait_with_output()).await {
        Ok(output) => {
            let output = output?;
            Ok(CommandOutput {
                status: output.status.code(),
                stdout: String::from_utf8_lossy(&output.stdout).to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            })
        }
        Err(_) => {
            warn!("{} timed out after {:?}, killing it", command, command.timeout);
            kill_process_group(pid);
            Err(SlidevError::Timeout {
                command: command.to_string(),
                seconds: command.timeout.as_secs(),
            })
        }
    }
}

#[cfg(unix)]
fn kill_process_group(pid: Option<u32>) {
    use nix::sys::signal::{Signal, killpg};
    use nix::unistd::Pid;

    let Some(pid) = pid.and_then(|pid| i32::try_from(pid).ok()) else {
        return;
    };
    if let Err(e) = killpg(Pid::from_raw(pid), Signal::SIGKILL) {
        debug!("Process group {} already gone: {}", pid, e);
    }
}

// Elsewhere kill_on_drop takes down the direct child
#[cfg(not(unix))]
fn kill_process_group(_pid: Option<u32>) {}

/// npm and npx are batch shims on Windows
fn platform_program(program: &str) -> String {
    if cfg!(windows) && matches!(program, "npm" | "npx") {
        format!("{}.cmd", program)
    } else {
        program.to_string()
    }
}
