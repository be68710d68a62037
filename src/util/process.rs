//! Subprocess execution utilities.
//!
//! Every external program the build touches (configure commands, Cython,
//! the C compiler, the Python interpreter) runs through [`ProcessBuilder`].
//! Calls block until the child exits. An optional timeout kills the child
//! and reports [`ProcessError::TimedOut`]; without one a hung child hangs
//! the build.

use std::ffi::OsStr;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Output, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;

/// How often a child is polled while a timeout is armed.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Error from running an external program.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("failed to spawn `{command}`")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to wait for `{command}`")]
    Wait {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("{}", failure_message(.command, .code, .stderr))]
    Failed {
        command: String,
        /// Exit code, `None` if the child was killed by a signal
        code: Option<i32>,
        /// Captured stderr; empty when stdio was inherited
        stderr: String,
    },

    #[error("`{command}` timed out after {}s", .timeout.as_secs_f64())]
    TimedOut { command: String, timeout: Duration },
}

impl ProcessError {
    /// Exit code of the failed child, if it exited normally.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            ProcessError::Failed { code, .. } => *code,
            _ => None,
        }
    }
}

fn failure_message(command: &str, code: &Option<i32>, stderr: &str) -> String {
    let status = match code {
        Some(code) => format!("exit code {}", code),
        None => "a signal".to_string(),
    };
    let stderr = stderr.trim_end();
    if stderr.is_empty() {
        format!("`{}` failed with {}", command, status)
    } else {
        format!("`{}` failed with {}\n{}", command, status, stderr)
    }
}

/// Builder for subprocess execution.
#[derive(Debug, Clone)]
pub struct ProcessBuilder {
    program: PathBuf,
    args: Vec<String>,
    cwd: Option<PathBuf>,
    timeout: Option<Duration>,
}

impl ProcessBuilder {
    /// Create a new process builder for the given program.
    pub fn new(program: impl AsRef<Path>) -> Self {
        ProcessBuilder {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            cwd: None,
            timeout: None,
        }
    }

    /// Add a single argument.
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_string_lossy().into_owned());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args.extend(
            args.into_iter()
                .map(|s| s.as_ref().to_string_lossy().into_owned()),
        );
        self
    }

    /// Set the working directory.
    pub fn cwd(mut self, cwd: impl AsRef<Path>) -> Self {
        self.cwd = Some(cwd.as_ref().to_path_buf());
        self
    }

    /// Kill the child if it runs longer than `timeout`. `None` waits forever.
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn build_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);

        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }

        cmd
    }

    fn spawn(&self, mut cmd: Command) -> Result<Child, ProcessError> {
        tracing::debug!("running `{}`", self.display_command());
        cmd.spawn().map_err(|source| ProcessError::Spawn {
            command: self.display_command(),
            source,
        })
    }

    /// Wait for `child`, honoring the timeout.
    fn wait(&self, child: &mut Child) -> Result<ExitStatus, ProcessError> {
        let wait_err = |source: io::Error| ProcessError::Wait {
            command: self.display_command(),
            source,
        };

        let Some(timeout) = self.timeout else {
            return child.wait().map_err(wait_err);
        };

        let start = Instant::now();
        loop {
            if let Some(status) = child.try_wait().map_err(wait_err)? {
                return Ok(status);
            }
            if start.elapsed() >= timeout {
                // The child may have exited between try_wait and kill
                let _ = child.kill();
                let _ = child.wait();
                return Err(ProcessError::TimedOut {
                    command: self.display_command(),
                    timeout,
                });
            }
            thread::sleep(POLL_INTERVAL);
        }
    }

    /// Execute the command with captured output and wait for completion.
    pub fn exec(&self) -> Result<Output, ProcessError> {
        let mut cmd = self.build_command();
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let mut child = self.spawn(cmd)?;

        // Drain pipes on helper threads so a chatty child cannot block on
        // a full pipe while we poll it.
        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        let status = self.wait(&mut child)?;

        Ok(Output {
            status,
            stdout: stdout.map(join_drain).unwrap_or_default(),
            stderr: stderr.map(join_drain).unwrap_or_default(),
        })
    }

    /// Execute with captured output and require success.
    pub fn exec_and_check(&self) -> Result<Output, ProcessError> {
        let output = self.exec()?;
        if !output.status.success() {
            return Err(ProcessError::Failed {
                command: self.display_command(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }
        Ok(output)
    }

    /// Execute with inherited stdio and return the exit status.
    pub fn status(&self) -> Result<ExitStatus, ProcessError> {
        let mut child = self.spawn(self.build_command())?;
        self.wait(&mut child)
    }

    /// Execute with inherited stdio and require success.
    ///
    /// The child's own output is the only diagnostic on failure.
    pub fn status_and_check(&self) -> Result<(), ProcessError> {
        let status = self.status()?;
        if !status.success() {
            return Err(ProcessError::Failed {
                command: self.display_command(),
                code: status.code(),
                stderr: String::new(),
            });
        }
        Ok(())
    }

    /// Display the command for error messages.
    pub fn display_command(&self) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

fn drain<R: Read + Send + 'static>(mut reader: R) -> thread::JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = reader.read_to_end(&mut buf);
        buf
    })
}

fn join_drain(handle: thread::JoinHandle<Vec<u8>>) -> Vec<u8> {
    handle.join().unwrap_or_default()
}

/// Find an executable in PATH.
pub fn find_executable(name: &str) -> Option<PathBuf> {
    which::which(name).ok()
}

/// Find a C compiler.
pub fn find_c_compiler() -> Option<PathBuf> {
    // Check CC environment variable first
    if let Ok(cc) = std::env::var("CC") {
        if let Some(path) = find_executable(&cc) {
            return Some(path);
        }
    }

    for compiler in &["cc", "gcc", "clang"] {
        if let Some(path) = find_executable(compiler) {
            return Some(path);
        }
    }

    None
}

/// Find a Python interpreter.
pub fn find_python() -> Option<PathBuf> {
    if let Ok(python) = std::env::var("PYTHON") {
        if let Some(path) = find_executable(&python) {
            return Some(path);
        }
    }

    for name in &["python3", "python"] {
        if let Some(path) = find_executable(name) {
            return Some(path);
        }
    }

    None
}
