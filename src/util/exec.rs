use std::collections::BTreeMap;
use std::ffi::OsString;
use std::io;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tracing::debug;
use wait_timeout::ChildExt;

use crate::errors::{Result, StartupError};

/// Structured command execution with an explicit environment and optional deadline.
#[derive(Debug, Clone, Default)]
pub struct ExecService {
    default_timeout: Option<Duration>,
}

impl ExecService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every request is bounded by `timeout`.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            default_timeout: Some(timeout),
        }
    }

    pub fn run(&self, request: ExecRequest) -> Result<ExecOutput> {
        let command_line = request.display();
        let mut cmd = Command::new(&request.program);
        cmd.args(&request.args);
        if let Some(ref cwd) = request.cwd {
            cmd.current_dir(cwd);
        }

        // The caller's map is the whole environment.
        cmd.env_clear();
        cmd.envs(&request.env);

        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        debug!(command = %command_line, cwd = ?request.cwd, "spawning");
        let mut child = cmd.spawn().map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                StartupError::RuntimeNotFound(format!(
                    "{} was not found",
                    request.program.to_string_lossy()
                ))
            } else {
                StartupError::io(format!("failed to spawn {command_line}"), e)
            }
        })?;

        // Drain pipes on threads so a chatty child cannot block on a full pipe.
        let stdout_reader = child.stdout.take().map(spawn_reader);
        let stderr_reader = child.stderr.take().map(spawn_reader);

        let started = Instant::now();
        let status = match self.default_timeout {
            None => child
                .wait()
                .map_err(|e| StartupError::io("failed to wait for process", e))?,
            Some(timeout) => match child
                .wait_timeout(timeout)
                .map_err(|e| StartupError::io("failed to wait with timeout", e))?
            {
                Some(status) => status,
                None => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(StartupError::Timeout {
                        command: command_line,
                        timeout,
                    });
                }
            },
        };

        let stdout = join_reader(stdout_reader)?;
        let stderr = join_reader(stderr_reader)?;
        debug!(command = %command_line, ?status, elapsed = ?started.elapsed(), "finished");

        Ok(ExecOutput {
            status,
            stdout,
            stderr,
        })
    }
}

fn spawn_reader<R: io::Read + Send + 'static>(mut stream: R) -> thread::JoinHandle<io::Result<String>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        stream.read_to_end(&mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    })
}

fn join_reader(handle: Option<thread::JoinHandle<io::Result<String>>>) -> Result<String> {
    match handle {
        None => Ok(String::new()),
        Some(h) => match h.join() {
            Ok(res) => res.map_err(|e| StartupError::io("failed to read process output", e)),
            Err(_) => Err(StartupError::io(
                "failed to read process output",
                io::Error::new(io::ErrorKind::Other, "reader thread panicked"),
            )),
        },
    }
}

#[derive(Debug, Default, Clone)]
pub struct ExecRequest {
    program: OsString,
    args: Vec<OsString>,
    cwd: Option<PathBuf>,
    env: BTreeMap<String, String>,
}

impl ExecRequest {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn cwd(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Replace the environment handed to the child.
    pub fn envs(mut self, env: &BTreeMap<String, String>) -> Self {
        self.env = env.clone();
        self
    }

    /// Program and args joined for logs and error messages.
    pub fn display(&self) -> String {
        let mut words = vec![self.program.to_string_lossy().into_owned()];
        words.extend(self.args.iter().map(|a| a.to_string_lossy().into_owned()));
        crate::shell_join(&words)
    }
}

#[derive(Debug)]
pub struct ExecOutput {
    pub status: std::process::ExitStatus,
    pub stdout: String,
    pub stderr: String,
}
