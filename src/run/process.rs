//! Spawning the media tool.
//!
//! Pipes that are not requested are inherited from the parent. Piped output is drained on
//! worker threads so a chatty child never blocks on a full pipe while we wait for it.

use std::io::{Read, Write};
use std::path::Path;
use std::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command, ExitStatus, Stdio};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use anyhow::Context as _;

use crate::compile::compiler::{CompileOpts, compile};
use crate::foundation::error::{FfgraphError, FfgraphResult};
use crate::graph::stream::OutputStream;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Options for [`run`] and [`run_async`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunOpts {
    /// Program (and leading arguments), default `ffmpeg`.
    pub cmd: Vec<String>,
    pub pipe_stdin: bool,
    /// Pipe stdout; for [`run`] this means "capture".
    pub pipe_stdout: bool,
    /// Pipe stderr; for [`run`] this means "capture".
    pub pipe_stderr: bool,
    /// Pipe (and so silence) both stdout and stderr.
    pub quiet: bool,
    pub overwrite_output: Option<bool>,
    /// Upper bound for waiting on the process; it is killed when exceeded.
    pub timeout: Option<Duration>,
}

impl Default for RunOpts {
    fn default() -> Self {
        Self {
            cmd: vec!["ffmpeg".to_string()],
            pipe_stdin: false,
            pipe_stdout: false,
            pipe_stderr: false,
            quiet: false,
            overwrite_output: None,
            timeout: None,
        }
    }
}

impl RunOpts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cmd<I, S>(mut self, cmd: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cmd = cmd.into_iter().map(Into::into).collect();
        self
    }

    pub fn pipe_stdin(mut self, v: bool) -> Self {
        self.pipe_stdin = v;
        self
    }

    pub fn pipe_stdout(mut self, v: bool) -> Self {
        self.pipe_stdout = v;
        self
    }

    pub fn pipe_stderr(mut self, v: bool) -> Self {
        self.pipe_stderr = v;
        self
    }

    pub fn quiet(mut self, v: bool) -> Self {
        self.quiet = v;
        self
    }

    pub fn overwrite_output(mut self, v: Option<bool>) -> Self {
        self.overwrite_output = v;
        self
    }

    pub fn timeout(mut self, v: Option<Duration>) -> Self {
        self.timeout = v;
        self
    }

    fn stdio(&self) -> Pipes {
        Pipes {
            stdin: self.pipe_stdin,
            stdout: self.pipe_stdout || self.quiet,
            stderr: self.pipe_stderr || self.quiet,
        }
    }
}

/// Which standard streams of the child are piped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Pipes {
    pub stdin: bool,
    pub stdout: bool,
    pub stderr: bool,
}

/// Captured result of a finished process.
#[derive(Clone, Debug)]
pub struct ProcessOutput {
    pub status: ExitStatus,
    /// Empty unless stdout was piped.
    pub stdout: Vec<u8>,
    /// Empty unless stderr was piped.
    pub stderr: Vec<u8>,
}

impl ProcessOutput {
    /// `Ok(self)` on success, [`FfgraphError::Process`] otherwise.
    pub fn check(self, tool: &str) -> FfgraphResult<Self> {
        if self.status.success() {
            return Ok(self);
        }
        tracing::warn!(tool, status = %self.status, "process exited unsuccessfully");
        Err(FfgraphError::Process {
            tool: tool.to_string(),
            code: self.status.code(),
            stdout: self.stdout,
            stderr: self.stderr,
        })
    }
}

/// Handle to a spawned child.
#[derive(Debug)]
pub struct RunningProcess {
    tool: String,
    child: Child,
    timeout: Option<Duration>,
}

impl RunningProcess {
    /// Start `cmdline[0]` with the remaining arguments.
    #[tracing::instrument(skip(cmdline), fields(program = cmdline.first().map(String::as_str)))]
    pub(crate) fn spawn(
        cmdline: &[String],
        pipes: Pipes,
        timeout: Option<Duration>,
    ) -> FfgraphResult<Self> {
        let (program, args) = cmdline
            .split_first()
            .ok_or_else(|| FfgraphError::validation("command must not be empty"))?;
        tracing::debug!(?cmdline, "spawning");

        let stdio = |piped: bool| {
            if piped {
                Stdio::piped()
            } else {
                Stdio::inherit()
            }
        };
        let child = Command::new(program)
            .args(args)
            .stdin(stdio(pipes.stdin))
            .stdout(stdio(pipes.stdout))
            .stderr(stdio(pipes.stderr))
            .spawn()
            .with_context(|| format!("failed to spawn {program} (is it installed and on PATH?)"))?;

        Ok(Self {
            tool: tool_name(program),
            child,
            timeout,
        })
    }

    /// Short name of the executable, used in errors.
    pub fn tool(&self) -> &str {
        &self.tool
    }

    pub fn id(&self) -> u32 {
        self.child.id()
    }

    /// Piped stdin, if any. Dropping it signals end of input.
    pub fn stdin(&mut self) -> Option<&mut ChildStdin> {
        self.child.stdin.as_mut()
    }

    pub fn take_stdin(&mut self) -> Option<ChildStdin> {
        self.child.stdin.take()
    }

    pub fn take_stdout(&mut self) -> Option<ChildStdout> {
        self.child.stdout.take()
    }

    pub fn take_stderr(&mut self) -> Option<ChildStderr> {
        self.child.stderr.take()
    }

    /// `Some(status)` if the process has exited.
    pub fn try_wait(&mut self) -> FfgraphResult<Option<ExitStatus>> {
        Ok(self
            .child
            .try_wait()
            .with_context(|| format!("failed to poll {}", self.tool))?)
    }

    pub fn kill(&mut self) -> FfgraphResult<()> {
        self.child
            .kill()
            .with_context(|| format!("failed to kill {}", self.tool))?;
        Ok(())
    }

    /// Close stdin and wait for exit, honouring the configured timeout.
    pub fn wait(&mut self) -> FfgraphResult<ExitStatus> {
        drop(self.child.stdin.take());
        self.wait_for_exit()
    }

    /// Feed `input` to stdin, close it, collect piped stdout/stderr and wait for exit.
    pub fn communicate(mut self, input: Option<&[u8]>) -> FfgraphResult<ProcessOutput> {
        let stdin = self.child.stdin.take();
        let writer = match (input, stdin) {
            (Some(bytes), Some(mut stdin)) => {
                let bytes = bytes.to_vec();
                Some(std::thread::spawn(move || -> std::io::Result<()> {
                    match stdin.write_all(&bytes) {
                        Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => Ok(()),
                        other => other,
                    }
                }))
            }
            (Some(_), None) => {
                return Err(FfgraphError::validation(format!(
                    "{}: input given but stdin is not piped",
                    self.tool
                )));
            }
            (None, stdin) => {
                drop(stdin);
                None
            }
        };
        let stdout = self.child.stdout.take().map(drain);
        let stderr = self.child.stderr.take().map(drain);

        let status = self.wait_for_exit();

        if let Some(handle) = writer {
            join(handle, &self.tool, "stdin")?
                .with_context(|| format!("failed to write {} stdin", self.tool))?;
        }
        let stdout = collect(stdout, &self.tool, "stdout")?;
        let stderr = collect(stderr, &self.tool, "stderr")?;

        Ok(ProcessOutput {
            status: status?,
            stdout,
            stderr,
        })
    }

    fn wait_for_exit(&mut self) -> FfgraphResult<ExitStatus> {
        let Some(timeout) = self.timeout else {
            return Ok(self
                .child
                .wait()
                .with_context(|| format!("failed to wait for {}", self.tool))?);
        };
        let started = Instant::now();
        loop {
            if let Some(status) = self.try_wait()? {
                return Ok(status);
            }
            if started.elapsed() >= timeout {
                tracing::warn!(tool = %self.tool, ?timeout, "timed out; killing");
                // The child may exit between the poll and the kill.
                let _ = self.child.kill();
                let _ = self.child.wait();
                return Err(FfgraphError::Timeout {
                    tool: self.tool.clone(),
                    after: timeout,
                });
            }
            std::thread::sleep(POLL_INTERVAL);
        }
    }
}

type Drain = JoinHandle<std::io::Result<Vec<u8>>>;

fn drain<R: Read + Send + 'static>(mut pipe: R) -> Drain {
    std::thread::spawn(move || {
        let mut bytes = Vec::new();
        pipe.read_to_end(&mut bytes)?;
        Ok(bytes)
    })
}

fn join<T>(handle: JoinHandle<T>, tool: &str, what: &str) -> FfgraphResult<T> {
    handle
        .join()
        .map_err(|_| anyhow::anyhow!("{tool} {what} thread panicked").into())
}

fn collect(handle: Option<Drain>, tool: &str, what: &str) -> FfgraphResult<Vec<u8>> {
    match handle {
        Some(h) => Ok(join(h, tool, what)?.with_context(|| format!("failed to read {tool} {what}"))?),
        None => Ok(Vec::new()),
    }
}

fn tool_name(program: &str) -> String {
    Path::new(program)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| program.to_string())
}

/// Compile `streams` and start the tool without waiting for it.
pub fn run_async(streams: &[OutputStream], opts: &RunOpts) -> FfgraphResult<RunningProcess> {
    let cmdline = compile(
        streams,
        &CompileOpts {
            cmd: opts.cmd.clone(),
            overwrite_output: opts.overwrite_output,
        },
    )?;
    RunningProcess::spawn(&cmdline, opts.stdio(), opts.timeout)
}

/// Compile `streams`, run the tool to completion and return `(stdout, stderr)`.
///
/// stdin is piped whenever `input` is given. Non-zero exit becomes [`FfgraphError::Process`]
/// carrying whatever was captured.
pub fn run(
    streams: &[OutputStream],
    opts: &RunOpts,
    input: Option<&[u8]>,
) -> FfgraphResult<(Vec<u8>, Vec<u8>)> {
    let opts = opts.clone().pipe_stdin(opts.pipe_stdin || input.is_some());
    let process = run_async(streams, &opts)?;
    let tool = process.tool().to_string();
    let out = process.communicate(input)?.check(&tool)?;
    Ok((out.stdout, out.stderr))
}

impl OutputStream {
    pub fn run(&self, opts: &RunOpts, input: Option<&[u8]>) -> FfgraphResult<(Vec<u8>, Vec<u8>)> {
        run(std::slice::from_ref(self), opts, input)
    }

    pub fn run_async(&self, opts: &RunOpts) -> FfgraphResult<RunningProcess> {
        run_async(std::slice::from_ref(self), opts)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/run/process.rs"]
mod tests;
