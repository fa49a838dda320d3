//! Blocking subprocess execution with an optional timeout.

use std::{
    ffi::OsStr,
    io::{self, Read},
    process::{Child, Command, ExitStatus, Stdio},
    sync::{
        Arc, Mutex,
        mpsc::{self, Receiver},
    },
    thread,
    time::{Duration, Instant},
};

use log::{debug, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// How a subprocess ended.
#[derive(Debug)]
pub(crate) enum ProcessResult {
    /// The process ran to completion.
    Exited {
        status: ExitStatus,
        stdout: String,
        stderr: String,
    },
    /// The program could not be found.
    NotFound,
    /// The process outlived its timeout and was killed. Carries whatever
    /// output it wrote before that.
    TimedOut {
        after: Duration,
        stdout: String,
        stderr: String,
    },
    /// The process could not be started or waited on.
    Failed(io::Error),
}

impl ProcessResult {
    /// Diagnostic text of a process: stderr, or stdout when stderr is empty.
    pub(crate) fn diagnostics(stdout: &str, stderr: &str) -> String {
        let stderr = stderr.trim();
        if stderr.is_empty() {
            stdout.trim().to_string()
        } else {
            stderr.to_string()
        }
    }
}

/// Runs `program` with `args`, blocking until it exits or `timeout` elapses.
///
/// Stdin is closed and both output streams are captured. Output is drained
/// on helper threads so a chatty child cannot fill its pipe and stall. The
/// timeout also bounds collecting that output: background processes left
/// behind by the child may keep the pipes open, in which case the readers
/// are detached and the output captured so far is returned.
pub(crate) fn run<I, S>(program: &str, args: I, timeout: Option<Duration>) -> ProcessResult
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    debug!(command:? = command; "Spawning subprocess");

    let deadline = timeout.map(|timeout| Instant::now() + timeout);
    let mut child = match command.spawn() {
        Ok(child) => child,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return ProcessResult::NotFound,
        Err(err) => return ProcessResult::Failed(err),
    };

    let stdout = Drain::spawn(child.stdout.take());
    let stderr = Drain::spawn(child.stderr.take());

    match wait(&mut child, deadline) {
        Ok(Some(status)) => ProcessResult::Exited {
            status,
            stdout: stdout.collect(deadline),
            stderr: stderr.collect(deadline),
        },
        Ok(None) => {
            // The killed child's pipes close at once unless grandchildren
            // inherited them.
            let grace = Some(Instant::now() + POLL_INTERVAL);
            ProcessResult::TimedOut {
                after: timeout.unwrap_or_default(),
                stdout: stdout.collect(grace),
                stderr: stderr.collect(grace),
            }
        }
        Err(err) => ProcessResult::Failed(err),
    }
}

fn wait(child: &mut Child, deadline: Option<Instant>) -> io::Result<Option<ExitStatus>> {
    let Some(deadline) = deadline else {
        return child.wait().map(Some);
    };

    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }

        if Instant::now() >= deadline {
            warn!(pid = child.id(); "Subprocess timed out, killing it");
            // The child may exit between try_wait and kill.
            let _ = child.kill();
            child.wait()?;
            return Ok(None);
        }

        thread::sleep(POLL_INTERVAL);
    }
}

/// Output of one pipe, read on a helper thread.
struct Drain {
    captured: Arc<Mutex<Vec<u8>>>,
    closed: Receiver<()>,
}

impl Drain {
    fn spawn<R: Read + Send + 'static>(pipe: Option<R>) -> Self {
        let captured = Arc::new(Mutex::new(Vec::new()));
        let (closed_tx, closed) = mpsc::channel();

        let buffer = Arc::clone(&captured);
        thread::spawn(move || {
            if let Some(mut pipe) = pipe {
                let mut chunk = [0u8; 4096];
                loop {
                    match pipe.read(&mut chunk) {
                        Ok(0) => break,
                        Ok(n) => {
                            if let Ok(mut buffer) = buffer.lock() {
                                buffer.extend_from_slice(&chunk[..n]);
                            }
                        }
                        Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                        Err(_) => break,
                    }
                }
            }
            let _ = closed_tx.send(());
        });

        Self { captured, closed }
    }

    /// Waits for the pipe to close, but not past `deadline`, and returns
    /// what was read.
    fn collect(self, deadline: Option<Instant>) -> String {
        match deadline {
            Some(deadline) => {
                let remaining = deadline.saturating_duration_since(Instant::now());
                if self.closed.recv_timeout(remaining).is_err() {
                    debug!("Pipe still open at deadline, detaching reader");
                }
            }
            None => {
                let _ = self.closed.recv();
            }
        }

        match self.captured.lock() {
            Ok(buffer) => String::from_utf8_lossy(&buffer).into_owned(),
            Err(_) => String::new(),
        }
    }
}
