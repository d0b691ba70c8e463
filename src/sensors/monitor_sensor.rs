//! `monitor-sensor` subprocess.
//!
//! The helper runs for the whole lifetime of the daemon. Its stdout is put
//! in non-blocking mode so that reading only ever returns what is already
//! in the pipe.

use std::io::{self, Read};
use std::os::fd::{AsFd, BorrowedFd};
use std::process::{Child, ChildStdout, Command, Stdio};

use nix::fcntl::{fcntl, FcntlArg, OFlag};

use super::OrientationEventSource;
use crate::error::{Error, Result};

pub const DEFAULT_COMMAND: &str = "monitor-sensor";

const CHUNK_SIZE: usize = 4096;

/// Splits a non-blocking byte stream into lines.
///
/// A line without its terminating newline stays in `pending` until the rest
/// arrives, or until end of stream.
#[derive(Debug)]
pub struct LineReader<R> {
    inner: R,
    pending: Vec<u8>,
    /// Bytes up to the next newline belong to a discarded line.
    skip_to_newline: bool,
    closed: bool,
}

impl<R: Read> LineReader<R> {
    pub fn new(inner: R) -> Self {
        LineReader {
            inner,
            pending: Vec::new(),
            skip_to_newline: false,
            closed: false,
        }
    }

    pub(crate) fn get_ref(&self) -> &R {
        &self.inner
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn read_lines(&mut self) -> Vec<String> {
        if self.closed {
            return Vec::new();
        }
        self.fill();

        let mut lines = Vec::new();
        while let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
            let raw: Vec<u8> = self.pending.drain(..=pos).collect();
            lines.push(decode_line(&raw[..raw.len() - 1]));
        }
        if self.closed && !self.pending.is_empty() {
            let raw = std::mem::take(&mut self.pending);
            lines.push(decode_line(&raw));
        }
        lines
    }

    /// Drops everything buffered, a partial line included. The rest of that
    /// line is dropped as well when it arrives. Returns the number of lines
    /// thrown away.
    pub fn discard(&mut self) -> usize {
        if self.closed {
            return 0;
        }
        self.fill();

        let mut dropped = self.pending.iter().filter(|&&b| b == b'\n').count();
        if self.pending.last().map_or(false, |&b| b != b'\n') {
            dropped += 1;
            self.skip_to_newline = !self.closed;
        }
        self.pending.clear();
        dropped
    }

    /// Reads until the stream would block or ends.
    fn fill(&mut self) {
        let mut chunk = [0u8; CHUNK_SIZE];
        loop {
            match self.inner.read(&mut chunk) {
                Ok(0) => {
                    self.closed = true;
                    break;
                }
                Ok(n) => self.pending.extend_from_slice(&chunk[..n]),
                Err(err) if err.kind() == io::ErrorKind::WouldBlock => break,
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => {
                    tracing::warn!(error = %err, "sensor stream read failed");
                    self.closed = true;
                    break;
                }
            }
        }

        if self.skip_to_newline {
            match self.pending.iter().position(|&b| b == b'\n') {
                Some(pos) => {
                    self.pending.drain(..=pos);
                    self.skip_to_newline = false;
                }
                None => self.pending.clear(),
            }
        }
    }
}

fn decode_line(raw: &[u8]) -> String {
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw).into_owned()
}

pub struct MonitorSensor {
    command: String,
    child: Child,
    stdout: LineReader<ChildStdout>,
    reported_close: bool,
}

impl MonitorSensor {
    /// Spawn the helper with no arguments.
    pub fn start(program: &str) -> Result<Self> {
        Self::spawn(Command::new(program))
    }

    pub fn spawn(mut command: Command) -> Result<Self> {
        let name = command.get_program().to_string_lossy().into_owned();
        let spawn_err = |source| Error::Spawn {
            command: name.clone(),
            source,
        };

        let mut child = command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(spawn_err)?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| spawn_err(io::Error::new(io::ErrorKind::Other, "stdout not captured")))?;
        set_nonblocking(&stdout).map_err(spawn_err)?;

        tracing::info!(command = %name, pid = child.id(), "sensor helper started");
        Ok(MonitorSensor {
            command: name,
            child,
            stdout: LineReader::new(stdout),
            reported_close: false,
        })
    }

    fn report_close(&mut self) {
        if self.reported_close {
            return;
        }
        self.reported_close = true;
        match self.child.try_wait() {
            Ok(Some(status)) => {
                tracing::warn!(command = %self.command, %status, "sensor helper exited, no more orientation events")
            }
            _ => tracing::warn!(command = %self.command, "sensor helper closed its output, no more orientation events"),
        }
    }
}

impl OrientationEventSource for MonitorSensor {
    fn read_available(&mut self) -> Vec<String> {
        let lines = self.stdout.read_lines();
        if self.stdout.is_closed() {
            self.report_close();
        }
        lines
    }

    fn drain(&mut self) -> usize {
        let dropped = self.stdout.discard();
        if self.stdout.is_closed() {
            self.report_close();
        }
        dropped
    }

    fn readiness_fd(&self) -> Option<BorrowedFd<'_>> {
        if self.stdout.is_closed() {
            None
        } else {
            Some(self.stdout.get_ref().as_fd())
        }
    }

    fn is_closed(&self) -> bool {
        self.stdout.is_closed()
    }
}

fn set_nonblocking(fd: &impl AsFd) -> io::Result<()> {
    let current = fcntl(fd.as_fd(), FcntlArg::F_GETFL)?;
    let mut flags = OFlag::from_bits_retain(current);
    flags.insert(OFlag::O_NONBLOCK);
    fcntl(fd.as_fd(), FcntlArg::F_SETFL(flags))?;
    Ok(())
}
