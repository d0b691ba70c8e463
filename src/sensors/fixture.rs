//! In-memory sensor.
//!
//! Lines are pushed by hand and handed out on the next read, as if
//! `monitor-sensor` had printed them.

use std::collections::VecDeque;
use std::os::fd::BorrowedFd;

use super::OrientationEventSource;

#[derive(Debug, Default)]
pub struct FixtureSource {
    buffered: VecDeque<String>,
    delivered: usize,
}

impl FixtureSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut source = Self::new();
        for line in lines {
            source.push_line(line);
        }
        source
    }

    pub fn push_line(&mut self, line: impl Into<String>) {
        self.buffered.push_back(line.into());
    }

    /// Lines pushed but not read yet.
    pub fn pending(&self) -> usize {
        self.buffered.len()
    }

    /// Lines handed out through `read_available`, drains included.
    pub fn delivered(&self) -> usize {
        self.delivered
    }
}

impl OrientationEventSource for FixtureSource {
    fn read_available(&mut self) -> Vec<String> {
        self.delivered += self.buffered.len();
        self.buffered.drain(..).collect()
    }

    fn readiness_fd(&self) -> Option<BorrowedFd<'_>> {
        None
    }
}
