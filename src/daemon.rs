//! The wait loop.
//!
//! One thread, one `poll(2)` over the inotify descriptor for the toggle file
//! and, while rotation is enabled, the sensor's stdout. The timeout keeps the
//! loop turning when neither has anything to say.

use std::os::fd::{AsFd, BorrowedFd};
use std::path::{Path, PathBuf};

use nix::errno::Errno;
use nix::poll::{poll, PollFd, PollFlags, PollTimeout};
use nix::sys::inotify::{AddWatchFlags, InitFlags, Inotify, WatchDescriptor};

use crate::backends::Dispatcher;
use crate::control::Controller;
use crate::error::{Error, Result};
use crate::query::OrientationQuery;
use crate::sensors::OrientationEventSource;
use crate::toggle::ToggleStore;

pub const POLL_INTERVAL_MS: u16 = 100;

fn watch_mask() -> AddWatchFlags {
    AddWatchFlags::IN_MODIFY
        | AddWatchFlags::IN_CLOSE_WRITE
        | AddWatchFlags::IN_DELETE_SELF
        | AddWatchFlags::IN_MOVE_SELF
}

fn watch_lost(mask: AddWatchFlags) -> bool {
    mask.intersects(
        AddWatchFlags::IN_IGNORED | AddWatchFlags::IN_DELETE_SELF | AddWatchFlags::IN_MOVE_SELF,
    )
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct WatchOutcome {
    /// The toggle file may hold a new value.
    changed: bool,
    /// The watched inode is gone; the watch must be re-added.
    lost: bool,
}

/// inotify watch on the toggle file.
pub struct ToggleWatch {
    inotify: Inotify,
    path: PathBuf,
    watch: Option<WatchDescriptor>,
    rearm_warned: bool,
}

impl ToggleWatch {
    pub fn new(path: &Path) -> Result<Self> {
        let watch_err = |source| Error::Watch {
            path: path.to_path_buf(),
            source,
        };
        let inotify =
            Inotify::init(InitFlags::IN_NONBLOCK | InitFlags::IN_CLOEXEC).map_err(watch_err)?;
        let watch = inotify.add_watch(path, watch_mask()).map_err(watch_err)?;
        tracing::debug!(path = %path.display(), "watching toggle file");
        Ok(ToggleWatch {
            inotify,
            path: path.to_path_buf(),
            watch: Some(watch),
            rearm_warned: false,
        })
    }

    pub fn is_armed(&self) -> bool {
        self.watch.is_some()
    }

    /// Reads every queued event. Never blocks.
    pub(crate) fn consume(&mut self) -> WatchOutcome {
        let events = match self.inotify.read_events() {
            Ok(events) => events,
            Err(Errno::EAGAIN) => return WatchOutcome::default(),
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "failed to read toggle watch events");
                return WatchOutcome::default();
            }
        };

        let mut outcome = WatchOutcome::default();
        for event in events {
            // Late events for a watch that was already replaced.
            if self.watch != Some(event.wd) {
                continue;
            }
            outcome.changed = true;
            if watch_lost(event.mask) {
                outcome.lost = true;
            }
        }
        if outcome.lost {
            if let Some(wd) = self.watch.take() {
                // Fails with EINVAL when the kernel already dropped it.
                let _ = self.inotify.rm_watch(wd);
            }
            tracing::info!(path = %self.path.display(), "toggle file replaced or removed");
        }
        outcome
    }

    /// Re-creates the file if it is missing and watches it again.
    /// Returns `true` once the watch is in place.
    pub(crate) fn rearm(&mut self, toggle: &ToggleStore) -> bool {
        if self.watch.is_some() {
            return true;
        }
        let attempt = toggle
            .ensure_exists()
            .and_then(|_| {
                self.inotify
                    .add_watch(self.path.as_path(), watch_mask())
                    .map_err(|source| Error::Watch {
                        path: self.path.clone(),
                        source,
                    })
            });
        match attempt {
            Ok(wd) => {
                self.watch = Some(wd);
                self.rearm_warned = false;
                tracing::debug!(path = %self.path.display(), "toggle watch re-added");
                true
            }
            Err(err) => {
                if !self.rearm_warned {
                    tracing::warn!(error = %err, "failed to re-add toggle watch, retrying");
                    self.rearm_warned = true;
                }
                false
            }
        }
    }
}

impl AsFd for ToggleWatch {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.inotify.as_fd()
    }
}

fn readable(fd: &PollFd<'_>) -> bool {
    fd.revents().map_or(false, |revents| {
        revents.intersects(PollFlags::POLLIN | PollFlags::POLLHUP | PollFlags::POLLERR)
    })
}

/// Runs until the process is killed.
pub fn run<S, Q, D>(mut controller: Controller<S, Q, D>, mut watch: ToggleWatch) -> !
where
    S: OrientationEventSource,
    Q: OrientationQuery,
    D: Dispatcher,
{
    tracing::info!(interval_ms = POLL_INTERVAL_MS, "listening for orientation changes");
    loop {
        tick(&mut controller, &mut watch, PollTimeout::from(POLL_INTERVAL_MS));
    }
}

/// One wait and whatever handling it calls for. Toggle events are always
/// handled before sensor lines.
pub fn tick<S, Q, D>(controller: &mut Controller<S, Q, D>, watch: &mut ToggleWatch, timeout: PollTimeout)
where
    S: OrientationEventSource,
    Q: OrientationQuery,
    D: Dispatcher,
{
    if !watch.is_armed() && watch.rearm(controller.toggle()) {
        controller.on_toggle_changed();
    }

    let (toggle_ready, sensor_ready) = {
        let mut fds = vec![PollFd::new(watch.as_fd(), PollFlags::POLLIN)];
        if controller.wants_sensor() {
            if let Some(fd) = controller.source().readiness_fd() {
                fds.push(PollFd::new(fd, PollFlags::POLLIN));
            }
        }

        match poll(&mut fds, timeout) {
            Ok(0) | Err(Errno::EINTR) => return,
            Ok(_) => {}
            Err(err) => {
                tracing::debug!(error = %err, "poll failed");
                std::thread::sleep(std::time::Duration::from_millis(u64::from(POLL_INTERVAL_MS)));
                return;
            }
        }
        (readable(&fds[0]), fds.get(1).map_or(false, readable))
    };

    if toggle_ready {
        let outcome = watch.consume();
        if outcome.lost {
            watch.rearm(controller.toggle());
        }
        if outcome.changed {
            controller.on_toggle_changed();
        }
    }

    if sensor_ready {
        controller.on_sensor_readable();
    }
}
