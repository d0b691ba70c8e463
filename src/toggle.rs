//! The on/off flag file.
//!
//! A single leading integer. `0` disables rotation, anything else enables
//! it. A file that cannot be read or parsed counts as disabled.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{io_err, Error, Result};

/// Location relative to the home directory.
const DEFAULT_RELATIVE_PATH: &str = ".config/hypr/rotation-toggle";

#[derive(Debug, Clone)]
pub struct ToggleStore {
    path: PathBuf,
}

impl ToggleStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ToggleStore { path: path.into() }
    }

    /// `$HOME/.config/hypr/rotation-toggle`.
    pub fn default_path() -> Result<PathBuf> {
        dirs::home_dir()
            .map(|home| home.join(DEFAULT_RELATIVE_PATH))
            .ok_or(Error::NoHomeDir)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read(&self) -> bool {
        match fs::read(&self.path) {
            Ok(content) => match parse_leading_int(&content) {
                Some(value) => value != 0,
                None => {
                    tracing::debug!(path = %self.path.display(), "toggle file has no leading integer");
                    false
                }
            },
            Err(err) => {
                tracing::debug!(path = %self.path.display(), error = %err, "toggle file unreadable");
                false
            }
        }
    }

    /// Create the flag file as enabled if it does not exist yet.
    /// Returns `true` when the file was created.
    pub fn ensure_exists(&self) -> Result<bool> {
        if self.path.exists() {
            return Ok(false);
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
        }
        self.write(true)?;
        tracing::info!(path = %self.path.display(), "created toggle file, rotation enabled");
        Ok(true)
    }

    pub fn write(&self, enabled: bool) -> Result<()> {
        let content = if enabled { "1" } else { "0" };
        fs::write(&self.path, content).map_err(|e| io_err(&self.path, e))
    }
}

/// Leading whitespace, an optional sign, then decimal digits. Anything after
/// the digits is ignored, bytes that are not UTF-8 included. Values out of
/// range saturate.
fn parse_leading_int(content: &[u8]) -> Option<i64> {
    let start = content
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(content.len());
    let rest = &content[start..];
    let (negative, digits) = match rest.first() {
        Some(b'-') => (true, &rest[1..]),
        Some(b'+') => (false, &rest[1..]),
        _ => (false, rest),
    };
    let digits: Vec<i64> = digits
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .map(|b| i64::from(b - b'0'))
        .collect();
    if digits.is_empty() {
        return None;
    }
    let limit = if negative { i64::MIN } else { i64::MAX };
    let value = digits.iter().try_fold(0i64, |acc, &d| {
        let shifted = acc.checked_mul(10)?;
        if negative {
            shifted.checked_sub(d)
        } else {
            shifted.checked_add(d)
        }
    });
    Some(value.unwrap_or(limit))
}
