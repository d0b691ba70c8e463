//! # Orientation
//!
//! What the accelerometer reports (`Orientation`) is kept apart from what
//! hyprctl is told (`TransformCode`), so that an undefined reading can never
//! reach the dispatcher.

use std::fmt;

use crate::error::{Error, Result};

/// Marker that `monitor-sensor` puts in front of every orientation change.
const CHANGED_MARKER: &str = "changed: ";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Orientation {
    /// Screen "Up" is at the top of the device.
    Normal,
    /// Screen "Up" is on the right side.
    RightUp,
    /// Screen "Up" is on the left side.
    LeftUp,
    /// Device is upside down.
    BottomUp,
    /// The sensor could not tell, or the reading was not understood.
    Undefined,
}

/// Keyword check order for sensor lines. First match wins.
const KEYWORDS: [(&str, Orientation); 4] = [
    ("normal", Orientation::Normal),
    ("right-up", Orientation::RightUp),
    ("left-up", Orientation::LeftUp),
    ("bottom-up", Orientation::BottomUp),
];

impl Orientation {
    /// Exact keyword lookup, as used for the iio-sensor-proxy property value.
    pub fn from_keyword(keyword: &str) -> Self {
        KEYWORDS
            .iter()
            .find(|(kw, _)| *kw == keyword)
            .map_or(Orientation::Undefined, |(_, o)| *o)
    }

    /// Parse a raw `monitor-sensor` line.
    ///
    /// Only the text after `changed: ` matters when present. The keywords are
    /// matched as substrings, so `"=== Has accelerometer (orientation: normal)"`
    /// reads as `Normal` too.
    pub fn from_sensor_line(line: &str) -> Self {
        let meaningful = match line.find(CHANGED_MARKER) {
            Some(pos) => &line[pos + CHANGED_MARKER.len()..],
            None => line,
        };
        KEYWORDS
            .iter()
            .find(|(kw, _)| meaningful.contains(kw))
            .map_or(Orientation::Undefined, |(_, o)| *o)
    }

    pub fn is_known(&self) -> bool {
        *self != Orientation::Undefined
    }

    /// Transform code understood by hyprctl, if the orientation is known.
    pub fn transform(&self) -> Option<TransformCode> {
        match *self {
            Orientation::LeftUp => Some(TransformCode(0)),
            Orientation::BottomUp => Some(TransformCode(1)),
            Orientation::RightUp => Some(TransformCode(2)),
            Orientation::Normal => Some(TransformCode(3)),
            Orientation::Undefined => None,
        }
    }

    pub fn keyword(&self) -> &'static str {
        match *self {
            Orientation::Normal => "normal",
            Orientation::RightUp => "right-up",
            Orientation::LeftUp => "left-up",
            Orientation::BottomUp => "bottom-up",
            Orientation::Undefined => "undefined",
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A 90 degree step as hyprctl's `transform` keyword expects it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TransformCode(u8);

impl TransformCode {
    pub fn new(code: u8) -> Result<Self> {
        match code {
            0..=3 => Ok(TransformCode(code)),
            other => Err(Error::InvalidTransform(other)),
        }
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for TransformCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orientation_to_transform() -> Result<()> {
        assert_eq!(Orientation::Normal.transform(), Some(TransformCode::new(3)?));
        assert_eq!(Orientation::RightUp.transform(), Some(TransformCode::new(2)?));
        assert_eq!(Orientation::LeftUp.transform(), Some(TransformCode::new(0)?));
        assert_eq!(Orientation::BottomUp.transform(), Some(TransformCode::new(1)?));
        assert_eq!(Orientation::Undefined.transform(), None);
        Ok(())
    }

    #[test]
    fn transform_code_range() {
        for code in 0..=3 {
            assert_eq!(TransformCode::new(code).map(|t| t.value()).ok(), Some(code));
        }
        assert!(TransformCode::new(4).is_err());
        assert!(TransformCode::new(255).is_err());
    }

    #[test]
    fn keyword_is_exact() {
        assert_eq!(Orientation::from_keyword("normal"), Orientation::Normal);
        assert_eq!(Orientation::from_keyword("right-up"), Orientation::RightUp);
        assert_eq!(Orientation::from_keyword("left-up"), Orientation::LeftUp);
        assert_eq!(Orientation::from_keyword("bottom-up"), Orientation::BottomUp);
        assert_eq!(Orientation::from_keyword("undefined"), Orientation::Undefined);
        assert_eq!(Orientation::from_keyword(""), Orientation::Undefined);
        assert_eq!(Orientation::from_keyword(" normal"), Orientation::Undefined);
    }

    #[test]
    fn sensor_lines() {
        assert_eq!(
            Orientation::from_sensor_line("    Accelerometer orientation changed: right-up"),
            Orientation::RightUp
        );
        assert_eq!(
            Orientation::from_sensor_line("    Accelerometer orientation changed: bottom-up"),
            Orientation::BottomUp
        );
        assert_eq!(
            Orientation::from_sensor_line("=== Has accelerometer (orientation: left-up)"),
            Orientation::LeftUp
        );
        assert_eq!(
            Orientation::from_sensor_line("    Accelerometer orientation changed: undefined"),
            Orientation::Undefined
        );
        assert_eq!(
            Orientation::from_sensor_line("    Light changed: 12.000000 (lux)"),
            Orientation::Undefined
        );
        assert_eq!(Orientation::from_sensor_line(""), Orientation::Undefined);
    }

    #[test]
    fn only_text_after_marker_counts() {
        // "normal" before the marker must not shadow the actual reading.
        assert_eq!(
            Orientation::from_sensor_line("normal mode changed: left-up"),
            Orientation::LeftUp
        );
    }

    #[test]
    fn first_keyword_in_check_order_wins() {
        assert_eq!(
            Orientation::from_sensor_line("changed: left-up or normal"),
            Orientation::Normal
        );
        assert_eq!(
            Orientation::from_sensor_line("changed: bottom-up/right-up"),
            Orientation::RightUp
        );
    }
}
