//! One-shot orientation lookup from iio-sensor-proxy.
//!
//! Used only when rotation gets re-enabled, since `monitor-sensor` does not
//! repeat the current orientation on its own.

use std::process::{Command, Stdio};

use lazy_static::lazy_static;
use regex::Regex;

use crate::orientation::Orientation;

pub trait OrientationQuery {
    /// Blocking. Any failure reads as `Orientation::Undefined`.
    fn query_current(&mut self) -> Orientation;
}

/// Asks the system bus through `dbus-send`.
#[derive(Debug, Default)]
pub struct SensorProxyQuery;

impl SensorProxyQuery {
    const PROGRAM: &'static str = "dbus-send";

    fn args() -> [&'static str; 7] {
        [
            "--system",
            "--print-reply",
            "--dest=net.hadess.SensorProxy",
            "/net/hadess/SensorProxy",
            "org.freedesktop.DBus.Properties.Get",
            "string:net.hadess.SensorProxy",
            "string:AccelerometerOrientation",
        ]
    }
}

impl OrientationQuery for SensorProxyQuery {
    fn query_current(&mut self) -> Orientation {
        let output = match Command::new(Self::PROGRAM)
            .args(Self::args())
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
        {
            Ok(output) => output,
            Err(err) => {
                tracing::warn!(error = %err, "failed to query current orientation");
                return Orientation::Undefined;
            }
        };

        let reply = String::from_utf8_lossy(&output.stdout);
        match parse_variant_reply(&reply) {
            Some(keyword) => {
                let orientation = Orientation::from_keyword(keyword);
                tracing::debug!(%keyword, %orientation, "queried current orientation");
                orientation
            }
            None => {
                tracing::warn!(status = %output.status, "unexpected reply from sensor proxy");
                Orientation::Undefined
            }
        }
    }
}

/// First quoted string after `variant` in a `dbus-send --print-reply` dump.
pub fn parse_variant_reply(reply: &str) -> Option<&str> {
    lazy_static! {
        static ref VARIANT_STRING: Regex = Regex::new(r#"(?s)variant.*?"([^"]*)""#).unwrap();
    }

    VARIANT_STRING
        .captures(reply)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPLY: &str = "method return time=1728900000.123456 sender=:1.7 -> destination=:1.88 serial=42 reply_serial=2\n   variant       string \"right-up\"\n";

    #[test]
    fn parses_property_reply() {
        assert_eq!(parse_variant_reply(REPLY), Some("right-up"));
        assert_eq!(
            Orientation::from_keyword(parse_variant_reply(REPLY).unwrap()),
            Orientation::RightUp
        );
    }

    #[test]
    fn quotes_before_variant_are_ignored() {
        let reply = "error \"nope\"\n   variant       string \"bottom-up\"\n";
        assert_eq!(parse_variant_reply(reply), Some("bottom-up"));
    }

    #[test]
    fn malformed_replies() {
        assert_eq!(parse_variant_reply(""), None);
        assert_eq!(parse_variant_reply("method return time=1"), None);
        assert_eq!(parse_variant_reply("   variant       string \"left-up"), None);
        assert_eq!(parse_variant_reply("\"normal\" but no variant"), None);
    }

    #[test]
    fn undefined_property_value() {
        let reply = "   variant       string \"undefined\"\n";
        assert_eq!(
            Orientation::from_keyword(parse_variant_reply(reply).unwrap()),
            Orientation::Undefined
        );
    }
}
