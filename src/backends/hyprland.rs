use std::process::{Command, Stdio};

use crate::orientation::TransformCode;

use super::Dispatcher;

/// The one output being rotated, as it appears in a hyprland `monitor` rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayConfig {
    pub monitor: String,
    pub resolution: String,
    pub position: String,
    pub scale: String,
}

impl Default for DisplayConfig {
    /// GPD Pocket 4 internal panel.
    fn default() -> Self {
        DisplayConfig {
            monitor: "eDP-1".into(),
            resolution: "1600x2560@144".into(),
            position: "0x0".into(),
            scale: "2".into(),
        }
    }
}

impl DisplayConfig {
    fn monitor_rule(&self, transform: TransformCode) -> String {
        format!(
            "{},{},{},{},transform,{}",
            self.monitor, self.resolution, self.position, self.scale, transform
        )
    }
}

// https://wiki.hyprland.org/Configuring/Monitors/#rotating
pub struct HyprctlDispatcher {
    display: DisplayConfig,
    program: String,
}

impl HyprctlDispatcher {
    pub fn new(display: DisplayConfig) -> Self {
        HyprctlDispatcher {
            display,
            program: "hyprctl".into(),
        }
    }

    /// Argument lists for the monitor, touch device and tablet rules.
    pub fn invocations(&self, transform: TransformCode) -> [Vec<String>; 3] {
        let code = transform.to_string();
        [
            vec![
                "keyword".into(),
                "monitor".into(),
                self.display.monitor_rule(transform),
            ],
            vec![
                "keyword".into(),
                "input:touchdevice:transform".into(),
                code.clone(),
            ],
            vec!["keyword".into(), "input:tablet:transform".into(), code],
        ]
    }

    fn run(&self, args: &[String]) {
        // Exit status is logged, never acted on.
        match Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
        {
            Ok(status) if !status.success() => {
                tracing::debug!(program = %self.program, ?args, %status, "hyprctl returned failure")
            }
            Ok(_) => {}
            Err(err) => {
                tracing::warn!(program = %self.program, ?args, error = %err, "hyprctl failed to start")
            }
        }
    }
}

impl Dispatcher for HyprctlDispatcher {
    fn apply(&mut self, transform: TransformCode) {
        tracing::info!(monitor = %self.display.monitor, %transform, "applying transform");
        for args in &self.invocations(transform) {
            self.run(args);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;

    #[test]
    fn invocation_layout() -> Result<()> {
        let dispatcher = HyprctlDispatcher::new(DisplayConfig::default());
        let [monitor, touch, tablet] = dispatcher.invocations(TransformCode::new(2)?);
        assert_eq!(
            monitor,
            ["keyword", "monitor", "eDP-1,1600x2560@144,0x0,2,transform,2"]
        );
        assert_eq!(touch, ["keyword", "input:touchdevice:transform", "2"]);
        assert_eq!(tablet, ["keyword", "input:tablet:transform", "2"]);
        Ok(())
    }

    #[test]
    fn display_config_is_used() -> Result<()> {
        let dispatcher = HyprctlDispatcher::new(DisplayConfig {
            monitor: "DSI-1".into(),
            resolution: "1200x1920@60".into(),
            position: "auto".into(),
            scale: "1.5".into(),
        });
        let [monitor, ..] = dispatcher.invocations(TransformCode::new(0)?);
        assert_eq!(monitor[2], "DSI-1,1200x1920@60,auto,1.5,transform,0");
        Ok(())
    }

    #[test]
    fn missing_program_does_not_stop_the_others() -> Result<()> {
        let mut dispatcher = HyprctlDispatcher::new(DisplayConfig::default());
        dispatcher.program = "/nonexistent/rotwatch-hyprctl".into();
        // All three spawn attempts fail; apply must still return normally.
        dispatcher.apply(TransformCode::new(3)?);
        Ok(())
    }
}
