//! CLI configuration for the visualizer.
//!
//! Everything tunable at launch lives here; per-frame state (theme, bold
//! stroke) is keyboard-driven and carried in the render context instead.

use clap::Parser;

pub const DEFAULT_FPS: u32 = 60;
pub const DEFAULT_POINTS: usize = 900;

/// Audio-reactive sphere visualizer with an assistant-backend conversation feed.
#[derive(Debug, Clone, Parser)]
#[command(name = "voxsphere", version, about)]
pub struct AppConfig {
    /// Command used to launch the assistant backend process.
    #[arg(long = "backend-cmd", env = "VOXSPHERE_BACKEND", default_value = "python3")]
    pub backend_cmd: String,

    /// Arguments passed to the backend command (repeatable).
    #[arg(
        long = "backend-arg",
        value_name = "ARG",
        action = clap::ArgAction::Append,
        allow_hyphen_values = true
    )]
    pub backend_args: Vec<String>,

    /// Run without a backend process (panels still render, transcript stays static).
    #[arg(long = "no-backend", default_value_t = false)]
    pub no_backend: bool,

    /// Preferred audio input device name; defaults to the system default input.
    #[arg(long = "input-device")]
    pub input_device: Option<String>,

    /// List available audio input devices and exit.
    #[arg(long = "list-input-devices", default_value_t = false)]
    pub list_input_devices: bool,

    /// Skip audio capture entirely and treat the microphone as silent.
    #[arg(long = "no-audio", default_value_t = false)]
    pub no_audio: bool,

    /// Initial theme id (1-4); switchable at runtime with the number keys.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=4))]
    pub theme: u8,

    /// Start with bold strokes enabled (toggled at runtime with 'b' or 'u').
    #[arg(long, default_value_t = false)]
    pub bold: bool,

    /// Target frame rate.
    #[arg(long, default_value_t = DEFAULT_FPS)]
    pub fps: u32,

    /// Number of points on the sphere surface.
    #[arg(long, default_value_t = DEFAULT_POINTS)]
    pub points: usize,

    /// Enable debug logging to a temp file.
    #[arg(long, env = "VOXSPHERE_LOGS", default_value_t = false)]
    pub logs: bool,

    /// Force-disable all logging even if VOXSPHERE_LOGS is set.
    #[arg(long = "no-logs", env = "VOXSPHERE_NO_LOGS", default_value_t = false)]
    pub no_logs: bool,
}

impl AppConfig {
    /// Frame budget for the orchestrator loop.
    pub fn frame_budget(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(1.0 / f64::from(self.fps.max(1)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_launch_constants() {
        let config = AppConfig::parse_from(["voxsphere"]);
        assert_eq!(config.fps, 60);
        assert_eq!(config.theme, 1);
        assert!(!config.bold);
        assert!(!config.no_audio);
        assert_eq!(config.points, DEFAULT_POINTS);
    }

    #[test]
    fn backend_args_accumulate() {
        let config = AppConfig::parse_from([
            "voxsphere",
            "--backend-cmd",
            "python3",
            "--backend-arg",
            "AI.py",
            "--backend-arg",
            "--verbose",
        ]);
        assert_eq!(config.backend_cmd, "python3");
        assert_eq!(config.backend_args, vec!["AI.py", "--verbose"]);
    }

    #[test]
    fn theme_range_is_enforced() {
        assert!(AppConfig::try_parse_from(["voxsphere", "--theme", "5"]).is_err());
        assert!(AppConfig::try_parse_from(["voxsphere", "--theme", "0"]).is_err());
    }

    #[test]
    fn frame_budget_never_divides_by_zero() {
        let mut config = AppConfig::parse_from(["voxsphere"]);
        config.fps = 0;
        assert!(config.frame_budget().as_secs_f64() > 0.0);
    }
}
