//! Simulator configuration
//!
//! # Configuration Sources (in priority order)
//!
//! 1. Command line: first non-flag argument is a layout JSON path,
//!    `--print-layout` dumps the layout instead of running it
//! 2. Environment variables: `GAUNTLET_SECONDS`, `GAUNTLET_DT`,
//!    `GAUNTLET_DASH_EVERY`, `GAUNTLET_SLIDE_EVERY`, `GAUNTLET_LAYOUT`
//! 3. Built-in defaults: one minute of the first level at 60 Hz

use gauntlet_core::config::{at_least, clamped, Validate};
use gauntlet_core::error::Result;
use std::path::PathBuf;

/// Headless run settings
#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    /// Simulated seconds before giving up
    pub seconds: f32,
    /// Fixed frame step
    pub dt: f32,
    /// Request a dash this often, in seconds
    pub dash_every: Option<f32>,
    /// Request a slide this often, in seconds
    pub slide_every: Option<f32>,
    /// Layout file; the built-in level when unset
    pub layout: Option<PathBuf>,
    /// Print the layout as JSON and exit
    pub print_layout: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seconds: 60.0,
            dt: 1.0 / 60.0,
            dash_every: None,
            slide_every: None,
            layout: None,
            print_layout: false,
        }
    }
}

impl Validate for SimConfig {
    fn validated(mut self) -> Result<Self> {
        self.seconds = at_least("seconds", self.seconds, 0.0)?;
        self.dt = clamped("dt", self.dt, 1.0 / 1000.0, 0.1)?;
        if let Some(every) = self.dash_every {
            self.dash_every = Some(at_least("dash_every", every, self.dt)?);
        }
        if let Some(every) = self.slide_every {
            self.slide_every = Some(at_least("slide_every", every, self.dt)?);
        }
        Ok(self)
    }
}

impl SimConfig {
    /// Load from the process environment and arguments
    pub fn load() -> Result<Self> {
        Self::from_sources(|key| std::env::var(key).ok(), std::env::args().skip(1))
    }

    /// Layer `env` and `args` over the defaults
    pub fn from_sources(
        env: impl Fn(&str) -> Option<String>,
        args: impl IntoIterator<Item = String>,
    ) -> Result<Self> {
        let mut config = Self::default();

        let number = |key: &str| -> Option<f32> {
            let value = env(key)?;
            match value.trim().parse() {
                Ok(parsed) => Some(parsed),
                Err(_) => {
                    log::warn!("Ignoring {}={:?}: not a number", key, value);
                    None
                }
            }
        };

        if let Some(seconds) = number("GAUNTLET_SECONDS") {
            config.seconds = seconds;
        }
        if let Some(dt) = number("GAUNTLET_DT") {
            config.dt = dt;
        }
        if let Some(every) = number("GAUNTLET_DASH_EVERY") {
            config.dash_every = Some(every);
        }
        if let Some(every) = number("GAUNTLET_SLIDE_EVERY") {
            config.slide_every = Some(every);
        }
        if let Some(path) = env("GAUNTLET_LAYOUT").filter(|path| !path.is_empty()) {
            config.layout = Some(PathBuf::from(path));
        }

        for arg in args {
            if arg == "--print-layout" {
                config.print_layout = true;
                continue;
            }
            if arg.starts_with("--") {
                log::warn!("Unknown flag {}", arg);
                continue;
            }
            // First non-flag argument wins over the environment
            if !arg.is_empty() {
                config.layout = Some(PathBuf::from(arg));
                log::info!("Layout from args: {:?}", config.layout);
                break;
            }
        }

        config.validated()
    }

    /// Whether a periodic request of period `every` falls on frame `frame`
    pub fn is_due(every: Option<f32>, frame: u64, dt: f32) -> bool {
        let Some(every) = every else {
            return false;
        };
        let before = (frame as f64 * dt as f64 / every as f64).floor();
        let after = ((frame + 1) as f64 * dt as f64 / every as f64).floor();
        after > before
    }

    /// Log the effective settings
    pub fn print_summary(&self) {
        log::info!("Simulation settings:");
        log::info!(
            "  Layout: {}",
            self.layout
                .as_ref()
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "built-in level one".to_string())
        );
        log::info!("  Duration: {}s at dt {:.4}", self.seconds, self.dt);
        log::info!("  Dash every: {:?}", self.dash_every);
        log::info!("  Slide every: {:?}", self.slide_every);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(env: &[(&str, &str)], args: &[&str]) -> Result<SimConfig> {
        let env: HashMap<String, String> = env.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        SimConfig::from_sources(
            |key| env.get(key).cloned(),
            args.iter().map(|arg| arg.to_string()),
        )
    }

    #[test]
    fn test_defaults() {
        let config = load(&[], &[]).unwrap();
        assert_eq!(config, SimConfig::default());
    }

    #[test]
    fn test_env_then_args() {
        let config = load(
            &[
                ("GAUNTLET_SECONDS", "5"),
                ("GAUNTLET_DASH_EVERY", "2.5"),
                ("GAUNTLET_SLIDE_EVERY", "soon"),
                ("GAUNTLET_LAYOUT", "env.json"),
            ],
            &["--print-layout", "args.json", "ignored.json"],
        )
        .unwrap();
        assert_eq!(config.seconds, 5.0);
        assert_eq!(config.dash_every, Some(2.5));
        assert_eq!(config.slide_every, None);
        assert_eq!(config.layout, Some(PathBuf::from("args.json")));
        assert!(config.print_layout);
    }

    #[test]
    fn test_bad_values() {
        assert!(load(&[("GAUNTLET_SECONDS", "NaN")], &[]).is_err());
        let config = load(&[("GAUNTLET_DT", "1")], &[]).unwrap();
        assert_eq!(config.dt, 0.1);
    }

    #[test]
    fn test_is_due() {
        let dt = 0.25;
        let due: Vec<u64> = (0..12).filter(|&frame| SimConfig::is_due(Some(1.0), frame, dt)).collect();
        assert_eq!(due, vec![3, 7, 11]);
        assert!(!SimConfig::is_due(None, 3, dt));
    }
}
