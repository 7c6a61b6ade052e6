// cli.rs - Command-line interface configuration
use std::path::PathBuf;

use clap::Parser;

use crate::params::DemoParams;

#[derive(Parser, Debug, Clone)]
#[command(name = "spincube")]
#[command(about = "WebGPU rotating-cube demos", long_about = None)]
pub struct Cli {
    /// Initial window width in logical pixels
    #[arg(long, default_value_t = 1280)]
    pub width: u32,

    /// Initial window height in logical pixels
    #[arg(long, default_value_t = 720)]
    pub height: u32,

    /// JSON file overriding the demo parameters
    #[arg(long)]
    pub params: Option<PathBuf>,

    /// Disable UI overlays (stats and parameter panel)
    #[arg(long = "no-ui", default_value = "false")]
    pub no_ui: bool,
}

impl Cli {
    /// Parameters from `--params`, or the given per-variant defaults.
    pub fn load_params_or(
        &self,
        defaults: DemoParams,
    ) -> std::result::Result<DemoParams, Box<dyn std::error::Error>> {
        match &self.params {
            Some(path) => DemoParams::load(path),
            None => Ok(defaults),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::parse_from(["spincube"]);
        assert_eq!(cli.width, 1280);
        assert_eq!(cli.height, 720);
        assert!(cli.params.is_none());
        assert!(!cli.no_ui);
    }

    #[test]
    fn parses_size_and_flags() {
        let cli = Cli::parse_from([
            "spincube",
            "--width",
            "640",
            "--height",
            "480",
            "--no-ui",
            "--params",
            "demo.json",
        ]);
        assert_eq!(cli.width, 640);
        assert_eq!(cli.height, 480);
        assert!(cli.no_ui);
        assert_eq!(cli.params.unwrap(), PathBuf::from("demo.json"));
    }
}
