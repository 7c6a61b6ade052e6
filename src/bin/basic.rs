use anyhow::{anyhow, Result};
use clap::Parser;
use winit::event_loop::EventLoop;

use spincube::app::{App, DemoConfig};
use spincube::cli::Cli;
use spincube::params::DemoParams;

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let params = cli
        .load_params_or(DemoParams::default())
        .map_err(|e| anyhow!("Failed to load parameters: {}", e))?;

    println!("spincube - rotating cube, Escape to quit");

    let event_loop = EventLoop::new()?;
    let mut app = App::new(DemoConfig::basic(), params, cli.width, cli.height);
    event_loop.run_app(&mut app)?;

    Ok(())
}
