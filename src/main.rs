mod app;
mod backend;
mod config;
mod model;
mod ui;
mod util;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

const APP_ID_PREFIX: &str = "org.soplos.tools";
const CSS: &str = include_str!("../style/style.css");

#[derive(Parser)]
#[command(name = "soplos-tools", about = "Soplos Linux desktop utilities")]
struct Cli {
    #[command(subcommand)]
    tool: Tool,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Tool {
    /// Reorder the icons pinned to the Docklike panel plugin
    Dock {
        /// Docklike rc file (default: ~/.config/xfce4/panel/docklike-1.rc)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Pick the Plymouth boot splash theme
    Plymouth,
    /// Launch the desktop theme helpers
    Themes,
    /// First-run welcome and setup wizard
    Welcome,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    log::info!("Starting {:?}", cli.tool);

    let app = app::SoplosApp::new(cli.tool);
    std::process::exit(app.run());
}
