/// Ruber - a star system with a flyable warbird, drawn in the terminal
///
/// Usage: ruber [scene.toml]
///
/// Without a scene file the built-in system is used and its models are read
/// from `./assets` (`ruber.tri`, `unum.tri`, ...).
use std::env;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use log::info;
use ruber_core::{Scene, SceneConfig, Session};
use ruber_terminal::{init_logging, LoggingConfig, TerminalApp};

const USAGE: &str = "\
Usage: ruber [scene.toml]

Keys:
  a          toggle interval / idle timer
  f t b h    front, top, bottom, overhead view
  v          cycle follow cameras
  w          toggle wireframe
  o p        orthographic / perspective projection
  arrows     thrust and yaw the warbird
  i k j l    pitch and roll the warbird
  q, Esc     quit";

fn main() -> Result<()> {
    let arg = env::args().nth(1);
    if matches!(arg.as_deref(), Some("-h") | Some("--help")) {
        println!("{USAGE}");
        return Ok(());
    }

    let (config, base_dir) = match arg {
        Some(path) => {
            let path = PathBuf::from(path);
            let config = SceneConfig::load(&path)
                .with_context(|| format!("Failed to load scene {}", path.display()))?;
            let base_dir = path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."));
            (config, base_dir)
        }
        None => (SceneConfig::default(), PathBuf::from(".")),
    };

    init_logging(LoggingConfig::from(&config.logging)).context("Failed to open log file")?;

    let (scene, buffers) = Scene::load(&config, &base_dir).context("Failed to build scene")?;
    info!("loaded {} bodies from {}", scene.bodies().len(), base_dir.display());

    let session = Session::new(scene, &config, Instant::now()).context("Failed to start session")?;

    let mut app = TerminalApp::new(session, buffers)?;
    app.run()?;

    Ok(())
}
