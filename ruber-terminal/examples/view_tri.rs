/// Example: spin a single .tri model in the terminal
///
/// Usage: cargo run --example view_tri -- path/to/model.tri
use std::env;
use std::path::Path;
use std::time::Instant;

use anyhow::{bail, Result};
use ruber_core::{Scene, SceneConfig, Session};
use ruber_terminal::{init_logging, LoggingConfig, TerminalApp};

fn main() -> Result<()> {
    let Some(model) = env::args().nth(1) else {
        bail!("Usage: view_tri <model.tri>");
    };

    init_logging(LoggingConfig::default())?;

    let config = SceneConfig::single_model(&model);
    let (scene, buffers) = Scene::load(&config, Path::new("."))?;
    println!(
        "Loaded {} vertices from {model}",
        buffers.iter().map(|b| b.vertex_count()).sum::<usize>()
    );

    let session = Session::new(scene, &config, Instant::now())?;
    let mut app = TerminalApp::new(session, buffers)?;
    app.run()?;
    Ok(())
}
