//! meshview - terminal 3D model viewer
//!
//! Usage:
//!   meshview [model.stl] [--config viewer.json]
//!
//! Without a model a cube is shown.
//! Controls:
//!   - Mouse drag / arrow keys: orbit around the model
//!   - Mouse wheel / + -: zoom
//!   - W/S A/D R/F: move forward/back, left/right, up/down
//!   - 0: reset camera, 1: toggle fill, 2: toggle wireframe, space: spin
//!   - Q/ESC: quit

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use meshview_core::{stl, Mesh};
use meshview_terminal::{TerminalApp, ViewerConfig};
use tracing::info;

struct Args {
    model: Option<PathBuf>,
    config: Option<PathBuf>,
}

fn parse_args() -> Args {
    let mut parsed = Args {
        model: None,
        config: None,
    };
    let args: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" if i + 1 < args.len() => {
                parsed.config = Some(PathBuf::from(&args[i + 1]));
                i += 2;
            }
            other => {
                parsed.model = Some(PathBuf::from(other));
                i += 1;
            }
        }
    }
    parsed
}

fn load_mesh(path: &Path) -> anyhow::Result<Mesh> {
    let data = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let mesh = stl::parse_stl(&data).with_context(|| format!("parsing {}", path.display()))?;
    info!(path = %path.display(), triangles = mesh.polygons.len(), "loaded model");
    Ok(mesh)
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they stay off the alternate screen
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = parse_args();
    let config = match &args.config {
        Some(path) => ViewerConfig::load(path)?,
        None => ViewerConfig::default(),
    };
    let mesh = match &args.model {
        Some(path) => load_mesh(path)?,
        None => Mesh::cube(2.0),
    };

    let mut app = TerminalApp::new(mesh, config)?;
    app.run()
}
