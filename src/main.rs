use std::path::PathBuf;

use anyhow::{Context, Result, bail};

use markpea::script::Script;
use markpea::{AnnotationEngine, EngineConfig};

const USAGE: &str = "usage: markpea <background.png> <script.json> <out.png>";

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = std::env::args_os().skip(1).map(PathBuf::from).collect::<Vec<_>>();
    let [background, script, output] = args.as_slice() else {
        bail!(USAGE);
    };

    let background = image::open(background)
        .with_context(|| format!("Failed to open background {}", background.display()))?
        .to_rgba8();
    let json = std::fs::read_to_string(script)
        .with_context(|| format!("Failed to read script {}", script.display()))?;
    let script = Script::from_json(&json).context("Failed to parse script")?;

    let mut engine = AnnotationEngine::with_background(EngineConfig::load(), background);
    let failed = script.replay(&mut engine);
    if failed > 0 {
        log::warn!("{} script step(s) failed", failed);
    }

    let image = engine.export_raster().context("Failed to render annotations")?;
    image
        .save(output)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    log::info!("Saved {}", output.display());
    Ok(())
}
