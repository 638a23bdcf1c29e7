//! Application entry point for the pixel tree viewer.
//!
//! With `--export` the binary renders one tree headlessly and writes it as
//! a PPM image; otherwise it opens the interactive [`Viewer`].

mod cli;
mod export;
mod viewer;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use cli::Cli;
use log::info;
use std::path::Path;
use tree_core::{TreeGenerator, TreeParameters};
use viewer::Viewer;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let params = cli.parameters()?;

    match &cli.export {
        Some(path) => export_once(&params, path),
        None => run_viewer(params),
    }
}

/// Generates a single tree, writes it to `path` and prints its metadata.
fn export_once(params: &TreeParameters, path: &Path) -> Result<()> {
    let (buffer, meta) = TreeGenerator::default().generate(params);
    export::save_ppm(&buffer, path)
        .with_context(|| format!("writing {}", path.display()))?;

    info!("exported {}x{} image to {}", buffer.width(), buffer.height(), path.display());
    println!("seed:      {}", meta.random_seed);
    println!("branches:  {}", meta.branch_count);
    println!("leaves:    {}", meta.leaf_count);
    println!("max depth: {}", meta.max_depth);
    println!(
        "bounds:    ({:.1}, {:.1}) - ({:.1}, {:.1})",
        meta.bounds.min.x, meta.bounds.min.y, meta.bounds.max.x, meta.bounds.max.y
    );
    println!("time:      {:?}", meta.generation_time);
    Ok(())
}

/// Starts the native eframe application.
fn run_viewer(params: TreeParameters) -> Result<()> {
    let options = eframe::NativeOptions::default();

    eframe::run_native(
        "Pixel Tree",
        options,
        Box::new(move |_cc| Ok(Box::new(Viewer::with_parameters(params)))),
    )
    .map_err(|e| anyhow!("viewer failed: {e}"))
}
