//! Command-line arguments and parameter loading.

use anyhow::{Context, Result, bail};
use clap::Parser;
use std::path::{Path, PathBuf};
use tree_core::TreeParameters;

#[derive(Parser, Debug)]
#[command(name = "pixel-tree")]
#[command(author, version)]
#[command(about = "Procedural pixel-art tree generator and viewer", long_about = None)]
pub struct Cli {
    /// TOML file with tree parameters; missing fields take their defaults
    #[arg(short, long, value_name = "FILE")]
    pub params: Option<PathBuf>,

    /// Start from a named preset (oak, pine, palm, dead)
    #[arg(short = 'P', long, conflicts_with = "params")]
    pub preset: Option<String>,

    /// Random seed; 0 picks a fresh one per generation
    #[arg(short, long)]
    pub seed: Option<u32>,

    /// Square canvas size in pixels (16-512)
    #[arg(long, value_name = "PX")]
    pub size: Option<u32>,

    /// Render once, write a PPM image to this path and exit
    #[arg(short, long, value_name = "PATH")]
    pub export: Option<PathBuf>,
}

impl Cli {
    /// Resolves the parameters described by the arguments.
    ///
    /// A parameter file wins over a preset; either way `--seed` and
    /// `--size` are applied last.
    pub fn parameters(&self) -> Result<TreeParameters> {
        let mut params = match (&self.params, &self.preset) {
            (Some(path), _) => load_params(path)?,
            (None, Some(name)) => match TreeParameters::preset(name) {
                Some(params) => params,
                None => bail!("unknown preset '{name}', expected oak, pine, palm or dead"),
            },
            (None, None) => TreeParameters::default(),
        };

        if let Some(seed) = self.seed {
            params.random_seed = seed;
        }
        if let Some(size) = self.size {
            params = params.with_canvas(size, size);
        }
        Ok(params)
    }
}

/// Reads [`TreeParameters`] from a TOML file.
pub fn load_params(path: &Path) -> Result<TreeParameters> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading parameters from {}", path.display()))?;
    let params: TreeParameters = toml::from_str(&text)
        .with_context(|| format!("parsing parameters in {}", path.display()))?;
    log::info!("loaded parameters from {}", path.display());
    Ok(params)
}
