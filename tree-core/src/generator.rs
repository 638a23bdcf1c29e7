//! The end-to-end generation pipeline.
//!
//! A single generation runs strictly in sequence:
//! 1. [`TreeParameters::normalized`] - adjust the caller's parameters for
//!    type, growth stage and season.
//! 2. [`Grammar::expand`] - rewrite the axiom into a symbol sequence.
//! 3. [`StructureBuilder::build`] - interpret the symbols into branches,
//!    leaf clusters and bounds.
//! 4. [`render`] - rasterize into a fresh RGBA buffer.
//!
//! Stages 2 and 3 share one [`StdRng`], seeded from the realized seed and
//! advanced in a fixed order, so equal parameters and seeds give
//! bit-identical output. Independent generations share nothing and may
//! run on separate threads.

use crate::buffer::RgbaBuffer;
use crate::grammar::Grammar;
use crate::params::TreeParameters;
use crate::render::render;
use crate::structure::{StructureBuilder, TreeStructure};
use crate::types::Bounds;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::thread;
use std::time::{Duration, Instant};

/// Summary of one generated tree.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TreeMetadata {
    pub generation_id: u32,
    pub branch_count: usize,
    pub leaf_count: usize,
    pub max_depth: u32,
    pub generation_time: Duration,
    pub bounds: Bounds,
    /// Seed the generation actually used; never `0`.
    pub random_seed: u32,
}

impl TreeMetadata {
    fn from_tree(tree: &TreeStructure, seed: u32, elapsed: Duration) -> Self {
        Self {
            generation_id: tree.generation_id,
            branch_count: tree.branch_count(),
            leaf_count: tree.leaf_cluster_count(),
            max_depth: tree.max_depth(),
            generation_time: elapsed,
            bounds: tree.bounds,
            random_seed: seed,
        }
    }
}

/// Draws a fresh non-zero seed from the thread-local entropy source.
pub fn fresh_seed() -> u32 {
    rand::rng().random_range(1..=u32::MAX)
}

/// Picks the seed for one generation.
///
/// The first non-zero of `params_seed` and `fallback` wins; if both are
/// zero a fresh entropy seed is drawn.
pub fn resolve_seed(params_seed: u32, fallback: u32) -> u32 {
    match (params_seed, fallback) {
        (0, 0) => fresh_seed(),
        (0, seed) | (seed, _) => seed,
    }
}

/// Builds the tree structure for already-normalized parameters.
///
/// ### Parameters
/// - `params` - Normalized parameters; used as is.
/// - `seed` - Realized seed for this generation.
///
/// ### Returns
/// The populated [`TreeStructure`] with its bounds computed.
pub fn build_structure(params: &TreeParameters, seed: u32) -> TreeStructure {
    let mut rng = StdRng::seed_from_u64(u64::from(seed));

    let grammar = Grammar::new(params.tree_type);
    let symbols = grammar.expand(
        params.branches.max_depth.get(),
        params.branches.branch_probability.get(),
        params.effective_symbol_limit(),
        &mut rng,
    );
    debug!("pipeline: seed {seed}, {} symbols", symbols.len());

    StructureBuilder::new(params).build(&symbols, &mut rng)
}

fn run_pipeline(params: &TreeParameters, seed: u32, generation_id: u32) -> (RgbaBuffer, TreeMetadata) {
    let start = Instant::now();

    let normalized = params.normalized();
    let mut tree = build_structure(&normalized, seed);
    tree.generation_id = generation_id;
    let buffer = render(&tree);

    let meta = TreeMetadata::from_tree(&tree, seed, start.elapsed());
    debug!(
        "pipeline: generation {generation_id} done in {:?} ({} branches, {} leaves)",
        meta.generation_time, meta.branch_count, meta.leaf_count
    );
    (buffer, meta)
}

/// Front door for generating trees.
///
/// The generator holds a default seed and a generation counter. For each
/// call the realized seed is the parameters' `random_seed` if non-zero,
/// otherwise the generator's seed if non-zero, otherwise fresh entropy.
#[derive(Debug, Default)]
pub struct TreeGenerator {
    seed: u32,
    next_id: u32,
}

impl TreeGenerator {
    /// Creates a generator; `seed == 0` leaves seeding to each call.
    pub fn new(seed: u32) -> Self {
        Self { seed, next_id: 0 }
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    fn take_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    /// Generates and renders one tree.
    ///
    /// ### Parameters
    /// - `params` - Tree description; normalized internally, the caller's
    ///   value is not modified.
    ///
    /// ### Returns
    /// The rendered buffer, sized to the canvas, and its metadata.
    pub fn generate(&mut self, params: &TreeParameters) -> (RgbaBuffer, TreeMetadata) {
        let seed = resolve_seed(params.random_seed, self.seed);
        let id = self.take_id();
        run_pipeline(params, seed, id)
    }

    /// Generates the structure only, without rendering.
    pub fn generate_structure(&mut self, params: &TreeParameters) -> TreeStructure {
        let seed = resolve_seed(params.random_seed, self.seed);
        let mut tree = build_structure(&params.normalized(), seed);
        tree.generation_id = self.take_id();
        tree
    }

    /// Renders a structure produced earlier.
    pub fn render_structure(&self, tree: &TreeStructure) -> RgbaBuffer {
        render(tree)
    }

    /// Generates several trees, one scoped thread per tree.
    ///
    /// Seeds and generation ids are assigned up front in input order, so
    /// the results match calling [`TreeGenerator::generate`] on each
    /// entry in turn. Results come back in input order.
    pub fn generate_batch(&mut self, params_list: &[TreeParameters]) -> Vec<(RgbaBuffer, TreeMetadata)> {
        let jobs: Vec<(&TreeParameters, u32, u32)> = params_list
            .iter()
            .map(|p| (p, resolve_seed(p.random_seed, self.seed), self.take_id()))
            .collect();

        let started = Instant::now();
        let results: Vec<_> = thread::scope(|scope| {
            let handles: Vec<_> = jobs
                .iter()
                .map(|&(p, seed, id)| scope.spawn(move || run_pipeline(p, seed, id)))
                .collect();

            handles
                .into_iter()
                .map(|h| match h.join() {
                    Ok(result) => result,
                    Err(panic) => std::panic::resume_unwind(panic),
                })
                .collect()
        });

        info!(
            "batch: {} trees in {:?}",
            results.len(),
            started.elapsed()
        );
        results
    }
}

/// Generates an oak preset of the given size; `seed == 0` picks a fresh seed.
pub fn generate_oak(width: u32, height: u32, seed: u32) -> (RgbaBuffer, TreeMetadata) {
    TreeGenerator::new(seed).generate(&TreeParameters::oak().with_canvas(width, height))
}

/// Generates a pine preset of the given size; `seed == 0` picks a fresh seed.
pub fn generate_pine(width: u32, height: u32, seed: u32) -> (RgbaBuffer, TreeMetadata) {
    TreeGenerator::new(seed).generate(&TreeParameters::pine().with_canvas(width, height))
}

/// Generates a palm preset of the given size; `seed == 0` picks a fresh seed.
pub fn generate_palm(width: u32, height: u32, seed: u32) -> (RgbaBuffer, TreeMetadata) {
    TreeGenerator::new(seed).generate(&TreeParameters::palm().with_canvas(width, height))
}
