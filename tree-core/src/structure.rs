//! Branch arena, leaf clusters and the turtle interpreter that builds them.
//!
//! Branches live in a flat arena ([`TreeStructure::branches`]); parents and
//! children refer to each other by [`BranchId`]. Arena order is creation
//! order, which is also the order the rasterizer draws in.

use crate::color::Rgba;
use crate::grammar::Symbol;
use crate::params::{TreeParameters, TreeType};
use crate::types::{BranchId, Bounds};
use glam::Vec2;
use log::debug;
use rand::Rng;
use std::f32::consts::TAU;

/// Half-width of the turn angle range in degrees, before angle variation.
pub const TURN_RANGE_DEGREES: f32 = 45.0;

#[derive(Clone, Debug, PartialEq)]
pub struct Branch {
    pub start: Vec2,
    pub end: Vec2,
    pub thickness: f32,
    pub depth: u32,
    pub color: Rgba,
    pub parent: Option<BranchId>,
    pub children: Vec<BranchId>,
}

impl Branch {
    pub fn direction(&self) -> Vec2 {
        (self.end - self.start).normalize_or_zero()
    }

    pub fn length(&self) -> f32 {
        (self.end - self.start).length()
    }

    pub fn midpoint(&self) -> Vec2 {
        (self.start + self.end) * 0.5
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Segment box grown by half the thickness on every side.
    pub fn bounds(&self) -> Bounds {
        let half = self.thickness * 0.5;
        Bounds::new(
            self.start.min(self.end) - Vec2::splat(half),
            self.start.max(self.end) + Vec2::splat(half),
        )
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LeafShape {
    #[default]
    Circle,
    Ellipse,
    Spiky,
    Scattered,
}

impl LeafShape {
    pub fn for_type(tree_type: TreeType) -> Self {
        match tree_type {
            TreeType::Pine => LeafShape::Spiky,
            TreeType::Palm => LeafShape::Ellipse,
            TreeType::Willow => LeafShape::Scattered,
            TreeType::Oak | TreeType::Birch | TreeType::Dead | TreeType::Custom => {
                LeafShape::Circle
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LeafCluster {
    pub position: Vec2,
    /// Radius in pixels.
    pub size: f32,
    pub color: Rgba,
    pub shape: LeafShape,
    /// Individual leaf offsets from `position`; empty until scattered.
    pub leaves: Vec<Vec2>,
}

impl LeafCluster {
    pub fn new(position: Vec2, size: f32, color: Rgba, shape: LeafShape) -> Self {
        Self {
            position,
            size,
            color,
            shape,
            leaves: Vec::new(),
        }
    }

    /// Replaces the individual leaf offsets with `count` fresh samples.
    ///
    /// - `Circle`: uniform in the disk of radius `size`.
    /// - `Ellipse`: as circle, stretched 1.5× horizontally.
    /// - `Spiky`: as circle, each offset scaled by a factor in `[0.7, 1.5)`.
    /// - `Scattered`: uniform in a disk of radius `1.5 × size`.
    pub fn scatter_leaves(&mut self, count: usize, rng: &mut impl Rng) {
        self.leaves.clear();
        self.leaves.reserve(count);

        for _ in 0..count {
            let offset = match self.shape {
                LeafShape::Circle => point_in_disk(self.size, rng),
                LeafShape::Ellipse => {
                    let p = point_in_disk(self.size, rng);
                    Vec2::new(p.x * 1.5, p.y)
                }
                LeafShape::Spiky => {
                    let p = point_in_disk(self.size, rng);
                    p * (1.0 + uniform(rng, -0.3, 0.5))
                }
                LeafShape::Scattered => point_in_disk(self.size * 1.5, rng),
            };
            self.leaves.push(offset);
        }
    }

    /// Absolute positions of the scattered leaves.
    pub fn leaf_points(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.leaves.iter().map(|&off| self.position + off)
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::around(self.position, self.size)
    }
}

/// A fully built tree, ready to be rendered.
#[derive(Clone, Debug)]
pub struct TreeStructure {
    /// All branches in creation order. The root, if any, is `branches[0]`.
    pub branches: Vec<Branch>,
    pub leaf_clusters: Vec<LeafCluster>,
    pub parameters: TreeParameters,
    pub bounds: Bounds,
    pub generation_id: u32,
}

impl TreeStructure {
    pub fn new(parameters: TreeParameters) -> Self {
        Self {
            branches: Vec::new(),
            leaf_clusters: Vec::new(),
            parameters,
            bounds: Bounds::default(),
            generation_id: 0,
        }
    }

    pub fn root(&self) -> Option<BranchId> {
        if self.branches.is_empty() { None } else { Some(0) }
    }

    pub fn add_root(&mut self, branch: Branch) -> BranchId {
        self.branches.push(Branch {
            parent: None,
            ..branch
        });
        self.branches.len() - 1
    }

    pub fn add_child(&mut self, parent: BranchId, branch: Branch) -> BranchId {
        let id = self.branches.len();
        self.branches.push(Branch {
            parent: Some(parent),
            ..branch
        });
        self.branches[parent].children.push(id);
        id
    }

    /// Leaf branches in depth-first order from the root.
    pub fn leaf_branches(&self) -> Vec<BranchId> {
        let mut leaves = Vec::new();
        let mut stack: Vec<BranchId> = self.root().into_iter().collect();

        while let Some(id) = stack.pop() {
            let branch = &self.branches[id];
            if branch.is_leaf() {
                leaves.push(id);
            } else {
                stack.extend(branch.children.iter().rev());
            }
        }
        leaves
    }

    /// Recomputes [`TreeStructure::bounds`] from branches and clusters.
    ///
    /// A tree without branches gets the degenerate box `(0,0)-(0,0)`.
    pub fn compute_bounds(&mut self) {
        let Some(first) = self.branches.first() else {
            self.bounds = Bounds::default();
            return;
        };

        let branch_boxes = self.branches.iter().map(Branch::bounds);
        let cluster_boxes = self.leaf_clusters.iter().map(LeafCluster::bounds);
        self.bounds = branch_boxes
            .chain(cluster_boxes)
            .fold(first.bounds(), |acc, b| acc.union(&b));
    }

    pub fn branch_count(&self) -> usize {
        self.branches.len()
    }

    pub fn leaf_cluster_count(&self) -> usize {
        self.leaf_clusters.len()
    }

    pub fn max_depth(&self) -> u32 {
        self.branches.iter().map(|b| b.depth).max().unwrap_or(0)
    }
}

/// Cursor state carried through the symbol scan.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Turtle {
    position: Vec2,
    direction: Vec2,
    thickness: f32,
    depth: u32,
    color: Rgba,
}

/// Interprets a symbol sequence as turtle graphics.
///
/// The builder reads its parameters only; all randomness comes from the
/// generator passed to [`StructureBuilder::build`].
#[derive(Debug)]
pub struct StructureBuilder<'a> {
    params: &'a TreeParameters,
}

impl<'a> StructureBuilder<'a> {
    pub fn new(params: &'a TreeParameters) -> Self {
        Self { params }
    }

    /// Builds the complete tree: branches, leaf clusters, scattered leaves
    /// (when enabled) and bounds, in that order.
    ///
    /// At most [`TreeParameters::effective_symbol_limit`] symbols are
    /// interpreted. Because depth grows by one per interpreted symbol,
    /// every branch depth is strictly less than that limit.
    ///
    /// ### Parameters
    /// - `symbols` - Sequence produced by the grammar.
    /// - `rng` - Random source, continuing from the grammar stage.
    ///
    /// ### Returns
    /// A populated [`TreeStructure`] carrying a copy of the parameters.
    pub fn build(&self, symbols: &[Symbol], rng: &mut impl Rng) -> TreeStructure {
        let mut tree = TreeStructure::new(*self.params);

        let limit = self.params.effective_symbol_limit();
        let symbols = if symbols.len() > limit {
            debug!(
                "builder: truncating {} symbols to limit {limit}",
                symbols.len()
            );
            &symbols[..limit]
        } else {
            symbols
        };

        self.interpret(&mut tree, symbols, rng);
        self.assign_leaf_clusters(&mut tree, rng);

        let scatter = self.params.leaf_scatter.get() as usize;
        if scatter > 0 {
            for cluster in &mut tree.leaf_clusters {
                cluster.scatter_leaves(scatter, rng);
            }
        }

        tree.compute_bounds();
        debug!(
            "builder: {} branches, {} leaf clusters, max depth {}",
            tree.branch_count(),
            tree.leaf_cluster_count(),
            tree.max_depth()
        );
        tree
    }

    /// Scans the symbols and appends branches to `tree`.
    ///
    /// Each `Forward` attaches to the most recently created branch, not to
    /// the branch that was current at the matching push. Every symbol,
    /// including pushes, pops and turns, decays thickness and increments
    /// depth after its own effect. A pop with an empty stack does nothing.
    fn interpret(&self, tree: &mut TreeStructure, symbols: &[Symbol], rng: &mut impl Rng) {
        let p = self.params;
        let step = p.step_length();
        let decay = p.branches.thickness_decay.get();
        let variation = p.branches.angle_variation.get();

        let mut turtle = Turtle {
            position: Vec2::new(
                p.canvas_width.get() as f32 * 0.5,
                p.canvas_height.get() as f32 * 0.9,
            ),
            direction: Vec2::new(0.0, -1.0),
            thickness: p.branches.base_thickness.get(),
            depth: 0,
            color: p.trunk.base_color,
        };
        let mut saved: Vec<Turtle> = Vec::new();
        let mut last: Option<BranchId> = None;

        for &symbol in symbols {
            match symbol {
                Symbol::Forward => {
                    let end = turtle.position + turtle.direction * step;
                    let branch = Branch {
                        start: turtle.position,
                        end,
                        thickness: turtle.thickness,
                        depth: turtle.depth,
                        color: turtle.color,
                        parent: None,
                        children: Vec::new(),
                    };
                    let id = match last {
                        Some(parent) => tree.add_child(parent, branch),
                        None => tree.add_root(branch),
                    };
                    last = Some(id);
                    turtle.position = end;
                }
                Symbol::Push => saved.push(turtle),
                Symbol::Pop => {
                    if let Some(state) = saved.pop() {
                        turtle = state;
                    }
                }
                Symbol::TurnRight => {
                    let angle = uniform(rng, -TURN_RANGE_DEGREES, TURN_RANGE_DEGREES) * variation;
                    turtle.direction = rotate_degrees(turtle.direction, angle);
                }
                Symbol::TurnLeft => {
                    let angle = uniform(rng, -TURN_RANGE_DEGREES, TURN_RANGE_DEGREES) * variation;
                    turtle.direction = rotate_degrees(turtle.direction, -angle);
                }
            }

            turtle.thickness *= decay;
            turtle.depth += 1;
        }
    }

    /// Places leaf clusters at the ends of leaf branches.
    ///
    /// With zero density no clusters are made and no random draws happen.
    fn assign_leaf_clusters(&self, tree: &mut TreeStructure, rng: &mut impl Rng) {
        let leaves = &self.params.leaves;
        let density = leaves.density.get();
        if density <= 0.0 {
            return;
        }

        let size_var = leaves.size_variation.get();
        let color_var = leaves.color_variation.get();
        let shape = LeafShape::for_type(self.params.tree_type);

        let leaf_ids = tree.leaf_branches();
        tree.leaf_clusters.reserve(leaf_ids.len());

        for id in leaf_ids {
            if rng.random::<f32>() >= density {
                continue;
            }

            let size = leaves.size_base.get() * (1.0 + uniform(rng, -size_var, size_var));
            let base = leaves.base_colors[rng.random_range(0..=3usize)];
            let mut vary = |channel: u8| -> u8 {
                (channel as f32 * (1.0 + uniform(rng, -color_var, color_var))).clamp(0.0, 255.0)
                    as u8
            };
            let color = Rgba {
                r: vary(base.r),
                g: vary(base.g),
                b: vary(base.b),
                a: base.a,
            };

            let position = tree.branches[id].end;
            tree.leaf_clusters
                .push(LeafCluster::new(position, size, color, shape));
        }
    }
}

/// Uniform float in `[min, max)`; returns `min` when the range is empty.
pub(crate) fn uniform(rng: &mut impl Rng, min: f32, max: f32) -> f32 {
    min + rng.random::<f32>() * (max - min)
}

fn point_in_disk(radius: f32, rng: &mut impl Rng) -> Vec2 {
    let angle = uniform(rng, 0.0, TAU);
    let r = rng.random::<f32>().sqrt() * radius;
    Vec2::new(r * angle.cos(), r * angle.sin())
}

/// Rotates `v` by `degrees`; positive turns clockwise on a y-down canvas.
fn rotate_degrees(v: Vec2, degrees: f32) -> Vec2 {
    Vec2::from_angle(degrees.to_radians()).rotate(v)
}
