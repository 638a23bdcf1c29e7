//! Tree-shape parameters, presets and normalization.
//!
//! Every numeric field is a bounded newtype that clamps on construction and
//! on assignment, so a [`TreeParameters`] value is never observed out of
//! range, including after deserialization.

use crate::color::Rgba;
use serde::{Deserialize, Serialize};

macro_rules! bounded {
    ($(#[$meta:meta])* $name:ident, $ty:ty, $raw:literal, $min:expr, $max:expr) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
        #[serde(from = $raw, into = $raw)]
        pub struct $name($ty);

        impl $name {
            pub const MIN: $ty = $min;
            pub const MAX: $ty = $max;

            pub fn new(value: $ty) -> Self {
                Self(value.clamp(Self::MIN, Self::MAX))
            }

            #[inline]
            pub fn get(self) -> $ty {
                self.0
            }

            pub fn set(&mut self, value: $ty) {
                *self = Self::new(value);
            }
        }

        impl From<$ty> for $name {
            fn from(value: $ty) -> Self {
                Self::new(value)
            }
        }

        impl From<$name> for $ty {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

// Serde goes through the raw primitive so clamping also applies to input files.
bounded!(
    /// Float in `[0, 1]`: probabilities, factors and variation amounts.
    UnitF32, f32, "f32", 0.0, 1.0
);
bounded!(
    /// Float in `[0.1, 10]`: thicknesses, sizes and scales.
    MagnitudeF32, f32, "f32", 0.1, 10.0
);
bounded!(
    /// Angle in degrees, `[0, 360]`.
    Degrees, f32, "f32", 0.0, 360.0
);
bounded!(
    /// Number of rewriting passes, `[1, 10]`.
    DepthLimit, u32, "u32", 1, 10
);
bounded!(
    /// Branch budget used to size the symbol limit, `[8, 64]`.
    BranchBudget, u32, "u32", 8, 64
);
bounded!(
    /// Canvas width or height in pixels, `[16, 512]`.
    CanvasExtent, u32, "u32", 16, 512
);
bounded!(
    /// Explicit cap on interpreted grammar symbols, `[1, 65536]`.
    SymbolLimit, u32, "u32", 1, 65_536
);
bounded!(
    /// Leaf points scattered per cluster, `[0, 64]`.
    LeafScatter, u32, "u32", 0, 64
);

/// Symbols the structure builder may interpret per `max_depth × max_branches`
/// slot when no explicit limit is configured.
pub const SYMBOLS_PER_BRANCH_SLOT: usize = 32;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TreeType {
    #[default]
    Oak,
    Pine,
    Palm,
    Birch,
    Willow,
    Dead,
    Custom,
}

impl TreeType {
    pub const ALL: [TreeType; 7] = [
        TreeType::Oak,
        TreeType::Pine,
        TreeType::Palm,
        TreeType::Birch,
        TreeType::Willow,
        TreeType::Dead,
        TreeType::Custom,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TreeType::Oak => "oak",
            TreeType::Pine => "pine",
            TreeType::Palm => "palm",
            TreeType::Birch => "birch",
            TreeType::Willow => "willow",
            TreeType::Dead => "dead",
            TreeType::Custom => "custom",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GrowthStage {
    Seed,
    Sapling,
    Young,
    #[default]
    Mature,
    Old,
    Dead,
}

impl GrowthStage {
    pub const ALL: [GrowthStage; 6] = [
        GrowthStage::Seed,
        GrowthStage::Sapling,
        GrowthStage::Young,
        GrowthStage::Mature,
        GrowthStage::Old,
        GrowthStage::Dead,
    ];

    /// Multiplier applied to `overall_scale`; `1.0` for a mature tree.
    pub fn scale_factor(self) -> f32 {
        let growth = self as u8 as f32 / GrowthStage::Mature as u8 as f32;
        0.2 + 0.8 * growth
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Spring,
    #[default]
    Summer,
    Autumn,
    Winter,
}

impl Season {
    pub const ALL: [Season; 4] = [Season::Spring, Season::Summer, Season::Autumn, Season::Winter];
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BranchParams {
    pub base_thickness: MagnitudeF32,
    /// Thickness multiplier applied per interpreted symbol.
    pub thickness_decay: UnitF32,
    pub branch_probability: UnitF32,
    pub angle_variation: UnitF32,
    /// Number of rewriting passes.
    pub max_depth: DepthLimit,
    pub max_branches: BranchBudget,
    pub curvature: UnitF32,
    pub asymmetry: UnitF32,
}

impl Default for BranchParams {
    fn default() -> Self {
        Self {
            base_thickness: MagnitudeF32::new(2.0),
            thickness_decay: UnitF32::new(0.8),
            branch_probability: UnitF32::new(0.7),
            angle_variation: UnitF32::new(0.3),
            max_depth: DepthLimit::new(5),
            max_branches: BranchBudget::new(32),
            curvature: UnitF32::new(0.1),
            asymmetry: UnitF32::new(0.2),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeafParams {
    /// Probability that a terminal branch carries a cluster.
    pub density: UnitF32,
    pub size_base: MagnitudeF32,
    pub size_variation: UnitF32,
    pub color_variation: UnitF32,
    pub base_colors: [Rgba; 4],
    pub alpha_variation: UnitF32,
}

impl Default for LeafParams {
    fn default() -> Self {
        Self {
            density: UnitF32::new(0.8),
            size_base: MagnitudeF32::new(3.0),
            size_variation: UnitF32::new(0.3),
            color_variation: UnitF32::new(0.2),
            base_colors: [
                Rgba::rgb(34, 139, 34),
                Rgba::rgb(50, 205, 50),
                Rgba::rgb(107, 142, 35),
                Rgba::rgb(85, 107, 47),
            ],
            alpha_variation: UnitF32::new(0.1),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrunkParams {
    pub base_color: Rgba,
    pub color_variation: UnitF32,
    pub texture_noise: UnitF32,
    pub bark_detail: UnitF32,
}

impl Default for TrunkParams {
    fn default() -> Self {
        Self {
            base_color: Rgba::rgb(101, 67, 33),
            color_variation: UnitF32::new(0.15),
            texture_noise: UnitF32::new(0.1),
            bark_detail: UnitF32::new(0.0),
        }
    }
}

/// Full description of one tree.
///
/// `random_seed == 0` means "no seed chosen"; see
/// [`crate::generator::TreeGenerator`] for how it is resolved.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeParameters {
    #[serde(rename = "type")]
    pub tree_type: TreeType,
    pub growth_stage: GrowthStage,
    pub season: Season,

    pub canvas_width: CanvasExtent,
    pub canvas_height: CanvasExtent,
    pub overall_scale: MagnitudeF32,

    pub branches: BranchParams,
    pub leaves: LeafParams,
    pub trunk: TrunkParams,

    pub wind_direction: Degrees,
    pub wind_strength: UnitF32,
    pub age_factor: UnitF32,

    pub random_seed: u32,
    pub determinism: UnitF32,

    /// Hard cap on interpreted grammar symbols; `None` derives it from
    /// `max_depth × max_branches`.
    pub symbol_limit: Option<SymbolLimit>,
    /// Individual leaf points scattered per cluster; `0` disables scattering.
    pub leaf_scatter: LeafScatter,
}

impl Default for TreeParameters {
    fn default() -> Self {
        Self {
            tree_type: TreeType::Oak,
            growth_stage: GrowthStage::Mature,
            season: Season::Summer,
            canvas_width: CanvasExtent::new(128),
            canvas_height: CanvasExtent::new(128),
            overall_scale: MagnitudeF32::new(1.0),
            branches: BranchParams::default(),
            leaves: LeafParams::default(),
            trunk: TrunkParams::default(),
            wind_direction: Degrees::new(0.0),
            wind_strength: UnitF32::new(0.0),
            age_factor: UnitF32::new(0.5),
            random_seed: 0,
            determinism: UnitF32::new(0.8),
            symbol_limit: None,
            leaf_scatter: LeafScatter::new(0),
        }
    }
}

impl TreeParameters {
    pub fn oak() -> Self {
        let mut params = Self::default();
        params.tree_type = TreeType::Oak;
        params.branches.branch_probability.set(0.8);
        params.branches.max_depth.set(5);
        params.branches.curvature.set(0.15);
        params.leaves.density.set(0.9);
        params.leaves.size_base.set(4.0);
        params
    }

    pub fn pine() -> Self {
        let mut params = Self::default();
        params.tree_type = TreeType::Pine;
        params.branches.branch_probability.set(0.6);
        params.branches.angle_variation.set(0.15);
        params.branches.max_depth.set(6);
        params.leaves.density.set(0.7);
        params.leaves.base_colors = [
            Rgba::rgb(34, 139, 34),
            Rgba::rgb(0, 100, 0),
            Rgba::rgb(46, 125, 50),
            Rgba::rgb(27, 94, 32),
        ];
        params
    }

    pub fn palm() -> Self {
        let mut params = Self::default();
        params.tree_type = TreeType::Palm;
        params.branches.max_depth.set(2);
        params.branches.curvature.set(0.4);
        params.branches.base_thickness.set(1.5);
        params.leaves.density.set(0.4);
        params.leaves.size_base.set(8.0);
        params
    }

    pub fn dead() -> Self {
        let mut params = Self::default();
        params.tree_type = TreeType::Dead;
        params.branches.branch_probability.set(0.5);
        params.leaves.density.set(0.0);
        params.trunk.base_color = Rgba::rgb(101, 67, 33);
        params.trunk.color_variation.set(0.4);
        params
    }

    /// Looks up a preset by name (`oak`, `pine`, `palm`, `dead`).
    pub fn preset(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "oak" => Some(Self::oak()),
            "pine" => Some(Self::pine()),
            "palm" => Some(Self::palm()),
            "dead" => Some(Self::dead()),
            _ => None,
        }
    }

    pub fn with_canvas(mut self, width: u32, height: u32) -> Self {
        self.canvas_width.set(width);
        self.canvas_height.set(height);
        self
    }

    pub fn with_seed(mut self, seed: u32) -> Self {
        self.random_seed = seed;
        self
    }

    /// Returns a copy adjusted for tree type, growth stage and season.
    ///
    /// The adjustments are:
    /// - Pine: angle variation at most `0.2`, leaf density at most `0.6`.
    /// - Palm: at most 3 rewriting passes, curvature at least `0.3`.
    /// - Willow: curvature at least `0.4`.
    /// - Dead: no leaves, trunk color variation at least `0.3`.
    /// - `overall_scale` is multiplied by [`GrowthStage::scale_factor`].
    /// - Autumn swaps the leaf palette for orange and brown tones; winter
    ///   keeps 30% of the leaf density.
    ///
    /// The generator renders a normalized copy, so callers keep their
    /// original values. Normalizing twice compounds the scale factor.
    pub fn normalized(&self) -> Self {
        let mut p = *self;

        match p.tree_type {
            TreeType::Pine => {
                p.branches
                    .angle_variation
                    .set(p.branches.angle_variation.get().min(0.2));
                p.leaves.density.set(p.leaves.density.get().min(0.6));
            }
            TreeType::Palm => {
                p.branches.max_depth.set(p.branches.max_depth.get().min(3));
                p.branches.curvature.set(p.branches.curvature.get().max(0.3));
            }
            TreeType::Willow => {
                p.branches.curvature.set(p.branches.curvature.get().max(0.4));
            }
            TreeType::Dead => {
                p.leaves.density.set(0.0);
                p.trunk
                    .color_variation
                    .set(p.trunk.color_variation.get().max(0.3));
            }
            TreeType::Oak | TreeType::Birch | TreeType::Custom => {}
        }

        p.overall_scale
            .set(p.overall_scale.get() * p.growth_stage.scale_factor());

        match p.season {
            Season::Autumn => {
                p.leaves.base_colors = [
                    Rgba::rgb(255, 140, 0),
                    Rgba::rgb(255, 165, 0),
                    Rgba::rgb(255, 69, 0),
                    Rgba::rgb(139, 69, 19),
                ];
            }
            Season::Winter => {
                p.leaves.density.set(p.leaves.density.get() * 0.3);
            }
            Season::Spring | Season::Summer => {}
        }

        p
    }

    /// Effective cap on the number of grammar symbols the builder interprets.
    pub fn effective_symbol_limit(&self) -> usize {
        match self.symbol_limit {
            Some(limit) => limit.get() as usize,
            None => {
                self.branches.max_depth.get() as usize
                    * self.branches.max_branches.get() as usize
                    * SYMBOLS_PER_BRANCH_SLOT
            }
        }
    }

    /// Turtle step length in pixels.
    pub fn step_length(&self) -> f32 {
        15.0 * self.overall_scale.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounded_values_clamp_on_construction_and_assignment() {
        assert_eq!(UnitF32::new(1.5).get(), 1.0);
        assert_eq!(UnitF32::new(-0.5).get(), 0.0);

        let mut depth = DepthLimit::new(4);
        depth.set(50);
        assert_eq!(depth.get(), DepthLimit::MAX);
        depth.set(0);
        assert_eq!(depth.get(), 1);

        assert_eq!(CanvasExtent::new(4).get(), 16);
        assert_eq!(MagnitudeF32::new(0.0).get(), 0.1);
    }

    #[test]
    fn pine_normalization_limits_angle_and_density() {
        let mut params = TreeParameters::default();
        params.tree_type = TreeType::Pine;
        params.branches.angle_variation.set(0.9);
        let p = params.normalized();

        assert!(p.branches.angle_variation.get() <= 0.2);
        assert!(p.leaves.density.get() <= 0.6);
    }

    #[test]
    fn dead_normalization_removes_leaves() {
        let mut params = TreeParameters::oak();
        params.tree_type = TreeType::Dead;
        let p = params.normalized();

        assert_eq!(p.leaves.density.get(), 0.0);
        assert!(p.trunk.color_variation.get() >= 0.3);
    }

    #[test]
    fn growth_stage_scales_overall_size() {
        let mut params = TreeParameters::default();
        assert_eq!(params.normalized().overall_scale.get(), 1.0);

        params.growth_stage = GrowthStage::Seed;
        assert!((params.normalized().overall_scale.get() - 0.2).abs() < 1e-6);
    }

    #[test]
    fn winter_thins_leaves_and_autumn_recolors() {
        let mut params = TreeParameters::oak();
        params.season = Season::Winter;
        let winter = params.normalized();
        assert!((winter.leaves.density.get() - 0.27).abs() < 1e-6);

        params.season = Season::Autumn;
        let autumn = params.normalized();
        assert_eq!(autumn.leaves.base_colors[0], Rgba::rgb(255, 140, 0));
    }

    #[test]
    fn default_symbol_limit_scales_with_depth_and_budget() {
        let params = TreeParameters::oak();
        assert_eq!(params.effective_symbol_limit(), 5 * 32 * SYMBOLS_PER_BRANCH_SLOT);

        let capped = TreeParameters {
            symbol_limit: Some(SymbolLimit::new(10)),
            ..params
        };
        assert_eq!(capped.effective_symbol_limit(), 10);
    }

    #[test]
    fn deserialization_clamps_out_of_range_fields() {
        let text = r#"
            type = "pine"
            canvas_width = 4096
            [branches]
            branch_probability = 3.5
            max_depth = 0
        "#;
        let params: TreeParameters = toml::from_str(text).expect("valid toml");

        assert_eq!(params.tree_type, TreeType::Pine);
        assert_eq!(params.canvas_width.get(), 512);
        assert_eq!(params.branches.branch_probability.get(), 1.0);
        assert_eq!(params.branches.max_depth.get(), 1);
        // Unspecified fields keep their defaults.
        assert_eq!(params.canvas_height.get(), 128);
    }

    #[test]
    fn deserialization_clamps_scatter_and_symbol_limit() {
        let text = "leaf_scatter = 4000000000\nsymbol_limit = 4294967295\n";
        let params: TreeParameters = toml::from_str(text).expect("valid toml");

        assert_eq!(params.leaf_scatter.get(), LeafScatter::MAX);
        assert_eq!(params.symbol_limit, Some(SymbolLimit::new(SymbolLimit::MAX)));
        assert_eq!(params.effective_symbol_limit(), 65_536);

        let params: TreeParameters = toml::from_str("symbol_limit = 0").expect("valid toml");
        assert_eq!(params.effective_symbol_limit(), 1);
        assert_eq!(TreeParameters::default().symbol_limit, None);
    }

    #[test]
    fn presets_resolve_by_name() {
        assert_eq!(TreeParameters::preset("Oak"), Some(TreeParameters::oak()));
        assert_eq!(TreeParameters::preset("dead"), Some(TreeParameters::dead()));
        assert!(TreeParameters::preset("baobab").is_none());
    }
}
