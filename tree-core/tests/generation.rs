//! End-to-end generation scenarios.

use tree_core::generator::{TreeGenerator, build_structure};
use tree_core::params::{Season, SymbolLimit, TreeParameters, TreeType};
use tree_core::types::Bounds;

#[test_log::test]
fn seeded_oak_is_populated_and_reproducible() {
    let params = TreeParameters::oak().with_canvas(64, 64);

    let (buf_a, meta_a) = TreeGenerator::new(12345).generate(&params);
    let (buf_b, meta_b) = TreeGenerator::new(12345).generate(&params);

    assert!(meta_a.branch_count > 0);
    assert!(meta_a.leaf_count > 0);
    // Branches chain onto the latest one, leaving a single terminal branch.
    assert!(meta_a.leaf_count <= 1);
    assert!(meta_a.max_depth > 0);
    assert_eq!(meta_a.random_seed, 12345);

    assert_eq!(buf_a.as_slice(), buf_b.as_slice());
    assert_eq!(meta_a.branch_count, meta_b.branch_count);
    assert_eq!(meta_a.leaf_count, meta_b.leaf_count);
    assert_eq!(meta_a.max_depth, meta_b.max_depth);
}

#[test]
fn full_density_decorates_the_single_terminal_branch() {
    let mut params = TreeParameters::oak().with_canvas(64, 64);
    params.leaves.density.set(1.0);

    for seed in [1, 12345, 777] {
        let (_, meta) = TreeGenerator::new(seed).generate(&params);
        assert_eq!(meta.leaf_count, 1, "seed {seed}");
    }
}

#[test]
fn dead_tree_never_has_leaves() {
    for seed in 1..=20 {
        let params = TreeParameters::dead().with_seed(seed);
        let (_, meta) = TreeGenerator::default().generate(&params);

        assert_eq!(meta.leaf_count, 0, "seed {seed}");
        assert!(meta.branch_count > 0);
    }
}

#[test]
fn dead_type_suppresses_leaves_even_with_dense_foliage() {
    let mut params = TreeParameters::oak().with_seed(1);
    params.tree_type = TreeType::Dead;
    params.leaves.density.set(1.0);

    let (_, meta) = TreeGenerator::default().generate(&params);
    assert_eq!(meta.leaf_count, 0);
}

#[test]
fn determinism_holds_across_presets_and_seeds() {
    let presets = [
        TreeParameters::oak(),
        TreeParameters::pine(),
        TreeParameters::palm(),
        TreeParameters::dead(),
    ];

    for preset in presets {
        for seed in [1, 99, 4242] {
            let params = preset.with_canvas(48, 48).with_seed(seed);
            let (a, ma) = TreeGenerator::default().generate(&params);
            let (b, mb) = TreeGenerator::default().generate(&params);

            assert_eq!(a, b, "{:?} seed {seed}", preset.tree_type);
            assert_eq!(
                (ma.branch_count, ma.leaf_count, ma.max_depth, ma.bounds),
                (mb.branch_count, mb.leaf_count, mb.max_depth, mb.bounds)
            );
        }
    }
}

#[test]
fn branches_respect_thickness_and_depth_bounds() {
    for seed in [3, 17, 512, 9001] {
        let params = TreeParameters::oak().normalized();
        let tree = build_structure(&params, seed);

        let base = params.branches.base_thickness.get();
        let limit = params.effective_symbol_limit();
        for branch in &tree.branches {
            assert!(branch.thickness <= base);
            assert!((branch.depth as usize) < limit);
        }
        assert!(tree.branch_count() <= limit);
    }
}

#[test]
fn symbol_limit_holds_for_maximal_growth() {
    let mut params = TreeParameters::default().with_seed(5);
    params.branches.branch_probability.set(1.0);
    params.branches.max_depth.set(10);
    params.branches.max_branches.set(64);

    let normalized = params.normalized();
    let limit = normalized.effective_symbol_limit();
    let tree = build_structure(&normalized, 5);

    assert!(tree.branch_count() <= limit);
    assert!((tree.max_depth() as usize) < limit);
}

#[test]
fn explicit_symbol_limit_is_configurable() {
    let mut params = TreeParameters::oak().with_seed(8);
    params.symbol_limit = Some(SymbolLimit::new(4));

    let (_, meta) = TreeGenerator::default().generate(&params);
    assert!(meta.branch_count <= 4);
    assert!(meta.max_depth < 4);
}

#[test]
fn output_buffer_matches_canvas_and_checks_access() {
    let params = TreeParameters::pine().with_canvas(37, 53).with_seed(21);
    let (buffer, _) = TreeGenerator::default().generate(&params);

    assert_eq!(buffer.width(), 37);
    assert_eq!(buffer.height(), 53);
    for y in 0..53 {
        for x in 0..37 {
            assert!(buffer.get(x, y).is_ok());
        }
    }
    assert!(buffer.get(37, 0).is_err());
    assert!(buffer.get(0, 53).is_err());
    assert!(buffer.get(usize::MAX, usize::MAX).is_err());
}

#[test]
fn rendered_pixels_are_transparent_or_opaque() {
    let params = TreeParameters::oak().with_seed(77);
    let (buffer, _) = TreeGenerator::default().generate(&params);

    assert!(buffer.as_slice().iter().any(|&px| px != 0));
    assert!(
        buffer
            .as_slice()
            .iter()
            .all(|&px| px & 0xFF == 0 || px & 0xFF == 0xFF)
    );
}

#[test]
fn bounds_lie_within_reach_of_the_trunk() {
    let params = TreeParameters::oak().with_seed(31);
    let (_, meta) = TreeGenerator::default().generate(&params);

    assert!(meta.bounds.width() > 0.0);
    assert!(meta.bounds.height() > 0.0);
    assert_ne!(meta.bounds, Bounds::default());
}

#[test]
fn every_season_generates() {
    for season in Season::ALL {
        let mut params = TreeParameters::oak().with_seed(11);
        params.season = season;

        let (buffer, meta) = TreeGenerator::default().generate(&params);
        assert_eq!(buffer.width(), 128);
        assert!(meta.branch_count > 0);
    }
}

#[test]
fn caller_parameters_are_not_normalized_in_place() {
    let mut params = TreeParameters::palm().with_seed(2);
    params.branches.max_depth.set(9);
    let before = params;

    let _ = TreeGenerator::default().generate(&params);
    assert_eq!(params, before);
}
