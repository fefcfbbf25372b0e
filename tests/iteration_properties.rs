//! Property-based sweeps over the spatial tiling arithmetic
//!
//! The closed-form steady/edge formulas interact with non-divisible extents,
//! strides wider than tiles, and single-cluster degenerate cases. These
//! sweeps drive (size, tile, stride, width) through those regions and pin
//! the invariants the downstream estimators rely on.

use mapscope::{
    ClusterAnalysis, Dimension, DimensionTable, Directive, DirectiveTable, NetworkOnChipModel,
    TensorTable,
};
use proptest::prelude::*;

fn ceil(a: u64, b: u64) -> u64 {
    a / b + u64::from(a % b != 0)
}

fn single_spatial(size: u64, tile: u64, stride: u64) -> (DimensionTable, DirectiveTable) {
    let mut dims = DimensionTable::new();
    dims.insert(Dimension::new("X", size));
    let dataflow = DirectiveTable::from_directives(vec![Directive::spatial("X", tile, stride)]);
    (dims, dataflow)
}

proptest! {
    /// Edge-cluster count stays within [1, width] for any geometry,
    /// collapsing to exactly 1 whenever one tile covers the dimension.
    #[test]
    fn edge_clusters_bounded_by_width(
        size in 1u64..512,
        tile in 1u64..48,
        stride in 1u64..48,
        width in 1u64..24,
    ) {
        let (dims, dataflow) = single_spatial(size, tile, stride);
        let tensors = TensorTable::new();
        let noc = NetworkOnChipModel::default();
        let analysis =
            ClusterAnalysis::new(0, width, &dataflow, &dims, &tensors, &noc).unwrap();

        let edge = analysis.num_spatial_edge_clusters();
        prop_assert!(edge >= 1 && edge <= width);
        if size <= tile {
            prop_assert_eq!(edge, 1);
        }
        prop_assert!(analysis.num_edge_spatial_iterations() <= 1);
    }

    /// The spatial iteration count is the plain sweep count ceil(S / (O*C)).
    #[test]
    fn spatial_iterations_are_sweep_count(
        size in 1u64..512,
        tile in 1u64..48,
        stride in 1u64..48,
        width in 1u64..24,
    ) {
        let (dims, dataflow) = single_spatial(size, tile, stride);
        let tensors = TensorTable::new();
        let noc = NetworkOnChipModel::default();
        let analysis =
            ClusterAnalysis::new(0, width, &dataflow, &dims, &tensors, &noc).unwrap();

        prop_assert_eq!(
            analysis.num_spatial_iterations(),
            ceil(size, stride * width)
        );
    }

    /// Total iteration count equals the independently computed per-directive
    /// product, and repeated calls agree.
    #[test]
    fn total_iterations_equal_independent_product(
        m in 1u64..300, n in 1u64..300, k in 1u64..300,
        tm in 1u64..24, tn in 1u64..24, tk in 1u64..24,
        width in 1u64..12,
    ) {
        let mut dims = DimensionTable::new();
        dims.insert(Dimension::new("M", m));
        dims.insert(Dimension::new("N", n));
        dims.insert(Dimension::new("K", k));
        let dataflow = DirectiveTable::from_directives(vec![
            Directive::spatial("M", tm, tm),
            Directive::temporal("N", tn, tn),
            Directive::temporal("K", tk, tk),
        ]);
        let tensors = TensorTable::new();
        let noc = NetworkOnChipModel::default();
        let analysis =
            ClusterAnalysis::new(0, width, &dataflow, &dims, &tensors, &noc).unwrap();

        let expected = ceil(m, tm * width) * ceil(n, tn) * ceil(k, tk);
        prop_assert_eq!(analysis.num_total_iterations().unwrap(), expected);
        prop_assert_eq!(
            analysis.num_total_iterations().unwrap(),
            analysis.num_total_iterations().unwrap()
        );
    }

    /// mapped = unique + reused on both axes, for every mapped dimension,
    /// including strides wider than the tile (negative reuse).
    #[test]
    fn reuse_sums_to_mapped(
        tile_m in 1u64..32, stride_m in 1u64..32,
        tile_k in 1u64..32, stride_k in 1u64..32,
    ) {
        let mut dims = DimensionTable::new();
        dims.insert(Dimension::new("M", 256));
        dims.insert(Dimension::new("K", 256));
        let dataflow = DirectiveTable::from_directives(vec![
            Directive::spatial("M", tile_m, stride_m),
            Directive::temporal("K", tile_k, stride_k),
        ]);
        let tensors = TensorTable::new();
        let noc = NetworkOnChipModel::default();
        let analysis =
            ClusterAnalysis::new(0, 4, &dataflow, &dims, &tensors, &noc).unwrap();

        for name in ["M", "K"] {
            let r = analysis.reuse(name).unwrap();
            prop_assert_eq!(r.spatial_unique + r.spatial_reused, r.mapped);
            prop_assert_eq!(r.temporal_unique + r.temporal_reused, r.mapped);
        }
    }

    /// Occupancy sweeps never exceed the plain sweep count: steady sweeps
    /// plus the edge sweep stay within ceil(S / (O*C)).
    #[test]
    fn occupancy_sweeps_within_sweep_count(
        size in 1u64..512,
        tile in 1u64..48,
        stride in 1u64..48,
        width in 1u64..24,
    ) {
        let (dims, dataflow) = single_spatial(size, tile, stride);
        let tensors = TensorTable::new();
        let noc = NetworkOnChipModel::default();
        let analysis =
            ClusterAnalysis::new(0, width, &dataflow, &dims, &tensors, &noc).unwrap();

        let steady = analysis.num_steady_spatial_iterations();
        let edge = analysis.num_edge_spatial_iterations();
        prop_assert!(steady + edge >= 1);
        prop_assert!(steady + edge <= analysis.num_spatial_iterations());
    }
}
