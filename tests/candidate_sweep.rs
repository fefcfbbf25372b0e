//! Batch evaluation of candidate mappings
//!
//! A design-space sweep evaluates many candidate directive sequences against
//! one shared evaluation context. This file verifies the two properties the
//! sweep relies on:
//! 1. Invalid candidates surface as typed errors and are skipped without
//!    aborting the run.
//! 2. Independent analyzers share no mutable state, so a rayon-parallel
//!    sweep produces exactly the sequential results.

use mapscope::{
    ClusterAnalysis, ConfigurationError, Dimension, DimensionTable, Directive, DirectiveTable,
    NetworkOnChipModel, TensorTable,
};
use rayon::prelude::*;

fn context() -> (DimensionTable, TensorTable, NetworkOnChipModel) {
    let mut dims = DimensionTable::new();
    dims.insert(Dimension::new("M", 96));
    dims.insert(Dimension::new("N", 64));
    dims.insert(Dimension::new("K", 48));
    (dims, TensorTable::new(), NetworkOnChipModel::new(8, 2, true))
}

/// Tile-size sweep over M/N/K plus two deliberately invalid candidates.
fn candidates() -> Vec<DirectiveTable> {
    let mut sweep = Vec::new();
    for tile_m in [2u64, 4, 8, 16] {
        for tile_k in [4u64, 6, 12] {
            sweep.push(DirectiveTable::from_directives(vec![
                Directive::spatial("M", tile_m, tile_m),
                Directive::temporal("N", 8, 8),
                Directive::temporal("K", tile_k, tile_k),
            ]));
        }
    }
    // no spatial directive at all
    sweep.push(DirectiveTable::from_directives(vec![
        Directive::temporal("M", 4, 4),
        Directive::temporal("N", 8, 8),
    ]));
    // three-way spatial parallelism in one cluster
    sweep.push(DirectiveTable::from_directives(vec![
        Directive::spatial("M", 4, 4),
        Directive::spatial("N", 4, 4),
        Directive::spatial("K", 4, 4),
    ]));
    sweep
}

fn evaluate(
    dataflow: &DirectiveTable,
    dims: &DimensionTable,
    tensors: &TensorTable,
    noc: &NetworkOnChipModel,
) -> Result<(u64, u64, u64), ConfigurationError> {
    let analysis = ClusterAnalysis::new(0, 4, dataflow, dims, tensors, noc)?;
    Ok((
        analysis.num_total_iterations()?,
        analysis.num_spatial_edge_clusters(),
        analysis.num_partial_outputs(),
    ))
}

#[test]
fn invalid_candidates_are_skipped_not_fatal() {
    let _ = env_logger::builder().is_test(true).try_init();
    let (dims, tensors, noc) = context();

    let results: Vec<_> = candidates()
        .iter()
        .map(|dataflow| evaluate(dataflow, &dims, &tensors, &noc))
        .collect();

    let valid = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(valid, 12);
    assert!(results
        .iter()
        .any(|r| matches!(r, Err(ConfigurationError::NoSpatialMap { .. }))));
    assert!(results.iter().any(|r| matches!(
        r,
        Err(ConfigurationError::MultiParallelismInSingleCluster { .. })
    )));
}

#[test]
fn parallel_sweep_matches_sequential_sweep() {
    let (dims, tensors, noc) = context();
    let sweep = candidates();

    let sequential: Vec<_> = sweep
        .iter()
        .map(|dataflow| evaluate(dataflow, &dims, &tensors, &noc))
        .collect();

    let parallel: Vec<_> = sweep
        .par_iter()
        .map(|dataflow| evaluate(dataflow, &dims, &tensors, &noc))
        .collect();

    assert_eq!(sequential, parallel);
}
