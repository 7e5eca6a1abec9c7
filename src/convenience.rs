//! Whole-chromosome pipelines over in-memory genotype data.

use rayon::prelude::*;
use tracing::{info, instrument};

use crate::error::Result;
use crate::intervals::{to_ordered_physical_intervals, IndexedInterval, PhysicalInterval};
use crate::phylogeny::{infer_perfect_phylogenies, PhylogenyTree};
use crate::scan::max_k_scan;
use crate::variants::GenotypeData;

fn max_k_indexed(data: &GenotypeData) -> Result<Vec<IndexedInterval>> {
    max_k_scan(
        &mut data.sdp_stream(),
        &mut data.reverse_sdp_stream(),
        &mut data.sdp_stream(),
    )
}

/// Run the max-k scan over one chromosome and report the intervals in base pairs.
#[instrument(skip_all, fields(chromosome = data.chromosome(), snps = data.len()))]
pub fn max_k_intervals(data: &GenotypeData) -> Result<Vec<PhysicalInterval>> {
    let intervals = max_k_indexed(data)?;
    to_ordered_physical_intervals(&intervals, &mut data.position_stream())
}

/// Run [`max_k_intervals`] for several chromosomes in parallel. Results are in input order.
pub fn par_max_k_intervals(chromosomes: &[GenotypeData]) -> Result<Vec<Vec<PhysicalInterval>>> {
    let results = chromosomes
        .par_iter()
        .map(max_k_intervals)
        .collect::<Result<Vec<_>>>()?;
    info!(chromosomes = results.len(), "max-k intervals computed");
    Ok(results)
}

/// Compute the max-k intervals of a chromosome and the perfect phylogeny of each of them.
#[instrument(skip_all, fields(chromosome = data.chromosome(), snps = data.len()))]
pub fn max_k_phylogenies(data: &GenotypeData) -> Result<Vec<(PhysicalInterval, PhylogenyTree)>> {
    let intervals = max_k_indexed(data)?;
    let trees = infer_perfect_phylogenies(&mut data.sdp_stream(), &intervals)?;
    let physical = to_ordered_physical_intervals(&intervals, &mut data.position_stream())?;
    Ok(physical.into_iter().zip(trees).collect())
}
