//! Partition-refinement scanners that group strains sharing a haplotype.
//!
//! - [`estimate_haplotype_blocks`]: open-ended runs of strain groups that agree at every SNP
//! - [`estimate_sliding_window_partitions`]: a full partition of the strains per window
//! - [`find_ibs_runs`] and [`find_pairwise_ibs_runs`]: runs of identity by state with a reference

mod block_estimator;
mod ibs;
mod sliding_window;

pub use block_estimator::{estimate_haplotype_blocks, HaplotypeBlock};
pub use ibs::{find_ibs_runs, find_pairwise_ibs_runs, IbsRun};
pub use sliding_window::{estimate_sliding_window_partitions, WindowPartition};

use crate::intervals::PhysicalInterval;
use crate::variants::{ChromosomeId, SequencePosition};

/// The base pairs from `start` to `end`, both inclusive
fn physical_span(
    chromosome: ChromosomeId,
    start: SequencePosition,
    end: SequencePosition,
) -> PhysicalInterval {
    PhysicalInterval::new(chromosome, start, start.extent_to(end))
}
