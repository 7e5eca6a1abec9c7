use std::collections::VecDeque;

use tracing::{debug, instrument};

use crate::config::{SlidingWindowConfig, WindowStep};
use crate::error::Result;
use crate::haplotypes::physical_span;
use crate::intervals::{IndexedInterval, PhysicalInterval};
use crate::sdp::Sdp;
use crate::streams::{check_lockstep, SdpStream, SnpPositionStream};
use crate::variants::{ChromosomeId, SequencePosition};

/// A run of SNPs over which the strains fall into the same haplotype groups.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WindowPartition {
    snps: IndexedInterval,
    physical: PhysicalInterval,
    group_ids: Vec<u32>,
}

impl WindowPartition {
    pub fn snps(&self) -> IndexedInterval {
        self.snps
    }

    pub fn physical(&self) -> PhysicalInterval {
        self.physical
    }

    /// Haplotype group of every strain. Groups are numbered in order of their first strain, so the
    /// first strain is always in group 0.
    pub fn group_ids(&self) -> &[u32] {
        &self.group_ids
    }

    pub fn group_count(&self) -> usize {
        self.group_ids.iter().max().map_or(0, |&max| max as usize + 1)
    }
}

/// Refine the single all-strain group by every SDP of the window. Each SDP splits a group into the
/// strains agreeing with the group's first member and the rest.
fn partition_window<'a>(strain_count: usize, window: impl Iterator<Item = &'a Sdp>) -> Vec<u32> {
    let mut groups: Vec<Vec<usize>> = vec![(0..strain_count).collect()];
    for sdp in window {
        let mut refined = Vec::with_capacity(groups.len() * 2);
        for group in groups {
            let reference = sdp.get(group[0]);
            let (agree, differ): (Vec<usize>, Vec<usize>) =
                group.into_iter().partition(|&strain| sdp.get(strain) == reference);
            refined.push(agree);
            if !differ.is_empty() {
                refined.push(differ);
            }
        }
        groups = refined;
    }

    let mut group_of = vec![0; strain_count];
    for (group_index, group) in groups.iter().enumerate() {
        for &strain in group {
            group_of[strain] = group_index;
        }
    }

    // renumber by first strain
    let mut renumbered: Vec<Option<u32>> = vec![None; groups.len()];
    let mut next_id = 0;
    group_of
        .into_iter()
        .map(|group| {
            *renumbered[group].get_or_insert_with(|| {
                next_id += 1;
                next_id - 1
            })
        })
        .collect()
}

struct WindowCollector {
    chromosome: ChromosomeId,
    strain_count: usize,
    partitions: Vec<WindowPartition>,
}

impl WindowCollector {
    /// Emit the window ending at SNP `end`. The window claims only the SNPs after the previous
    /// partition, and is merged into that partition if the groups are identical.
    fn emit(&mut self, window: &VecDeque<(Sdp, SequencePosition)>, end: usize) {
        let Some((_, last)) = window.back() else {
            return;
        };
        let window_start = end + 1 - window.len();
        let group_ids = partition_window(self.strain_count, window.iter().map(|(sdp, _)| sdp));

        if let Some(previous) = self.partitions.last_mut() {
            if previous.group_ids == group_ids {
                previous.snps = IndexedInterval::from_bounds(previous.snps.start(), end);
                previous.physical = physical_span(self.chromosome, previous.physical.start(), *last);
                return;
            }
        }

        let start = self
            .partitions
            .last()
            .map_or(window_start, |previous| previous.snps.end() + 1);
        let (_, first) = &window[start - window_start];
        self.partitions.push(WindowPartition {
            snps: IndexedInterval::from_bounds(start, end),
            physical: physical_span(self.chromosome, *first, *last),
            group_ids,
        });
    }
}

/// Partition the strains into haplotype groups within a window sliding along the stream.
///
/// With [`WindowStep::OneSnp`] the window advances one SNP at a time; with
/// [`WindowStep::WholeWindow`] consecutive windows do not overlap and a shorter final window covers
/// the remaining SNPs. A stream shorter than the window yields a single window over the whole
/// stream. Consecutive windows with identical groups are merged into one partition.
///
/// The partitions tile the stream without overlap. The first window covers its full span, every
/// later window is attributed to the SNPs it adds, so with [`WindowStep::OneSnp`] a window is
/// tagged by its end SNP.
#[instrument(skip_all, fields(sdps = sdps.sdp_count(), window = config.window_size))]
pub fn estimate_sliding_window_partitions(
    sdps: &mut dyn SdpStream,
    positions: &mut dyn SnpPositionStream,
    config: &SlidingWindowConfig,
) -> Result<Vec<WindowPartition>> {
    config.validate()?;
    check_lockstep(sdps, positions)?;

    let mut collector = WindowCollector {
        chromosome: positions.chromosome(),
        strain_count: sdps.strain_count(),
        partitions: Vec::new(),
    };
    let mut window: VecDeque<(Sdp, SequencePosition)> = VecDeque::with_capacity(config.window_size);
    let mut emitted_any = false;
    let mut index = 0;

    while sdps.has_next() {
        let sdp = sdps.next_sdp()?;
        let position = positions.next_position()?;
        window.push_back((sdp, position));
        index += 1;

        if window.len() == config.window_size {
            collector.emit(&window, index - 1);
            emitted_any = true;
            match config.step {
                WindowStep::OneSnp => {
                    window.pop_front();
                }
                WindowStep::WholeWindow => window.clear(),
            }
        }
    }

    let trailing_window = match config.step {
        WindowStep::OneSnp => !emitted_any,
        WindowStep::WholeWindow => true,
    };
    if trailing_window && !window.is_empty() {
        collector.emit(&window, index - 1);
    }

    debug!(
        partitions = collector.partitions.len(),
        "sliding window estimation finished"
    );
    Ok(collector.partitions)
}
