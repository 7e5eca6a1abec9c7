use tracing::{debug, instrument, trace};

use crate::config::HaplotypeBlockConfig;
use crate::error::Result;
use crate::haplotypes::physical_span;
use crate::intervals::{IndexedInterval, PhysicalInterval};
use crate::sdp::{Sdp, SdpHashMap};
use crate::streams::{check_lockstep, SdpStream, SnpPositionStream};
use crate::variants::{ChromosomeId, SequencePosition};

/// A group of strains that share one haplotype across a run of consecutive SNPs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HaplotypeBlock {
    snps: IndexedInterval,
    physical: PhysicalInterval,
    strains: Sdp,
}

impl HaplotypeBlock {
    pub fn snps(&self) -> IndexedInterval {
        self.snps
    }

    pub fn physical(&self) -> PhysicalInterval {
        self.physical
    }

    /// The strains of the block, as a bit set over the stream's strain order
    pub fn strains(&self) -> &Sdp {
        &self.strains
    }
}

/// Where a candidate group started agreeing
#[derive(Clone, Copy, Debug)]
struct Anchor {
    index: usize,
    position: SequencePosition,
}

/// Collects the runs of groups that ended, dropping those that are too short.
struct BlockCollector {
    chromosome: ChromosomeId,
    min_snp_count: usize,
    blocks: Vec<HaplotypeBlock>,
}

impl BlockCollector {
    fn close(&mut self, strains: Sdp, anchor: Anchor, end: usize, end_position: SequencePosition) {
        let snps = IndexedInterval::from_bounds(anchor.index, end);
        if snps.extent() < self.min_snp_count {
            return;
        }
        trace!(%snps, %strains, "haplotype block");
        self.blocks.push(HaplotypeBlock {
            snps,
            physical: physical_span(self.chromosome, anchor.position, end_position),
            strains,
        });
    }
}

/// Track groups of strains whose calls agree SNP after SNP, and report each group's run once an SNP
/// splits it.
///
/// Every SDP and its complement seed candidate groups. At each SNP a candidate either lies on one
/// side of the SDP and lives on, or is split: its run ends at the previous SNP, and each side that
/// still has at least `min_strain_count` strains continues as a candidate anchored at the split
/// group's start. Runs covering at least `min_snp_count` SNPs are reported, including those still
/// alive when the stream ends. Blocks are ordered by start index, then end index.
#[instrument(skip_all, fields(sdps = sdps.sdp_count(), min_snps = config.min_snp_count))]
pub fn estimate_haplotype_blocks(
    sdps: &mut dyn SdpStream,
    positions: &mut dyn SnpPositionStream,
    config: &HaplotypeBlockConfig,
) -> Result<Vec<HaplotypeBlock>> {
    config.validate()?;
    check_lockstep(sdps, positions)?;

    let mut collector = BlockCollector {
        chromosome: positions.chromosome(),
        min_snp_count: config.min_snp_count,
        blocks: Vec::new(),
    };
    let mut candidates: SdpHashMap<Sdp, Anchor> = SdpHashMap::default();
    let mut previous_position = None;
    let mut index = 0;

    while sdps.has_next() {
        let sdp = sdps.next_sdp()?;
        let position = positions.next_position()?;
        let complement = sdp.complement();

        let mut split = Vec::new();
        let mut spawned: Vec<(Sdp, Anchor)> = Vec::new();
        for (group, anchor) in candidates.iter() {
            let same = group.intersection(&sdp);
            let other = group.intersection(&complement);
            if same.is_zero() || other.is_zero() {
                continue;
            }

            split.push(group.clone());
            for part in [same, other] {
                if part.count_ones() >= config.min_strain_count {
                    spawned.push((part, *anchor));
                }
            }
        }

        if let Some(end_position) = previous_position {
            for group in split {
                if let Some(anchor) = candidates.remove(&group) {
                    collector.close(group, anchor, index - 1, end_position);
                }
            }
        }

        for (part, anchor) in spawned {
            candidates
                .entry(part)
                .and_modify(|existing| {
                    if anchor.index < existing.index {
                        *existing = anchor;
                    }
                })
                .or_insert(anchor);
        }

        for group in [sdp, complement] {
            if group.is_zero() || group.is_full() || group.count_ones() < config.min_strain_count {
                continue;
            }
            candidates.entry(group).or_insert(Anchor { index, position });
        }

        previous_position = Some(position);
        index += 1;
    }

    if let Some(end_position) = previous_position {
        for (group, anchor) in candidates.drain() {
            collector.close(group, anchor, index - 1, end_position);
        }
    }

    let mut blocks = collector.blocks;
    blocks.sort_by(|a, b| {
        (a.snps.start(), a.snps.end())
            .cmp(&(b.snps.start(), b.snps.end()))
            .then_with(|| b.strains.cmp(&a.strains))
    });
    debug!(blocks = blocks.len(), "haplotype block estimation finished");
    Ok(blocks)
}
