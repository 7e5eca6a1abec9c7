use tracing::{debug, instrument};

use crate::config::IbsConfig;
use crate::error::{HaploError, Result};
use crate::haplotypes::physical_span;
use crate::intervals::{IndexedInterval, PhysicalInterval};
use crate::streams::{check_lockstep, SdpStream, SnpPositionStream};
use crate::variants::{ChromosomeId, SequencePosition, StrainGenotypes};

/// A run of consecutive SNPs at which a strain carries the same allele as the reference strain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IbsRun {
    strain: String,
    snps: IndexedInterval,
    physical: PhysicalInterval,
    snp_count: usize,
}

impl IbsRun {
    /// The strain compared against the reference
    pub fn strain(&self) -> &str {
        &self.strain
    }

    pub fn snps(&self) -> IndexedInterval {
        self.snps
    }

    pub fn physical(&self) -> PhysicalInterval {
        self.physical
    }

    /// Number of SNPs supporting the run. Equals the extent of [`Self::snps`] unless uninformative
    /// calls were skipped.
    pub fn snp_count(&self) -> usize {
        self.snp_count
    }
}

/// A run that is still matching
#[derive(Clone, Copy, Debug)]
struct OpenRun {
    start: usize,
    start_position: SequencePosition,
    end: usize,
    end_position: SequencePosition,
    snp_count: usize,
}

impl OpenRun {
    fn new(index: usize, position: SequencePosition) -> Self {
        Self {
            start: index,
            start_position: position,
            end: index,
            end_position: position,
            snp_count: 1,
        }
    }

    fn extend(&mut self, index: usize, position: SequencePosition) {
        self.end = index;
        self.end_position = position;
        self.snp_count += 1;
    }

    fn close(self, strain: &str, chromosome: ChromosomeId, config: &IbsConfig) -> Option<IbsRun> {
        let physical = physical_span(chromosome, self.start_position, self.end_position);
        if self.snp_count < config.min_snp_count || physical.extent() < config.min_base_pair_extent
        {
            return None;
        }
        Some(IbsRun {
            strain: strain.to_string(),
            snps: IndexedInterval::from_bounds(self.start, self.end),
            physical,
            snp_count: self.snp_count,
        })
    }
}

/// Find the runs over which each comparison strain is identical by state with the reference strain.
///
/// A strain matches at an SNP if its SDP bit equals the reference strain's bit. A mismatch ends the
/// current run, which is reported if it spans at least `min_snp_count` SNPs and
/// `min_base_pair_extent` base pairs; runs still open at the end of the stream are reported under
/// the same thresholds. Runs are ordered by start index, then by the order of `comparisons`.
///
/// Reference and comparison strains are columns of the same stream. SDPs carry no missing-data
/// state: a strain without a homozygous call has its bit unset, as has every strain at an SNP where
/// the reference lacks one, so such SNPs count as matches here. Use [`find_pairwise_ibs_runs`] on
/// the calls when they should be skipped instead.
#[instrument(skip_all, fields(sdps = sdps.sdp_count(), reference = reference, comparisons = comparisons.len()))]
pub fn find_ibs_runs(
    sdps: &mut dyn SdpStream,
    positions: &mut dyn SnpPositionStream,
    reference: usize,
    comparisons: &[usize],
    config: &IbsConfig,
) -> Result<Vec<IbsRun>> {
    config.validate()?;
    check_lockstep(sdps, positions)?;
    let strain_count = sdps.strain_count();
    if let Some(&outside) = std::iter::once(&reference)
        .chain(comparisons)
        .find(|&&strain| strain >= strain_count)
    {
        return Err(HaploError::precondition(format!(
            "strain {outside} is not one of the stream's {strain_count} strains"
        )));
    }

    let names: Vec<String> = comparisons
        .iter()
        .map(|&strain| sdps.strain_names()[strain].clone())
        .collect();
    let chromosome = positions.chromosome();
    let mut open: Vec<Option<OpenRun>> = vec![None; comparisons.len()];
    let mut runs: Vec<(usize, IbsRun)> = Vec::new();
    let mut index = 0;

    while sdps.has_next() {
        let sdp = sdps.next_sdp()?;
        let position = positions.next_position()?;
        let reference_bit = sdp.get(reference);

        for (slot, &strain) in comparisons.iter().enumerate() {
            if sdp.get(strain) == reference_bit {
                match open[slot].as_mut() {
                    Some(run) => run.extend(index, position),
                    None => open[slot] = Some(OpenRun::new(index, position)),
                }
            } else if let Some(run) = open[slot].take() {
                runs.extend(run.close(&names[slot], chromosome, config).map(|r| (slot, r)));
            }
        }
        index += 1;
    }

    for (slot, run) in open.into_iter().enumerate() {
        if let Some(run) = run {
            runs.extend(run.close(&names[slot], chromosome, config).map(|r| (slot, r)));
        }
    }

    runs.sort_by_key(|(slot, run)| (run.snps.start(), *slot));
    debug!(runs = runs.len(), "IBS scan finished");
    Ok(runs.into_iter().map(|(_, run)| run).collect())
}

/// Find the runs over which strain `b` is identical by state with strain `a`, comparing their calls
/// directly. SNPs where either strain lacks a homozygous call neither extend nor break a run.
pub fn find_pairwise_ibs_runs(
    a: &StrainGenotypes,
    b: &StrainGenotypes,
    positions: &[SequencePosition],
    chromosome: ChromosomeId,
    config: &IbsConfig,
) -> Result<Vec<IbsRun>> {
    config.validate()?;
    if a.len() != b.len() || a.len() != positions.len() {
        return Err(HaploError::precondition(format!(
            "strains {} ({} calls) and {} ({} calls) do not match {} positions",
            a.name(),
            a.len(),
            b.name(),
            b.len(),
            positions.len()
        )));
    }

    let mut runs = Vec::new();
    let mut open: Option<OpenRun> = None;
    for (index, ((call_a, call_b), &position)) in a.iter().zip(b.iter()).zip(positions).enumerate() {
        if !call_a.is_informative() || !call_b.is_informative() {
            continue;
        }
        if call_a == call_b {
            match open.as_mut() {
                Some(run) => run.extend(index, position),
                None => open = Some(OpenRun::new(index, position)),
            }
        } else if let Some(run) = open.take() {
            runs.extend(run.close(b.name(), chromosome, config));
        }
    }
    if let Some(run) = open {
        runs.extend(run.close(b.name(), chromosome, config));
    }
    Ok(runs)
}
