//! Index-based and physical genome intervals, and the conversion between them.

use std::fmt::{Display, Formatter};

use tracing::instrument;

use crate::error::{HaploError, Result};
use crate::streams::SnpPositionStream;
use crate::variants::{ChromosomeId, SequencePosition};

/// An interval of SNP indices (ordinal positions in a stream). Both ends are inclusive.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct IndexedInterval {
    start: usize,
    extent: usize,
}

impl IndexedInterval {
    /// Create an interval from its first index and the number of SNPs it spans.
    ///
    /// # Panics
    /// If `extent` is zero
    pub fn new(start: usize, extent: usize) -> Self {
        assert!(extent > 0, "intervals span at least one SNP");
        Self { start, extent }
    }

    /// Create an interval from its first and last index, both inclusive.
    pub fn from_bounds(start: usize, end: usize) -> Self {
        assert!(end >= start, "interval end {end} lies before start {start}");
        Self::new(start, end - start + 1)
    }

    pub fn start(&self) -> usize {
        self.start
    }

    /// Number of SNPs in the interval
    pub fn extent(&self) -> usize {
        self.extent
    }

    /// Last index of the interval (inclusive)
    pub fn end(&self) -> usize {
        self.start + self.extent - 1
    }

    pub fn contains_index(&self, index: usize) -> bool {
        index >= self.start && index <= self.end()
    }

    /// Whether `other` lies completely within this interval
    pub fn contains(&self, other: &IndexedInterval) -> bool {
        other.start >= self.start && other.end() <= self.end()
    }

    pub fn intersects(&self, other: &IndexedInterval) -> bool {
        self.start <= other.end() && other.start <= self.end()
    }

    /// Map an interval found on a stream read back-to-front onto forward indices.
    pub(crate) fn reversed(&self, total: usize) -> Self {
        Self::new(total - self.start - self.extent, self.extent)
    }
}

impl Display for IndexedInterval {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end())
    }
}

/// An interval of base-pair positions on one chromosome. Both ends are inclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct PhysicalInterval {
    chromosome: ChromosomeId,
    start: SequencePosition,
    extent: u64,
}

impl PhysicalInterval {
    pub fn new(chromosome: ChromosomeId, start: SequencePosition, extent: u64) -> Self {
        assert!(extent > 0, "intervals span at least one base pair");
        Self {
            chromosome,
            start,
            extent,
        }
    }

    pub fn chromosome(&self) -> ChromosomeId {
        self.chromosome
    }

    pub fn start(&self) -> SequencePosition {
        self.start
    }

    /// Number of base pairs in the interval
    pub fn extent(&self) -> u64 {
        self.extent
    }

    /// Last base pair of the interval (inclusive)
    pub fn end(&self) -> SequencePosition {
        SequencePosition::from_u64(self.start.unwrap() + self.extent - 1)
    }
}

impl Display for PhysicalInterval {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "chr{}:{}-{}", self.chromosome, self.start, self.end())
    }
}

/// Convert SNP index intervals into base-pair intervals by reading the position stream once.
///
/// The intervals must be ordered by ascending end index, so a single left-to-right read of the
/// position stream resolves all of them. The result is sorted by start position.
///
/// Only left-to-right reads are supported: position streams are read forward, in lockstep with
/// forward SDP streams, so intervals found on a reverse stream have to be remapped with their
/// ends ascending first. Intervals ordered by descending end are rejected.
#[instrument(skip_all, fields(intervals = intervals.len()))]
pub fn to_ordered_physical_intervals(
    intervals: &[IndexedInterval],
    positions: &mut dyn SnpPositionStream,
) -> Result<Vec<PhysicalInterval>> {
    if !intervals.windows(2).all(|w| w[0].end() <= w[1].end()) {
        return Err(HaploError::precondition(
            "intervals must be ordered by end index",
        ));
    }
    if let Some(last) = intervals.last() {
        if last.end() >= positions.position_count() {
            return Err(HaploError::precondition(format!(
                "interval {last} lies outside of the {} available positions",
                positions.position_count()
            )));
        }
    }

    let chromosome = positions.chromosome();
    let mut read = Vec::with_capacity(intervals.last().map_or(0, |i| i.end() + 1));
    let mut physical = Vec::with_capacity(intervals.len());
    for interval in intervals {
        while read.len() <= interval.end() {
            read.push(positions.next_position()?);
        }

        let start = read[interval.start()];
        let end = read[interval.end()];
        physical.push(PhysicalInterval::new(chromosome, start, start.extent_to(end)));
    }

    physical.sort_by_key(|p| (p.start, p.extent));
    Ok(physical)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::streams::InMemoryPositionStream;

    #[test]
    fn indexed_interval_bounds_are_inclusive() {
        let i = IndexedInterval::from_bounds(3, 7);
        assert_eq!(i.extent(), 5);
        assert_eq!(i.end(), 7);
        assert!(i.contains_index(7));
        assert!(!i.contains_index(8));
        assert!(i.contains(&IndexedInterval::from_bounds(4, 7)));
        assert!(i.intersects(&IndexedInterval::from_bounds(7, 9)));
        assert!(!i.intersects(&IndexedInterval::from_bounds(8, 9)));
    }

    #[test]
    fn reversed_intervals_map_back_to_forward_indices() {
        // the first two SNPs of a reversed stream of 10 are SNPs 9 and 8
        assert_eq!(
            IndexedInterval::new(0, 2).reversed(10),
            IndexedInterval::from_bounds(8, 9)
        );
        assert_eq!(
            IndexedInterval::new(7, 3).reversed(10),
            IndexedInterval::from_bounds(0, 2)
        );
    }

    #[test]
    fn physical_conversion_sorts_by_start() {
        let mut positions = InMemoryPositionStream::new(
            11,
            SequencePosition::from_vec(vec![100, 200, 300, 400, 500]),
        );
        let intervals = [
            IndexedInterval::from_bounds(1, 2),
            IndexedInterval::from_bounds(0, 3),
            IndexedInterval::from_bounds(3, 4),
        ];
        let physical = to_ordered_physical_intervals(&intervals, &mut positions).unwrap();

        assert_eq!(physical.len(), 3);
        assert_eq!(physical[0].start().unwrap(), 100);
        assert_eq!(physical[0].extent(), 301);
        assert_eq!(physical[1].start().unwrap(), 200);
        assert_eq!(physical[1].end().unwrap(), 300);
        assert_eq!(physical[2].chromosome(), 11);
        assert_eq!(physical[2].to_string(), "chr11:400-500");
    }

    #[test]
    fn physical_conversion_requires_end_order() {
        let mut positions =
            InMemoryPositionStream::new(1, SequencePosition::from_vec(vec![1, 2, 3]));
        let intervals = [
            IndexedInterval::from_bounds(0, 2),
            IndexedInterval::from_bounds(0, 1),
        ];
        assert!(matches!(
            to_ordered_physical_intervals(&intervals, &mut positions),
            Err(HaploError::Precondition { .. })
        ));
    }
}
