use tracing::{debug, instrument, trace};

use crate::error::{HaploError, Result};
use crate::intervals::IndexedInterval;
use crate::phylogeny::hierarchy::SdpInclusionHierarchy;
use crate::phylogeny::PhylogenyTree;
use crate::sdp::normalize;
use crate::streams::{expect_direction, exhausted, SdpStream, StreamDirection};

/// An interval whose tree is currently being built
struct OpenInterval {
    slot: usize,
    end: usize,
    hierarchy: SdpInclusionHierarchy,
}

/// Infer one perfect phylogeny per interval in a single pass over a forward stream.
///
/// The intervals must be sorted by start index and lie within the stream; they may overlap. All
/// intervals covering a SNP receive its normalized SDP, and a tree is emitted as soon as the scan
/// passes its interval's end. Trees are returned in the order of `intervals`.
///
/// Fails with [`HaploError::IncompatibleSdps`] if any interval contains two incompatible SDPs.
#[instrument(skip_all, fields(intervals = intervals.len(), sdps = stream.sdp_count()))]
pub fn infer_perfect_phylogenies(
    stream: &mut dyn SdpStream,
    intervals: &[IndexedInterval],
) -> Result<Vec<PhylogenyTree>> {
    expect_direction(stream, StreamDirection::Forward, "phylogeny inference")?;
    if let Some(pair) = intervals.windows(2).find(|w| w[0].start() > w[1].start()) {
        return Err(HaploError::precondition(format!(
            "intervals are not sorted by start: {} before {}",
            pair[0], pair[1]
        )));
    }
    if let Some(outside) = intervals.iter().find(|i| i.end() >= stream.sdp_count()) {
        return Err(HaploError::precondition(format!(
            "interval {outside} exceeds the stream of {} SDPs",
            stream.sdp_count()
        )));
    }

    let strain_names = stream.strain_names().to_vec();
    let strain_count = strain_names.len();
    let mut trees: Vec<Option<PhylogenyTree>> = (0..intervals.len()).map(|_| None).collect();
    let mut open: Vec<OpenInterval> = Vec::new();
    let mut next_interval = 0;
    let mut index = 0;

    while next_interval < intervals.len() || !open.is_empty() {
        while let Some(interval) = intervals.get(next_interval) {
            if interval.start() != index {
                break;
            }
            open.push(OpenInterval {
                slot: next_interval,
                end: interval.end(),
                hierarchy: SdpInclusionHierarchy::new(strain_count),
            });
            next_interval += 1;
        }

        if !stream.has_next() {
            return Err(exhausted("SDP"));
        }
        let sdp = normalize(&stream.next_sdp()?);

        if !sdp.is_zero() {
            for interval in open.iter_mut() {
                interval.hierarchy.insert(sdp.clone())?;
            }
        }

        let mut still_open = Vec::with_capacity(open.len());
        for interval in open.drain(..) {
            if interval.end == index {
                trace!(slot = interval.slot, "phylogeny complete");
                trees[interval.slot] = Some(interval.hierarchy.to_tree(&strain_names));
            } else {
                still_open.push(interval);
            }
        }
        open = still_open;
        index += 1;
    }

    debug!(trees = trees.len(), "phylogeny inference finished");
    Ok(trees
        .into_iter()
        .map(|tree| tree.expect("every interval is closed before the scan ends"))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sdp::Sdp;
    use crate::streams::InMemorySdpStream;

    fn stream(patterns: &[&str], strains: &[&str]) -> InMemorySdpStream {
        InMemorySdpStream::forward(
            patterns.iter().map(|p| p.parse::<Sdp>().unwrap()).collect(),
            strains.iter().map(|s| s.to_string()).collect(),
        )
    }

    #[test]
    fn builds_chain_for_nested_patterns() {
        let mut s = stream(&["1100", "1110", "1100"], &["A", "B", "C", "D"]);
        let trees = infer_perfect_phylogenies(&mut s, &[IndexedInterval::from_bounds(0, 2)]).unwrap();
        assert_eq!(trees.len(), 1);

        let tree = &trees[0];
        let root = tree.node(tree.root());
        assert_eq!(root.strains(), &["A".to_string(), "B".to_string()]);
        let c = tree.node(root.edges()[0].child());
        assert_eq!(c.strains(), &["C".to_string()]);
        let d = tree.node(c.edges()[0].child());
        assert_eq!(d.strains(), &["D".to_string()]);
        assert_eq!(tree.node_count(), 3);
    }

    #[test]
    fn overlapping_intervals_get_separate_trees() {
        let mut s = stream(&["0011", "0001", "0110"], &["A", "B", "C", "D"]);
        let intervals = [
            IndexedInterval::from_bounds(0, 1),
            IndexedInterval::from_bounds(1, 2),
        ];
        let trees = infer_perfect_phylogenies(&mut s, &intervals).unwrap();
        assert_eq!(trees.len(), 2);
        assert_eq!(trees[0].node_count(), 3);
        // 0001 and 0110 are siblings below the root
        assert_eq!(trees[1].node(trees[1].root()).edges().len(), 2);
    }

    #[test]
    fn incompatible_interval_fails() {
        let mut s = stream(&["0011", "0001", "0110"], &["A", "B", "C", "D"]);
        let error =
            infer_perfect_phylogenies(&mut s, &[IndexedInterval::from_bounds(0, 2)]).unwrap_err();
        assert!(error.is_incompatibility());
    }

    #[test]
    fn rejects_unsorted_and_out_of_range_intervals() {
        let mut s = stream(&["0011", "0001"], &["A", "B", "C", "D"]);
        let unsorted = [
            IndexedInterval::from_bounds(1, 1),
            IndexedInterval::from_bounds(0, 0),
        ];
        assert!(matches!(
            infer_perfect_phylogenies(&mut s, &unsorted),
            Err(HaploError::Precondition { .. })
        ));

        let mut s = stream(&["0011", "0001"], &["A", "B", "C", "D"]);
        assert!(matches!(
            infer_perfect_phylogenies(&mut s, &[IndexedInterval::from_bounds(1, 2)]),
            Err(HaploError::Precondition { .. })
        ));
    }

    #[test]
    fn monomorphic_sites_are_skipped() {
        let strains = ["A", "B", "C", "D"];
        let mut s = stream(&["0000", "0011", "0000", "0000"], &strains);
        let intervals = [
            IndexedInterval::from_bounds(0, 2),
            IndexedInterval::from_bounds(2, 3),
        ];
        let trees = infer_perfect_phylogenies(&mut s, &intervals).unwrap();

        let mut single = stream(&["0011"], &strains);
        let expected =
            infer_perfect_phylogenies(&mut single, &[IndexedInterval::from_bounds(0, 0)]).unwrap();
        assert!(trees[0].structurally_equal(&expected[0]));
        assert_eq!(trees[0].node_count(), 2);

        // only zero SDPs: every strain sits at the root
        assert_eq!(trees[1].node_count(), 1);
        assert_eq!(trees[1].node(trees[1].root()).strains().len(), 4);
    }

    #[test]
    fn no_intervals_no_trees() {
        let mut s = stream(&["0011"], &["A", "B", "C", "D"]);
        assert!(infer_perfect_phylogenies(&mut s, &[]).unwrap().is_empty());
    }
}
