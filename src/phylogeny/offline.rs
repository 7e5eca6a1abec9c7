use tracing::{debug, instrument};

use crate::error::{HaploError, Result};
use crate::intervals::IndexedInterval;
use crate::phylogeny::hierarchy::{HierarchyNode, SdpInclusionHierarchy};
use crate::phylogeny::PhylogenyTree;
use crate::sdp::{normalize, Sdp, SdpHashSet};
use crate::variants::{sdp_relative_to, GenotypeCall, StrainGenotypes};

/// Build the perfect phylogeny of one interval directly from per-strain genotype calls.
///
/// SDPs are taken relative to the first strain, normalized, and deduplicated; the all-zero pattern
/// is not a mutation and is skipped. The distinct SDPs are then nested from the largest down, so
/// every SDP is placed below the smallest SDP containing it.
///
/// Fails with [`HaploError::IncompatibleSdps`] if the interval has no perfect phylogeny.
#[instrument(skip_all, fields(strains = strains.len(), %interval))]
pub fn build_phylogenetic_tree(
    strains: &[StrainGenotypes],
    interval: IndexedInterval,
) -> Result<PhylogenyTree> {
    if strains.is_empty() {
        return Err(HaploError::precondition("no strains given"));
    }
    if let Some(short) = strains.iter().find(|s| s.len() <= interval.end()) {
        return Err(HaploError::precondition(format!(
            "strain {} has {} calls, interval {interval} needs {}",
            short.name(),
            short.len(),
            interval.end() + 1
        )));
    }

    let mut distinct = SdpHashSet::default();
    let mut column: Vec<GenotypeCall> = Vec::with_capacity(strains.len());
    for snp in interval.start()..=interval.end() {
        column.clear();
        column.extend(strains.iter().map(|s| s[snp]));
        let sdp = normalize(&sdp_relative_to(&column, 0));
        if !sdp.is_zero() {
            distinct.insert(sdp);
        }
    }

    let mut sdps: Vec<Sdp> = distinct.into_iter().collect();
    sdps.sort_unstable_by(|a, b| b.cmp(a));
    debug!(distinct = sdps.len(), "collected distinct SDPs");

    let mut top_level = Vec::new();
    for sdp in sdps {
        nest(&mut top_level, sdp)?;
    }

    let names: Vec<String> = strains.iter().map(|s| s.name().to_string()).collect();
    Ok(SdpInclusionHierarchy::from_top_level(names.len(), top_level).to_tree(&names))
}

/// Place `sdp` below the deepest node containing it. SDPs arrive in descending order, so an SDP
/// never contains a node that is already placed.
fn nest(siblings: &mut Vec<HierarchyNode>, sdp: Sdp) -> Result<()> {
    for sibling in siblings.iter_mut() {
        if sdp.is_subset_of(sibling.sdp()) {
            return nest(sibling.children_mut(), sdp);
        }
        if sdp.intersects(sibling.sdp()) {
            return Err(HaploError::incompatible(sibling.sdp(), &sdp));
        }
    }
    siblings.push(HierarchyNode::new(sdp, Vec::new()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use GenotypeCall::*;

    fn strain(name: &str, calls: &str) -> StrainGenotypes {
        StrainGenotypes::new(
            name,
            calls
                .chars()
                .map(|c| match c {
                    'A' => A,
                    'B' => B,
                    'H' => Heterozygous,
                    _ => NoCall,
                })
                .collect(),
        )
    }

    #[test]
    fn builds_chain_from_genotypes() {
        // columns relative to A: 0011, 0001, 0011
        let strains = [
            strain("A", "AAA"),
            strain("B", "AAA"),
            strain("C", "BAB"),
            strain("D", "BBB"),
        ];
        let tree = build_phylogenetic_tree(&strains, IndexedInterval::from_bounds(0, 2)).unwrap();
        let root = tree.node(tree.root());
        assert_eq!(root.strains(), &["A".to_string(), "B".to_string()]);
        assert_eq!(root.edges().len(), 1);
        assert_eq!(root.edges()[0].sdp().to_string(), "0011");
        assert_eq!(tree.node_count(), 3);
    }

    #[test]
    fn only_the_interval_is_used() {
        let strains = [strain("A", "AAB"), strain("B", "ABA"), strain("C", "BBA")];
        let tree = build_phylogenetic_tree(&strains, IndexedInterval::from_bounds(0, 0)).unwrap();
        assert_eq!(tree.node(tree.root()).strains(), &["A".to_string(), "B".to_string()]);
        assert_eq!(tree.node_count(), 2);
    }

    #[test]
    fn missing_calls_do_not_create_mutations() {
        let strains = [strain("A", "AA"), strain("B", "NA"), strain("C", "AH")];
        let tree = build_phylogenetic_tree(&strains, IndexedInterval::from_bounds(0, 1)).unwrap();
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.all_strains().len(), 3);
    }

    #[test]
    fn incompatible_columns_fail() {
        // 0011 and 0110
        let strains = [
            strain("A", "AA"),
            strain("B", "AB"),
            strain("C", "BB"),
            strain("D", "BA"),
        ];
        let error =
            build_phylogenetic_tree(&strains, IndexedInterval::from_bounds(0, 1)).unwrap_err();
        assert!(error.is_incompatibility());
    }

    #[test]
    fn short_strains_are_rejected() {
        let strains = [strain("A", "AA"), strain("B", "A")];
        assert!(matches!(
            build_phylogenetic_tree(&strains, IndexedInterval::from_bounds(0, 1)),
            Err(HaploError::Precondition { .. })
        ));
        assert!(build_phylogenetic_tree(&[], IndexedInterval::from_bounds(0, 0)).is_err());
    }
}
