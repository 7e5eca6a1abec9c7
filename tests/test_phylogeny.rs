//! The streaming and the offline phylogeny builders agree, and the trees satisfy the structural
//! guarantees callers rely on.

mod common;

use common::{create_genotype_data, RandomGenotypes};
use libhaplo::error::HaploError;
use libhaplo::intervals::IndexedInterval;
use libhaplo::phylogeny::{build_phylogenetic_tree, infer_perfect_phylogenies, PhylogenyTree};
use libhaplo::scan::greedy_scan;

fn sorted(mut strains: Vec<String>) -> Vec<String> {
    strains.sort();
    strains
}

#[test]
fn streaming_and_offline_builders_agree() {
    for seed in 0..40 {
        let mut random = RandomGenotypes::new(seed, 9, 7);
        let data = random.genotype_data(1, 120);
        let strains = data.strains();

        let intervals = greedy_scan(&mut data.sdp_stream()).unwrap();
        let streamed = infer_perfect_phylogenies(&mut data.sdp_stream(), &intervals).unwrap();
        assert_eq!(streamed.len(), intervals.len());

        for (interval, tree) in intervals.iter().zip(&streamed) {
            let offline = build_phylogenetic_tree(&strains, *interval).unwrap();
            assert!(
                tree.create_normalized_tree()
                    .structurally_equal(&offline.create_normalized_tree()),
                "seed {seed}: trees of {interval} differ"
            );
            assert_eq!(tree.node_count(), offline.node_count());
        }
    }
}

#[test]
fn every_strain_appears_exactly_once() {
    for seed in 0..20 {
        let mut random = RandomGenotypes::new(seed, 10, 8);
        let data = random.genotype_data(2, 80);
        let intervals = greedy_scan(&mut data.sdp_stream()).unwrap();
        let trees = infer_perfect_phylogenies(&mut data.sdp_stream(), &intervals).unwrap();

        let expected = sorted(data.strain_names().to_vec());
        for tree in &trees {
            assert_eq!(sorted(tree.all_strains()), expected);

            let resolved = tree.resolve_to_single_strain_leaf_nodes(0.0);
            assert_eq!(resolved.all_leaf_nodes().len(), expected.len());
            assert_eq!(sorted(resolved.all_strains()), expected);

            let collapsed = resolved.remove_non_branching_interior_nodes();
            assert_eq!(sorted(collapsed.all_strains()), expected);
        }
    }
}

#[test]
fn normalization_is_idempotent() {
    for seed in 0..20 {
        let mut random = RandomGenotypes::new(seed, 8, 6);
        let data = random.genotype_data(3, 60);
        let intervals = greedy_scan(&mut data.sdp_stream()).unwrap();
        let trees = infer_perfect_phylogenies(&mut data.sdp_stream(), &intervals).unwrap();

        for tree in &trees {
            let once = tree.create_normalized_tree();
            let twice = once.create_normalized_tree();
            assert!(once.structurally_equal(&twice));

            // the rooting does not matter
            let leaf = *tree.all_leaf_nodes().last().unwrap();
            let rerooted = tree.re_root(leaf).create_normalized_tree();
            assert!(once.structurally_equal(&rerooted));
        }
    }
}

#[test]
fn nested_patterns_give_a_chain() {
    // strains S0..S3, SDPs 1100, 1110, 1100
    let data = create_genotype_data(1, &[[1, 1, 0, 0], [1, 1, 1, 0], [1, 1, 0, 0]]);
    let interval = IndexedInterval::from_bounds(0, 2);

    let trees = infer_perfect_phylogenies(&mut data.sdp_stream(), &[interval]).unwrap();
    let tree = &trees[0];
    let offline = build_phylogenetic_tree(&data.strains(), interval).unwrap();
    assert!(tree.structurally_equal(&offline));

    // rooted at D: D, then C below the 1110 mutation, then A and B below 1100
    let d = tree.all_leaf_nodes()[0];
    assert_eq!(tree.node(d).strains(), &["S3".to_string()]);
    let rooted_at_d = tree.re_root(d);
    let root = rooted_at_d.node(rooted_at_d.root());
    assert_eq!(root.strains(), &["S3".to_string()]);
    let c = rooted_at_d.node(root.edges()[0].child());
    assert_eq!(c.strains(), &["S2".to_string()]);
    let ab = rooted_at_d.node(c.edges()[0].child());
    assert_eq!(sorted(ab.strains().to_vec()), vec!["S0", "S1"]);
    assert!(ab.is_leaf());
}

#[test]
fn pairwise_overlapping_patterns_have_no_phylogeny() {
    // 1100, 0110, 1010: every pair overlaps and none contains another
    let data = create_genotype_data(1, &[[1, 1, 0, 0], [0, 1, 1, 0], [1, 0, 1, 0]]);
    let interval = IndexedInterval::from_bounds(0, 2);

    let offline = build_phylogenetic_tree(&data.strains(), interval);
    assert!(matches!(offline, Err(HaploError::IncompatibleSdps { .. })));

    let streamed = infer_perfect_phylogenies(&mut data.sdp_stream(), &[interval]);
    assert!(streamed.unwrap_err().is_incompatibility());

    // the scans never produce such an interval
    let intervals = greedy_scan(&mut data.sdp_stream()).unwrap();
    assert!(intervals.len() > 1);
}

#[test]
fn pruning_and_newick_output() {
    let data = create_genotype_data(
        1,
        &[[0, 0, 1, 1, 1], [0, 0, 0, 1, 1], [0, 1, 0, 0, 0], [0, 0, 0, 0, 1]],
    );
    let tree: PhylogenyTree =
        build_phylogenetic_tree(&data.strains(), IndexedInterval::from_bounds(0, 3)).unwrap();

    let newick = tree.create_normalized_tree().to_newick();
    assert!(newick.ends_with(';'));
    for strain in data.strain_names() {
        assert_eq!(newick.matches(strain.as_str()).count(), 1, "{newick}");
    }

    let keep = vec!["S0".to_string(), "S4".to_string()];
    let pruned = tree.create_strain_pruned_tree(&keep);
    assert_eq!(sorted(pruned.all_strains()), keep);
    assert!(pruned.node_count() < tree.node_count());
}
