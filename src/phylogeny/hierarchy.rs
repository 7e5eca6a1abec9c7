use crate::error::{HaploError, Result};
use crate::phylogeny::tree::{NodeId, PhylogenyTree};
use crate::sdp::Sdp;

/// Edge length assigned to every mutation edge of an inferred tree
pub(crate) const MUTATION_EDGE_LENGTH: f64 = 1.0;

/// A normalized SDP together with the SDPs nested strictly inside it. Children are pairwise
/// disjoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HierarchyNode {
    sdp: Sdp,
    children: Vec<HierarchyNode>,
}

impl HierarchyNode {
    pub(crate) fn new(sdp: Sdp, children: Vec<HierarchyNode>) -> Self {
        Self { sdp, children }
    }

    pub fn sdp(&self) -> &Sdp {
        &self.sdp
    }

    pub fn children(&self) -> &[HierarchyNode] {
        &self.children
    }

    pub(crate) fn children_mut(&mut self) -> &mut Vec<HierarchyNode> {
        &mut self.children
    }
}

/// The nesting structure of a growing set of pairwise compatible, normalized SDPs. Top-level nodes
/// are pairwise disjoint and implicitly hang from a root that holds every strain.
#[derive(Clone, Debug)]
pub struct SdpInclusionHierarchy {
    strain_count: usize,
    top_level: Vec<HierarchyNode>,
}

impl SdpInclusionHierarchy {
    pub fn new(strain_count: usize) -> Self {
        Self {
            strain_count,
            top_level: Vec::new(),
        }
    }

    pub(crate) fn from_top_level(strain_count: usize, top_level: Vec<HierarchyNode>) -> Self {
        Self {
            strain_count,
            top_level,
        }
    }

    pub fn top_level(&self) -> &[HierarchyNode] {
        &self.top_level
    }

    /// Insert a normalized SDP. Inserting an SDP that is already present does nothing. Fails with
    /// [`HaploError::IncompatibleSdps`] if the SDP partially overlaps one that is already
    /// present, in which case the hierarchy is left as it was.
    pub fn insert(&mut self, sdp: Sdp) -> Result<()> {
        debug_assert_eq!(sdp.strain_count(), self.strain_count);
        debug_assert!(!sdp.is_zero(), "the empty SDP is not a mutation");
        insert_into(&mut self.top_level, sdp)
    }

    /// Convert the hierarchy into a tree. Each node receives the strains of its SDP that none of
    /// its children claim; the root receives the strains no top-level SDP claims.
    ///
    /// # Panics
    /// If `strain_names` does not name every strain of the hierarchy
    pub fn to_tree(&self, strain_names: &[String]) -> PhylogenyTree {
        assert_eq!(
            strain_names.len(),
            self.strain_count,
            "hierarchy and strain names disagree on the strain count"
        );

        let root_strains = unclaimed_strains(
            &Sdp::ones(self.strain_count),
            &self.top_level,
            strain_names,
        );
        let mut tree = PhylogenyTree::with_root(strain_names.to_vec(), root_strains);
        let root = tree.root();
        for node in &self.top_level {
            attach(&mut tree, root, node, strain_names);
        }
        tree
    }
}

fn insert_into(siblings: &mut Vec<HierarchyNode>, sdp: Sdp) -> Result<()> {
    for i in 0..siblings.len() {
        let existing = &siblings[i].sdp;
        if *existing == sdp {
            return Ok(());
        }
        if sdp.is_proper_subset_of(existing) {
            return insert_into(&mut siblings[i].children, sdp);
        }
        if existing.is_proper_subset_of(&sdp) {
            return absorb_siblings(siblings, i, sdp);
        }
        if !existing.is_disjoint(&sdp) {
            return Err(HaploError::incompatible(existing, &sdp));
        }
    }

    siblings.push(HierarchyNode::new(sdp, Vec::new()));
    Ok(())
}

/// `sdp` is a strict superset of `siblings[first]`. It replaces that sibling and adopts every other
/// sibling it contains.
fn absorb_siblings(siblings: &mut Vec<HierarchyNode>, first: usize, sdp: Sdp) -> Result<()> {
    if let Some(conflict) = siblings
        .iter()
        .find(|s| !s.sdp.is_subset_of(&sdp) && !s.sdp.is_disjoint(&sdp))
    {
        return Err(HaploError::incompatible(&conflict.sdp, &sdp));
    }

    let mut parent = HierarchyNode::new(sdp, Vec::new());
    let mut kept = Vec::with_capacity(siblings.len());
    for (i, sibling) in std::mem::take(siblings).into_iter().enumerate() {
        if i == first {
            kept.push(None);
        }
        if sibling.sdp.is_subset_of(&parent.sdp) {
            parent.children.push(sibling);
        } else {
            kept.push(Some(sibling));
        }
    }
    *siblings = kept
        .into_iter()
        .map(|slot| slot.unwrap_or_else(|| parent.clone()))
        .collect();
    Ok(())
}

fn unclaimed_strains(sdp: &Sdp, children: &[HierarchyNode], strain_names: &[String]) -> Vec<String> {
    let claimed = children
        .iter()
        .fold(Sdp::zeros(sdp.strain_count()), |acc, child| acc.union(&child.sdp));
    sdp.difference(&claimed)
        .iter_ones()
        .map(|strain| strain_names[strain].clone())
        .collect()
}

fn attach(tree: &mut PhylogenyTree, parent: NodeId, node: &HierarchyNode, strain_names: &[String]) {
    let strains = unclaimed_strains(&node.sdp, &node.children, strain_names);
    let id = tree.add_child(parent, node.sdp.clone(), MUTATION_EDGE_LENGTH, strains);
    for child in &node.children {
        attach(tree, id, child, strain_names);
    }
}
