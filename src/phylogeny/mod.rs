//! Perfect phylogenies of compatible intervals.
//!
//! Two builders produce the same trees:
//! - [`infer_perfect_phylogenies`] consumes a forward SDP stream once and builds the trees of many
//!   (possibly overlapping) intervals side by side
//! - [`build_phylogenetic_tree`] builds a single interval's tree from per-strain genotype calls
//!
//! Both nest normalized SDPs into an [`SdpInclusionHierarchy`] and convert it into a
//! [`PhylogenyTree`], where every node holds the strains its incoming mutation is most specific for.

mod hierarchy;
mod newick;
mod offline;
mod streaming;
mod tree;

pub use hierarchy::{HierarchyNode, SdpInclusionHierarchy};
pub use offline::build_phylogenetic_tree;
pub use streaming::infer_perfect_phylogenies;
pub use tree::{NodeId, PhylogenyEdge, PhylogenyNode, PhylogenyTree};
