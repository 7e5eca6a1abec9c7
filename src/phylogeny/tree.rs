//! Perfect phylogeny trees.
//!
//! Uses arena-style storage: nodes live in a flat `Vec<PhylogenyNode>` and edges refer to their
//! child by [`NodeId`]. Every operation that changes the shape of a tree works on a fresh copy of
//! the arena and returns it, so a caller's tree is never aliased or modified.

use crate::sdp::{Sdp, SdpHashMap, SdpHashSet};

/// Index into the tree's node arena.
pub type NodeId = usize;

/// An edge from a parent node to the child it owns.
#[derive(Clone, Debug, PartialEq)]
pub struct PhylogenyEdge {
    /// The SDP whose mutation separates the child's subtree
    sdp: Sdp,
    length: f64,
    child: NodeId,
}

impl PhylogenyEdge {
    pub fn sdp(&self) -> &Sdp {
        &self.sdp
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn child(&self) -> NodeId {
        self.child
    }
}

/// A node of a phylogeny tree. The strains of a node are the strains whose most specific
/// distinguishing mutation is the node's incoming edge.
#[derive(Clone, Debug, PartialEq)]
pub struct PhylogenyNode {
    strains: Vec<String>,
    edges: Vec<PhylogenyEdge>,
    parent: Option<NodeId>,
}

impl PhylogenyNode {
    pub fn strains(&self) -> &[String] {
        &self.strains
    }

    /// Edges to the children of this node
    pub fn edges(&self) -> &[PhylogenyEdge] {
        &self.edges
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn is_leaf(&self) -> bool {
        self.edges.is_empty()
    }
}

/// A rooted perfect phylogeny over a fixed strain universe.
#[derive(Clone, Debug, PartialEq)]
pub struct PhylogenyTree {
    nodes: Vec<PhylogenyNode>,
    root: NodeId,
    /// Strain names in the bit order of the edge SDPs
    strain_names: Vec<String>,
}

impl PhylogenyTree {
    /// Create a tree consisting of a root holding the given strains. `strain_names` defines the bit
    /// order of all SDPs attached to the tree's edges.
    pub fn with_root(strain_names: Vec<String>, root_strains: Vec<String>) -> Self {
        Self {
            nodes: vec![PhylogenyNode {
                strains: root_strains,
                edges: Vec::new(),
                parent: None,
            }],
            root: 0,
            strain_names,
        }
    }

    /// Add a child below `parent` and return its id.
    ///
    /// # Panics
    /// If `parent` is not a node of this tree
    pub fn add_child(
        &mut self,
        parent: NodeId,
        sdp: Sdp,
        length: f64,
        strains: Vec<String>,
    ) -> NodeId {
        assert!(parent < self.nodes.len(), "parent {parent} out of range");
        debug_assert!(length >= 0.0, "edge lengths are non-negative");
        let id = self.nodes.len();
        self.nodes.push(PhylogenyNode {
            strains,
            edges: Vec::new(),
            parent: Some(parent),
        });
        self.nodes[parent].edges.push(PhylogenyEdge {
            sdp,
            length,
            child: id,
        });
        id
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &PhylogenyNode {
        &self.nodes[id]
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Strain names in the bit order of the edge SDPs
    pub fn strain_names(&self) -> &[String] {
        &self.strain_names
    }

    /// Node ids in pre-order (parent before children, children in edge order).
    pub fn preorder(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            order.push(id);
            for edge in self.nodes[id].edges.iter().rev() {
                stack.push(edge.child);
            }
        }
        order
    }

    /// All strains of the tree, collected in pre-order. Every strain of the universe appears
    /// exactly once.
    pub fn all_strains(&self) -> Vec<String> {
        self.strains_below(self.root)
    }

    /// All strains of the subtree rooted at `node`.
    pub fn strains_below(&self, node: NodeId) -> Vec<String> {
        let strains: Vec<String> = self
            .subtree_preorder(node)
            .into_iter()
            .flat_map(|id| self.nodes[id].strains.iter().cloned())
            .collect();
        debug_assert_eq!(
            strains.iter().collect::<SdpHashSet<_>>().len(),
            strains.len(),
            "strain appears on more than one node"
        );
        strains
    }

    /// All leaf nodes in pre-order
    pub fn all_leaf_nodes(&self) -> Vec<NodeId> {
        self.preorder()
            .into_iter()
            .filter(|&id| self.nodes[id].is_leaf())
            .collect()
    }

    /// Push the strains of every node that holds more than one strain, or holds a strain while
    /// having children, onto new single-strain leaves hanging from that node with the given edge
    /// length. Afterwards every strain sits alone on a leaf.
    pub fn resolve_to_single_strain_leaf_nodes(&self, epsilon: f64) -> PhylogenyTree {
        let mut tree = self.compacted();
        let bit_of: SdpHashMap<&str, usize> = self
            .strain_names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.as_str(), i))
            .collect();

        for id in 0..tree.nodes.len() {
            let node = &tree.nodes[id];
            let needs_resolution =
                node.strains.len() >= 2 || (!node.edges.is_empty() && node.strains.len() == 1);
            if !needs_resolution {
                continue;
            }

            let strains = std::mem::take(&mut tree.nodes[id].strains);
            for strain in strains {
                let sdp = Sdp::from_strain_indices(
                    self.strain_names.len(),
                    bit_of.get(strain.as_str()).copied(),
                );
                tree.add_child(id, sdp, epsilon, vec![strain]);
            }
        }
        tree
    }

    /// Collapse interior nodes that hold no strains and have exactly one child. The child moves up
    /// to the collapsed node's parent and the lengths of the two edges are summed. The root is
    /// kept.
    pub fn remove_non_branching_interior_nodes(&self) -> PhylogenyTree {
        let mut tree = PhylogenyTree::with_root(
            self.strain_names.clone(),
            self.nodes[self.root].strains.clone(),
        );

        let mut stack = vec![(self.root, tree.root)];
        while let Some((old, new)) = stack.pop() {
            for edge in &self.nodes[old].edges {
                let mut length = edge.length;
                let mut target = edge.child;
                while self.nodes[target].strains.is_empty() && self.nodes[target].edges.len() == 1 {
                    length += self.nodes[target].edges[0].length;
                    target = self.nodes[target].edges[0].child;
                }

                let child = tree.add_child(
                    new,
                    edge.sdp.clone(),
                    length,
                    self.nodes[target].strains.clone(),
                );
                stack.push((target, child));
            }
        }
        tree.compacted()
    }

    /// Create a canonical form of the tree: strain lists are sorted, the tree is re-rooted at the
    /// node holding the lexicographically smallest strain list, and children are ordered by the
    /// smallest strain in their subtree. Trees that only differ in their rooting normalize to equal
    /// trees.
    pub fn create_normalized_tree(&self) -> PhylogenyTree {
        let mut tree = self.compacted();
        for node in tree.nodes.iter_mut() {
            node.strains.sort();
        }

        let new_root = (0..tree.nodes.len())
            .filter(|&id| !tree.nodes[id].strains.is_empty())
            .min_by(|&a, &b| tree.nodes[a].strains.cmp(&tree.nodes[b].strains))
            .unwrap_or(tree.root);
        let mut tree = tree.re_root(new_root);

        let smallest = tree.smallest_strain_per_subtree();
        for node in tree.nodes.iter_mut() {
            // subtrees without strains go last
            node.edges
                .sort_by(|a, b| match (&smallest[a.child], &smallest[b.child]) {
                    (Some(x), Some(y)) => x.cmp(y),
                    (Some(_), None) => std::cmp::Ordering::Less,
                    (None, Some(_)) => std::cmp::Ordering::Greater,
                    (None, None) => a.sdp.cmp(&b.sdp),
                });
        }
        tree.compacted()
    }

    /// Re-root the tree at `new_root`. The edges on the path from the old root to the new root are
    /// reversed, so the old root becomes a regular descendant. Edge SDPs and lengths move with
    /// their edges. Node ids of the returned tree are renumbered in pre-order.
    ///
    /// # Panics
    /// If `new_root` is not a node of this tree
    pub fn re_root(&self, new_root: NodeId) -> PhylogenyTree {
        assert!(new_root < self.nodes.len(), "node {new_root} out of range");
        let mut tree = self.clone();

        let mut path = vec![new_root];
        let mut current = new_root;
        while let Some(parent) = tree.nodes[current].parent {
            path.push(parent);
            current = parent;
        }

        for pair in path.windows(2) {
            let (child, parent) = (pair[0], pair[1]);
            let position = tree.nodes[parent]
                .edges
                .iter()
                .position(|e| e.child == child)
                .expect("parent does not own its child");
            let edge = tree.nodes[parent].edges.remove(position);
            tree.nodes[child].edges.push(PhylogenyEdge {
                sdp: edge.sdp,
                length: edge.length,
                child: parent,
            });
            tree.nodes[parent].parent = Some(child);
        }
        tree.nodes[new_root].parent = None;
        tree.root = new_root;
        tree.compacted()
    }

    /// Restrict the tree to the given strains. Strain lists are intersected with `keep`, and every
    /// subtree left without strains is dropped together with its incoming edge. The root is always
    /// kept.
    pub fn create_strain_pruned_tree(&self, keep: &[String]) -> PhylogenyTree {
        let keep: SdpHashSet<&str> = keep.iter().map(String::as_str).collect();
        let retain = |strains: &[String]| -> Vec<String> {
            strains
                .iter()
                .filter(|s| keep.contains(s.as_str()))
                .cloned()
                .collect()
        };

        // post-order pass: does a subtree still hold any kept strain?
        let mut non_empty = vec![false; self.nodes.len()];
        for &id in self.preorder().iter().rev() {
            let node = &self.nodes[id];
            non_empty[id] = node.strains.iter().any(|s| keep.contains(s.as_str()))
                || node.edges.iter().any(|e| non_empty[e.child]);
        }

        let mut tree = PhylogenyTree::with_root(
            self.strain_names.clone(),
            retain(&self.nodes[self.root].strains),
        );
        let mut stack = vec![(self.root, tree.root)];
        while let Some((old, new)) = stack.pop() {
            for edge in self.nodes[old].edges.iter().filter(|e| non_empty[e.child]) {
                let child = tree.add_child(
                    new,
                    edge.sdp.clone(),
                    edge.length,
                    retain(&self.nodes[edge.child].strains),
                );
                stack.push((edge.child, child));
            }
        }
        tree.compacted()
    }

    /// Whether two trees have the same shape, strain lists, edge SDPs and edge lengths, comparing
    /// children in edge order. Node ids are ignored.
    pub fn structurally_equal(&self, other: &PhylogenyTree) -> bool {
        fn equal(a: &PhylogenyTree, a_id: NodeId, b: &PhylogenyTree, b_id: NodeId) -> bool {
            let (x, y) = (&a.nodes[a_id], &b.nodes[b_id]);
            x.strains == y.strains
                && x.edges.len() == y.edges.len()
                && x.edges.iter().zip(y.edges.iter()).all(|(e, f)| {
                    e.sdp == f.sdp && e.length == f.length && equal(a, e.child, b, f.child)
                })
        }
        equal(self, self.root, other, other.root)
    }

    fn subtree_preorder(&self, node: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            order.push(id);
            for edge in self.nodes[id].edges.iter().rev() {
                stack.push(edge.child);
            }
        }
        order
    }

    fn smallest_strain_per_subtree(&self) -> Vec<Option<String>> {
        let mut smallest: Vec<Option<String>> = vec![None; self.nodes.len()];
        for &id in self.preorder().iter().rev() {
            let node = &self.nodes[id];
            smallest[id] = node
                .strains
                .iter()
                .chain(node.edges.iter().filter_map(|e| smallest[e.child].as_ref()))
                .min()
                .cloned();
        }
        smallest
    }

    /// Copy the nodes reachable from the root into a fresh arena numbered in pre-order.
    fn compacted(&self) -> PhylogenyTree {
        let mut tree = PhylogenyTree::with_root(
            self.strain_names.clone(),
            self.nodes[self.root].strains.clone(),
        );
        let mut stack = vec![(self.root, tree.root)];
        while let Some((old, new)) = stack.pop() {
            // children are pushed in reverse, so they are allocated in edge order
            let mut children = Vec::with_capacity(self.nodes[old].edges.len());
            for edge in &self.nodes[old].edges {
                let child = tree.add_child(
                    new,
                    edge.sdp.clone(),
                    edge.length,
                    self.nodes[edge.child].strains.clone(),
                );
                children.push((edge.child, child));
            }
            stack.extend(children.into_iter().rev());
        }
        tree
    }
}
