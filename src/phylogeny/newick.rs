use std::fmt::Write;

use crate::phylogeny::tree::{NodeId, PhylogenyTree};

impl PhylogenyTree {
    /// Render the tree in Newick format. The tree is first resolved to single-strain leaves with
    /// zero-length edges, so every strain is named exactly once as a leaf. Interior nodes are not
    /// labelled. Strain names containing Newick control characters are quoted.
    pub fn to_newick(&self) -> String {
        let resolved = self.resolve_to_single_strain_leaf_nodes(0.0);
        let mut out = String::new();
        write_node(&resolved, resolved.root(), &mut out);
        out.push(';');
        out
    }
}

fn write_node(tree: &PhylogenyTree, id: NodeId, out: &mut String) {
    let node = tree.node(id);
    if node.is_leaf() {
        if let Some(strain) = node.strains().first() {
            write_label(strain, out);
        }
        return;
    }

    out.push('(');
    for (i, edge) in node.edges().iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_node(tree, edge.child(), out);
        // writing to a String cannot fail
        let _ = write!(out, ":{}", edge.length());
    }
    out.push(')');
}

fn write_label(label: &str, out: &mut String) {
    let needs_quotes = label
        .chars()
        .any(|c| c.is_whitespace() || "()[]':;,".contains(c));
    if needs_quotes {
        out.push('\'');
        out.push_str(&label.replace('\'', "''"));
        out.push('\'');
    } else {
        out.push_str(label);
    }
}
