use super::Sdp;

/// Canonicalize an SDP so that the set bits mark the minority partition of strains.
/// If both partitions have the same size, the partition that does not contain strain 0 is marked.
/// Normalizing an already normalized SDP returns it unchanged.
pub fn normalize(sdp: &Sdp) -> Sdp {
    let ones = sdp.count_ones();
    let strains = sdp.strain_count();
    let flip = if ones * 2 > strains {
        true
    } else if ones * 2 == strains {
        strains > 0 && sdp.get(0)
    } else {
        false
    };

    if flip {
        sdp.complement()
    } else {
        sdp.clone()
    }
}

/// Two SDPs are compatible under the infinite-sites model if they are disjoint or one contains the
/// other. Both operands should be normalized unless raw reference-relative patterns are compared
/// on purpose.
pub fn compatible(a: &Sdp, b: &Sdp) -> bool {
    let both = a.intersection(b);
    both.is_zero() || &both == a || &both == b
}

/// Whether a set of SDPs is pairwise compatible.
pub fn all_compatible(sdps: &[Sdp]) -> bool {
    sdps.iter()
        .enumerate()
        .all(|(i, a)| sdps[i + 1..].iter().all(|b| compatible(a, b)))
}
