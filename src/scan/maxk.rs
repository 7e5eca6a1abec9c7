use tracing::{debug, instrument, trace};

use super::{greedy_scan, uber_scan};
use crate::error::{HaploError, Result};
use crate::intervals::IndexedInterval;
use crate::streams::{expect_direction, SdpStream, StreamDirection};

/// Pair the i-th forward greedy interval with the i-th reverse greedy interval. Core interval `i`
/// starts where forward interval `i` starts and ends where reverse interval `i` ends. Every
/// minimum-size compatible partition has its i-th interval covering core `i`.
///
/// # Panics
/// If the two partitions have a different number of intervals, which greedy scans of the same
/// stream never produce.
pub fn core_intervals(
    forward: &[IndexedInterval],
    reverse: &[IndexedInterval],
) -> Vec<IndexedInterval> {
    assert_eq!(
        forward.len(),
        reverse.len(),
        "forward and reverse greedy partitions differ in size"
    );

    forward
        .iter()
        .zip(reverse.iter())
        .map(|(f, r)| IndexedInterval::from_bounds(f.start(), r.end()))
        .collect()
}

/// For every core interval, select the uber intervals that could realize it in a max-k cover:
/// those containing the core without touching the previous or the next core.
pub fn uber_cores(
    cores: &[IndexedInterval],
    uber: &[IndexedInterval],
) -> Vec<Vec<IndexedInterval>> {
    cores
        .iter()
        .enumerate()
        .map(|(i, core)| {
            let previous = i.checked_sub(1).map(|p| &cores[p]);
            let next = cores.get(i + 1);
            uber.iter()
                .filter(|u| u.contains(core))
                .filter(|u| !previous.is_some_and(|p| u.intersects(p)))
                .filter(|u| !next.is_some_and(|n| u.intersects(n)))
                .copied()
                .collect()
        })
        .collect()
}

/// A candidate of one core group during the dynamic program
#[derive(Clone, Copy, Debug)]
struct Candidate {
    interval: IndexedInterval,
    /// own extent plus the best extent achievable by the downstream groups, `None` if no chain
    /// through this candidate reaches the last group
    cumulative: Option<usize>,
    /// index of the chosen candidate in the next group
    next: Option<usize>,
}

/// Select one uber interval per core group so that consecutive intervals touch or overlap and
/// their total extent is maximal.
///
/// # Panics
/// If no adjacent chain through all groups exists, which cannot happen for groups computed from
/// the same stream.
pub fn select_max_k(groups: &[Vec<IndexedInterval>]) -> Vec<IndexedInterval> {
    if groups.is_empty() {
        return Vec::new();
    }

    let mut table: Vec<Vec<Candidate>> = groups
        .iter()
        .map(|group| {
            group
                .iter()
                .map(|&interval| Candidate {
                    interval,
                    cumulative: None,
                    next: None,
                })
                .collect()
        })
        .collect();

    let last = table.len() - 1;
    for candidate in table[last].iter_mut() {
        candidate.cumulative = Some(candidate.interval.extent());
    }

    // right to left: link every candidate to the best reachable candidate of the next group
    for group in (0..last).rev() {
        let (current, downstream) = table.split_at_mut(group + 1);
        let downstream = &downstream[0];
        for candidate in current[group].iter_mut() {
            let best = downstream
                .iter()
                .enumerate()
                .filter(|(_, next)| candidate.interval.end() + 1 >= next.interval.start())
                .filter_map(|(i, next)| next.cumulative.map(|c| (i, c)))
                .max_by_key(|&(_, cumulative)| cumulative);

            if let Some((next, cumulative)) = best {
                candidate.cumulative = Some(candidate.interval.extent() + cumulative);
                candidate.next = Some(next);
            }
        }
        trace!(group, candidates = current[group].len(), "linked core group");
    }

    let (mut position, _) = table[0]
        .iter()
        .enumerate()
        .filter_map(|(i, c)| c.cumulative.map(|cumulative| (i, cumulative)))
        .max_by_key(|&(_, cumulative)| cumulative)
        .expect("no adjacent chain of uber intervals covers the stream");

    let mut selected = Vec::with_capacity(table.len());
    for group in 0..table.len() {
        let candidate = &table[group][position];
        selected.push(candidate.interval);
        match candidate.next {
            Some(next) => position = next,
            None => debug_assert_eq!(group, last),
        }
    }

    assert_eq!(selected.len(), groups.len(), "max-k cover has wrong group count");
    selected
}

/// Compute the max-k intervals of a chromosome: a minimum number of compatible intervals covering
/// the whole stream, chosen among all maximal compatible intervals so that their total extent is
/// as large as possible.
///
/// The three streams must present the same SNPs: `forward` and `uber` read front-to-back,
/// `reverse` back-to-front.
#[instrument(skip_all, fields(sdps = forward.sdp_count()))]
pub fn max_k_scan(
    forward: &mut dyn SdpStream,
    reverse: &mut dyn SdpStream,
    uber: &mut dyn SdpStream,
) -> Result<Vec<IndexedInterval>> {
    expect_direction(forward, StreamDirection::Forward, "forward")?;
    expect_direction(reverse, StreamDirection::Reverse, "reverse")?;
    expect_direction(uber, StreamDirection::Forward, "uber")?;
    if forward.sdp_count() != reverse.sdp_count() || forward.sdp_count() != uber.sdp_count() {
        return Err(HaploError::precondition(format!(
            "stream lengths differ: forward {}, reverse {}, uber {}",
            forward.sdp_count(),
            reverse.sdp_count(),
            uber.sdp_count()
        )));
    }

    let forward_intervals = greedy_scan(forward)?;
    let reverse_intervals = greedy_scan(reverse)?;
    let uber_intervals = uber_scan(uber)?;

    let cores = core_intervals(&forward_intervals, &reverse_intervals);
    let groups = uber_cores(&cores, &uber_intervals);
    let max_k = select_max_k(&groups);

    debug!(
        cores = cores.len(),
        uber = uber_intervals.len(),
        "max-k scan finished"
    );
    Ok(max_k)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sdp::Sdp;
    use crate::streams::InMemorySdpStream;

    fn run(patterns: &[&str]) -> Vec<IndexedInterval> {
        let sdps: Vec<Sdp> = patterns.iter().map(|p| p.parse().unwrap()).collect();
        let names: Vec<String> = (0..sdps[0].strain_count())
            .map(|i| format!("S{i}"))
            .collect();
        max_k_scan(
            &mut InMemorySdpStream::forward(sdps.clone(), names.clone()),
            &mut InMemorySdpStream::reverse(sdps.clone(), names.clone()),
            &mut InMemorySdpStream::forward(sdps, names),
        )
        .unwrap()
    }

    #[test]
    fn cores_pair_forward_starts_with_reverse_ends() {
        let forward = [
            IndexedInterval::from_bounds(0, 3),
            IndexedInterval::from_bounds(4, 9),
        ];
        let reverse = [
            IndexedInterval::from_bounds(0, 1),
            IndexedInterval::from_bounds(2, 9),
        ];
        assert_eq!(
            core_intervals(&forward, &reverse),
            vec![
                IndexedInterval::from_bounds(0, 1),
                IndexedInterval::from_bounds(4, 9)
            ]
        );
    }

    #[test]
    fn uber_cores_exclude_intervals_touching_neighbour_cores() {
        let cores = [
            IndexedInterval::from_bounds(0, 1),
            IndexedInterval::from_bounds(4, 5),
            IndexedInterval::from_bounds(8, 9),
        ];
        let uber = [
            IndexedInterval::from_bounds(0, 3),
            IndexedInterval::from_bounds(0, 4),
            IndexedInterval::from_bounds(2, 7),
            IndexedInterval::from_bounds(3, 8),
            IndexedInterval::from_bounds(6, 9),
        ];
        let groups = uber_cores(&cores, &uber);
        assert_eq!(groups[0], vec![IndexedInterval::from_bounds(0, 3)]);
        assert_eq!(groups[1], vec![IndexedInterval::from_bounds(2, 7)]);
        assert_eq!(groups[2], vec![IndexedInterval::from_bounds(6, 9)]);
    }

    #[test]
    fn dynamic_program_prefers_longer_chains() {
        let groups = vec![
            vec![
                IndexedInterval::from_bounds(0, 2),
                IndexedInterval::from_bounds(0, 4),
            ],
            vec![
                IndexedInterval::from_bounds(3, 9),
                IndexedInterval::from_bounds(5, 9),
            ],
        ];
        // [0, 4] + [3, 9] beats [0, 2] + [3, 9] and [0, 4] + [5, 9]
        assert_eq!(
            select_max_k(&groups),
            vec![
                IndexedInterval::from_bounds(0, 4),
                IndexedInterval::from_bounds(3, 9)
            ]
        );
    }

    #[test]
    fn gaps_are_never_selected() {
        let groups = vec![
            vec![
                IndexedInterval::from_bounds(0, 5),
                IndexedInterval::from_bounds(0, 2),
            ],
            vec![IndexedInterval::from_bounds(3, 9)],
            vec![
                IndexedInterval::from_bounds(9, 12),
                IndexedInterval::from_bounds(8, 11),
            ],
        ];
        let selected = select_max_k(&groups);
        assert_eq!(selected[0], IndexedInterval::from_bounds(0, 5));
        assert_eq!(selected[2], IndexedInterval::from_bounds(8, 11));
    }

    #[test]
    fn max_k_covers_stream_with_overlapping_intervals() {
        let max_k = run(&["0011", "0001", "0110"]);
        assert_eq!(
            max_k,
            vec![
                IndexedInterval::from_bounds(0, 1),
                IndexedInterval::from_bounds(1, 2)
            ]
        );
    }

    #[test]
    fn empty_stream_has_no_max_k_intervals() {
        let names = vec!["A".to_string(), "B".to_string()];
        let max_k = max_k_scan(
            &mut InMemorySdpStream::forward(Vec::new(), names.clone()),
            &mut InMemorySdpStream::reverse(Vec::new(), names.clone()),
            &mut InMemorySdpStream::forward(Vec::new(), names),
        )
        .unwrap();
        assert!(max_k.is_empty());
    }

    #[test]
    fn mismatched_directions_are_rejected() {
        let names = vec!["A".to_string(), "B".to_string()];
        let sdps: Vec<Sdp> = vec!["01".parse().unwrap()];
        let result = max_k_scan(
            &mut InMemorySdpStream::forward(sdps.clone(), names.clone()),
            &mut InMemorySdpStream::forward(sdps.clone(), names.clone()),
            &mut InMemorySdpStream::forward(sdps, names),
        );
        assert!(matches!(result, Err(HaploError::Precondition { .. })));
    }
}
