//! Main-layer extraction.
//!
//! The main layer is the largest subset of the input pairs that forms a
//! valid planar nesting: no two selected pairs cross and no residue is used
//! twice. It is computed exactly by a memoised interval recursion over
//! compressed endpoint coordinates. At each coordinate the recursion either
//! skips it or commits to one pair opening there, which splits the interval
//! into an inside and an outside part; committing consumes the coordinate,
//! so two pairs sharing a residue are mutually exclusive without any special
//! casing.

use std::collections::HashMap;

use super::StructureError;
use super::pair::{BasePair, check_bounds};

/// Extract the main layer: the maximum-cardinality non-crossing,
/// endpoint-disjoint subset of `pairs`.
///
/// Deterministic: on ties the pair with smaller `i`, then larger `j`, is
/// preferred (outermost first). The result is sorted by `(i asc, j desc)`.
/// Identity on already-nested inputs and idempotent.
///
/// # Errors
///
/// `InvalidIndex` when an endpoint lies outside `1..=n`, `InvalidPairing`
/// when a pair has `i >= j`.
pub fn main_layer(pairs: &[BasePair], n: u32) -> Result<Vec<BasePair>, StructureError> {
    check_bounds(pairs, n)?;

    if pairs.len() <= 1 {
        return Ok(sorted(pairs.to_vec()));
    }

    let solver = LayerSolver::new(pairs);
    let chosen = solver.solve();
    Ok(sorted(chosen.into_iter().map(|p| pairs[p].clone()).collect()))
}

fn sorted(mut pairs: Vec<BasePair>) -> Vec<BasePair> {
    pairs.sort_by(|a, b| a.i.cmp(&b.i).then(b.j.cmp(&a.j)));
    pairs
}

struct LayerSolver {
    /// Pair ids opening at each compressed coordinate, outermost first.
    starts: Vec<Vec<usize>>,
    /// Compressed coordinate of each pair's closing endpoint.
    ends: Vec<u32>,
    coord_count: u32,
}

/// Memo entry: best pair count for the state plus the pair committed at its
/// first coordinate (`None` = the coordinate is skipped).
type Decision = (u32, Option<usize>);

impl LayerSolver {
    fn new(pairs: &[BasePair]) -> Self {
        let mut coords: Vec<u32> = pairs.iter().flat_map(|bp| [bp.i, bp.j]).collect();
        coords.sort_unstable();
        coords.dedup();
        let pos = |x: u32| coords.binary_search(&x).expect("endpoint was collected") as u32;

        let mut order: Vec<usize> = (0..pairs.len()).collect();
        order.sort_by(|&a, &b| {
            pairs[a]
                .i
                .cmp(&pairs[b].i)
                .then(pairs[b].j.cmp(&pairs[a].j))
        });

        let mut starts = vec![Vec::new(); coords.len()];
        for &p in &order {
            starts[pos(pairs[p].i) as usize].push(p);
        }
        let ends = pairs.iter().map(|bp| pos(bp.j)).collect();

        Self {
            starts,
            ends,
            coord_count: coords.len() as u32,
        }
    }

    fn solve(&self) -> Vec<usize> {
        let mut memo: HashMap<(u32, u32), Decision> = HashMap::new();
        let last = self.coord_count - 1;
        self.best(0, last, &mut memo);

        let mut chosen = Vec::new();
        self.trace(0, last, &memo, &mut chosen);
        chosen
    }

    /// Best pair count over the coordinate interval `[k, e]`.
    fn best(&self, k: u32, e: u32, memo: &mut HashMap<(u32, u32), Decision>) -> u32 {
        if k >= self.coord_count || k > e {
            return 0;
        }
        if let Some(&(count, _)) = memo.get(&(k, e)) {
            return count;
        }

        let mut count = self.best(k + 1, e, memo);
        let mut choice = None;
        for &p in &self.starts[k as usize] {
            let c = self.ends[p];
            if c > e {
                continue;
            }
            let total = 1 + self.best(k + 1, c - 1, memo) + self.best(c + 1, e, memo);
            // Strict improvement switches; a tie only promotes inclusion
            // over skipping, so the outermost candidate wins ties.
            if total > count || (total == count && choice.is_none()) {
                count = total;
                choice = Some(p);
            }
        }

        memo.insert((k, e), (count, choice));
        count
    }

    fn trace(
        &self,
        k: u32,
        e: u32,
        memo: &HashMap<(u32, u32), Decision>,
        chosen: &mut Vec<usize>,
    ) {
        if k >= self.coord_count || k > e {
            return;
        }
        let (_, choice) = memo[&(k, e)];
        match choice {
            None => self.trace(k + 1, e, memo, chosen),
            Some(p) => {
                chosen.push(p);
                let c = self.ends[p];
                self.trace(k + 1, c - 1, memo, chosen);
                self.trace(c + 1, e, memo, chosen);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bp(i: u32, j: u32) -> BasePair {
        BasePair::new(i, j)
    }

    fn keys(pairs: &[BasePair]) -> Vec<(u32, u32)> {
        pairs.iter().map(|p| (p.i, p.j)).collect()
    }

    #[test]
    fn non_crossing_input_is_identity() {
        let pairs = vec![bp(1, 10), bp(2, 9), bp(4, 6), bp(12, 15)];
        let layer = main_layer(&pairs, 20).unwrap();
        assert_eq!(keys(&layer), vec![(1, 10), (2, 9), (4, 6), (12, 15)]);
    }

    #[test]
    fn sibling_helices_are_all_kept() {
        let pairs = vec![bp(1, 2), bp(3, 4), bp(5, 6)];
        let layer = main_layer(&pairs, 6).unwrap();
        assert_eq!(layer.len(), 3);
    }

    #[test]
    fn idempotent() {
        let pairs = vec![
            bp(1, 8),
            bp(2, 7),
            bp(3, 6),
            bp(10, 16),
            bp(11, 15),
            bp(12, 14),
            bp(4, 12),
        ];
        let once = main_layer(&pairs, 16).unwrap();
        let twice = main_layer(&once, 16).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn pseudoknot_pair_is_dropped() {
        // H-type pseudoknot: (4,12) crosses both stems and shares residue
        // 12 with (12,14); the six stem pairs outweigh it.
        let pairs = vec![
            bp(1, 8),
            bp(2, 7),
            bp(3, 6),
            bp(10, 16),
            bp(11, 15),
            bp(12, 14),
            bp(4, 12),
        ];
        let layer = main_layer(&pairs, 16).unwrap();
        assert_eq!(
            keys(&layer),
            vec![(1, 8), (2, 7), (3, 6), (10, 16), (11, 15), (12, 14)]
        );
    }

    #[test]
    fn shared_endpoint_keeps_the_outermost_pair() {
        let pairs = vec![bp(5, 9), bp(1, 5)];
        let layer = main_layer(&pairs, 10).unwrap();
        assert_eq!(keys(&layer), vec![(1, 5)]);
    }

    #[test]
    fn crossing_tie_prefers_smaller_i() {
        let pairs = vec![bp(4, 10), bp(1, 6)];
        let layer = main_layer(&pairs, 10).unwrap();
        assert_eq!(keys(&layer), vec![(1, 6)]);
    }

    #[test]
    fn out_of_range_endpoint_fails() {
        assert!(matches!(
            main_layer(&[bp(1, 30)], 20),
            Err(StructureError::InvalidIndex { index: 30, limit: 20 })
        ));
    }

    #[test]
    fn empty_input_is_empty() {
        assert!(main_layer(&[], 5).unwrap().is_empty());
    }

    #[test]
    fn maximises_over_greedy_choices() {
        // (1,10) crosses both (5,12) and (6,11), which nest with each
        // other; dropping the single wide pair keeps two.
        let pairs = vec![bp(1, 10), bp(5, 12), bp(6, 11)];
        let layer = main_layer(&pairs, 14).unwrap();
        assert_eq!(keys(&layer), vec![(5, 12), (6, 11)]);
    }
}
