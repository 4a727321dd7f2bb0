//! Loop decomposition of a nested pair list.
//!
//! Every pair `(i, j)` closes exactly one loop: the cycle running from `i`
//! along the strand to `j` and back across the pair, detouring across each
//! directly enclosed child pair. Unpaired residues on that cycle are the
//! loop's boundary; the closing pair plus the child pairs are its closing
//! pairs. Unpaired residues outside every pair belong to the exterior and
//! produce no loop.

use std::collections::HashMap;

use super::StructureError;
use super::layer::main_layer;
use super::pair::{BasePair, check_bounds, check_noncrossing, partner_table};

/// Loop taxonomy by closing-pair count and boundary content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum LoopKind {
    /// One closing pair, no children.
    Hairpin,
    /// Two closing pairs with at least one unpaired boundary residue
    /// (covers bulges).
    Internal,
    /// Three or more closing pairs.
    Multi,
    /// Two closing pairs stacked directly, no unpaired residues.
    Stacking,
}

impl std::fmt::Display for LoopKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Hairpin => "hairpin",
            Self::Internal => "internal",
            Self::Multi => "multi",
            Self::Stacking => "stacking",
        };
        f.write_str(name)
    }
}

/// A closed region of the secondary structure.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Loop {
    /// 1-based id in DFS post-order of enclosing pairs.
    pub id: u32,
    pub kind: LoopKind,
    /// The enclosing pair first, then the child pairs by ascending `i`.
    pub closing_pairs: Vec<BasePair>,
    /// Unpaired residues on the cycle, in sequence order.
    pub boundary_residues: Vec<u32>,
}

impl Loop {
    /// All residues on the loop's cycle (closing-pair endpoints and boundary
    /// residues), ascending. Ascending order equals cycle order because the
    /// cycle walks the strand once.
    #[must_use]
    pub fn cycle_residues(&self) -> Vec<u32> {
        let mut residues: Vec<u32> = self
            .closing_pairs
            .iter()
            .flat_map(|bp| [bp.i, bp.j])
            .chain(self.boundary_residues.iter().copied())
            .collect();
        residues.sort_unstable();
        residues
    }
}

/// Decompose `pairs` into loops over a sequence of `n` residues.
///
/// With `main_layer_only` the input is first reduced to its main layer,
/// which is a no-op on an already reduced list. The (possibly reduced)
/// input must be a valid nesting; crossing pairs or duplicate endpoints
/// fail with `InvalidPairing`, out-of-range endpoints with `InvalidIndex`.
/// Loops are returned in id order.
pub fn build_loops(
    pairs: &[BasePair],
    n: u32,
    main_layer_only: bool,
) -> Result<Vec<Loop>, StructureError> {
    let reduced;
    let pairs: &[BasePair] = if main_layer_only {
        reduced = main_layer(pairs, n)?;
        &reduced
    } else {
        check_bounds(pairs, n)?;
        pairs
    };

    let table = partner_table(pairs, n)?;
    check_noncrossing(&table)?;

    let by_ij: HashMap<(u32, u32), &BasePair> =
        pairs.iter().map(|bp| ((bp.i, bp.j), bp)).collect();

    let mut loops = Vec::new();
    let mut r = 1;
    while r <= n {
        let partner = table[r as usize];
        if partner > r {
            collect(&table, &by_ij, r, partner, &mut loops);
            r = partner + 1;
        } else {
            r += 1;
        }
    }
    Ok(loops)
}

/// Emit the loop closed by `(i, j)`, recursing into children first so ids
/// come out in DFS post-order.
fn collect(
    table: &[u32],
    by_ij: &HashMap<(u32, u32), &BasePair>,
    i: u32,
    j: u32,
    out: &mut Vec<Loop>,
) {
    let mut children: Vec<(u32, u32)> = Vec::new();
    let mut boundary: Vec<u32> = Vec::new();

    let mut r = i + 1;
    while r < j {
        let partner = table[r as usize];
        if partner > r {
            collect(table, by_ij, r, partner, out);
            children.push((r, partner));
            r = partner + 1;
        } else {
            boundary.push(r);
            r += 1;
        }
    }

    let kind = match (children.len(), boundary.is_empty()) {
        (0, _) => LoopKind::Hairpin,
        (1, true) => LoopKind::Stacking,
        (1, false) => LoopKind::Internal,
        _ => LoopKind::Multi,
    };

    let closing_pairs = std::iter::once((i, j))
        .chain(children)
        .map(|key| by_ij.get(&key).map_or_else(
            || BasePair::new(key.0, key.1),
            |bp| (*bp).clone(),
        ))
        .collect();

    out.push(Loop {
        id: out.len() as u32 + 1,
        kind,
        closing_pairs,
        boundary_residues: boundary,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bp(i: u32, j: u32) -> BasePair {
        BasePair::new(i, j)
    }

    fn closing_keys(l: &Loop) -> Vec<(u32, u32)> {
        l.closing_pairs.iter().map(|p| (p.i, p.j)).collect()
    }

    #[test]
    fn simple_hairpin_stack() {
        // Scenario: length 10, pairs (1,10),(2,9),(3,8).
        let loops =
            build_loops(&[bp(1, 10), bp(2, 9), bp(3, 8)], 10, false).unwrap();
        assert_eq!(loops.len(), 3);

        assert_eq!(loops[0].id, 1);
        assert_eq!(loops[0].kind, LoopKind::Hairpin);
        assert_eq!(closing_keys(&loops[0]), vec![(3, 8)]);
        assert_eq!(loops[0].boundary_residues, vec![4, 5, 6, 7]);

        assert_eq!(loops[1].kind, LoopKind::Stacking);
        assert_eq!(closing_keys(&loops[1]), vec![(2, 9), (3, 8)]);
        assert!(loops[1].boundary_residues.is_empty());

        assert_eq!(loops[2].kind, LoopKind::Stacking);
        assert_eq!(closing_keys(&loops[2]), vec![(1, 10), (2, 9)]);
    }

    #[test]
    fn internal_loop_with_bulges() {
        // Scenario: length 20, pairs (1,20),(2,19),(5,10),(6,9).
        let loops = build_loops(
            &[bp(1, 20), bp(2, 19), bp(5, 10), bp(6, 9)],
            20,
            false,
        )
        .unwrap();
        assert_eq!(loops.len(), 4);

        assert_eq!(loops[0].kind, LoopKind::Hairpin);
        assert_eq!(closing_keys(&loops[0]), vec![(6, 9)]);
        assert_eq!(loops[0].boundary_residues, vec![7, 8]);

        assert_eq!(loops[1].kind, LoopKind::Stacking);
        assert_eq!(closing_keys(&loops[1]), vec![(5, 10), (6, 9)]);

        assert_eq!(loops[2].kind, LoopKind::Internal);
        assert_eq!(closing_keys(&loops[2]), vec![(2, 19), (5, 10)]);
        assert_eq!(
            loops[2].boundary_residues,
            vec![3, 4, 11, 12, 13, 14, 15, 16, 17, 18]
        );

        assert_eq!(loops[3].kind, LoopKind::Stacking);
    }

    #[test]
    fn multiloop_with_three_branches() {
        // Scenario: length 30, pairs (1,30),(3,10),(12,20),(22,28).
        let loops = build_loops(
            &[bp(1, 30), bp(3, 10), bp(12, 20), bp(22, 28)],
            30,
            false,
        )
        .unwrap();
        assert_eq!(loops.len(), 4);

        let outer = loops.last().unwrap();
        assert_eq!(outer.kind, LoopKind::Multi);
        assert_eq!(
            closing_keys(outer),
            vec![(1, 30), (3, 10), (12, 20), (22, 28)]
        );
        assert_eq!(outer.boundary_residues, vec![2, 11, 21, 29]);

        // Children are hairpins, ids in post-order before the parent.
        assert_eq!(loops[0].kind, LoopKind::Hairpin);
        assert_eq!(loops[1].kind, LoopKind::Hairpin);
        assert_eq!(loops[2].kind, LoopKind::Hairpin);
        assert_eq!(outer.id, 4);
    }

    #[test]
    fn exterior_residues_produce_no_loop() {
        let loops = build_loops(&[bp(3, 8)], 12, false).unwrap();
        assert_eq!(loops.len(), 1);
        assert_eq!(loops[0].boundary_residues, vec![4, 5, 6, 7]);
    }

    #[test]
    fn boundaries_partition_the_covered_residues() {
        // Every residue inside the outermost pair appears exactly once,
        // either as a boundary residue or as a closing-pair endpoint.
        let pairs = vec![bp(1, 20), bp(2, 9), bp(4, 7), bp(11, 18), bp(13, 16)];
        let loops = build_loops(&pairs, 20, false).unwrap();

        let mut seen = vec![0_u32; 21];
        for l in &loops {
            for &r in &l.boundary_residues {
                seen[r as usize] += 1;
            }
        }
        // A pair is shared between its own loop and its parent's; count its
        // endpoints once, via the loop it closes.
        for l in &loops {
            let closing = &l.closing_pairs[0];
            seen[closing.i as usize] += 1;
            seen[closing.j as usize] += 1;
        }
        for r in 1..=20 {
            assert_eq!(seen[r], 1, "residue {r} covered {} times", seen[r]);
        }
    }

    #[test]
    fn euler_relation_on_the_nesting_forest() {
        // Sum over loops of (|closing_pairs| - 1) equals
        // |pairs| - #outermost pairs.
        let pairs = vec![
            bp(1, 12),
            bp(2, 6),
            bp(3, 5),
            bp(7, 11),
            bp(14, 20),
            bp(15, 19),
        ];
        let loops = build_loops(&pairs, 20, false).unwrap();
        let lhs: usize = loops.iter().map(|l| l.closing_pairs.len() - 1).sum();
        assert_eq!(lhs, pairs.len() - 2);
    }

    #[test]
    fn crossing_input_is_rejected_without_reduction() {
        let err = build_loops(&[bp(1, 5), bp(3, 8)], 10, false).unwrap_err();
        assert!(matches!(err, StructureError::InvalidPairing { .. }));
    }

    #[test]
    fn crossing_input_is_reduced_with_main_layer() {
        let loops = build_loops(&[bp(1, 5), bp(3, 8)], 10, true).unwrap();
        assert_eq!(loops.len(), 1);
        assert_eq!(closing_keys(&loops[0]), vec![(1, 5)]);
    }

    #[test]
    fn duplicate_endpoint_is_rejected() {
        let err = build_loops(&[bp(1, 5), bp(5, 9)], 10, false).unwrap_err();
        assert!(matches!(err, StructureError::InvalidPairing { .. }));
    }

    #[test]
    fn reduction_is_a_no_op_on_reduced_input() {
        let pairs = vec![bp(1, 10), bp(2, 9), bp(4, 6)];
        let plain = build_loops(&pairs, 10, false).unwrap();
        let reduced = build_loops(&pairs, 10, true).unwrap();
        assert_eq!(plain, reduced);
    }

    #[test]
    fn cycle_residues_are_sorted_and_complete() {
        let loops = build_loops(&[bp(2, 9), bp(4, 7)], 10, false).unwrap();
        let internal = loops.last().unwrap();
        assert_eq!(internal.cycle_residues(), vec![2, 3, 4, 7, 8, 9]);
    }
}
