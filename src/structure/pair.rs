use super::StructureError;

/// A hydrogen-bonded base pair, 1-based with `i < j`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct BasePair {
    pub i: u32,
    pub j: u32,
    /// Optional annotation carried through from the input (e.g. "WC").
    pub bp_type: Option<String>,
}

impl BasePair {
    #[must_use]
    pub const fn new(i: u32, j: u32) -> Self {
        Self {
            i,
            j,
            bp_type: None,
        }
    }

    #[must_use]
    pub fn with_type(i: u32, j: u32, bp_type: impl Into<String>) -> Self {
        Self {
            i,
            j,
            bp_type: Some(bp_type.into()),
        }
    }
}

/// Every endpoint must satisfy `1 <= i < j <= n`.
pub(crate) fn check_bounds(pairs: &[BasePair], n: u32) -> Result<(), StructureError> {
    for bp in pairs {
        if bp.i < 1 || bp.i > n {
            return Err(StructureError::InvalidIndex {
                index: bp.i,
                limit: n,
            });
        }
        if bp.j < 1 || bp.j > n {
            return Err(StructureError::InvalidIndex {
                index: bp.j,
                limit: n,
            });
        }
        if bp.i >= bp.j {
            return Err(StructureError::InvalidPairing {
                i: bp.i,
                j: bp.j,
                reason: "i must be strictly less than j".to_owned(),
            });
        }
    }
    Ok(())
}

/// Build the 1-based partner table (`0` = unpaired). Fails when a residue
/// appears in two pairs; bounds are assumed checked.
pub(crate) fn partner_table(pairs: &[BasePair], n: u32) -> Result<Vec<u32>, StructureError> {
    let mut table = vec![0_u32; n as usize + 1];
    for bp in pairs {
        for &end in &[bp.i, bp.j] {
            if table[end as usize] != 0 {
                return Err(StructureError::InvalidPairing {
                    i: bp.i,
                    j: bp.j,
                    reason: format!("residue {end} already paired"),
                });
            }
        }
        table[bp.i as usize] = bp.j;
        table[bp.j as usize] = bp.i;
    }
    Ok(table)
}

/// Reject crossing pairs with a stack walk over the partner table: a closer
/// that does not match the innermost open pair crosses it.
pub(crate) fn check_noncrossing(table: &[u32]) -> Result<(), StructureError> {
    let mut open: Vec<(u32, u32)> = Vec::new();
    for r in 1..table.len() as u32 {
        let partner = table[r as usize];
        if partner > r {
            open.push((r, partner));
        } else if partner != 0 {
            match open.pop() {
                Some((i, j)) if j == r => debug_assert_eq!(i, partner),
                Some((i, j)) => {
                    return Err(StructureError::InvalidPairing {
                        i: partner,
                        j: r,
                        reason: format!("crosses pair ({i},{j})"),
                    });
                }
                None => {
                    return Err(StructureError::InvalidPairing {
                        i: partner,
                        j: r,
                        reason: "unmatched closing endpoint".to_owned(),
                    });
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_catch_zero_and_overflow() {
        assert!(matches!(
            check_bounds(&[BasePair::new(0, 5)], 10),
            Err(StructureError::InvalidIndex { index: 0, limit: 10 })
        ));
        assert!(matches!(
            check_bounds(&[BasePair::new(2, 11)], 10),
            Err(StructureError::InvalidIndex { index: 11, limit: 10 })
        ));
        assert!(check_bounds(&[BasePair::new(1, 10)], 10).is_ok());
    }

    #[test]
    fn inverted_pair_is_invalid() {
        assert!(matches!(
            check_bounds(&[BasePair::new(5, 5)], 10),
            Err(StructureError::InvalidPairing { .. })
        ));
    }

    #[test]
    fn duplicate_endpoint_is_rejected() {
        let pairs = [BasePair::new(1, 8), BasePair::new(3, 8)];
        assert!(matches!(
            partner_table(&pairs, 10),
            Err(StructureError::InvalidPairing { .. })
        ));
    }

    #[test]
    fn crossing_pairs_are_rejected() {
        let pairs = [BasePair::new(1, 5), BasePair::new(3, 8)];
        let table = partner_table(&pairs, 10).unwrap();
        assert!(matches!(
            check_noncrossing(&table),
            Err(StructureError::InvalidPairing { .. })
        ));
    }

    #[test]
    fn nested_pairs_pass() {
        let pairs = [
            BasePair::new(1, 10),
            BasePair::new(2, 9),
            BasePair::new(4, 6),
        ];
        let table = partner_table(&pairs, 10).unwrap();
        assert!(check_noncrossing(&table).is_ok());
    }
}
