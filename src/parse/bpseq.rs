//! BPSEQ: one residue per line, whitespace-separated `index base partner`,
//! partner `0` when unpaired.

use super::ParseError;
use crate::structure::BasePair;

/// Parse BPSEQ text into pairs. Blank lines and `#`-comments are skipped;
/// a pair is emitted only from the line where `partner > index`, so each
/// pair appears once.
///
/// # Errors
///
/// `InvalidBpseqLine` for short or non-numeric records.
pub fn parse_bpseq(text: &str) -> Result<Vec<BasePair>, ParseError> {
    let mut pairs = Vec::new();
    for (line_no, raw) in (1..).zip(text.lines()) {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 3 {
            return Err(ParseError::InvalidBpseqLine {
                line: line_no,
                reason: format!("expected 3 fields, got {}", fields.len()),
            });
        }
        let index = parse_field(fields[0], "index", line_no)?;
        let partner = parse_field(fields[2], "partner", line_no)?;
        if partner > index {
            pairs.push(BasePair::new(index, partner));
        }
    }
    Ok(pairs)
}

fn parse_field(field: &str, name: &str, line_no: usize) -> Result<u32, ParseError> {
    field.parse().map_err(|_| ParseError::InvalidBpseqLine {
        line: line_no,
        reason: format!("{name} '{field}' is not a number"),
    })
}

/// Expand pairs into a 1-based partner map over `n` residues.
#[must_use]
pub fn pair_map_from_pairs(pairs: &[BasePair], n: u32) -> Vec<u32> {
    let mut map = vec![0_u32; n as usize + 1];
    for bp in pairs {
        map[bp.i as usize] = bp.j;
        map[bp.j as usize] = bp.i;
    }
    map
}

/// Format a sequence and its partner map as BPSEQ text.
#[must_use]
pub fn format_bpseq(sequence: &str, map: &[u32]) -> String {
    let mut out = String::new();
    for (idx, base) in (1..map.len()).zip(sequence.chars()) {
        let partner = map[idx];
        out.push_str(&format!("{idx} {base} {partner}\n"));
    }
    out
}
