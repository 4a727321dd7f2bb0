//! Dot-bracket style secondary structure.
//!
//! The four bracket families `()`, `[]`, `{}` and `<>` match independently,
//! each with its own stack, so crossing families can express pseudoknot
//! layers. `.`, `-`, `x` and `X` are unpaired; anything else is an error.

use std::sync::LazyLock;

use regex::Regex;

use super::ParseError;
use crate::structure::BasePair;

const OPEN: [char; 4] = ['(', '[', '{', '<'];
const CLOSE: [char; 4] = [')', ']', '}', '>'];
const UNPAIRED: [char; 4] = ['.', '-', 'x', 'X'];

static SEQUENCE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[ACGUTNacgutn]+$").expect("sequence pattern"));
static STRUCTURE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[().\[\]{}<>xX-]+$").expect("structure pattern"));

fn family_of_open(c: char) -> Option<usize> {
    OPEN.iter().position(|&o| o == c)
}

fn family_of_close(c: char) -> Option<usize> {
    CLOSE.iter().position(|&o| o == c)
}

/// Parse a secondary-structure string into a 1-based partner map
/// (`map[i] == 0` means residue `i` is unpaired).
///
/// # Errors
///
/// `UnsupportedSymbol` for characters outside the alphabet,
/// `UnbalancedClose`/`UnbalancedOpen` for mismatched brackets.
pub fn parse_secstruct(secstruct: &str) -> Result<Vec<u32>, ParseError> {
    let mut map = vec![0_u32; secstruct.chars().count() + 1];
    let mut stacks: [Vec<u32>; 4] = Default::default();

    for (idx, c) in (1_u32..).zip(secstruct.chars()) {
        if let Some(fam) = family_of_open(c) {
            stacks[fam].push(idx);
        } else if let Some(fam) = family_of_close(c) {
            let Some(i) = stacks[fam].pop() else {
                return Err(ParseError::UnbalancedClose {
                    symbol: c,
                    position: idx as usize,
                });
            };
            map[i as usize] = idx;
            map[idx as usize] = i;
        } else if !UNPAIRED.contains(&c) {
            return Err(ParseError::UnsupportedSymbol {
                symbol: c,
                position: idx as usize,
            });
        }
    }

    for (fam, stack) in stacks.iter().enumerate() {
        if !stack.is_empty() {
            return Err(ParseError::UnbalancedOpen {
                expected: CLOSE[fam],
            });
        }
    }

    Ok(map)
}

/// Reduce a partner map to pairs with `j > i`.
#[must_use]
pub fn pairs_from_map(map: &[u32]) -> Vec<BasePair> {
    (1..map.len() as u32)
        .filter_map(|i| {
            let j = map[i as usize];
            (j > i).then(|| BasePair::new(i, j))
        })
        .collect()
}

/// Read a secstruct document: comments (`#`), headers (`>`) and blank lines
/// are skipped, remaining lines are classified as sequence or structure and
/// concatenated. Returns `(sequence, structure)`; when no sequence lines are
/// present the sequence defaults to `N` repeated.
///
/// # Errors
///
/// `UnrecognizedLine` for lines matching neither alphabet,
/// `MissingStructure` when no structure line exists, `LengthMismatch` when
/// the sequence and structure lengths differ.
pub fn read_secstruct_str(text: &str) -> Result<(String, String), ParseError> {
    let mut sequence = String::new();
    let mut structure = String::new();

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('>') {
            continue;
        }
        // The structure alphabet wins on ambiguity ("x" and "-" only occur
        // in structure lines; pure-base lines never match it).
        if STRUCTURE_LINE.is_match(line) {
            structure.push_str(line);
        } else if SEQUENCE_LINE.is_match(line) {
            sequence.push_str(line);
        } else {
            return Err(ParseError::UnrecognizedLine {
                content: line.to_owned(),
            });
        }
    }

    if structure.is_empty() {
        return Err(ParseError::MissingStructure);
    }
    if sequence.is_empty() {
        sequence = "N".repeat(structure.chars().count());
    }
    if sequence.chars().count() != structure.chars().count() {
        return Err(ParseError::LengthMismatch {
            sequence: sequence.chars().count(),
            structure: structure.chars().count(),
        });
    }

    Ok((sequence, structure))
}
