//! Text formats collaborators feed the engine: dot-bracket style
//! secondary-structure strings/files and BPSEQ.

mod bpseq;
mod secstruct;

pub use bpseq::{format_bpseq, pair_map_from_pairs, parse_bpseq};
pub use secstruct::{pairs_from_map, parse_secstruct, read_secstruct_str};

/// Failures while reading collaborator text formats.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unsupported secondary-structure symbol '{symbol}' at position {position}")]
    UnsupportedSymbol { symbol: char, position: usize },

    #[error("unbalanced secondary structure: unexpected '{symbol}' at position {position}")]
    UnbalancedClose { symbol: char, position: usize },

    #[error("unbalanced secondary structure: missing '{expected}'")]
    UnbalancedOpen { expected: char },

    #[error("line {line}: invalid bpseq record: {reason}")]
    InvalidBpseqLine { line: usize, reason: String },

    #[error("sequence length {sequence} does not match structure length {structure}")]
    LengthMismatch { sequence: usize, structure: usize },

    #[error("unrecognized line in secstruct input: {content}")]
    UnrecognizedLine { content: String },

    #[error("no secondary-structure line found in input")]
    MissingStructure,
}
