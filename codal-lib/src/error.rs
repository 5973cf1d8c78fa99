use thiserror::Error;

/// Errors produced while turning text into typed sequences.
///
/// The alignment kernel itself has no recoverable failure modes: invalid
/// symbols cannot be represented once parsing has succeeded, and internal
/// traceback inconsistencies are programming errors that panic.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodalError {
    #[error("invalid nucleotide {symbol:?} at position {position}")]
    InvalidNucleotide { symbol: char, position: usize },

    #[error("invalid amino acid {symbol:?} at position {position}")]
    InvalidAminoAcid { symbol: char, position: usize },
}
