use std::fmt;

use serde::Serialize;

use crate::error::CodalError;

/// A nucleotide from the IUPAC DNA alphabet, including the ambiguity codes
/// and the full wildcard `N`.
///
/// Declared in the same order as the printable alphabet. Only equality and
/// expansion to concrete bases matter to the aligner; the ordering exists so
/// the type can be used as a map key.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize)]
pub enum NucleicAcid {
    A,
    G,
    C,
    T,
    Y,
    R,
    W,
    S,
    K,
    M,
    D,
    V,
    H,
    B,
    N,
}

impl NucleicAcid {
    /// The concrete `A`/`C`/`G`/`T` bases this symbol stands for.
    pub fn expansions(&self) -> &'static [NucleicAcid] {
        use NucleicAcid::{A, B, C, D, G, H, K, M, N, R, S, T, V, W, Y};
        match self {
            A => &[A],
            G => &[G],
            C => &[C],
            T => &[T],
            Y => &[C, T],
            R => &[A, G],
            W => &[A, T],
            S => &[C, G],
            K => &[G, T],
            M => &[A, C],
            D => &[A, G, T],
            V => &[A, C, G],
            H => &[A, C, T],
            B => &[C, G, T],
            N => &[A, C, G, T],
        }
    }

    /// True for a concrete (unambiguous) base.
    pub fn is_concrete(&self) -> bool {
        self.expansions().len() == 1
    }

    pub fn to_char(self) -> char {
        match self {
            NucleicAcid::A => 'A',
            NucleicAcid::G => 'G',
            NucleicAcid::C => 'C',
            NucleicAcid::T => 'T',
            NucleicAcid::Y => 'Y',
            NucleicAcid::R => 'R',
            NucleicAcid::W => 'W',
            NucleicAcid::S => 'S',
            NucleicAcid::K => 'K',
            NucleicAcid::M => 'M',
            NucleicAcid::D => 'D',
            NucleicAcid::V => 'V',
            NucleicAcid::H => 'H',
            NucleicAcid::B => 'B',
            NucleicAcid::N => 'N',
        }
    }

    /// Parses a single symbol; lowercase is accepted and `U` is read as `T`.
    pub fn from_char(symbol: char) -> Option<NucleicAcid> {
        match symbol.to_ascii_uppercase() {
            'A' => Some(NucleicAcid::A),
            'G' => Some(NucleicAcid::G),
            'C' => Some(NucleicAcid::C),
            'T' | 'U' => Some(NucleicAcid::T),
            'Y' => Some(NucleicAcid::Y),
            'R' => Some(NucleicAcid::R),
            'W' => Some(NucleicAcid::W),
            'S' => Some(NucleicAcid::S),
            'K' => Some(NucleicAcid::K),
            'M' => Some(NucleicAcid::M),
            'D' => Some(NucleicAcid::D),
            'V' => Some(NucleicAcid::V),
            'H' => Some(NucleicAcid::H),
            'B' => Some(NucleicAcid::B),
            'N' => Some(NucleicAcid::N),
            _ => None,
        }
    }
}

impl fmt::Display for NucleicAcid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// Parses a nucleotide sequence, reporting the first offending symbol.
pub fn read_seq(text: &str) -> Result<Vec<NucleicAcid>, CodalError> {
    text.chars()
        .enumerate()
        .map(|(idx, symbol)| {
            NucleicAcid::from_char(symbol).ok_or(CodalError::InvalidNucleotide {
                symbol,
                position: idx + 1,
            })
        })
        .collect()
}

/// Renders a nucleotide slice as its printable form.
pub fn write_seq(seq: &[NucleicAcid]) -> String {
    seq.iter().map(|na| na.to_char()).collect()
}
