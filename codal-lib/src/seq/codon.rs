use std::fmt;

use lazy_static::lazy_static;
use serde::Serialize;

use super::amino::AminoAcid;
use super::nucleic::NucleicAcid;

/// The standard genetic code in NCBI layout: bases ordered `T C A G`, the
/// first base varying slowest.
const NCBI_AMINO_ACIDS: &str = "FFLLSSSSYY**CC*WLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG";

lazy_static! {
    /// Codon translation table indexed by `T`/`C`/`A`/`G` base indices.
    static ref CODON_TABLE: [[[AminoAcid; 4]; 4]; 4] = {
        let mut table = [[[AminoAcid::X; 4]; 4]; 4];
        let mut residues = NCBI_AMINO_ACIDS.chars();
        for first in &mut table {
            for second in first.iter_mut() {
                for aa in second.iter_mut() {
                    let symbol = residues.next().expect("genetic code table truncated");
                    *aa = AminoAcid::from_char(symbol).expect("invalid genetic code symbol");
                }
            }
        }
        table
    };
}

/// Index of a concrete base in the `T C A G` table order.
fn base_index(na: NucleicAcid) -> usize {
    match na {
        NucleicAcid::T => 0,
        NucleicAcid::C => 1,
        NucleicAcid::A => 2,
        NucleicAcid::G => 3,
        _ => panic!("base_index requires a concrete base, got {na}"),
    }
}

/// An ordered triple of nucleotides read against one reference amino acid.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize)]
pub struct Codon(pub [NucleicAcid; 3]);

impl Codon {
    pub fn new(first: NucleicAcid, second: NucleicAcid, third: NucleicAcid) -> Codon {
        Codon([first, second, third])
    }

    /// True when any position carries an ambiguity code.
    pub fn is_ambiguous(&self) -> bool {
        self.0.iter().any(|na| !na.is_concrete())
    }

    /// Translates the codon. Ambiguity codes are expanded; the result is the
    /// common amino acid when every expansion agrees, else `X`.
    pub fn translation(&self) -> AminoAcid {
        let mut translation: Option<AminoAcid> = None;
        for first in self.0[0].expansions() {
            for second in self.0[1].expansions() {
                for third in self.0[2].expansions() {
                    let aa = CODON_TABLE[base_index(*first)][base_index(*second)]
                        [base_index(*third)];
                    match translation {
                        None => translation = Some(aa),
                        Some(seen) if seen == aa => (),
                        Some(_) => return AminoAcid::X,
                    }
                }
            }
        }
        translation.unwrap_or(AminoAcid::X)
    }

    /// True when at least one expansion of the codon translates to `aa`.
    pub fn translates_to(&self, aa: AminoAcid) -> bool {
        for first in self.0[0].expansions() {
            for second in self.0[1].expansions() {
                for third in self.0[2].expansions() {
                    if CODON_TABLE[base_index(*first)][base_index(*second)][base_index(*third)]
                        == aa
                    {
                        return true;
                    }
                }
            }
        }
        false
    }
}

impl fmt::Display for Codon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.0[0], self.0[1], self.0[2])
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::Codon;
    use crate::seq::amino::AminoAcid;
    use crate::seq::nucleic::read_seq;

    fn codon(text: &str) -> Codon {
        let nas = read_seq(text).unwrap();
        Codon::new(nas[0], nas[1], nas[2])
    }

    #[rstest]
    #[case("ATG", AminoAcid::M)]
    #[case("TAA", AminoAcid::Stop)]
    #[case("TGA", AminoAcid::Stop)]
    #[case("GAA", AminoAcid::E)]
    #[case("CGT", AminoAcid::R)]
    #[case("AAA", AminoAcid::K)]
    fn test_translation(#[case] text: &str, #[case] expected: AminoAcid) {
        assert_eq!(codon(text).translation(), expected);
    }

    /// Expansions that agree collapse to a single residue.
    #[rstest]
    #[case("GGN", AminoAcid::G)]
    #[case("GAR", AminoAcid::E)]
    #[case("TAR", AminoAcid::Stop)]
    fn test_ambiguous_but_consistent(#[case] text: &str, #[case] expected: AminoAcid) {
        assert_eq!(codon(text).translation(), expected);
    }

    #[rstest]
    #[case("ATN")]
    #[case("NNN")]
    fn test_ambiguous_translation_is_x(#[case] text: &str) {
        assert_eq!(codon(text).translation(), AminoAcid::X);
    }

    #[rstest]
    fn test_translates_to() {
        assert!(codon("GAR").translates_to(AminoAcid::E));
        assert!(codon("ATN").translates_to(AminoAcid::M));
        assert!(!codon("ATG").translates_to(AminoAcid::E));
    }

    #[rstest]
    fn test_display() {
        assert_eq!(codon("ATG").to_string(), "ATG");
        assert!(codon("ATN").is_ambiguous());
        assert!(!codon("ATG").is_ambiguous());
    }
}
