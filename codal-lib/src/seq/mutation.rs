use std::fmt;

use itertools::Itertools;
use serde::Serialize;

use super::amino::AminoAcid;
use super::codon::Codon;
use super::nucleic::NucleicAcid;

/// A codon-level difference between the query and one reference amino acid,
/// produced from the run of query nucleotides the traceback aligned against
/// that reference position.
///
/// The control string is the display-line annotation for the window: one
/// character per nucleotide column (`:` silently matching, `.` substituted
/// or surviving, `-` missing, `+` inserted), always exactly as wide as the
/// nucleotide column itself.
#[derive(Clone, Eq, PartialEq, Debug, Serialize)]
pub struct Mutation {
    position: usize,
    reference: AminoAcid,
    nucleic_acids: Vec<NucleicAcid>,
    codon: Option<Codon>,
    inserted_codons: Vec<Codon>,
    control: String,
}

impl Mutation {
    /// Classifies the window of query nucleotides aligned against the
    /// reference amino acid at 1-based `position`.
    ///
    /// Returns `None` for a silent match: a full codon translating to the
    /// reference with no complete inserted codon. A trailing partial triple
    /// never belongs to the mutation; it is the frame-shift helper's job.
    pub fn try_new(
        position: usize,
        nucleic_acids: &[NucleicAcid],
        reference: AminoAcid,
    ) -> Option<Mutation> {
        let len = nucleic_acids.len();
        if len < 3 {
            // The reference residue lost part or all of its codon.
            let mut control = ".".repeat(len);
            control.push_str(&"-".repeat(3 - len));
            return Some(Mutation {
                position,
                reference,
                nucleic_acids: nucleic_acids.to_vec(),
                codon: None,
                inserted_codons: Vec::new(),
                control,
            });
        }

        let codon = Codon::new(nucleic_acids[0], nucleic_acids[1], nucleic_acids[2]);
        let inserted_codons = nucleic_acids[3..]
            .chunks_exact(3)
            .map(|triple| Codon::new(triple[0], triple[1], triple[2]))
            .collect_vec();
        let silent = codon.translation() == reference;
        if silent && inserted_codons.is_empty() {
            return None;
        }

        let mut control = String::from(if silent { ":::" } else { "..." });
        control.push_str(&"+++".repeat(inserted_codons.len()));
        Some(Mutation {
            position,
            reference,
            nucleic_acids: nucleic_acids.to_vec(),
            codon: Some(codon),
            inserted_codons,
            control,
        })
    }

    /// 1-based reference position.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn reference(&self) -> AminoAcid {
        self.reference
    }

    /// The codon aligned against the reference residue; `None` for deletions.
    pub fn codon(&self) -> Option<Codon> {
        self.codon
    }

    pub fn inserted_codons(&self) -> &[Codon] {
        &self.inserted_codons
    }

    pub fn nucleic_acids(&self) -> &[NucleicAcid] {
        &self.nucleic_acids
    }

    pub fn control(&self) -> &str {
        &self.control
    }

    pub fn is_deletion(&self) -> bool {
        self.codon.is_none()
    }

    pub fn is_insertion(&self) -> bool {
        !self.inserted_codons.is_empty()
    }
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.codon {
            None => write!(f, "{}{}del", self.reference, self.position),
            Some(codon) if self.is_insertion() => write!(
                f,
                "{}{}{}_{}",
                self.reference,
                self.position,
                codon.translation(),
                self.inserted_codons.iter().join("")
            ),
            Some(codon) => write!(f, "{}{}{}", self.reference, self.position, codon.translation()),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::Mutation;
    use crate::seq::amino::AminoAcid;
    use crate::seq::nucleic::read_seq;

    fn classify(position: usize, nas: &str, reference: AminoAcid) -> Option<Mutation> {
        Mutation::try_new(position, &read_seq(nas).unwrap(), reference)
    }

    #[rstest]
    fn test_silent_match_is_absent() {
        assert!(classify(1, "ATG", AminoAcid::M).is_none());
        assert!(classify(7, "GAA", AminoAcid::E).is_none());
    }

    /// A silent anchor plus a trailing partial triple is still silent; the
    /// leftover nucleotides belong to the frame-shift helper.
    #[rstest]
    #[case("ATGA")]
    #[case("ATGAA")]
    fn test_silent_with_partial_tail_is_absent(#[case] nas: &str) {
        assert!(classify(1, nas, AminoAcid::M).is_none());
    }

    #[rstest]
    fn test_substitution() {
        let mutation = classify(2, "TAA", AminoAcid::E).unwrap();
        assert!(!mutation.is_deletion());
        assert!(!mutation.is_insertion());
        assert_eq!(mutation.position(), 2);
        assert_eq!(mutation.control(), "...");
        assert_eq!(mutation.codon().unwrap().translation(), AminoAcid::Stop);
        assert_eq!(mutation.to_string(), "E2*");
    }

    #[rstest]
    #[case("", "---")]
    #[case("A", ".--")]
    #[case("AC", "..-")]
    fn test_deletion_controls(#[case] nas: &str, #[case] control: &str) {
        let mutation = classify(4, nas, AminoAcid::K).unwrap();
        assert!(mutation.is_deletion());
        assert!(!mutation.is_insertion());
        assert_eq!(mutation.control(), control);
        assert!(mutation.codon().is_none());
        assert_eq!(mutation.to_string(), "K4del");
    }

    #[rstest]
    fn test_insertion_with_silent_anchor() {
        let mutation = classify(1, "ATGAAA", AminoAcid::M).unwrap();
        assert!(mutation.is_insertion());
        assert!(!mutation.is_deletion());
        assert_eq!(mutation.control(), ":::+++");
        assert_eq!(mutation.inserted_codons().len(), 1);
        assert_eq!(mutation.inserted_codons()[0].to_string(), "AAA");
        assert_eq!(mutation.to_string(), "M1M_AAA");
    }

    #[rstest]
    fn test_insertion_with_mutated_anchor() {
        let mutation = classify(3, "CCCGGGTTT", AminoAcid::R).unwrap();
        assert!(mutation.is_insertion());
        assert_eq!(mutation.control(), "...++++++");
        assert_eq!(mutation.inserted_codons().len(), 2);
        assert_eq!(mutation.to_string(), "R3P_GGGTTT");
    }

    /// The partial tail past the last complete triple is ignored.
    #[rstest]
    fn test_insertion_ignores_partial_tail() {
        let mutation = classify(1, "ATGAAAGG", AminoAcid::M).unwrap();
        assert_eq!(mutation.inserted_codons().len(), 1);
        assert_eq!(mutation.control(), ":::+++");
    }
}
