use std::collections::HashMap;

use crate::seq::{AminoAcid, Codon, NucleicAcid};

/// Supplies every score the alignment kernel consumes.
///
/// All methods are pure functions of their arguments; `a_pos` is the 1-based
/// reference position. Gap and indel scores must not be positive.
pub trait ScoreHandler {
    /// The score for opening a gap (should not be positive).
    fn gap_opening_score(&self) -> i32;

    /// The score for extending a gap by one position (should not be positive).
    fn gap_extension_score(&self) -> i32;

    /// The `(opening, extension)` adjustment applied to codon-sized indels
    /// when no positional score is available.
    fn constant_indel_codon_score(&self) -> (i32, i32);

    /// True when codon indel scores vary by reference position.
    fn is_positional_indel_score_supported(&self) -> bool;

    /// The `(opening, extension)` adjustment for a codon-sized indel at
    /// `a_pos`, distinguishing insertions from deletions.
    fn positional_indel_codon_score(&self, a_pos: usize, is_insertion: bool) -> (i32, i32);

    /// Scores the codon `(na0, na1, na2)` against the reference amino acid at
    /// `a_pos`. Any of the three nucleotides may be the wildcard `N` standing
    /// for a position the current recurrence arm does not consume.
    fn substitution_score(
        &self,
        a_pos: usize,
        na0: NucleicAcid,
        na1: NucleicAcid,
        na2: NucleicAcid,
        aa: AminoAcid,
    ) -> i32;
}

/// A [`ScoreHandler`] with flat match/mismatch substitution scoring and an
/// optional per-position codon indel table.
///
/// Partial codons are scored neutrally: a window containing the wildcard `N`
/// contributes zero. A complete codon scores `match` when any expansion of
/// its ambiguity codes translates to the reference residue, else `mismatch`.
#[derive(Clone, Debug)]
pub struct GeneralScoreHandler {
    match_score: i32,
    mismatch_score: i32,
    gap_opening_score: i32,
    gap_extension_score: i32,
    indel_codon_opening_score: i32,
    indel_codon_extension_score: i32,
    positional_indel_scores: Option<HashMap<(usize, bool), (i32, i32)>>,
}

impl GeneralScoreHandler {
    pub fn new(
        match_score: i32,
        mismatch_score: i32,
        gap_opening_score: i32,
        gap_extension_score: i32,
        indel_codon_opening_score: i32,
        indel_codon_extension_score: i32,
    ) -> Self {
        assert!(match_score > 0, "match_score must be positive");
        assert!(mismatch_score <= 0, "mismatch_score can't be positive");
        assert!(gap_opening_score <= 0, "gap_opening_score can't be positive");
        assert!(
            gap_extension_score <= 0,
            "gap_extension_score can't be positive"
        );
        assert!(
            indel_codon_opening_score <= 0,
            "indel_codon_opening_score can't be positive"
        );
        assert!(
            indel_codon_extension_score <= 0,
            "indel_codon_extension_score can't be positive"
        );

        Self {
            match_score,
            mismatch_score,
            gap_opening_score,
            gap_extension_score,
            indel_codon_opening_score,
            indel_codon_extension_score,
            positional_indel_scores: None,
        }
    }

    /// Installs a `(a_pos, is_insertion) -> (opening, extension)` table;
    /// positions absent from the table fall back to the constant pair.
    pub fn with_positional_indel_scores(
        mut self,
        scores: HashMap<(usize, bool), (i32, i32)>,
    ) -> Self {
        self.positional_indel_scores = Some(scores);
        self
    }

    /// The defaults used throughout the test suite: match 10, mismatch -4,
    /// gap open -10, gap extend -2, codon indel -6/-4.
    pub fn default_scores() -> Self {
        Self::new(10, -4, -10, -2, -6, -4)
    }
}

impl ScoreHandler for GeneralScoreHandler {
    fn gap_opening_score(&self) -> i32 {
        self.gap_opening_score
    }

    fn gap_extension_score(&self) -> i32 {
        self.gap_extension_score
    }

    fn constant_indel_codon_score(&self) -> (i32, i32) {
        (
            self.indel_codon_opening_score,
            self.indel_codon_extension_score,
        )
    }

    fn is_positional_indel_score_supported(&self) -> bool {
        self.positional_indel_scores.is_some()
    }

    fn positional_indel_codon_score(&self, a_pos: usize, is_insertion: bool) -> (i32, i32) {
        self.positional_indel_scores
            .as_ref()
            .and_then(|scores| scores.get(&(a_pos, is_insertion)).copied())
            .unwrap_or((
                self.indel_codon_opening_score,
                self.indel_codon_extension_score,
            ))
    }

    fn substitution_score(
        &self,
        _a_pos: usize,
        na0: NucleicAcid,
        na1: NucleicAcid,
        na2: NucleicAcid,
        aa: AminoAcid,
    ) -> i32 {
        if na0 == NucleicAcid::N || na1 == NucleicAcid::N || na2 == NucleicAcid::N {
            return 0;
        }
        if Codon::new(na0, na1, na2).translates_to(aa) {
            self.match_score
        } else {
            self.mismatch_score
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rstest::rstest;

    use super::{GeneralScoreHandler, ScoreHandler};
    use crate::seq::nucleic::read_seq;
    use crate::seq::{AminoAcid, NucleicAcid};

    fn sub(handler: &GeneralScoreHandler, codon: &str, aa: AminoAcid) -> i32 {
        let nas = read_seq(codon).unwrap();
        handler.substitution_score(1, nas[0], nas[1], nas[2], aa)
    }

    #[rstest]
    fn test_substitution_scores() {
        let handler = GeneralScoreHandler::default_scores();
        assert_eq!(sub(&handler, "ATG", AminoAcid::M), 10);
        assert_eq!(sub(&handler, "TAA", AminoAcid::E), -4);
        // An ambiguity code that can still code for the reference matches.
        assert_eq!(sub(&handler, "GAR", AminoAcid::E), 10);
    }

    /// A wildcard anywhere makes the window score neutral.
    #[rstest]
    #[case("NTG")]
    #[case("ANG")]
    #[case("ATN")]
    #[case("NNN")]
    fn test_wildcard_is_neutral(#[case] codon: &str) {
        let handler = GeneralScoreHandler::default_scores();
        assert_eq!(sub(&handler, codon, AminoAcid::M), 0);
    }

    #[rstest]
    fn test_constant_indel_codon_score() {
        let handler = GeneralScoreHandler::default_scores();
        assert!(!handler.is_positional_indel_score_supported());
        assert_eq!(handler.constant_indel_codon_score(), (-6, -4));
    }

    #[rstest]
    fn test_positional_indel_scores_with_fallback() {
        let mut scores = HashMap::new();
        scores.insert((2, true), (-1, 0));
        scores.insert((2, false), (-12, -8));
        let handler = GeneralScoreHandler::default_scores().with_positional_indel_scores(scores);

        assert!(handler.is_positional_indel_score_supported());
        assert_eq!(handler.positional_indel_codon_score(2, true), (-1, 0));
        assert_eq!(handler.positional_indel_codon_score(2, false), (-12, -8));
        // Positions without an entry use the constant pair.
        assert_eq!(handler.positional_indel_codon_score(5, true), (-6, -4));
    }

    #[rstest]
    #[should_panic(expected = "gap_opening_score can't be positive")]
    fn test_rejects_positive_gap_open() {
        let _ = GeneralScoreHandler::new(10, -4, 1, -2, -6, -4);
    }

    #[rstest]
    fn test_wildcard_expansion_is_total() {
        // The wildcard itself expands to all four bases, so it never panics
        // when handed to the codon machinery.
        assert_eq!(NucleicAcid::N.expansions().len(), 4);
    }
}
