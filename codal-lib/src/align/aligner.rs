use super::matrix::{ScoreMatrix, ScoreType};
use super::scoring::ScoreHandler;
use crate::seq::{AminoAcid, NucleicAcid};

/// Value to use as a 'negative infinity' score. Low enough that no chain of
/// reasonable penalties added on top of it can underflow an `i32`; kernel
/// additions saturate regardless.
pub const MIN_SCORE: i32 = -(i32::MAX / 2) - 1;

/// A codon-aware affine-gap aligner of a nucleotide query against an
/// amino-acid reference.
///
/// Three score planes interact, filled column by column over the reference:
///
/// `GENERAL(i, j)` is the best score with `n_seq[..i]` and `a_seq[..j]`
/// consumed and the alignment ending on the diagonal: up to three query
/// nucleotides spent on reference residue `j`, missing positions scored as
/// the wildcard `N`.
///
/// `INS(i, j)` is the best score ending in query-only consumption: a whole
/// inserted codon (entered from three nucleotides back, chainable) or a
/// frame-breaking run of one or two nucleotides.
///
/// `DEL(i, j)` is the best score ending with reference residue `j` deleted,
/// either cleanly (no query nucleotide spent, chainable codon by codon) or
/// with one or two query nucleotides of the broken codon surviving.
///
/// The fill keeps only a three-column window of GENERAL/INS scores and one
/// column of DEL scores as rolling state; every cell's score and predecessor
/// index still go to the [`ScoreMatrix`] for the traceback. Candidate order
/// and the mixed strict/non-strict comparisons are deliberate: deletions and
/// plane switches win ties so that gap runs stay contiguous and the
/// alignment stays as long as possible. The same preference drives the
/// global maximum, where the latest cell in sweep order wins on equality.
pub struct CodonAligner<'a, S: ScoreHandler> {
    pub(crate) n_seq: &'a [NucleicAcid],
    pub(crate) a_seq: &'a [AminoAcid],
    pub(crate) n_seq_len: usize,
    pub(crate) a_seq_len: usize,
    pub(crate) score_handler: &'a S,
    pub(crate) matrix: ScoreMatrix,
    pub(crate) max_score_pos_n: usize,
    pub(crate) max_score_pos_a: usize,
    pub(crate) max_score: i32,
    q: i32,
    r: i32,
    supports_positional_indel: bool,
    const_indel_codon_opening_score: i32,
    const_indel_codon_extension_score: i32,
}

impl<'a, S: ScoreHandler> CodonAligner<'a, S> {
    /// Builds the aligner and runs the fill; the matrix is written once here
    /// and only read afterwards.
    pub fn new(n_seq: &'a [NucleicAcid], a_seq: &'a [AminoAcid], score_handler: &'a S) -> Self {
        let n_seq_len = n_seq.len();
        let a_seq_len = a_seq.len();
        let (const_indel_codon_opening_score, const_indel_codon_extension_score) =
            score_handler.constant_indel_codon_score();
        let mut aligner = CodonAligner {
            q: score_handler.gap_opening_score(),
            r: score_handler.gap_extension_score(),
            n_seq,
            a_seq,
            n_seq_len,
            a_seq_len,
            score_handler,
            matrix: ScoreMatrix::new(n_seq_len, a_seq_len),
            max_score_pos_n: 0,
            max_score_pos_a: 0,
            max_score: MIN_SCORE,
            supports_positional_indel: score_handler.is_positional_indel_score_supported(),
            const_indel_codon_opening_score,
            const_indel_codon_extension_score,
        };
        aligner.fill_matrix();
        aligner
    }

    /// The best GENERAL score over the whole matrix.
    pub fn max_score(&self) -> i32 {
        self.max_score
    }

    /// `(written, total)` matrix cell counts.
    pub fn filled_cells(&self) -> (usize, usize) {
        self.matrix.filled_cells()
    }

    /// 1-based query nucleotide.
    fn na(&self, pos_n: usize) -> NucleicAcid {
        self.n_seq[pos_n - 1]
    }

    /// 1-based reference amino acid.
    fn aa(&self, pos_a: usize) -> AminoAcid {
        self.a_seq[pos_a - 1]
    }

    fn indel_codon_score(&self, pos_a: usize, is_insertion: bool) -> (i32, i32) {
        if self.supports_positional_indel {
            self.score_handler
                .positional_indel_codon_score(pos_a, is_insertion)
        } else {
            (
                self.const_indel_codon_opening_score,
                self.const_indel_codon_extension_score,
            )
        }
    }

    /// The INS cell at `(pos_n, pos_a)`: query-only consumption. Codon-sized
    /// insertions may chain; 1- and 2-nucleotide insertions are frame-shift
    /// candidates and must restart from GENERAL.
    fn calc_ins_score(
        &self,
        pos_n: usize,
        pos_a: usize,
        g_score30: i32,
        i_score30: i32,
        g_score20: i32,
        g_score10: i32,
    ) -> (i32, i32) {
        if pos_n == 0 && pos_a > 0 {
            // Leading reference gap.
            return (self.q, self.matrix.index(ScoreType::General, 0, 0) as i32);
        }

        let q = self.q;
        let r = self.r;
        let (ins_opening_score, ins_extension_score) = self.indel_codon_score(pos_a, true);
        let mut score = MIN_SCORE;
        let mut prev = self.matrix.index(ScoreType::General, 0, 0) as i32;
        if pos_n > 3 {
            let cand = i_score30.saturating_add(r + r + r + ins_extension_score);
            if cand > score {
                score = cand;
                prev = self.matrix.index(ScoreType::Ins, pos_n - 3, pos_a) as i32;
            }
            let cand =
                g_score30.saturating_add(q + r + r + r + ins_opening_score + ins_extension_score);
            if cand > score {
                score = cand;
                prev = self.matrix.index(ScoreType::General, pos_n - 3, pos_a) as i32;
            }
        }
        if pos_n > 2 {
            let cand = g_score20.saturating_add(q + r + r);
            if cand > score {
                score = cand;
                prev = self.matrix.index(ScoreType::General, pos_n - 2, pos_a) as i32;
            }
        }
        if pos_n > 0 {
            let cand = g_score10.saturating_add(q + r);
            if cand > score {
                score = cand;
                prev = self.matrix.index(ScoreType::General, pos_n - 1, pos_a) as i32;
            }
        }
        (score, prev)
    }

    /// The DEL cell at `(pos_n, pos_a)`: reference residue `pos_a` deleted,
    /// spending zero, one or two query nucleotides of the broken codon.
    /// Extension and DEL-to-DEL arms compare non-strictly so ties keep the
    /// deletion run together.
    fn calc_del_score(
        &self,
        pos_n: usize,
        pos_a: usize,
        g_score01: i32,
        g_score11: i32,
        g_score21: i32,
        d_score01: i32,
        d_score11: i32,
    ) -> (i32, i32) {
        if pos_n > 0 && pos_a == 0 {
            // Leading query gap.
            return (self.q, self.matrix.index(ScoreType::General, 0, 0) as i32);
        }
        if pos_n == 0 {
            // Unreachable from any GENERAL cell; left at the sentinel.
            return (MIN_SCORE, self.matrix.index(ScoreType::General, 0, 0) as i32);
        }

        let sh = self.score_handler;
        let q = self.q;
        let r = self.r;
        let cur_na = self.na(pos_n);
        let cur_aa = self.aa(pos_a);
        let n = NucleicAcid::N;
        let mut_score_n0n = sh.substitution_score(pos_a, n, cur_na, n, cur_aa);
        let (del_opening_score, del_extension_score) = self.indel_codon_score(pos_a, false);

        let mut score = MIN_SCORE;
        let mut prev = self.matrix.index(ScoreType::General, 0, 0) as i32;

        let cand = d_score01.saturating_add(r + r + r + del_extension_score);
        if cand >= score {
            score = cand;
            prev = self.matrix.index(ScoreType::Del, pos_n, pos_a - 1) as i32;
        }

        let cand =
            g_score01.saturating_add(q + r + r + r + del_opening_score + del_extension_score);
        if cand > score {
            score = cand;
            prev = self.matrix.index(ScoreType::General, pos_n, pos_a - 1) as i32;
        }

        let cand = g_score11
            .saturating_add(sh.substitution_score(pos_a, cur_na, n, n, cur_aa) + q + r + r);
        if cand > score {
            score = cand;
            prev = self.matrix.index(ScoreType::General, pos_n - 1, pos_a - 1) as i32;
        }

        let cand = g_score11.saturating_add(mut_score_n0n + q + r + q + r);
        if cand > score {
            score = cand;
            prev = self.matrix.index(ScoreType::General, pos_n - 1, pos_a - 1) as i32;
        }

        if pos_n > 1 {
            let prev_na = self.na(pos_n - 1);
            let cand = d_score11.saturating_add(mut_score_n0n + q + r + r);
            if cand >= score {
                score = cand;
                prev = self.matrix.index(ScoreType::Del, pos_n - 1, pos_a - 1) as i32;
            }

            let cand = g_score21
                .saturating_add(sh.substitution_score(pos_a, prev_na, cur_na, n, cur_aa) + q + r);
            if cand >= score {
                score = cand;
                prev = self.matrix.index(ScoreType::General, pos_n - 2, pos_a - 1) as i32;
            }
        }
        (score, prev)
    }

    /// The GENERAL cell at `(pos_n, pos_a)`: up to three query nucleotides
    /// consumed against reference residue `pos_a`, or a penalty-free switch
    /// from the INS/DEL plane at the same cell.
    fn calc_general_score(
        &self,
        pos_n: usize,
        pos_a: usize,
        g_score11: i32,
        g_score21: i32,
        g_score31: i32,
        i_score00: i32,
        d_score00: i32,
        d_score11: i32,
        d_score21: i32,
    ) -> (i32, i32) {
        if pos_n == 0 || pos_a == 0 {
            // Boundary cells point at themselves so the traceback can stop.
            return (
                0,
                self.matrix.index(ScoreType::General, pos_n, pos_a) as i32,
            );
        }

        let sh = self.score_handler;
        let q = self.q;
        let r = self.r;
        let cur_na = self.na(pos_n);
        let cur_aa = self.aa(pos_a);
        let n = NucleicAcid::N;
        let mut_score_nn0 = sh.substitution_score(pos_a, n, n, cur_na, cur_aa);

        let mut score = MIN_SCORE;
        let mut prev = self.matrix.index(ScoreType::General, 0, 0) as i32;

        let cand = g_score11.saturating_add(mut_score_nn0 + q + r + r);
        if cand > score {
            score = cand;
            prev = self.matrix.index(ScoreType::General, pos_n - 1, pos_a - 1) as i32;
        }

        if pos_n > 1 {
            let prev_na = self.na(pos_n - 1);
            let mut_score_n10 = sh.substitution_score(pos_a, n, prev_na, cur_na, cur_aa);

            let cand = g_score21
                .saturating_add(sh.substitution_score(pos_a, prev_na, n, cur_na, cur_aa) + q + r);
            if cand > score {
                score = cand;
                prev = self.matrix.index(ScoreType::General, pos_n - 2, pos_a - 1) as i32;
            }

            let cand = g_score21.saturating_add(mut_score_n10 + q + r);
            if cand > score {
                score = cand;
                prev = self.matrix.index(ScoreType::General, pos_n - 2, pos_a - 1) as i32;
            }

            let cand = d_score11.saturating_add(mut_score_nn0 + r + r);
            if cand >= score {
                score = cand;
                prev = self.matrix.index(ScoreType::Del, pos_n - 1, pos_a - 1) as i32;
            }

            if pos_n > 2 {
                let prev_na2 = self.na(pos_n - 2);
                let cand = g_score31.saturating_add(sh.substitution_score(
                    pos_a, prev_na2, prev_na, cur_na, cur_aa,
                ));
                if cand > score {
                    score = cand;
                    prev = self.matrix.index(ScoreType::General, pos_n - 3, pos_a - 1) as i32;
                }

                let cand = d_score21.saturating_add(mut_score_n10 + r);
                if cand >= score {
                    score = cand;
                    prev = self.matrix.index(ScoreType::Del, pos_n - 2, pos_a - 1) as i32;
                }
            }
        }

        if i_score00 >= score {
            score = i_score00;
            prev = self.matrix.index(ScoreType::Ins, pos_n, pos_a) as i32;
        }
        if d_score00 >= score {
            score = d_score00;
            prev = self.matrix.index(ScoreType::Del, pos_n, pos_a) as i32;
        }
        (score, prev)
    }

    /// Column-major fill. Within a cell the order INS, DEL, GENERAL matters:
    /// the GENERAL cell may consume both plane values at the same position.
    fn fill_matrix(&mut self) {
        let mut max_score = MIN_SCORE;
        let mut max_score_pos_n = 0;
        let mut max_score_pos_a = 0;
        let mut g_scores = vec![0i32; self.n_seq_len + 1];
        let mut d_scores = vec![0i32; self.n_seq_len + 1];
        let mut g_scores_cur = vec![0i32; self.n_seq_len + 1];
        let mut d_scores_cur = vec![0i32; self.n_seq_len + 1];

        for pos_a in 0..=self.a_seq_len {
            let mut g_score30 = MIN_SCORE;
            let mut g_score20 = MIN_SCORE;
            let mut g_score10 = MIN_SCORE;
            let mut i_score30 = MIN_SCORE;
            let mut i_score20 = MIN_SCORE;
            let mut i_score10 = MIN_SCORE;

            for pos_n in 0..=self.n_seq_len {
                let g_score01 = g_scores[pos_n];
                let d_score01 = d_scores[pos_n];
                let mut g_score11 = MIN_SCORE;
                let mut g_score21 = MIN_SCORE;
                let mut g_score31 = MIN_SCORE;
                let mut d_score11 = MIN_SCORE;
                let mut d_score21 = MIN_SCORE;
                if pos_n > 0 {
                    g_score11 = g_scores[pos_n - 1];
                    d_score11 = d_scores[pos_n - 1];
                }
                if pos_n > 1 {
                    g_score21 = g_scores[pos_n - 2];
                    d_score21 = d_scores[pos_n - 2];
                }
                if pos_n > 2 {
                    g_score31 = g_scores[pos_n - 3];
                }

                let (i_score00, prev) =
                    self.calc_ins_score(pos_n, pos_a, g_score30, i_score30, g_score20, g_score10);
                self.matrix.set(ScoreType::Ins, pos_n, pos_a, i_score00, prev);

                let (d_score00, prev) = self.calc_del_score(
                    pos_n, pos_a, g_score01, g_score11, g_score21, d_score01, d_score11,
                );
                d_scores_cur[pos_n] = d_score00;
                self.matrix.set(ScoreType::Del, pos_n, pos_a, d_score00, prev);

                let (g_score00, prev) = self.calc_general_score(
                    pos_n, pos_a, g_score11, g_score21, g_score31, i_score00, d_score00,
                    d_score11, d_score21,
                );
                g_scores_cur[pos_n] = g_score00;
                self.matrix
                    .set(ScoreType::General, pos_n, pos_a, g_score00, prev);

                // The last cell achieving the maximum wins, which yields the
                // longest alignment when several endings score equally.
                if g_score00 >= max_score {
                    max_score = g_score00;
                    max_score_pos_n = pos_n;
                    max_score_pos_a = pos_a;
                }

                g_score30 = g_score20;
                g_score20 = g_score10;
                g_score10 = g_score00;
                i_score30 = i_score20;
                i_score20 = i_score10;
                i_score10 = i_score00;
            }

            std::mem::swap(&mut g_scores, &mut g_scores_cur);
            std::mem::swap(&mut d_scores, &mut d_scores_cur);
        }

        self.max_score_pos_n = max_score_pos_n;
        self.max_score_pos_a = max_score_pos_a;
        self.max_score = max_score;
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{CodonAligner, MIN_SCORE};
    use crate::align::matrix::ScoreType;
    use crate::align::scoring::GeneralScoreHandler;
    use crate::seq::{amino, nucleic, AminoAcid, NucleicAcid};

    fn n(text: &str) -> Vec<NucleicAcid> {
        nucleic::read_seq(text).unwrap()
    }

    fn a(text: &str) -> Vec<AminoAcid> {
        amino::read_seq(text).unwrap()
    }

    #[rstest]
    fn test_exact_match_score() {
        let n_seq = n("ATGGAACGT");
        let a_seq = a("MER");
        let handler = GeneralScoreHandler::default_scores();
        let aligner = CodonAligner::new(&n_seq, &a_seq, &handler);
        assert_eq!(aligner.max_score(), 30);
        assert_eq!(aligner.max_score_pos_n, 9);
        assert_eq!(aligner.max_score_pos_a, 3);
    }

    #[rstest]
    fn test_single_codon_substitution_score() {
        let n_seq = n("ATGTAACGT");
        let a_seq = a("MER");
        let handler = GeneralScoreHandler::default_scores();
        let aligner = CodonAligner::new(&n_seq, &a_seq, &handler);
        // Match, stop-for-E mismatch, match: 10 - 4 + 10.
        assert_eq!(aligner.max_score(), 16);
    }

    #[rstest]
    fn test_empty_sequences() {
        let handler = GeneralScoreHandler::default_scores();
        let aligner = CodonAligner::new(&[], &[], &handler);
        assert_eq!(aligner.max_score(), 0);

        let n_seq = n("ATG");
        let aligner = CodonAligner::new(&n_seq, &[], &handler);
        assert_eq!(aligner.max_score(), 0);

        let a_seq = a("M");
        let aligner = CodonAligner::new(&[], &a_seq, &handler);
        assert_eq!(aligner.max_score(), 0);
    }

    /// Two endings score equally; the later cell in sweep order must win so
    /// the alignment covers the deletion instead of stopping before it.
    #[rstest]
    fn test_score_tie_prefers_longer_alignment() {
        let n_seq = n("ATGCGT");
        let a_seq = a("MER");
        let handler = GeneralScoreHandler::new(10, -4, -4, -1, -2, -1);
        let aligner = CodonAligner::new(&n_seq, &a_seq, &handler);
        assert_eq!(aligner.max_score(), 10);
        assert_eq!(aligner.max_score_pos_n, 6);
        assert_eq!(aligner.max_score_pos_a, 3);
    }

    #[rstest]
    fn test_full_rectangle_is_written() {
        let n_seq = n("ATGGAACGT");
        let a_seq = a("MER");
        let handler = GeneralScoreHandler::default_scores();
        let aligner = CodonAligner::new(&n_seq, &a_seq, &handler);
        let (written, total) = aligner.filled_cells();
        assert_eq!(written, total);
        assert_eq!(total, 3 * 10 * 4);
    }

    #[rstest]
    fn test_recorded_max_matches_matrix_scan() {
        let n_seq = n("TTTATGGAACGTTT");
        let a_seq = a("MER");
        let handler = GeneralScoreHandler::default_scores();
        let aligner = CodonAligner::new(&n_seq, &a_seq, &handler);

        let mut best = MIN_SCORE;
        for pos_a in 0..=a_seq.len() {
            for pos_n in 0..=n_seq.len() {
                let index = aligner.matrix.index(ScoreType::General, pos_n, pos_a);
                let (score, _) = aligner.matrix.get(index);
                best = best.max(score);
                // No cell later in sweep order may tie the recorded argmax.
                let later = pos_a > aligner.max_score_pos_a
                    || (pos_a == aligner.max_score_pos_a && pos_n > aligner.max_score_pos_n);
                if later {
                    assert!(score < aligner.max_score());
                }
            }
        }
        assert_eq!(best, aligner.max_score());
    }

    /// GENERAL boundary rows are free; the INS column and DEL row edges
    /// carry one gap opening and point at the origin.
    #[rstest]
    fn test_boundary_cells() {
        let n_seq = n("ATGGAA");
        let a_seq = a("ME");
        let handler = GeneralScoreHandler::default_scores();
        let aligner = CodonAligner::new(&n_seq, &a_seq, &handler);

        let origin = aligner.matrix.index(ScoreType::General, 0, 0) as i32;
        for pos_n in 0..=6 {
            let index = aligner.matrix.index(ScoreType::General, pos_n, 0);
            let (score, prev) = aligner.matrix.get(index);
            assert_eq!(score, 0);
            assert_eq!(prev as usize, index, "boundary cells self-loop");
            if pos_n > 0 {
                let index = aligner.matrix.index(ScoreType::Del, pos_n, 0);
                assert_eq!(aligner.matrix.get(index), (-10, origin));
            }
        }
        for pos_a in 1..=2 {
            let index = aligner.matrix.index(ScoreType::General, 0, pos_a);
            assert_eq!(aligner.matrix.get(index).0, 0);
            let index = aligner.matrix.index(ScoreType::Ins, 0, pos_a);
            assert_eq!(aligner.matrix.get(index), (-10, origin));
        }
    }

    /// Iterated predecessor lookups from any GENERAL cell reach a boundary
    /// self-loop within a linear number of steps.
    #[rstest]
    fn test_traceback_closure() {
        let n_seq = n("ATGAGAACGT");
        let a_seq = a("MER");
        let handler = GeneralScoreHandler::default_scores();
        let aligner = CodonAligner::new(&n_seq, &a_seq, &handler);

        let bound = 3 * (n_seq.len() + a_seq.len()) + 3;
        for pos_a in 0..=a_seq.len() {
            for pos_n in 0..=n_seq.len() {
                let mut index = aligner.matrix.index(ScoreType::General, pos_n, pos_a);
                let mut steps = 0;
                loop {
                    let (_, prev) = aligner.matrix.get(index);
                    assert!(prev >= 0, "walked into an unwritten cell");
                    if prev as usize == index {
                        break;
                    }
                    index = prev as usize;
                    steps += 1;
                    assert!(steps <= bound, "traceback did not terminate");
                }
            }
        }
    }
}
