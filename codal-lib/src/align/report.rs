use log::debug;
use serde::Serialize;

use super::aligner::CodonAligner;
use super::matrix::ScoreType;
use super::scoring::ScoreHandler;
use crate::seq::{amino, nucleic, FrameShift, Mutation};

/// The traceback-derived summary of one alignment: the aligned window in
/// both coordinate systems (1-based, inclusive), the mutations and frame
/// shifts in reference order, and three display lines of equal printable
/// width (three characters per reference position, plus any insertions).
#[derive(Clone, Eq, PartialEq, Debug, Default, Serialize)]
pub struct AlignmentReport {
    pub first_aa: usize,
    pub first_na: usize,
    pub last_aa: usize,
    pub last_na: usize,
    pub mutations: Vec<Mutation>,
    pub frame_shifts: Vec<FrameShift>,
    pub amino_acids_line: String,
    pub control_line: String,
    pub nucleic_acids_line: String,
}

fn pad_right(text: &str, width: usize) -> String {
    format!("{text:<width$}")
}

impl<S: ScoreHandler> CodonAligner<'_, S> {
    /// Follows a predecessor pointer, panicking on a corrupted matrix.
    fn predecessor(&self, index: usize) -> usize {
        let (_, prev) = self.matrix.get(index);
        assert!(prev >= 0, "traceback reached an unwritten cell at {index}");
        prev as usize
    }

    /// Walks the predecessor chain from the global maximum and builds the
    /// report.
    ///
    /// Pass 1 finds where the reported alignment starts: walking backwards,
    /// the last cell whose score is no greater than the running minimum.
    /// The comparison is deliberately non-strict so a score plateau at the
    /// alignment start keeps the full window. Pass 2 walks again, emitting
    /// one mutation/frame-shift window per consumed reference position and
    /// prepending display columns, since the walk runs end to start.
    pub fn report(&self) -> AlignmentReport {
        let end_mt_idx =
            self.matrix
                .index(ScoreType::General, self.max_score_pos_n, self.max_score_pos_a);
        let single_mt_len = self.matrix.plane_len();

        let mut start_mt_idx = 0;
        let mut prev_score = i32::MAX;
        let mut cur_mt_idx = end_mt_idx;
        loop {
            let (score, _) = self.matrix.get(cur_mt_idx);
            if score <= prev_score {
                prev_score = score;
                start_mt_idx = cur_mt_idx;
            }
            let prev = self.predecessor(cur_mt_idx);
            if prev == cur_mt_idx {
                break;
            }
            cur_mt_idx = prev;
        }

        let mut n_line = String::new();
        let mut a_line = String::new();
        let mut c_line = String::new();
        let mut first_aa = 0;
        let mut first_na = 0;
        let mut last_aa = 0;
        let mut last_na = 0;
        let mut mutations: Vec<Mutation> = Vec::with_capacity(10);
        let mut frame_shifts: Vec<FrameShift> = Vec::with_capacity(3);
        let mut last_pos: Option<(usize, usize)> = None;
        let mut last_score_type = ScoreType::General;
        let mut has_unprocessed_nas = false;
        let mut cur_mt_idx = end_mt_idx;

        // The modulo guard confines the walk to cells at or past the
        // alignment start, independent of which plane a cell lives in.
        while cur_mt_idx % single_mt_len >= start_mt_idx % single_mt_len {
            let (score_type, pos_n, pos_a) = self.matrix.decode(cur_mt_idx);
            if last_aa == 0 && last_na == 0 {
                last_aa = pos_a;
                last_na = pos_n;
            }
            first_aa = pos_a + 1;
            first_na = pos_n + 1;

            if last_score_type != ScoreType::Ins {
                if let Some((last_pos_n, last_pos_a)) = last_pos {
                    let mut partial_n_line = String::new();
                    let mut partial_a_line = String::new();
                    let mut partial_c_line = String::new();
                    let mut mutation = None;
                    let mut frame_shift = None;

                    if last_pos_a > pos_a {
                        has_unprocessed_nas = false;
                        let window = &self.n_seq[pos_n..last_pos_n];
                        mutation = Mutation::try_new(pos_a + 1, window, self.a_seq[pos_a]);
                        frame_shift = FrameShift::try_new(pos_a + 1, window);
                        if let Some(mutation) = &mutation {
                            mutations.push(mutation.clone());
                        }
                        if let Some(frame_shift) = &frame_shift {
                            frame_shifts.push(frame_shift.clone());
                        }
                    }

                    if last_pos_a > pos_a && last_pos_n - pos_n > 2 && mutation.is_none() {
                        // Silent full-codon match.
                        partial_n_line.push_str(&nucleic::write_seq(&self.n_seq[pos_n..pos_n + 3]));
                        partial_a_line.push_str(&pad_right(
                            &amino::write_seq(&self.a_seq[pos_a..last_pos_a]),
                            3,
                        ));
                        partial_c_line.push_str(":::");
                    } else if let Some(mutation) = &mutation {
                        partial_c_line.push_str(mutation.control());
                        if mutation.is_deletion() {
                            partial_n_line.push_str("   ");
                            partial_a_line.push_str(&pad_right(
                                &amino::write_seq(&self.a_seq[pos_a..last_pos_a]),
                                3,
                            ));
                        } else {
                            let codon = mutation.codon().expect("non-deletion mutation has a codon");
                            partial_n_line.push_str(&codon.to_string());
                            partial_a_line.push_str(&pad_right(
                                &amino::write_seq(&self.a_seq[pos_a..last_pos_a]),
                                3,
                            ));
                            for ins_codon in mutation.inserted_codons() {
                                partial_n_line.push_str(&ins_codon.to_string());
                                partial_a_line.push_str("   ");
                            }
                        }
                    }

                    if let Some(frame_shift) = &frame_shift {
                        if frame_shift.is_insertion() {
                            partial_n_line.push_str(&nucleic::write_seq(frame_shift.nucleic_acids()));
                            partial_a_line.push_str(&" ".repeat(frame_shift.gap_length()));
                            partial_c_line.push_str(&"+".repeat(frame_shift.gap_length()));
                        }
                    }

                    // The walk runs end to start, so columns are prepended.
                    n_line.insert_str(0, &partial_n_line);
                    a_line.insert_str(0, &partial_a_line);
                    c_line.insert_str(0, &partial_c_line);
                }
            }

            cur_mt_idx = self.predecessor(cur_mt_idx);
            if last_score_type == ScoreType::Ins {
                // The nucleotides consumed on the INS plane stay pending
                // until the next diagonal step claims the whole window.
                has_unprocessed_nas = true;
            } else if !has_unprocessed_nas {
                last_pos = Some((pos_n, pos_a));
            }
            last_score_type = score_type;
            if pos_n == 0 || pos_a == 0 {
                break;
            }
        }

        mutations.reverse();
        frame_shifts.reverse();

        debug!("amino acids line:   {a_line}");
        debug!("control line:       {c_line}");
        debug!("nucleic acids line: {n_line}");
        debug!(
            "alignment window: AA {first_aa}..{last_aa}, NA {first_na}..{last_na}, score {}",
            self.max_score
        );

        AlignmentReport {
            first_aa,
            first_na,
            last_aa,
            last_na,
            mutations,
            frame_shifts,
            amino_acids_line: a_line,
            control_line: c_line,
            nucleic_acids_line: n_line,
        }
    }
}
