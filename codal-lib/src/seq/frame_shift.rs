use std::fmt;

use serde::Serialize;

use super::nucleic::{write_seq, NucleicAcid};

/// A reading-frame break: a run of query nucleotides aligned against one
/// reference amino acid whose length is not a multiple of three.
///
/// An insertion frame shift keeps the trailing partial triple (the
/// nucleotides past the last complete codon); a deletion frame shift keeps
/// the nucleotides that survive from the broken codon.
#[derive(Clone, Eq, PartialEq, Debug, Serialize)]
pub struct FrameShift {
    position: usize,
    nucleic_acids: Vec<NucleicAcid>,
    is_insertion: bool,
    gap_length: usize,
}

impl FrameShift {
    /// Builds the frame shift for the window at 1-based `position`, or
    /// `None` when the window length is a multiple of three.
    pub fn try_new(position: usize, nucleic_acids: &[NucleicAcid]) -> Option<FrameShift> {
        let len = nucleic_acids.len();
        let remainder = len % 3;
        if remainder == 0 {
            return None;
        }
        if len > 3 {
            Some(FrameShift {
                position,
                nucleic_acids: nucleic_acids[len - remainder..].to_vec(),
                is_insertion: true,
                gap_length: remainder,
            })
        } else {
            Some(FrameShift {
                position,
                nucleic_acids: nucleic_acids.to_vec(),
                is_insertion: false,
                gap_length: 3 - len,
            })
        }
    }

    /// 1-based reference position.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn nucleic_acids(&self) -> &[NucleicAcid] {
        &self.nucleic_acids
    }

    pub fn is_insertion(&self) -> bool {
        self.is_insertion
    }

    /// Number of out-of-frame positions: inserted nucleotides for an
    /// insertion, missing nucleotides for a deletion.
    pub fn gap_length(&self) -> usize {
        self.gap_length
    }
}

impl fmt::Display for FrameShift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_insertion {
            write!(f, "{}ins{}", self.position, write_seq(&self.nucleic_acids))
        } else {
            write!(f, "{}del{}", self.position, self.gap_length)
        }
    }
}
