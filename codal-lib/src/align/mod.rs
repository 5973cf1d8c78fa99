//! Codon-aware pairwise alignment of a nucleotide query against an
//! amino-acid reference.
//!
//! The aligner fills three interacting score planes with a Gotoh-style
//! affine-gap recurrence whose gap moves respect codon boundaries, then
//! walks the stored predecessor pointers to produce an [`AlignmentReport`]:
//! mutations, frame shifts and three parallel display lines.

pub mod aligner;
pub mod matrix;
pub mod report;
pub mod scoring;

pub use aligner::{CodonAligner, MIN_SCORE};
pub use report::AlignmentReport;
pub use scoring::{GeneralScoreHandler, ScoreHandler};
