//! Typed sequence alphabets and the codon-level value types emitted by the
//! alignment reporter.

pub mod amino;
pub mod codon;
pub mod frame_shift;
pub mod mutation;
pub mod nucleic;

pub use amino::AminoAcid;
pub use codon::Codon;
pub use frame_shift::FrameShift;
pub use mutation::Mutation;
pub use nucleic::NucleicAcid;
