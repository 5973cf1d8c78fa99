use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{ensure, Context, Result};
use clap::Parser;
use codal_lib::align::{CodonAligner, GeneralScoreHandler};
use codal_lib::seq::{amino, nucleic, AminoAcid};
use fgoxide::io::Io;
use itertools::Itertools;
use log::info;
use proglog::CountFormatterKind;
use proglog::ProgLogBuilder;
use seq_io::fasta::Reader as FastaReader;
use seq_io::fasta::Record as FastaRecord;

use super::command::Command;

const BUFFER_SIZE: usize = 128 * 1024;

/// Converts a FASTA header (which may contain whitespace) to a record name.
fn header_to_name(header: &[u8]) -> Result<String> {
    let header: std::borrow::Cow<str> = String::from_utf8_lossy(header);
    header
        .split_whitespace()
        .next()
        .map(std::string::ToString::to_string)
        .context("empty record name")
}

/// Reads a FASTA containing the single reference protein.
fn read_reference(file: &PathBuf) -> Result<(Vec<AminoAcid>, String)> {
    let fg_io: Io = Io::new(5, BUFFER_SIZE);
    let source: FastaReader<Box<dyn BufRead + Send>> =
        FastaReader::with_capacity(fg_io.new_reader(file)?, BUFFER_SIZE);

    let records: Vec<_> = source
        .into_records()
        .collect::<Result<_, _>>()
        .context("Error reading the reference FASTA")?;
    ensure!(!records.is_empty(), "Found no sequences in the FASTA");
    ensure!(records.len() == 1, "Found multiple sequences in the FASTA");

    let record = &records[0];
    let text: String = record.seq().iter().map(|base| *base as char).collect();
    let residues = amino::read_seq(text.trim())?;
    let name = header_to_name(record.head())?;
    Ok((residues, name))
}

/// Aligns nucleotide reads against a reference protein, codon by codon.
///
/// Each read is aligned with an affine-gap model whose insertions and
/// deletions prefer codon-sized (multiple-of-three) units, so in-frame
/// indels are reported as inserted or deleted codons and everything else
/// as a frame shift. For every read the output contains the aligned
/// window in both coordinate systems, the total score, the three display
/// lines (nucleotides, controls, amino acids) and the mutation and
/// frame-shift calls.
#[derive(Parser, Debug, Clone)]
#[command(version = codal_lib::util::version::built_info::VERSION.as_str(), term_width = 0)]
pub struct Align {
    /// The path to the input FASTA with nucleotide reads.
    #[clap(long, short = 'f', display_order = 1)]
    pub query_fasta: PathBuf,

    /// The path to the reference protein FASTA (a single record).
    #[clap(long, short = 'r', display_order = 2, conflicts_with = "ref_seq")]
    pub ref_fasta: Option<PathBuf>,

    /// The reference protein given inline as residues.
    #[clap(long, short = 'R', display_order = 3)]
    pub ref_seq: Option<String>,

    /// Output path; standard output if omitted.
    #[clap(long, short = 'o', display_order = 4)]
    pub output: Option<PathBuf>,

    /// Score for a codon matching the reference residue (must be positive).
    #[clap(long, short = 'A', default_value = "10", display_order = 5)]
    pub match_score: i32,

    /// Score for a codon not matching the reference residue (must not be positive).
    #[clap(
        long,
        short = 'B',
        default_value = "-4",
        allow_hyphen_values = true,
        display_order = 6
    )]
    pub mismatch_score: i32,

    /// Score for a gap open (must not be positive).
    #[clap(
        long,
        short = 'O',
        default_value = "-10",
        allow_hyphen_values = true,
        display_order = 7
    )]
    pub gap_open: i32,

    /// Score for a gap extend (must not be positive); a gap of size k costs '{-O} + {-E}*k'.
    #[clap(
        long,
        short = 'E',
        default_value = "-2",
        allow_hyphen_values = true,
        display_order = 8
    )]
    pub gap_extend: i32,

    /// Extra opening score for a codon-sized indel (must not be positive).
    #[clap(
        long,
        default_value = "-6",
        allow_hyphen_values = true,
        display_order = 9
    )]
    pub indel_codon_open: i32,

    /// Extra extension score for a codon-sized indel (must not be positive).
    #[clap(
        long,
        default_value = "-4",
        allow_hyphen_values = true,
        display_order = 10
    )]
    pub indel_codon_extend: i32,
}

impl Command for Align {
    fn execute(&self) -> Result<()> {
        ensure!(self.match_score > 0, "--match-score must be positive");
        ensure!(
            self.mismatch_score <= 0,
            "--mismatch-score must not be positive"
        );
        ensure!(self.gap_open <= 0, "--gap-open must not be positive");
        ensure!(self.gap_extend <= 0, "--gap-extend must not be positive");
        ensure!(
            self.indel_codon_open <= 0,
            "--indel-codon-open must not be positive"
        );
        ensure!(
            self.indel_codon_extend <= 0,
            "--indel-codon-extend must not be positive"
        );

        let (reference, reference_name) = match (&self.ref_fasta, &self.ref_seq) {
            (Some(file), None) => read_reference(file)?,
            (None, Some(text)) => (amino::read_seq(text.trim())?, "ref".to_string()),
            _ => anyhow::bail!("exactly one of --ref-fasta and --ref-seq is required"),
        };
        ensure!(!reference.is_empty(), "the reference protein is empty");
        info!(
            "Aligning against {} ({} aa)",
            reference_name,
            reference.len()
        );

        let score_handler = GeneralScoreHandler::new(
            self.match_score,
            self.mismatch_score,
            self.gap_open,
            self.gap_extend,
            self.indel_codon_open,
            self.indel_codon_extend,
        );

        let fg_io: Io = Io::new(5, BUFFER_SIZE);
        let source: FastaReader<Box<dyn BufRead + Send>> =
            FastaReader::with_capacity(fg_io.new_reader(&self.query_fasta)?, BUFFER_SIZE);
        let mut writer: Box<dyn Write> = match &self.output {
            Some(path) => Box::new(fg_io.new_writer(path)?),
            None => Box::new(io::stdout().lock()),
        };

        let progress = ProgLogBuilder::new()
            .name("codal")
            .noun("records")
            .verb("Aligned")
            .unit(100)
            .count_formatter(CountFormatterKind::Comma)
            .build();

        let mut count = 0usize;
        for record in source.into_records() {
            let record = record.context("Error reading the query FASTA")?;
            let name = header_to_name(record.head())?;
            let text: String = record.seq().iter().map(|base| *base as char).collect();
            let query = nucleic::read_seq(text.trim())
                .with_context(|| format!("record {name}"))?;

            let aligner = CodonAligner::new(&query, &reference, &score_handler);
            let report = aligner.report();

            writeln!(
                writer,
                ">{name} score={} aa={}..{} na={}..{}",
                aligner.max_score(),
                report.first_aa,
                report.last_aa,
                report.first_na,
                report.last_na
            )?;
            writeln!(writer, "{}", report.amino_acids_line)?;
            writeln!(writer, "{}", report.control_line)?;
            writeln!(writer, "{}", report.nucleic_acids_line)?;
            if !report.mutations.is_empty() {
                writeln!(writer, "mutations: {}", report.mutations.iter().join(", "))?;
            }
            if !report.frame_shifts.is_empty() {
                writeln!(
                    writer,
                    "frame shifts: {}",
                    report.frame_shifts.iter().join(", ")
                )?;
            }

            progress.record();
            count += 1;
        }
        writer.flush()?;
        info!("Aligned {count} records");
        Ok(())
    }
}
