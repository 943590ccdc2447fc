//! Labelmerge: combine labels in a segmentation volume into fewer ROI labels.
//!
//! A discrete label volume (a "dseg") is relabeled according to a grouping
//! specification, e.g. `[[3, 42], [4, 43]]` merges left and right cortex into
//! label 1 and left and right white matter into label 2. Labels not named
//! in any group pass through unchanged, and background (0) is kept by default.
//!
//! # Modules
//!
//! - [`groups`]: Group specification parsing and resolution into a canonical mapping
//! - [`relabel`]: The relabel engine, output dtype selection and reporting
//! - [`volume`]: NIfTI reading and writing
//! - [`error`]: Error types for labelmerge operations

pub mod error;
pub mod groups;
pub mod relabel;
pub mod volume;

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

pub use error::LabelmergeError;
pub use groups::{resolve, CanonicalMapping, GroupSpec, ResolveOptions, ZeroPolicy};
pub use relabel::{relabel, LabelDtype, RelabelReport, VoxelType};

/// The labelmerge CLI application.
#[derive(Parser)]
#[command(name = "labelmerge")]
#[command(version, author, about)]
struct Cli {
    /// Input label volume (.nii or .nii.gz).
    input: PathBuf,

    /// Groups as JSON or literal text, or a path to a file holding either.
    /// Examples: '[[1,2,3],[4,5]]' or '{1:[1,2,3],2:[4,5]}'.
    #[arg(short = 'g', long)]
    groups: String,

    /// Output volume path. Without it the labels are combined but not saved.
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// New label of the first group when groups is a sequence.
    #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
    start_label: i64,

    /// Keep original zeros at 0 (default).
    #[arg(long = "preserve-zero", overrides_with = "no_preserve_zero")]
    preserve_zero: bool,

    /// Treat 0 as an ordinary label.
    #[arg(long = "no-preserve-zero", overrides_with = "preserve_zero")]
    no_preserve_zero: bool,

    /// Output dtype (int8, int16, int32, int64, uint8, uint16, uint32, uint64).
    /// Inferred from the output labels when omitted.
    #[arg(long, value_parser = parse_out_dtype)]
    out_dtype: Option<LabelDtype>,

    /// Format of the relabel report.
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    report: ReportFormat,
}

/// How the relabel report is printed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Text,
    Json,
}

fn parse_out_dtype(s: &str) -> Result<LabelDtype, String> {
    s.parse::<LabelDtype>().map_err(|e| e.to_string())
}

/// Run the labelmerge CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), LabelmergeError> {
    let cli = Cli::parse();

    let spec = groups::load_group_spec(&cli.groups)?;
    let opts = ResolveOptions {
        start_label: cli.start_label,
        preserve_zero: cli.preserve_zero || !cli.no_preserve_zero,
    };
    let mapping = groups::resolve(&spec, &opts)?;
    for note in mapping.notes() {
        eprintln!("Warning: {}", note);
    }

    // Reject new labels the requested dtype cannot hold before reading voxels.
    if let Some(dtype) = cli.out_dtype {
        mapping.check_dtype(dtype)?;
    }

    let volume = volume::read_label_volume(&cli.input)?;
    let relabeled = relabel::relabel(&volume.data, &mapping, volume.voxel_type, cli.out_dtype)?;

    match cli.report {
        ReportFormat::Json => {
            let json = serde_json::to_string_pretty(&relabeled.report)
                .map_err(LabelmergeError::ReportSerialize)?;
            println!("{}", json);
        }
        ReportFormat::Text => print!("{}", relabeled.report),
    }

    match &cli.output {
        Some(path) => {
            volume::write_label_volume(path, &volume.header, &relabeled.data, relabeled.dtype)?;
            println!("Saved combined labels to {}", path.display());
        }
        None => println!("Combined labels (no output file)."),
    }

    Ok(())
}
