//! fmtconvert cli interface

use clap::{Parser, ValueEnum};
use std::fmt::Formatter;
use std::path::PathBuf;

/// Convert a document between HCL, JSON and YAML
///
/// The converted document is printed to stdout.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Format of the input file
    #[arg(short = 'f', long = "from", default_value_t = Format::Json)]
    pub from: Format,

    /// Format to convert to
    #[arg(short = 't', long = "to", default_value_t = Format::Hcl)]
    pub to: Format,

    /// File to convert
    pub file: PathBuf,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Json,
    Yaml,
    Hcl,
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Format::Json => f.write_str("json"),
            Format::Yaml => f.write_str("yaml"),
            Format::Hcl => f.write_str("hcl"),
        }
    }
}

impl From<Format> for hclcodec::transcode::Format {
    fn from(format: Format) -> Self {
        match format {
            Format::Json => hclcodec::transcode::Format::Json,
            Format::Yaml => hclcodec::transcode::Format::Yaml,
            Format::Hcl => hclcodec::transcode::Format::Hcl,
        }
    }
}
