use clipumi::Config;
use log::LevelFilter;
use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "clipumi",
    about = "Identify and remove UMI tags from sequence starts"
)]
pub(crate) struct ClipUmi {
    #[structopt(
        short = "V",
        long = "verbose",
        help = "Set logging level",
        default_value = "warning",
        possible_values = &["error", "warning", "info", "debug"]
    )]
    pub verbosity: Verbosity,
    #[structopt(
        short = "a",
        long = "return-all",
        help = "Return all sequences, even if not mapped"
    )]
    pub include_invalid: bool,
    #[structopt(
        short = "n",
        long = "umi-length",
        help = "Length of the UMI sequence",
        default_value = "6"
    )]
    pub umi_length: usize,
    #[structopt(
        short = "o",
        long = "max-offset",
        help = "Maximum offset",
        default_value = "0"
    )]
    pub max_offset: usize,
    #[structopt(
        short = "m",
        long = "max-mismatch",
        help = "Maximum permissible primer mismatches",
        default_value = "1"
    )]
    pub max_mismatch: usize,
    #[structopt(
        short = "f",
        long = "output-fastq",
        help = "Output FASTQ file for clipped reads, gzip compressed if it ends in .gz",
        parse(from_os_str)
    )]
    pub output_fastq: Option<PathBuf>,
    #[structopt(help = "Primer FASTA file", parse(from_os_str))]
    pub primers: PathBuf,
    #[structopt(help = "FASTQ file to process", parse(from_os_str))]
    pub fastq: PathBuf,
}

impl ClipUmi {
    pub(crate) fn set_logging(&self) {
        env_logger::Builder::new()
            .filter_level(self.verbosity.level_filter())
            .format(|buf, record| writeln!(buf, "{}: {}", record.level(), record.args()))
            .init();
    }

    pub(crate) fn config(&self) -> Config {
        Config {
            umi_length: self.umi_length,
            max_offset: self.max_offset,
            max_mismatch: self.max_mismatch,
            include_invalid: self.include_invalid,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Verbosity {
    Error,
    Warning,
    Info,
    Debug,
}

impl Verbosity {
    fn level_filter(self) -> LevelFilter {
        match self {
            Verbosity::Error => LevelFilter::Error,
            Verbosity::Warning => LevelFilter::Warn,
            Verbosity::Info => LevelFilter::Info,
            Verbosity::Debug => LevelFilter::Debug,
        }
    }
}

impl FromStr for Verbosity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "error" => Ok(Verbosity::Error),
            "warning" => Ok(Verbosity::Warning),
            "info" => Ok(Verbosity::Info),
            "debug" => Ok(Verbosity::Debug),
            other => Err(format!("unknown verbosity level `{}`", other)),
        }
    }
}
