#![warn(missing_debug_implementations, rust_2018_idioms)]

//! Identify and remove UMI tags and primers from the start of FASTQ reads.
mod cli;

use clipumi::primer::PrimerTable;
use clipumi::record::{self, RecordWriter};
use clipumi::Result;
use log::{debug, error, info};
use std::io::{self, BufWriter};
use structopt::StructOpt;

fn main() {
    let opt = cli::ClipUmi::from_args();
    opt.set_logging();

    if let Err(e) = run(&opt) {
        if e.is_broken_pipe() {
            debug!("output closed, stopping");
            return;
        }
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run(opt: &cli::ClipUmi) -> Result<()> {
    let config = opt.config();
    info!("using UMI length of {}", config.umi_length);
    info!("using maximum offset of {}", config.max_offset);
    info!("allowing <={} mismatches", config.max_mismatch);
    if config.include_invalid {
        info!("including unselected sequences");
    } else {
        info!("removing unselected sequences");
    }

    let primers = PrimerTable::from_path(&opt.primers)?;
    info!(
        "loaded {} primers, longest is {} bases",
        primers.len(),
        primers.max_len()
    );
    let reads = record::open_reads(&opt.fastq)?;

    let stdout = io::stdout();
    let mapping = BufWriter::new(stdout.lock());
    let mut writer = match opt.output_fastq {
        Some(ref path) => RecordWriter::with_clipped(mapping, record::create_clipped(path)?),
        None => RecordWriter::new(mapping),
    };

    let summary = clipumi::process(reads, &primers, &config, &mut writer)?;
    info!("processed {} reads", summary.reads);
    info!(
        "{} selected, {} ambiguous, {} without a primer, {} written",
        summary.selected, summary.ambiguous, summary.unmatched, summary.emitted
    );
    Ok(())
}
