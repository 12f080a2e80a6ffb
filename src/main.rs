//! # vcfbuf: htslib Field Probe
//!
//! Decodes requested fields from the first record of a VCF/BCF file.
//!
//! ## Usage
//! ```bash
//! vcfbuf --vcf calls.vcf.gz --info DP --format AD --genotypes
//!
//! # With debug logging
//! vcfbuf --vcf calls.bcf --info AF -v
//! ```

use std::time::Instant;

use tracing::Level;
use vcfbuf::config::Config;
use vcfbuf::probe::probe;
use vcfbuf::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize the fmt subscriber on stderr
fn init_logging(level: Level) {
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run() -> Result<()> {
    let start = Instant::now();

    // Parse and validate configuration
    let config = Config::parse_and_validate()?;
    init_logging(config.log_level());

    let report = probe(&config)?;
    print!("{}", report);

    tracing::debug!(elapsed_ms = start.elapsed().as_millis() as u64, "done");
    Ok(())
}
