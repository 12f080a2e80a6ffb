//! # Configuration Logic
//!
//! ## Role
//! CLI argument parsing and validation for the `vcfbuf` probe.
//!
//! ## Fields
//! - `vcf: PathBuf` - Input VCF/BCF file
//! - `info: Vec<String>` - INFO tags to decode
//! - `format: Vec<String>` - FORMAT tags to decode
//! - `genotypes: bool` - Decode FORMAT/GT
//! - `initial_capacity: usize` - Starting element capacity of each buffer (default: 16)
//! - `verbose: u8` - Log verbosity
//!
//! ## Validation
//! - Input file must exist
//! - `initial_capacity` must be in `1..=i32::MAX`
//! - Tags must be non-empty and free of nul bytes
//!
//! ## Example CLI
//! ```bash
//! vcfbuf --vcf calls.vcf.gz --info DP --info AF --format AD --genotypes
//! ```

use std::path::PathBuf;

use clap::{ArgAction, Parser};
use tracing::Level;

use crate::error::{Result, VcfBufError};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "vcfbuf",
    version,
    about = "Decode fields of the first record of a VCF/BCF through htslib"
)]
pub struct Config {
    /// Input VCF/BCF file
    #[arg(long)]
    pub vcf: PathBuf,

    /// INFO tag to decode (repeatable)
    #[arg(long = "info", value_name = "TAG")]
    pub info: Vec<String>,

    /// FORMAT tag to decode (repeatable)
    #[arg(long = "format", value_name = "TAG")]
    pub format: Vec<String>,

    /// Decode FORMAT/GT
    #[arg(long)]
    pub genotypes: bool,

    /// Starting element capacity of each decode buffer
    #[arg(long, default_value_t = 16)]
    pub initial_capacity: usize,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Config {
    /// Parse from the process arguments and validate
    pub fn parse_and_validate() -> Result<Self> {
        let config = Self::parse();
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.vcf.exists() {
            return Err(VcfBufError::FileNotFound {
                path: self.vcf.clone(),
            });
        }

        if self.initial_capacity == 0 || self.initial_capacity > i32::MAX as usize {
            return Err(VcfBufError::config(format!(
                "initial-capacity ({}) must be between 1 and {}",
                self.initial_capacity,
                i32::MAX
            )));
        }

        for tag in self.info.iter().chain(self.format.iter()) {
            if tag.is_empty() || tag.contains('\0') {
                return Err(VcfBufError::InvalidTag { tag: tag.clone() });
            }
        }

        Ok(())
    }

    /// Maximum log level implied by `-v`
    pub fn log_level(&self) -> Level {
        match self.verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn parse(file: &NamedTempFile, extra: &[&str]) -> Config {
        let path = file.path().to_str().unwrap();
        let mut args = vec!["vcfbuf", "--vcf", path];
        args.extend_from_slice(extra);
        Config::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_defaults() {
        let file = NamedTempFile::new().unwrap();
        let config = parse(&file, &[]);
        assert_eq!(config.initial_capacity, 16);
        assert!(config.info.is_empty());
        assert!(!config.genotypes);
        assert_eq!(config.log_level(), Level::INFO);
        config.validate().unwrap();
    }

    #[test]
    fn test_repeatable_tags_and_verbosity() {
        let file = NamedTempFile::new().unwrap();
        let config = parse(&file, &["--info", "DP", "--info", "AF", "--format", "AD", "-vv"]);
        assert_eq!(config.info, vec!["DP", "AF"]);
        assert_eq!(config.format, vec!["AD"]);
        assert_eq!(config.log_level(), Level::TRACE);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let file = NamedTempFile::new().unwrap();
        let config = parse(&file, &["--initial-capacity", "0"]);
        assert!(matches!(config.validate(), Err(VcfBufError::Config { .. })));
    }

    #[test]
    fn test_missing_file_rejected() {
        let config = Config::try_parse_from(["vcfbuf", "--vcf", "/nonexistent/calls.vcf"]).unwrap();
        assert!(matches!(
            config.validate(),
            Err(VcfBufError::FileNotFound { .. })
        ));
    }
}
