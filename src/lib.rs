//! # vcfbuf Library
//!
//! Owned htslib decode buffers and VCF missing-value predicates.
//!
//! htslib's INFO/FORMAT accessors take a buffer pointer and capacity by
//! reference and may `realloc` the buffer. This crate owns those buffers,
//! adopts whatever block htslib hands back, and frees each block exactly once.
//!
//! ## Modules
//! - `buffer`: C-allocated owned buffers
//! - `accessor`: Realloc-aware INFO/FORMAT/GT decoding
//! - `missing`: Allele and sentinel missing-value predicates
//! - `hts`: RAII wrappers for htslib file, header and record handles
//! - `config`: CLI argument parsing and validation
//! - `probe`: Single-record field report used by the binary
//! - `error`: Error types and result aliases
//! - `utils`: Shared utilities (workspace pattern)

pub mod accessor;
pub mod buffer;
pub mod config;
pub mod error;
pub mod hts;
pub mod missing;
pub mod probe;
pub mod utils;

// Re-export commonly used types
pub use accessor::{
    decode_with, get_format_float, get_format_int32, get_format_string, get_genotypes,
    get_info_float, get_info_int32, get_info_string, split_format_strings, Outcome,
};
pub use buffer::{make_buffer, Buffer};
pub use config::Config;
pub use error::{Result, VcfBufError};
pub use hts::{Header, Record, VcfFile};
pub use missing::{is_allele_missing, is_ref_missing, AlleleSource};
pub use utils::workspace::Workspace;
