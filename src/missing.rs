//! # Missing-Value Predicates
//!
//! ## Alleles
//! An allele is missing when it is absent, empty, or exactly one of `.`, `N`
//! or `n`. Anything longer is a real sequence, even `NN` or `..`.
//!
//! ## Decoded values
//! htslib marks missing and padding entries in decoded arrays with sentinels:
//!
//! | Kind     | Missing              | Vector end           |
//! |----------|----------------------|----------------------|
//! | int32    | `i32::MIN`           | `i32::MIN + 1`       |
//! | float    | NaN bits `0x7F800001`| NaN bits `0x7F800002`|
//! | genotype | `(v >> 1) == 0`      | `i32::MIN + 1`       |

/// htslib's `bcf_int32_missing`
pub const INT32_MISSING: i32 = i32::MIN;
/// htslib's `bcf_int32_vector_end`
pub const INT32_VECTOR_END: i32 = i32::MIN + 1;
/// Bit pattern of htslib's `bcf_float_missing`
pub const FLOAT_MISSING_BITS: u32 = 0x7F80_0001;
/// Bit pattern of htslib's `bcf_float_vector_end`
pub const FLOAT_VECTOR_END_BITS: u32 = 0x7F80_0002;

/// A record that can expose its allele text
pub trait AlleleSource {
    /// Number of alleles, reference included
    fn allele_count(&self) -> usize;

    /// Materialize string-form allele data; must be idempotent
    fn unpack_alleles(&mut self);

    /// Allele text without its nul terminator, once unpacked
    fn allele(&self, index: usize) -> Option<&[u8]>;
}

/// True for no text, empty text, or a lone `.`, `N` or `n`
pub fn is_allele_missing(allele: Option<&[u8]>) -> bool {
    match allele {
        None => true,
        Some([]) => true,
        Some([b'.' | b'N' | b'n']) => true,
        Some(_) => false,
    }
}

/// True if the record has no alleles or its reference allele is missing
pub fn is_ref_missing<R: AlleleSource + ?Sized>(record: &mut R) -> bool {
    if record.allele_count() == 0 {
        return true;
    }
    record.unpack_alleles();
    is_allele_missing(record.allele(0))
}

#[inline]
pub fn is_int32_missing(value: i32) -> bool {
    value == INT32_MISSING
}

#[inline]
pub fn is_int32_vector_end(value: i32) -> bool {
    value == INT32_VECTOR_END
}

#[inline]
pub fn is_float_missing(value: f32) -> bool {
    value.to_bits() == FLOAT_MISSING_BITS
}

#[inline]
pub fn is_float_vector_end(value: f32) -> bool {
    value.to_bits() == FLOAT_VECTOR_END_BITS
}

/// True for an encoded genotype allele with no call (`.`)
#[inline]
pub fn is_genotype_missing(value: i32) -> bool {
    (value >> 1) == 0
}
