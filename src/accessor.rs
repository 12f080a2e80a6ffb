//! # Reallocation-Aware Field Accessors
//!
//! ## Role
//! Decode INFO/FORMAT values from an htslib record into a long-lived
//! [`Buffer`], keeping the buffer's ownership consistent with whatever htslib
//! did to the pointer.
//!
//! ## Protocol
//! 1. Copy the buffer's pointer and capacity into locals.
//! 2. Let htslib decode through `&mut ptr` / `&mut capacity`; it may `realloc`.
//! 3. Code `-4` is an allocation failure: return [`VcfBufError::OutOfMemory`]
//!    and leave the buffer exactly as it was.
//! 4. Otherwise adopt the reported pointer (if it moved) and capacity in one
//!    step, and hand the code back as an [`Outcome`].
//!
//! Every other code is passed through untouched; `Outcome::code` recovers it.

use std::ffi::{c_int, c_void, CString};
use std::ptr::NonNull;

use rust_htslib::htslib;
use tracing::trace;

use crate::buffer::Buffer;
use crate::error::{Result, VcfBufError};
use crate::hts::{Header, Record};

/// htslib's "failed to allocate" return code
pub const HTS_ENOMEM: c_int = -4;

/// Result of a decode call that did not fail to allocate
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Number of decoded elements (bytes, for strings)
    Decoded(usize),
    /// Tag is not defined in the header (-1)
    Undefined,
    /// Header type clashes with the requested type (-2)
    TypeMismatch,
    /// Tag is not present in this record (-3)
    Absent,
    /// Any other negative code
    Other(i32),
}

impl Outcome {
    pub fn from_code(code: c_int) -> Self {
        match code {
            n if n >= 0 => Outcome::Decoded(n as usize),
            -1 => Outcome::Undefined,
            -2 => Outcome::TypeMismatch,
            -3 => Outcome::Absent,
            other => Outcome::Other(other),
        }
    }

    /// The htslib return code this outcome was built from
    pub fn code(self) -> i32 {
        match self {
            Outcome::Decoded(n) => n as i32,
            Outcome::Undefined => -1,
            Outcome::TypeMismatch => -2,
            Outcome::Absent => -3,
            Outcome::Other(code) => code,
        }
    }

    /// Element count for a successful decode
    pub fn count(self) -> Option<usize> {
        match self {
            Outcome::Decoded(n) => Some(n),
            _ => None,
        }
    }

    pub fn is_decoded(self) -> bool {
        matches!(self, Outcome::Decoded(_))
    }
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for u8 {}
    impl Sealed for i32 {}
    impl Sealed for f32 {}
}

/// Element types htslib can decode into, with their `BCF_HT_*` selector
pub trait HtsValue: Copy + sealed::Sealed {
    const HT_TYPE: c_int;
}

impl HtsValue for u8 {
    const HT_TYPE: c_int = htslib::BCF_HT_STR as c_int;
}

impl HtsValue for i32 {
    const HT_TYPE: c_int = htslib::BCF_HT_INT as c_int;
}

impl HtsValue for f32 {
    const HT_TYPE: c_int = htslib::BCF_HT_REAL as c_int;
}

/// Run a realloc-capable decode function against `buffer` and reconcile.
///
/// `decode` receives a pointer to the buffer's data pointer and a pointer to
/// its capacity, in htslib's `(void **dst, int *ndst)` shape.
///
/// # Safety
///
/// `decode` must follow htslib's buffer contract: if it replaces the pointer,
/// the new block must come from the C allocator (`malloc`/`realloc`) and the
/// old block must already be freed or reused by `realloc`; the reported
/// capacity must not exceed the block's element count; and the first
/// `n` elements must be initialized when it returns `n >= 0`.
pub unsafe fn decode_with<T, F>(buffer: &mut Buffer<T>, decode: F) -> Result<Outcome>
where
    T: HtsValue,
    F: FnOnce(*mut *mut T, *mut c_int) -> c_int,
{
    let (mut ptr, mut capacity) = buffer.raw_parts();
    let code = decode(&mut ptr as *mut *mut T, &mut capacity as *mut c_int);

    if code == HTS_ENOMEM {
        return Err(VcfBufError::out_of_memory(
            "htslib could not grow the decode buffer",
        ));
    }

    let ptr = NonNull::new(ptr).ok_or_else(|| {
        VcfBufError::out_of_memory("decode call left a null buffer pointer")
    })?;

    let outcome = Outcome::from_code(code);
    if buffer.reconcile(ptr, capacity, outcome.count()) {
        trace!(capacity, "adopted reallocated decode buffer");
    }
    Ok(outcome)
}

fn c_tag(tag: &str) -> Result<CString> {
    CString::new(tag).map_err(|_| VcfBufError::InvalidTag {
        tag: tag.to_string(),
    })
}

/// Decode INFO field `tag` as `T`
pub fn get_info_values<T: HtsValue>(
    header: &Header,
    record: &mut Record,
    tag: &str,
    buffer: &mut Buffer<T>,
) -> Result<Outcome> {
    let tag = c_tag(tag)?;
    let hdr = header.as_ptr();
    let line = record.as_mut_ptr();
    unsafe {
        decode_with(buffer, |dst, ndst| {
            htslib::bcf_get_info_values(
                hdr,
                line,
                tag.as_ptr(),
                dst as *mut *mut c_void,
                ndst,
                T::HT_TYPE,
            )
        })
    }
}

/// Decode FORMAT field `tag` as `T`, all samples concatenated
pub fn get_format_values<T: HtsValue>(
    header: &Header,
    record: &mut Record,
    tag: &str,
    buffer: &mut Buffer<T>,
) -> Result<Outcome> {
    let tag = c_tag(tag)?;
    let hdr = header.as_ptr();
    let line = record.as_mut_ptr();
    unsafe {
        decode_with(buffer, |dst, ndst| {
            htslib::bcf_get_format_values(
                hdr,
                line,
                tag.as_ptr(),
                dst as *mut *mut c_void,
                ndst,
                T::HT_TYPE,
            )
        })
    }
}

/// INFO string; the count is the decoded byte length
pub fn get_info_string(
    header: &Header,
    record: &mut Record,
    tag: &str,
    buffer: &mut Buffer<u8>,
) -> Result<Outcome> {
    get_info_values(header, record, tag, buffer)
}

pub fn get_info_int32(
    header: &Header,
    record: &mut Record,
    tag: &str,
    buffer: &mut Buffer<i32>,
) -> Result<Outcome> {
    get_info_values(header, record, tag, buffer)
}

pub fn get_info_float(
    header: &Header,
    record: &mut Record,
    tag: &str,
    buffer: &mut Buffer<f32>,
) -> Result<Outcome> {
    get_info_values(header, record, tag, buffer)
}

pub fn get_format_int32(
    header: &Header,
    record: &mut Record,
    tag: &str,
    buffer: &mut Buffer<i32>,
) -> Result<Outcome> {
    get_format_values(header, record, tag, buffer)
}

pub fn get_format_float(
    header: &Header,
    record: &mut Record,
    tag: &str,
    buffer: &mut Buffer<f32>,
) -> Result<Outcome> {
    get_format_values(header, record, tag, buffer)
}

/// FORMAT string values, one fixed-width, nul-padded slot per sample
pub fn get_format_string(
    header: &Header,
    record: &mut Record,
    tag: &str,
    buffer: &mut Buffer<u8>,
) -> Result<Outcome> {
    get_format_values(header, record, tag, buffer)
}

/// Split a decoded FORMAT string buffer into per-sample values.
///
/// htslib gives every sample a slot of `raw.len() / samples` bytes; shorter
/// values are nul-padded. Each returned slice has its padding removed.
pub fn split_format_strings(raw: &[u8], samples: usize) -> Vec<&[u8]> {
    if samples == 0 || raw.is_empty() {
        return Vec::new();
    }
    let width = (raw.len() / samples).max(1);
    raw.chunks(width)
        .take(samples)
        .map(|slot| {
            let end = slot.iter().position(|&b| b == 0).unwrap_or(slot.len());
            &slot[..end]
        })
        .collect()
}

/// Encoded FORMAT/GT calls, `ploidy` values per sample.
///
/// Values use htslib's encoding: `(allele + 1) << 1 | phased`. See
/// [`crate::missing::is_genotype_missing`] for the missing sentinels.
pub fn get_genotypes(
    header: &Header,
    record: &mut Record,
    buffer: &mut Buffer<i32>,
) -> Result<Outcome> {
    get_format_values(header, record, "GT", buffer)
}
