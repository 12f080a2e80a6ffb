//! # htslib Handle Wrappers
//!
//! ## Role
//! Scoped ownership of the three htslib objects the accessors need: an open
//! file, its header and a record. Each wrapper calls the matching htslib
//! destructor exactly once from `Drop`, so early returns and `?` paths cannot
//! leak or double-release a handle.
//!
//! | Wrapper   | Acquire        | Release            |
//! |-----------|----------------|--------------------|
//! | `VcfFile` | `hts_open`     | `hts_close`        |
//! | `Header`  | `bcf_hdr_read` | `bcf_hdr_destroy`  |
//! | `Record`  | `bcf_init`     | `bcf_destroy`      |

use std::ffi::{c_char, c_int, CStr, CString};
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};
use std::ptr::NonNull;

use rust_htslib::htslib;
use tracing::debug;

use crate::error::{Result, VcfBufError};
use crate::missing::AlleleSource;

/// An open VCF/BCF file
pub struct VcfFile {
    inner: NonNull<htslib::htsFile>,
    path: PathBuf,
}

impl VcfFile {
    /// Open `path` for reading; htslib detects VCF, bgzipped VCF and BCF.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(VcfBufError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let c_path = CString::new(path.as_os_str().as_bytes()).map_err(|_| VcfBufError::Open {
            path: path.to_path_buf(),
        })?;
        let mode = b"r\0".as_ptr() as *const c_char;

        let fp = unsafe { htslib::hts_open(c_path.as_ptr(), mode) };
        let inner = NonNull::new(fp).ok_or_else(|| VcfBufError::Open {
            path: path.to_path_buf(),
        })?;

        debug!(path = %path.display(), "opened variant file");
        Ok(Self {
            inner,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    #[inline]
    pub(crate) fn as_mut_ptr(&mut self) -> *mut htslib::htsFile {
        self.inner.as_ptr()
    }
}

impl Drop for VcfFile {
    fn drop(&mut self) {
        let status = unsafe { htslib::hts_close(self.inner.as_ptr()) };
        debug!(path = %self.path.display(), status, "closed variant file");
    }
}

/// A VCF/BCF header describing the INFO/FORMAT schema
pub struct Header {
    inner: NonNull<htslib::bcf_hdr_t>,
}

impl Header {
    /// Read the header from the start of `file`
    pub fn read(file: &mut VcfFile) -> Result<Self> {
        let hdr = unsafe { htslib::bcf_hdr_read(file.as_mut_ptr()) };
        let inner = NonNull::new(hdr).ok_or_else(|| VcfBufError::Header {
            path: file.path().to_path_buf(),
        })?;
        Ok(Self { inner })
    }

    /// Number of samples declared in the header
    pub fn sample_count(&self) -> usize {
        unsafe { (*self.inner.as_ptr()).n[htslib::BCF_DT_SAMPLE as usize] as usize }
    }

    #[inline]
    pub(crate) fn as_ptr(&self) -> *const htslib::bcf_hdr_t {
        self.inner.as_ptr()
    }
}

impl Drop for Header {
    fn drop(&mut self) {
        unsafe { htslib::bcf_hdr_destroy(self.inner.as_ptr()) };
    }
}

/// One variant record
pub struct Record {
    inner: NonNull<htslib::bcf1_t>,
}

impl Record {
    /// Allocate an empty record
    pub fn new() -> Result<Self> {
        let rec = unsafe { htslib::bcf_init() };
        let inner = NonNull::new(rec)
            .ok_or_else(|| VcfBufError::out_of_memory("bcf_init returned null"))?;
        Ok(Self { inner })
    }

    /// Read the next record from `file` into `self`.
    ///
    /// Returns `Ok(false)` at end of file.
    pub fn read(&mut self, file: &mut VcfFile, header: &Header) -> Result<bool> {
        let code =
            unsafe { htslib::bcf_read(file.as_mut_ptr(), header.as_ptr(), self.as_mut_ptr()) };
        match code {
            0 => Ok(true),
            -1 => Ok(false),
            code => Err(VcfBufError::Read { code }),
        }
    }

    /// 1-based position
    pub fn position(&self) -> i64 {
        unsafe { (*self.inner.as_ptr()).pos + 1 }
    }

    #[inline]
    pub(crate) fn as_mut_ptr(&mut self) -> *mut htslib::bcf1_t {
        self.inner.as_ptr()
    }

    fn strings_unpacked(&self) -> bool {
        let unpacked = unsafe { (*self.inner.as_ptr()).unpacked };
        unpacked & htslib::BCF_UN_STR as c_int != 0
    }
}

impl AlleleSource for Record {
    fn allele_count(&self) -> usize {
        unsafe { (*self.inner.as_ptr()).n_allele() as usize }
    }

    fn unpack_alleles(&mut self) {
        // Idempotent; htslib skips work already done.
        unsafe { htslib::bcf_unpack(self.as_mut_ptr(), htslib::BCF_UN_STR as c_int) };
    }

    fn allele(&self, index: usize) -> Option<&[u8]> {
        if index >= self.allele_count() || !self.strings_unpacked() {
            return None;
        }
        unsafe {
            let alleles = (*self.inner.as_ptr()).d.allele;
            if alleles.is_null() {
                return None;
            }
            let allele = *alleles.add(index);
            if allele.is_null() {
                return None;
            }
            Some(CStr::from_ptr(allele).to_bytes())
        }
    }
}

impl Drop for Record {
    fn drop(&mut self) {
        unsafe { htslib::bcf_destroy(self.inner.as_ptr()) };
    }
}
