//! # Owned Decode Buffers
//!
//! ## Role
//! Long-lived output buffers handed to htslib's field accessors.
//!
//! htslib grows these buffers with `realloc`, so the memory must come from the
//! C allocator and must go back to it with `free`. A [`Buffer`] owns exactly
//! one such block. The pointer and capacity change only through
//! [`Buffer::reconcile`], which the accessor layer calls after every decode.
//!
//! ## Ownership
//! - Constructed with `malloc`, released with `free` in `Drop`, exactly once.
//! - When htslib reallocates, the old block is already gone (freed or reused
//!   by `realloc`). Adoption overwrites the pointer without freeing anything.
//! - Raw pointer fields make the type `!Send` and `!Sync`.
//! - Element types are limited to [`HtsValue`] (`u8`, `i32`, `f32`), whose
//!   alignment `malloc` always satisfies.

use std::ffi::c_int;
use std::fmt;
use std::marker::PhantomData;
use std::mem;
use std::ptr::NonNull;
use std::slice;

use crate::accessor::HtsValue;
use crate::error::{Result, VcfBufError};

/// An exclusively owned, C-allocated array of `T`
pub struct Buffer<T: HtsValue> {
    /// Block of at least `capacity` elements from the C allocator
    data: NonNull<T>,
    /// Number of `T` elements allocated (htslib's `ndst`)
    capacity: c_int,
    /// Elements written by the last successful decode
    len: usize,
    _owns: PhantomData<T>,
}

/// Allocate a buffer for `n` elements of `T`
pub fn make_buffer<T: HtsValue>(n: usize) -> Result<Buffer<T>> {
    Buffer::with_capacity(n)
}

impl<T: HtsValue> Buffer<T> {
    /// Allocate storage for `n` elements.
    ///
    /// Fails with [`VcfBufError::OutOfMemory`] if the allocator returns null,
    /// if the byte size overflows, or if `n` does not fit htslib's `int`
    /// capacity. A request for zero elements still yields a valid pointer.
    pub fn with_capacity(n: usize) -> Result<Self> {
        let capacity = c_int::try_from(n).map_err(|_| {
            VcfBufError::out_of_memory(format!("capacity {} exceeds htslib's int range", n))
        })?;
        let bytes = mem::size_of::<T>().checked_mul(n).ok_or_else(|| {
            VcfBufError::out_of_memory(format!("{} elements overflow the address space", n))
        })?;

        // malloc(0) may legally return null; always ask for at least one byte.
        let raw = unsafe { libc::malloc(bytes.max(1)) } as *mut T;
        let data = NonNull::new(raw).ok_or_else(|| {
            VcfBufError::out_of_memory(format!("malloc of {} bytes failed", bytes))
        })?;

        Ok(Self {
            data,
            capacity,
            len: 0,
            _owns: PhantomData,
        })
    }

    /// Number of elements allocated
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity as usize
    }

    /// Number of elements written by the last successful decode
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// True if the last decode produced no elements
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Raw pointer to the owned block
    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.data.as_ptr()
    }

    /// The elements written by the last successful decode
    pub fn as_slice(&self) -> &[T] {
        // len <= capacity is maintained by reconcile, and those elements were
        // written by the decode call that set len.
        unsafe { slice::from_raw_parts(self.data.as_ptr(), self.len) }
    }

    /// Pointer and capacity to hand to an htslib call
    #[inline]
    pub(crate) fn raw_parts(&self) -> (*mut T, c_int) {
        (self.data.as_ptr(), self.capacity)
    }

    /// Bring bookkeeping in line with what a decode call reported.
    ///
    /// `ptr` is adopted if it differs from the owned one; the previous block is
    /// not freed. `capacity` is always overwritten. `decoded` is the element
    /// count for a successful decode, `None` for a negative outcome.
    ///
    /// A negative outcome still resets `len` to 0, so `as_slice` is empty
    /// afterwards; `len` is the only field that does not survive a domain
    /// outcome such as `-3`. Pointer and capacity keep whatever htslib left.
    ///
    /// Returns `true` if ownership moved to a new block.
    pub(crate) fn reconcile(
        &mut self,
        ptr: NonNull<T>,
        capacity: c_int,
        decoded: Option<usize>,
    ) -> bool {
        let moved = ptr != self.data;
        self.data = ptr;
        self.capacity = capacity;
        self.len = decoded.map_or(0, |n| n.min(capacity.max(0) as usize));
        moved
    }
}

impl Buffer<u8> {
    /// Decoded bytes with any trailing nul padding removed
    pub fn as_bytes(&self) -> &[u8] {
        let bytes = self.as_slice();
        let end = bytes.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
        &bytes[..end]
    }

    /// Decoded bytes as UTF-8
    pub fn as_str(&self) -> std::result::Result<&str, std::str::Utf8Error> {
        std::str::from_utf8(self.as_bytes())
    }
}

impl<T: HtsValue> Drop for Buffer<T> {
    fn drop(&mut self) {
        unsafe { libc::free(self.data.as_ptr() as *mut libc::c_void) };
    }
}

impl<T: HtsValue> fmt::Debug for Buffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("data", &self.data)
            .field("capacity", &self.capacity)
            .field("len", &self.len)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_capacity() {
        let buf: Buffer<i32> = make_buffer(8).unwrap();
        assert_eq!(buf.capacity(), 8);
        assert_eq!(buf.len(), 0);
        assert!(buf.is_empty());
        assert!(!buf.as_ptr().is_null());
        assert!(buf.as_slice().is_empty());
    }

    fn assert_malloc_aligned<T: HtsValue>() {
        assert!(mem::align_of::<T>() <= mem::align_of::<libc::max_align_t>());
        for n in [0, 1, 7, 1024] {
            let buf: Buffer<T> = make_buffer(n).unwrap();
            assert_eq!(buf.as_ptr() as usize % mem::align_of::<T>(), 0);
            assert!(buf.as_slice().is_empty());
        }
    }

    #[test]
    fn test_allocations_aligned_for_every_element_type() {
        assert_malloc_aligned::<u8>();
        assert_malloc_aligned::<i32>();
        assert_malloc_aligned::<f32>();
    }

    #[test]
    fn test_zero_capacity_is_non_null() {
        let buf: Buffer<f32> = Buffer::with_capacity(0).unwrap();
        assert_eq!(buf.capacity(), 0);
        assert!(!buf.as_ptr().is_null());
    }

    #[test]
    fn test_capacity_beyond_int_range() {
        let err = Buffer::<u8>::with_capacity(c_int::MAX as usize + 1).unwrap_err();
        assert!(err.is_out_of_memory());
    }

    #[test]
    fn test_reconcile_same_pointer_updates_capacity() {
        let mut buf: Buffer<i32> = make_buffer(4).unwrap();
        let (ptr, _) = buf.raw_parts();
        let moved = buf.reconcile(NonNull::new(ptr).unwrap(), 3, Some(2));
        assert!(!moved);
        assert_eq!(buf.as_ptr(), ptr as *const i32);
        assert_eq!(buf.capacity(), 3);
        assert_eq!(buf.len(), 2);
    }

    #[test]
    fn test_reconcile_clamps_len_to_capacity() {
        let mut buf: Buffer<i32> = make_buffer(4).unwrap();
        let (ptr, cap) = buf.raw_parts();
        buf.reconcile(NonNull::new(ptr).unwrap(), cap, Some(100));
        assert_eq!(buf.len(), 4);
        buf.reconcile(NonNull::new(ptr).unwrap(), cap, None);
        assert_eq!(buf.len(), 0);
    }

    #[test]
    fn test_as_bytes_trims_nul_padding() {
        let mut buf: Buffer<u8> = make_buffer(6).unwrap();
        let (ptr, cap) = buf.raw_parts();
        unsafe {
            std::ptr::copy_nonoverlapping(b"abc\0\0\0".as_ptr(), ptr, 6);
        }
        buf.reconcile(NonNull::new(ptr).unwrap(), cap, Some(6));
        assert_eq!(buf.as_bytes(), b"abc");
        assert_eq!(buf.as_str().unwrap(), "abc");
    }
}
