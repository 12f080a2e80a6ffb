//! # Workspace Pattern for Decode Buffers
//!
//! Long-lived buffers, one per queried tag, so that decoding the same field
//! across many records reuses (and only occasionally grows) one allocation.
//!
//! ## Design Philosophy
//! Instead of allocating inside each accessor call, the caller owns a
//! `Workspace` and passes `&mut Buffer<_>` borrowed from it to the accessors.
//! htslib grows a buffer in place when a record needs more room; the grown
//! block stays with the workspace for the next record.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::accessor::HtsValue;
use crate::buffer::{make_buffer, Buffer};
use crate::error::Result;

/// Per-tag decode buffers
#[derive(Debug)]
pub struct Workspace {
    /// Capacity for newly created buffers
    initial_capacity: usize,

    /// String buffers keyed by tag
    strings: HashMap<String, Buffer<u8>>,

    /// int32 buffers keyed by tag
    ints: HashMap<String, Buffer<i32>>,

    /// float buffers keyed by tag
    floats: HashMap<String, Buffer<f32>>,

    /// FORMAT/GT buffer
    genotypes: Option<Buffer<i32>>,
}

fn slot<'a, T: HtsValue>(
    map: &'a mut HashMap<String, Buffer<T>>,
    tag: &str,
    capacity: usize,
) -> Result<&'a mut Buffer<T>> {
    match map.entry(tag.to_string()) {
        Entry::Occupied(e) => Ok(e.into_mut()),
        Entry::Vacant(e) => Ok(e.insert(make_buffer(capacity)?)),
    }
}

impl Workspace {
    /// Create an empty workspace; buffers are allocated on first use
    pub fn new(initial_capacity: usize) -> Self {
        Self {
            initial_capacity,
            strings: HashMap::new(),
            ints: HashMap::new(),
            floats: HashMap::new(),
            genotypes: None,
        }
    }

    pub fn initial_capacity(&self) -> usize {
        self.initial_capacity
    }

    /// String buffer for `tag`, allocated on first request
    pub fn strings(&mut self, tag: &str) -> Result<&mut Buffer<u8>> {
        slot(&mut self.strings, tag, self.initial_capacity)
    }

    /// int32 buffer for `tag`, allocated on first request
    pub fn ints(&mut self, tag: &str) -> Result<&mut Buffer<i32>> {
        slot(&mut self.ints, tag, self.initial_capacity)
    }

    /// float buffer for `tag`, allocated on first request
    pub fn floats(&mut self, tag: &str) -> Result<&mut Buffer<f32>> {
        slot(&mut self.floats, tag, self.initial_capacity)
    }

    /// The genotype buffer, allocated on first request
    pub fn genotypes(&mut self) -> Result<&mut Buffer<i32>> {
        let buf = match self.genotypes.take() {
            Some(buf) => buf,
            None => make_buffer(self.initial_capacity)?,
        };
        Ok(self.genotypes.insert(buf))
    }

    /// Number of buffers currently held
    pub fn buffer_count(&self) -> usize {
        self.strings.len()
            + self.ints.len()
            + self.floats.len()
            + usize::from(self.genotypes.is_some())
    }

    /// Release every buffer
    pub fn clear(&mut self) {
        self.strings.clear();
        self.ints.clear();
        self.floats.clear();
        self.genotypes = None;
    }
}

impl Default for Workspace {
    fn default() -> Self {
        Self::new(16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_tag_same_buffer() {
        let mut ws = Workspace::new(8);
        let first = ws.ints("DP").unwrap().as_ptr();
        let second = ws.ints("DP").unwrap().as_ptr();
        assert_eq!(first, second);
        assert_eq!(ws.buffer_count(), 1);
    }

    #[test]
    fn test_kinds_are_independent() {
        let mut ws = Workspace::new(4);
        ws.ints("AF").unwrap();
        ws.floats("AF").unwrap();
        ws.strings("AF").unwrap();
        ws.genotypes().unwrap();
        assert_eq!(ws.buffer_count(), 4);
        assert_eq!(ws.floats("AF").unwrap().capacity(), 4);
    }

    #[test]
    fn test_clear() {
        let mut ws = Workspace::default();
        ws.genotypes().unwrap();
        ws.strings("ANN").unwrap();
        ws.clear();
        assert_eq!(ws.buffer_count(), 0);
        assert_eq!(ws.initial_capacity(), 16);
    }
}
