//! Append-only byte arena for out-of-line names and string values.
//!
//! Ranges handed out by [`DataHeap::append`] stay valid for the life of the
//! heap: growth copies the occupied prefix into a larger allocation at the
//! same offsets, and nothing is ever freed or compacted.

use crate::error::{JsonError, Result};
use crate::types::MIN_DATA_CAPACITY;

#[derive(Debug, Clone, Default)]
pub struct DataHeap {
    /// Backing storage; its length is the capacity.
    buf: Vec<u8>,
    /// Occupied prefix.
    len: usize,
}

impl DataHeap {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: vec![0; capacity],
            len: 0,
        }
    }

    /// Adopt the occupied prefix of a restored document.
    pub fn from_vec(buf: Vec<u8>) -> Self {
        let len = buf.len();
        Self { buf, len }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// The occupied prefix.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// Bytes at `(offset, len)`, or `None` if the range leaves the occupied prefix.
    #[inline]
    pub fn get(&self, offset: u32, len: u32) -> Option<&[u8]> {
        let start = offset as usize;
        let end = start.checked_add(len as usize)?;
        if end > self.len {
            return None;
        }
        Some(&self.buf[start..end])
    }

    /// Append `bytes`, growing first if the free tail is too small.
    /// Returns the `(offset, length)` of the new range.
    pub fn append(&mut self, bytes: &[u8]) -> Result<(u32, u32)> {
        let needed = self.len + bytes.len();
        if needed > u32::MAX as usize {
            return Err(JsonError::CapacityExceeded {
                arena: "data heap",
                requested: needed,
            });
        }
        if needed > self.buf.len() {
            self.grow(needed);
        }
        let offset = self.len;
        self.buf[offset..needed].copy_from_slice(bytes);
        self.len = needed;
        Ok((offset as u32, bytes.len() as u32))
    }

    /// Double (minimum 128 bytes) until `needed` fits.
    fn grow(&mut self, needed: usize) {
        let old = self.buf.len();
        let mut capacity = old.saturating_mul(2).max(MIN_DATA_CAPACITY);
        while capacity < needed {
            capacity = capacity.saturating_mul(2);
        }
        let mut larger = vec![0u8; capacity];
        larger[..self.len].copy_from_slice(&self.buf[..self.len]);
        self.buf = larger;
        tracing::debug!(old_capacity = old, new_capacity = capacity, "data heap grown");
    }
}
