//! Property-name storage: inline in the record's byte window, or out of line
//! as an `(offset, length)` range into the Data Heap.
//!
//! Every property type has both encodings. The inline window is 23 bytes for
//! value-less types (null/true/false) and 15 bytes for types whose value
//! field is live. A name is zero-padded inside its window, so names that
//! contain a NUL byte are always stored out of line.

use crate::data_heap::DataHeap;
use crate::error::{JsonError, Result};
use crate::record::{Record, RecordMut};
use crate::types::*;
use arrayvec::ArrayVec;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodedName {
    Inline(ArrayVec<u8, MAX_BYTE_BUFFER_LENGTH>),
    Heap { offset: u32, len: u32 },
}

#[inline]
pub fn fits_inline(name: &[u8], window: usize) -> bool {
    name.len() <= window && !name.contains(&0)
}

impl EncodedName {
    /// Encode a fresh name for a record of type `base`, appending it to the
    /// heap when it does not fit the type's window.
    pub fn encode(name: &str, base: RecordType, heap: &mut DataHeap) -> Result<Self> {
        let bytes = name.as_bytes();
        if fits_inline(bytes, base.name_window()) {
            let mut inline = ArrayVec::new();
            // Cannot fail: the window is at most MAX_BYTE_BUFFER_LENGTH.
            inline
                .try_extend_from_slice(bytes)
                .map_err(|_| JsonError::InvalidName(name.to_string()))?;
            return Ok(EncodedName::Inline(inline));
        }
        let (offset, len) = heap.append(bytes)?;
        Ok(EncodedName::Heap { offset, len })
    }

    /// Capture the name already stored in `rec` so the record can be rewritten.
    pub fn capture(rec: Record<'_>, ty: RecordType) -> Self {
        if ty.has_inline_name() {
            let mut inline = ArrayVec::new();
            for &b in rec.inline_name(ty) {
                inline.push(b);
            }
            EncodedName::Inline(inline)
        } else {
            EncodedName::Heap {
                offset: rec.range_start(),
                len: rec.range_length(),
            }
        }
    }

    /// Re-home the name for a record of type `base`. An inline name that no
    /// longer fits moves to the heap; a heap name stays where it is.
    pub fn refit(self, base: RecordType, heap: &mut DataHeap) -> Result<Self> {
        match self {
            EncodedName::Inline(bytes) if bytes.len() > base.name_window() => {
                let (offset, len) = heap.append(&bytes)?;
                Ok(EncodedName::Heap { offset, len })
            }
            other => Ok(other),
        }
    }

    /// Write type and name into `rec`, clearing whatever payload it held.
    /// Returns the concrete record type written.
    pub fn write(&self, rec: &mut RecordMut<'_>, base: RecordType) -> RecordType {
        rec.clear_payload();
        let ty = match self {
            EncodedName::Inline(bytes) => {
                let ty = base.inline();
                rec.write_inline_name(bytes, ty.name_window());
                ty
            }
            EncodedName::Heap { offset, len } => {
                rec.set_range(*offset, *len);
                base
            }
        };
        rec.set_type(ty);
        ty
    }
}

/// Resolve the stored name of a property record.
pub fn record_name<'a>(
    rec: Record<'a>,
    ty: RecordType,
    heap: &'a DataHeap,
    offset: u32,
) -> Result<&'a [u8]> {
    if ty.has_inline_name() {
        Ok(rec.inline_name(ty))
    } else {
        heap.get(rec.range_start(), rec.range_length())
            .ok_or(JsonError::Corrupt { offset })
    }
}
