//! The document: a Record Table and a Data Heap, nothing else.
//!
//! All state lives in the two arenas, so the binary form is a straight copy
//! of their occupied prefixes. Reads walk an instance's property chain;
//! writes find-or-create a record on that chain.

mod read_op;
mod verify;
mod write_op;


pub use read_op::{JsonReadable, PropertyIter};
pub(crate) use write_op::Scalar;

use crate::config::DocumentConfig;
use crate::data_heap::DataHeap;
use crate::error::{JsonError, Result};
use crate::handle::{JsonMut, JsonRef};
use crate::record_table::RecordTable;
use crate::types::*;

#[derive(Debug, Clone)]
pub struct Document {
    pub(crate) records: RecordTable,
    pub(crate) data: DataHeap,
}

/// Arena occupancy, for diagnostics and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentStats {
    /// Occupied record slots, header and root directory included.
    pub records: usize,
    /// Instances ever allocated, root included. Orphans still count.
    pub instances: usize,
    /// Occupied Data Heap bytes.
    pub data_length: usize,
    pub record_capacity: usize,
    pub data_capacity: usize,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// An empty document whose root is an object with no properties.
    pub fn new() -> Self {
        Self::with_config(DocumentConfig::default())
    }

    pub fn with_config(config: DocumentConfig) -> Self {
        Self {
            records: RecordTable::new(config.initial_records.get()),
            data: DataHeap::with_capacity(config.initial_data),
        }
    }

    #[inline]
    pub fn root(&self) -> JsonRef<'_> {
        JsonRef::new(self, InstanceId::ROOT)
    }

    #[inline]
    pub fn root_mut(&mut self) -> JsonMut<'_> {
        JsonMut::new(self, InstanceId::ROOT)
    }

    /// Re-open a handle on an instance by id.
    pub fn object(&self, id: InstanceId) -> Result<JsonRef<'_>> {
        self.check_instance(id)?;
        Ok(JsonRef::new(self, id))
    }

    pub fn object_mut(&mut self, id: InstanceId) -> Result<JsonMut<'_>> {
        self.check_instance(id)?;
        Ok(JsonMut::new(self, id))
    }

    pub fn stats(&self) -> DocumentStats {
        DocumentStats {
            records: self.records.record_count(),
            instances: self.records.next_instance_id() as usize - 1,
            data_length: self.data.len(),
            record_capacity: self.records.capacity() / RECORD_SIZE,
            data_capacity: self.data.capacity(),
        }
    }

    /// True when the root holds a bare scalar instead of an object.
    #[inline]
    pub fn is_literal(&self) -> bool {
        self.records.header().type_tag() != RecordType::Header as u8
    }

    #[inline]
    pub(crate) fn check_instance(&self, id: InstanceId) -> Result<()> {
        if self.records.is_allocated(id.get()) {
            Ok(())
        } else {
            Err(JsonError::UnknownInstance(id.get()))
        }
    }

    /// Mirror the heap's length into the header.
    #[inline]
    pub(crate) fn sync_data_length(&mut self) {
        let len = self.data.len() as u32;
        self.records.header_mut().set_data_length(len);
    }
}
