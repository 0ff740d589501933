//! Growable array of fixed-size record slots.
//!
//! The table serves two roles at once. Slot `N`'s `object_handle` field is
//! the directory entry of instance `N` (offset of its first property), while
//! the rest of the slot may hold a property record of some other instance.
//! Property records never touch `object_handle`, so the roles never clash.
//! Slot 0 is the header.

use crate::error::{JsonError, Result};
use crate::record::{Record, RecordMut};
use crate::types::*;

#[derive(Debug, Clone)]
pub struct RecordTable {
    /// Backing storage; its length is the capacity. The occupied prefix is
    /// `records_length` bytes, as recorded in the header.
    buf: Vec<u8>,
}

impl RecordTable {
    /// An empty table with the header and the root directory slot in place.
    pub fn new(capacity_slots: usize) -> Self {
        let mut buf = vec![0u8; capacity_slots.max(2) * RECORD_SIZE];
        {
            let mut header = RecordMut::new(&mut buf[..RECORD_SIZE]);
            header.set_type(RecordType::Header);
            header.set_records_length(index_to_offset(InstanceId::FIRST_CHILD) as u32);
            header.set_data_length(0);
            header.set_next_instance_id(InstanceId::FIRST_CHILD);
        }
        let root = InstanceId::ROOT.directory_offset();
        RecordMut::new(&mut buf[root..root + RECORD_SIZE]).set_type(RecordType::Clear);
        Self { buf }
    }

    /// Adopt the occupied prefix of a restored document. The caller has
    /// already checked that the header's `records_length` equals `buf.len()`.
    pub fn from_vec(buf: Vec<u8>) -> Self {
        Self { buf }
    }

    // ════════════════════════════════════════════════════════════════════════
    // Header
    // ════════════════════════════════════════════════════════════════════════

    #[inline]
    pub fn header(&self) -> Record<'_> {
        Record::new(&self.buf[..RECORD_SIZE])
    }

    #[inline]
    pub fn header_mut(&mut self) -> RecordMut<'_> {
        RecordMut::new(&mut self.buf[..RECORD_SIZE])
    }

    #[inline]
    pub fn records_length(&self) -> usize {
        self.header().records_length() as usize
    }

    #[inline]
    pub fn record_count(&self) -> usize {
        self.records_length() >> INDEX_TO_OFFSET_SHIFT
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn next_instance_id(&self) -> u32 {
        self.header().next_instance_id()
    }

    /// The occupied prefix, header included.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.records_length()]
    }

    // ════════════════════════════════════════════════════════════════════════
    // Slot access
    // ════════════════════════════════════════════════════════════════════════

    #[inline]
    fn check(&self, offset: u32) -> Result<usize> {
        let start = offset as usize;
        if start % RECORD_SIZE != 0 || start + RECORD_SIZE > self.records_length() {
            return Err(JsonError::Corrupt { offset });
        }
        Ok(start)
    }

    #[inline]
    pub fn record(&self, offset: u32) -> Result<Record<'_>> {
        let start = self.check(offset)?;
        Ok(Record::new(&self.buf[start..start + RECORD_SIZE]))
    }

    #[inline]
    pub fn record_mut(&mut self, offset: u32) -> Result<RecordMut<'_>> {
        let start = self.check(offset)?;
        Ok(RecordMut::new(&mut self.buf[start..start + RECORD_SIZE]))
    }

    /// Offset of the first property of `id`, or `END_OF_CHAIN`.
    #[inline]
    pub fn chain_head(&self, id: InstanceId) -> Result<u32> {
        Ok(self.record(id.directory_offset() as u32)?.object_handle())
    }

    #[inline]
    pub fn set_chain_head(&mut self, id: InstanceId, offset: u32) -> Result<()> {
        self.record_mut(id.directory_offset() as u32)?
            .set_object_handle(offset);
        Ok(())
    }

    #[inline]
    pub fn is_allocated(&self, id: u32) -> bool {
        id >= InstanceId::ROOT.0 && id < self.next_instance_id()
    }

    // ════════════════════════════════════════════════════════════════════════
    // Allocation
    // ════════════════════════════════════════════════════════════════════════

    /// Make room for one more slot, growing if the table is full. Does not
    /// claim the slot; pair with [`RecordTable::claim`].
    pub fn reserve(&mut self) -> Result<()> {
        let needed = self.records_length() + RECORD_SIZE;
        if needed > u32::MAX as usize {
            return Err(JsonError::CapacityExceeded {
                arena: "record table",
                requested: needed,
            });
        }
        while needed > self.buf.len() {
            self.resize();
        }
        Ok(())
    }

    /// Claim the next free slot, which must already be reserved. The slot
    /// arrives zeroed apart from a possible directory handle.
    pub fn claim(&mut self) -> Result<u32> {
        let offset = self.records_length();
        if offset + RECORD_SIZE > self.buf.len() {
            return Err(JsonError::Corrupt {
                offset: offset as u32,
            });
        }
        self.header_mut()
            .set_records_length((offset + RECORD_SIZE) as u32);
        let offset = offset as u32;
        let mut rec = self.record_mut(offset)?;
        rec.set_next_record(END_OF_CHAIN);
        rec.clear_payload();
        Ok(offset)
    }

    /// Hand out the next instance id. Its directory slot must lie inside the
    /// occupied prefix; usually the property record just claimed for the
    /// object covers it, otherwise a `Clear` filler slot is claimed.
    pub fn allocate_instance(&mut self) -> Result<InstanceId> {
        let id = self.next_instance_id();
        while index_to_offset(id) + RECORD_SIZE > self.records_length() {
            self.reserve()?;
            let filler = self.claim()?;
            self.record_mut(filler)?.set_type(RecordType::Clear);
        }
        self.header_mut().set_next_instance_id(id + 1);
        let id = InstanceId(id);
        self.set_chain_head(id, END_OF_CHAIN)?;
        tracing::trace!(instance = %id, "instance allocated");
        Ok(id)
    }

    /// Double the capacity, preserving every byte at its offset.
    pub fn resize(&mut self) {
        let old = self.buf.len();
        let capacity = (old * 2).max(2 * RECORD_SIZE);
        let mut larger = vec![0u8; capacity];
        larger[..old].copy_from_slice(&self.buf);
        self.buf = larger;
        tracing::debug!(old_capacity = old, new_capacity = capacity, "record table grown");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_table_reserves_header_and_root() {
        let table = RecordTable::new(16);
        assert_eq!(table.capacity(), 16 * RECORD_SIZE);
        assert_eq!(table.records_length(), 2 * RECORD_SIZE);
        assert_eq!(table.next_instance_id(), 2);
        assert_eq!(table.header().record_type(), Ok(RecordType::Header));
        assert_eq!(table.chain_head(InstanceId::ROOT).unwrap(), END_OF_CHAIN);
        assert!(table.is_allocated(1));
        assert!(!table.is_allocated(0));
        assert!(!table.is_allocated(2));
    }

    #[test]
    fn resize_doubles_and_preserves_bytes() {
        let mut table = RecordTable::new(2);
        table.set_chain_head(InstanceId::ROOT, 64).unwrap();
        table.reserve().unwrap();
        assert_eq!(table.capacity(), 4 * RECORD_SIZE);
        assert_eq!(table.chain_head(InstanceId::ROOT).unwrap(), 64);
        assert_eq!(table.records_length(), 2 * RECORD_SIZE);
    }

    #[test]
    fn claim_appends_above_directory() {
        let mut table = RecordTable::new(2);
        table.reserve().unwrap();
        let offset = table.claim().unwrap();
        assert_eq!(offset as usize, 2 * RECORD_SIZE);
        assert_eq!(table.records_length(), 3 * RECORD_SIZE);
        let id = table.allocate_instance().unwrap();
        assert_eq!(id.get(), 2);
        assert_eq!(table.next_instance_id(), 3);
    }

    #[test]
    fn claim_without_reserve_fails() {
        let mut table = RecordTable::new(2);
        assert!(matches!(table.claim(), Err(JsonError::Corrupt { .. })));
    }

    #[test]
    fn out_of_range_offsets_are_rejected() {
        let table = RecordTable::new(4);
        assert!(table.record(2 * RECORD_SIZE as u32).is_err());
        assert!(table.record(3).is_err());
        assert!(table.record(RECORD_SIZE as u32).is_ok());
    }

    #[test]
    fn instance_without_backing_slot_claims_filler() {
        let mut table = RecordTable::new(2);
        let id = table.allocate_instance().unwrap();
        assert_eq!(id.get(), 2);
        assert_eq!(table.records_length(), 3 * RECORD_SIZE);
        let filler = table.record(2 * RECORD_SIZE as u32).unwrap();
        assert_eq!(filler.record_type(), Ok(RecordType::Clear));
        assert_eq!(filler.object_handle(), END_OF_CHAIN);
    }
}
