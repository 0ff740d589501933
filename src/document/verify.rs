use super::Document;
use crate::error::{JsonError, Result};
use crate::name_codec::record_name;
use crate::record::Record;
use crate::types::*;
use rustc_hash::FxHashSet;

impl Document {
    /// Check every structural invariant of the document.
    ///
    /// - header lengths agree with the arenas and `next_instance_id` is backed
    ///   by an occupied directory slot;
    /// - every chain offset is aligned, lies above the root directory slot and
    ///   inside the table, and no record belongs to two chains or repeats;
    /// - every type byte is a property type and every heap range is in bounds
    ///   and valid UTF-8;
    /// - names are non-empty and unique per instance;
    /// - every child id was allocated and is referenced at most once;
    /// - orphaned instances, still reachable by id, obey the same rules.
    ///
    /// Restored documents are verified before they are handed out.
    pub fn verify(&self) -> Result<()> {
        let header = self.records.header();
        let records_length = header.records_length() as usize;
        if records_length % RECORD_SIZE != 0
            || records_length < index_to_offset(InstanceId::FIRST_CHILD)
            || records_length > self.records.capacity()
        {
            return Err(JsonError::malformed(format!(
                "records_length {records_length} is not a valid table size"
            )));
        }
        if header.data_length() as usize != self.data.len() {
            return Err(JsonError::malformed(format!(
                "data_length {} does not match heap length {}",
                header.data_length(),
                self.data.len()
            )));
        }
        let next_id = header.next_instance_id();
        if next_id < InstanceId::FIRST_CHILD || index_to_offset(next_id) > records_length {
            return Err(JsonError::malformed(format!(
                "next_instance_id {next_id} has no directory slot"
            )));
        }

        let ty = header
            .record_type()
            .map_err(|tag| JsonError::malformed(format!("unknown root type {tag}")))?;
        let mut seen_records = FxHashSet::default();
        let mut seen_instances = FxHashSet::default();
        seen_instances.insert(InstanceId::ROOT);
        let mut pending = Vec::new();
        if ty == RecordType::Header {
            pending.push(InstanceId::ROOT);
        } else {
            self.verify_literal(header, ty)?;
        }

        // Orphaned instances stay reachable by id, so their chains are held to
        // the same rules. A child is always allocated after its parent, so an
        // ascending scan meets every orphan before its descendants.
        let mut next_orphan = InstanceId::FIRST_CHILD;
        loop {
            while let Some(id) = pending.pop() {
                self.verify_chain(id, &mut seen_records, &mut seen_instances, &mut pending)?;
            }
            while next_orphan < next_id && !seen_instances.insert(InstanceId(next_orphan)) {
                next_orphan += 1;
            }
            if next_orphan >= next_id {
                return Ok(());
            }
            pending.push(InstanceId(next_orphan));
        }
    }

    fn verify_literal(&self, header: Record<'_>, ty: RecordType) -> Result<()> {
        match ty {
            RecordType::Null | RecordType::True | RecordType::False | RecordType::Int64 => Ok(()),
            RecordType::String => self.verify_str(header.value(), 0).map(|_| ()),
            RecordType::StringLiteralInline => {
                let len = header.inline_literal().len();
                std::str::from_utf8(header.inline_literal())
                    .map(|_| ())
                    .map_err(|_| JsonError::malformed(format!("inline literal of {len} bytes is not UTF-8")))
            }
            other => Err(JsonError::malformed(format!(
                "root type {other:?} is neither an object nor a literal"
            ))),
        }
    }

    fn verify_chain(
        &self,
        id: InstanceId,
        seen_records: &mut FxHashSet<u32>,
        seen_instances: &mut FxHashSet<InstanceId>,
        pending: &mut Vec<InstanceId>,
    ) -> Result<()> {
        let first_property = index_to_offset(InstanceId::FIRST_CHILD);
        let mut names: FxHashSet<&[u8]> = FxHashSet::default();
        let mut offset = self
            .records
            .chain_head(id)
            .map_err(|_| JsonError::malformed(format!("instance {id} has no directory slot")))?;

        while offset != END_OF_CHAIN {
            if (offset as usize) < first_property || !seen_records.insert(offset) {
                return Err(JsonError::malformed(format!(
                    "chain of instance {id} revisits or escapes at offset {offset}"
                )));
            }
            let rec = self
                .records
                .record(offset)
                .map_err(|_| JsonError::malformed(format!("record offset {offset} out of range")))?;
            let ty = match rec.record_type() {
                Ok(ty) if ty.is_property() => ty,
                _ => {
                    return Err(JsonError::malformed(format!(
                        "record at {offset} has non-property type {}",
                        rec.type_tag()
                    )));
                }
            };

            let name = record_name(rec, ty, &self.data, offset)
                .map_err(|_| JsonError::malformed(format!("name of record {offset} out of range")))?;
            if name.is_empty() || std::str::from_utf8(name).is_err() {
                return Err(JsonError::malformed(format!(
                    "record at {offset} has an empty or non-UTF-8 name"
                )));
            }
            if !names.insert(name) {
                return Err(JsonError::malformed(format!(
                    "duplicate property name {:?} in instance {id}",
                    String::from_utf8_lossy(name)
                )));
            }

            match ty.base() {
                RecordType::String => {
                    self.verify_str(rec.value(), offset)?;
                }
                RecordType::Object => {
                    let child = rec.value();
                    let valid = u32::try_from(child)
                        .ok()
                        .filter(|&c| c != InstanceId::ROOT.0 && self.records.is_allocated(c));
                    match valid {
                        Some(c) if seen_instances.insert(InstanceId(c)) => pending.push(InstanceId(c)),
                        _ => {
                            return Err(JsonError::malformed(format!(
                                "record at {offset} references invalid or shared instance {child}"
                            )));
                        }
                    }
                }
                _ => {}
            }
            offset = rec.next_record();
        }
        Ok(())
    }

    fn verify_str(&self, packed: i64, offset: u32) -> Result<&str> {
        let (start, len) = unpack_range(packed);
        let bytes = self.data.get(start, len).ok_or_else(|| {
            JsonError::malformed(format!("string of record {offset} leaves the data heap"))
        })?;
        std::str::from_utf8(bytes)
            .map_err(|_| JsonError::malformed(format!("string of record {offset} is not UTF-8")))
    }
}
