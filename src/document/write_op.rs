use super::Document;
use crate::error::{JsonError, Result};
use crate::name_codec::EncodedName;
use crate::types::*;

/// A scalar on its way into a record.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Scalar<'v> {
    Null,
    Bool(bool),
    Int64(i64),
    String(&'v str),
}

impl Document {
    // ════════════════════════════════════════════════════════════════════════
    // Set
    // ════════════════════════════════════════════════════════════════════════

    /// Find-or-create `name` on `id` and store `value` in it.
    ///
    /// Every fallible step (heap appends, table growth) runs before any chain
    /// pointer is written. Overwriting an `Object` property orphans the old
    /// child instance; its records stay allocated.
    pub(crate) fn set_value(&mut self, id: InstanceId, name: &str, value: Scalar<'_>) -> Result<()> {
        let result = self.store_value(id, name, value);
        // Heap appends may have landed even if a later step failed.
        self.sync_data_length();
        result
    }

    fn store_value(&mut self, id: InstanceId, name: &str, value: Scalar<'_>) -> Result<()> {
        self.check_instance(id)?;
        if name.is_empty() {
            if !id.is_root() {
                return Err(JsonError::InvalidName(
                    "the empty name is reserved for the root literal".into(),
                ));
            }
            return self.set_literal(value);
        }

        let lookup = self.lookup(id, name)?;
        let (base, payload) = match value {
            Scalar::Null => (RecordType::Null, 0),
            Scalar::Bool(true) => (RecordType::True, 0),
            Scalar::Bool(false) => (RecordType::False, 0),
            Scalar::Int64(i) => (RecordType::Int64, i),
            Scalar::String(s) => {
                let (offset, len) = self.data.append(s.as_bytes())?;
                (RecordType::String, pack_range(offset, len))
            }
        };

        match lookup.found {
            Some(offset) => {
                let rec = self.records.record(offset)?;
                let old = rec
                    .record_type()
                    .map_err(|_| JsonError::Corrupt { offset })?;
                if old.base() == RecordType::Object {
                    tracing::debug!(
                        instance = %id,
                        child = rec.value(),
                        "object property overwritten, child orphaned"
                    );
                }
                let name = EncodedName::capture(rec, old).refit(base, &mut self.data)?;
                let mut rec = self.records.record_mut(offset)?;
                name.write(&mut rec, base);
                if base.has_value() {
                    rec.set_value(payload);
                }
            }
            None => {
                let name = EncodedName::encode(name, base, &mut self.data)?;
                self.records.reserve()?;
                let offset = self.records.claim()?;
                let mut rec = self.records.record_mut(offset)?;
                name.write(&mut rec, base);
                if base.has_value() {
                    rec.set_value(payload);
                }
                self.link(id, lookup.tail, offset)?;
            }
        }
        Ok(())
    }

    // ════════════════════════════════════════════════════════════════════════
    // SetObject
    // ════════════════════════════════════════════════════════════════════════

    /// Store a fresh, empty child instance under `name` and return its id.
    /// An existing property of that name, object or not, is replaced.
    pub(crate) fn set_object(&mut self, id: InstanceId, name: &str) -> Result<InstanceId> {
        let result = self.store_object(id, name);
        self.sync_data_length();
        result
    }

    fn store_object(&mut self, id: InstanceId, name: &str) -> Result<InstanceId> {
        self.check_instance(id)?;
        if name.is_empty() {
            return Err(JsonError::InvalidName(
                "an object needs a non-empty property name".into(),
            ));
        }

        let lookup = self.lookup(id, name)?;
        let base = RecordType::Object;
        let (offset, name, fresh) = match lookup.found {
            Some(offset) => {
                let rec = self.records.record(offset)?;
                let old = rec
                    .record_type()
                    .map_err(|_| JsonError::Corrupt { offset })?;
                let name = EncodedName::capture(rec, old).refit(base, &mut self.data)?;
                (offset, name, false)
            }
            None => {
                let name = EncodedName::encode(name, base, &mut self.data)?;
                self.records.reserve()?;
                (self.records.claim()?, name, true)
            }
        };
        let child = self.records.allocate_instance()?;

        let mut rec = self.records.record_mut(offset)?;
        name.write(&mut rec, base);
        rec.set_value(child.get() as i64);
        if fresh {
            self.link(id, lookup.tail, offset)?;
        }
        Ok(child)
    }

    // ════════════════════════════════════════════════════════════════════════
    // Internal
    // ════════════════════════════════════════════════════════════════════════

    /// Hang a new record off the end of `id`'s chain. A literal root turns
    /// back into an object here, with the new record as its only property.
    fn link(&mut self, id: InstanceId, tail: u32, offset: u32) -> Result<()> {
        if id.is_root() && self.is_literal() {
            self.records.header_mut().set_type(RecordType::Header);
        }
        if tail == END_OF_CHAIN {
            self.records.set_chain_head(id, offset)
        } else {
            self.records.record_mut(tail)?.set_next_record(offset);
            Ok(())
        }
    }

    /// Make the root a bare scalar. Any properties it had are orphaned.
    fn set_literal(&mut self, value: Scalar<'_>) -> Result<()> {
        let heap_range = match value {
            Scalar::String(s) if s.len() > MAX_INLINE_LITERAL_LENGTH => {
                Some(self.data.append(s.as_bytes())?)
            }
            _ => None,
        };
        if !self.is_literal() && self.records.chain_head(InstanceId::ROOT)? != END_OF_CHAIN {
            tracing::debug!("root properties orphaned by literal assignment");
        }
        self.records.set_chain_head(InstanceId::ROOT, END_OF_CHAIN)?;

        let mut header = self.records.header_mut();
        match value {
            Scalar::Null => header.set_type(RecordType::Null),
            Scalar::Bool(true) => header.set_type(RecordType::True),
            Scalar::Bool(false) => header.set_type(RecordType::False),
            Scalar::Int64(i) => {
                header.set_type(RecordType::Int64);
                header.set_value(i);
            }
            Scalar::String(s) => match heap_range {
                Some((offset, len)) => {
                    header.set_type(RecordType::String);
                    header.set_value(pack_range(offset, len));
                }
                None => {
                    header.set_type(RecordType::StringLiteralInline);
                    header.write_inline_literal(s.as_bytes());
                }
            },
        }
        Ok(())
    }
}
