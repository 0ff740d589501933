use super::Document;
use crate::error::{JsonError, Result};
use crate::handle::{JsonRef, Value};
use crate::name_codec::record_name;
use crate::types::*;

/// Result of walking one property chain for a name.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Lookup {
    /// Offset of the matching record.
    pub found: Option<u32>,
    /// Last record of the chain, or `END_OF_CHAIN` when the chain is empty.
    /// Only meaningful when nothing matched.
    pub tail: u32,
}

impl Document {
    // ════════════════════════════════════════════════════════════════════════
    // Chain walk
    // ════════════════════════════════════════════════════════════════════════

    /// Walk `id`'s chain comparing names byte for byte (case-sensitive).
    pub(crate) fn lookup(&self, id: InstanceId, name: &str) -> Result<Lookup> {
        let mut lookup = Lookup {
            found: None,
            tail: END_OF_CHAIN,
        };
        // A literal root has no live chain.
        if id.is_root() && self.is_literal() {
            return Ok(lookup);
        }
        let wanted = name.as_bytes();
        let mut offset = self.records.chain_head(id)?;
        while offset != END_OF_CHAIN {
            let rec = self.records.record(offset)?;
            let ty = rec
                .record_type()
                .map_err(|_| JsonError::Corrupt { offset })?;
            if record_name(rec, ty, &self.data, offset)? == wanted {
                lookup.found = Some(offset);
                return Ok(lookup);
            }
            lookup.tail = offset;
            offset = rec.next_record();
        }
        Ok(lookup)
    }

    /// Resolve `name` on `id`. The empty name addresses the instance itself.
    pub(crate) fn get(&self, id: InstanceId, name: &str) -> Result<Value<'_>> {
        if name.is_empty() {
            return self.self_value(id);
        }
        let offset = self
            .lookup(id, name)?
            .found
            .ok_or_else(|| JsonError::not_found(name))?;
        self.value_at(offset)
    }

    // ════════════════════════════════════════════════════════════════════════
    // Decoding
    // ════════════════════════════════════════════════════════════════════════

    pub(crate) fn value_at(&self, offset: u32) -> Result<Value<'_>> {
        let rec = self.records.record(offset)?;
        let ty = rec
            .record_type()
            .map_err(|_| JsonError::Corrupt { offset })?;
        Ok(match ty.base() {
            RecordType::Null => Value::Null,
            RecordType::True => Value::Bool(true),
            RecordType::False => Value::Bool(false),
            RecordType::Int64 => Value::Int64(rec.value()),
            RecordType::String => Value::String(self.heap_str(rec.value(), offset)?),
            RecordType::Object => {
                Value::Object(JsonRef::new(self, InstanceId(rec.value() as u32)))
            }
            _ => return Err(JsonError::Corrupt { offset }),
        })
    }

    /// The value of the instance itself: the literal for a literal root,
    /// otherwise the object.
    pub(crate) fn self_value(&self, id: InstanceId) -> Result<Value<'_>> {
        if !(id.is_root() && self.is_literal()) {
            return Ok(Value::Object(JsonRef::new(self, id)));
        }
        let header = self.records.header();
        let ty = header
            .record_type()
            .map_err(|_| JsonError::Corrupt { offset: 0 })?;
        Ok(match ty {
            RecordType::Null => Value::Null,
            RecordType::True => Value::Bool(true),
            RecordType::False => Value::Bool(false),
            RecordType::Int64 => Value::Int64(header.value()),
            RecordType::String => Value::String(self.heap_str(header.value(), 0)?),
            RecordType::StringLiteralInline => Value::String(
                std::str::from_utf8(header.inline_literal())
                    .map_err(|_| JsonError::Corrupt { offset: 0 })?,
            ),
            _ => return Err(JsonError::Corrupt { offset: 0 }),
        })
    }

    pub(crate) fn instance_kind(&self, id: InstanceId) -> ValueKind {
        if id.is_root() && self.is_literal() {
            if let Ok(ty) = self.records.header().record_type() {
                return ty.kind();
            }
        }
        ValueKind::Object
    }

    fn heap_str(&self, packed: i64, offset: u32) -> Result<&str> {
        let (start, len) = unpack_range(packed);
        let bytes = self
            .data
            .get(start, len)
            .ok_or(JsonError::Corrupt { offset })?;
        std::str::from_utf8(bytes).map_err(|_| JsonError::Corrupt { offset })
    }

    /// Iterate `id`'s properties in chain order.
    pub(crate) fn properties(&self, id: InstanceId) -> PropertyIter<'_> {
        let next = if id.is_root() && self.is_literal() {
            END_OF_CHAIN
        } else {
            self.records.chain_head(id).unwrap_or(END_OF_CHAIN)
        };
        PropertyIter { doc: self, next }
    }
}

// ─── Iterator ───────────────────────────────────────────────────────────────

/// Properties of one instance, in chain (insertion) order.
///
/// Chains of a document built through the API or restored through
/// `deserialize` are always well formed; a record that fails to decode
/// ends the iteration.
pub struct PropertyIter<'a> {
    doc: &'a Document,
    next: u32,
}

impl<'a> Iterator for PropertyIter<'a> {
    type Item = (&'a str, Value<'a>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.next == END_OF_CHAIN {
            return None;
        }
        let offset = self.next;
        let rec = self.doc.records.record(offset).ok()?;
        let ty = rec.record_type().ok()?;
        let name = record_name(rec, ty, &self.doc.data, offset).ok()?;
        let name = std::str::from_utf8(name).ok()?;
        let value = self.doc.value_at(offset).ok()?;
        self.next = rec.next_record();
        Some((name, value))
    }
}

// ─── Accessor trait ─────────────────────────────────────────────────────────

/// Typed reads shared by [`JsonRef`] and [`JsonMut`](crate::JsonMut).
///
/// Every `get_*` resolves the name by walking the instance's chain. A missing
/// name is [`JsonError::NotFound`]; a record of another type is
/// [`JsonError::TypeMismatch`]. The empty name addresses the instance itself.
pub trait JsonReadable {
    fn document(&self) -> &Document;
    fn id(&self) -> InstanceId;

    /// Resolve a property to its value.
    #[inline]
    fn get(&self, name: &str) -> Result<Value<'_>> {
        self.document().get(self.id(), name)
    }

    fn get_bool(&self, name: &str) -> Result<bool> {
        self.get(name)?.expect_bool()
    }

    fn get_int64(&self, name: &str) -> Result<i64> {
        self.get(name)?.expect_int64()
    }

    /// Zero-copy; the borrow ends before the next mutation.
    fn get_string(&self, name: &str) -> Result<&str> {
        self.get(name)?.expect_str()
    }

    fn get_object(&self, name: &str) -> Result<JsonRef<'_>> {
        self.get(name)?.expect_object()
    }

    /// Whether a property exists, whatever its type.
    fn contains(&self, name: &str) -> bool {
        matches!(self.document().lookup(self.id(), name), Ok(l) if l.found.is_some())
    }

    #[inline]
    fn kind(&self) -> ValueKind {
        self.document().instance_kind(self.id())
    }

    #[inline]
    fn is_null(&self) -> bool {
        self.kind() == ValueKind::Null
    }

    #[inline]
    fn to_bool(&self) -> Result<bool> {
        self.get_bool("")
    }

    #[inline]
    fn to_int64(&self) -> Result<i64> {
        self.get_int64("")
    }

    #[inline]
    fn to_str(&self) -> Result<&str> {
        self.get_string("")
    }

    fn properties(&self) -> PropertyIter<'_> {
        self.document().properties(self.id())
    }

    /// Number of properties; zero for a literal root.
    fn len(&self) -> usize {
        self.properties().count()
    }

    fn is_empty(&self) -> bool {
        self.properties().next().is_none()
    }
}
