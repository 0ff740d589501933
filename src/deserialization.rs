use crate::data_heap::DataHeap;
use crate::document::Document;
use crate::error::{JsonError, Result};
use crate::handle::JsonMut;
use crate::record::Record;
use crate::record_table::RecordTable;
use crate::types::*;

// ─── Binary restore ─────────────────────────────────────────────────────────

/// Validate the header of a binary dump and return
/// `(records_length, data_length)`. Trailing bytes past both sections are
/// ignored.
pub fn parse_header(buf: &[u8]) -> Result<(usize, usize)> {
    if buf.len() < RECORD_SIZE {
        return Err(JsonError::malformed(format!(
            "buffer of {} bytes is shorter than one record",
            buf.len()
        )));
    }
    let header = Record::new(&buf[..RECORD_SIZE]);
    let records_length = header.records_length() as usize;
    let data_length = header.data_length() as usize;
    if records_length % RECORD_SIZE != 0 || records_length < index_to_offset(InstanceId::FIRST_CHILD) {
        return Err(JsonError::malformed(format!(
            "records_length {records_length} is not a valid table size"
        )));
    }
    match records_length.checked_add(data_length) {
        Some(total) if total <= buf.len() => Ok((records_length, data_length)),
        _ => Err(JsonError::malformed(format!(
            "declared {records_length} + {data_length} bytes exceed buffer of {}",
            buf.len()
        ))),
    }
}

impl Document {
    /// Rebuild a document from a binary dump. The input is copied; nothing
    /// is constructed unless the whole structure verifies.
    pub fn deserialize(buf: &[u8]) -> Result<Document> {
        let (records_length, data_length) = parse_header(buf)?;
        let records = buf[..records_length].to_vec();
        let data = buf[records_length..records_length + data_length].to_vec();
        Self::restore(records, data)
    }

    /// Like [`Document::deserialize`], but adopts `buf` instead of copying it.
    pub fn from_vec(mut buf: Vec<u8>) -> Result<Document> {
        let (records_length, data_length) = parse_header(&buf)?;
        buf.truncate(records_length + data_length);
        let data = buf.split_off(records_length);
        Self::restore(buf, data)
    }

    fn restore(records: Vec<u8>, data: Vec<u8>) -> Result<Document> {
        let doc = Document {
            records: RecordTable::from_vec(records),
            data: DataHeap::from_vec(data),
        };
        doc.verify()?;
        tracing::debug!(
            records = doc.records.record_count(),
            data_length = doc.data.len(),
            "document restored"
        );
        Ok(doc)
    }

    // ════════════════════════════════════════════════════════════════════════
    // serde_json import
    // ════════════════════════════════════════════════════════════════════════

    /// Build a document from an already-parsed JSON tree. Objects nest;
    /// scalars at the top level become a literal root. Arrays, non-integer
    /// numbers and empty property names are rejected.
    pub fn from_json_value(value: &serde_json::Value) -> Result<Document> {
        let mut doc = Document::new();
        {
            let mut root = doc.root_mut();
            match value {
                serde_json::Value::Object(map) => import_object(&mut root, map)?,
                scalar => import_scalar(&mut root, "", scalar)?,
            }
        }
        tracing::debug!(records = doc.records.record_count(), "document imported");
        Ok(doc)
    }
}

fn import_object(
    obj: &mut JsonMut<'_>,
    map: &serde_json::Map<String, serde_json::Value>,
) -> Result<()> {
    for (name, value) in map {
        if name.is_empty() {
            return Err(JsonError::InvalidName(
                "empty property names cannot be stored".into(),
            ));
        }
        match value {
            serde_json::Value::Object(inner) => {
                let mut child = obj.set_object(name)?;
                import_object(&mut child, inner)?;
            }
            scalar => import_scalar(obj, name, scalar)?,
        }
    }
    Ok(())
}

fn import_scalar(obj: &mut JsonMut<'_>, name: &str, value: &serde_json::Value) -> Result<()> {
    match value {
        serde_json::Value::Null => obj.set_null(name),
        serde_json::Value::Bool(b) => obj.set_bool(name, *b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => obj.set_int64(name, i),
            None => Err(JsonError::Unsupported("numbers outside the i64 range")),
        },
        serde_json::Value::String(s) => obj.set_string(name, s),
        serde_json::Value::Array(_) => Err(JsonError::Unsupported("arrays")),
        serde_json::Value::Object(_) => Err(JsonError::Unsupported("nested object as scalar")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::JsonReadable;
    use serde_json::json;

    #[test]
    fn short_buffer_is_malformed() {
        let err = Document::deserialize(&[0u8; RECORD_SIZE - 1]).unwrap_err();
        assert!(matches!(err, JsonError::MalformedInput(_)));
        assert!(matches!(Document::deserialize(&[]), Err(JsonError::MalformedInput(_))));
    }

    #[test]
    fn declared_lengths_must_fit() {
        let mut bytes = Document::new().to_bytes();
        bytes[16..20].copy_from_slice(&10u32.to_le_bytes());
        assert!(matches!(
            Document::deserialize(&bytes),
            Err(JsonError::MalformedInput(_))
        ));

        let mut bytes = Document::new().to_bytes();
        bytes[20..24].copy_from_slice(&u32::MAX.to_le_bytes());
        assert!(matches!(
            Document::deserialize(&bytes),
            Err(JsonError::MalformedInput(_))
        ));
    }

    #[test]
    fn unaligned_records_length_is_malformed() {
        let mut bytes = vec![0u8; 256];
        bytes[8] = RecordType::Header as u8;
        bytes[20..24].copy_from_slice(&65u32.to_le_bytes());
        assert!(matches!(
            Document::deserialize(&bytes),
            Err(JsonError::MalformedInput(_))
        ));
    }

    #[test]
    fn hand_written_literals() {
        let mut bytes = vec![0u8; 256];
        bytes[0..4].copy_from_slice(&2u32.to_le_bytes());
        bytes[20..24].copy_from_slice(&64u32.to_le_bytes());

        bytes[OFFSET_TYPE] = RecordType::Null as u8;
        assert!(Document::deserialize(&bytes).unwrap().root().is_null());

        bytes[OFFSET_TYPE] = RecordType::True as u8;
        assert!(Document::deserialize(&bytes).unwrap().root().to_bool().unwrap());

        bytes[OFFSET_TYPE] = RecordType::False as u8;
        assert!(!Document::deserialize(&bytes).unwrap().root().to_bool().unwrap());

        bytes[OFFSET_TYPE] = RecordType::Int64 as u8;
        bytes[OFFSET_VALUE..OFFSET_VALUE + 8].copy_from_slice(&12345i64.to_le_bytes());
        let doc = Document::deserialize(&bytes).unwrap();
        assert_eq!(doc.root().kind(), ValueKind::Int64);
        assert_eq!(doc.root().to_int64().unwrap(), 12345);
    }

    #[test]
    fn unknown_type_byte_is_malformed() {
        let mut bytes = Document::new().to_bytes();
        bytes[OFFSET_TYPE] = 77;
        assert!(matches!(
            Document::deserialize(&bytes),
            Err(JsonError::MalformedInput(_))
        ));
    }

    #[test]
    fn corrupt_chain_is_rejected() {
        let mut doc = Document::new();
        doc.root_mut().set_int64("a", 1).unwrap();
        doc.root_mut().set_int64("b", 2).unwrap();
        let good = doc.to_bytes();

        // Point the second record back at the first: a cycle.
        let mut cyclic = good.clone();
        let second = 3 * RECORD_SIZE;
        cyclic[second + 4..second + 8].copy_from_slice(&(2 * RECORD_SIZE as u32).to_le_bytes());
        assert!(matches!(
            Document::deserialize(&cyclic),
            Err(JsonError::MalformedInput(_))
        ));

        // Point the root's chain past the table.
        let mut escaping = good.clone();
        escaping[RECORD_SIZE..RECORD_SIZE + 4].copy_from_slice(&4096u32.to_le_bytes());
        assert!(matches!(
            Document::deserialize(&escaping),
            Err(JsonError::MalformedInput(_))
        ));

        // Give both records the same name.
        let mut duplicate = good;
        duplicate[second + OFFSET_BYTE_BUFFER] = b'a';
        assert!(matches!(
            Document::deserialize(&duplicate),
            Err(JsonError::MalformedInput(_))
        ));
    }

    #[test]
    fn dangling_child_instance_is_rejected() {
        let mut doc = Document::new();
        doc.root_mut().set_object("child").unwrap();
        let mut bytes = doc.to_bytes();
        let record = 2 * RECORD_SIZE;
        bytes[record + OFFSET_VALUE..record + OFFSET_VALUE + 8].copy_from_slice(&99i64.to_le_bytes());
        assert!(matches!(
            Document::deserialize(&bytes),
            Err(JsonError::MalformedInput(_))
        ));
    }

    #[test]
    fn orphaned_chains_are_verified() {
        let mut doc = Document::new();
        {
            let mut root = doc.root_mut();
            root.set_object("child").unwrap().set_int64("a", 1).unwrap();
            root.set_int64("child", 0).unwrap();
        }
        let orphan = InstanceId(InstanceId::FIRST_CHILD);
        let bytes = doc.to_bytes();

        let restored = Document::deserialize(&bytes).unwrap();
        assert_eq!(restored.object(orphan).unwrap().get_int64("a").unwrap(), 1);

        // The orphan's only property sits in the slot after the child record.
        let mut corrupt = bytes;
        corrupt[3 * RECORD_SIZE + OFFSET_TYPE] = 77;
        assert!(matches!(
            Document::deserialize(&corrupt),
            Err(JsonError::MalformedInput(_))
        ));
    }

    #[test]
    fn orphans_of_a_literal_root_are_verified() {
        let mut doc = Document::new();
        doc.root_mut()
            .set_object("gone")
            .unwrap()
            .set_string("text", "still stored")
            .unwrap();
        doc.root_mut().set_null("").unwrap();
        let mut bytes = doc.to_bytes();
        Document::deserialize(&bytes).unwrap();

        // Point the orphan's string range past the heap.
        let record = 3 * RECORD_SIZE;
        bytes[record + OFFSET_VALUE..record + OFFSET_VALUE + 8]
            .copy_from_slice(&pack_range(0, 999).to_le_bytes());
        assert!(matches!(
            Document::deserialize(&bytes),
            Err(JsonError::MalformedInput(_))
        ));
    }

    #[test]
    fn from_vec_adopts_and_ignores_trailing_bytes() {
        let mut doc = Document::new();
        doc.root_mut()
            .set_string("greeting", "hello from the data heap")
            .unwrap();
        let mut bytes = doc.to_bytes();
        bytes.extend_from_slice(&[0xFF; 40]);
        let restored = Document::from_vec(bytes).unwrap();
        assert_eq!(
            restored.root().get_string("greeting").unwrap(),
            "hello from the data heap"
        );
        assert_eq!(restored.to_bytes(), doc.to_bytes());
    }

    #[test]
    fn import_from_json_value() {
        let value = json!({
            "Address": { "Zip": 98052, "Country": "US" },
            "Name": { "First": "Jim", "Last": "Smith" },
            "Active": true,
            "Note": null
        });
        let doc = Document::from_json_value(&value).unwrap();
        doc.verify().unwrap();
        assert_eq!(doc.to_json_value().unwrap(), value);
        let name = doc.root().get_object("Name").unwrap();
        assert_eq!(name.get_string("First").unwrap(), "Jim");
    }

    #[test]
    fn import_scalar_root_is_literal() {
        let doc = Document::from_json_value(&json!(false)).unwrap();
        assert!(doc.is_literal());
        assert_eq!(doc.to_json_text().unwrap(), "false");
    }

    #[test]
    fn import_rejects_what_the_store_cannot_hold() {
        assert!(matches!(
            Document::from_json_value(&json!({ "list": [1, 2] })),
            Err(JsonError::Unsupported(_))
        ));
        assert!(matches!(
            Document::from_json_value(&json!({ "ratio": 2.5 })),
            Err(JsonError::Unsupported(_))
        ));
        assert!(matches!(
            Document::from_json_value(&json!({ "": 1 })),
            Err(JsonError::InvalidName(_))
        ));
    }
}
