use crate::document::{Document, JsonReadable};
use crate::error::{JsonError, Result};
use crate::handle::{JsonRef, Value};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::io::Write;

// ─── Binary form ────────────────────────────────────────────────────────────
//
//  ┌──────────────────────────────────────────────┐
//  │ Record Table (records_length bytes)          │
//  │   slot 0 = header                            │
//  │     16..20 data_length:    u32 (LE)          │
//  │     20..24 records_length: u32 (LE)          │
//  ├──────────────────────────────────────────────┤
//  │ Data Heap (data_length bytes)                │
//  └──────────────────────────────────────────────┘
//
// No transformation: both sections are the arenas' occupied prefixes.

impl Document {
    /// Dump both arenas to `sink`.
    pub fn write_binary<W: Write>(&self, mut sink: W) -> Result<()> {
        sink.write_all(self.records.as_bytes())?;
        sink.write_all(self.data.as_bytes())?;
        Ok(())
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let records = self.records.as_bytes();
        let data = self.data.as_bytes();
        let mut buf = Vec::with_capacity(records.len() + data.len());
        buf.extend_from_slice(records);
        buf.extend_from_slice(data);
        buf
    }

    // ════════════════════════════════════════════════════════════════════════
    // Textual form
    // ════════════════════════════════════════════════════════════════════════

    /// Stream the document as compact JSON text.
    pub fn write_text<W: Write>(&self, sink: W) -> Result<()> {
        serde_json::to_writer(sink, &self.root())?;
        Ok(())
    }

    pub fn to_json_text(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.root())?)
    }

    pub fn to_json_text_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.root())?)
    }

    pub fn to_json_value(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self.root())?)
    }

    /// Encode the same tree walk as CBOR.
    pub fn to_cbor(&self) -> Result<Vec<u8>> {
        cbor4ii::serde::to_vec(Vec::new(), &self.root())
            .map_err(|e| JsonError::Cbor(format!("{e:?}")))
    }
}

// ─── Tree walk ──────────────────────────────────────────────────────────────
//
// The walk only drives structural events (map start/entry/end, scalars);
// text escaping and formatting belong to the serializer.

impl Serialize for JsonRef<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        if self.document().is_literal() && self.id().is_root() {
            let literal = self
                .get("")
                .map_err(<S::Error as serde::ser::Error>::custom)?;
            return literal.serialize(serializer);
        }
        // Counting would walk the chain a second time.
        let mut map = serializer.serialize_map(None)?;
        for (name, value) in self.properties() {
            map.serialize_entry(name, &value)?;
        }
        map.end()
    }
}

impl Serialize for Value<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_none(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int64(i) => serializer.serialize_i64(*i),
            Value::String(s) => serializer.serialize_str(s),
            Value::Object(obj) => obj.serialize(serializer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Document {
        let mut doc = Document::new();
        let mut root = doc.root_mut();
        root.set_string("id", "user:abc123").unwrap();
        root.set_int64("age", 28).unwrap();
        root.set_bool("active", true).unwrap();
        root.set_null("deleted_at").unwrap();
        let mut profile = root.set_object("profile").unwrap();
        profile.set_string("bio", "Developer").unwrap();
        let mut settings = profile.set_object("settings").unwrap();
        settings.set_string("theme", "dark").unwrap();
        doc
    }

    #[test]
    fn text_follows_chain_order() {
        let doc = sample();
        assert_eq!(
            doc.to_json_text().unwrap(),
            r#"{"id":"user:abc123","age":28,"active":true,"deleted_at":null,"profile":{"bio":"Developer","settings":{"theme":"dark"}}}"#
        );
    }

    #[test]
    fn json_value_matches_tree() {
        let doc = sample();
        assert_eq!(
            doc.to_json_value().unwrap(),
            json!({
                "id": "user:abc123",
                "age": 28,
                "active": true,
                "deleted_at": null,
                "profile": { "bio": "Developer", "settings": { "theme": "dark" } }
            })
        );
    }

    #[test]
    fn text_escaping_is_left_to_the_writer() {
        let mut doc = Document::new();
        doc.root_mut().set_string("quote\"d", "line\nbreak").unwrap();
        assert_eq!(doc.to_json_text().unwrap(), r#"{"quote\"d":"line\nbreak"}"#);
    }

    #[test]
    fn empty_document_is_empty_object() {
        let doc = Document::new();
        assert_eq!(doc.to_json_text().unwrap(), "{}");
    }

    #[test]
    fn literal_root_has_no_braces() {
        let mut doc = Document::new();
        doc.root_mut().set_bool("", true).unwrap();
        assert_eq!(doc.to_json_text().unwrap(), "true");
        doc.root_mut().set_null("").unwrap();
        assert_eq!(doc.to_json_text().unwrap(), "null");
        doc.root_mut().set_int64("", -7).unwrap();
        assert_eq!(doc.to_json_text().unwrap(), "-7");
        doc.root_mut().set_string("", "short").unwrap();
        assert_eq!(doc.to_json_text().unwrap(), r#""short""#);
        doc.root_mut().set_string("", "a longer literal").unwrap();
        assert_eq!(doc.to_json_text().unwrap(), r#""a longer literal""#);
    }

    #[test]
    fn write_text_streams_into_sink() {
        let doc = sample();
        let mut out = Vec::new();
        doc.write_text(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), doc.to_json_text().unwrap());
    }

    #[test]
    fn display_renders_subtrees() {
        let doc = sample();
        let profile = doc.root().get_object("profile").unwrap();
        assert_eq!(
            profile.get_object("settings").unwrap().to_string(),
            r#"{"theme":"dark"}"#
        );
    }

    #[test]
    fn cbor_carries_the_same_tree() {
        let doc = sample();
        let bytes = doc.to_cbor().unwrap();
        let decoded: serde_json::Value = cbor4ii::serde::from_slice(&bytes).unwrap();
        assert_eq!(decoded, doc.to_json_value().unwrap());
    }

    #[test]
    fn binary_is_arena_prefixes() {
        let doc = sample();
        let bytes = doc.to_bytes();
        let stats = doc.stats();
        assert_eq!(bytes.len(), stats.records * 32 + stats.data_length);

        let mut streamed = Vec::new();
        doc.write_binary(&mut streamed).unwrap();
        assert_eq!(streamed, bytes);

        assert_eq!(
            u32::from_le_bytes(bytes[20..24].try_into().unwrap()) as usize,
            stats.records * 32
        );
        assert_eq!(
            u32::from_le_bytes(bytes[16..20].try_into().unwrap()) as usize,
            stats.data_length
        );
    }

    struct FailingSink;

    impl Write for FailingSink {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn sink_errors_propagate() {
        let doc = sample();
        assert!(matches!(doc.write_binary(FailingSink), Err(JsonError::Io(_))));
        assert!(matches!(doc.write_text(FailingSink), Err(JsonError::Json(_))));
    }
}
