//! An embeddable JSON document store built on two flat byte arenas.
//!
//! A [`Document`] keeps every property in a Record Table of fixed 32-byte
//! records and every variable-length byte (long names, string values) in a
//! Data Heap. Each object instance owns a singly linked chain of property
//! records. The binary form is the two arenas' occupied prefixes, so a dump
//! is a copy and a restore is a validated adoption.
//!
//! ```
//! use record_json::{Document, JsonReadable};
//!
//! let mut doc = Document::new();
//! let mut root = doc.root_mut();
//! root.set_bool("active", true).unwrap();
//! let mut name = root.set_object("Name").unwrap();
//! name.set_string("First", "Jim").unwrap();
//!
//! let restored = Document::deserialize(&doc.to_bytes()).unwrap();
//! let first = restored.root().get_object("Name").unwrap();
//! assert_eq!(first.get_string("First").unwrap(), "Jim");
//! assert_eq!(restored.to_json_text().unwrap(), r#"{"active":true,"Name":{"First":"Jim"}}"#);
//! ```

pub mod config;
pub mod data_heap;
pub mod deserialization;
pub mod document;
pub mod error;
pub mod handle;
pub mod name_codec;
pub mod record;
pub mod record_table;
pub mod serialization;
pub mod types;

pub use config::DocumentConfig;
pub use document::{Document, DocumentStats, JsonReadable, PropertyIter};
pub use error::{JsonError, Result};
pub use handle::{JsonMut, JsonRef, Value};
pub use types::{InstanceId, RecordType, ValueKind};
