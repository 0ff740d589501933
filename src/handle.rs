//! Document handles: "the JSON value at this object".
//!
//! A handle is a document reference plus an instance id and owns no data.
//! The borrow checker keeps it from outliving its document and keeps string
//! slices it hands out from surviving the next mutation.

use crate::document::{Document, JsonReadable, PropertyIter, Scalar};
use crate::error::{JsonError, Result};
use crate::types::{InstanceId, ValueKind};
use std::fmt;

// ─── Value ──────────────────────────────────────────────────────────────────

/// A resolved property value, borrowed from its document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value<'a> {
    Null,
    Bool(bool),
    Int64(i64),
    String(&'a str),
    Object(JsonRef<'a>),
}

impl<'a> Value<'a> {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Int64(_) => ValueKind::Int64,
            Value::String(_) => ValueKind::String,
            Value::Object(_) => ValueKind::Object,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int64(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&'a str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<JsonRef<'a>> {
        match self {
            Value::Object(obj) => Some(*obj),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    // ─── Typed extraction ───

    pub(crate) fn expect_bool(self) -> Result<bool> {
        match self {
            Value::Bool(b) => Ok(b),
            other => Err(other.mismatch(ValueKind::Bool)),
        }
    }

    pub(crate) fn expect_int64(self) -> Result<i64> {
        match self {
            Value::Int64(i) => Ok(i),
            other => Err(other.mismatch(ValueKind::Int64)),
        }
    }

    pub(crate) fn expect_str(self) -> Result<&'a str> {
        match self {
            Value::String(s) => Ok(s),
            other => Err(other.mismatch(ValueKind::String)),
        }
    }

    pub(crate) fn expect_object(self) -> Result<JsonRef<'a>> {
        match self {
            Value::Object(obj) => Ok(obj),
            other => Err(other.mismatch(ValueKind::Object)),
        }
    }

    #[inline]
    fn mismatch(&self, expected: ValueKind) -> JsonError {
        JsonError::TypeMismatch {
            expected,
            actual: self.kind(),
        }
    }
}

// ─── JsonRef ────────────────────────────────────────────────────────────────

/// Shared handle on one instance.
#[derive(Clone, Copy)]
pub struct JsonRef<'a> {
    doc: &'a Document,
    id: InstanceId,
}

impl<'a> JsonRef<'a> {
    #[inline]
    pub(crate) fn new(doc: &'a Document, id: InstanceId) -> Self {
        Self { doc, id }
    }

    // The accessors below shadow their `JsonReadable` namesakes so that
    // borrowed results live as long as the document, not the handle.

    #[inline]
    pub fn get(&self, name: &str) -> Result<Value<'a>> {
        self.doc.get(self.id, name)
    }

    pub fn get_string(&self, name: &str) -> Result<&'a str> {
        self.get(name)?.expect_str()
    }

    pub fn get_object(&self, name: &str) -> Result<JsonRef<'a>> {
        self.get(name)?.expect_object()
    }

    pub fn to_str(&self) -> Result<&'a str> {
        self.get_string("")
    }

    pub fn properties(&self) -> PropertyIter<'a> {
        self.doc.properties(self.id)
    }
}

impl JsonReadable for JsonRef<'_> {
    #[inline]
    fn document(&self) -> &Document {
        self.doc
    }

    #[inline]
    fn id(&self) -> InstanceId {
        self.id
    }
}

impl PartialEq for JsonRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.doc, other.doc) && self.id == other.id
    }
}

impl fmt::Debug for JsonRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonRef")
            .field("id", &self.id)
            .field("kind", &self.kind())
            .finish()
    }
}

/// Renders the subtree as compact JSON text.
impl fmt::Display for JsonRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

// ─── JsonMut ────────────────────────────────────────────────────────────────

/// Exclusive handle on one instance; reads plus find-or-create writes.
pub struct JsonMut<'a> {
    doc: &'a mut Document,
    id: InstanceId,
}

impl<'a> JsonMut<'a> {
    #[inline]
    pub(crate) fn new(doc: &'a mut Document, id: InstanceId) -> Self {
        Self { doc, id }
    }

    #[inline]
    pub fn as_shared(&self) -> JsonRef<'_> {
        JsonRef::new(self.doc, self.id)
    }

    /// Set `name` to `null`. With the empty name on the root, the whole
    /// document becomes the literal `null`.
    pub fn set_null(&mut self, name: &str) -> Result<()> {
        self.doc.set_value(self.id, name, Scalar::Null)
    }

    pub fn set_bool(&mut self, name: &str, value: bool) -> Result<()> {
        self.doc.set_value(self.id, name, Scalar::Bool(value))
    }

    pub fn set_int64(&mut self, name: &str, value: i64) -> Result<()> {
        self.doc.set_value(self.id, name, Scalar::Int64(value))
    }

    pub fn set_string(&mut self, name: &str, value: &str) -> Result<()> {
        self.doc.set_value(self.id, name, Scalar::String(value))
    }

    /// Replace `name` with a fresh empty object and return a handle on it.
    pub fn set_object(&mut self, name: &str) -> Result<JsonMut<'_>> {
        let child = self.doc.set_object(self.id, name)?;
        Ok(JsonMut::new(self.doc, child))
    }

    /// Open an existing object property for writing.
    pub fn object_mut(&mut self, name: &str) -> Result<JsonMut<'_>> {
        let child = self.doc.get(self.id, name)?.expect_object()?.id;
        Ok(JsonMut::new(self.doc, child))
    }
}

impl JsonReadable for JsonMut<'_> {
    #[inline]
    fn document(&self) -> &Document {
        self.doc
    }

    #[inline]
    fn id(&self) -> InstanceId {
        self.id
    }
}

impl fmt::Debug for JsonMut<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.as_shared(), f)
    }
}
