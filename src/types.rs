use std::fmt;

// ─── Binary Layout ──────────────────────────────────────────────────────────
//
//  One record = 32 bytes, addressed by `index << INDEX_TO_OFFSET_SHIFT`.
//
//  ┌──────────────────────────────────────────────┐
//  │  0..4   object_handle: u32 (LE)              │  directory use only
//  │  4..8   next_record:   u32 (LE)              │  0 = end of chain
//  │  8      type:          u8  (RecordType)      │
//  │  9..16  byte_buffer    ─┐                    │
//  │ 16..20  range_start    ─┤ inline name window │
//  │ 20..24  range_length   ─┘ (9..24 or 9..32)   │
//  │ 24..32  value:         i64 (LE)              │
//  └──────────────────────────────────────────────┘
//
//  Slot 0 is the header: next_instance_id at 0..4, type = Header (or the
//  literal's type when the root is a bare scalar), data_length at 16..20,
//  records_length at 20..24, literal payload at 24..32.

pub const OFFSET_OBJECT_HANDLE: usize = 0;
pub const OFFSET_NEXT_RECORD: usize = OFFSET_OBJECT_HANDLE + 4;
pub const OFFSET_TYPE: usize = OFFSET_NEXT_RECORD + 4;
pub const OFFSET_BYTE_BUFFER: usize = OFFSET_TYPE + 1;
pub const OFFSET_RANGE_START: usize = OFFSET_TYPE + 8;
pub const OFFSET_RANGE_LENGTH: usize = OFFSET_RANGE_START + 4;
pub const OFFSET_VALUE: usize = OFFSET_RANGE_START + 8;

pub const RECORD_SIZE: usize = OFFSET_VALUE + 8;
pub const INDEX_TO_OFFSET_SHIFT: u32 = 5;

/// Inline name window of records that carry no value (null/true/false).
pub const MAX_BYTE_BUFFER_LENGTH: usize = RECORD_SIZE - OFFSET_BYTE_BUFFER;
/// Inline name window of records whose value field is live.
pub const MAX_INLINE_NAME_WITH_VALUE: usize = OFFSET_VALUE - OFFSET_BYTE_BUFFER;
/// Longest string literal the header can hold in its value field.
pub const MAX_INLINE_LITERAL_LENGTH: usize = 8;

/// Terminates a property chain. Offset 0 is the header, never a property.
pub const END_OF_CHAIN: u32 = 0;

pub const MIN_DATA_CAPACITY: usize = 128;

const _: () = assert!(RECORD_SIZE == 1 << INDEX_TO_OFFSET_SHIFT);

#[inline]
pub const fn index_to_offset(index: u32) -> usize {
    (index as usize) << INDEX_TO_OFFSET_SHIFT
}

#[inline]
pub const fn offset_to_index(offset: usize) -> u32 {
    (offset >> INDEX_TO_OFFSET_SHIFT) as u32
}

/// Pack a Data Heap range into a record's value field: offset in the low
/// 32 bits, length in the high 32 bits.
#[inline]
pub const fn pack_range(offset: u32, len: u32) -> i64 {
    ((len as u64) << 32 | offset as u64) as i64
}

#[inline]
pub const fn unpack_range(value: i64) -> (u32, u32) {
    let bits = value as u64;
    (bits as u32, (bits >> 32) as u32)
}

// ─── RecordType ─────────────────────────────────────────────────────────────

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordType {
    Null = 0,
    True = 1,
    False = 2,

    Int64 = 3,
    String = 4,
    Object = 5,

    TruePropertyInline = 6,
    FalsePropertyInline = 7,
    NullPropertyInline = 8,

    StringLiteralInline = 9,

    Int64PropertyInline = 10,
    StringPropertyInline = 11,
    ObjectPropertyInline = 12,

    Header = 254,
    Clear = 255,
}

impl TryFrom<u8> for RecordType {
    type Error = u8;

    fn try_from(tag: u8) -> Result<Self, u8> {
        Ok(match tag {
            0 => RecordType::Null,
            1 => RecordType::True,
            2 => RecordType::False,
            3 => RecordType::Int64,
            4 => RecordType::String,
            5 => RecordType::Object,
            6 => RecordType::TruePropertyInline,
            7 => RecordType::FalsePropertyInline,
            8 => RecordType::NullPropertyInline,
            9 => RecordType::StringLiteralInline,
            10 => RecordType::Int64PropertyInline,
            11 => RecordType::StringPropertyInline,
            12 => RecordType::ObjectPropertyInline,
            254 => RecordType::Header,
            255 => RecordType::Clear,
            other => return Err(other),
        })
    }
}

impl RecordType {
    /// The out-of-line type with the same value semantics.
    pub fn base(self) -> RecordType {
        match self {
            RecordType::TruePropertyInline => RecordType::True,
            RecordType::FalsePropertyInline => RecordType::False,
            RecordType::NullPropertyInline => RecordType::Null,
            RecordType::Int64PropertyInline => RecordType::Int64,
            RecordType::StringPropertyInline | RecordType::StringLiteralInline => {
                RecordType::String
            }
            RecordType::ObjectPropertyInline => RecordType::Object,
            other => other,
        }
    }

    /// The inline-name counterpart of a property type.
    pub fn inline(self) -> RecordType {
        match self.base() {
            RecordType::True => RecordType::TruePropertyInline,
            RecordType::False => RecordType::FalsePropertyInline,
            RecordType::Null => RecordType::NullPropertyInline,
            RecordType::Int64 => RecordType::Int64PropertyInline,
            RecordType::String => RecordType::StringPropertyInline,
            RecordType::Object => RecordType::ObjectPropertyInline,
            other => other,
        }
    }

    #[inline]
    pub fn has_inline_name(self) -> bool {
        matches!(
            self,
            RecordType::TruePropertyInline
                | RecordType::FalsePropertyInline
                | RecordType::NullPropertyInline
                | RecordType::Int64PropertyInline
                | RecordType::StringPropertyInline
                | RecordType::ObjectPropertyInline
        )
    }

    /// Whether the value field (bytes 24..32) carries a payload.
    #[inline]
    pub fn has_value(self) -> bool {
        matches!(
            self.base(),
            RecordType::Int64 | RecordType::String | RecordType::Object
        )
    }

    /// Bytes available for an inline name in a record of this type.
    #[inline]
    pub fn name_window(self) -> usize {
        if self.has_value() {
            MAX_INLINE_NAME_WITH_VALUE
        } else {
            MAX_BYTE_BUFFER_LENGTH
        }
    }

    /// True for types a property record may hold.
    pub fn is_property(self) -> bool {
        !matches!(
            self,
            RecordType::StringLiteralInline | RecordType::Header | RecordType::Clear
        )
    }

    /// True for types the header may hold to mark a literal root.
    pub fn is_literal(self) -> bool {
        matches!(
            self,
            RecordType::Null
                | RecordType::True
                | RecordType::False
                | RecordType::Int64
                | RecordType::String
                | RecordType::StringLiteralInline
        )
    }

    pub fn kind(self) -> ValueKind {
        match self.base() {
            RecordType::Null => ValueKind::Null,
            RecordType::True | RecordType::False => ValueKind::Bool,
            RecordType::Int64 => ValueKind::Int64,
            RecordType::String => ValueKind::String,
            _ => ValueKind::Object,
        }
    }
}

// ─── ValueKind ──────────────────────────────────────────────────────────────

/// The JSON-level type of a property or handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Bool,
    Int64,
    String,
    Object,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ValueKind::Null => "null",
            ValueKind::Bool => "bool",
            ValueKind::Int64 => "int64",
            ValueKind::String => "string",
            ValueKind::Object => "object",
        })
    }
}

// ─── InstanceId ─────────────────────────────────────────────────────────────

/// Identifies one JSON object. Its directory slot is `index_to_offset(id)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InstanceId(pub(crate) u32);

impl InstanceId {
    pub const ROOT: InstanceId = InstanceId(1);
    /// First id handed out by `set_object`.
    pub(crate) const FIRST_CHILD: u32 = 2;

    #[inline]
    pub fn get(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn is_root(self) -> bool {
        self == InstanceId::ROOT
    }

    #[inline]
    pub(crate) fn directory_offset(self) -> usize {
        index_to_offset(self.0)
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
