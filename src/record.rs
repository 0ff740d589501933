use crate::types::*;

// ─── Field helpers ──────────────────────────────────────────────────────────

#[inline]
fn read_u32(bytes: &[u8], at: usize) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[at..at + 4]);
    u32::from_le_bytes(buf)
}

#[inline]
fn read_i64(bytes: &[u8], at: usize) -> i64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[at..at + 8]);
    i64::from_le_bytes(buf)
}

#[inline]
fn write_u32(bytes: &mut [u8], at: usize, value: u32) {
    bytes[at..at + 4].copy_from_slice(&value.to_le_bytes());
}

/// Trim an inline name window at its first NUL terminator.
#[inline]
fn trim_name(window: &[u8]) -> &[u8] {
    match window.iter().position(|&b| b == 0) {
        Some(end) => &window[..end],
        None => window,
    }
}

// ─── Reader ─────────────────────────────────────────────────────────────────

/// Read-only view over exactly one record slot.
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    bytes: &'a [u8],
}

impl<'a> Record<'a> {
    #[inline]
    pub fn new(bytes: &'a [u8]) -> Self {
        debug_assert_eq!(bytes.len(), RECORD_SIZE);
        Self { bytes }
    }

    #[inline]
    pub fn object_handle(&self) -> u32 {
        read_u32(self.bytes, OFFSET_OBJECT_HANDLE)
    }

    #[inline]
    pub fn next_record(&self) -> u32 {
        read_u32(self.bytes, OFFSET_NEXT_RECORD)
    }

    #[inline]
    pub fn type_tag(&self) -> u8 {
        self.bytes[OFFSET_TYPE]
    }

    #[inline]
    pub fn record_type(&self) -> Result<RecordType, u8> {
        RecordType::try_from(self.type_tag())
    }

    #[inline]
    pub fn range_start(&self) -> u32 {
        read_u32(self.bytes, OFFSET_RANGE_START)
    }

    #[inline]
    pub fn range_length(&self) -> u32 {
        read_u32(self.bytes, OFFSET_RANGE_LENGTH)
    }

    #[inline]
    pub fn value(&self) -> i64 {
        read_i64(self.bytes, OFFSET_VALUE)
    }

    /// The inline name bytes for a record of type `ty`.
    #[inline]
    pub fn inline_name(&self, ty: RecordType) -> &'a [u8] {
        let end = OFFSET_BYTE_BUFFER + ty.name_window();
        trim_name(&self.bytes[OFFSET_BYTE_BUFFER..end])
    }

    /// Bytes of a `StringLiteralInline` header literal.
    pub fn inline_literal(&self) -> &'a [u8] {
        let len = (self.bytes[OFFSET_BYTE_BUFFER] as usize).min(MAX_INLINE_LITERAL_LENGTH);
        &self.bytes[OFFSET_VALUE..OFFSET_VALUE + len]
    }

    // Header slot aliases.

    #[inline]
    pub fn next_instance_id(&self) -> u32 {
        self.object_handle()
    }

    #[inline]
    pub fn data_length(&self) -> u32 {
        self.range_start()
    }

    #[inline]
    pub fn records_length(&self) -> u32 {
        self.range_length()
    }
}

// ─── Writer ─────────────────────────────────────────────────────────────────

/// Mutable view over exactly one record slot.
pub struct RecordMut<'a> {
    bytes: &'a mut [u8],
}

impl<'a> RecordMut<'a> {
    #[inline]
    pub fn new(bytes: &'a mut [u8]) -> Self {
        debug_assert_eq!(bytes.len(), RECORD_SIZE);
        Self { bytes }
    }

    #[inline]
    pub fn as_record(&self) -> Record<'_> {
        Record::new(self.bytes)
    }

    #[inline]
    pub fn set_object_handle(&mut self, offset: u32) {
        write_u32(self.bytes, OFFSET_OBJECT_HANDLE, offset);
    }

    #[inline]
    pub fn set_next_record(&mut self, offset: u32) {
        write_u32(self.bytes, OFFSET_NEXT_RECORD, offset);
    }

    #[inline]
    pub fn set_type(&mut self, ty: RecordType) {
        self.bytes[OFFSET_TYPE] = ty as u8;
    }

    #[inline]
    pub fn set_range(&mut self, start: u32, len: u32) {
        write_u32(self.bytes, OFFSET_RANGE_START, start);
        write_u32(self.bytes, OFFSET_RANGE_LENGTH, len);
    }

    #[inline]
    pub fn set_value(&mut self, value: i64) {
        self.bytes[OFFSET_VALUE..OFFSET_VALUE + 8].copy_from_slice(&value.to_le_bytes());
    }

    /// Zero everything from the type byte onwards. The directory handle and
    /// chain link are left alone.
    #[inline]
    pub fn clear_payload(&mut self) {
        self.bytes[OFFSET_TYPE..].fill(0);
    }

    /// Copy `name` into the inline window and zero-pad the rest of it.
    pub fn write_inline_name(&mut self, name: &[u8], window: usize) {
        debug_assert!(name.len() <= window);
        let dst = &mut self.bytes[OFFSET_BYTE_BUFFER..OFFSET_BYTE_BUFFER + window];
        dst[..name.len()].copy_from_slice(name);
        dst[name.len()..].fill(0);
    }

    pub fn write_inline_literal(&mut self, text: &[u8]) {
        debug_assert!(text.len() <= MAX_INLINE_LITERAL_LENGTH);
        self.bytes[OFFSET_BYTE_BUFFER] = text.len() as u8;
        let dst = &mut self.bytes[OFFSET_VALUE..OFFSET_VALUE + MAX_INLINE_LITERAL_LENGTH];
        dst[..text.len()].copy_from_slice(text);
        dst[text.len()..].fill(0);
    }

    // Header slot aliases.

    #[inline]
    pub fn set_next_instance_id(&mut self, id: u32) {
        self.set_object_handle(id);
    }

    #[inline]
    pub fn set_data_length(&mut self, len: u32) {
        write_u32(self.bytes, OFFSET_RANGE_START, len);
    }

    #[inline]
    pub fn set_records_length(&mut self, len: u32) {
        write_u32(self.bytes, OFFSET_RANGE_LENGTH, len);
    }
}
