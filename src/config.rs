use std::num::NonZeroUsize;

/// Configuration for [`Document::with_config`](crate::Document::with_config).
#[derive(Debug, Clone, Copy)]
pub struct DocumentConfig {
    /// Initial Record Table capacity, in 32-byte slots.
    ///
    /// Values below 2 are raised to 2: the header and the root directory
    /// always occupy the first two slots. The table doubles when full.
    ///
    /// Default: 16 slots.
    pub initial_records: NonZeroUsize,
    /// Initial Data Heap capacity, in bytes.
    ///
    /// `0` defers allocation to the first out-of-line name or string, which
    /// then allocates at least 128 bytes.
    pub initial_data: usize,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            initial_records: NonZeroUsize::MIN.saturating_add(15),
            initial_data: 0,
        }
    }
}
