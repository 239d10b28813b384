//! Payload dimensions for the download endpoint.

/// Total bytes served by one download (20 GiB).
pub const DEFAULT_TOTAL_SIZE: u64 = 20 * 1024 * 1024 * 1024;

/// Maximum bytes produced per generator read (10 MiB).
pub const DEFAULT_CHUNK_SIZE: usize = 10 * 1024 * 1024;

/// Byte value the synthetic payload is made of.
pub const FILLER_BYTE: u8 = b'A';

/// Size of one synthetic transfer: how many bytes in total, and how many
/// per chunk.
///
/// The server uses [`PayloadSpec::default()`]; smaller specs exist so tests
/// can drive the same code paths without moving gigabytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadSpec {
    total_size: u64,
    chunk_size: usize,
}

impl PayloadSpec {
    /// Create a payload spec.
    ///
    /// # Panics
    ///
    /// Panics if `chunk_size` is zero.
    pub fn new(total_size: u64, chunk_size: usize) -> Self {
        assert!(chunk_size > 0, "chunk_size must be > 0");
        Self {
            total_size,
            chunk_size,
        }
    }

    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Number of non-empty chunks a full transfer is split into.
    pub fn chunk_count(&self) -> u64 {
        self.total_size.div_ceil(self.chunk_size as u64)
    }
}

impl Default for PayloadSpec {
    fn default() -> Self {
        Self::new(DEFAULT_TOTAL_SIZE, DEFAULT_CHUNK_SIZE)
    }
}
