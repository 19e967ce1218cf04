//! Caller-owned buffer memory imported into a surface.

use std::sync::Arc;

/// Where imported buffer memory comes from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BufferMemoryType {
    /// DMA-BUF file descriptor (PRIME).
    DmaBuf,
    /// GEM flink name.
    GemBuf,
    /// Plain user-space pointer.
    UserPtr,
    /// Driver-allocated VA memory.
    Va,
}

/// Handle to external buffer memory, shared with the surface that wraps it.
///
/// The surface holds an `Arc<BufferProxy>` for its whole lifetime and drops
/// it last during teardown.
#[derive(Debug, PartialEq, Eq)]
pub struct BufferProxy {
    handle: usize,
    size: usize,
    memory_type: BufferMemoryType,
}

impl BufferProxy {
    pub fn new(handle: usize, size: usize, memory_type: BufferMemoryType) -> Arc<Self> {
        Arc::new(Self {
            handle,
            size,
            memory_type,
        })
    }

    /// Native handle (fd, flink name or pointer).
    pub fn handle(&self) -> usize {
        self.handle
    }

    /// Byte size of the whole buffer.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn memory_type(&self) -> BufferMemoryType {
        self.memory_type
    }
}
