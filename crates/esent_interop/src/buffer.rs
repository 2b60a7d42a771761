//! Scratch buffers for variable-length retrievals.

use std::ops::{Deref, DerefMut};

use parking_lot::Mutex;

/// A pool holding at most one spare buffer.
///
/// A buffer taken from the pool is owned by exactly one retrieval until it is
/// dropped, at which point it is offered back. Only buffers whose capacity is
/// between the configured size and the cache limit are kept.
#[derive(Debug)]
pub struct BufferPool {
    buffer_size: usize,
    max_cached: usize,
    cached: Mutex<Option<Vec<u8>>>,
}

impl BufferPool {
    /// Creates an empty pool.
    #[must_use]
    pub fn new(buffer_size: usize, max_cached: usize) -> Self {
        Self {
            buffer_size,
            max_cached,
            cached: Mutex::new(None),
        }
    }

    /// Size of the buffers handed out.
    #[must_use]
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Takes a buffer of `buffer_size()` bytes.
    pub fn take(&self) -> ScratchBuffer<'_> {
        let mut buffer = self.cached.lock().take().unwrap_or_default();
        buffer.clear();
        buffer.resize(self.buffer_size, 0);
        ScratchBuffer {
            pool: self,
            buffer: Some(buffer),
        }
    }

    fn give_back(&self, buffer: Vec<u8>) {
        let capacity = buffer.capacity();
        if capacity < self.buffer_size || capacity > self.max_cached {
            return;
        }
        let mut cached = self.cached.lock();
        if cached.is_none() {
            *cached = Some(buffer);
        }
    }

    #[cfg(test)]
    fn has_cached(&self) -> bool {
        self.cached.lock().is_some()
    }
}

/// A buffer on loan from a [`BufferPool`].
#[derive(Debug)]
pub struct ScratchBuffer<'a> {
    pool: &'a BufferPool,
    buffer: Option<Vec<u8>>,
}

impl ScratchBuffer<'_> {
    /// Detaches the buffer from the pool.
    #[must_use]
    pub fn into_vec(mut self) -> Vec<u8> {
        self.buffer.take().unwrap_or_default()
    }
}

impl Deref for ScratchBuffer<'_> {
    type Target = Vec<u8>;

    fn deref(&self) -> &Vec<u8> {
        self.buffer.as_ref().map_or(&EMPTY, |b| b)
    }
}

impl DerefMut for ScratchBuffer<'_> {
    fn deref_mut(&mut self) -> &mut Vec<u8> {
        self.buffer.get_or_insert_with(Vec::new)
    }
}

impl Drop for ScratchBuffer<'_> {
    fn drop(&mut self) {
        if let Some(buffer) = self.buffer.take() {
            self.pool.give_back(buffer);
        }
    }
}

static EMPTY: Vec<u8> = Vec::new();

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffers_have_configured_size() {
        let pool = BufferPool::new(16, 64);
        let buffer = pool.take();
        assert_eq!(buffer.len(), 16);
    }

    #[test]
    fn returned_buffer_is_reused() {
        let pool = BufferPool::new(16, 64);
        drop(pool.take());
        assert!(pool.has_cached());
        let _buffer = pool.take();
        assert!(!pool.has_cached());
    }

    #[test]
    fn oversized_buffers_are_not_cached() {
        let pool = BufferPool::new(16, 64);
        let mut buffer = pool.take();
        buffer.resize(1024, 0);
        drop(buffer);
        assert!(!pool.has_cached());
    }

    #[test]
    fn detached_buffers_are_not_returned() {
        let pool = BufferPool::new(16, 64);
        let data = pool.take().into_vec();
        assert_eq!(data.len(), 16);
        assert!(!pool.has_cached());
    }

    #[test]
    fn concurrent_loans_get_distinct_buffers() {
        let pool = BufferPool::new(8, 64);
        let mut a = pool.take();
        let mut b = pool.take();
        a[0] = 1;
        b[0] = 2;
        assert_eq!((a[0], b[0]), (1, 2));
    }
}
