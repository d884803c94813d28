//! Bounded pool of `BytesMut` buffers used to frame responses.

use std::ops::{Deref, DerefMut};

use bytes::BytesMut;
use crossbeam_queue::ArrayQueue;

use crate::config::BufferPoolConfig;

/// A lock-free pool of response buffers shared across connections.
///
/// `acquire()` pops a recycled buffer or allocates a new one. The returned
/// [`PooledBuffer`] pushes its buffer back when dropped. A full pool, or a
/// buffer that grew past `max_retained_capacity`, means the buffer is simply
/// dropped.
#[derive(Debug)]
pub struct BufferPool {
    free: ArrayQueue<BytesMut>,
    default_capacity: usize,
    max_retained_capacity: usize,
}

impl BufferPool {
    /// Create a pool holding at most `pool_size` idle buffers.
    ///
    /// # Panics
    ///
    /// Panics if `pool_size` is 0. Validated configs never hit this.
    pub fn new(pool_size: usize, default_capacity: usize, max_retained_capacity: usize) -> Self {
        assert!(pool_size > 0, "pool_size must be positive");
        Self {
            free: ArrayQueue::new(pool_size),
            default_capacity,
            max_retained_capacity: max_retained_capacity.max(default_capacity),
        }
    }

    /// Build a pool from the `[buffer_pool]` config section.
    pub fn from_config(config: &BufferPoolConfig) -> Self {
        Self::new(
            config.pool_size,
            config.default_capacity,
            config.max_retained_capacity,
        )
    }

    /// Check out an empty buffer.
    pub fn acquire(&self) -> PooledBuffer<'_> {
        let mut buf = self
            .free
            .pop()
            .unwrap_or_else(|| BytesMut::with_capacity(self.default_capacity));
        // Checkouts always start empty, whatever the release path did.
        buf.clear();
        PooledBuffer { buf, pool: self }
    }

    fn release(&self, mut buf: BytesMut) {
        if buf.capacity() > self.max_retained_capacity {
            return;
        }
        buf.clear();
        let _ = self.free.push(buf);
    }

    /// Number of idle buffers waiting to be reused.
    pub fn available(&self) -> usize {
        self.free.len()
    }
}

/// A buffer checked out of a [`BufferPool`].
///
/// Dereferences to `BytesMut`. Returned to the pool exactly once, on drop.
#[derive(Debug)]
pub struct PooledBuffer<'a> {
    buf: BytesMut,
    pool: &'a BufferPool,
}

impl Deref for PooledBuffer<'_> {
    type Target = BytesMut;

    fn deref(&self) -> &BytesMut {
        &self.buf
    }
}

impl DerefMut for PooledBuffer<'_> {
    fn deref_mut(&mut self) -> &mut BytesMut {
        &mut self.buf
    }
}

impl Drop for PooledBuffer<'_> {
    fn drop(&mut self) {
        self.pool.release(std::mem::take(&mut self.buf));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn acquire_returns_empty_buffer_with_default_capacity() {
        let pool = BufferPool::new(4, 128, 1024);
        let buf = pool.acquire();
        assert!(buf.is_empty());
        assert!(buf.capacity() >= 128);
    }

    #[test]
    fn drop_returns_buffer_to_pool() {
        let pool = BufferPool::new(4, 128, 1024);
        {
            let mut buf = pool.acquire();
            buf.extend_from_slice(b"HTTP/1.1 200 OK\r\n");
            assert_eq!(pool.available(), 0);
        }
        assert_eq!(pool.available(), 1);

        let recycled = pool.acquire();
        assert!(recycled.is_empty(), "recycled buffer must start empty");
        assert_eq!(pool.available(), 0);
    }

    #[test]
    fn buffer_is_released_on_early_return() {
        fn fill_then_fail(pool: &BufferPool) -> Result<(), &'static str> {
            let mut buf = pool.acquire();
            buf.extend_from_slice(b"partial");
            Err("write failed")
        }

        let pool = BufferPool::new(4, 64, 1024);
        assert!(fill_then_fail(&pool).is_err());
        assert_eq!(pool.available(), 1);
        assert!(pool.acquire().is_empty());
    }

    #[test]
    fn full_pool_drops_excess_buffers() {
        let pool = BufferPool::new(2, 64, 1024);
        let a = pool.acquire();
        let b = pool.acquire();
        let c = pool.acquire();
        drop(a);
        drop(b);
        drop(c);
        assert_eq!(pool.available(), 2);
    }

    #[test]
    fn oversized_buffers_are_not_retained() {
        let pool = BufferPool::new(4, 64, 256);
        {
            let mut buf = pool.acquire();
            buf.extend_from_slice(&[b'x'; 4096]);
        }
        assert_eq!(pool.available(), 0);
    }

    #[test]
    fn concurrent_checkouts_never_see_foreign_bytes() {
        let pool = Arc::new(BufferPool::new(8, 64, 4096));
        let handles: Vec<_> = (0..16u8)
            .map(|worker| {
                let pool = Arc::clone(&pool);
                std::thread::spawn(move || {
                    for _ in 0..500 {
                        let mut buf = pool.acquire();
                        assert!(buf.is_empty(), "checkout leaked previous content");
                        buf.extend_from_slice(&[worker; 32]);
                        assert!(buf.iter().all(|&b| b == worker));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert!(pool.available() <= 8);
    }
}
