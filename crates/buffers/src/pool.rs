//! Bounded free list of reusable byte buffers.
//!
//! A pool is plain single-threaded state: share it as
//! `Rc<RefCell<BufferPool>>`, which keeps it off other threads at compile
//! time. Callers that drive one pool from several threads must wrap their own
//! synchronization around it.

use std::cell::RefCell;
use std::ops::{Deref, DerefMut};
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::{Writer, MAX_BUFFER_SIZE};

/// Size limits for a [`BufferPool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Size of a freshly allocated buffer.
    pub initial_size: usize,
    /// Buffers larger than this are dropped instead of pooled.
    pub max_pooled_size: usize,
    /// Maximum number of idle buffers kept.
    pub max_pool_size: usize,
    /// Absolute size limit for writers leased from the pool.
    pub max_buffer_size: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            initial_size: 8 * 1024,
            max_pooled_size: 1024 * 1024,
            max_pool_size: 16,
            max_buffer_size: MAX_BUFFER_SIZE,
        }
    }
}

/// An idle buffer and the cursor position it was released at.
#[derive(Debug)]
pub struct PooledBuffer {
    pub data: Vec<u8>,
    pub position: usize,
}

#[derive(Debug, Default)]
pub struct BufferPool {
    free: Vec<PooledBuffer>,
    config: PoolConfig,
}

thread_local! {
    static SHARED: Rc<RefCell<BufferPool>> = Rc::new(RefCell::new(BufferPool::new()));
}

impl BufferPool {
    pub fn new() -> Self {
        Self::with_config(PoolConfig::default())
    }

    pub fn with_config(config: PoolConfig) -> Self {
        Self {
            free: Vec::new(),
            config,
        }
    }

    /// Default pool of the current thread, for callers that opt into sharing
    /// one pool between encoders.
    pub fn shared() -> Rc<RefCell<BufferPool>> {
        SHARED.with(Rc::clone)
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Number of idle buffers.
    pub fn len(&self) -> usize {
        self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.free.is_empty()
    }

    /// Drops every idle buffer.
    pub fn clear(&mut self) {
        self.free.clear();
    }

    /// Takes an idle buffer, or allocates `initial_size` bytes when none is
    /// left. The returned `position` is informational only; writers always
    /// start at offset zero.
    pub fn acquire(&mut self) -> PooledBuffer {
        match self.free.pop() {
            Some(buffer) => buffer,
            None => {
                tracing::trace!(size = self.config.initial_size, "allocating pool buffer");
                PooledBuffer {
                    data: vec![0u8; self.config.initial_size],
                    position: 0,
                }
            }
        }
    }

    /// Returns a buffer to the free list. Returns `false` when the buffer was
    /// dropped instead, either because it outgrew `max_pooled_size` or
    /// because the pool is full.
    pub fn release(&mut self, data: Vec<u8>, position: usize) -> bool {
        if data.len() > self.config.max_pooled_size {
            tracing::trace!(size = data.len(), "dropping oversized buffer");
            return false;
        }
        if self.free.len() >= self.config.max_pool_size {
            tracing::trace!(idle = self.free.len(), "pool full, dropping buffer");
            return false;
        }
        self.free.push(PooledBuffer { data, position });
        true
    }

    /// Leases a writer backed by a pooled buffer. The buffer goes back to
    /// `pool` when the lease is dropped, whether or not the write succeeded.
    ///
    /// # Panics
    ///
    /// Panics if `pool` is already borrowed. Leases themselves only borrow
    /// the pool inside this call and on drop, so any number of leases can be
    /// alive at once.
    pub fn lease(pool: &RefCell<BufferPool>) -> Lease<'_> {
        let (buffer, max_size) = {
            let mut pool = pool.borrow_mut();
            (pool.acquire(), pool.config.max_buffer_size)
        };
        Lease {
            pool,
            writer: Writer::from_buffer(buffer.data).with_max_size(max_size),
        }
    }
}

/// A [`Writer`] on loan from a [`BufferPool`].
#[derive(Debug)]
pub struct Lease<'a> {
    pool: &'a RefCell<BufferPool>,
    writer: Writer,
}

impl Deref for Lease<'_> {
    type Target = Writer;

    fn deref(&self) -> &Writer {
        &self.writer
    }
}

impl DerefMut for Lease<'_> {
    fn deref_mut(&mut self) -> &mut Writer {
        &mut self.writer
    }
}

impl Drop for Lease<'_> {
    fn drop(&mut self) {
        let buffer = std::mem::take(&mut self.writer.uint8);
        let position = self.writer.x;
        // Drop may run while unwinding out of a pool borrow; panicking here
        // would abort, so the buffer is dropped instead.
        if let Ok(mut pool) = self.pool.try_borrow_mut() {
            pool.release(buffer, position);
        }
    }
}
