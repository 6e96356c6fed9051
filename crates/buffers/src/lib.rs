//! Binary buffer primitives shared by packwire encoders.
//!
//! - [`Writer`]: a growable cursor over a byte buffer with big-endian
//!   fixed-width writes.
//! - [`BufferPool`]: a bounded free list of byte buffers reused across encode
//!   calls, leased to a [`Writer`] through [`Lease`].

mod error;
mod pool;
mod writer;

pub use error::BufferError;
pub use pool::{BufferPool, Lease, PoolConfig, PooledBuffer};
pub use writer::{Checkpoint, Writer, MAX_BUFFER_SIZE};
