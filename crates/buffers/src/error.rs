//! Buffer error type.

use thiserror::Error;

/// Error type for [`Writer`](crate::Writer) growth.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BufferError {
    /// A write needed more room than the writer's absolute size limit.
    #[error("buffer capacity overflow: {requested} bytes requested, maximum is {max}")]
    CapacityOverflow { requested: usize, max: usize },
}
