//! MessagePack encoder error types.

use packwire_buffers::BufferError;
use thiserror::Error;

/// Boxed error returned by extension encode callbacks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error type for [`Encoder::encode`](crate::Encoder::encode).
#[derive(Debug, Error)]
pub enum EncodeError {
    /// No built-in kind and no registered extension matched the value.
    #[error("unsupported type: {type_name}")]
    UnsupportedType { type_name: String },
    /// A bigint was encoded but its reserved extension tag is not registered.
    #[error("no extension registered for reserved tag {tag}")]
    MissingExtension { tag: u8 },
    /// A map had more keys than a map16 header can describe.
    #[error("map with {len} keys exceeds the map16 limit of 65535")]
    MapTooLarge { len: usize },
    /// An extension encode callback failed; its error is passed through
    /// untouched and can be recovered with `downcast_ref`.
    #[error(transparent)]
    Extension(BoxError),
    #[error(transparent)]
    Buffer(#[from] BufferError),
}

/// Error type for extension tag validation.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    #[error("extension tag {0} is outside 0..=127")]
    InvalidTag(u8),
    #[error("extension tag {0} is already registered")]
    DuplicateTag(u8),
}
