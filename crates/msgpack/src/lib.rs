//! MessagePack encoder with pooled buffers and pluggable extension types.
//!
//! [`Encoder::encode`] turns a [`PackValue`] into a self-describing
//! MessagePack byte vector. Values the encoder does not know natively are
//! handed to an [`ExtensionRegistry`] of `(tag, predicate, encoder)` entries
//! and written as extension types.

pub mod constants;
mod encoder;
mod error;
mod registry;
mod util;
mod value;
pub mod wire;

pub use encoder::Encoder;
pub use error::{BoxError, EncodeError, RegistryError};
pub use registry::{ExtensionEntry, ExtensionRegistry, BIGINT_TAG, MAX_EXTENSION_TAG};
pub use util::encode;
pub use value::{CustomValue, ExtensionValue, PackValue};

pub use packwire_buffers::{BufferPool, PoolConfig};
