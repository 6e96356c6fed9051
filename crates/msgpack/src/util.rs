//! Convenience helpers.

use crate::{EncodeError, Encoder, ExtensionRegistry, PackValue};

/// Encodes a value with no extensions registered, on the current thread's
/// default pool.
pub fn encode(value: &PackValue) -> Result<Vec<u8>, EncodeError> {
    Encoder::with_shared_pool(ExtensionRegistry::new()).encode(value)
}
