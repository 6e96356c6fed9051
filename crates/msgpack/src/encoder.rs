//! `Encoder` — MessagePack encoder over pooled buffers with extension
//! dispatch.

use std::cell::RefCell;
use std::rc::Rc;

use packwire_buffers::{BufferPool, Writer};

use crate::constants::MAX_MAP_LENGTH;
use crate::registry::ExtensionEntry;
use crate::wire::*;
use crate::{EncodeError, ExtensionRegistry, PackValue, BIGINT_TAG};

/// MessagePack encoder.
///
/// Each [`Encoder::encode`] call leases a buffer from the pool, writes the
/// value, copies the written bytes into a fresh `Vec<u8>` and hands the
/// buffer back. The encoder holds no per-call state, so extension callbacks
/// may call [`Encoder::encode`] on the same encoder while an outer call is in
/// progress.
///
/// Encoders and their pools are single-threaded (`!Send`).
///
/// # Example
///
/// ```
/// use packwire_msgpack::{Encoder, ExtensionRegistry, PackValue};
///
/// let encoder = Encoder::new(ExtensionRegistry::new());
/// let bytes = encoder.encode(&PackValue::from(vec![PackValue::from(1), PackValue::Null])).unwrap();
/// assert_eq!(bytes, [0x92, 0x01, 0xc0]);
/// ```
#[derive(Debug)]
pub struct Encoder {
    registry: Rc<ExtensionRegistry>,
    pool: Rc<RefCell<BufferPool>>,
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new(ExtensionRegistry::new())
    }
}

impl Encoder {
    /// Creates an encoder with its own buffer pool.
    pub fn new(registry: impl Into<Rc<ExtensionRegistry>>) -> Self {
        Self::with_pool(registry, Rc::new(RefCell::new(BufferPool::new())))
    }

    /// Creates an encoder drawing buffers from `pool`, which may be shared
    /// with other encoders on the same thread.
    pub fn with_pool(
        registry: impl Into<Rc<ExtensionRegistry>>,
        pool: Rc<RefCell<BufferPool>>,
    ) -> Self {
        Self {
            registry: registry.into(),
            pool,
        }
    }

    /// Creates an encoder on the current thread's default pool.
    pub fn with_shared_pool(registry: impl Into<Rc<ExtensionRegistry>>) -> Self {
        Self::with_pool(registry, BufferPool::shared())
    }

    pub fn registry(&self) -> &ExtensionRegistry {
        &self.registry
    }

    pub fn pool(&self) -> &Rc<RefCell<BufferPool>> {
        &self.pool
    }

    /// Encodes `value` into a newly allocated byte vector.
    ///
    /// All-or-nothing: on error no bytes are returned, and the leased
    /// buffer still goes back to the pool.
    pub fn encode(&self, value: &PackValue) -> Result<Vec<u8>, EncodeError> {
        let mut writer = BufferPool::lease(&self.pool);
        writer.reset();
        self.write_any(&mut writer, value)?;
        Ok(writer.flush())
    }

    /// Encodes `value` and appends the bytes to `out`. `out` is left
    /// untouched on error.
    pub fn encode_into(&self, value: &PackValue, out: &mut Vec<u8>) -> Result<(), EncodeError> {
        let mut writer = BufferPool::lease(&self.pool);
        writer.reset();
        self.write_any(&mut writer, value)?;
        writer.flush_into(out);
        Ok(())
    }

    /// Writes `value` at the writer's cursor.
    pub fn write_any(&self, writer: &mut Writer, value: &PackValue) -> Result<(), EncodeError> {
        match value {
            PackValue::Undefined => write_undefined(writer)?,
            PackValue::Bool(b) => write_boolean(writer, *b)?,
            PackValue::Number(num) => write_number(writer, *num)?,
            PackValue::Str(s) => write_str(writer, s)?,
            PackValue::BigInt(_) => self.write_bigint(writer, value)?,
            PackValue::Null => write_null(writer)?,
            PackValue::Bytes(buf) => write_bin(writer, buf)?,
            PackValue::Array(arr) => self.write_arr(writer, arr)?,
            PackValue::Object(obj) => self.write_obj(writer, obj)?,
            PackValue::Extension(ext) => write_ext(writer, ext.tag(), ext.data())?,
            PackValue::Custom(_) => self.write_custom(writer, value)?,
        }
        Ok(())
    }

    pub fn write_arr(&self, writer: &mut Writer, arr: &[PackValue]) -> Result<(), EncodeError> {
        write_arr_hdr(writer, arr.len())?;
        for item in arr {
            self.write_any(writer, item)?;
        }
        Ok(())
    }

    /// Writes a map with string keys in slice order. Fails with
    /// `MapTooLarge` beyond 65535 keys.
    pub fn write_obj(
        &self,
        writer: &mut Writer,
        obj: &[(String, PackValue)],
    ) -> Result<(), EncodeError> {
        if obj.len() > MAX_MAP_LENGTH {
            return Err(EncodeError::MapTooLarge { len: obj.len() });
        }
        write_obj_hdr(writer, obj.len())?;
        for (key, val) in obj {
            write_str(writer, key)?;
            self.write_any(writer, val)?;
        }
        Ok(())
    }

    fn write_bigint(&self, writer: &mut Writer, value: &PackValue) -> Result<(), EncodeError> {
        let entry = self
            .registry
            .get(BIGINT_TAG)
            .ok_or(EncodeError::MissingExtension { tag: BIGINT_TAG })?;
        self.write_extension(writer, entry, value)
    }

    fn write_custom(&self, writer: &mut Writer, value: &PackValue) -> Result<(), EncodeError> {
        match self.registry.find(value) {
            Some(entry) => self.write_extension(writer, entry, value),
            None => Err(EncodeError::UnsupportedType {
                type_name: value.type_name().to_owned(),
            }),
        }
    }

    /// Runs the entry's callback with the cursor saved, then writes the
    /// payload behind an extension header.
    fn write_extension(
        &self,
        writer: &mut Writer,
        entry: &ExtensionEntry,
        value: &PackValue,
    ) -> Result<(), EncodeError> {
        let checkpoint = writer.checkpoint();
        let payload = entry.encode(value, self);
        writer.restore(checkpoint);
        let payload = payload.map_err(EncodeError::Extension)?;
        write_ext(writer, entry.tag(), &payload)?;
        Ok(())
    }
}
