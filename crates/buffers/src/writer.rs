//! Binary buffer writer with doubling growth and a hard size limit.

use crate::BufferError;

/// Absolute upper bound on the size of a writer's buffer.
pub const MAX_BUFFER_SIZE: usize = 0x7fff_ffff;

/// Default allocation size of a standalone writer.
const DEFAULT_ALLOC_SIZE: usize = 64 * 1024;

/// A binary buffer writer that grows automatically as needed.
///
/// Invariant: `x0 <= x <= uint8.len()`. Every typed write goes through
/// [`Writer::ensure_capacity`] first, so indexing into `uint8` after a
/// successful capacity check never goes out of bounds.
///
/// # Example
///
/// ```
/// use packwire_buffers::Writer;
///
/// let mut writer = Writer::new();
/// writer.u8(0x01).unwrap();
/// writer.u16(0x0203).unwrap();
/// let data = writer.flush();
/// assert_eq!(data, [0x01, 0x02, 0x03]);
/// ```
#[derive(Debug)]
pub struct Writer {
    /// The underlying byte buffer.
    pub uint8: Vec<u8>,
    /// Start of the region not yet flushed.
    pub x0: usize,
    /// Current cursor position.
    pub x: usize,
    max_size: usize,
}

/// Saved cursor state, see [`Writer::checkpoint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint {
    x0: usize,
    x: usize,
}

impl Default for Writer {
    fn default() -> Self {
        Self::new()
    }
}

impl Writer {
    /// Creates a new writer with default allocation size (64KB).
    pub fn new() -> Self {
        Self::with_alloc_size(DEFAULT_ALLOC_SIZE)
    }

    /// Creates a new writer with custom allocation size.
    pub fn with_alloc_size(alloc_size: usize) -> Self {
        Self::from_buffer(vec![0u8; alloc_size])
    }

    /// Wraps an existing buffer. The cursor starts at zero; previous contents
    /// are treated as scratch space.
    pub fn from_buffer(buffer: Vec<u8>) -> Self {
        Self {
            uint8: buffer,
            x0: 0,
            x: 0,
            max_size: MAX_BUFFER_SIZE,
        }
    }

    /// Lowers the absolute size limit (clamped to [`MAX_BUFFER_SIZE`]).
    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size.min(MAX_BUFFER_SIZE);
        self
    }

    /// The absolute size limit of this writer.
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Gives the buffer back together with the cursor position.
    pub fn into_buffer(self) -> (Vec<u8>, usize) {
        (self.uint8, self.x)
    }

    /// Ensures at least `extra` bytes can be written at the cursor.
    ///
    /// Grows to `max(len * 2, x + extra)`, capped at the size limit. Only the
    /// written prefix `[0, x)` is carried over. The limit also applies to a
    /// buffer that was handed in larger than it.
    pub fn ensure_capacity(&mut self, extra: usize) -> Result<(), BufferError> {
        let required = match self.x.checked_add(extra) {
            Some(required) if required <= self.max_size => required,
            _ => {
                return Err(BufferError::CapacityOverflow {
                    requested: self.x.saturating_add(extra),
                    max: self.max_size,
                })
            }
        };
        if required <= self.uint8.len() {
            return Ok(());
        }
        let new_size = self
            .uint8
            .len()
            .saturating_mul(2)
            .max(required)
            .min(self.max_size);
        self.grow(new_size);
        Ok(())
    }

    fn grow(&mut self, new_size: usize) {
        let x = self.x;
        let mut new_buf = vec![0u8; new_size];
        new_buf[..x].copy_from_slice(&self.uint8[..x]);
        self.uint8 = new_buf;
    }

    /// Rewinds the cursor and flush position to the start of the buffer.
    pub fn reset(&mut self) {
        self.x0 = 0;
        self.x = 0;
    }

    /// Saves the cursor state.
    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            x0: self.x0,
            x: self.x,
        }
    }

    /// Puts the cursor back where [`Writer::checkpoint`] found it.
    pub fn restore(&mut self, checkpoint: Checkpoint) {
        debug_assert!(checkpoint.x <= self.uint8.len());
        self.x0 = checkpoint.x0;
        self.x = checkpoint.x;
    }

    /// Bytes written since the last flush.
    pub fn written(&self) -> &[u8] {
        &self.uint8[self.x0..self.x]
    }

    /// Returns a copy of the written data and advances the flush position.
    pub fn flush(&mut self) -> Vec<u8> {
        let result = self.uint8[self.x0..self.x].to_vec();
        self.x0 = self.x;
        result
    }

    /// Appends the written data to `out` and advances the flush position.
    pub fn flush_into(&mut self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.uint8[self.x0..self.x]);
        self.x0 = self.x;
    }

    /// Writes an unsigned 8-bit integer.
    #[inline]
    pub fn u8(&mut self, val: u8) -> Result<(), BufferError> {
        self.ensure_capacity(1)?;
        self.uint8[self.x] = val;
        self.x += 1;
        Ok(())
    }

    /// Writes a signed 8-bit integer.
    #[inline]
    pub fn i8(&mut self, val: i8) -> Result<(), BufferError> {
        self.u8(val as u8)
    }

    /// Writes an unsigned 16-bit integer (big-endian).
    #[inline]
    pub fn u16(&mut self, val: u16) -> Result<(), BufferError> {
        self.ensure_capacity(2)?;
        self.uint8[self.x..self.x + 2].copy_from_slice(&val.to_be_bytes());
        self.x += 2;
        Ok(())
    }

    /// Writes a signed 16-bit integer (big-endian).
    #[inline]
    pub fn i16(&mut self, val: i16) -> Result<(), BufferError> {
        self.u16(val as u16)
    }

    /// Writes an unsigned 32-bit integer (big-endian).
    #[inline]
    pub fn u32(&mut self, val: u32) -> Result<(), BufferError> {
        self.ensure_capacity(4)?;
        self.uint8[self.x..self.x + 4].copy_from_slice(&val.to_be_bytes());
        self.x += 4;
        Ok(())
    }

    /// Writes a signed 32-bit integer (big-endian).
    #[inline]
    pub fn i32(&mut self, val: i32) -> Result<(), BufferError> {
        self.u32(val as u32)
    }

    /// Writes a 64-bit floating point number (big-endian).
    #[inline]
    pub fn f64(&mut self, val: f64) -> Result<(), BufferError> {
        self.ensure_capacity(8)?;
        self.uint8[self.x..self.x + 8].copy_from_slice(&val.to_be_bytes());
        self.x += 8;
        Ok(())
    }

    /// Writes a u8 followed by a u8.
    pub fn u8u8(&mut self, a: u8, b: u8) -> Result<(), BufferError> {
        self.ensure_capacity(2)?;
        self.uint8[self.x] = a;
        self.uint8[self.x + 1] = b;
        self.x += 2;
        Ok(())
    }

    /// Writes a u8 followed by a u16 (big-endian).
    pub fn u8u16(&mut self, u8_val: u8, u16_val: u16) -> Result<(), BufferError> {
        self.ensure_capacity(3)?;
        self.uint8[self.x] = u8_val;
        self.uint8[self.x + 1..self.x + 3].copy_from_slice(&u16_val.to_be_bytes());
        self.x += 3;
        Ok(())
    }

    /// Writes a u8 followed by a u32 (big-endian).
    pub fn u8u32(&mut self, u8_val: u8, u32_val: u32) -> Result<(), BufferError> {
        self.ensure_capacity(5)?;
        self.uint8[self.x] = u8_val;
        self.uint8[self.x + 1..self.x + 5].copy_from_slice(&u32_val.to_be_bytes());
        self.x += 5;
        Ok(())
    }

    /// Writes a u8 followed by a f64 (big-endian).
    pub fn u8f64(&mut self, u8_val: u8, f64_val: f64) -> Result<(), BufferError> {
        self.ensure_capacity(9)?;
        self.uint8[self.x] = u8_val;
        self.uint8[self.x + 1..self.x + 9].copy_from_slice(&f64_val.to_be_bytes());
        self.x += 9;
        Ok(())
    }

    /// Writes a byte slice.
    pub fn buf(&mut self, buf: &[u8]) -> Result<(), BufferError> {
        let length = buf.len();
        self.ensure_capacity(length)?;
        self.uint8[self.x..self.x + length].copy_from_slice(buf);
        self.x += length;
        Ok(())
    }

    /// Writes a UTF-8 string. Returns the number of bytes written.
    pub fn utf8(&mut self, s: &str) -> Result<usize, BufferError> {
        self.buf(s.as_bytes())?;
        Ok(s.len())
    }

    /// Writes a string known to be ASCII, one byte per character.
    pub fn ascii(&mut self, s: &str) -> Result<(), BufferError> {
        debug_assert!(s.is_ascii());
        self.ensure_capacity(s.len())?;
        let mut x = self.x;
        for byte in s.bytes() {
            self.uint8[x] = byte;
            x += 1;
        }
        self.x = x;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_u8() {
        let mut writer = Writer::new();
        writer.u8(0x01).unwrap();
        writer.u8(0x02).unwrap();
        assert_eq!(writer.flush(), [0x01, 0x02]);
    }

    #[test]
    fn test_u16() {
        let mut writer = Writer::new();
        writer.u16(0x0102).unwrap();
        assert_eq!(writer.flush(), [0x01, 0x02]);
    }

    #[test]
    fn test_u32() {
        let mut writer = Writer::new();
        writer.u32(0x01020304).unwrap();
        assert_eq!(writer.flush(), [0x01, 0x02, 0x03, 0x04]);
    }

    #[test]
    fn test_i8_negative() {
        let mut writer = Writer::new();
        writer.i8(-1i8).unwrap();
        assert_eq!(writer.flush(), [0xff]);
    }

    #[test]
    fn test_i16_negative() {
        let mut writer = Writer::new();
        writer.i16(-1000i16).unwrap();
        let data = writer.flush();
        assert_eq!(i16::from_be_bytes([data[0], data[1]]), -1000i16);
    }

    #[test]
    fn test_i32_negative() {
        let mut writer = Writer::new();
        writer.i32(-100_000).unwrap();
        writer.i32(i32::MIN).unwrap();
        assert_eq!(
            writer.flush(),
            [0xff, 0xfe, 0x79, 0x60, 0x80, 0x00, 0x00, 0x00]
        );
    }

    #[test]
    fn test_f64() {
        let mut writer = Writer::new();
        writer.f64(-2.25).unwrap();
        assert_eq!(
            writer.flush(),
            [0xc0, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]
        );
    }

    #[test]
    fn test_u8f64() {
        let mut writer = Writer::new();
        writer.u8f64(0xcb, 1.5).unwrap();
        let data = writer.flush();
        assert_eq!(data[0], 0xcb);
        assert_eq!(f64::from_be_bytes(data[1..].try_into().unwrap()), 1.5);
    }

    #[test]
    fn test_utf8_and_ascii() {
        let mut writer = Writer::new();
        assert_eq!(writer.utf8("café").unwrap(), 5);
        writer.ascii("ok").unwrap();
        assert_eq!(writer.flush(), "caféok".as_bytes());
    }

    #[test]
    fn test_flush_multiple() {
        let mut writer = Writer::new();
        writer.u8(0x01).unwrap();
        assert_eq!(writer.flush(), [0x01]);
        writer.u8(0x02).unwrap();
        assert_eq!(writer.flush(), [0x02]);
    }

    #[test]
    fn growth_doubles_and_keeps_prefix() {
        let mut writer = Writer::with_alloc_size(4);
        writer.u32(0xdeadbeef).unwrap();
        writer.u8(0x01).unwrap();
        assert_eq!(writer.uint8.len(), 8);
        assert_eq!(writer.written(), [0xde, 0xad, 0xbe, 0xef, 0x01]);
    }

    #[test]
    fn growth_jumps_to_required_size() {
        let mut writer = Writer::with_alloc_size(4);
        writer.u8(0xaa).unwrap();
        writer.buf(&[0u8; 100]).unwrap();
        assert_eq!(writer.uint8.len(), 101);
        assert_eq!(writer.x, 101);
    }

    #[test]
    fn growth_from_empty_buffer() {
        let mut writer = Writer::from_buffer(Vec::new());
        writer.u16(0x0102).unwrap();
        assert_eq!(writer.flush(), [0x01, 0x02]);
    }

    #[test]
    fn growth_is_capped_at_max_size() {
        let mut writer = Writer::with_alloc_size(8).with_max_size(12);
        writer.buf(&[1u8; 10]).unwrap();
        assert_eq!(writer.uint8.len(), 12);
        writer.u16(0x0203).unwrap();
        assert_eq!(
            writer.u8(0x04),
            Err(BufferError::CapacityOverflow {
                requested: 13,
                max: 12
            })
        );
        assert_eq!(writer.x, 12);
    }

    #[test]
    fn max_size_applies_to_oversized_buffer() {
        let mut writer = Writer::with_alloc_size(128).with_max_size(8);
        assert_eq!(
            writer.buf(&[0u8; 9]),
            Err(BufferError::CapacityOverflow {
                requested: 9,
                max: 8
            })
        );
        writer.buf(&[0u8; 8]).unwrap();
        assert_eq!(
            writer.u8(0x01),
            Err(BufferError::CapacityOverflow {
                requested: 9,
                max: 8
            })
        );
        assert_eq!(writer.uint8.len(), 128);
        assert_eq!(writer.x, 8);
    }

    #[test]
    fn max_size_is_clamped() {
        let writer = Writer::new().with_max_size(usize::MAX);
        assert_eq!(writer.max_size(), MAX_BUFFER_SIZE);
    }

    #[test]
    fn checkpoint_restore() {
        let mut writer = Writer::new();
        writer.u8(0x01).unwrap();
        let checkpoint = writer.checkpoint();
        writer.u32(0).unwrap();
        writer.restore(checkpoint);
        writer.u8(0x02).unwrap();
        assert_eq!(writer.flush(), [0x01, 0x02]);
    }

    #[test]
    fn reset_rewinds_to_start() {
        let mut writer = Writer::new();
        writer.u16(0xffff).unwrap();
        writer.flush();
        writer.reset();
        assert_eq!((writer.x0, writer.x), (0, 0));
        writer.u8(0x01).unwrap();
        assert_eq!(writer.flush(), [0x01]);
    }

    #[test]
    fn into_buffer_reports_position() {
        let mut writer = Writer::with_alloc_size(16);
        writer.u32(1).unwrap();
        let (buffer, position) = writer.into_buffer();
        assert_eq!(buffer.len(), 16);
        assert_eq!(position, 4);
    }

    proptest::proptest! {
        #[test]
        fn growth_preserves_written_prefix(
            chunks in proptest::collection::vec(proptest::collection::vec(proptest::num::u8::ANY, 0..300), 0..20),
            alloc_size in 0usize..64,
        ) {
            let mut writer = Writer::with_alloc_size(alloc_size);
            let mut expected = Vec::new();
            for chunk in &chunks {
                writer.buf(chunk).unwrap();
                expected.extend_from_slice(chunk);
                proptest::prop_assert!(writer.x0 <= writer.x && writer.x <= writer.uint8.len());
            }
            proptest::prop_assert_eq!(writer.flush(), expected);
        }
    }
}
