//! Header selection and scalar writes for the MessagePack wire format.
//!
//! Every function here writes into a caller-supplied [`Writer`] and picks the
//! narrowest form for the given value or length.

use packwire_buffers::{BufferError, Writer};

use crate::constants::*;

/// Truncates toward zero and wraps modulo 2^32. NaN and the infinities map
/// to zero.
fn to_uint32(num: f64) -> u32 {
    if !num.is_finite() {
        return 0;
    }
    num.trunc().rem_euclid(4_294_967_296.0) as u32
}

/// [`to_uint32`] reinterpreted as two's complement.
fn to_int32(num: f64) -> i32 {
    to_uint32(num) as i32
}

/// Writes a number in the narrowest form that round-trips it.
///
/// A value that survives the unsigned 32-bit reduction unchanged takes an
/// unsigned form, one that survives the signed reduction takes a signed
/// form, and everything else (fractions, values beyond 32 bits, NaN,
/// infinities) becomes a float64. `-0.0` reduces to `0` and compares equal,
/// so it is written as `0x00`.
pub fn write_number(writer: &mut Writer, num: f64) -> Result<(), BufferError> {
    let unsigned = to_uint32(num);
    if unsigned as f64 == num {
        return if unsigned < 0x80 {
            writer.u8(unsigned as u8)
        } else if unsigned < 0x100 {
            writer.u8u8(UINT8, unsigned as u8)
        } else if unsigned < 0x10000 {
            writer.u8u16(UINT16, unsigned as u16)
        } else {
            writer.u8u32(UINT32, unsigned)
        };
    }
    let signed = to_int32(num);
    if signed as f64 == num {
        return if signed >= -0x20 {
            // negative fixint: 0xe0..0xff
            writer.u8(signed as u8)
        } else if signed >= -0x80 {
            writer.u8u8(INT8, signed as i8 as u8)
        } else if signed >= -0x8000 {
            writer.u8u16(INT16, signed as i16 as u16)
        } else {
            writer.u8u32(INT32, signed as u32)
        };
    }
    writer.u8f64(FLOAT64, num)
}

pub fn write_null(writer: &mut Writer) -> Result<(), BufferError> {
    writer.u8(NIL)
}

pub fn write_undefined(writer: &mut Writer) -> Result<(), BufferError> {
    writer.buf(&UNDEFINED)
}

pub fn write_boolean(writer: &mut Writer, b: bool) -> Result<(), BufferError> {
    writer.u8(if b { TRUE } else { FALSE })
}

pub fn write_str_hdr(writer: &mut Writer, length: usize) -> Result<(), BufferError> {
    if length < 0x20 {
        writer.u8(FIXSTR | length as u8)
    } else if length <= 0xff {
        writer.u8u8(STR8, length as u8)
    } else if length <= 0xffff {
        writer.u8u16(STR16, length as u16)
    } else {
        writer.u8u32(STR32, length as u32)
    }
}

/// Writes a string header and its UTF-8 bytes.
///
/// Short ASCII strings are copied byte by byte; anything longer or non-ASCII
/// goes through a bulk UTF-8 copy.
pub fn write_str(writer: &mut Writer, s: &str) -> Result<(), BufferError> {
    let length = s.len();
    writer.ensure_capacity(5 + length)?;
    write_str_hdr(writer, length)?;
    if length < 64 && s.is_ascii() {
        writer.ascii(s)
    } else {
        writer.utf8(s).map(drop)
    }
}

pub fn write_bin_hdr(writer: &mut Writer, length: usize) -> Result<(), BufferError> {
    if length <= 0xff {
        writer.u8u8(BIN8, length as u8)
    } else if length <= 0xffff {
        writer.u8u16(BIN16, length as u16)
    } else {
        writer.u8u32(BIN32, length as u32)
    }
}

pub fn write_bin(writer: &mut Writer, buf: &[u8]) -> Result<(), BufferError> {
    writer.ensure_capacity(5 + buf.len())?;
    write_bin_hdr(writer, buf.len())?;
    writer.buf(buf)
}

pub fn write_arr_hdr(writer: &mut Writer, length: usize) -> Result<(), BufferError> {
    if length < 0x10 {
        writer.u8(FIXARRAY | length as u8)
    } else if length <= 0xffff {
        writer.u8u16(ARRAY16, length as u16)
    } else {
        writer.u8u32(ARRAY32, length as u32)
    }
}

/// Writes a map header. Callers must keep `length <= MAX_MAP_LENGTH`; the
/// format offers no wider map header here.
pub fn write_obj_hdr(writer: &mut Writer, length: usize) -> Result<(), BufferError> {
    debug_assert!(length <= MAX_MAP_LENGTH);
    if length < 0x10 {
        writer.u8(FIXMAP | length as u8)
    } else {
        writer.u8u16(MAP16, length as u16)
    }
}

/// Writes the extension header for a payload of `length` bytes, preferring
/// the fixext forms for lengths 1, 2, 4, 8 and 16.
pub fn write_ext_hdr(writer: &mut Writer, tag: u8, length: usize) -> Result<(), BufferError> {
    match length {
        1 => writer.u8u8(FIXEXT1, tag),
        2 => writer.u8u8(FIXEXT2, tag),
        4 => writer.u8u8(FIXEXT4, tag),
        8 => writer.u8u8(FIXEXT8, tag),
        16 => writer.u8u8(FIXEXT16, tag),
        _ => {
            if length <= 0xff {
                writer.u8u8(EXT8, length as u8)?;
            } else if length <= 0xffff {
                writer.u8u16(EXT16, length as u16)?;
            } else {
                writer.u8u32(EXT32, length as u32)?;
            }
            writer.u8(tag)
        }
    }
}

pub fn write_ext(writer: &mut Writer, tag: u8, data: &[u8]) -> Result<(), BufferError> {
    writer.ensure_capacity(6 + data.len())?;
    write_ext_hdr(writer, tag, data.len())?;
    writer.buf(data)
}
