//! Binary codec primitives.
//!
//! Big-endian raw scalars plus the packed sign-magnitude integer the
//! whole protocol is built on. The packed form spends 1 to 5 bytes per
//! integer: byte 0 carries six value bits, the sign in bit 6 and a
//! continuation flag in bit 7; bytes 1-3 carry seven value bits plus a
//! continuation flag; byte 4, when present, is raw.
//!
//! Strings are a packed length prefix followed by either raw UTF-8
//! bytes (packed mode) or 2-byte UTF-16 code units (unpacked mode).
//! Colors are always four raw RGBA bytes.

use vantage_ui::Color;

use crate::error::DecodeError;

/// Default cap on decoded string lengths.
pub const MAX_STRING_LEN: i32 = 0x7FFF;

/// Number of bytes the packed encoding of `value` occupies.
#[must_use]
pub const fn packed_len(value: i32) -> usize {
    let val = value.unsigned_abs();
    if val < 0x40 {
        1
    } else if val < 0x2000 {
        2
    } else if val < 0x0010_0000 {
        3
    } else if val < 0x0800_0000 {
        4
    } else {
        5
    }
}

/// Packet writer over a growable buffer.
///
/// Writes cannot fail; the buffer grows as needed and is handed to the
/// transport as a slice.
#[derive(Debug, Default)]
pub struct ByteWriter {
    buffer: Vec<u8>,
}

impl ByteWriter {
    /// Creates an empty writer.
    #[must_use]
    pub const fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Creates a writer with pre-reserved capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    /// Number of bytes written so far.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Whether nothing has been written.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// The written bytes.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    /// Consumes the writer, returning the buffer.
    #[inline]
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    /// Clears the buffer for reuse.
    #[inline]
    pub fn reset(&mut self) {
        self.buffer.clear();
    }

    /// Writes a single byte.
    #[inline]
    pub fn write_u8(&mut self, value: u8) {
        self.buffer.push(value);
    }

    /// Writes a bool as one byte.
    #[inline]
    pub fn write_bool(&mut self, value: bool) {
        self.buffer.push(u8::from(value));
    }

    /// Writes a u16 in big-endian format.
    #[inline]
    pub fn write_u16(&mut self, value: u16) {
        self.buffer.extend_from_slice(&value.to_be_bytes());
    }

    /// Writes an i32 in big-endian format, unpacked.
    #[inline]
    pub fn write_i32(&mut self, value: i32) {
        self.buffer.extend_from_slice(&value.to_be_bytes());
    }

    /// Writes a u32 in big-endian format, unpacked.
    #[inline]
    pub fn write_u32(&mut self, value: u32) {
        self.buffer.extend_from_slice(&value.to_be_bytes());
    }

    /// Writes an f32 in big-endian format.
    #[inline]
    pub fn write_f32(&mut self, value: f32) {
        self.buffer.extend_from_slice(&value.to_be_bytes());
    }

    /// Writes an integer in the packed sign-magnitude form.
    pub fn write_packed(&mut self, value: i32) {
        let sign: u8 = if value < 0 { 0x40 } else { 0x00 };
        let val = value.unsigned_abs();
        if val < 0x40 {
            self.buffer.push(val as u8 | sign);
        } else if val < 0x2000 {
            self.buffer.push((val & 0x3F) as u8 | 0x80 | sign);
            self.buffer.push(((val >> 6) & 0x7F) as u8);
        } else if val < 0x0010_0000 {
            self.buffer.push((val & 0x3F) as u8 | 0x80 | sign);
            self.buffer.push(((val >> 6) & 0x7F) as u8 | 0x80);
            self.buffer.push(((val >> 13) & 0x7F) as u8);
        } else if val < 0x0800_0000 {
            self.buffer.push((val & 0x3F) as u8 | 0x80 | sign);
            self.buffer.push(((val >> 6) & 0x7F) as u8 | 0x80);
            self.buffer.push(((val >> 13) & 0x7F) as u8 | 0x80);
            self.buffer.push(((val >> 20) & 0x7F) as u8);
        } else {
            self.buffer.push((val & 0x3F) as u8 | 0x80 | sign);
            self.buffer.push(((val >> 6) & 0x7F) as u8 | 0x80);
            self.buffer.push(((val >> 13) & 0x7F) as u8 | 0x80);
            self.buffer.push(((val >> 20) & 0x7F) as u8 | 0x80);
            self.buffer.push((val >> 27) as u8);
        }
    }

    /// Appends raw bytes verbatim.
    #[inline]
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Writes a string with a packed length prefix.
    ///
    /// Packed mode sends the raw UTF-8 bytes; unpacked mode sends each
    /// UTF-16 code unit as two bytes.
    pub fn write_string(&mut self, value: &str, packed: bool) {
        if packed {
            self.write_packed(value.len() as i32);
            self.buffer.extend_from_slice(value.as_bytes());
        } else {
            let units: Vec<u16> = value.encode_utf16().collect();
            self.write_packed(units.len() as i32);
            for unit in units {
                self.write_u16(unit);
            }
        }
    }

    /// Writes a color as four raw RGBA bytes.
    #[inline]
    pub fn write_color(&mut self, color: Color) {
        self.write_u32(color.to_rgba());
    }
}

/// Packet reader over a borrowed slice.
#[derive(Debug)]
pub struct ByteReader<'a> {
    buffer: &'a [u8],
    position: usize,
}

impl<'a> ByteReader<'a> {
    /// Creates a reader at the start of a buffer.
    #[must_use]
    pub const fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer,
            position: 0,
        }
    }

    /// Number of bytes left to read.
    #[inline]
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.position)
    }

    /// Whether the reader has consumed the whole buffer.
    #[inline]
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    fn take(&mut self, count: usize) -> Result<&'a [u8], DecodeError> {
        if self.remaining() < count {
            return Err(DecodeError::UnexpectedEof);
        }
        let slice = &self.buffer[self.position..self.position + count];
        self.position += count;
        Ok(slice)
    }

    /// Reads a single byte.
    ///
    /// # Errors
    ///
    /// [`DecodeError::UnexpectedEof`] if the buffer is exhausted.
    #[inline]
    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.take(1)?[0])
    }

    /// Reads `count` raw bytes.
    ///
    /// # Errors
    ///
    /// [`DecodeError::UnexpectedEof`] if fewer than `count` bytes remain.
    #[inline]
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8], DecodeError> {
        self.take(count)
    }

    /// Reads a bool byte; any non-zero value is true.
    ///
    /// # Errors
    ///
    /// [`DecodeError::UnexpectedEof`] if the buffer is exhausted.
    #[inline]
    pub fn read_bool(&mut self) -> Result<bool, DecodeError> {
        Ok(self.read_u8()? != 0)
    }

    /// Reads a big-endian u16.
    ///
    /// # Errors
    ///
    /// [`DecodeError::UnexpectedEof`] if fewer than 2 bytes remain.
    #[inline]
    pub fn read_u16(&mut self) -> Result<u16, DecodeError> {
        let bytes = self.take(2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    /// Reads a big-endian i32, unpacked.
    ///
    /// # Errors
    ///
    /// [`DecodeError::UnexpectedEof`] if fewer than 4 bytes remain.
    #[inline]
    pub fn read_i32(&mut self) -> Result<i32, DecodeError> {
        let bytes = self.take(4)?;
        Ok(i32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Reads a big-endian u32, unpacked.
    ///
    /// # Errors
    ///
    /// [`DecodeError::UnexpectedEof`] if fewer than 4 bytes remain.
    #[inline]
    pub fn read_u32(&mut self) -> Result<u32, DecodeError> {
        let bytes = self.take(4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Reads a big-endian f32.
    ///
    /// # Errors
    ///
    /// [`DecodeError::UnexpectedEof`] if fewer than 4 bytes remain.
    #[inline]
    pub fn read_f32(&mut self) -> Result<f32, DecodeError> {
        Ok(f32::from_bits(self.read_u32()?))
    }

    /// Reads a packed sign-magnitude integer.
    ///
    /// # Errors
    ///
    /// [`DecodeError::UnexpectedEof`] if a continuation byte is missing.
    pub fn read_packed(&mut self) -> Result<i32, DecodeError> {
        let first = self.read_u8()?;
        let sign = first & 0x40 != 0;
        let mut val = u32::from(first & 0x3F);
        if first & 0x80 != 0 {
            let byte = self.read_u8()?;
            val |= u32::from(byte & 0x7F) << 6;
            if byte & 0x80 != 0 {
                let byte = self.read_u8()?;
                val |= u32::from(byte & 0x7F) << 13;
                if byte & 0x80 != 0 {
                    let byte = self.read_u8()?;
                    val |= u32::from(byte & 0x7F) << 20;
                    if byte & 0x80 != 0 {
                        val |= u32::from(self.read_u8()?) << 27;
                    }
                }
            }
        }
        let magnitude = val as i32;
        Ok(if sign {
            magnitude.wrapping_neg()
        } else {
            magnitude
        })
    }

    /// Reads a length-prefixed string, rejecting prefixes outside
    /// `[0, max]`.
    ///
    /// # Errors
    ///
    /// [`DecodeError::NegativeLength`] or [`DecodeError::StringTooLong`]
    /// on a bad prefix, [`DecodeError::InvalidText`] on malformed text,
    /// [`DecodeError::UnexpectedEof`] on a short buffer.
    pub fn read_string(&mut self, max: i32, packed: bool) -> Result<String, DecodeError> {
        let len = self.read_packed()?;
        if len < 0 {
            return Err(DecodeError::NegativeLength(len));
        }
        if len > max {
            return Err(DecodeError::StringTooLong { len, max });
        }
        let len = len as usize;
        if packed {
            let bytes = self.take(len)?;
            String::from_utf8(bytes.to_vec()).map_err(|_| DecodeError::InvalidText)
        } else {
            let mut units = Vec::with_capacity(len);
            for _ in 0..len {
                units.push(self.read_u16()?);
            }
            String::from_utf16(&units).map_err(|_| DecodeError::InvalidText)
        }
    }

    /// Reads a four-byte RGBA color.
    ///
    /// # Errors
    ///
    /// [`DecodeError::UnexpectedEof`] if fewer than 4 bytes remain.
    #[inline]
    pub fn read_color(&mut self) -> Result<Color, DecodeError> {
        Ok(Color::from_rgba(self.read_u32()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};

    fn round_trip(value: i32) -> i32 {
        let mut writer = ByteWriter::new();
        writer.write_packed(value);
        assert_eq!(writer.len(), packed_len(value));
        let mut reader = ByteReader::new(writer.as_slice());
        let out = reader.read_packed().unwrap();
        assert!(reader.is_exhausted());
        out
    }

    #[test]
    fn test_packed_round_trip_boundaries() {
        for value in [
            0,
            1,
            -1,
            0x3F,
            0x40,
            -0x40,
            0x1FFF,
            0x2000,
            -0x2000,
            0x000F_FFFF,
            0x0010_0000,
            0x07FF_FFFF,
            -0x07FF_FFFF,
            0x0800_0000,
            -0x0800_0000,
        ] {
            assert_eq!(round_trip(value), value, "value {value:#x}");
        }
    }

    #[test]
    fn test_packed_round_trip_sampled() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(42);
        for _ in 0..10_000 {
            let value = rng.gen_range(-(1 << 27)..=(1 << 27));
            assert_eq!(round_trip(value), value);
        }
    }

    #[test]
    fn test_packed_len_matches_magnitude() {
        assert_eq!(packed_len(0), 1);
        assert_eq!(packed_len(-0x3F), 1);
        assert_eq!(packed_len(0x40), 2);
        assert_eq!(packed_len(0x1FFF), 2);
        assert_eq!(packed_len(0x2000), 3);
        assert_eq!(packed_len(0x0010_0000), 4);
        assert_eq!(packed_len(0x0800_0000), 5);
    }

    #[test]
    fn test_string_packed_and_unpacked() {
        let mut writer = ByteWriter::new();
        writer.write_string("scoreboard", true);
        writer.write_string("Health: 20\u{2764}", false);
        let mut reader = ByteReader::new(writer.as_slice());
        assert_eq!(reader.read_string(MAX_STRING_LEN, true).unwrap(), "scoreboard");
        assert_eq!(
            reader.read_string(MAX_STRING_LEN, false).unwrap(),
            "Health: 20\u{2764}"
        );
    }

    #[test]
    fn test_string_length_is_enforced() {
        let mut writer = ByteWriter::new();
        writer.write_string("toolong", true);
        let mut reader = ByteReader::new(writer.as_slice());
        assert_eq!(
            reader.read_string(3, true),
            Err(DecodeError::StringTooLong { len: 7, max: 3 })
        );
    }

    #[test]
    fn test_negative_string_length_rejected() {
        let mut writer = ByteWriter::new();
        writer.write_packed(-5);
        let mut reader = ByteReader::new(writer.as_slice());
        assert_eq!(
            reader.read_string(MAX_STRING_LEN, true),
            Err(DecodeError::NegativeLength(-5))
        );
    }

    #[test]
    fn test_truncated_input_is_eof() {
        let mut writer = ByteWriter::new();
        writer.write_i32(1234);
        let mut reader = ByteReader::new(&writer.as_slice()[..2]);
        assert_eq!(reader.read_i32(), Err(DecodeError::UnexpectedEof));
    }

    #[test]
    fn test_color_is_four_raw_bytes() {
        let mut writer = ByteWriter::new();
        writer.write_color(Color::new(0x12, 0x34, 0x56, 0x78));
        assert_eq!(writer.as_slice(), &[0x12, 0x34, 0x56, 0x78]);
        let mut reader = ByteReader::new(writer.as_slice());
        assert_eq!(reader.read_color().unwrap(), Color::new(0x12, 0x34, 0x56, 0x78));
    }
}
