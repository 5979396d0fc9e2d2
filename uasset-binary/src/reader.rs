//! Binary data reader for package files

use crate::error::{BinaryError, Result};
use crate::package::names::NameReference;
use byteorder::{BigEndian, LittleEndian, ReadBytesExt};
use std::io::{Cursor, Read, Seek, SeekFrom};
use uasset_core::Guid;

/// Byte order for reading binary data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ByteOrder {
    /// Big endian (network byte order)
    Big,
    /// Little endian (most common on x86/x64)
    #[default]
    Little,
}

impl ByteOrder {
    /// The other byte order
    pub fn swapped(self) -> Self {
        match self {
            ByteOrder::Big => ByteOrder::Little,
            ByteOrder::Little => ByteOrder::Big,
        }
    }
}

/// Binary reader over a borrowed byte slice
///
/// A reader never looks outside its slice. Nested decodes get their own
/// reader over a bounded range (see [`BinaryReader::take_sub_reader`]), so a
/// runaway nested read fails inside that range instead of consuming sibling
/// data.
pub struct BinaryReader<'a> {
    cursor: Cursor<&'a [u8]>,
    byte_order: ByteOrder,
}

impl<'a> BinaryReader<'a> {
    /// Create a new binary reader from byte slice
    pub fn new(data: &'a [u8], byte_order: ByteOrder) -> Self {
        Self {
            cursor: Cursor::new(data),
            byte_order,
        }
    }

    /// Get current position in the stream
    pub fn position(&self) -> u64 {
        self.cursor.position()
    }

    /// Set position in the stream
    pub fn set_position(&mut self, pos: u64) -> Result<()> {
        if pos > self.len() as u64 {
            return Err(BinaryError::not_enough_data(pos as usize, self.len()));
        }
        self.cursor.set_position(pos);
        Ok(())
    }

    /// Seek to a position relative to the current position
    pub fn seek(&mut self, offset: i64) -> Result<u64> {
        Ok(self.cursor.seek(SeekFrom::Current(offset))?)
    }

    /// Advance by `count` bytes
    pub fn skip(&mut self, count: usize) -> Result<()> {
        if !self.has_bytes(count) {
            return Err(BinaryError::not_enough_data(count, self.remaining()));
        }
        self.cursor.set_position(self.position() + count as u64);
        Ok(())
    }

    /// Get the total length of the data
    pub fn len(&self) -> usize {
        self.cursor.get_ref().len()
    }

    /// Check if the reader is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get remaining bytes from current position
    pub fn remaining(&self) -> usize {
        self.len().saturating_sub(self.position() as usize)
    }

    /// Check if we have at least `count` bytes remaining
    pub fn has_bytes(&self, count: usize) -> bool {
        self.remaining() >= count
    }

    /// Read a single byte
    pub fn read_u8(&mut self) -> Result<u8> {
        if !self.has_bytes(1) {
            return Err(BinaryError::not_enough_data(1, self.remaining()));
        }
        Ok(self.cursor.read_u8()?)
    }

    /// Read a boolean stored as one byte
    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0)
    }

    /// Read a boolean stored as a 32-bit integer
    pub fn read_bool32(&mut self) -> Result<bool> {
        Ok(self.read_i32()? != 0)
    }

    /// Read a signed 8-bit integer
    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.read_u8()? as i8)
    }

    /// Read an unsigned 16-bit integer
    pub fn read_u16(&mut self) -> Result<u16> {
        if !self.has_bytes(2) {
            return Err(BinaryError::not_enough_data(2, self.remaining()));
        }
        match self.byte_order {
            ByteOrder::Big => Ok(self.cursor.read_u16::<BigEndian>()?),
            ByteOrder::Little => Ok(self.cursor.read_u16::<LittleEndian>()?),
        }
    }

    /// Read a signed 16-bit integer
    pub fn read_i16(&mut self) -> Result<i16> {
        if !self.has_bytes(2) {
            return Err(BinaryError::not_enough_data(2, self.remaining()));
        }
        match self.byte_order {
            ByteOrder::Big => Ok(self.cursor.read_i16::<BigEndian>()?),
            ByteOrder::Little => Ok(self.cursor.read_i16::<LittleEndian>()?),
        }
    }

    /// Read an unsigned 32-bit integer
    pub fn read_u32(&mut self) -> Result<u32> {
        if !self.has_bytes(4) {
            return Err(BinaryError::not_enough_data(4, self.remaining()));
        }
        match self.byte_order {
            ByteOrder::Big => Ok(self.cursor.read_u32::<BigEndian>()?),
            ByteOrder::Little => Ok(self.cursor.read_u32::<LittleEndian>()?),
        }
    }

    /// Read a signed 32-bit integer
    pub fn read_i32(&mut self) -> Result<i32> {
        if !self.has_bytes(4) {
            return Err(BinaryError::not_enough_data(4, self.remaining()));
        }
        match self.byte_order {
            ByteOrder::Big => Ok(self.cursor.read_i32::<BigEndian>()?),
            ByteOrder::Little => Ok(self.cursor.read_i32::<LittleEndian>()?),
        }
    }

    /// Read an unsigned 64-bit integer
    pub fn read_u64(&mut self) -> Result<u64> {
        if !self.has_bytes(8) {
            return Err(BinaryError::not_enough_data(8, self.remaining()));
        }
        match self.byte_order {
            ByteOrder::Big => Ok(self.cursor.read_u64::<BigEndian>()?),
            ByteOrder::Little => Ok(self.cursor.read_u64::<LittleEndian>()?),
        }
    }

    /// Read a signed 64-bit integer
    pub fn read_i64(&mut self) -> Result<i64> {
        if !self.has_bytes(8) {
            return Err(BinaryError::not_enough_data(8, self.remaining()));
        }
        match self.byte_order {
            ByteOrder::Big => Ok(self.cursor.read_i64::<BigEndian>()?),
            ByteOrder::Little => Ok(self.cursor.read_i64::<LittleEndian>()?),
        }
    }

    /// Read a 32-bit floating point number
    pub fn read_f32(&mut self) -> Result<f32> {
        if !self.has_bytes(4) {
            return Err(BinaryError::not_enough_data(4, self.remaining()));
        }
        match self.byte_order {
            ByteOrder::Big => Ok(self.cursor.read_f32::<BigEndian>()?),
            ByteOrder::Little => Ok(self.cursor.read_f32::<LittleEndian>()?),
        }
    }

    /// Read a 64-bit floating point number
    pub fn read_f64(&mut self) -> Result<f64> {
        if !self.has_bytes(8) {
            return Err(BinaryError::not_enough_data(8, self.remaining()));
        }
        match self.byte_order {
            ByteOrder::Big => Ok(self.cursor.read_f64::<BigEndian>()?),
            ByteOrder::Little => Ok(self.cursor.read_f64::<LittleEndian>()?),
        }
    }

    /// Read a fixed number of bytes
    pub fn read_bytes(&mut self, count: usize) -> Result<Vec<u8>> {
        if !self.has_bytes(count) {
            return Err(BinaryError::not_enough_data(count, self.remaining()));
        }
        let mut buffer = vec![0u8; count];
        self.cursor.read_exact(&mut buffer)?;
        Ok(buffer)
    }

    /// Read a 16-byte GUID
    pub fn read_guid(&mut self) -> Result<Guid> {
        if !self.has_bytes(16) {
            return Err(BinaryError::not_enough_data(16, self.remaining()));
        }
        let mut bytes = [0u8; 16];
        self.cursor.read_exact(&mut bytes)?;
        Ok(Guid::new(bytes))
    }

    /// Read a name reference (table index + instance number)
    pub fn read_name_ref(&mut self) -> Result<NameReference> {
        let index = self.read_i32()?;
        let number = self.read_i32()?;
        Ok(NameReference::new(index, number))
    }

    /// Read a length-prefixed string
    ///
    /// A positive count N is N single-byte characters including the
    /// terminator; a negative count -M is M UTF-16 code units including the
    /// terminator; zero is the empty string.
    pub fn read_fstring(&mut self) -> Result<String> {
        let count = self.read_i32()?;
        if count == 0 {
            return Ok(String::new());
        }

        if count > 0 {
            let length = count as usize;
            let bytes = self.read_bytes(length)?;
            // Single-byte text is Latin-1; drop the terminator
            let text = &bytes[..length - 1];
            Ok(text.iter().map(|&b| b as char).collect())
        } else {
            let units = count
                .checked_neg()
                .ok_or_else(|| BinaryError::invalid_data("String length overflow"))?
                as usize;
            let byte_len = units
                .checked_mul(2)
                .ok_or_else(|| BinaryError::invalid_data("String length overflow"))?;
            if !self.has_bytes(byte_len) {
                return Err(BinaryError::not_enough_data(byte_len, self.remaining()));
            }
            let mut code_units = Vec::with_capacity(units);
            for _ in 0..units {
                code_units.push(self.read_u16()?);
            }
            code_units.pop();
            Ok(String::from_utf16_lossy(&code_units))
        }
    }

    /// Read all remaining bytes
    pub fn read_remaining(&mut self) -> &'a [u8] {
        let pos = (self.cursor.position() as usize).min(self.len());
        let data: &'a [u8] = self.cursor.get_ref();
        self.cursor.set_position(data.len() as u64);
        &data[pos..]
    }

    /// Get the current byte order
    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    /// Set the byte order
    pub fn set_byte_order(&mut self, byte_order: ByteOrder) {
        self.byte_order = byte_order;
    }

    /// Get a slice of the remaining data
    pub fn remaining_slice(&self) -> &'a [u8] {
        let pos = (self.position() as usize).min(self.len());
        let data: &'a [u8] = self.cursor.get_ref();
        &data[pos..]
    }

    /// Create a new reader for a subset of the data
    pub fn sub_reader(&self, offset: usize, length: usize) -> Result<BinaryReader<'a>> {
        let data: &'a [u8] = self.cursor.get_ref();
        let end = offset
            .checked_add(length)
            .ok_or_else(|| BinaryError::invalid_data("Sub-range overflow"))?;
        if end > data.len() {
            return Err(BinaryError::not_enough_data(end, data.len()));
        }
        Ok(BinaryReader::new(&data[offset..end], self.byte_order))
    }

    /// Split off a reader over the next `length` bytes and advance past them
    ///
    /// The parent ends up exactly `length` bytes further regardless of how
    /// much the child reads.
    pub fn take_sub_reader(&mut self, length: usize) -> Result<BinaryReader<'a>> {
        let offset = self.position() as usize;
        let sub = self.sub_reader(offset, length)?;
        self.cursor.set_position((offset + length) as u64);
        Ok(sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_reading() {
        let data = [0x01, 0x02, 0x03, 0x04];
        let mut reader = BinaryReader::new(&data, ByteOrder::Little);

        assert_eq!(reader.read_u8().unwrap(), 0x01);
        assert_eq!(reader.read_u8().unwrap(), 0x02);
        assert_eq!(reader.position(), 2);
        assert_eq!(reader.remaining(), 2);
    }

    #[test]
    fn test_endianness() {
        let data = [0x01, 0x02, 0x03, 0x04];

        let mut reader_le = BinaryReader::new(&data, ByteOrder::Little);
        assert_eq!(reader_le.read_u32().unwrap(), 0x04030201);

        let mut reader_be = BinaryReader::new(&data, ByteOrder::Big);
        assert_eq!(reader_be.read_u32().unwrap(), 0x01020304);
    }

    #[test]
    fn test_fstring_ansi() {
        let mut data = 6i32.to_le_bytes().to_vec();
        data.extend_from_slice(b"Hello\0");
        let mut reader = BinaryReader::new(&data, ByteOrder::Little);
        assert_eq!(reader.read_fstring().unwrap(), "Hello");
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_fstring_utf16() {
        let mut data = (-3i32).to_le_bytes().to_vec();
        for unit in "é€".encode_utf16().chain(std::iter::once(0)) {
            data.extend_from_slice(&unit.to_le_bytes());
        }
        let mut reader = BinaryReader::new(&data, ByteOrder::Little);
        assert_eq!(reader.read_fstring().unwrap(), "é€");
        assert_eq!(reader.position(), 4 + 6);
    }

    #[test]
    fn test_fstring_empty() {
        let data = 0i32.to_le_bytes();
        let mut reader = BinaryReader::new(&data, ByteOrder::Little);
        assert_eq!(reader.read_fstring().unwrap(), "");
    }

    #[test]
    fn test_fstring_truncated() {
        let mut data = 10i32.to_le_bytes().to_vec();
        data.extend_from_slice(b"abc");
        let mut reader = BinaryReader::new(&data, ByteOrder::Little);
        assert!(matches!(
            reader.read_fstring(),
            Err(BinaryError::NotEnoughData { .. })
        ));
    }

    #[test]
    fn test_take_sub_reader_is_bounded() {
        let data = [1u8, 2, 3, 4, 5, 6];
        let mut reader = BinaryReader::new(&data, ByteOrder::Little);
        reader.read_u8().unwrap();

        let mut sub = reader.take_sub_reader(2).unwrap();
        assert_eq!(reader.position(), 3);
        assert_eq!(sub.read_u8().unwrap(), 2);
        assert_eq!(sub.read_u8().unwrap(), 3);
        assert!(sub.read_u8().is_err());
        assert_eq!(reader.read_u8().unwrap(), 4);
    }

    #[test]
    fn test_take_sub_reader_past_end() {
        let data = [1u8, 2];
        let mut reader = BinaryReader::new(&data, ByteOrder::Little);
        assert!(reader.take_sub_reader(3).is_err());
        assert_eq!(reader.position(), 0);
    }
}
