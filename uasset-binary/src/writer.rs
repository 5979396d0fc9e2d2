//! Binary data writer for package files

use crate::error::{BinaryError, Result};
use crate::package::names::NameReference;
use crate::reader::ByteOrder;
use byteorder::{BigEndian, LittleEndian, WriteBytesExt};
use std::io::{Cursor, Seek, SeekFrom, Write};
use uasset_core::Guid;

/// Growable, seekable output buffer
///
/// Writes go to the current position; writing past the end grows the
/// buffer. [`BinaryWriter::patch_at`] overwrites bytes that already exist
/// and never changes the length.
pub struct BinaryWriter {
    cursor: Cursor<Vec<u8>>,
    byte_order: ByteOrder,
}

macro_rules! write_ordered {
    ($self:ident, $method:ident, $value:expr) => {
        match $self.byte_order {
            ByteOrder::Big => $self.cursor.$method::<BigEndian>($value)?,
            ByteOrder::Little => $self.cursor.$method::<LittleEndian>($value)?,
        }
    };
}

impl BinaryWriter {
    pub fn new(byte_order: ByteOrder) -> Self {
        Self::with_capacity(0, byte_order)
    }

    pub fn with_capacity(capacity: usize, byte_order: ByteOrder) -> Self {
        Self {
            cursor: Cursor::new(Vec::with_capacity(capacity)),
            byte_order,
        }
    }

    /// Current write position
    pub fn position(&self) -> u64 {
        self.cursor.position()
    }

    /// Move the write position; moving past the end is allowed and the gap is zero-filled on write
    pub fn set_position(&mut self, pos: u64) -> Result<()> {
        self.cursor.seek(SeekFrom::Start(pos))?;
        Ok(())
    }

    /// Move the write position to the end of the data
    pub fn seek_end(&mut self) -> Result<u64> {
        Ok(self.cursor.seek(SeekFrom::End(0))?)
    }

    /// Length of the data written so far
    pub fn len(&self) -> usize {
        self.cursor.get_ref().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    /// Borrow the written bytes
    pub fn as_slice(&self) -> &[u8] {
        self.cursor.get_ref()
    }

    /// Consume the writer and return the buffer
    pub fn into_inner(self) -> Vec<u8> {
        self.cursor.into_inner()
    }

    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        self.cursor.write_u8(value)?;
        Ok(())
    }

    pub fn write_i8(&mut self, value: i8) -> Result<()> {
        self.cursor.write_i8(value)?;
        Ok(())
    }

    pub fn write_bool(&mut self, value: bool) -> Result<()> {
        self.write_u8(value as u8)
    }

    /// Boolean stored as a 32-bit integer
    pub fn write_bool32(&mut self, value: bool) -> Result<()> {
        self.write_i32(value as i32)
    }

    pub fn write_u16(&mut self, value: u16) -> Result<()> {
        write_ordered!(self, write_u16, value);
        Ok(())
    }

    pub fn write_i16(&mut self, value: i16) -> Result<()> {
        write_ordered!(self, write_i16, value);
        Ok(())
    }

    pub fn write_u32(&mut self, value: u32) -> Result<()> {
        write_ordered!(self, write_u32, value);
        Ok(())
    }

    pub fn write_i32(&mut self, value: i32) -> Result<()> {
        write_ordered!(self, write_i32, value);
        Ok(())
    }

    pub fn write_u64(&mut self, value: u64) -> Result<()> {
        write_ordered!(self, write_u64, value);
        Ok(())
    }

    pub fn write_i64(&mut self, value: i64) -> Result<()> {
        write_ordered!(self, write_i64, value);
        Ok(())
    }

    pub fn write_f32(&mut self, value: f32) -> Result<()> {
        write_ordered!(self, write_f32, value);
        Ok(())
    }

    pub fn write_f64(&mut self, value: f64) -> Result<()> {
        write_ordered!(self, write_f64, value);
        Ok(())
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.cursor.write_all(bytes)?;
        Ok(())
    }

    /// Write `count` zero bytes
    pub fn write_zeros(&mut self, count: usize) -> Result<()> {
        self.write_bytes(&vec![0u8; count])
    }

    pub fn write_guid(&mut self, guid: &Guid) -> Result<()> {
        self.write_bytes(guid.as_bytes())
    }

    pub fn write_name_ref(&mut self, name: NameReference) -> Result<()> {
        self.write_i32(name.index)?;
        self.write_i32(name.number)
    }

    /// Write a length-prefixed string
    ///
    /// Pure ASCII goes out as single bytes, anything else as UTF-16. Both
    /// forms carry a terminator that is counted in the prefix.
    pub fn write_fstring(&mut self, value: &str) -> Result<()> {
        if value.is_empty() {
            return self.write_i32(0);
        }

        if value.is_ascii() {
            let count = i32::try_from(value.len() + 1)
                .map_err(|_| BinaryError::invalid_data("String too long"))?;
            self.write_i32(count)?;
            self.write_bytes(value.as_bytes())?;
            self.write_u8(0)
        } else {
            let units: Vec<u16> = value.encode_utf16().collect();
            let count = i32::try_from(units.len() + 1)
                .map_err(|_| BinaryError::invalid_data("String too long"))?;
            self.write_i32(-count)?;
            for unit in units {
                self.write_u16(unit)?;
            }
            self.write_u16(0)
        }
    }

    /// Overwrite already-written bytes at `pos`, keeping the current position
    pub fn patch_at(&mut self, pos: u64, bytes: &[u8]) -> Result<()> {
        let start = usize::try_from(pos)
            .map_err(|_| BinaryError::structural("Patch offset out of range"))?;
        let end = start
            .checked_add(bytes.len())
            .ok_or_else(|| BinaryError::structural("Patch range overflow"))?;
        if end > self.len() {
            return Err(BinaryError::structural(format!(
                "Patch {}..{} would extend buffer of {} bytes",
                start,
                end,
                self.len()
            )));
        }
        self.cursor.get_mut()[start..end].copy_from_slice(bytes);
        Ok(())
    }

    /// Overwrite a 32-bit integer at `pos`
    pub fn patch_i32(&mut self, pos: u64, value: i32) -> Result<()> {
        let bytes = match self.byte_order {
            ByteOrder::Big => value.to_be_bytes(),
            ByteOrder::Little => value.to_le_bytes(),
        };
        self.patch_at(pos, &bytes)
    }

    /// Overwrite a 64-bit integer at `pos`
    pub fn patch_i64(&mut self, pos: u64, value: i64) -> Result<()> {
        let bytes = match self.byte_order {
            ByteOrder::Big => value.to_be_bytes(),
            ByteOrder::Little => value.to_le_bytes(),
        };
        self.patch_at(pos, &bytes)
    }
}

impl Default for BinaryWriter {
    fn default() -> Self {
        Self::new(ByteOrder::Little)
    }
}
