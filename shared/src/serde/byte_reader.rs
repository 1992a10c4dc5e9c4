use crate::serde::byte_writer::PRUNED_STRING_MARKER;
use crate::serde::error::SerdeError;

/// Reads big-endian values back out of a buffer produced by
/// [`ByteWriter`](crate::serde::ByteWriter). Underflow surfaces as
/// [`SerdeError::TruncatedBuffer`].
pub struct ByteReader<'b> {
    buffer: &'b [u8],
    cursor: usize,
}

impl<'b> ByteReader<'b> {
    pub fn new(buffer: &'b [u8]) -> Self {
        Self { buffer, cursor: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.cursor
    }

    fn take(&mut self, count: usize) -> Result<&'b [u8], SerdeError> {
        if self.remaining() < count {
            return Err(SerdeError::TruncatedBuffer {
                needed: count - self.remaining(),
                remaining: self.remaining(),
            });
        }
        let slice = &self.buffer[self.cursor..self.cursor + count];
        self.cursor += count;
        Ok(slice)
    }

    pub fn read_u8(&mut self) -> Result<u8, SerdeError> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, SerdeError> {
        let bytes = self.take(2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    pub fn read_u32(&mut self) -> Result<u32, SerdeError> {
        let bytes = self.take(4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn read_i16(&mut self) -> Result<i16, SerdeError> {
        let bytes = self.take(2)?;
        Ok(i16::from_be_bytes([bytes[0], bytes[1]]))
    }

    pub fn read_i32(&mut self) -> Result<i32, SerdeError> {
        let bytes = self.take(4)?;
        Ok(i32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn read_f32(&mut self) -> Result<f32, SerdeError> {
        Ok(f32::from_bits(self.read_u32()?))
    }

    /// Reads a string written by `write_string`. The pruned marker decodes
    /// to `None`.
    pub fn read_string(&mut self) -> Result<Option<String>, SerdeError> {
        let length = self.read_u16()?;
        if length == PRUNED_STRING_MARKER {
            return Ok(None);
        }
        let mut units = Vec::with_capacity(length as usize);
        for _ in 0..length {
            units.push(self.read_u16()?);
        }
        let value = String::from_utf16(&units).map_err(|_| SerdeError::MalformedString)?;
        Ok(Some(value))
    }

    pub fn read_bytes(&mut self, count: usize) -> Result<&'b [u8], SerdeError> {
        self.take(count)
    }
}
