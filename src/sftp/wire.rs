//! Big-endian primitives shared by attribute blocks and packet bodies.
//!
//! Strings are a `u32` length followed by that many raw bytes. Every read
//! is bounds-checked against what is left in the buffer, so a short buffer
//! surfaces as [`WireError::ShortRead`] instead of a panic.

use super::error::{SftpError, WireError};

pub struct WireReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> WireReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    fn take(&mut self, field: &'static str, needed: usize) -> Result<&'a [u8], WireError> {
        let remaining = self.remaining();
        if remaining < needed {
            return Err(WireError::ShortRead {
                field,
                needed,
                remaining,
            });
        }
        let bytes = &self.data[self.position..self.position + needed];
        self.position += needed;
        Ok(bytes)
    }

    fn take_array<const N: usize>(&mut self, field: &'static str) -> Result<[u8; N], WireError> {
        let mut buffer = [0u8; N];
        buffer.copy_from_slice(self.take(field, N)?);
        Ok(buffer)
    }

    pub fn read_u8(&mut self, field: &'static str) -> Result<u8, WireError> {
        Ok(self.take(field, 1)?[0])
    }

    pub fn read_u32(&mut self, field: &'static str) -> Result<u32, WireError> {
        Ok(u32::from_be_bytes(self.take_array(field)?))
    }

    pub fn read_u64(&mut self, field: &'static str) -> Result<u64, WireError> {
        Ok(u64::from_be_bytes(self.take_array(field)?))
    }

    pub fn read_string(&mut self, field: &'static str) -> Result<Vec<u8>, WireError> {
        let length = self.read_u32(field)? as usize;
        Ok(self.take(field, length)?.to_vec())
    }

    pub fn read_utf8(&mut self, field: &'static str) -> Result<String, WireError> {
        String::from_utf8(self.read_string(field)?).map_err(|_| WireError::InvalidUtf8 { field })
    }
}

pub fn put_u32(buffer: &mut Vec<u8>, value: u32) {
    buffer.extend_from_slice(&value.to_be_bytes());
}

pub fn put_u64(buffer: &mut Vec<u8>, value: u64) {
    buffer.extend_from_slice(&value.to_be_bytes());
}

/// Writes a length-prefixed string. Lengths past `u32::MAX` are truncated
/// in the prefix; callers that care check with [`check_len`] first.
pub fn put_string(buffer: &mut Vec<u8>, value: &[u8]) {
    put_u32(buffer, value.len() as u32);
    buffer.extend_from_slice(value);
}

/// Fails when `len` cannot be written as a `u32` length or count.
pub fn check_len(field: &'static str, len: usize) -> Result<(), SftpError> {
    match u32::try_from(len) {
        Ok(_) => Ok(()),
        Err(_) => Err(SftpError::FieldTooLong { field, len }),
    }
}

/// Prefixes `payload` with its `u32` length, giving a complete packet.
pub fn frame(payload: Vec<u8>) -> Vec<u8> {
    let mut packet = Vec::with_capacity(payload.len() + 4);
    put_u32(&mut packet, payload.len() as u32);
    packet.extend(payload);
    packet
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_string_reports_short_body() {
        let mut data = Vec::new();
        put_u32(&mut data, 10);
        data.extend_from_slice(b"abc");

        let mut reader = WireReader::new(&data);
        assert_eq!(
            reader.read_string("name"),
            Err(WireError::ShortRead {
                field: "name",
                needed: 10,
                remaining: 3
            })
        );
    }

    #[test]
    fn test_reads_advance_position() {
        let data = [0, 0, 0, 7, 0, 0, 0, 0, 0, 0, 1, 0, 9];
        let mut reader = WireReader::new(&data);

        assert_eq!(reader.read_u32("a").unwrap(), 7);
        assert_eq!(reader.read_u64("b").unwrap(), 256);
        assert_eq!(reader.read_u8("c").unwrap(), 9);
        assert_eq!(reader.position(), 13);
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_check_len_at_u32_boundary() {
        assert_eq!(check_len("filename", u32::MAX as usize), Ok(()));
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_check_len_rejects_lengths_past_u32() {
        let len = u32::MAX as usize + 1;
        assert_eq!(
            check_len("handle", len),
            Err(SftpError::FieldTooLong {
                field: "handle",
                len
            })
        );
    }

    #[test]
    fn test_read_utf8_rejects_invalid_bytes() {
        let mut data = Vec::new();
        put_string(&mut data, &[0xff, 0xfe]);

        let mut reader = WireReader::new(&data);
        assert_eq!(
            reader.read_utf8("value"),
            Err(WireError::InvalidUtf8 { field: "value" })
        );
    }
}
