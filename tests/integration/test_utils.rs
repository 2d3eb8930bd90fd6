// tests/integration/test_utils.rs
use ferric_sftp_attrs::sftp::{AccessModificationTime, FileAttributes};

/// Builds raw wire bytes field by field, independently of the encoder.
#[derive(Default)]
pub struct BlockBuilder {
    pub data: Vec<u8>,
}

impl BlockBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn u8(mut self, value: u8) -> Self {
        self.data.push(value);
        self
    }

    pub fn u32(mut self, value: u32) -> Self {
        self.data.extend_from_slice(&value.to_be_bytes());
        self
    }

    pub fn u64(mut self, value: u64) -> Self {
        self.data.extend_from_slice(&value.to_be_bytes());
        self
    }

    pub fn string(self, s: &str) -> Self {
        let len = s.len() as u32;
        self.u32(len).raw(s.as_bytes())
    }

    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.data.extend_from_slice(bytes);
        self
    }

    pub fn attrs(self, attrs: &FileAttributes) -> Self {
        let encoded = attrs.encode();
        self.raw(&encoded)
    }

    /// Prefixes the accumulated bytes with their length.
    pub fn framed(self) -> Vec<u8> {
        BlockBuilder::new()
            .u32(self.data.len() as u32)
            .raw(&self.data)
            .data
    }

    pub fn build(self) -> Vec<u8> {
        self.data
    }
}

/// A stat result as a typical OpenSSH server reports it for a regular file.
pub fn stat_of_regular_file() -> FileAttributes {
    FileAttributes::new()
        .with_size(4096)
        .with_uidgid(1000, 1000)
        .with_mode(0o100644)
        .with_times(AccessModificationTime::from_secs(
            1_600_000_000,
            1_600_000_500,
        ))
}
