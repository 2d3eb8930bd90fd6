//! `pflags` carried by an `SSH_FXP_OPEN` request.

use std::fmt;

use bitflags::bitflags;

use super::constants::*;

bitflags! {
    /// Requested open semantics.
    ///
    /// Any combination is representable, including ones a server must
    /// reject: `TRUNCATE` and `EXCLUSIVE` are only valid together with
    /// `CREATE`. Checking that is the job of whoever builds the request
    /// (see [`OpenFlags::missing_create`] and
    /// [`ClientPacket::to_bytes`](super::packet::ClientPacket::to_bytes)).
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct OpenFlags: u32 {
        /// Open the file for reading.
        const READ = SSH_FXF_READ;
        /// Open the file for writing. Combined with `READ` the file is
        /// opened for both.
        const WRITE = SSH_FXF_WRITE;
        /// Force all writes to append data at the end of the file.
        const APPEND = SSH_FXF_APPEND;
        /// Create the file if it does not already exist.
        const CREATE = SSH_FXF_CREAT;
        /// Truncate an existing file to zero length. Requires `CREATE`.
        const TRUNCATE = SSH_FXF_TRUNC;
        /// Fail if the file already exists. Requires `CREATE`.
        const EXCLUSIVE = SSH_FXF_EXCL;
    }
}

impl OpenFlags {
    /// Wraps a raw pflags word, keeping bits this crate has no name for.
    pub const fn from_raw(raw: u32) -> Self {
        Self::from_bits_retain(raw)
    }

    pub const fn raw(self) -> u32 {
        self.bits()
    }

    /// True when `TRUNCATE` or `EXCLUSIVE` is set but `CREATE` is not.
    pub fn missing_create(self) -> bool {
        self.intersects(Self::TRUNCATE | Self::EXCLUSIVE) && !self.contains(Self::CREATE)
    }

    /// Maps an `fopen(3)` style mode string to pflags.
    ///
    /// A trailing `x` on a `w` mode adds `EXCLUSIVE`; `b` is accepted and
    /// ignored.
    pub fn from_fopen_mode(mode: &str) -> Option<Self> {
        let mode: String = mode.chars().filter(|c| *c != 'b').collect();
        let flags = match mode.as_str() {
            "r" => Self::READ,
            "r+" => Self::READ | Self::WRITE,
            "w" => Self::WRITE | Self::CREATE | Self::TRUNCATE,
            "w+" => Self::READ | Self::WRITE | Self::CREATE | Self::TRUNCATE,
            "wx" => Self::WRITE | Self::CREATE | Self::EXCLUSIVE,
            "w+x" => Self::READ | Self::WRITE | Self::CREATE | Self::EXCLUSIVE,
            "a" => Self::WRITE | Self::CREATE | Self::APPEND,
            "a+" => Self::READ | Self::WRITE | Self::CREATE | Self::APPEND,
            _ => return None,
        };
        Some(flags)
    }
}

impl fmt::Debug for OpenFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.bits())
    }
}

impl From<u32> for OpenFlags {
    fn from(raw: u32) -> Self {
        Self::from_raw(raw)
    }
}

impl From<OpenFlags> for u32 {
    fn from(flags: OpenFlags) -> Self {
        flags.raw()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_is_zero_padded_hex() {
        assert_eq!(format!("{:?}", OpenFlags::from_raw(0x00000009)), "0x00000009");
        assert_eq!(format!("{:?}", OpenFlags::empty()), "0x00000000");
        assert_eq!(format!("{:?}", OpenFlags::from_raw(0xdeadbeef)), "0xdeadbeef");
    }

    #[test]
    fn test_raw_conversion_keeps_unknown_bits() {
        let flags = OpenFlags::from_raw(0x0100_0003);
        assert!(flags.contains(OpenFlags::READ | OpenFlags::WRITE));
        assert_eq!(flags.raw(), 0x0100_0003);
    }

    #[test]
    fn test_fopen_modes() {
        assert_eq!(OpenFlags::from_fopen_mode("rb"), Some(OpenFlags::READ));
        assert_eq!(
            OpenFlags::from_fopen_mode("wx").map(OpenFlags::raw),
            Some(0x0000002a)
        );
        assert!(OpenFlags::from_fopen_mode("q").is_none());
        for mode in ["r", "r+", "w", "w+", "wx", "w+x", "a", "a+"] {
            let flags = OpenFlags::from_fopen_mode(mode).unwrap();
            assert!(!flags.missing_create(), "{} produced {:?}", mode, flags);
        }
    }
}
