//! SFTP v3 attribute blocks.
//!
//! On the wire an attribute block is a `u32` flags word followed by the
//! fields it announces, always in this order:
//!
//! ```text
//! u32 flags
//! u64 size                     if SIZE
//! u32 uid, u32 gid             if UIDGID
//! u32 permissions              if PERMISSIONS
//! u32 atime, u32 mtime         if ACMODTIME
//! u32 count, count * (string name, string value)   if EXTENDED
//! ```
//!
//! The flags word is never stored. [`FileAttributes::flags`] derives it from
//! which fields are populated, so the two cannot drift apart.

use std::fmt;

use bitflags::bitflags;
use chrono::{DateTime, SubsecRound, Utc};
use log::{debug, warn};

use super::constants::*;
use super::error::{SftpError, WireError};
use super::permissions::Permissions;
use super::wire::{self, WireReader};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct AttributeFlags: u32 {
        const SIZE = SSH_FILEXFER_ATTR_SIZE;
        const UIDGID = SSH_FILEXFER_ATTR_UIDGID;
        const PERMISSIONS = SSH_FILEXFER_ATTR_PERMISSIONS;
        const ACMODTIME = SSH_FILEXFER_ATTR_ACMODTIME;
        const EXTENDED = SSH_FILEXFER_ATTR_EXTENDED;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserGroupId {
    pub user_id: u32,
    pub group_id: u32,
}

impl UserGroupId {
    pub const fn new(user_id: u32, group_id: u32) -> Self {
        Self { user_id, group_id }
    }
}

/// Access and modification times, held as whole seconds since the Unix
/// epoch. Sent as `u32` seconds, so values outside `0..=u32::MAX` wrap
/// on encode (see [`TimePolicy`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessModificationTime {
    access_time: DateTime<Utc>,
    modification_time: DateTime<Utc>,
}

impl AccessModificationTime {
    /// Sub-second precision is discarded here, not at encode time.
    pub fn new(access_time: DateTime<Utc>, modification_time: DateTime<Utc>) -> Self {
        Self::from_whole_secs(access_time.trunc_subsecs(0), modification_time.trunc_subsecs(0))
    }

    pub fn from_secs(access_secs: u32, modification_secs: u32) -> Self {
        Self::from_whole_secs(from_wire_secs(access_secs), from_wire_secs(modification_secs))
    }

    // Callers guarantee both values have no fractional second.
    const fn from_whole_secs(access_time: DateTime<Utc>, modification_time: DateTime<Utc>) -> Self {
        Self {
            access_time,
            modification_time,
        }
    }

    pub fn access_time(&self) -> DateTime<Utc> {
        self.access_time
    }

    pub fn modification_time(&self) -> DateTime<Utc> {
        self.modification_time
    }
}

/// What to do with timestamps that do not fit the 32-bit wire field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimePolicy {
    /// Keep the low 32 bits of the seconds value. This is what legacy
    /// peers expect and what [`FileAttributes::encode`] does.
    #[default]
    Wrap,
    /// Fail with [`SftpError::TimestampOutOfRange`] or
    /// [`SftpError::FieldTooLong`] instead of truncating anything.
    Strict,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FileAttributes {
    pub size: Option<u64>,
    pub uidgid: Option<UserGroupId>,
    pub permissions: Option<Permissions>,
    pub times: Option<AccessModificationTime>,
    /// Name/value pairs in wire order. Empty means no extension block.
    pub extended: Vec<(String, String)>,
}

impl FileAttributes {
    /// No fields present. Encodes as a bare zero flags word.
    pub const NONE: FileAttributes = FileAttributes {
        size: None,
        uidgid: None,
        permissions: None,
        times: None,
        extended: Vec::new(),
    };

    /// Every fixed field present with a neutral default: an empty regular
    /// file (`0o100644`) owned by 0:0 with both times at the epoch. There
    /// are no extended pairs, so the flags word is `0x0000000f`.
    pub const ALL: FileAttributes = FileAttributes {
        size: Some(0),
        uidgid: Some(UserGroupId::new(0, 0)),
        permissions: Some(Permissions::from_mode(S_IFREG | 0o644)),
        times: Some(AccessModificationTime::from_whole_secs(
            DateTime::<Utc>::UNIX_EPOCH,
            DateTime::<Utc>::UNIX_EPOCH,
        )),
        extended: Vec::new(),
    };

    pub fn new() -> Self {
        Self::NONE
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_uidgid(mut self, user_id: u32, group_id: u32) -> Self {
        self.uidgid = Some(UserGroupId::new(user_id, group_id));
        self
    }

    pub fn with_permissions(mut self, permissions: Permissions) -> Self {
        self.permissions = Some(permissions);
        self
    }

    /// Sets permissions from a raw mode such as `0o100644`.
    pub fn with_mode(self, mode: u32) -> Self {
        self.with_permissions(Permissions::from_mode(mode))
    }

    pub fn with_times(mut self, times: AccessModificationTime) -> Self {
        self.times = Some(times);
        self
    }

    pub fn with_extended(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extended.push((name.into(), value.into()));
        self
    }

    /// Flags word for the fields currently populated.
    pub fn flags(&self) -> AttributeFlags {
        let mut flags = AttributeFlags::empty();
        flags.set(AttributeFlags::SIZE, self.size.is_some());
        flags.set(AttributeFlags::UIDGID, self.uidgid.is_some());
        flags.set(AttributeFlags::PERMISSIONS, self.permissions.is_some());
        flags.set(AttributeFlags::ACMODTIME, self.times.is_some());
        flags.set(AttributeFlags::EXTENDED, !self.extended.is_empty());
        flags
    }

    /// Encodes with [`TimePolicy::Wrap`], which cannot fail.
    pub fn encode(&self) -> Vec<u8> {
        let mut buffer = Vec::new();
        self.encode_into(&mut buffer);
        buffer
    }

    pub fn encode_into(&self, buffer: &mut Vec<u8>) {
        wire::put_u32(buffer, self.flags().bits());

        if let Some(size) = self.size {
            wire::put_u64(buffer, size);
        }

        if let Some(ids) = self.uidgid {
            wire::put_u32(buffer, ids.user_id);
            wire::put_u32(buffer, ids.group_id);
        }

        if let Some(permissions) = self.permissions {
            wire::put_u32(buffer, permissions.bits());
        }

        if let Some(times) = self.times {
            wire::put_u32(buffer, wrap_secs("access time", &times.access_time));
            wire::put_u32(buffer, wrap_secs("modification time", &times.modification_time));
        }

        if !self.extended.is_empty() {
            wire::put_u32(buffer, self.extended.len() as u32);
            for (name, value) in &self.extended {
                wire::put_string(buffer, name.as_bytes());
                wire::put_string(buffer, value.as_bytes());
            }
        }
    }

    pub fn encode_with(&self, policy: TimePolicy) -> Result<Vec<u8>, SftpError> {
        if policy == TimePolicy::Strict {
            self.check_ranges()?;
        }
        Ok(self.encode())
    }

    fn check_ranges(&self) -> Result<(), SftpError> {
        if let Some(times) = self.times {
            check_secs("access time", &times.access_time)?;
            check_secs("modification time", &times.modification_time)?;
        }

        wire::check_len("extended count", self.extended.len())?;
        for (name, value) in &self.extended {
            wire::check_len("extended name", name.len())?;
            wire::check_len("extended value", value.len())?;
        }

        Ok(())
    }

    /// Decodes an attribute block from the start of `data`. Trailing bytes
    /// are left alone.
    pub fn decode(data: &[u8]) -> Result<Self, SftpError> {
        Self::decode_prefix(data).map(|(attrs, _)| attrs)
    }

    /// Like [`decode`](Self::decode), also returning how many bytes the
    /// block took.
    pub fn decode_prefix(data: &[u8]) -> Result<(Self, usize), SftpError> {
        let mut reader = WireReader::new(data);
        let attrs = Self::read_from(&mut reader)?;
        Ok((attrs, reader.position()))
    }

    pub fn read_from(reader: &mut WireReader<'_>) -> Result<Self, SftpError> {
        Self::parse(reader).map_err(SftpError::MalformedAttributes)
    }

    fn parse(reader: &mut WireReader<'_>) -> Result<Self, WireError> {
        let raw_flags = reader.read_u32("flags")?;
        // Bits we have no field for are ignored.
        let flags = AttributeFlags::from_bits_truncate(raw_flags);
        if flags.bits() != raw_flags {
            debug!(
                "Ignoring unknown attribute flag bits 0x{:08x}",
                raw_flags & !AttributeFlags::all().bits()
            );
        }

        let mut attrs = FileAttributes::NONE;

        if flags.contains(AttributeFlags::SIZE) {
            attrs.size = Some(reader.read_u64("size")?);
            debug!("  Size: {:?}", attrs.size);
        }

        if flags.contains(AttributeFlags::UIDGID) {
            let user_id = reader.read_u32("uid")?;
            let group_id = reader.read_u32("gid")?;
            debug!("  UID: {} GID: {}", user_id, group_id);
            attrs.uidgid = Some(UserGroupId::new(user_id, group_id));
        }

        if flags.contains(AttributeFlags::PERMISSIONS) {
            let mode = reader.read_u32("permissions")?;
            debug!("  Permissions: 0o{:o} (0x{:x})", mode, mode);
            attrs.permissions = Some(Permissions::from_mode(mode));
        }

        if flags.contains(AttributeFlags::ACMODTIME) {
            let atime = reader.read_u32("access time")?;
            let mtime = reader.read_u32("modification time")?;
            debug!("  Access time: {} Modify time: {}", atime, mtime);
            attrs.times = Some(AccessModificationTime::from_secs(atime, mtime));
        }

        if flags.contains(AttributeFlags::EXTENDED) {
            let count = reader.read_u32("extended count")?;
            debug!("  Extended attributes count: {}", count);
            if count == 0 {
                warn!("Extended flag set with zero pairs; treating as no extended attributes");
            }

            // Each pair is at least 8 bytes, so don't trust count for capacity.
            let mut extended = Vec::with_capacity((count as usize).min(reader.remaining() / 8));
            for i in 0..count {
                let name = reader.read_utf8("extended name")?;
                let value = reader.read_utf8("extended value")?;
                debug!("    Extended[{}]: {} = {}", i, name, value);
                extended.push((name, value));
            }
            attrs.extended = extended;
        }

        Ok(attrs)
    }
}

impl fmt::Display for FileAttributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{perm: ")?;
        match self.permissions {
            Some(p) => write!(f, "{} (0o{:o})", p, p.mode())?,
            None => write!(f, "-")?,
        }
        write!(f, ", size: ")?;
        match self.size {
            Some(size) => write!(f, "{}", size)?,
            None => write!(f, "-")?,
        }
        write!(f, ", uidgid: ")?;
        match self.uidgid {
            Some(ids) => write!(f, "{}:{}", ids.user_id, ids.group_id)?,
            None => write!(f, "-")?,
        }
        write!(f, ", times: ")?;
        match self.times {
            Some(t) => write!(
                f,
                "{}/{}",
                t.access_time.to_rfc3339(),
                t.modification_time.to_rfc3339()
            )?,
            None => write!(f, "-")?,
        }
        write!(f, ", extended: {}}}", self.extended.len())
    }
}

fn from_wire_secs(secs: u32) -> DateTime<Utc> {
    // Every u32 second count is a valid chrono timestamp.
    DateTime::<Utc>::from_timestamp(i64::from(secs), 0).unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

fn wrap_secs(field: &'static str, time: &DateTime<Utc>) -> u32 {
    let secs = time.timestamp();
    let wrapped = secs as u32;
    if i64::from(wrapped) != secs {
        warn!("{} {}s wrapped to {}s on the wire", field, secs, wrapped);
    }
    wrapped
}

fn check_secs(field: &'static str, time: &DateTime<Utc>) -> Result<(), SftpError> {
    let seconds = time.timestamp();
    match u32::try_from(seconds) {
        Ok(_) => Ok(()),
        Err(_) => Err(SftpError::TimestampOutOfRange { field, seconds }),
    }
}
