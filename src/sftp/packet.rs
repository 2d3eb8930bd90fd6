//! Request and response bodies that carry attribute blocks.

use log::{debug, info};

use super::attributes::{FileAttributes, TimePolicy};
use super::constants::*;
use super::error::{SftpError, WireError};
use super::open_flags::OpenFlags;
use super::types::FileInfo;
use super::wire::{self, WireReader};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientPacket {
    Open {
        request_id: u32,
        filename: String,
        pflags: OpenFlags,
        attrs: FileAttributes,
    },
    SetStat {
        request_id: u32,
        path: String,
        attrs: FileAttributes,
    },
    FSetStat {
        request_id: u32,
        handle: Vec<u8>,
        attrs: FileAttributes,
    },
    Mkdir {
        request_id: u32,
        path: String,
        attrs: FileAttributes,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerPacket {
    Attrs {
        request_id: u32,
        attrs: FileAttributes,
    },
    Name {
        request_id: u32,
        files: Vec<FileInfo>,
    },
}

impl ClientPacket {
    pub fn packet_type(&self) -> u8 {
        match self {
            ClientPacket::Open { .. } => SSH_FXP_OPEN,
            ClientPacket::SetStat { .. } => SSH_FXP_SETSTAT,
            ClientPacket::FSetStat { .. } => SSH_FXP_FSETSTAT,
            ClientPacket::Mkdir { .. } => SSH_FXP_MKDIR,
        }
    }

    pub fn packet_name(&self) -> &'static str {
        match self {
            ClientPacket::Open { .. } => "SSH_FXP_OPEN",
            ClientPacket::SetStat { .. } => "SSH_FXP_SETSTAT",
            ClientPacket::FSetStat { .. } => "SSH_FXP_FSETSTAT",
            ClientPacket::Mkdir { .. } => "SSH_FXP_MKDIR",
        }
    }

    pub fn request_id(&self) -> u32 {
        match self {
            ClientPacket::Open { request_id, .. }
            | ClientPacket::SetStat { request_id, .. }
            | ClientPacket::FSetStat { request_id, .. }
            | ClientPacket::Mkdir { request_id, .. } => *request_id,
        }
    }

    /// Frames the packet with timestamps wrapped to 32 bits.
    ///
    /// Fails with [`SftpError::InvalidOpenFlags`] for an `Open` whose pflags
    /// ask for truncate or exclusive without create.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SftpError> {
        self.to_bytes_with(TimePolicy::Wrap)
    }

    pub fn to_bytes_with(&self, policy: TimePolicy) -> Result<Vec<u8>, SftpError> {
        let mut payload: Vec<u8> = Vec::new();
        payload.push(self.packet_type());
        wire::put_u32(&mut payload, self.request_id());

        let (field, target, attrs): (&'static str, &[u8], &FileAttributes) = match self {
            ClientPacket::Open {
                filename,
                pflags,
                attrs,
                ..
            } => {
                if pflags.missing_create() {
                    return Err(SftpError::InvalidOpenFlags(*pflags));
                }
                ("filename", filename.as_bytes(), attrs)
            }
            ClientPacket::SetStat { path, attrs, .. } | ClientPacket::Mkdir { path, attrs, .. } => {
                ("path", path.as_bytes(), attrs)
            }
            ClientPacket::FSetStat { handle, attrs, .. } => ("handle", handle.as_slice(), attrs),
        };
        if policy == TimePolicy::Strict {
            wire::check_len(field, target.len())?;
        }
        wire::put_string(&mut payload, target);
        if let ClientPacket::Open { pflags, .. } = self {
            wire::put_u32(&mut payload, pflags.raw());
        }
        payload.extend(attrs.encode_with(policy)?);

        debug!(
            "{} request_id={} attrs={}",
            self.packet_name(),
            self.request_id(),
            attrs
        );
        Ok(wire::frame(payload))
    }
}

impl ServerPacket {
    pub fn packet_type(&self) -> u8 {
        match self {
            ServerPacket::Attrs { .. } => SSH_FXP_ATTRS,
            ServerPacket::Name { .. } => SSH_FXP_NAME,
        }
    }

    pub fn request_id(&self) -> u32 {
        match self {
            ServerPacket::Attrs { request_id, .. } | ServerPacket::Name { request_id, .. } => {
                *request_id
            }
        }
    }

    /// Parses one framed packet from the start of `data`. Fields are read
    /// only from within the declared length; bytes after it are ignored.
    pub fn from_bytes(data: &[u8]) -> Result<Self, SftpError> {
        let mut header = WireReader::new(data);
        let message_length = header.read_u32("length").map_err(SftpError::MalformedPacket)? as usize;
        if message_length > header.remaining() {
            return Err(SftpError::MalformedPacket(WireError::ShortRead {
                field: "body",
                needed: message_length,
                remaining: header.remaining(),
            }));
        }
        let body = &data[header.position()..header.position() + message_length];
        let mut reader = WireReader::new(body);

        let message_type = reader.read_u8("type").map_err(SftpError::MalformedPacket)?;
        let request_id = reader
            .read_u32("request id")
            .map_err(SftpError::MalformedPacket)?;

        let packet = match message_type {
            SSH_FXP_ATTRS => {
                let attrs = FileAttributes::read_from(&mut reader)?;
                info!("Attrs Response to request_id: {}", request_id);
                ServerPacket::Attrs { request_id, attrs }
            }
            SSH_FXP_NAME => {
                let count = reader.read_u32("count").map_err(SftpError::MalformedPacket)?;
                info!("Name Response to request_id: {} ({} entries)", request_id, count);

                let mut files = Vec::new();
                for _ in 0..count {
                    let name = reader
                        .read_utf8("filename")
                        .map_err(SftpError::MalformedPacket)?;
                    let display_name = reader
                        .read_utf8("longname")
                        .map_err(SftpError::MalformedPacket)?;
                    let attrs = FileAttributes::read_from(&mut reader)?;
                    files.push(FileInfo {
                        name,
                        display_name,
                        attrs,
                    });
                }
                ServerPacket::Name { request_id, files }
            }
            other => return Err(SftpError::UnexpectedPacket(other)),
        };

        if reader.remaining() > 0 {
            debug!("Ignoring {} trailing bytes in packet", reader.remaining());
        }
        Ok(packet)
    }
}
