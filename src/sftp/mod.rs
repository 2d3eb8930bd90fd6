pub mod attributes;
pub mod constants;
pub mod error;
pub mod open_flags;
pub mod packet;
pub mod permissions;
pub mod types;
pub mod wire;


pub use attributes::{AccessModificationTime, AttributeFlags, FileAttributes, TimePolicy, UserGroupId};
pub use error::{SftpError, WireError};
pub use open_flags::OpenFlags;
pub use packet::{ClientPacket, ServerPacket};
pub use permissions::{FileType, Permissions};
pub use types::FileInfo;
