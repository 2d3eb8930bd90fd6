use std::fmt;

use bitflags::bitflags;

use super::constants::*;

bitflags! {
    /// POSIX mode bits as carried in the permissions field of an
    /// attribute block. Values mirror `sys/stat.h`.
    ///
    /// The file-type constants are multi-bit patterns under
    /// `FILE_TYPE_MASK`, so `contains` is the wrong test for them
    /// (`BLOCK_DEVICE` contains `DIRECTORY`). Use [`Permissions::file_type`].
    /// For the same reason `Debug` prints the raw octal mode.
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Permissions: u32 {
        const FILE_TYPE_MASK = S_IFMT;
        const FIFO = S_IFIFO;
        const CHARACTER_DEVICE = S_IFCHR;
        const DIRECTORY = S_IFDIR;
        const BLOCK_DEVICE = S_IFBLK;
        const REGULAR_FILE = S_IFREG;
        const SYMBOLIC_LINK = S_IFLNK;
        const SOCKET = S_IFSOCK;

        const SET_USER_ID = S_ISUID;
        const SET_GROUP_ID = S_ISGID;
        const STICKY = S_ISVTX;

        const OWNER_RWX = S_IRWXU;
        const OWNER_READ = S_IRUSR;
        const OWNER_WRITE = S_IWUSR;
        const OWNER_EXECUTE = S_IXUSR;

        const GROUP_RWX = S_IRWXG;
        const GROUP_READ = S_IRGRP;
        const GROUP_WRITE = S_IWGRP;
        const GROUP_EXECUTE = S_IXGRP;

        const OTHER_RWX = S_IRWXO;
        const OTHER_READ = S_IROTH;
        const OTHER_WRITE = S_IWOTH;
        const OTHER_EXECUTE = S_IXOTH;
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    #[default]
    Unknown,
    RegularFile,
    Directory,
    Symlink,
    CharacterDevice,
    BlockDevice,
    Fifo,
    Socket,
}

impl FileType {
    pub fn from_mode(mode: u32) -> Self {
        match mode & S_IFMT {
            S_IFREG => FileType::RegularFile,
            S_IFDIR => FileType::Directory,
            S_IFLNK => FileType::Symlink,
            S_IFCHR => FileType::CharacterDevice,
            S_IFBLK => FileType::BlockDevice,
            S_IFIFO => FileType::Fifo,
            S_IFSOCK => FileType::Socket,
            _ => FileType::Unknown,
        }
    }

    /// The `S_IF*` pattern for this type, or `None` for `Unknown`.
    pub fn type_bits(self) -> Option<u32> {
        match self {
            FileType::RegularFile => Some(S_IFREG),
            FileType::Directory => Some(S_IFDIR),
            FileType::Symlink => Some(S_IFLNK),
            FileType::CharacterDevice => Some(S_IFCHR),
            FileType::BlockDevice => Some(S_IFBLK),
            FileType::Fifo => Some(S_IFIFO),
            FileType::Socket => Some(S_IFSOCK),
            FileType::Unknown => None,
        }
    }

    /// First character of an `ls -l` line.
    pub fn indicator(self) -> char {
        match self {
            FileType::RegularFile => '-',
            FileType::Directory => 'd',
            FileType::Symlink => 'l',
            FileType::CharacterDevice => 'c',
            FileType::BlockDevice => 'b',
            FileType::Fifo => 'p',
            FileType::Socket => 's',
            FileType::Unknown => '?',
        }
    }
}

impl Permissions {
    pub const fn from_mode(mode: u32) -> Self {
        Self::from_bits_retain(mode)
    }

    pub const fn mode(self) -> u32 {
        self.bits()
    }

    pub fn file_type(self) -> FileType {
        FileType::from_mode(self.bits())
    }

    pub fn is_dir(self) -> bool {
        self.file_type() == FileType::Directory
    }

    pub fn is_file(self) -> bool {
        self.file_type() == FileType::RegularFile
    }

    pub fn is_symlink(self) -> bool {
        self.file_type() == FileType::Symlink
    }

    /// The permission bits without the file-type field.
    pub fn access_bits(self) -> Self {
        self.difference(Self::FILE_TYPE_MASK)
    }
}

impl fmt::Debug for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0o{:o}", self.bits())
    }
}

/// Renders the mode like `ls -l`, e.g. `drwxr-xr-x` or `-rwsr-xr-T`.
impl fmt::Display for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let triad = |read: Self, write: Self, execute: Self, special: Self, lower: char, upper: char| {
            let exec = match (self.contains(execute), self.contains(special)) {
                (true, true) => lower,
                (false, true) => upper,
                (true, false) => 'x',
                (false, false) => '-',
            };
            [
                if self.contains(read) { 'r' } else { '-' },
                if self.contains(write) { 'w' } else { '-' },
                exec,
            ]
        };

        let mut out = String::with_capacity(10);
        out.push(self.file_type().indicator());
        out.extend(triad(
            Self::OWNER_READ,
            Self::OWNER_WRITE,
            Self::OWNER_EXECUTE,
            Self::SET_USER_ID,
            's',
            'S',
        ));
        out.extend(triad(
            Self::GROUP_READ,
            Self::GROUP_WRITE,
            Self::GROUP_EXECUTE,
            Self::SET_GROUP_ID,
            's',
            'S',
        ));
        out.extend(triad(
            Self::OTHER_READ,
            Self::OTHER_WRITE,
            Self::OTHER_EXECUTE,
            Self::STICKY,
            't',
            'T',
        ));
        f.write_str(&out)
    }
}

impl From<u32> for Permissions {
    fn from(mode: u32) -> Self {
        Self::from_mode(mode)
    }
}
