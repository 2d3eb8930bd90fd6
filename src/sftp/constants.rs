// SFTP Protocol message types
pub const SSH_FXP_OPEN: u8 = 3;
pub const SSH_FXP_SETSTAT: u8 = 9;
pub const SSH_FXP_FSETSTAT: u8 = 10;
pub const SSH_FXP_MKDIR: u8 = 14;
pub const SSH_FXP_NAME: u8 = 104;
pub const SSH_FXP_ATTRS: u8 = 105;

// File attribute flags
pub const SSH_FILEXFER_ATTR_SIZE: u32 = 0x00000001;
pub const SSH_FILEXFER_ATTR_UIDGID: u32 = 0x00000002;
pub const SSH_FILEXFER_ATTR_PERMISSIONS: u32 = 0x00000004;
pub const SSH_FILEXFER_ATTR_ACMODTIME: u32 = 0x00000008;
pub const SSH_FILEXFER_ATTR_EXTENDED: u32 = 0x80000000;

// File pflags
pub const SSH_FXF_READ: u32 = 0x00000001;
pub const SSH_FXF_WRITE: u32 = 0x00000002;
pub const SSH_FXF_APPEND: u32 = 0x00000004;
pub const SSH_FXF_CREAT: u32 = 0x00000008;
pub const SSH_FXF_TRUNC: u32 = 0x00000010;
pub const SSH_FXF_EXCL: u32 = 0x00000020;

// Unix file permissions
pub const S_IFMT: u32 = 0o170000; // bit mask for the file type bit field
pub const S_IFIFO: u32 = 0o010000; // FIFO
pub const S_IFCHR: u32 = 0o020000; // character device
pub const S_IFDIR: u32 = 0o040000; // directory
pub const S_IFBLK: u32 = 0o060000; // block device
pub const S_IFREG: u32 = 0o100000; // regular file
pub const S_IFLNK: u32 = 0o120000; // symbolic link
pub const S_IFSOCK: u32 = 0o140000; // socket

pub const S_ISUID: u32 = 0o4000; // set user id on execution
pub const S_ISGID: u32 = 0o2000; // set group id on execution
pub const S_ISVTX: u32 = 0o1000; // sticky

pub const S_IRWXU: u32 = 0o700;
pub const S_IRUSR: u32 = 0o400;
pub const S_IWUSR: u32 = 0o200;
pub const S_IXUSR: u32 = 0o100;
pub const S_IRWXG: u32 = 0o070;
pub const S_IRGRP: u32 = 0o040;
pub const S_IWGRP: u32 = 0o020;
pub const S_IXGRP: u32 = 0o010;
pub const S_IRWXO: u32 = 0o007;
pub const S_IROTH: u32 = 0o004;
pub const S_IWOTH: u32 = 0o002;
pub const S_IXOTH: u32 = 0o001;
