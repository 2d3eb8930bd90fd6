use ferric_sftp_attrs::sftp::{
    AttributeFlags, FileAttributes, FileType, Permissions, SftpError, WireError,
};
use pretty_assertions::assert_eq;

use crate::test_utils::{stat_of_regular_file, BlockBuilder};

#[test]
fn test_decode_openssh_style_stat_block() {
    let bytes = BlockBuilder::new()
        .u32(0x0000000f)
        .u64(4096)
        .u32(1000)
        .u32(1000)
        .u32(0o100644)
        .u32(1_600_000_000)
        .u32(1_600_000_500)
        .build();

    let attrs = FileAttributes::decode(&bytes).unwrap();
    assert_eq!(attrs, stat_of_regular_file());
    assert_eq!(attrs.encode(), bytes);
}

#[test]
fn test_decode_directory_entry_with_extensions() {
    let bytes = BlockBuilder::new()
        .u32(0x80000004)
        .u32(0o040755)
        .u32(2)
        .string("vendor-id")
        .string("acme")
        .string("checksum@example.com")
        .string("abc123")
        .build();

    let attrs = FileAttributes::decode(&bytes).unwrap();
    let perms = attrs.permissions.unwrap();
    assert_eq!(perms.file_type(), FileType::Directory);
    assert!(perms.is_dir());
    assert_eq!(perms.to_string(), "drwxr-xr-x");
    assert_eq!(
        attrs.extended,
        vec![
            ("vendor-id".to_string(), "acme".to_string()),
            ("checksum@example.com".to_string(), "abc123".to_string()),
        ]
    );
    assert_eq!(attrs.flags(), AttributeFlags::PERMISSIONS | AttributeFlags::EXTENDED);
}

#[test]
fn test_decode_fails_when_uidgid_is_half_present() {
    let bytes = BlockBuilder::new().u32(0x00000002).u32(1000).build();

    assert_eq!(
        FileAttributes::decode(&bytes),
        Err(SftpError::MalformedAttributes(WireError::ShortRead {
            field: "gid",
            needed: 4,
            remaining: 0,
        }))
    );
}

#[test]
fn test_decode_fails_when_pair_count_overstates() {
    let bytes = BlockBuilder::new()
        .u32(0x80000000)
        .u32(3)
        .string("a")
        .string("b")
        .build();

    let err = FileAttributes::decode(&bytes).unwrap_err();
    assert!(matches!(err, SftpError::MalformedAttributes(_)));
    assert!(err.to_string().starts_with("malformed attributes: extended name"));
}

#[test]
fn test_mutated_stat_round_trips_through_setstat_shape() {
    let mut attrs = stat_of_regular_file();
    attrs.uidgid = None;
    attrs.times = None;
    attrs.permissions = Some(Permissions::from_mode(0o100600));

    let bytes = attrs.encode();
    assert_eq!(&bytes[..4], &[0, 0, 0, 5]);
    assert_eq!(FileAttributes::decode(&bytes).unwrap(), attrs);
}
