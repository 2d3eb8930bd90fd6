use ferric_sftp_attrs::sftp::constants::*;
use ferric_sftp_attrs::sftp::{
    ClientPacket, FileAttributes, OpenFlags, ServerPacket, SftpError,
};
use pretty_assertions::assert_eq;

use crate::test_utils::{stat_of_regular_file, BlockBuilder};

#[test]
fn test_open_request_for_write_create_truncate() {
    let attrs = FileAttributes::new().with_mode(0o100644);
    let packet = ClientPacket::Open {
        request_id: 5,
        filename: "upload.bin".to_string(),
        pflags: OpenFlags::from_fopen_mode("w").unwrap(),
        attrs: attrs.clone(),
    };

    let expected = BlockBuilder::new()
        .u8(SSH_FXP_OPEN)
        .u32(5)
        .string("upload.bin")
        .u32(SSH_FXF_WRITE | SSH_FXF_CREAT | SSH_FXF_TRUNC)
        .attrs(&attrs)
        .framed();

    assert_eq!(packet.to_bytes().unwrap(), expected);
}

#[test]
fn test_open_request_with_exclusive_only_is_refused() {
    let packet = ClientPacket::Open {
        request_id: 1,
        filename: "lock".to_string(),
        pflags: OpenFlags::WRITE | OpenFlags::EXCLUSIVE,
        attrs: FileAttributes::NONE,
    };

    let err = packet.to_bytes().unwrap_err();
    assert_eq!(err, SftpError::InvalidOpenFlags(OpenFlags::from_raw(0x22)));
    assert_eq!(
        err.to_string(),
        "open flags 0x00000022 set truncate or exclusive without create"
    );
}

#[test]
fn test_mkdir_request_carries_attribute_block() {
    let attrs = FileAttributes::new().with_mode(0o755);
    let packet = ClientPacket::Mkdir {
        request_id: 2,
        path: "new-dir".to_string(),
        attrs: attrs.clone(),
    };

    let expected = BlockBuilder::new()
        .u8(SSH_FXP_MKDIR)
        .u32(2)
        .string("new-dir")
        .attrs(&attrs)
        .framed();
    assert_eq!(packet.to_bytes().unwrap(), expected);
}

#[test]
fn test_name_response_with_two_entries() {
    let file = stat_of_regular_file();
    let dir = FileAttributes::new().with_mode(0o040755);
    let data = BlockBuilder::new()
        .u8(SSH_FXP_NAME)
        .u32(11)
        .u32(2)
        .string("notes.txt")
        .string("-rw-r--r--    1 1000     1000         4096 Sep 13  2020 notes.txt")
        .attrs(&file)
        .string("src")
        .string("drwxr-xr-x    2 1000     1000            0 Sep 13  2020 src")
        .attrs(&dir)
        .framed();

    match ServerPacket::from_bytes(&data).unwrap() {
        ServerPacket::Name { request_id, files } => {
            assert_eq!(request_id, 11);
            assert_eq!(files.len(), 2);
            assert_eq!(files[0].name, "notes.txt");
            assert_eq!(files[0].attrs, file);
            assert_eq!(files[1].name, "src");
            assert!(files[1].attrs.permissions.unwrap().is_dir());
        }
        other => panic!("Expected Name packet, got {:?}", other),
    }
}

#[test]
fn test_attrs_response_with_truncated_block_is_malformed() {
    let data = BlockBuilder::new()
        .u8(SSH_FXP_ATTRS)
        .u32(3)
        .u32(SSH_FILEXFER_ATTR_ACMODTIME)
        .u32(1_600_000_000)
        .framed();

    assert!(matches!(
        ServerPacket::from_bytes(&data),
        Err(SftpError::MalformedAttributes(_))
    ));
}
