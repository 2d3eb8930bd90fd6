mod attribute_blocks;
mod packets;
mod test_utils;
