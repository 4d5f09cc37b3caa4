use byteorder::{BigEndian, ReadBytesExt};
use std::io::Read;

use crate::error::{Error, Result};

/// Newest index format this tool understands. Anything past this is
/// reported as unsupported rather than silently misparsed.
pub const MAX_INDEX_VERSION: u32 = 10;

/// The fixed-size header at the start of a cache2 `index` file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexHeader {
    pub version: u32,
    pub last_write_time: u32,
    pub dirty_flag: u32,
    pub used_cache_size: u32,
}

impl IndexHeader {
    pub const SIZE: usize = 16;

    pub fn read(reader: &mut impl Read) -> Result<Self> {
        let version = reader.read_u32::<BigEndian>()?;
        let last_write_time = reader.read_u32::<BigEndian>()?;
        let dirty_flag = reader.read_u32::<BigEndian>()?;
        let used_cache_size = reader.read_u32::<BigEndian>()?;

        if version > MAX_INDEX_VERSION {
            return Err(Error::UnsupportedIndexVersion(version));
        }

        Ok(IndexHeader {
            version,
            last_write_time,
            dirty_flag,
            used_cache_size,
        })
    }

    /// Number of hash slots recorded after the header, derived from
    /// `used_cache_size`'s encoding of the metadata offset at format time.
    pub fn num_hashes(&self, metadata_offset: u32) -> u32 {
        num_hashes(metadata_offset)
    }

    pub fn hash_size(&self, metadata_offset: u32) -> u32 {
        hash_size(metadata_offset)
    }
}

/// Number of hash slots between a payload of `metadata_offset` bytes and
/// its metadata header: one slot per 256 KiB chunk of payload.
pub fn num_hashes(metadata_offset: u32) -> u32 {
    if metadata_offset == 0 {
        0
    } else {
        (metadata_offset - 1) / 262_144 + 1
    }
}

/// Bytes the hash chunk array occupies between the payload and the
/// metadata header: a 4-byte count field plus 2 bytes per hash slot.
pub fn hash_size(metadata_offset: u32) -> u32 {
    4 + num_hashes(metadata_offset) * 2
}

/// Fields shared by every metadata header version, normalized to a single
/// version-independent shape. `frecency` and `flags` are `None` for
/// version 1/2 entries, which don't carry them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetadataHeader {
    pub version: u32,
    pub access_count: u32,
    pub last_access_time: u32,
    pub last_modified_time: u32,
    pub frecency: Option<u32>,
    pub expiry_time: u32,
    pub key_length: u32,
    pub flags: Option<u32>,
}

impl MetadataHeader {
    pub fn read(reader: &mut impl Read, path: &str) -> Result<Self> {
        let version = reader.read_u32::<BigEndian>()?;

        if version == 1 || version == 2 {
            let access_count = reader.read_u32::<BigEndian>()?;
            let last_access_time = reader.read_u32::<BigEndian>()?;
            let last_modified_time = reader.read_u32::<BigEndian>()?;
            let expiry_time = reader.read_u32::<BigEndian>()?;
            let key_length = reader.read_u32::<BigEndian>()?;

            Ok(MetadataHeader {
                version,
                access_count,
                last_access_time,
                last_modified_time,
                frecency: None,
                expiry_time,
                key_length,
                flags: None,
            })
        } else if version == 3 {
            let access_count = reader.read_u32::<BigEndian>()?;
            let last_access_time = reader.read_u32::<BigEndian>()?;
            let last_modified_time = reader.read_u32::<BigEndian>()?;
            let frecency = reader.read_u32::<BigEndian>()?;
            let expiry_time = reader.read_u32::<BigEndian>()?;
            let key_length = reader.read_u32::<BigEndian>()?;
            let flags = reader.read_u32::<BigEndian>()?;

            Ok(MetadataHeader {
                version,
                access_count,
                last_access_time,
                last_modified_time,
                frecency: Some(frecency),
                expiry_time,
                key_length,
                flags: Some(flags),
            })
        } else {
            Err(Error::UnsupportedMetadataVersion(version, path.to_string()))
        }
    }

    /// Size in bytes of the on-disk header for this version (not
    /// including the trailing key and elements).
    pub const fn size(version: u32) -> usize {
        if version == 3 {
            32
        } else {
            24
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn be_bytes(values: &[u32]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_be_bytes()).collect()
    }

    #[test]
    fn reads_index_header() {
        let data = be_bytes(&[10, 1_614_704_371, 0, 4096]);
        let mut cursor = Cursor::new(data);
        let header = IndexHeader::read(&mut cursor).unwrap();
        assert_eq!(header.version, 10);
        assert_eq!(header.used_cache_size, 4096);
    }

    #[test]
    fn rejects_future_index_version() {
        let data = be_bytes(&[MAX_INDEX_VERSION + 1, 0, 0, 0]);
        let mut cursor = Cursor::new(data);
        assert!(IndexHeader::read(&mut cursor).is_err());
    }

    #[test]
    fn num_hashes_is_zero_with_no_metadata_offset() {
        let data = be_bytes(&[10, 0, 0, 0]);
        let mut cursor = Cursor::new(data);
        let header = IndexHeader::read(&mut cursor).unwrap();
        assert_eq!(header.num_hashes(0), 0);
        assert_eq!(header.hash_size(0), 4);
    }

    #[test]
    fn num_hashes_scales_with_metadata_offset() {
        let data = be_bytes(&[10, 0, 0, 0]);
        let mut cursor = Cursor::new(data);
        let header = IndexHeader::read(&mut cursor).unwrap();
        assert_eq!(header.num_hashes(1), 1);
        assert_eq!(header.num_hashes(262_144), 1);
        assert_eq!(header.num_hashes(262_145), 2);
    }

    #[test]
    fn reads_version_1_metadata_header() {
        let data = be_bytes(&[1, 3, 100, 200, 300, 42]);
        let mut cursor = Cursor::new(data);
        let header = MetadataHeader::read(&mut cursor, "test").unwrap();
        assert_eq!(header.version, 1);
        assert_eq!(header.access_count, 3);
        assert_eq!(header.key_length, 42);
        assert_eq!(header.frecency, None);
        assert_eq!(header.flags, None);
    }

    #[test]
    fn reads_version_3_metadata_header() {
        let data = be_bytes(&[3, 3, 100, 200, 77, 300, 42, 1]);
        let mut cursor = Cursor::new(data);
        let header = MetadataHeader::read(&mut cursor, "test").unwrap();
        assert_eq!(header.version, 3);
        assert_eq!(header.frecency, Some(77));
        assert_eq!(header.flags, Some(1));
        assert_eq!(header.key_length, 42);
    }

    #[test]
    fn rejects_unknown_metadata_version() {
        let data = be_bytes(&[4, 0, 0, 0, 0, 0]);
        let mut cursor = Cursor::new(data);
        assert!(MetadataHeader::read(&mut cursor, "test").is_err());
    }
}
