//! NSL serialization

use crate::header::NslHeader;
use byteorder::{BigEndian, WriteBytesExt};
use qdct_core::consts::{NSL_HEADER_LEN, NSL_MAGIC, NSL_MAX_DEVICE_ID_LEN};
use qdct_core::{Channel, CompressedBlock, CompressedImage, QdctError, QdctResult};
use std::time::{SystemTime, UNIX_EPOCH};

/// Per-block overhead: x and y
const BLOCK_POSITION_LEN: usize = 4;
/// Per-channel overhead: coefficient count
const CHANNEL_COUNT_LEN: usize = 2;
/// One sparse coefficient: index byte and i16 value
const COEFFICIENT_LEN: usize = 3;

/// Exact number of bytes [`encode`] produces for `image`
pub fn encoded_len(image: &CompressedImage) -> usize {
    let body: usize = image.blocks.iter().map(block_len).sum();
    NSL_HEADER_LEN + image.device_id.len() + 4 + body
}

fn block_len(block: &CompressedBlock) -> usize {
    BLOCK_POSITION_LEN
        + Channel::ALL
            .iter()
            .map(|&c| CHANNEL_COUNT_LEN + COEFFICIENT_LEN * block.non_zero_count(c))
            .sum::<usize>()
}

fn now_unix_seconds() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as u32)
        .unwrap_or(0)
}

/// Serialize `image`, stamping the header with the current UNIX time
pub fn encode(image: &CompressedImage) -> QdctResult<Vec<u8>> {
    encode_with_timestamp(image, now_unix_seconds())
}

fn to_u16(field: &'static str, value: u32) -> QdctResult<u16> {
    u16::try_from(value).map_err(|_| QdctError::ValueOutOfRange {
        field,
        value: value as u64,
        max: u16::MAX as u64,
    })
}

fn to_u32(field: &'static str, value: usize) -> QdctResult<u32> {
    u32::try_from(value).map_err(|_| QdctError::ValueOutOfRange {
        field,
        value: value as u64,
        max: u32::MAX as u64,
    })
}

/// Serialize `image` with a fixed header timestamp
///
/// Rejects anything the decoder would refuse: an empty or over-long device
/// identifier and block positions that do not fit the 16-bit wire fields.
pub fn encode_with_timestamp(image: &CompressedImage, timestamp: u32) -> QdctResult<Vec<u8>> {
    let id = image.device_id.as_bytes();
    if id.is_empty() || id.len() > NSL_MAX_DEVICE_ID_LEN {
        return Err(QdctError::InvalidDeviceIdLength { length: id.len() });
    }
    let block_count = to_u32("block count", image.blocks.len())?;
    let header = NslHeader::for_image(image, timestamp);

    let mut buf = Vec::with_capacity(encoded_len(image));
    buf.write_u32::<BigEndian>(NSL_MAGIC)?;
    buf.write_u32::<BigEndian>(header.version)?;
    buf.write_u32::<BigEndian>(header.width)?;
    buf.write_u32::<BigEndian>(header.height)?;
    buf.write_u32::<BigEndian>(header.compression_level)?;
    buf.write_u32::<BigEndian>(header.timestamp)?;
    buf.write_u32::<BigEndian>(header.original_size)?;
    buf.write_u32::<BigEndian>(id.len() as u32)?;
    buf.extend_from_slice(id);

    buf.write_u32::<BigEndian>(block_count)?;
    for block in &image.blocks {
        buf.write_u16::<BigEndian>(to_u16("block x", block.position.x)?)?;
        buf.write_u16::<BigEndian>(to_u16("block y", block.position.y)?)?;

        for channel in Channel::ALL {
            let coeffs = block.channel(channel);
            buf.write_u16::<BigEndian>(block.non_zero_count(channel) as u16)?;
            for (index, &value) in coeffs.iter().enumerate().filter(|&(_, &v)| v != 0) {
                buf.write_u8(index as u8)?;
                buf.write_i16::<BigEndian>(value)?;
            }
        }
    }

    log::debug!(
        "encoded {} ({}, level {}, {} blocks) into {} bytes",
        image.device_id,
        image.dimensions,
        image.compression_level,
        image.blocks.len(),
        buf.len()
    );
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use qdct_core::{BlockPosition, Dimensions};

    fn sample_image() -> CompressedImage {
        let mut image = CompressedImage::new("DEVICE-001", Dimensions::new(16, 8), 5);
        let mut first = CompressedBlock::new(BlockPosition::new(0, 0));
        first.channel_mut(Channel::Y)[0] = 255;
        first.channel_mut(Channel::Y)[7] = -128;
        first.channel_mut(Channel::Cr)[63] = 42;
        image.blocks.push(first);
        image.blocks.push(CompressedBlock::new(BlockPosition::new(8, 0)));
        image
    }

    #[test]
    fn test_encoded_len_matches_output() {
        let image = sample_image();
        let bytes = encode_with_timestamp(&image, 7).unwrap();
        assert_eq!(bytes.len(), encoded_len(&image));

        // header + id + count + (4 + 2+6 + 2 + 2+3) + (4 + 2 + 2 + 2)
        assert_eq!(encoded_len(&image), 32 + 10 + 4 + 19 + 10);
    }

    #[test]
    fn test_header_layout() {
        let bytes = encode_with_timestamp(&sample_image(), 0xAABB_CCDD).unwrap();
        assert_eq!(&bytes[0..4], &[0x4E, 0x53, 0x4C, 0x00]);
        assert_eq!(&bytes[4..8], &[0, 0, 0, 1]);
        assert_eq!(&bytes[8..12], &[0, 0, 0, 16]);
        assert_eq!(&bytes[12..16], &[0, 0, 0, 8]);
        assert_eq!(&bytes[16..20], &[0, 0, 0, 5]);
        assert_eq!(&bytes[20..24], &[0xAA, 0xBB, 0xCC, 0xDD]);
        assert_eq!(&bytes[24..28], &(16u32 * 8 * 3).to_be_bytes());
        assert_eq!(&bytes[28..32], &[0, 0, 0, 10]);
        assert_eq!(&bytes[32..42], b"DEVICE-001");
        assert_eq!(&bytes[42..46], &[0, 0, 0, 2]);
    }

    #[test]
    fn test_sparse_triples() {
        let bytes = encode_with_timestamp(&sample_image(), 0).unwrap();
        let body = &bytes[46..];
        // position
        assert_eq!(&body[0..4], &[0, 0, 0, 0]);
        // Y: two coefficients, values big-endian two's complement
        assert_eq!(&body[4..6], &[0, 2]);
        assert_eq!(&body[6..9], &[0, 0x00, 0xFF]);
        assert_eq!(&body[9..12], &[7, 0xFF, 0x80]);
        // Cb: none
        assert_eq!(&body[12..14], &[0, 0]);
        // Cr: index 63
        assert_eq!(&body[14..16], &[0, 1]);
        assert_eq!(&body[16..19], &[63, 0x00, 42]);
    }

    #[test]
    fn test_rejects_bad_device_id() {
        let mut image = sample_image();
        image.device_id = String::new();
        assert!(matches!(
            encode(&image),
            Err(QdctError::InvalidDeviceIdLength { length: 0 })
        ));

        image.device_id = "d".repeat(101);
        assert!(matches!(
            encode(&image),
            Err(QdctError::InvalidDeviceIdLength { length: 101 })
        ));

        image.device_id = "d".repeat(100);
        assert!(encode(&image).is_ok());
    }

    #[test]
    fn test_rejects_position_overflow() {
        let mut image = sample_image();
        image.blocks[1].position = BlockPosition::new(70_000, 0);
        let err = encode(&image).unwrap_err();
        assert!(matches!(
            err,
            QdctError::ValueOutOfRange { field: "block x", value: 70_000, .. }
        ));
    }
}
