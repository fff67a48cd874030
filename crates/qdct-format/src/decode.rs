//! NSL parsing with bounds checks on every read

use crate::header::NslHeader;
use byteorder::{BigEndian, ByteOrder};
use qdct_core::consts::{BLOCK_AREA, NSL_HEADER_LEN, NSL_MAGIC, NSL_MAX_DEVICE_ID_LEN, NSL_VERSION};
use qdct_core::{
    BlockPosition, Channel, CompressedBlock, CompressedImage, QdctError, QdctResult,
    TruncationSite,
};

/// Smallest possible encoded block: position plus three empty channel counts
const MIN_BLOCK_LEN: usize = 10;

/// Cursor over an NSL buffer that reports where a short read happened
struct NslReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> NslReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    fn take(&mut self, needed: usize, site: TruncationSite) -> QdctResult<&'a [u8]> {
        if needed > self.remaining() {
            return Err(QdctError::TruncatedFile {
                site,
                offset: self.offset,
                needed,
                remaining: self.remaining(),
            });
        }
        let bytes = &self.data[self.offset..self.offset + needed];
        self.offset += needed;
        Ok(bytes)
    }

    fn read_u16(&mut self, site: TruncationSite) -> QdctResult<u16> {
        Ok(BigEndian::read_u16(self.take(2, site)?))
    }

    fn read_u32(&mut self, site: TruncationSite) -> QdctResult<u32> {
        Ok(BigEndian::read_u32(self.take(4, site)?))
    }
}

/// Parse the fixed header and device identifier
fn read_header(reader: &mut NslReader<'_>) -> QdctResult<NslHeader> {
    let len = reader.remaining();
    if len < NSL_HEADER_LEN {
        return Err(QdctError::TooSmall {
            len,
            min: NSL_HEADER_LEN,
        });
    }

    // The length check above covers every fixed field.
    let fixed = reader.take(NSL_HEADER_LEN, TruncationSite::DeviceId)?;
    let field = |i: usize| BigEndian::read_u32(&fixed[i * 4..i * 4 + 4]);

    let magic = field(0);
    if magic != NSL_MAGIC {
        return Err(QdctError::InvalidMagic {
            found: magic,
            expected: NSL_MAGIC,
        });
    }
    let version = field(1);
    if version != NSL_VERSION {
        return Err(QdctError::UnsupportedVersion(version));
    }

    let id_len = field(7) as usize;
    if id_len == 0 || id_len > NSL_MAX_DEVICE_ID_LEN {
        return Err(QdctError::InvalidDeviceIdLength { length: id_len });
    }
    let id_offset = reader.offset;
    let id_bytes = reader.take(id_len, TruncationSite::DeviceId)?;
    let device_id = std::str::from_utf8(id_bytes)
        .map_err(|_| QdctError::InvalidDeviceId { offset: id_offset })?
        .to_string();

    Ok(NslHeader {
        version,
        width: field(2),
        height: field(3),
        compression_level: field(4),
        timestamp: field(5),
        original_size: field(6),
        device_id,
    })
}

fn read_block(reader: &mut NslReader<'_>, block: usize) -> QdctResult<CompressedBlock> {
    let position = TruncationSite::Position { block };
    let x = reader.read_u16(position)?;
    let y = reader.read_u16(position)?;
    let mut compressed = CompressedBlock::new(BlockPosition::new(x as u32, y as u32));

    for channel in Channel::ALL {
        let count = reader.read_u16(TruncationSite::Count { block, channel })? as usize;
        let data_offset = reader.offset;
        let triples = reader.take(count * 3, TruncationSite::Coefficients { block, channel })?;

        let coeffs = compressed.channel_mut(channel);
        for (i, triple) in triples.chunks_exact(3).enumerate() {
            let index = triple[0];
            if index as usize >= BLOCK_AREA {
                return Err(QdctError::InvalidCoefficientIndex {
                    block,
                    channel,
                    index,
                    offset: data_offset + i * 3,
                });
            }
            coeffs[index as usize] = BigEndian::read_i16(&triple[1..]);
        }
    }
    Ok(compressed)
}

/// Parse an NSL buffer, keeping the informational header fields
pub fn decode_with_header(data: &[u8]) -> QdctResult<(NslHeader, CompressedImage)> {
    let mut reader = NslReader::new(data);
    let header = read_header(&mut reader)?;

    let block_count = reader.read_u32(TruncationSite::BlockCount)? as usize;
    log::trace!(
        "NSL header: {} {}, level {}, {} blocks",
        header.device_id,
        header.dimensions(),
        header.compression_level,
        block_count
    );

    let mut image = CompressedImage::new(
        header.device_id.clone(),
        header.dimensions(),
        header.compression_level,
    );
    image
        .blocks
        .reserve(block_count.min(reader.remaining() / MIN_BLOCK_LEN));
    for block in 0..block_count {
        image.blocks.push(read_block(&mut reader, block)?);
    }

    if reader.remaining() > 0 {
        log::trace!("ignoring {} trailing bytes", reader.remaining());
    }
    log::debug!(
        "decoded {} bytes into {} blocks for {}",
        data.len(),
        image.blocks.len(),
        image.device_id
    );
    Ok((header, image))
}

/// Parse an NSL buffer
pub fn decode(data: &[u8]) -> QdctResult<CompressedImage> {
    decode_with_header(data).map(|(_, image)| image)
}
