//! Reading and writing NSL files

use crate::{decode, encode};
use qdct_core::{CompressedImage, QdctResult};
use std::fs;
use std::io::{Read, Write};
use std::path::Path;

/// Write `image` as NSL to `writer`, returning the number of bytes written
pub fn write_nsl<W: Write>(mut writer: W, image: &CompressedImage) -> QdctResult<usize> {
    let bytes = encode(image)?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(bytes.len())
}

/// Read one NSL image from `reader`, consuming it to the end
pub fn read_nsl<R: Read>(mut reader: R) -> QdctResult<CompressedImage> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    decode(&bytes)
}

pub fn write_nsl_file<P: AsRef<Path>>(path: P, image: &CompressedImage) -> QdctResult<usize> {
    let bytes = encode(image)?;
    fs::write(path.as_ref(), &bytes)?;
    log::debug!("wrote {} bytes to {}", bytes.len(), path.as_ref().display());
    Ok(bytes.len())
}

pub fn read_nsl_file<P: AsRef<Path>>(path: P) -> QdctResult<CompressedImage> {
    let bytes = fs::read(path.as_ref())?;
    decode(&bytes)
}

/// Conventional export name: `{device}_L{level}_{timestamp}.nsl`
///
/// Characters that are unsafe in file names (path separators, `:` and
/// control characters) are replaced with `-`.
pub fn nsl_filename(device_id: &str, compression_level: u32, timestamp: u32) -> String {
    let device: String = device_id
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '-',
            c if c.is_control() => '-',
            c => c,
        })
        .collect();
    format!("{}_L{}_{}.nsl", device, compression_level, timestamp)
}
