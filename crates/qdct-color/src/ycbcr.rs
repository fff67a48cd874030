//! RGB <-> YCbCr (full-range BT.601)

use qdct_core::consts::{BLOCK_SIZE, CHANNEL_CENTER, RGBA_CHANNELS};
use qdct_core::{BlockPosition, Image};

/// Convert 8-bit RGB to YCbCr
pub fn rgb_to_ycbcr(r: f32, g: f32, b: f32) -> (f32, f32, f32) {
    let y = 0.299 * r + 0.587 * g + 0.114 * b;
    let cb = 128.0 - 0.168736 * r - 0.331264 * g + 0.5 * b;
    let cr = 128.0 + 0.5 * r - 0.418688 * g - 0.081312 * b;
    (y, cb, cr)
}

/// Convert YCbCr back to 8-bit RGB, rounding and clamping each channel
pub fn ycbcr_to_rgb(y: f32, cb: f32, cr: f32) -> [u8; 3] {
    let r = y + 1.402 * (cr - 128.0);
    let g = y - 0.344136 * (cb - 128.0) - 0.714136 * (cr - 128.0);
    let b = y + 1.772 * (cb - 128.0);
    [to_u8(r), to_u8(g), to_u8(b)]
}

#[inline]
fn to_u8(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// Centred Y, Cb and Cr samples of one 8x8 block, row-major
pub type YCbCrBlock = [[f32; 64]; 3];

/// Extract the 8x8 block at `position` as centred YCbCr samples
///
/// Pixels outside the image read as Y = Cb = Cr = 0 before centering, so every
/// centred sample there is -128. This is not RGB black: the chroma sits at its
/// minimum rather than at the neutral 128.
pub fn extract_ycbcr_block(image: &Image, position: BlockPosition) -> YCbCrBlock {
    let width = image.width() as usize;
    let height = image.height() as usize;
    let mut block = [[0.0f32; 64]; 3];

    for by in 0..BLOCK_SIZE {
        for bx in 0..BLOCK_SIZE {
            let px = position.x as usize + bx;
            let py = position.y as usize + by;
            let i = by * BLOCK_SIZE + bx;

            let (y, cb, cr) = if px < width && py < height {
                let idx = (py * width + px) * RGBA_CHANNELS;
                let rgb = &image.buffer[idx..idx + 3];
                rgb_to_ycbcr(rgb[0] as f32, rgb[1] as f32, rgb[2] as f32)
            } else {
                (0.0, 0.0, 0.0)
            };

            block[0][i] = y - CHANNEL_CENTER;
            block[1][i] = cb - CHANNEL_CENTER;
            block[2][i] = cr - CHANNEL_CENTER;
        }
    }

    block
}

/// Write centred YCbCr samples into `image` at `position`, clipped at the image bounds
pub fn write_ycbcr_block(image: &mut Image, position: BlockPosition, block: &YCbCrBlock) {
    let width = image.width() as usize;
    let height = image.height() as usize;

    for by in 0..BLOCK_SIZE {
        let py = position.y as usize + by;
        if py >= height {
            break;
        }
        for bx in 0..BLOCK_SIZE {
            let px = position.x as usize + bx;
            if px >= width {
                break;
            }
            let i = by * BLOCK_SIZE + bx;
            let rgb = ycbcr_to_rgb(
                block[0][i] + CHANNEL_CENTER,
                block[1][i] + CHANNEL_CENTER,
                block[2][i] + CHANNEL_CENTER,
            );

            let idx = (py * width + px) * RGBA_CHANNELS;
            image.buffer[idx..idx + 3].copy_from_slice(&rgb);
            image.buffer[idx + 3] = 255;
        }
    }
}
