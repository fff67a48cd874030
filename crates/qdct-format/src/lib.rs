//! NSL container format
//!
//! A big-endian binary file holding one device's compressed image. The header
//! carries the image geometry and the device identifier needed to rebuild the
//! device's quantization matrix; the body lists every block with only its
//! non-zero coefficients.
//!
//! ```text
//! magic:u32 version:u32 width:u32 height:u32 level:u32 timestamp:u32
//! original_size:u32 id_len:u32 id[id_len]
//! block_count:u32
//!   x:u16 y:u16 { count:u16 (index:u8 value:i16)[count] } x 3 (Y, Cb, Cr)
//! ```

pub mod decode;
pub mod encode;
pub mod file;
pub mod header;

pub use decode::{decode, decode_with_header};
pub use encode::{encode, encode_with_timestamp, encoded_len};
pub use file::{nsl_filename, read_nsl, read_nsl_file, write_nsl, write_nsl_file};
pub use header::NslHeader;
