//! Zigzag scanning for DCT coefficients
//!
//! Linearizes an 8x8 block from the DC coefficient to the highest frequency.

/// Standard 8x8 zigzag scan order: zigzag index -> row-major position
pub const ZIGZAG_8X8: [usize; 64] = [
    0, 1, 8, 16, 9, 2, 3, 10, 17, 24, 32, 25, 18, 11, 4, 5, 12, 19, 26, 33, 40, 48, 41, 34, 27, 20,
    13, 6, 7, 14, 21, 28, 35, 42, 49, 56, 57, 50, 43, 36, 29, 22, 15, 23, 30, 37, 44, 51, 58, 59,
    52, 45, 38, 31, 39, 46, 53, 60, 61, 54, 47, 55, 62, 63,
];

/// Inverse zigzag scan order: row-major position -> zigzag index
pub const INV_ZIGZAG_8X8: [usize; 64] = [
    0, 1, 5, 6, 14, 15, 27, 28, 2, 4, 7, 13, 16, 26, 29, 42, 3, 8, 12, 17, 25, 30, 41, 43, 9, 11,
    18, 24, 31, 40, 44, 53, 10, 19, 23, 32, 39, 45, 52, 54, 20, 22, 33, 38, 46, 51, 55, 60, 21,
    34, 37, 47, 50, 56, 59, 61, 35, 36, 48, 49, 57, 58, 62, 63,
];

/// Reorder a row-major 8x8 block into zigzag order
///
/// # Example
/// ```
/// use qdct_transform::zigzag;
///
/// let mut block = [0i16; 64];
/// block[8] = 7; // row 1, column 0
/// assert_eq!(zigzag(&block)[2], 7);
/// ```
pub fn zigzag<T: Copy + Default>(block: &[T; 64]) -> [T; 64] {
    let mut output = [T::default(); 64];
    for (i, &pos) in ZIGZAG_8X8.iter().enumerate() {
        output[i] = block[pos];
    }
    output
}

/// Restore a row-major 8x8 block from zigzag order
pub fn unzigzag<T: Copy + Default>(scanned: &[T; 64]) -> [T; 64] {
    let mut output = [T::default(); 64];
    for (i, &pos) in ZIGZAG_8X8.iter().enumerate() {
        output[pos] = scanned[i];
    }
    output
}
