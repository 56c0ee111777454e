//! Arithmetic in GF(2^31 - 1)
//!
//! LFSR cells are 31-bit elements of the prime field modulo 2^31 - 1.
//! Multiplication by a power of two is a 31-bit rotation and addition
//! folds the carry out of bit 31 back into bit 0.

/// The modulus 2^31 - 1, also the all-ones 31-bit mask.
pub(crate) const MODULUS: u32 = 0x7FFF_FFFF;

/// Rotate the low 31 bits of `x` left by `k` (multiplication by 2^k).
///
/// `k` must lie in `1..31`.
#[inline]
pub(crate) fn rotate_left31(x: u32, k: u32) -> u32 {
    ((x << k) | (x >> (31 - k))) & MODULUS
}

/// Add two field elements with end-around carry.
///
/// Both operands are below 2^31, so the raw sum fits in 32 bits and a
/// single fold fully reduces it.
#[inline]
pub(crate) fn add31(x: u32, y: u32) -> u32 {
    let sum = x.wrapping_add(y);
    (sum & MODULUS) + (sum >> 31)
}
