//! Key/IV loading schedules
//!
//! Both schedules fill the sixteen 31-bit LFSR cells directly from the
//! key, the IV and a row of domain-separation constants.
//!
//! - ZUC-128: `s_i = k_i || d_i || iv_i` (8 + 15 + 8 bits).
//! - ZUC-256: `s_i = a_i || (d_i | e_i) || b_i || c_i` (8 + 7 + 8 + 8 bits),
//!   where the sources of `a`, `e`, `b` and `c` come from [`ZUC256_LAYOUT`].

use super::tables::KD;

/// Where one field of a ZUC-256 cell is taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Source {
    /// Full key byte `k[n]`.
    Key(usize),
    /// Full IV byte `iv[n]`, `n` in `0..17`.
    Iv(usize),
    /// Six-bit IV field `iv[n]`, `n` in `17..25`, unpacked from IV bytes 17..23.
    IvSix(usize),
    /// High nibble of key byte 31.
    KeyHigh4,
    /// Low nibble of key byte 31.
    KeyLow4,
}

/// Field sources of one ZUC-256 LFSR cell.
#[derive(Debug, Clone, Copy)]
pub(crate) struct CellLayout {
    /// Bits 30..23.
    pub(crate) high: Source,
    /// OR-ed into the constant in bits 22..16.
    pub(crate) extra: Option<Source>,
    /// Bits 15..8.
    pub(crate) mid: Source,
    /// Bits 7..0.
    pub(crate) low: Source,
}

const fn cell(high: Source, extra: Option<Source>, mid: Source, low: Source) -> CellLayout {
    CellLayout { high, extra, mid, low }
}

use Source::{Iv, IvSix, Key, KeyHigh4, KeyLow4};

/// Per-cell assembly table of the ZUC-256 key/IV loading.
pub(crate) static ZUC256_LAYOUT: [CellLayout; 16] = [
    cell(Key(0), None, Key(21), Key(16)),
    cell(Key(1), None, Key(22), Key(17)),
    cell(Key(2), None, Key(23), Key(18)),
    cell(Key(3), None, Key(24), Key(19)),
    cell(Key(4), None, Key(25), Key(20)),
    cell(Iv(0), Some(IvSix(17)), Key(5), Key(26)),
    cell(Iv(1), Some(IvSix(18)), Key(6), Key(27)),
    cell(Iv(10), Some(IvSix(19)), Key(7), Iv(2)),
    cell(Key(8), Some(IvSix(20)), Iv(3), Iv(11)),
    cell(Key(9), Some(IvSix(21)), Iv(12), Iv(4)),
    cell(Iv(5), Some(IvSix(22)), Key(10), Key(28)),
    cell(Key(11), Some(IvSix(23)), Iv(6), Iv(13)),
    cell(Key(12), Some(IvSix(24)), Iv(7), Iv(14)),
    cell(Key(13), None, Iv(15), Iv(8)),
    cell(Key(14), Some(KeyHigh4), Iv(16), Iv(9)),
    cell(Key(15), Some(KeyLow4), Key(30), Key(29)),
];

/// Number of whole IV bytes used by the ZUC-256 loading.
const IV_FULL_BYTES: usize = 17;

/// Split IV bytes 17..23 (48 bits) into the eight 6-bit fields iv17..iv24.
fn unpack_iv_tail(iv: &[u8; 23]) -> [u8; 8] {
    let bits = iv[IV_FULL_BYTES..]
        .iter()
        .fold(0u64, |acc, &b| (acc << 8) | b as u64);
    let mut fields = [0u8; 8];
    for (i, field) in fields.iter_mut().enumerate() {
        *field = ((bits >> (42 - 6 * i)) & 0x3F) as u8;
    }
    fields
}

#[inline]
fn make_cell3(a: u32, b: u32, c: u32) -> u32 {
    (a << 23) | (b << 8) | c
}

#[inline]
fn make_cell4(a: u32, b: u32, c: u32, d: u32) -> u32 {
    (a << 23) | (b << 16) | (c << 8) | d
}

/// Load a 16-byte key and 16-byte IV.
pub(crate) fn load_key_iv_128(lfsr: &mut [u32; 16], key: &[u8; 16], iv: &[u8; 16]) {
    for (i, cell) in lfsr.iter_mut().enumerate() {
        *cell = make_cell3(key[i] as u32, KD[i] as u32, iv[i] as u32);
    }
}

/// Load a 32-byte key and 23-byte IV with the constant row `d`.
pub(crate) fn load_key_iv_256(lfsr: &mut [u32; 16], key: &[u8; 32], iv: &[u8; 23], d: &[u8; 16]) {
    let iv_tail = unpack_iv_tail(iv);
    let byte = |src: Source| -> u32 {
        match src {
            Key(n) => key[n] as u32,
            Iv(n) => iv[n] as u32,
            IvSix(n) => iv_tail[n - IV_FULL_BYTES] as u32,
            KeyHigh4 => (key[31] >> 4) as u32,
            KeyLow4 => (key[31] & 0x0F) as u32,
        }
    };

    for (i, (cell, layout)) in lfsr.iter_mut().zip(ZUC256_LAYOUT.iter()).enumerate() {
        let constant = d[i] as u32 | layout.extra.map_or(0, byte);
        *cell = make_cell4(byte(layout.high), constant, byte(layout.mid), byte(layout.low));
    }
}
