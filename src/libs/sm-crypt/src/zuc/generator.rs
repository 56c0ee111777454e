//! ZUC keystream generator
//!
//! The generator keeps sixteen 31-bit LFSR cells and the two 32-bit
//! registers of the nonlinear function F. Construction loads the key and
//! IV, runs 32 initialization rounds that feed F back into the LFSR, and
//! one finishing round; after that every call to [`Zuc::next_word`]
//! produces one keystream word.

use super::field::{add31, rotate_left31, MODULUS};
use super::load::{load_key_iv_128, load_key_iv_256};
use super::tables::{D_256, S0, S1};
use super::{ZucError, ZucResult, IV_SIZE_128, IV_SIZE_256, KEY_SIZE_128, KEY_SIZE_256};

/// Number of initialization rounds before the finishing round.
const INIT_ROUNDS: usize = 32;

#[inline]
fn l1(x: u32) -> u32 {
    x ^ x.rotate_left(2) ^ x.rotate_left(10) ^ x.rotate_left(18) ^ x.rotate_left(24)
}

#[inline]
fn l2(x: u32) -> u32 {
    x ^ x.rotate_left(8) ^ x.rotate_left(14) ^ x.rotate_left(22) ^ x.rotate_left(30)
}

/// Substitute the four bytes of `x` (most-significant first) through S0, S1, S0, S1.
#[inline]
fn sbox(x: u32) -> u32 {
    let [a, b, c, d] = x.to_be_bytes();
    u32::from_be_bytes([
        S0[a as usize],
        S1[b as usize],
        S0[c as usize],
        S1[d as usize],
    ])
}

/// ZUC generator state.
///
/// A value of this type is always fully initialized: the constructor runs
/// the whole initialization phase before returning. Every producing method
/// takes `&mut self`, since each word depends on the state left by the
/// previous one.
pub struct Zuc {
    lfsr: [u32; 16],
    r1: u32,
    r2: u32,
}

impl Zuc {
    /// Create a generator from a key and IV.
    ///
    /// Accepted combinations are a 16-byte key with a 16-byte IV (ZUC-128)
    /// and a 32-byte key with a 23-byte IV (ZUC-256).
    pub fn new(key: &[u8], iv: &[u8]) -> ZucResult<Self> {
        if let Ok(key) = <&[u8; KEY_SIZE_128]>::try_from(key) {
            let iv = check_iv::<IV_SIZE_128>(KEY_SIZE_128, iv)?;
            return Ok(Self::new_128(key, iv));
        }
        if let Ok(key) = <&[u8; KEY_SIZE_256]>::try_from(key) {
            let iv = check_iv::<IV_SIZE_256>(KEY_SIZE_256, iv)?;
            return Ok(Self::new_256(key, iv, &D_256));
        }
        log::warn!(
            "ZUC rejected: key is {} bytes, expected {} or {}",
            key.len(),
            KEY_SIZE_128,
            KEY_SIZE_256
        );
        Err(ZucError::InvalidKeySize(key.len()))
    }

    /// ZUC-128 from sized inputs; cannot fail.
    pub(crate) fn new_128(key: &[u8; KEY_SIZE_128], iv: &[u8; IV_SIZE_128]) -> Self {
        let mut zuc = Self::unloaded();
        load_key_iv_128(&mut zuc.lfsr, key, iv);
        zuc.initialize();
        log::debug!("ZUC-128 generator ready");
        zuc
    }

    /// ZUC-256 from sized inputs with the constant row `d`.
    ///
    /// The keystream uses `D_256`; the ZUC-256 MAC picks its row by tag size.
    pub(crate) fn new_256(key: &[u8; KEY_SIZE_256], iv: &[u8; IV_SIZE_256], d: &[u8; 16]) -> Self {
        let mut zuc = Self::unloaded();
        load_key_iv_256(&mut zuc.lfsr, key, iv, d);
        zuc.initialize();
        log::debug!("ZUC-256 generator ready");
        zuc
    }

    fn unloaded() -> Self {
        Self {
            lfsr: [0; 16],
            r1: 0,
            r2: 0,
        }
    }

    /// Produce the next 32-bit keystream word.
    pub fn next_word(&mut self) -> u32 {
        let [x0, x1, x2, x3] = self.bit_reconstruction();
        let z = x3 ^ self.f(x0, x1, x2);
        self.enter_work_mode();
        z
    }

    /// Fill `words` with consecutive keystream words.
    pub fn fill(&mut self, words: &mut [u32]) {
        for word in words.iter_mut() {
            *word = self.next_word();
        }
    }

    /// 32 rounds feeding F back into the LFSR, then the finishing round.
    fn initialize(&mut self) {
        for _ in 0..INIT_ROUNDS {
            let [x0, x1, x2, _] = self.bit_reconstruction();
            let w = self.f(x0, x1, x2);
            self.enter_init_mode(w >> 1);
        }
        let [x0, x1, x2, _] = self.bit_reconstruction();
        self.f(x0, x1, x2);
        self.enter_work_mode();
        log::trace!("ZUC initialization finished after {} rounds", INIT_ROUNDS);
    }

    fn bit_reconstruction(&self) -> [u32; 4] {
        let s = &self.lfsr;
        [
            ((s[15] & 0x7FFF_8000) << 1) | (s[14] & 0xFFFF),
            ((s[11] & 0xFFFF) << 16) | (s[9] >> 15),
            ((s[7] & 0xFFFF) << 16) | (s[5] >> 15),
            ((s[2] & 0xFFFF) << 16) | (s[0] >> 15),
        ]
    }

    /// Nonlinear function F. Returns the word computed from the registers
    /// as they were on entry, then updates R1 and R2.
    fn f(&mut self, x0: u32, x1: u32, x2: u32) -> u32 {
        let w = (self.r1 ^ x0).wrapping_add(self.r2);
        let w1 = self.r1.wrapping_add(x1);
        let w2 = self.r2 ^ x2;
        let u = l1((w1 << 16) | (w2 >> 16));
        let v = l2((w2 << 16) | (w1 >> 16));
        self.r1 = sbox(u);
        self.r2 = sbox(v);
        w
    }

    /// LFSR feedback with injected value `u` (0 in work mode).
    fn enter_init_mode(&mut self, u: u32) {
        let s = &self.lfsr;
        let mut v = s[0];
        v = add31(v, rotate_left31(s[0], 8));
        v = add31(v, rotate_left31(s[4], 20));
        v = add31(v, rotate_left31(s[10], 21));
        v = add31(v, rotate_left31(s[13], 17));
        v = add31(v, rotate_left31(s[15], 15));
        v = add31(v, u);
        if v == 0 {
            v = MODULUS;
        }
        self.lfsr.copy_within(1.., 0);
        self.lfsr[15] = v;
    }

    #[inline]
    fn enter_work_mode(&mut self) {
        self.enter_init_mode(0);
    }

    #[cfg(test)]
    pub(crate) fn lfsr(&self) -> &[u32; 16] {
        &self.lfsr
    }
}

/// Check that `iv` has the length `N` required by a `key_len`-byte key.
pub(crate) fn check_iv<const N: usize>(key_len: usize, iv: &[u8]) -> ZucResult<&[u8; N]> {
    iv.try_into().map_err(|_| {
        log::warn!("ZUC rejected: IV is {} bytes, expected {} for a {}-byte key", iv.len(), N, key_len);
        ZucError::InvalidIvSize { key_len, iv_len: iv.len() }
    })
}
