//! 128-EIA3 integrity algorithm
//!
//! For a message of `L` bits the generator produces `ceil(L / 32) + 2`
//! keystream words `z`. With `W(i)` the 32-bit keystream window starting at
//! bit `i`, the MAC is the XOR of `W(i)` over every set message bit `i`,
//! then `W(L)`, then the last keystream word.

use super::generator::{check_iv, Zuc};
use super::{ZucError, ZucResult, IV_SIZE_128, KEY_SIZE_128};

/// 32-bit keystream window starting `bit` bits into `k0 || k1`.
#[inline]
pub(crate) fn window(k0: u32, k1: u32, bit: usize) -> u32 {
    if bit == 0 {
        k0
    } else {
        (k0 << bit) | (k1 >> (32 - bit))
    }
}

/// Message bytes collected into big-endian 32-bit words.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct WordBuffer {
    buf: [u8; 4],
    len: usize,
}

impl WordBuffer {
    /// Feed `data`, passing every completed word to `block`.
    pub(crate) fn update(&mut self, data: &[u8], mut block: impl FnMut(u32)) {
        let mut data = data;
        if self.len > 0 {
            let n = (4 - self.len).min(data.len());
            self.buf[self.len..self.len + n].copy_from_slice(&data[..n]);
            self.len += n;
            data = &data[n..];
            if self.len < 4 {
                return;
            }
            block(u32::from_be_bytes(self.buf));
            self.len = 0;
        }

        let mut chunks = data.chunks_exact(4);
        for chunk in &mut chunks {
            block(u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]));
        }
        let rest = chunks.remainder();
        self.buf[..rest.len()].copy_from_slice(rest);
        self.len = rest.len();
    }

    /// Feed the first `nbits` bits of `tail` and return the final partial
    /// word, left-aligned, with its length in bits (0..32).
    ///
    /// `nbits` is clamped to the bits actually present in `tail`.
    pub(crate) fn finish(&mut self, tail: &[u8], nbits: usize, block: impl FnMut(u32)) -> (u32, usize) {
        let nbits = clamp_bits(tail, nbits);
        self.update(&tail[..nbits / 8], block);

        let mut last = [0u8; 4];
        last[..self.len].copy_from_slice(&self.buf[..self.len]);
        let mut total = self.len * 8;
        let rbits = nbits % 8;
        if rbits > 0 {
            last[self.len] = tail[nbits / 8] & (0xFF_u8 << (8 - rbits));
            total += rbits;
        }
        (u32::from_be_bytes(last), total)
    }
}

/// Incremental 128-EIA3 MAC.
pub struct ZucMac {
    zuc: Zuc,
    tag: u32,
    /// Keystream word aligned with the next message word.
    k0: u32,
    words: WordBuffer,
}

impl ZucMac {
    /// Create a MAC from a 16-byte key and a 16-byte IV.
    pub fn new(key: &[u8], iv: &[u8]) -> ZucResult<Self> {
        let key = <&[u8; KEY_SIZE_128]>::try_from(key).map_err(|_| {
            log::warn!("EIA3 rejected: key is {} bytes, expected {}", key.len(), KEY_SIZE_128);
            ZucError::InvalidKeySize(key.len())
        })?;
        let iv = check_iv::<IV_SIZE_128>(KEY_SIZE_128, iv)?;
        Ok(Self::from_generator(Zuc::new_128(key, iv)))
    }

    /// Create a 128-EIA3 MAC from the 3GPP bearer parameters.
    pub fn new_eia(key: &[u8; KEY_SIZE_128], count: u32, bearer: u32, direction: u32) -> Self {
        let iv = eia_iv(count, bearer, direction);
        Self::from_generator(Zuc::new_128(key, &iv))
    }

    fn from_generator(mut zuc: Zuc) -> Self {
        let k0 = zuc.next_word();
        Self {
            zuc,
            tag: 0,
            k0,
            words: WordBuffer::default(),
        }
    }

    /// Absorb whole bytes of the message.
    pub fn update(&mut self, data: &[u8]) {
        let mut words = self.words;
        words.update(data, |m| self.block(m));
        self.words = words;
    }

    fn block(&mut self, m: u32) {
        let k1 = self.zuc.next_word();
        self.absorb(m, 32, k1);
        self.k0 = k1;
    }

    /// XOR the window of every set bit among the first `nbits` bits of `m`.
    fn absorb(&mut self, m: u32, nbits: usize, k1: u32) {
        for j in 0..nbits {
            if m & (0x8000_0000 >> j) != 0 {
                self.tag ^= window(self.k0, k1, j);
            }
        }
    }

    /// Finish a message made of whole bytes.
    pub fn finalize(self) -> [u8; 4] {
        self.finalize_bits(&[], 0)
    }

    /// Finish a message whose last `nbits` bits are in `tail`.
    ///
    /// `nbits` is clamped to the bits actually present in `tail`.
    pub fn finalize_bits(mut self, tail: &[u8], nbits: usize) -> [u8; 4] {
        let mut words = self.words;
        let (last, total) = words.finish(tail, nbits, |m| self.block(m));

        let k1 = self.zuc.next_word();
        self.absorb(last, total, k1);
        self.tag ^= window(self.k0, k1, total);
        self.tag ^= if total == 0 { k1 } else { self.zuc.next_word() };
        self.tag.to_be_bytes()
    }
}

/// Limit `nbits` to the bits available in `tail`.
fn clamp_bits(tail: &[u8], nbits: usize) -> usize {
    let available = tail.len() * 8;
    if nbits > available {
        log::warn!("MAC asked for {} tail bits but only {} were given", nbits, available);
        available
    } else {
        nbits
    }
}

/// Build the 128-EIA3 IV from COUNT, BEARER and DIRECTION.
pub fn eia_iv(count: u32, bearer: u32, direction: u32) -> [u8; 16] {
    let mut iv = [0u8; 16];
    let dir = ((direction & 0x1) << 7) as u8;
    iv[..4].copy_from_slice(&count.to_be_bytes());
    iv[4] = ((bearer & 0x1F) << 3) as u8;
    iv[8] = iv[0] ^ dir;
    iv.copy_within(1..6, 9);
    iv[14] = iv[6] ^ dir;
    iv[15] = iv[7];
    iv
}

/// 128-EIA3 - 3GPP integrity algorithm.
///
/// # Arguments
/// * `key` - 128-bit integrity key
/// * `count` - 32-bit COUNT
/// * `bearer` - 5-bit bearer identity
/// * `direction` - 1-bit direction of transmission
/// * `data` - Message
/// * `length` - Message length in bits
///
/// # Returns
/// 32-bit MAC
pub fn eia3(key: &[u8; KEY_SIZE_128], count: u32, bearer: u32, direction: u32, data: &[u8], length: u64) -> [u8; 4] {
    let nbits = usize::try_from(length).unwrap_or(usize::MAX);
    ZucMac::new_eia(key, count, bearer, direction).finalize_bits(data, nbits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eia_iv_layout() {
        let iv = eia_iv(0xA940_59DA, 0x0A, 1);
        assert_eq!(hex::encode(iv), "a94059da50000000294059da50008000");
        let iv = eia_iv(0xA940_59DA, 0x0A, 0);
        assert_eq!(hex::encode(iv), "a94059da50000000a94059da50000000");
    }

    // 128-EIA3 test set 1
    #[test]
    fn test_eia3_test_set_1() {
        let mac = eia3(&[0; 16], 0, 0, 0, &[0; 4], 1);
        assert_eq!(mac, [0xC8, 0xA9, 0x59, 0x5E]);
    }

    // 128-EIA3 test set 2
    #[test]
    fn test_eia3_test_set_2() {
        let key: [u8; 16] = [
            0x47, 0x05, 0x41, 0x25, 0x56, 0x1E, 0xB2, 0xDD,
            0xA9, 0x40, 0x59, 0xDA, 0x05, 0x09, 0x78, 0x50,
        ];
        let mac = eia3(&key, 0x561E_B2DD, 0x14, 0, &[0; 12], 90);
        assert_eq!(mac, [0x67, 0x19, 0xA0, 0x88]);
    }

    // 128-EIA3 test set 3
    #[test]
    fn test_eia3_test_set_3() {
        let key: [u8; 16] = [
            0xC9, 0xE6, 0xCE, 0xC4, 0x60, 0x7C, 0x72, 0xDB,
            0x00, 0x0A, 0xEF, 0xA8, 0x83, 0x85, 0xAB, 0x0A,
        ];
        let message = hex::decode(
            "983b41d47d780c9e1ad11d7eb70391b1de0b35da2dc62f83e7b78d6306ca0ea0\
             7e941b7be91348f9fcb170e2217fecd97f9f68adb16e5d7d21e569d280ed775c\
             ebde3f4093c5388100000000",
        )
        .unwrap();
        let mac = eia3(&key, 0xA940_59DA, 0x0A, 1, &message, 577);
        assert_eq!(mac, [0xFA, 0xE8, 0xFF, 0x0B]);
    }

    #[test]
    fn test_incremental_matches_one_shot() {
        let key = [0x5Cu8; 16];
        let message: Vec<u8> = (0..37u8).map(|b| b.wrapping_mul(29)).collect();
        let expected = eia3(&key, 7, 3, 1, &message, (message.len() * 8) as u64);

        let mut mac = ZucMac::new_eia(&key, 7, 3, 1);
        for piece in [&message[..1], &message[1..6], &message[6..6], &message[6..]] {
            mac.update(piece);
        }
        assert_eq!(mac.finalize(), expected);
    }

    #[test]
    fn test_finalize_bits_ignores_bits_past_length() {
        let key = [0x01u8; 16];
        let a = ZucMac::new_eia(&key, 1, 2, 0).finalize_bits(&[0xA0], 3);
        let b = ZucMac::new_eia(&key, 1, 2, 0).finalize_bits(&[0xBF], 3);
        assert_eq!(a, b);
    }

    #[test]
    fn test_finalize_bits_clamps_to_tail() {
        let key = [0x02u8; 16];
        let a = ZucMac::new_eia(&key, 0, 0, 0).finalize_bits(&[0x12, 0x34], 100);
        let b = ZucMac::new_eia(&key, 0, 0, 0).finalize_bits(&[0x12, 0x34], 16);
        assert_eq!(a, b);
    }

    #[test]
    fn test_mac_depends_on_direction() {
        let key = [0x03u8; 16];
        let data = b"direction matters";
        let up = eia3(&key, 9, 4, 0, data, (data.len() * 8) as u64);
        let down = eia3(&key, 9, 4, 1, data, (data.len() * 8) as u64);
        assert_ne!(up, down);
    }

    #[test]
    fn test_new_rejects_256_bit_key() {
        assert!(matches!(
            ZucMac::new(&[0; 32], &[0; 23]),
            Err(ZucError::InvalidKeySize(32))
        ));
        assert!(matches!(
            ZucMac::new(&[0; 16], &[0; 15]),
            Err(ZucError::InvalidIvSize { key_len: 16, iv_len: 15 })
        ));
    }

    #[test]
    fn test_word_buffer_groups_bytes_across_updates() {
        let mut words = WordBuffer::default();
        let mut seen = Vec::new();
        words.update(&[0x01, 0x02], |w| seen.push(w));
        words.update(&[], |w| seen.push(w));
        words.update(&[0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09], |w| seen.push(w));
        assert_eq!(seen, vec![0x0102_0304, 0x0506_0708]);

        // 0x09 is still buffered; one more byte and three bits follow it
        let (last, total) = words.finish(&[0x0A, 0xFF], 11, |w| seen.push(w));
        assert_eq!(seen.len(), 2);
        assert_eq!(last, 0x090A_E000);
        assert_eq!(total, 19);
    }

    #[test]
    fn test_word_buffer_finish_partial_word() {
        let mut words = WordBuffer::default();
        words.update(&[0xAB], |_| unreachable!());
        let (last, total) = words.finish(&[0xCD, 0xFF], 12, |_| unreachable!());
        assert_eq!(last, 0xABCD_F000);
        assert_eq!(total, 20);
    }

    #[test]
    fn test_window() {
        assert_eq!(window(0x1234_5678, 0x9ABC_DEF0, 0), 0x1234_5678);
        assert_eq!(window(0x1234_5678, 0x9ABC_DEF0, 8), 0x3456_789A);
        assert_eq!(window(0x1234_5678, 0x9ABC_DEF0, 31), 0x4D5E_6F78);
    }
}
