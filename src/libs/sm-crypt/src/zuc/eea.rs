//! ZUC as a byte stream cipher and 128-EEA3
//!
//! Keystream words are serialized big-endian and XOR-ed into the data, so
//! encryption and decryption are the same operation.

use super::generator::Zuc;
use super::{ZucResult, KEY_SIZE_128};

/// Byte-oriented ZUC stream cipher.
///
/// Successive calls to [`ZucCipher::apply_keystream`] continue the same
/// stream; bytes of a partially used keystream word carry over to the next
/// call.
pub struct ZucCipher {
    zuc: Zuc,
    block: [u8; 4],
    /// Bytes of `block` already used; 4 means none left.
    offset: usize,
}

impl ZucCipher {
    /// Create a cipher from a 16/16 or 32/23 byte key and IV.
    pub fn new(key: &[u8], iv: &[u8]) -> ZucResult<Self> {
        Ok(Self::from_generator(Zuc::new(key, iv)?))
    }

    /// Create a 128-EEA3 cipher from the 3GPP bearer parameters.
    ///
    /// # Arguments
    /// * `key` - 128-bit confidentiality key
    /// * `count` - 32-bit COUNT
    /// * `bearer` - 5-bit bearer identity
    /// * `direction` - 1-bit direction of transmission
    pub fn new_eea(key: &[u8; KEY_SIZE_128], count: u32, bearer: u32, direction: u32) -> Self {
        let iv = eea_iv(count, bearer, direction);
        Self::from_generator(Zuc::new_128(key, &iv))
    }

    fn from_generator(zuc: Zuc) -> Self {
        Self {
            zuc,
            block: [0; 4],
            offset: 4,
        }
    }

    /// XOR the next `data.len()` keystream bytes into `data`.
    pub fn apply_keystream(&mut self, data: &mut [u8]) {
        let mut pos = 0;
        while self.offset < 4 && pos < data.len() {
            data[pos] ^= self.block[self.offset];
            self.offset += 1;
            pos += 1;
        }

        let mut chunks = data[pos..].chunks_exact_mut(4);
        for chunk in &mut chunks {
            let ks = self.zuc.next_word().to_be_bytes();
            for (b, k) in chunk.iter_mut().zip(ks) {
                *b ^= k;
            }
        }

        let rest = chunks.into_remainder();
        if !rest.is_empty() {
            self.block = self.zuc.next_word().to_be_bytes();
            for (b, k) in rest.iter_mut().zip(self.block) {
                *b ^= k;
            }
            self.offset = rest.len();
        }
    }
}

/// Build the 128-EEA3 IV from COUNT, BEARER and DIRECTION.
pub fn eea_iv(count: u32, bearer: u32, direction: u32) -> [u8; 16] {
    let mut iv = [0u8; 16];
    iv[..4].copy_from_slice(&count.to_be_bytes());
    iv[4] = (((bearer & 0x1F) << 3) | ((direction & 0x1) << 2)) as u8;
    iv.copy_within(..8, 8);
    iv
}

/// 128-EEA3 - 3GPP confidentiality algorithm.
///
/// Encrypts or decrypts the first `length` bits of `data` in place. Bits
/// past `length` in the last partial byte are zeroed.
///
/// # Arguments
/// * `key` - 128-bit confidentiality key
/// * `count` - 32-bit COUNT
/// * `bearer` - 5-bit bearer identity
/// * `direction` - 1-bit direction of transmission
/// * `data` - Data to encrypt/decrypt (modified in place)
/// * `length` - Length in bits
pub fn eea3(key: &[u8; KEY_SIZE_128], count: u32, bearer: u32, direction: u32, data: &mut [u8], length: u32) {
    if length == 0 {
        return;
    }

    let nbytes = (length.div_ceil(8) as usize).min(data.len());
    let mut cipher = ZucCipher::new_eea(key, count, bearer, direction);
    cipher.apply_keystream(&mut data[..nbytes]);

    // Zero the unused low bits of the last byte
    let lastbits = (8 - (length % 8)) % 8;
    if lastbits > 0 {
        let byte_idx = (length / 8) as usize;
        if byte_idx < data.len() {
            data[byte_idx] &= 0xFF_u8 << lastbits;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 128-EEA3 test set 1
    const KEY_1: [u8; 16] = [
        0x17, 0x3D, 0x14, 0xBA, 0x50, 0x03, 0x73, 0x1D,
        0x7A, 0x60, 0x04, 0x94, 0x70, 0xF0, 0x0A, 0x29,
    ];

    #[test]
    fn test_eea_iv_layout() {
        let iv = eea_iv(0x6603_5492, 0x0F, 0);
        assert_eq!(
            iv,
            [0x66, 0x03, 0x54, 0x92, 0x78, 0, 0, 0, 0x66, 0x03, 0x54, 0x92, 0x78, 0, 0, 0]
        );
        let iv = eea_iv(0, 0x1F, 1);
        assert_eq!(iv[4], 0xFC);
        assert_eq!(iv[12], 0xFC);
    }

    #[test]
    fn test_eea3_test_set_1() {
        let mut data = hex::decode("6cf65340735552ab0c9752fa6f9025fe0bd675d9005875b200000000").unwrap();
        let expected = hex::decode("a6c85fc66afb8533aafc2518dfe784940ee1e4b030238cc800000000").unwrap();

        eea3(&KEY_1, 0x6603_5492, 0x0F, 0, &mut data, 193);

        assert_eq!(data, expected);
    }

    #[test]
    fn test_eea3_roundtrip() {
        let plaintext = b"ZUC 128-EEA3 confidentiality".to_vec();
        let length = (plaintext.len() * 8) as u32;

        let mut data = plaintext.clone();
        eea3(&KEY_1, 0x1234_5678, 0x15, 1, &mut data, length);
        assert_ne!(data, plaintext);

        eea3(&KEY_1, 0x1234_5678, 0x15, 1, &mut data, length);
        assert_eq!(data, plaintext);
    }

    #[test]
    fn test_eea3_empty() {
        let mut data: [u8; 0] = [];
        eea3(&KEY_1, 0, 0, 0, &mut data, 0);
    }

    #[test]
    fn test_eea3_non_byte_aligned() {
        let mut data = [0xFFu8, 0xFF, 0xFF];
        eea3(&KEY_1, 0, 0, 0, &mut data, 13);
        // Bits past 13 are cleared, the third byte is untouched
        assert_eq!(data[1] & 0x07, 0);
        assert_eq!(data[2], 0xFF);
    }

    #[test]
    fn test_cipher_matches_generator_words() {
        let key = [0x11u8; 32];
        let iv = [0x22u8; 23];
        let mut zuc = Zuc::new(&key, &iv).unwrap();
        let mut expected = Vec::new();
        for _ in 0..4 {
            expected.extend_from_slice(&zuc.next_word().to_be_bytes());
        }

        let mut cipher = ZucCipher::new(&key, &iv).unwrap();
        let mut data = [0u8; 16];
        cipher.apply_keystream(&mut data);
        assert_eq!(data.to_vec(), expected);
    }

    #[test]
    fn test_cipher_chunked_matches_one_shot() {
        let key = [0x42u8; 16];
        let iv = [0x24u8; 16];
        let plaintext: Vec<u8> = (0..100u8).collect();

        let mut whole = plaintext.clone();
        ZucCipher::new(&key, &iv).unwrap().apply_keystream(&mut whole);

        let mut pieces = plaintext.clone();
        let mut cipher = ZucCipher::new(&key, &iv).unwrap();
        let mut start = 0;
        for len in [1usize, 3, 0, 5, 4, 7, 2, 78] {
            cipher.apply_keystream(&mut pieces[start..start + len]);
            start += len;
        }
        assert_eq!(start, plaintext.len());
        assert_eq!(pieces, whole);
    }

    #[test]
    fn test_new_eea_matches_explicit_iv() {
        let iv = eea_iv(0x0102_0304, 0x0A, 1);
        let mut a = [0u8; 12];
        let mut b = [0u8; 12];
        ZucCipher::new_eea(&KEY_1, 0x0102_0304, 0x0A, 1).apply_keystream(&mut a);
        ZucCipher::new(&KEY_1, &iv).unwrap().apply_keystream(&mut b);
        assert_eq!(a, b);
    }

    #[test]
    fn test_cipher_rejects_bad_sizes() {
        assert!(ZucCipher::new(&[0; 20], &[0; 16]).is_err());
        assert!(ZucCipher::new(&[0; 32], &[0; 16]).is_err());
    }
}
