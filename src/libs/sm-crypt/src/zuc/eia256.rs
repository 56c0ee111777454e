//! ZUC-256 MAC
//!
//! Tags of 32, 64 or 128 bits. The tag size picks the loading constants,
//! so the three sizes run on unrelated keystreams. For a `t`-bit tag the
//! first `t` keystream bits seed the tag, every set message bit `i` XORs
//! the window `z[t + i .. 2t + i)`, and the window at `t + L` closes it.

use super::eia::{window, WordBuffer};
use super::generator::{check_iv, Zuc};
use super::tables::D_256_MAC;
use super::{ZucError, ZucResult, IV_SIZE_256, KEY_SIZE_256};

/// Largest tag in 32-bit words.
const MAX_TAG_WORDS: usize = 4;

/// Incremental ZUC-256 MAC.
pub struct Zuc256Mac {
    zuc: Zuc,
    tag_words: usize,
    tag: [u32; MAX_TAG_WORDS],
    /// Keystream words starting at the one aligned with the next message
    /// word; `tag_words + 1` of them are live.
    ks: [u32; MAX_TAG_WORDS + 1],
    words: WordBuffer,
}

impl Zuc256Mac {
    /// Create a MAC from a 32-byte key, a 23-byte IV and a tag size in
    /// bytes (4, 8 or 16).
    pub fn new(key: &[u8], iv: &[u8], tag_size: usize) -> ZucResult<Self> {
        let d = match tag_size {
            4 => &D_256_MAC[0],
            8 => &D_256_MAC[1],
            16 => &D_256_MAC[2],
            _ => {
                log::warn!("ZUC-256 MAC rejected: tag size {} bytes", tag_size);
                return Err(ZucError::InvalidTagSize(tag_size));
            }
        };
        let key = <&[u8; KEY_SIZE_256]>::try_from(key).map_err(|_| {
            log::warn!("ZUC-256 MAC rejected: key is {} bytes, expected {}", key.len(), KEY_SIZE_256);
            ZucError::InvalidKeySize(key.len())
        })?;
        let iv = check_iv::<IV_SIZE_256>(KEY_SIZE_256, iv)?;

        let mut zuc = Zuc::new_256(key, iv, d);
        let tag_words = tag_size / 4;
        let mut tag = [0u32; MAX_TAG_WORDS];
        zuc.fill(&mut tag[..tag_words]);
        let mut ks = [0u32; MAX_TAG_WORDS + 1];
        zuc.fill(&mut ks[..=tag_words]);

        log::debug!("ZUC-256 MAC ready ({}-bit tag)", tag_size * 8);
        Ok(Self {
            zuc,
            tag_words,
            tag,
            ks,
            words: WordBuffer::default(),
        })
    }

    /// Tag size in bytes.
    pub fn tag_size(&self) -> usize {
        self.tag_words * 4
    }

    /// Absorb whole bytes of the message.
    pub fn update(&mut self, data: &[u8]) {
        let mut words = self.words;
        words.update(data, |m| self.block(m));
        self.words = words;
    }

    fn block(&mut self, m: u32) {
        self.absorb(m, 32);
        let n = self.tag_words;
        self.ks.copy_within(1..=n, 0);
        self.ks[n] = self.zuc.next_word();
    }

    fn absorb(&mut self, m: u32, nbits: usize) {
        for j in 0..nbits {
            if m & (0x8000_0000 >> j) != 0 {
                self.xor_window(j);
            }
        }
    }

    fn xor_window(&mut self, bit: usize) {
        for w in 0..self.tag_words {
            self.tag[w] ^= window(self.ks[w], self.ks[w + 1], bit);
        }
    }

    /// Finish a message made of whole bytes.
    pub fn finalize(self) -> Vec<u8> {
        self.finalize_bits(&[], 0)
    }

    /// Finish a message whose last `nbits` bits are in `tail`.
    ///
    /// `nbits` is clamped to the bits actually present in `tail`.
    pub fn finalize_bits(mut self, tail: &[u8], nbits: usize) -> Vec<u8> {
        let mut words = self.words;
        let (last, total) = words.finish(tail, nbits, |m| self.block(m));

        self.absorb(last, total);
        self.xor_window(total);
        self.tag[..self.tag_words]
            .iter()
            .flat_map(|w| w.to_be_bytes())
            .collect()
    }
}
