//! ZUC Stream Cipher
//!
//! Implements the ZUC keystream generator in its two key sizes, and the
//! modes built on it:
//! - ZUC-128: 128-bit key, 128-bit IV
//! - ZUC-256: 256-bit key, 184-bit IV (17 bytes plus eight 6-bit fields,
//!   carried in 23 bytes)
//! - 128-EEA3 confidentiality and a general byte-stream cipher
//! - 128-EIA3 integrity (32-bit MAC)
//! - ZUC-256 MAC with 32/64/128-bit tags
//!
//! References:
//! - ETSI/SAGE Specification of the 3GPP Confidentiality and Integrity
//!   Algorithms 128-EEA3 & 128-EIA3, Document 2: ZUC Specification
//! - GB/T 33133.1-2016
//! - The ZUC-256 Stream Cipher (2018)

use thiserror::Error;

mod eea;
mod eia;
mod eia256;
mod field;
mod generator;
mod load;
mod tables;

pub use eea::{eea3, eea_iv, ZucCipher};
pub use eia::{eia3, eia_iv, ZucMac};
pub use eia256::Zuc256Mac;
pub use generator::Zuc;

/// ZUC-128 key length in bytes
pub const KEY_SIZE_128: usize = 16;
/// ZUC-128 IV length in bytes
pub const IV_SIZE_128: usize = 16;
/// ZUC-256 key length in bytes
pub const KEY_SIZE_256: usize = 32;
/// ZUC-256 IV length in bytes
pub const IV_SIZE_256: usize = 23;

/// ZUC error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ZucError {
    #[error("Invalid key size {0} (expected 16 or 32 bytes)")]
    InvalidKeySize(usize),
    #[error("Invalid IV size {iv_len} for a {key_len}-byte key")]
    InvalidIvSize { key_len: usize, iv_len: usize },
    #[error("Invalid MAC tag size {0} (expected 4, 8 or 16 bytes)")]
    InvalidTagSize(usize),
}

/// Result type for ZUC operations
pub type ZucResult<T> = Result<T, ZucError>;
