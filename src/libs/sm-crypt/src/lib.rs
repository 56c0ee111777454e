//! sm-crypt Cryptographic Library
//!
//! This crate provides the ZUC stream cipher family: the keystream
//! generator (ZUC-128 and ZUC-256), the 128-EEA3/128-EIA3 algorithms used
//! in 3GPP networks, and the ZUC-256 MAC.

pub mod zuc;        // ZUC keystream generator, EEA3, EIA3, ZUC-256 MAC

pub use zuc::{Zuc, ZucError, ZucResult};
