//! Document keys
//!
//! 12 bytes rendered as 24 lowercase hex characters: a 4-byte big-endian
//! timestamp in seconds, 5 random bytes fixed per generator, and a 3-byte
//! counter starting at a random value.

use std::sync::atomic::{AtomicU32, Ordering};

use chrono::Utc;
use rand::Rng;
use thiserror::Error;

pub const KEY_BYTES: usize = 12;

const COUNTER_MASK: u32 = 0x00ff_ffff;

#[derive(Debug, Error, PartialEq)]
pub enum KeyError {
    #[error("expected {expected} hex characters, got {actual}")]
    Length { expected: usize, actual: usize },

    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),
}

/// Parse a document key, returning it in canonical lowercase form
pub fn parse_key(raw: &str) -> Result<String, KeyError> {
    let raw = raw.trim();
    if raw.len() != KEY_BYTES * 2 {
        return Err(KeyError::Length {
            expected: KEY_BYTES * 2,
            actual: raw.len(),
        });
    }
    let bytes = hex::decode(raw)?;
    Ok(hex::encode(bytes))
}

#[derive(Debug)]
pub struct KeyGenerator {
    process: [u8; 5],
    counter: AtomicU32,
}

impl KeyGenerator {
    pub fn new() -> Self {
        let mut rng = rand::thread_rng();
        Self {
            process: rng.gen(),
            counter: AtomicU32::new(rng.gen::<u32>() & COUNTER_MASK),
        }
    }

    pub fn next_key(&self) -> String {
        let seconds = Utc::now().timestamp() as u32;
        let count = self.counter.fetch_add(1, Ordering::Relaxed) & COUNTER_MASK;

        let mut bytes = [0u8; KEY_BYTES];
        bytes[..4].copy_from_slice(&seconds.to_be_bytes());
        bytes[4..9].copy_from_slice(&self.process);
        bytes[9..].copy_from_slice(&count.to_be_bytes()[1..]);
        hex::encode(bytes)
    }
}

impl Default for KeyGenerator {
    fn default() -> Self {
        Self::new()
    }
}
