//! Session ids and style identifiers.
//!
//! Two identity schemes live here:
//!
//! - **Session ids**: stable within one editing session, assigned to every
//!   node on attach. Seeded from the page identifier (CRC32) with a
//!   sequential counter, so ids are deterministic per load order.
//! - **Style identifiers**: globally unique CSS classes in the persisted
//!   format `ID` + 14 uppercase base-36 characters. They survive save/load
//!   round-trips as plain classes and are recognized by prefix and length,
//!   so a previously persisted identifier is reused instead of re-minted.

use crc32fast::Hasher;
use std::time::{SystemTime, UNIX_EPOCH};

/// Length of the random part of a style identifier.
const STYLE_ID_SUFFIX_LEN: usize = 14;

/// Sequential session-id generator, seeded per page.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    seed: String,
    count: u32,
}

impl IdGenerator {
    pub fn new(page_key: &str) -> Self {
        let mut hasher = Hasher::new();
        hasher.update(page_key.as_bytes());
        Self {
            seed: format!("{:x}", hasher.finalize()),
            count: 0,
        }
    }

    /// Generate the next sequential id.
    pub fn new_id(&mut self) -> String {
        self.count += 1;
        format!("{}-{}", self.seed, self.count)
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }
}

/// Mints `ID[A-Z0-9]{14}` style-identifier classes.
#[derive(Debug, Default)]
pub struct StyleIdGenerator {
    count: u32,
}

impl StyleIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint a fresh style identifier.
    ///
    /// The suffix combines the current time with a per-session counter so
    /// identifiers minted across sessions do not collide on the same page.
    pub fn mint(&mut self) -> String {
        self.count += 1;

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();

        let mut hasher = Hasher::new();
        hasher.update(&now.subsec_nanos().to_le_bytes());
        hasher.update(&self.count.to_le_bytes());

        let mut suffix = to_base36_upper(now.as_millis() as u64);
        suffix.push_str(&format!("{:08X}", hasher.finalize()));
        suffix.truncate(STYLE_ID_SUFFIX_LEN);
        while suffix.len() < STYLE_ID_SUFFIX_LEN {
            suffix.push('0');
        }

        format!("ID{}", suffix)
    }
}

/// Whether a CSS class is a persisted style identifier.
pub fn is_style_identifier(class: &str) -> bool {
    class.len() == 2 + STYLE_ID_SUFFIX_LEN
        && class.starts_with("ID")
        && class[2..]
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
}

fn to_base36_upper(mut value: u64) -> String {
    const DIGITS: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}
