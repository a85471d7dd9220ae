// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Digest Recovery from Raw RSA Blocks
//!
//! Servers mint response "signatures" by encrypting an MD5 digest with their
//! private key. How they pad it has varied, so the raw public-key output is run
//! through an ordered list of extraction strategies. Each one either yields a
//! plausible digest string or declines; the first success wins.
//!
//! | Order | Strategy | Looks for |
//! |-------|----------|-----------|
//! | 1 | `oaep_sha1` | OAEP (SHA-1, empty label) encoded block |
//! | 2 | `pkcs1_v15` | `00 01 FF..FF 00 M` or `00 02 PS 00 M`, PS >= 8 bytes |
//! | 3 | `raw_length` | Unpadded digest: 16 raw bytes or 32 hex characters |
//! | 4 | `separator_scan` | Loose `00 01/02 .. 00` separator anywhere in the block |
//!
//! When every strategy declines, the lowercase hex of the whole block is
//! returned. That never equals a fresh MD5, so verification fails closed.
//!
//! This is fragile by nature. Test it against signatures captured from a real
//! server, not only against blocks this crate minted itself.

use sha1::{Digest, Sha1};
use tracing::debug;

const SHA1_LEN: usize = 20;
const MD5_LEN: usize = 16;
const MD5_HEX_LEN: usize = 32;
const SEPARATOR_WINDOW: usize = 100;

/// A single extraction strategy: raw block in, digest string out
pub type DigestStrategy = fn(&[u8]) -> Option<String>;

/// Ordered extraction strategies, tried first to last
pub const STRATEGIES: &[(&str, DigestStrategy)] = &[
    ("oaep_sha1", oaep_sha1),
    ("pkcs1_v15", pkcs1_v15),
    ("raw_length", raw_length),
    ("separator_scan", separator_scan),
];

/// Run every strategy in order and return the first digest found
pub fn recover_digest(raw_block: &[u8]) -> String {
    for (name, strategy) in STRATEGIES {
        if let Some(digest) = strategy(raw_block) {
            debug!("Recovered response digest via {}", name);
            return digest;
        }
    }
    debug!("No digest strategy matched, falling back to raw block hex");
    hex::encode(raw_block)
}

/// Interpret an unpadded payload as an MD5 digest
///
/// Accepts 32 ASCII hex characters (returned lowercased) or 16 raw bytes
/// (returned hex encoded).
fn digest_from_payload(payload: &[u8]) -> Option<String> {
    match payload.len() {
        MD5_HEX_LEN if payload.iter().all(u8::is_ascii_hexdigit) => {
            std::str::from_utf8(payload).ok().map(str::to_ascii_lowercase)
        }
        MD5_LEN => Some(hex::encode(payload)),
        _ => None,
    }
}

fn mgf1_sha1(seed: &[u8], len: usize) -> Vec<u8> {
    let mut mask = Vec::with_capacity(len + SHA1_LEN);
    let mut counter: u32 = 0;
    while mask.len() < len {
        let mut hasher = Sha1::new();
        hasher.update(seed);
        hasher.update(counter.to_be_bytes());
        mask.extend_from_slice(&hasher.finalize());
        counter += 1;
    }
    mask.truncate(len);
    mask
}

/// OAEP decoding with SHA-1 and an empty label (RFC 8017, 7.1.2 step 3)
fn oaep_sha1(block: &[u8]) -> Option<String> {
    let k = block.len();
    if k < 2 * SHA1_LEN + 2 || block[0] != 0x00 {
        return None;
    }

    let (masked_seed, masked_db) = block[1..].split_at(SHA1_LEN);
    let seed_mask = mgf1_sha1(masked_db, SHA1_LEN);
    let seed: Vec<u8> = masked_seed.iter().zip(&seed_mask).map(|(a, b)| a ^ b).collect();
    let db_mask = mgf1_sha1(&seed, masked_db.len());
    let db: Vec<u8> = masked_db.iter().zip(&db_mask).map(|(a, b)| a ^ b).collect();

    let label_hash = Sha1::digest(b"");
    if db[..SHA1_LEN] != label_hash[..] {
        return None;
    }

    let rest = &db[SHA1_LEN..];
    let one = rest.iter().position(|&b| b != 0x00)?;
    if rest[one] != 0x01 {
        return None;
    }
    digest_from_payload(&rest[one + 1..])
}

/// Strict PKCS#1 v1.5 unpadding, block type 1 or 2
fn pkcs1_v15(block: &[u8]) -> Option<String> {
    if block.len() < 11 || block[0] != 0x00 {
        return None;
    }
    let block_type = block[1];
    if block_type != 0x01 && block_type != 0x02 {
        return None;
    }

    let separator = block[2..].iter().position(|&b| b == 0x00)? + 2;
    let padding = &block[2..separator];
    if padding.len() < 8 {
        return None;
    }
    if block_type == 0x01 && padding.iter().any(|&b| b != 0xFF) {
        return None;
    }
    digest_from_payload(&block[separator + 1..])
}

/// Unpadded digest: strip the leading zeros left by the modular result
fn raw_length(block: &[u8]) -> Option<String> {
    let start = block.iter().position(|&b| b != 0x00)?;
    digest_from_payload(&block[start..])
}

/// Loose scan for a `00 01|02` marker followed by a `00` within the window
fn separator_scan(block: &[u8]) -> Option<String> {
    let marker = block
        .windows(2)
        .position(|pair| pair[0] == 0x00 && (pair[1] == 0x01 || pair[1] == 0x02))?;

    let search_from = marker + 2;
    let search_to = block.len().min(marker + SEPARATOR_WINDOW);
    if search_from >= search_to {
        return None;
    }
    let data_start = block[search_from..search_to].iter().position(|&b| b == 0x00)? + search_from + 1;
    if data_start >= block.len() {
        return None;
    }

    let payload = &block[data_start..];
    if let Some(digest) = digest_from_payload(payload) {
        return Some(digest);
    }
    if let Ok(text) = std::str::from_utf8(payload) {
        if text.chars().count() == MD5_HEX_LEN {
            return Some(text.to_string());
        }
    }
    if payload.len() >= MD5_LEN {
        return Some(hex::encode(&payload[..MD5_LEN]));
    }
    None
}
