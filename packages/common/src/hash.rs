//! Hash computation for deterministic cross-chain identifiers.
//!
//! Both chains must derive the same order id, pool id and escrow address from
//! the same inputs. Every id is a keccak256 digest over length-prefixed parts
//! so that two different part lists can never produce the same preimage.
//!
//! # Byte Layout
//! For each part, in order:
//! - Bytes 0-7:  part length (u64, big-endian)
//! - Bytes 8-..: part bytes

use tiny_keccak::{Hasher, Keccak};

/// Compute keccak256 hash of arbitrary data
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    hasher.update(data);
    let mut output = [0u8; 32];
    hasher.finalize(&mut output);
    output
}

/// Hash a list of parts, each prefixed with its length.
pub fn hash_parts(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    for part in parts {
        hasher.update(&(part.len() as u64).to_be_bytes());
        hasher.update(part);
    }
    let mut output = [0u8; 32];
    hasher.finalize(&mut output);
    output
}

/// Derive a lowercase hex identifier from length-prefixed parts.
pub fn derive_id(parts: &[&[u8]]) -> String {
    hex::encode(hash_parts(parts))
}

/// Convert bytes to a 0x-prefixed hex string
pub fn bytes_to_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keccak256_empty() {
        // keccak256("") = c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470
        let hash = keccak256(b"");
        assert_eq!(
            bytes_to_hex(&hash),
            "0xc5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn test_derive_id_is_deterministic() {
        let a = derive_id(&[b"channel-0", b"order"]);
        let b = derive_id(&[b"channel-0", b"order"]);
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_length_prefix_separates_parts() {
        // Without length prefixes these two part lists would share a preimage.
        let a = derive_id(&[b"ab", b"c"]);
        let b = derive_id(&[b"a", b"bc"]);
        assert_ne!(a, b);
    }
}
