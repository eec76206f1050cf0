//! Block construction, canonical hashing, and proof-of-work sealing.

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

/// A single sealed entry in a [Ledger](crate::ledger::Ledger).
///
/// The stored `hash` always equals the digest of the five header fields;
/// for non-genesis blocks it additionally carries the leading-zero prefix
/// required by the chain's difficulty.
#[derive(Debug, Clone, Serialize)]
pub struct Block {
    /// Position of this block within the chain (genesis is 0).
    pub index: u64,
    /// Arbitrary structured data recorded by this block.
    pub payload: Value,
    /// Unix timestamp (seconds) at which the block was constructed.
    pub timestamp: i64,
    /// Hash of the preceding block, or `"0"` for the genesis block.
    pub previous_hash: String,
    /// Counter incremented during sealing until the hash meets difficulty.
    pub nonce: u64,
    /// Lowercase hex SHA-256 digest of the other five fields.
    pub hash: String,
}

/// Canonical hashing view of a block header. Field order is fixed by this
/// struct's declaration; payload object keys are serialized in sorted order
/// (serde_json's default map representation), so equal headers always
/// produce equal bytes and distinct headers distinct bytes.
#[derive(Serialize)]
struct HashInput<'a> {
    index: u64,
    payload: &'a Value,
    timestamp: i64,
    previous_hash: &'a str,
    nonce: u64,
}

/// SHA-256 over the canonical encoding of a block header, as lowercase hex.
pub fn digest(
    index: u64,
    payload: &Value,
    timestamp: i64,
    previous_hash: &str,
    nonce: u64,
) -> String {
    let canonical = serde_json::to_vec(&HashInput {
        index,
        payload,
        timestamp,
        previous_hash,
        nonce,
    })
    .expect("block header serializes to canonical json");

    let mut hasher = Sha256::new();
    hasher.update(&canonical);
    hex::encode(hasher.finalize())
}

impl Block {
    /// Creates an unsealed candidate block. Its hash is valid for the
    /// initial nonce of 0 but carries no difficulty prefix until
    /// [Block::seal] is called.
    pub fn candidate(
        index: u64,
        payload: Value,
        timestamp: i64,
        previous_hash: String,
    ) -> Self {
        let hash = digest(index, &payload, timestamp, &previous_hash, 0);
        Block {
            index,
            payload,
            timestamp,
            previous_hash,
            nonce: 0,
            hash,
        }
    }

    /// Creates the chain's first block: index 0, predecessor sentinel `"0"`,
    /// and a fixed informational payload. Genesis is not sealed.
    pub fn genesis(timestamp: i64) -> Self {
        Self::candidate(
            0,
            serde_json::json!({ "info": "genesis" }),
            timestamp,
            "0".to_string(),
        )
    }

    /// Recomputes the digest of this block's current header fields.
    pub fn compute_hash(&self) -> String {
        digest(
            self.index,
            &self.payload,
            self.timestamp,
            &self.previous_hash,
            self.nonce,
        )
    }

    /// Returns true if this block's hash starts with `difficulty` zero hex
    /// characters.
    pub fn meets_difficulty(&self, difficulty: usize) -> bool {
        self.hash.bytes().take(difficulty).all(|b| b == b'0')
    }

    /// Performs the proof-of-work search: increments `nonce` and recomputes
    /// `hash` until the hash meets `difficulty`. CPU-bound with no retry
    /// bound; termination is a probabilistic guarantee of the hash
    /// function's uniformity, not a deterministic one.
    pub fn seal(&mut self, difficulty: usize) {
        while !self.meets_difficulty(difficulty) {
            self.nonce += 1;
            self.hash = self.compute_hash();
        }
        tracing::debug!(
            index = self.index,
            nonce = self.nonce,
            hash = %self.hash,
            "sealed block"
        );
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{digest, Block};

    #[test]
    fn digest_is_deterministic() {
        let payload = json!({ "b": 2, "a": 1 });
        let first = digest(3, &payload, 1_700_000_000, "abc", 42);
        let second = digest(3, &payload, 1_700_000_000, "abc", 42);

        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
    }

    #[test]
    fn digest_depends_on_every_field() {
        let payload = json!({ "k": "v" });
        let base = digest(1, &payload, 10, "prev", 0);

        assert_ne!(base, digest(2, &payload, 10, "prev", 0));
        assert_ne!(base, digest(1, &json!({ "k": "w" }), 10, "prev", 0));
        assert_ne!(base, digest(1, &payload, 11, "prev", 0));
        assert_ne!(base, digest(1, &payload, 10, "other", 0));
        assert_ne!(base, digest(1, &payload, 10, "prev", 1));
    }

    #[test]
    fn stored_hash_matches_recomputation() {
        let mut block =
            Block::candidate(5, json!({ "x": true }), 99, "prev".into());
        assert_eq!(block.hash, block.compute_hash());

        block.seal(1);
        assert_eq!(block.hash, block.compute_hash());
    }

    #[test]
    fn sealing_reaches_the_difficulty_prefix() {
        let mut block =
            Block::candidate(1, json!({ "n": 7 }), 123, "prev".into());
        block.seal(2);

        assert!(block.hash.starts_with("00"));
        assert!(block.meets_difficulty(2));
    }

    #[test]
    fn genesis_shape() {
        let genesis = Block::genesis(1_700_000_000);

        assert_eq!(genesis.index, 0);
        assert_eq!(genesis.previous_hash, "0");
        assert_eq!(genesis.nonce, 0);
        assert_eq!(genesis.hash, genesis.compute_hash());
    }
}
