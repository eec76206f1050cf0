//! An append-only chain of proof-of-work sealed blocks.

use chrono::Utc;
use serde_json::Value;

use crate::block::Block;

/// Default number of leading `'0'` hex characters a sealed hash must carry
/// (an expected ~16^4 digest trials per appended block).
pub const DEFAULT_DIFFICULTY: usize = 4;

/// Violations reported by [Ledger::verify], each naming the offending
/// block's index.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("block {0} does not reproduce its stored hash")]
    HashMismatch(u64),
    #[error("block {0} does not reference its predecessor's hash")]
    BrokenLink(u64),
    #[error("block {0} does not meet the difficulty prefix")]
    DifficultyNotMet(u64),
}

/// Ordered, append-only sequence of [Block]s.
///
/// The ledger exclusively owns its blocks: once appended they are never
/// mutated or removed, and every non-genesis block references its
/// predecessor's hash. Mutation goes through `&mut self`, so a single
/// writer is enforced by the borrow checker; callers that need concurrent
/// access wrap the ledger in a `Mutex` and keep the append path a critical
/// section, since blocks must chain in strict index order.
#[derive(Debug, Clone)]
pub struct Ledger {
    blocks: Vec<Block>,
    difficulty: usize,
}

impl Ledger {
    /// Creates a ledger containing only the genesis block, sealed at
    /// [DEFAULT_DIFFICULTY].
    pub fn new() -> Self {
        Self::with_difficulty(DEFAULT_DIFFICULTY)
    }

    /// Creates a ledger with a custom difficulty. Genesis is exempt from
    /// the difficulty predicate; every appended block must satisfy it.
    pub fn with_difficulty(difficulty: usize) -> Self {
        Ledger {
            blocks: vec![Block::genesis(Utc::now().timestamp())],
            difficulty,
        }
    }

    /// Appends `payload` as a new sealed block and returns it.
    ///
    /// The candidate block references the current tail's hash, then runs
    /// the proof-of-work search until its hash meets this ledger's
    /// difficulty. No failure mode: the operation performs no I/O, but its
    /// latency is unbounded in the worst case and grows geometrically with
    /// difficulty.
    pub fn append(&mut self, payload: Value) -> &Block {
        let mut block = Block::candidate(
            self.blocks.len() as u64,
            payload,
            Utc::now().timestamp(),
            self.last_block().hash.clone(),
        );
        block.seal(self.difficulty);

        self.blocks.push(block);
        self.blocks.last().expect("chain is never empty")
    }

    /// Returns the chain's tail block.
    pub fn last_block(&self) -> &Block {
        self.blocks.last().expect("chain is never empty")
    }

    /// All blocks in chain order, genesis first.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Number of blocks on the chain, genesis included.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Always false: a ledger holds at least its genesis block.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn difficulty(&self) -> usize {
        self.difficulty
    }

    /// Audits the whole chain: every stored hash must reproduce from its
    /// header fields, every non-genesis block must link to its
    /// predecessor's hash and carry the difficulty prefix.
    pub fn verify(&self) -> Result<(), LedgerError> {
        for (i, block) in self.blocks.iter().enumerate() {
            if block.hash != block.compute_hash() {
                return Err(LedgerError::HashMismatch(block.index));
            }
            if i > 0 {
                if block.previous_hash != self.blocks[i - 1].hash {
                    return Err(LedgerError::BrokenLink(block.index));
                }
                if !block.meets_difficulty(self.difficulty) {
                    return Err(LedgerError::DifficultyNotMet(block.index));
                }
            }
        }

        Ok(())
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}
