use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// `previous_hash` carried by the genesis block.
pub const GENESIS_PREVIOUS_HASH: &str = "1";

/// Proof stored in the genesis block.
pub const GENESIS_PROOF: u64 = 100;

/// Sender used for mining rewards.
pub const REWARD_SENDER: &str = "0";

/// Amount paid to the miner of each block.
pub const MINING_REWARD: u64 = 1;

/// A value transfer waiting in the pool or sealed in a block.
/// Identifiers are free-form strings; nothing about them is checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub sender: String,
    pub recipient: String,
    pub amount: u64,
}

impl Transaction {
    pub fn new(sender: impl Into<String>, recipient: impl Into<String>, amount: u64) -> Self {
        Self {
            sender: sender.into(),
            recipient: recipient.into(),
            amount,
        }
    }

    /// The reward transaction credited to `miner` when a block is sealed.
    pub fn reward(miner: impl Into<String>) -> Self {
        Self::new(REWARD_SENDER, miner, MINING_REWARD)
    }
}

/// A block of the chain. The field order below is the order used when
/// hashing, so it must not change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,     // 1-based position in the chain
    pub timestamp: i64, // Unix timestamp (UTC)
    pub transactions: Vec<Transaction>,
    pub proof: u64,
    pub previous_hash: String,
}

impl Block {
    /// Build a block stamped with the current time.
    pub fn new(
        index: u64,
        transactions: Vec<Transaction>,
        proof: u64,
        previous_hash: String,
    ) -> Self {
        Self::new_with_timestamp(
            index,
            transactions,
            proof,
            previous_hash,
            Utc::now().timestamp(),
        )
    }

    pub fn new_with_timestamp(
        index: u64,
        transactions: Vec<Transaction>,
        proof: u64,
        previous_hash: String,
        timestamp: i64,
    ) -> Self {
        Self {
            index,
            timestamp,
            transactions,
            proof,
            previous_hash,
        }
    }

    /// SHA-256 of the block, hex encoded.
    ///
    /// The preimage is the compact JSON encoding of the struct, which serde
    /// emits in declaration order, so equal field values always give the
    /// same digest regardless of the process that computes it.
    pub fn hash(&self) -> String {
        let preimage = serde_json::to_vec(self).expect("block fields are always serializable");
        hash_hex(&preimage)
    }
}

/// Hex-encoded SHA-256 of arbitrary bytes.
pub fn hash_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::{Block, Transaction, hash_hex};

    fn sample() -> Block {
        Block::new_with_timestamp(
            2,
            vec![
                Transaction::new("a", "b", 10),
                Transaction::reward("miner1"),
            ],
            35293,
            "abc".into(),
            1_700_000_000,
        )
    }

    #[test]
    fn hash_is_deterministic() {
        let b = sample();
        assert_eq!(b.hash(), b.hash());
        assert_eq!(b.hash(), b.clone().hash());
        assert_eq!(b.hash().len(), 64);
    }

    #[test]
    fn hash_covers_every_field() {
        let base = sample().hash();

        let mut b = sample();
        b.index = 3;
        assert_ne!(base, b.hash());

        let mut b = sample();
        b.timestamp += 1;
        assert_ne!(base, b.hash());

        let mut b = sample();
        b.transactions[0].amount = 11;
        assert_ne!(base, b.hash());

        let mut b = sample();
        b.transactions.swap(0, 1);
        assert_ne!(base, b.hash());

        let mut b = sample();
        b.proof += 1;
        assert_ne!(base, b.hash());

        let mut b = sample();
        b.previous_hash = "abd".into();
        assert_ne!(base, b.hash());
    }

    #[test]
    fn preimage_uses_fixed_field_order() {
        let b = Block::new_with_timestamp(1, vec![], 100, "1".into(), 5);
        let expected = hash_hex(
            br#"{"index":1,"timestamp":5,"transactions":[],"proof":100,"previous_hash":"1"}"#,
        );
        assert_eq!(b.hash(), expected);
    }

    #[test]
    fn hash_hex_matches_known_vector() {
        assert_eq!(
            hash_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
