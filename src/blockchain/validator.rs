use super::{Block, pow};
use crate::error::{LedgerError, Result};

/// Checks that a chain is internally consistent: every block points at
/// the hash of its predecessor and carries a proof solving the puzzle set
/// by the predecessor's proof. The genesis block is taken as given.
#[derive(Debug, Clone, Copy)]
pub struct ChainValidator {
    difficulty: u32,
}

impl ChainValidator {
    pub fn new(difficulty: u32) -> Self {
        Self { difficulty }
    }

    pub fn is_valid(&self, chain: &[Block]) -> bool {
        self.validate(chain).is_ok()
    }

    /// Like [`is_valid`](Self::is_valid) but reports the first broken link.
    /// Every adjacent pair of `chain` is checked, however long it is.
    pub fn validate(&self, chain: &[Block]) -> Result<()> {
        if chain.is_empty() {
            return Err(LedgerError::InvalidChain("chain is empty".into()));
        }

        for pair in chain.windows(2) {
            let (prev, cur) = (&pair[0], &pair[1]);

            if cur.previous_hash != prev.hash() {
                return Err(LedgerError::InvalidChain(format!(
                    "block #{} does not link to block #{}",
                    cur.index, prev.index
                )));
            }

            if !pow::valid_proof(prev.proof, cur.proof, self.difficulty) {
                return Err(LedgerError::InvalidChain(format!(
                    "block #{} has invalid proof {}",
                    cur.index, cur.proof
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::{Ledger, Transaction};

    const DIFFICULTY: u32 = 2;

    fn mined_chain(blocks: usize) -> Vec<Block> {
        let mut ledger = Ledger::new(DIFFICULTY);
        for i in 1..blocks {
            ledger.new_transaction("alice", "bob", i as u64).unwrap();
            ledger.mine("miner").unwrap();
        }
        ledger.chain().to_vec()
    }

    fn validator() -> ChainValidator {
        ChainValidator::new(DIFFICULTY)
    }

    #[test]
    fn accepts_mined_chain() {
        assert!(validator().is_valid(&mined_chain(4)));
    }

    #[test]
    fn accepts_lone_genesis() {
        assert!(validator().is_valid(&mined_chain(1)));
    }

    #[test]
    fn rejects_empty_chain() {
        assert!(!validator().is_valid(&[]));
    }

    #[test]
    fn rejects_tampered_transactions() {
        let mut chain = mined_chain(4);
        chain[1].transactions[0].amount = 1_000;
        assert!(!validator().is_valid(&chain));

        let mut chain = mined_chain(4);
        chain[2].transactions.push(Transaction::new("eve", "eve", 5));
        assert!(!validator().is_valid(&chain));
    }

    #[test]
    fn rejects_tampered_proof() {
        let mut chain = mined_chain(4);
        chain[1].proof += 1;
        assert!(!validator().is_valid(&chain));

        // Tip block: its proof is only covered by the puzzle check.
        let mut chain = mined_chain(4);
        let last_proof = chain[2].proof;
        chain[3].proof = (0u64..)
            .find(|p| !pow::valid_proof(last_proof, *p, DIFFICULTY))
            .unwrap();
        assert!(matches!(
            validator().validate(&chain),
            Err(LedgerError::InvalidChain(msg)) if msg.contains("invalid proof")
        ));
    }

    #[test]
    fn rejects_tampered_previous_hash() {
        let mut chain = mined_chain(4);
        chain[3].previous_hash = "0000".into();
        assert!(matches!(
            validator().validate(&chain),
            Err(LedgerError::InvalidChain(msg)) if msg.contains("does not link")
        ));
    }

    #[test]
    fn rejects_reordered_blocks() {
        let mut chain = mined_chain(4);
        chain.swap(1, 2);
        assert!(!validator().is_valid(&chain));
    }

    #[test]
    fn checks_every_link_of_long_candidate() {
        // A node holding a short chain must still check a longer candidate
        // all the way to its tip, not only the first few links.
        let local = mined_chain(2);
        let mut candidate = mined_chain(7);
        assert!(validator().is_valid(&candidate));

        let tip = candidate.len() - 1;
        candidate[tip].previous_hash = local[1].hash();
        assert!(!validator().is_valid(&candidate));
    }

    #[test]
    fn higher_difficulty_rejects_easy_chain() {
        let chain = mined_chain(5);
        // Odds that four difficulty-2 proofs all happen to clear difficulty 4
        // are negligible.
        assert!(!ChainValidator::new(4).is_valid(&chain));
    }
}
