use std::time::Instant;

use log::{debug, info};

use super::block::{GENESIS_PREVIOUS_HASH, GENESIS_PROOF};
use super::{Block, ChainValidator, Transaction, pow};
use crate::error::{LedgerError, Result};

/// The puzzle for the next block, detached from the ledger so it can be
/// solved without holding the ledger lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MiningJob {
    pub last_proof: u64,
    pub previous_hash: String,
    pub difficulty: u32,
}

impl MiningJob {
    pub fn solve(&self) -> u64 {
        pow::solve(self.last_proof, self.difficulty)
    }

    /// Solve with an optional deadline; `None` means it was abandoned.
    pub fn solve_until(&self, deadline: Option<Instant>) -> Option<u64> {
        match deadline {
            Some(deadline) => pow::solve_until(self.last_proof, self.difficulty, deadline),
            None => Some(self.solve()),
        }
    }
}

/// In-memory chain of blocks plus the pool of transactions waiting for
/// the next one.
#[derive(Debug, Clone)]
pub struct Ledger {
    chain: Vec<Block>,
    pending: Vec<Transaction>,
    difficulty: u32,
}

impl Ledger {
    /// Initialize a ledger holding only the genesis block.
    pub fn new(difficulty: u32) -> Self {
        let mut ledger = Self {
            chain: Vec::new(),
            pending: Vec::new(),
            difficulty,
        };
        ledger.new_block(GENESIS_PROOF, Some(GENESIS_PREVIOUS_HASH.to_string()));
        ledger
    }

    /// Rebuild a ledger from previously saved state. The chain must be
    /// non-empty and internally consistent.
    pub fn from_parts(
        chain: Vec<Block>,
        pending: Vec<Transaction>,
        difficulty: u32,
    ) -> Result<Self> {
        ChainValidator::new(difficulty).validate(&chain)?;
        Ok(Self {
            chain,
            pending,
            difficulty,
        })
    }

    /// Queue a transaction for the next block and return the index that
    /// block is expected to get.
    pub fn new_transaction(
        &mut self,
        sender: impl Into<String>,
        recipient: impl Into<String>,
        amount: u64,
    ) -> Result<u64> {
        let hint = self.last_block()?.index + 1;
        self.pending.push(Transaction::new(sender, recipient, amount));
        debug!("pending pool size now {}", self.pending.len());
        Ok(hint)
    }

    /// Solve the puzzle for the next block, pay `miner` and seal the block.
    /// Blocks the caller for the whole search.
    pub fn mine(&mut self, miner: &str) -> Result<&Block> {
        let job = self.mining_job()?;
        let proof = job.solve();
        self.seal(&job, proof, miner)
    }

    /// Capture what is needed to solve the puzzle for the next block.
    pub fn mining_job(&self) -> Result<MiningJob> {
        let last = self.last_block()?;
        Ok(MiningJob {
            last_proof: last.proof,
            previous_hash: last.hash(),
            difficulty: self.difficulty,
        })
    }

    /// Append the block for a solved `job`: the reward for `miner` joins
    /// the pool, then the whole pool is captured into the new block.
    ///
    /// Fails with [`LedgerError::StaleMiningJob`] if another block was
    /// appended (or the chain replaced) since the job was taken.
    pub fn seal(&mut self, job: &MiningJob, proof: u64, miner: &str) -> Result<&Block> {
        if self.last_block()?.hash() != job.previous_hash {
            return Err(LedgerError::StaleMiningJob);
        }
        if !pow::valid_proof(job.last_proof, proof, job.difficulty) {
            return Err(LedgerError::InvalidChain(format!(
                "proof {proof} does not solve puzzle for {}",
                job.last_proof
            )));
        }

        self.pending.push(Transaction::reward(miner));
        let block = self.new_block(proof, Some(job.previous_hash.clone()));
        info!(
            "sealed block #{} (proof={}, txs={})",
            block.index,
            block.proof,
            block.transactions.len()
        );
        Ok(block)
    }

    /// Append a block holding every pending transaction and empty the pool.
    /// Without `previous_hash` the hash of the current last block is used
    /// (or the genesis sentinel when the chain is empty).
    pub fn new_block(&mut self, proof: u64, previous_hash: Option<String>) -> &Block {
        let previous_hash = previous_hash.unwrap_or_else(|| {
            self.chain
                .last()
                .map(Block::hash)
                .unwrap_or_else(|| GENESIS_PREVIOUS_HASH.to_string())
        });
        let block = Block::new(
            self.chain.len() as u64 + 1,
            std::mem::take(&mut self.pending),
            proof,
            previous_hash,
        );
        self.chain.push(block);
        &self.chain[self.chain.len() - 1]
    }

    /// Return the last block in the chain.
    pub fn last_block(&self) -> Result<&Block> {
        self.chain.last().ok_or(LedgerError::EmptyChain)
    }

    pub fn chain(&self) -> &[Block] {
        &self.chain
    }

    pub fn pending(&self) -> &[Transaction] {
        &self.pending
    }

    /// Swap in a chain adopted from a peer. The pending pool is kept.
    pub fn replace_chain(&mut self, chain: Vec<Block>) {
        info!(
            "replacing local chain (len {}) with peer chain (len {})",
            self.chain.len(),
            chain.len()
        );
        self.chain = chain;
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }
}
