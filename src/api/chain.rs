use actix_web::{HttpResponse, get, rt, web};
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Instant;

use super::models::{AppState, ChainResponse, MineResponse};
use crate::blockchain::Block;
use crate::error::LedgerError;

/// Get the full blockchain.
#[get("/chain")]
pub async fn get_chain(state: web::Data<AppState>) -> HttpResponse {
    let ledger = state.ledger.lock().expect("mutex poisoned");
    HttpResponse::Ok().json(ChainResponse {
        chain: ledger.chain(),
        length: ledger.len(),
    })
}

/// Mine a new block paying this node. The work runs in a detached task
/// (see [`forge_block`]), so a client that disconnects does not throw away
/// the search; the block is still sealed and persisted.
#[get("/mine")]
pub async fn mine_block(state: web::Data<AppState>) -> Result<HttpResponse, LedgerError> {
    let block = rt::spawn(forge_block(state.into_inner()))
        .await
        .map_err(|e| LedgerError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(MineResponse {
        message: "New Block Forged",
        index: block.index,
        transactions: block.transactions,
        proof: block.proof,
        previous_hash: block.previous_hash,
    }))
}

/// - Snapshot the puzzle for the next block
/// - Solve it on the blocking pool, without holding the ledger lock
/// - Seal the block; if the head moved meanwhile, start over on the new head
/// - Persist
async fn forge_block(state: Arc<AppState>) -> Result<Block, LedgerError> {
    let started = Instant::now();
    let deadline = state.config.mine_timeout.map(|t| started + t);

    let block = loop {
        let job = state.ledger.lock().expect("mutex poisoned").mining_job()?;
        debug!(
            "MINER - solving for last_proof={} (difficulty {})",
            job.last_proof, job.difficulty
        );

        let solving = job.clone();
        let proof = web::block(move || solving.solve_until(deadline))
            .await
            .map_err(|e| LedgerError::Internal(e.to_string()))?;

        let Some(proof) = proof else {
            let after_secs = started.elapsed().as_secs();
            warn!("MINER - abandoned after {after_secs}s");
            return Err(LedgerError::MiningAbandoned { after_secs });
        };

        let mut ledger = state.ledger.lock().expect("mutex poisoned");
        match ledger.seal(&job, proof, &state.node_id) {
            Ok(block) => break block.clone(),
            Err(LedgerError::StaleMiningJob) => {
                debug!("MINER - chain head moved while solving, retrying");
                continue;
            }
            Err(e) => return Err(e),
        }
    };

    state.persist();
    info!(
        "MINER - forged block #{} (proof={}) in {} ms",
        block.index,
        block.proof,
        started.elapsed().as_millis()
    );
    Ok(block)
}
