use actix_web::{HttpResponse, post, web};
use log::{debug, info};

use super::models::{AppState, MessageResponse, NewTxRequest};
use crate::error::LedgerError;

/// Queue a transaction for the next mined block.
#[post("/transactions/new")]
pub async fn post_transaction(
    state: web::Data<AppState>,
    body: web::Json<NewTxRequest>,
) -> Result<HttpResponse, LedgerError> {
    let NewTxRequest {
        sender,
        recipient,
        amount,
    } = body.into_inner();

    let (sender, recipient, amount) = match (sender, recipient, amount) {
        (Some(s), Some(r), Some(a)) => (s, r, a),
        (s, r, a) => {
            let missing = [
                ("sender", s.is_none()),
                ("recipient", r.is_none()),
                ("amount", a.is_none()),
            ];
            let errors: Vec<String> = missing
                .iter()
                .filter(|(_, absent)| *absent)
                .map(|(field, _)| format!("Missing field: {field}"))
                .collect();
            debug!("POST /transactions/new - rejected: {errors:?}");
            return Err(LedgerError::Validation(errors));
        }
    };

    let index = {
        let mut ledger = state.ledger.lock().expect("mutex poisoned");
        ledger.new_transaction(sender.as_str(), recipient.as_str(), amount)?
    };
    state.persist();

    info!("POST /transactions/new - {sender} -> {recipient} ({amount}) queued for block {index}");
    Ok(HttpResponse::Created().json(MessageResponse {
        message: format!("Transaction will be added to block {index}."),
    }))
}
