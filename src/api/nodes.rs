use actix_web::{HttpResponse, get, post, web};
use log::info;

use super::models::{
    AppState, ErrorResponse, RegisterNodesRequest, RegisterNodesResponse, ResolveResponse,
};
use crate::error::LedgerError;
use crate::network::Node;

/// Register peer nodes by URL.
#[post("/nodes/register")]
pub async fn register_nodes(
    state: web::Data<AppState>,
    body: web::Json<RegisterNodesRequest>,
) -> Result<HttpResponse, LedgerError> {
    let Some(urls) = body.into_inner().nodes else {
        return Ok(HttpResponse::BadRequest().json(ErrorResponse {
            error: "Please supply a valid list of nodes".to_string(),
        }));
    };

    let parsed = urls
        .iter()
        .map(|url| Node::parse(url))
        .collect::<Result<Vec<_>, _>>()?;

    let total_nodes = {
        let mut nodes = state.nodes.lock().expect("mutex poisoned");
        for node in parsed {
            let url = node.to_string();
            if nodes.insert(node) {
                info!("registered node {url}");
            }
        }
        nodes.all()
    };
    state.persist();

    Ok(HttpResponse::Created().json(RegisterNodesResponse {
        message: "New nodes have been added",
        total_nodes,
    }))
}

/// Run longest-valid-chain consensus against every registered peer.
#[get("/nodes/resolve")]
pub async fn resolve_conflicts(state: web::Data<AppState>) -> HttpResponse {
    let replaced = state.resolver.resolve(&state.ledger, &state.nodes).await;
    if replaced {
        state.persist();
    }

    let chain = state.ledger.lock().expect("mutex poisoned").chain().to_vec();
    let resp = if replaced {
        ResolveResponse {
            message: "Our chain was replaced",
            new_chain: Some(chain),
            chain: None,
        }
    } else {
        ResolveResponse {
            message: "Our chain is authoritative",
            new_chain: None,
            chain: Some(chain),
        }
    };
    HttpResponse::Ok().json(resp)
}
