use actix_web::{App, HttpServer, web};
use dotenvy::dotenv;
use log::info;

use ledger_node::NodeConfig;
use ledger_node::api::{self, AppState};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let _ = dotenv();
    env_logger::init();

    let config = NodeConfig::from_env();
    let (host, port) = (config.host.clone(), config.port);

    let state = AppState::restore(config).map_err(std::io::Error::other)?;
    info!(
        "⛓️ Starting ledger node {} at http://{host}:{port}",
        state.node_id
    );
    let state = web::Data::new(state);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(api::init_routes)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
