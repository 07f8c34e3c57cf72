use actix_web::{web, App, HttpServer};
use clap::Parser;
use log::info;

use guess_match_server::models::AppState;
use guess_match_server::routes::configure_routes;
use guess_match_server::{build_dispatcher, ServerConfig, ServerError};

#[actix_web::main]
async fn main() -> Result<(), ServerError> {
    let config = ServerConfig::parse();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or(config.log_level.as_str()));

    let dispatcher = build_dispatcher(&config)?;

    info!("Starting guess match server at ws://{}/ws", config.bind);
    info!(
        "{} players per match, {:?} to confirm, answers in {:?}",
        config.players_per_match,
        config.match_timeout(),
        config.answer_range()
    );

    // Create shared application state
    let app_state = web::Data::new(AppState::new(dispatcher));

    // Start HTTP server
    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .configure(configure_routes)
    })
    .bind(config.bind.as_str())?
    .run()
    .await?;

    Ok(())
}
