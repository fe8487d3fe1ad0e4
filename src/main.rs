use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};

use teachai_server::{
    app_state::AppState, config::Config, handlers, middleware::RequestIdMiddleware,
};

const ACCESS_LOG_FORMAT: &str = r#"%a "%r" %s %b %Ts rid=%{x-request-id}o"#;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env();
    if config.is_production() {
        config.validate_for_production();
    }

    let bind_addr = (config.web_server_host.clone(), config.web_server_port);

    let state = match AppState::new(config).await {
        Ok(state) => Arc::new(state),
        Err(e) => {
            log::error!("Failed to initialise application state: {}", e);
            return Err(std::io::Error::other(e.to_string()));
        }
    };

    log::info!("Starting HTTP server on {}:{}", bind_addr.0, bind_addr.1);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(Arc::clone(&state)))
            .wrap(RequestIdMiddleware)
            .wrap(Logger::new(ACCESS_LOG_FORMAT))
            .wrap(Cors::permissive())
            .configure(handlers::configure)
    })
    .bind(bind_addr)?
    .run()
    .await
}
