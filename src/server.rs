/// HTTP server with WebSocket sessions for enhanced tables
use actix_web::{middleware, web, App, Error, HttpRequest, HttpResponse, HttpServer};
use actix_web_actors::ws;
use log::info;

use crate::websocket::{AppState, TableWebSocket};

/// WebSocket endpoint handler
async fn ws_index(
    req: HttpRequest,
    stream: web::Payload,
    state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let resp = ws::start(TableWebSocket::new(state), &req, stream)?;
    Ok(resp)
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "tables": state.table_names(),
    }))
}

/// Start the HTTP server with the given shared tables
pub async fn run_server(host: &str, port: u16, state: AppState) -> std::io::Result<()> {
    let state = web::Data::new(state);

    info!("Table enhancer server");
    info!("WebSocket: ws://{}:{}/ws", host, port);
    info!("Health check: http://{}:{}/health", host, port);
    info!("Tables: {}", state.table_names().join(", "));

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(middleware::Logger::default())
            // CORS for development
            .wrap(
                actix_cors::Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .route("/ws", web::get().to(ws_index))
            .route("/health", web::get().to(health_check))
    })
    .bind((host, port))?
    .run()
    .await
}
