/// Table Enhancer WebSocket Server
///
/// Serves the demo table plus any CSV files given on the command line as
/// `name=path.csv` (or just `path.csv`, named after the file stem).

use std::io;
use std::path::Path;

use log::info;
use table_enhancer::server::run_server;
use table_enhancer::websocket::AppState;
use table_enhancer::Table;

fn load_table(arg: &str) -> io::Result<(String, Table)> {
    let (name, path) = match arg.split_once('=') {
        Some((name, path)) => (name.to_string(), path),
        None => {
            let stem = Path::new(arg)
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or(arg);
            (stem.to_string(), arg)
        }
    };

    let csv = std::fs::read_to_string(path)?;
    let table = Table::from_csv(&name, &csv).map_err(io::Error::other)?;
    Ok((name, table))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    // Get host and port from environment or use defaults
    let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse()
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "PORT must be a number"))?;

    let state = AppState::new();
    for arg in std::env::args().skip(1) {
        let (name, table) = load_table(&arg)?;
        info!("loaded table '{}' with {} rows from {}", name, table.row_count(), arg);
        state.insert_table(&name, table.to_source());
    }

    run_server(&host, port, state).await
}
