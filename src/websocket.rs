/// WebSocket sessions driving enhancer instances
///
/// Every connection owns its own instances, one per table name, built from
/// the shared table sources. Interactions from one client never show up in
/// another client's tables.
use actix::prelude::*;
use actix_web_actors::ws;
use log::{debug, error, info, warn};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::error::TableError;
use crate::instance::{enhance, TableInstance};
use crate::messages::{ClientMessage, ServerMessage};
use crate::table::{ColumnSource, TableSource};

/// How often heartbeat pings are sent
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
/// How long before lack of client response causes a timeout
const CLIENT_TIMEOUT: Duration = Duration::from_secs(10);

/// Shared state for all WebSocket connections
pub struct AppState {
    pub tables: Arc<Mutex<BTreeMap<String, TableSource>>>,
}

impl AppState {
    /// State holding the demo table only.
    pub fn new() -> Self {
        let mut tables = BTreeMap::new();
        tables.insert("demo".to_string(), demo_table());
        Self {
            tables: Arc::new(Mutex::new(tables)),
        }
    }

    /// Registers or replaces a table source.
    pub fn insert_table(&self, name: &str, source: TableSource) {
        self.lock().insert(name.to_string(), source);
    }

    pub fn table_names(&self) -> Vec<String> {
        self.lock().keys().cloned().collect()
    }

    pub fn get_table(&self, name: &str) -> Option<TableSource> {
        self.lock().get(name).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, TableSource>> {
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

fn demo_table() -> TableSource {
    let rows = [
        ("Alice", "Engineering", "$120,000", "2019-04-01"),
        ("bob", "Sales", "$85,500", "2021-11-15"),
        ("Carol", "Engineering", "$132,250", "2017-08-20"),
        ("Dmitri", "Support", "$61,000", "2023-02-06"),
        ("Eve", "Security", "$140,000", "n/a"),
        ("Farah", "Sales", "$91,750", "2020-06-30"),
        ("Gus", "Support", "$58,900", "2022-09-12"),
        ("Hana", "Engineering", "$118,000", "2018-01-03"),
        ("Ivan", "Finance", "$99,000", "2016-05-23"),
        ("Jo", "Sales", "$77,300", "2024-03-18"),
        ("Kai", "Finance", "$103,400", "2019-12-02"),
        ("Lena", "Engineering", "$127,600", "2015-10-10"),
    ];

    let column = |text: &str, column_type: Option<&str>| ColumnSource {
        text: text.to_string(),
        column_type: column_type.map(str::to_string),
    };

    TableSource {
        id: Some("demo".to_string()),
        classes: Vec::new(),
        columns: vec![
            column("Name", None),
            column("Department", None),
            column("Salary", Some("number")),
            column("Started", Some("date")),
        ],
        rows: rows
            .iter()
            .map(|(name, dept, salary, started)| {
                vec![name.to_string(), dept.to_string(), salary.to_string(), started.to_string()]
            })
            .collect(),
    }
}

/// Instances owned by one client.
#[derive(Default)]
pub struct TableSession {
    instances: HashMap<String, TableInstance>,
}

impl TableSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_enhanced(&self, table_name: &str) -> bool {
        self.instances.contains_key(table_name)
    }

    /// Applies one client message and returns the reply.
    pub fn handle(&mut self, msg: ClientMessage, state: &AppState) -> ServerMessage {
        self.try_handle(msg, state).unwrap_or_else(|e| {
            debug!("client request failed: {}", e);
            ServerMessage::Error {
                message: e.to_string(),
            }
        })
    }

    fn try_handle(&mut self, msg: ClientMessage, state: &AppState) -> Result<ServerMessage, TableError> {
        match msg {
            ClientMessage::ListTables => Ok(ServerMessage::Tables {
                names: state.table_names(),
            }),

            ClientMessage::Enhance { table_name, options } => {
                let source = state
                    .get_table(&table_name)
                    .ok_or_else(|| TableError::UnknownTable(table_name.clone()))?;
                let table = source.clone().into_table()?.into_handle();

                let mut instance = enhance(table, &options)
                    .pop()
                    .ok_or_else(|| TableError::NotEnhanceable(table_name.clone()))?;
                let controls = instance.controls();
                let frame = instance.refresh();

                if let Some(old) = self.instances.insert(table_name.clone(), instance) {
                    old.destroy();
                }
                info!("enhanced table '{}'", table_name);

                Ok(ServerMessage::Enhanced {
                    table_name,
                    source,
                    controls,
                    frame,
                })
            }

            ClientMessage::SearchChanged { table_name, term } => {
                let frame = self.instance(&table_name)?.on_search_changed(&term);
                Ok(ServerMessage::Frame { table_name, frame })
            }

            ClientMessage::HeaderClicked { table_name, column } => {
                let frame = self.instance(&table_name)?.on_header_clicked(column);
                Ok(ServerMessage::Frame { table_name, frame })
            }

            ClientMessage::PageSizeChanged {
                table_name,
                page_size,
            } => {
                let frame = self.instance(&table_name)?.on_page_size_changed(page_size);
                Ok(ServerMessage::Frame { table_name, frame })
            }

            ClientMessage::PageSelected { table_name, page } => {
                let frame = self.instance(&table_name)?.on_page_selected(page);
                Ok(ServerMessage::Frame { table_name, frame })
            }

            ClientMessage::Refresh { table_name } => {
                let frame = self.instance(&table_name)?.refresh();
                Ok(ServerMessage::Frame { table_name, frame })
            }

            ClientMessage::Destroy { table_name } => {
                let instance = self
                    .instances
                    .remove(&table_name)
                    .ok_or_else(|| TableError::NotEnhanced(table_name.clone()))?;
                let table = instance.table().clone();
                instance.destroy();
                let visible_rows = table.borrow().visible_row_indices();
                Ok(ServerMessage::Destroyed {
                    table_name,
                    visible_rows,
                })
            }
        }
    }

    fn instance(&mut self, table_name: &str) -> Result<&mut TableInstance, TableError> {
        self.instances
            .get_mut(table_name)
            .ok_or_else(|| TableError::NotEnhanced(table_name.to_string()))
    }

    /// Destroys every instance.
    pub fn close(&mut self) {
        for (_, instance) in self.instances.drain() {
            instance.destroy();
        }
    }
}

/// WebSocket connection actor
pub struct TableWebSocket {
    hb: Instant,
    state: actix_web::web::Data<AppState>,
    session: TableSession,
}

impl TableWebSocket {
    pub fn new(state: actix_web::web::Data<AppState>) -> Self {
        Self {
            hb: Instant::now(),
            state,
            session: TableSession::new(),
        }
    }

    fn hb(&self, ctx: &mut ws::WebsocketContext<Self>) {
        ctx.run_interval(HEARTBEAT_INTERVAL, |act, ctx| {
            if Instant::now().duration_since(act.hb) > CLIENT_TIMEOUT {
                warn!("WebSocket client heartbeat failed, disconnecting");
                ctx.stop();
                return;
            }
            ctx.ping(b"");
        });
    }

    fn send(ctx: &mut ws::WebsocketContext<Self>, msg: &ServerMessage) {
        match serde_json::to_string(msg) {
            Ok(text) => ctx.text(text),
            Err(e) => error!("failed to serialize server message: {}", e),
        }
    }
}

impl Actor for TableWebSocket {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        debug!("WebSocket session started");
        self.hb(ctx);
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        self.session.close();
        debug!("WebSocket session stopped");
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for TableWebSocket {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(msg)) => {
                self.hb = Instant::now();
                ctx.pong(&msg);
            }
            Ok(ws::Message::Pong(_)) => {
                self.hb = Instant::now();
            }
            Ok(ws::Message::Text(text)) => {
                let response = match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(client_msg) => self.session.handle(client_msg, &self.state),
                    Err(e) => ServerMessage::Error {
                        message: format!("Invalid message format: {}", e),
                    },
                };
                Self::send(ctx, &response);
            }
            Ok(ws::Message::Binary(_)) => {
                warn!("Unexpected binary message");
            }
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            _ => ctx.stop(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn send(session: &mut TableSession, state: &AppState, json: &str) -> ServerMessage {
        session.handle(serde_json::from_str(json).unwrap(), state)
    }

    #[test]
    fn test_demo_table_is_listed() {
        let state = AppState::new();
        let mut session = TableSession::new();
        match send(&mut session, &state, r#"{"type":"ListTables"}"#) {
            ServerMessage::Tables { names } => assert_eq!(names, vec!["demo"]),
            other => panic!("unexpected {other:?}"),
        }

        let demo = state.get_table("demo").unwrap();
        assert_eq!(demo.id.as_deref(), Some("demo"));
        assert_eq!(demo.rows.len(), 12);
        assert!(demo.rows.iter().all(|row| row.len() == demo.columns.len()));
        assert_eq!(demo.columns[2].column_type.as_deref(), Some("number"));
        assert_eq!(demo.columns[3].column_type.as_deref(), Some("date"));
    }

    #[test]
    fn test_enhance_then_interact() {
        let state = AppState::new();
        let mut session = TableSession::new();

        match send(&mut session, &state, r#"{"type":"Enhance","table_name":"demo","options":{"perPageOptions":[5]}}"#) {
            ServerMessage::Enhanced { controls, frame, .. } => {
                assert_eq!(controls.columns, vec!["Name", "Department", "Salary", "Started"]);
                assert_eq!(frame.visible_rows, vec![0, 1, 2, 3, 4]);
                assert_eq!(frame.window.total_pages, 3);
            }
            other => panic!("unexpected {other:?}"),
        }

        match send(&mut session, &state, r#"{"type":"HeaderClicked","table_name":"demo","column":2}"#) {
            // lowest salaries first
            ServerMessage::Frame { frame, .. } => assert_eq!(frame.visible_rows, vec![6, 3, 9, 1, 5]),
            other => panic!("unexpected {other:?}"),
        }

        match send(&mut session, &state, r#"{"type":"SearchChanged","table_name":"demo","term":"engineering"}"#) {
            ServerMessage::Frame { frame, .. } => assert_eq!(frame.visible_rows, vec![7, 0, 11, 2]),
            other => panic!("unexpected {other:?}"),
        }

        match send(&mut session, &state, r#"{"type":"Destroy","table_name":"demo"}"#) {
            ServerMessage::Destroyed { visible_rows, .. } => assert_eq!(visible_rows, (0..12).collect::<Vec<_>>()),
            other => panic!("unexpected {other:?}"),
        }
        assert!(!session.is_enhanced("demo"));
    }

    #[test]
    fn test_errors_are_reported_not_fatal() {
        let state = AppState::new();
        state.insert_table("headless", TableSource::default());
        let mut session = TableSession::new();

        for (json, expected) in [
            (r#"{"type":"Enhance","table_name":"nope"}"#, "Table 'nope' not found"),
            (r#"{"type":"Enhance","table_name":"headless"}"#, "Table 'headless' has no header row or no body"),
            (r#"{"type":"Refresh","table_name":"demo"}"#, "Table 'demo' is not enhanced"),
            (r#"{"type":"Destroy","table_name":"demo"}"#, "Table 'demo' is not enhanced"),
        ] {
            match send(&mut session, &state, json) {
                ServerMessage::Error { message } => assert_eq!(message, expected),
                other => panic!("unexpected {other:?}"),
            }
        }
    }

    #[test]
    fn test_sessions_are_isolated() {
        let state = AppState::new();
        let mut a = TableSession::new();
        let mut b = TableSession::new();
        send(&mut a, &state, r#"{"type":"Enhance","table_name":"demo"}"#);
        send(&mut b, &state, r#"{"type":"Enhance","table_name":"demo"}"#);
        send(&mut a, &state, r#"{"type":"SearchChanged","table_name":"demo","term":"sales"}"#);

        match send(&mut b, &state, r#"{"type":"Refresh","table_name":"demo"}"#) {
            ServerMessage::Frame { frame, .. } => assert_eq!(frame.window.total_rows, 12),
            other => panic!("unexpected {other:?}"),
        }
    }
}
