/// WebSocket message types for client-server communication
use serde::{Deserialize, Serialize};

use crate::options::Options;
use crate::presenter::{Controls, RenderFrame};
use crate::table::TableSource;

/// Messages sent from client to server
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// List the tables that can be enhanced
    ListTables,

    /// Attach an instance to a table, replacing any existing one
    Enhance {
        table_name: String,
        #[serde(default)]
        options: Options,
    },

    SearchChanged { table_name: String, term: String },

    HeaderClicked { table_name: String, column: usize },

    PageSizeChanged { table_name: String, page_size: usize },

    PageSelected { table_name: String, page: usize },

    /// Re-render with the current state
    Refresh { table_name: String },

    /// Detach the instance and restore the table
    Destroy { table_name: String },
}

impl ClientMessage {
    /// Table the message is addressed to, if any.
    pub fn table_name(&self) -> Option<&str> {
        match self {
            ClientMessage::ListTables => None,
            ClientMessage::Enhance { table_name, .. }
            | ClientMessage::SearchChanged { table_name, .. }
            | ClientMessage::HeaderClicked { table_name, .. }
            | ClientMessage::PageSizeChanged { table_name, .. }
            | ClientMessage::PageSelected { table_name, .. }
            | ClientMessage::Refresh { table_name }
            | ClientMessage::Destroy { table_name } => Some(table_name),
        }
    }
}

/// Messages sent from server to client
#[derive(Debug, Serialize, Clone)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// Available table names in response to ListTables
    Tables { names: Vec<String> },

    /// Instance attached: table content, control setup and first frame
    Enhanced {
        table_name: String,
        source: TableSource,
        controls: Controls,
        frame: RenderFrame,
    },

    /// New state after an interaction
    Frame {
        table_name: String,
        frame: RenderFrame,
    },

    /// Instance destroyed; every row is visible again
    Destroyed {
        table_name: String,
        visible_rows: Vec<usize>,
    },

    /// Error occurred
    Error {
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_messages_are_tagged() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"HeaderClicked","table_name":"demo","column":2}"#).unwrap();
        assert!(matches!(msg, ClientMessage::HeaderClicked { column: 2, .. }));
        assert_eq!(msg.table_name(), Some("demo"));

        let msg: ClientMessage = serde_json::from_str(r#"{"type":"ListTables"}"#).unwrap();
        assert_eq!(msg.table_name(), None);
    }

    #[test]
    fn test_enhance_options_are_optional() {
        let msg: ClientMessage = serde_json::from_str(r#"{"type":"Enhance","table_name":"demo"}"#).unwrap();
        match msg {
            ClientMessage::Enhance { options, .. } => assert_eq!(options.initial_page_size(), 10),
            other => panic!("unexpected {other:?}"),
        }

        let msg: ClientMessage = serde_json::from_str(
            r#"{"type":"Enhance","table_name":"demo","options":{"perPage":25,"numericCols":[0]}}"#,
        )
        .unwrap();
        match msg {
            ClientMessage::Enhance { options, .. } => {
                assert_eq!(options.initial_page_size(), 25);
                assert_eq!(options.numeric_cols, vec![0]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_server_messages_are_tagged() {
        let json = serde_json::to_value(ServerMessage::Error {
            message: "nope".to_string(),
        })
        .unwrap();
        assert_eq!(json["type"], "Error");
        assert_eq!(json["message"], "nope");
    }
}
