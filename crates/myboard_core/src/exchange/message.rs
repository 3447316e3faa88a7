//! Wire messages of the cross-context channel.
//!
//! Messages travel as untyped JSON objects `{ "type", "payload"? }`. State
//! requests additionally carry a `requestId`; a response that echoes it is
//! routed to exactly that request.

use crate::model::theme::ThemeMode;
use serde_json::{json, Map, Value};
use uuid::Uuid;

pub const REQUEST_BUDGET: &str = "requestBudget";
pub const BUDGET_DATA_RESPONSE: &str = "budgetDataResponse";
pub const IMPORT_BUDGET: &str = "importBudget";
pub const IMPORT_BUDGET_ACK: &str = "importBudgetAck";
pub const SET_THEME: &str = "setTheme";

#[derive(Debug, Clone, PartialEq)]
pub enum ChannelMessage {
    RequestBudget { request_id: Option<Uuid> },
    BudgetDataResponse { payload: Value, request_id: Option<Uuid> },
    ImportBudget { payload: Value },
    ImportBudgetAck,
    SetTheme { mode: ThemeMode },
}

impl ChannelMessage {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RequestBudget { .. } => REQUEST_BUDGET,
            Self::BudgetDataResponse { .. } => BUDGET_DATA_RESPONSE,
            Self::ImportBudget { .. } => IMPORT_BUDGET,
            Self::ImportBudgetAck => IMPORT_BUDGET_ACK,
            Self::SetTheme { .. } => SET_THEME,
        }
    }

    /// Encodes the message as a channel object.
    pub fn to_wire(&self) -> Value {
        let mut object = Map::new();
        object.insert("type".to_string(), json!(self.kind()));
        match self {
            Self::RequestBudget { request_id } => insert_request_id(&mut object, *request_id),
            Self::BudgetDataResponse {
                payload,
                request_id,
            } => {
                object.insert("payload".to_string(), payload.clone());
                insert_request_id(&mut object, *request_id);
            }
            Self::ImportBudget { payload } => {
                object.insert("payload".to_string(), payload.clone());
            }
            Self::ImportBudgetAck => {}
            Self::SetTheme { mode } => {
                object.insert("payload".to_string(), json!(mode.as_str()));
            }
        }
        Value::Object(object)
    }

    /// Decodes a channel object; anything unrecognized yields `None`.
    ///
    /// A missing `payload` reads as `null`; a malformed `requestId` is
    /// treated as absent.
    pub fn from_wire(raw: &Value) -> Option<Self> {
        let object = raw.as_object()?;
        let payload = object.get("payload").cloned().unwrap_or(Value::Null);
        let request_id = object
            .get("requestId")
            .and_then(Value::as_str)
            .and_then(|text| Uuid::parse_str(text).ok());

        let message = match object.get("type")?.as_str()? {
            REQUEST_BUDGET => Self::RequestBudget { request_id },
            BUDGET_DATA_RESPONSE => Self::BudgetDataResponse {
                payload,
                request_id,
            },
            IMPORT_BUDGET => Self::ImportBudget { payload },
            IMPORT_BUDGET_ACK => Self::ImportBudgetAck,
            SET_THEME => Self::SetTheme {
                mode: ThemeMode::parse(payload.as_str()?)?,
            },
            _ => return None,
        };
        Some(message)
    }
}

fn insert_request_id(object: &mut Map<String, Value>, request_id: Option<Uuid>) {
    if let Some(id) = request_id {
        object.insert("requestId".to_string(), json!(id.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::ChannelMessage;
    use crate::model::theme::ThemeMode;
    use serde_json::json;
    use uuid::Uuid;

    #[test]
    fn theme_message_carries_mode_string() {
        let wire = ChannelMessage::SetTheme {
            mode: ThemeMode::Light,
        }
        .to_wire();
        assert_eq!(wire, json!({ "type": "setTheme", "payload": "light" }));
    }

    #[test]
    fn response_without_payload_or_id_decodes() {
        let message = ChannelMessage::from_wire(&json!({ "type": "budgetDataResponse" })).unwrap();
        assert_eq!(
            message,
            ChannelMessage::BudgetDataResponse {
                payload: serde_json::Value::Null,
                request_id: None
            }
        );
    }

    #[test]
    fn request_id_survives_encoding() {
        let id = Uuid::new_v4();
        let wire = ChannelMessage::RequestBudget {
            request_id: Some(id),
        }
        .to_wire();
        assert_eq!(wire["requestId"], json!(id.to_string()));
        assert_eq!(
            ChannelMessage::from_wire(&wire),
            Some(ChannelMessage::RequestBudget {
                request_id: Some(id)
            })
        );
    }

    #[test]
    fn unknown_or_untyped_objects_are_rejected() {
        assert_eq!(ChannelMessage::from_wire(&json!({ "type": "ping" })), None);
        assert_eq!(ChannelMessage::from_wire(&json!({ "payload": 1 })), None);
        assert_eq!(ChannelMessage::from_wire(&json!("requestBudget")), None);
    }
}
