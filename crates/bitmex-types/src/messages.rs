//! Outbound control messages for the realtime API
//!
//! Every command sent to the server has the shape
//! `{"op": string, "args": [string | number], "id": int?}`.

use serde::Serialize;
use std::fmt;

/// Control operation name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Operation {
    /// Subscribe to one or more topics
    Subscribe,
    /// Unsubscribe from one or more topics
    Unsubscribe,
    /// Authenticate with an expiring signature
    AuthKeyExpires,
}

impl Operation {
    /// Returns the wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Subscribe => "subscribe",
            Self::Unsubscribe => "unsubscribe",
            Self::AuthKeyExpires => "authKeyExpires",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single positional argument
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Arg {
    /// Text argument (topics, key ids, signatures)
    Text(String),
    /// Integer argument (expiry timestamps)
    Int(i64),
}

impl From<String> for Arg {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for Arg {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<i64> for Arg {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Int(value) => write!(f, "{value}"),
        }
    }
}

/// Outbound control request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Request {
    /// Operation name
    pub op: Operation,
    /// Ordered arguments
    pub args: Vec<Arg>,
    /// Optional correlation id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
}

impl Request {
    /// Create a request without correlation id
    pub fn new(op: Operation, args: Vec<Arg>) -> Self {
        Self { op, args, id: None }
    }

    /// Add a correlation id
    pub fn with_id(mut self, id: u64) -> Self {
        self.id = Some(id);
        self
    }

    /// Same arguments under a different operation
    pub fn with_op(&self, op: Operation) -> Self {
        Self {
            op,
            args: self.args.clone(),
            id: self.id,
        }
    }

    /// Serialize to the JSON text frame sent on the wire
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscribe_wire_shape() {
        let req = Request::new(
            Operation::Subscribe,
            vec!["trade:XBTUSD".into(), "quote:XBTUSD".into()],
        );
        assert_eq!(
            req.to_json().unwrap(),
            r#"{"op":"subscribe","args":["trade:XBTUSD","quote:XBTUSD"]}"#
        );
    }

    #[test]
    fn test_mixed_args_with_id() {
        let req = Request::new(
            Operation::AuthKeyExpires,
            vec!["key".into(), Arg::Int(1518064236), "sig".into()],
        )
        .with_id(1);
        let json: serde_json::Value = serde_json::from_str(&req.to_json().unwrap()).unwrap();

        assert_eq!(json["op"], "authKeyExpires");
        assert_eq!(json["args"][0], "key");
        assert_eq!(json["args"][1], 1518064236);
        assert_eq!(json["id"], 1);
    }

    #[test]
    fn test_with_op_keeps_args() {
        let sub = Request::new(Operation::Subscribe, vec!["order".into()]);
        let unsub = sub.with_op(Operation::Unsubscribe);

        assert_eq!(unsub.op, Operation::Unsubscribe);
        assert_eq!(unsub.args, sub.args);
        assert_eq!(unsub.op.to_string(), "unsubscribe");
    }
}
