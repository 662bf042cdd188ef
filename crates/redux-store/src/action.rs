//! Actions - immutable messages describing an intended state change

use crate::error::ReducerError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::Debug;

/// Anything that can be dispatched to a store
///
/// The kind is the discriminant a reducer branches on. The store rejects
/// actions whose kind is empty and uses the kind for logging.
pub trait Action: Debug + Send + Sync + 'static {
    fn kind(&self) -> &str;
}

impl Action for &'static str {
    fn kind(&self) -> &str {
        self
    }
}

impl Action for String {
    fn kind(&self) -> &str {
        self.as_str()
    }
}

/// Data-driven action as produced by slices: `{"type": "counter/increase", "payload": 5}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SliceAction {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub payload: Value,
}

impl SliceAction {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            payload: Value::Null,
        }
    }

    pub fn with_payload(kind: impl Into<String>, payload: Value) -> Self {
        Self {
            kind: kind.into(),
            payload,
        }
    }

    /// Decode the payload into a typed value
    pub fn payload_as<T: DeserializeOwned>(&self) -> Result<T, ReducerError> {
        serde_json::from_value(self.payload.clone()).map_err(|e| ReducerError::InvalidPayload {
            kind: self.kind.clone(),
            reason: e.to_string(),
        })
    }

    /// The slice prefix of `slice/case` kinds
    pub fn slice_name(&self) -> Option<&str> {
        self.kind.split_once('/').map(|(slice, _)| slice)
    }

    /// The case suffix of `slice/case` kinds
    pub fn case_name(&self) -> Option<&str> {
        self.kind.split_once('/').map(|(_, case)| case)
    }
}

impl Action for SliceAction {
    fn kind(&self) -> &str {
        &self.kind
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_slice_action_from_json() {
        let action: SliceAction =
            serde_json::from_value(json!({ "type": "counter/increase", "payload": 5 })).unwrap();

        assert_eq!(action.kind(), "counter/increase");
        assert_eq!(action.slice_name(), Some("counter"));
        assert_eq!(action.case_name(), Some("increase"));
        assert_eq!(action.payload_as::<i64>().unwrap(), 5);
    }

    #[test]
    fn test_slice_action_without_payload() {
        let action: SliceAction = serde_json::from_str(r#"{ "type": "increment" }"#).unwrap();

        assert_eq!(action, SliceAction::new("increment"));
        assert_eq!(action.slice_name(), None);
        assert_eq!(
            serde_json::to_string(&action).unwrap(),
            r#"{"type":"increment"}"#
        );
    }

    #[test]
    fn test_payload_type_mismatch() {
        let action = SliceAction::with_payload("counter/increase", json!("five"));

        let err = action.payload_as::<i64>().unwrap_err();
        assert!(matches!(
            err,
            ReducerError::InvalidPayload { ref kind, .. } if kind == "counter/increase"
        ));
    }
}
