//! Observed records flowing through the reconciliation passes.

use paperclip::actix::Apiv2Schema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// HTTP header name to the list of values seen for it
pub type Headers = BTreeMap<String, Vec<String>>;

/// An HTTP endpoint observed on the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Apiv2Schema)]
pub struct EndpointRecord {
    /// Endpoint in `host:port/path` form (e.g. ":80/users/42")
    pub endpoint: String,
    /// HTTP methods used against the endpoint
    #[serde(default)]
    pub methods: Vec<String>,
    /// Request headers seen for the endpoint
    #[serde(default)]
    pub headers: Headers,
}

impl EndpointRecord {
    pub fn new(endpoint: impl Into<String>, methods: &[&str]) -> Self {
        Self {
            endpoint: endpoint.into(),
            methods: methods.iter().map(|m| m.to_string()).collect(),
            headers: Headers::new(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers
            .entry(name.to_string())
            .or_default()
            .push(value.to_string());
        self
    }
}

/// A filesystem `open()` call observed for a process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Apiv2Schema)]
pub struct OpenRecord {
    /// Opened path
    pub path: String,
    /// Open flags (e.g. "O_RDONLY")
    #[serde(default)]
    pub flags: Vec<String>,
}

impl OpenRecord {
    pub fn new(path: impl Into<String>, flags: &[&str]) -> Self {
        Self {
            path: path.into(),
            flags: flags.iter().map(|f| f.to_string()).collect(),
        }
    }
}

/// A record dropped from a batch because it could not be analyzed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Apiv2Schema)]
pub struct SkippedRecord {
    /// Raw endpoint or path as submitted
    pub value: String,
    /// Human readable reason
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_record_defaults_on_deserialize() {
        let record: EndpointRecord = serde_json::from_str(r#"{"endpoint": ":80/health"}"#).unwrap();
        assert_eq!(record.endpoint, ":80/health");
        assert!(record.methods.is_empty());
        assert!(record.headers.is_empty());
    }

    #[test]
    fn test_open_record_serialization() {
        let record = OpenRecord::new("/etc/hosts", &["O_RDONLY"]);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json, serde_json::json!({"path": "/etc/hosts", "flags": ["O_RDONLY"]}));
    }
}
